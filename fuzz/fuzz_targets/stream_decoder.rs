#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use tpudis_disasm::{
    BitSlice, ConverterTable, Disassembler, Engine, LayoutTable, Registry, StreamConfig,
};

const LAYOUTS_JSON: &str = include_str!("../../tests/fixtures/bm1684x_layouts.json");

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let layouts = LayoutTable::from_json(LAYOUTS_JSON).expect("fixture parses");
        Registry::bm1684x(&layouts, ConverterTable::new()).expect("catalog builds")
    })
}

fuzz_target!(|data: &[u8]| {
    let buffer = BitSlice::new(data);
    let total = buffer.len();

    for engine in Engine::ALL {
        let decoder = registry().decoder(engine);

        // Single command at a few odd bit offsets
        for offset in [0, 1, 3, 7] {
            if let Ok(insn) = decoder.decode_instruction(buffer, offset) {
                assert!(insn.end_offset() <= total);
                let _ = insn.to_string();
            }
        }

        // Whole stream; every command must lie inside the buffer and
        // follow the previous one without gaps
        let mut stream = decoder.instructions(buffer, StreamConfig::padded());
        let mut expected = 0;
        for result in stream.by_ref() {
            let Ok(insn) = result else { break };
            assert_eq!(insn.offset(), expected);
            expected = insn.end_offset();
            assert!(expected <= total);
        }
        assert!(stream.position() <= total);
    }
});
