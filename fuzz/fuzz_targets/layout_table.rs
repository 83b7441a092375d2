#![no_main]

use libfuzzer_sys::fuzz_target;
use tpudis_disasm::{ConverterTable, Engine, LayoutTable, Registry, StreamConfig};

// Arbitrary layout tables must either be rejected or yield a registry
// that decodes without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(layouts) = LayoutTable::from_json(json) else {
        return;
    };
    let Ok(registry) = Registry::bm1684x(&layouts, ConverterTable::new()) else {
        return;
    };
    let buffer = [0x5au8; 256];
    for engine in Engine::ALL {
        let _ = registry.decode_all(engine, &buffer, &StreamConfig::lenient());
    }
});
