//! Field decoding and the per-engine decoder.

use std::sync::Arc;

use tpudis_core::{BitSlice, Engine, FieldMap, CMD_ID, CMD_ID_DEP};
use tracing::trace;

use crate::classify::{classify, truncated_candidate};
use crate::instruction::Instruction;
use crate::variant::VariantDescriptor;
use crate::{DecodeError, Disassembler, Registry};

impl VariantDescriptor {
    /// Decodes a word already classified as this variant.
    ///
    /// `word` starts at the command and may run past it; only the first
    /// [`len_bits`](Self::len_bits) bits are read. `offset` is recorded on
    /// the instruction for reporting.
    pub fn decode(
        self: &Arc<Self>,
        word: &BitSlice<'_>,
        offset: usize,
    ) -> Result<Instruction, DecodeError> {
        let word = word.slice(0..self.len_bits())?;

        let mut fields = FieldMap::with_capacity(self.layout.fields().len());
        for (name, range) in self.layout.ranges() {
            fields.insert(name, word.field(range)?);
        }

        let cmd_id = fields
            .get(CMD_ID)
            .ok_or_else(|| DecodeError::missing_field(self.key(), CMD_ID))?;
        let cmd_id_dep = fields
            .get(CMD_ID_DEP)
            .ok_or_else(|| DecodeError::missing_field(self.key(), CMD_ID_DEP))?;
        let discriminant_bits = self.engine().discriminant_bits();
        let discriminant = if discriminant_bits.end <= word.len() {
            Some(word.field(discriminant_bits)?)
        } else {
            None
        };

        let semantics = self
            .converter
            .as_ref()
            .map(|converter| converter.convert(&fields))
            .unwrap_or_default();

        Ok(Instruction {
            variant: Arc::clone(self),
            offset,
            raw: word.to_raw_word(),
            fields,
            cmd_id,
            cmd_id_dep,
            discriminant,
            semantics,
        })
    }
}

/// Decoder for one engine, borrowing a built [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct EngineDecoder<'r> {
    registry: &'r Registry,
    engine: Engine,
}

impl<'r> EngineDecoder<'r> {
    pub fn new(registry: &'r Registry, engine: Engine) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }
}

impl Disassembler for EngineDecoder<'_> {
    fn engine(&self) -> Engine {
        self.engine
    }

    fn decode_instruction(
        &self,
        buffer: BitSlice<'_>,
        offset: usize,
    ) -> Result<Instruction, DecodeError> {
        let engine = self.engine;
        let table = self.registry.table(engine);
        let word = buffer.skip(offset);
        let available = word.len();

        let opcode_bits = engine.opcode_bits();
        if available < opcode_bits.end {
            let needed = table.min_bits().max(opcode_bits.end);
            return Err(DecodeError::truncated(engine, offset, needed, available));
        }
        let opcode = word.field(opcode_bits)?;
        let discriminant = word.field(engine.discriminant_bits()).ok();

        let bucket = table
            .bucket(opcode)
            .ok_or_else(|| DecodeError::unrecognized(engine, offset, opcode, discriminant))?;

        if let Some(variant) = classify(bucket, &word) {
            let instruction = variant.decode(&word, offset)?;
            trace!(
                %engine,
                offset,
                key = variant.key(),
                cmd_id = instruction.cmd_id(),
                "decoded command"
            );
            return Ok(instruction);
        }

        match truncated_candidate(bucket, &word) {
            Some(needed) => Err(DecodeError::truncated(engine, offset, needed, available)),
            None => Err(DecodeError::unrecognized(engine, offset, opcode, discriminant)),
        }
    }

    fn min_instruction_bits(&self) -> usize {
        self.registry.table(self.engine).min_bits()
    }

    fn max_instruction_bits(&self) -> usize {
        self.registry.table(self.engine).max_bits()
    }
}
