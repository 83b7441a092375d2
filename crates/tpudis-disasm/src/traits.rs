//! Disassembler traits.

use tpudis_core::{BitSlice, Engine};

use crate::stream::{InstructionStream, StreamConfig};
use crate::{DecodeError, Instruction};

/// Trait for engine-specific command decoders.
pub trait Disassembler {
    /// Returns the engine whose commands this decoder reads.
    fn engine(&self) -> Engine;

    /// Decode a single command starting at the given bit offset.
    ///
    /// # Arguments
    /// * `buffer` - The whole command buffer
    /// * `offset` - Bit offset of the command within `buffer`
    fn decode_instruction(
        &self,
        buffer: BitSlice<'_>,
        offset: usize,
    ) -> Result<Instruction, DecodeError>;

    /// Returns the shortest encoded length, in bits.
    fn min_instruction_bits(&self) -> usize;

    /// Returns the longest encoded length, in bits.
    fn max_instruction_bits(&self) -> usize;

    /// Lazily decode successive commands from the start of `buffer`.
    fn instructions<'b>(
        &'b self,
        buffer: BitSlice<'b>,
        config: StreamConfig,
    ) -> InstructionStream<'b, Self>
    where
        Self: Sized,
    {
        InstructionStream::new(self, buffer, config)
    }

    /// Decode every command in `buffer`, stopping at the first error.
    fn disassemble_block(
        &self,
        buffer: BitSlice<'_>,
        config: &StreamConfig,
    ) -> Result<Vec<Instruction>, DecodeError>
    where
        Self: Sized,
    {
        self.instructions(buffer, config.clone()).collect()
    }
}
