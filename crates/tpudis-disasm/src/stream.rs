//! Sequential decoding of a command buffer.

use std::iter::FusedIterator;

use tpudis_core::BitSlice;
use tracing::{debug, trace};

use crate::{DecodeError, Disassembler, Instruction};

/// What to do with a remainder too short for any candidate variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrailingBits {
    /// Report it as [`DecodeError::Truncated`].
    #[default]
    Strict,
    /// Stop silently if every remaining bit is zero, else report it.
    ZeroPadding,
    /// Stop silently.
    Ignore,
}

/// Configuration for stream decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Handling of a short remainder.
    pub trailing: TrailingBits,
    /// Stop after this many commands.
    pub max_instructions: Option<usize>,
}

impl StreamConfig {
    /// Every bit must belong to a command.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Buffers padded with zero bits up to an alignment.
    pub fn padded() -> Self {
        Self {
            trailing: TrailingBits::ZeroPadding,
            ..Self::default()
        }
    }

    /// Decode what fits and drop the rest.
    pub fn lenient() -> Self {
        Self {
            trailing: TrailingBits::Ignore,
            ..Self::default()
        }
    }

    pub fn with_trailing(mut self, trailing: TrailingBits) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn with_max_instructions(mut self, max: usize) -> Self {
        self.max_instructions = Some(max);
        self
    }
}

/// Iterator over the commands of a buffer.
///
/// Each successful decode advances the cursor by the matched variant's
/// length. The stream ends when no bits remain, when the instruction cap
/// is reached, or after the first error. A short remainder is handled per
/// [`TrailingBits`]; an unrecognized word is always yielded as an error.
///
/// After an error [`position`](Self::position) still points at the failing
/// word. A caller that wants to skip it continues with
/// [`resume_at`](Self::resume_at).
#[derive(Debug)]
pub struct InstructionStream<'a, D: ?Sized> {
    decoder: &'a D,
    buffer: BitSlice<'a>,
    position: usize,
    config: StreamConfig,
    emitted: usize,
    done: bool,
}

impl<'a, D: Disassembler + ?Sized> InstructionStream<'a, D> {
    pub fn new(decoder: &'a D, buffer: BitSlice<'a>, config: StreamConfig) -> Self {
        Self {
            decoder,
            buffer,
            position: 0,
            config,
            emitted: 0,
            done: false,
        }
    }

    /// Starts decoding at a bit offset instead of the buffer start.
    ///
    /// An offset past the end of the buffer is reported as truncated by the
    /// first call to `next`.
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.position = offset;
        self
    }

    /// Continues a finished stream from `offset`, keeping the count of
    /// commands already yielded.
    pub fn resume_at(mut self, offset: usize) -> Self {
        self.position = offset;
        self.done = false;
        self
    }

    /// Bit offset of the next command.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of commands yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn finish(&mut self, reason: &'static str) {
        self.done = true;
        debug!(
            engine = %self.decoder.engine(),
            position = self.position,
            emitted = self.emitted,
            reason,
            "stream finished"
        );
    }

    fn on_truncated(&mut self, err: DecodeError) -> Option<Result<Instruction, DecodeError>> {
        match self.config.trailing {
            TrailingBits::Strict => {
                self.finish("truncated");
                Some(Err(err))
            }
            TrailingBits::ZeroPadding if self.buffer.skip(self.position).is_zero() => {
                self.finish("zero padding");
                None
            }
            TrailingBits::ZeroPadding => {
                self.finish("non-zero remainder");
                Some(Err(err))
            }
            TrailingBits::Ignore => {
                self.finish("remainder ignored");
                None
            }
        }
    }
}

impl<D: Disassembler + ?Sized> Iterator for InstructionStream<'_, D> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.config.max_instructions.is_some_and(|max| self.emitted >= max) {
            self.finish("instruction limit");
            return None;
        }
        if self.position > self.buffer.len() {
            self.finish("offset past end");
            return Some(Err(DecodeError::truncated(
                self.decoder.engine(),
                self.position,
                self.decoder.min_instruction_bits(),
                0,
            )));
        }
        if self.position == self.buffer.len() {
            self.finish("end of buffer");
            return None;
        }

        match self.decoder.decode_instruction(self.buffer, self.position) {
            Ok(instruction) => {
                trace!(
                    offset = self.position,
                    size_bits = instruction.size_bits(),
                    key = instruction.key(),
                    "stream advanced"
                );
                self.position += instruction.size_bits();
                self.emitted += 1;
                Some(Ok(instruction))
            }
            Err(err) if err.is_truncated() => self.on_truncated(err),
            Err(err) => {
                self.finish("decode error");
                Some(Err(err))
            }
        }
    }
}

impl<D: Disassembler + ?Sized> FusedIterator for InstructionStream<'_, D> {}
