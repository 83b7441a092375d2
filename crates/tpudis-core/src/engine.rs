//! Execution engines and their fixed classifier bit positions.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::Error;

/// The two independent command queues of the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Engine {
    /// Compute engine (BDC).
    Bdc,
    /// Data-movement engine (GDMA).
    Gdma,
}

impl Engine {
    /// All engines, in registry order.
    pub const ALL: [Engine; 2] = [Engine::Bdc, Engine::Gdma];

    /// Returns the short name of this engine.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bdc => "bdc",
            Self::Gdma => "gdma",
        }
    }

    /// Returns the engine whose command ids this engine's dependencies refer to.
    pub fn other(self) -> Self {
        match self {
            Self::Bdc => Self::Gdma,
            Self::Gdma => Self::Bdc,
        }
    }

    /// Tag prefixed to this engine's `cmd_id` in rendered text.
    pub fn result_tag(self) -> char {
        match self {
            Self::Bdc => 'B',
            Self::Gdma => 'D',
        }
    }

    /// Tag prefixed to `cmd_id_dep` in rendered text.
    ///
    /// A dependency names a command of the other engine, so this is the
    /// other engine's result tag.
    pub fn dep_tag(self) -> char {
        self.other().result_tag()
    }

    /// Bit that selects between short and long encodings.
    ///
    /// The two engines do not share a position: the compute engine keeps
    /// the flag in bit 0, the data-movement engine in bit 3.
    pub const fn short_form_bit(self) -> usize {
        match self {
            Self::Bdc => 0,
            Self::Gdma => 3,
        }
    }

    /// Bits holding the opcode.
    pub const fn opcode_bits(self) -> Range<usize> {
        match self {
            Self::Bdc => 41..45,
            Self::Gdma => 32..36,
        }
    }

    /// Bits holding the secondary discriminant: the execution-unit type for
    /// the compute engine, the special-function code for data movement.
    pub const fn discriminant_bits(self) -> Range<usize> {
        match self {
            Self::Bdc => 45..50,
            Self::Gdma => 36..39,
        }
    }

    /// Number of distinct discriminant codes the engine can encode.
    pub fn discriminant_space(self) -> u64 {
        let bits = self.discriminant_bits();
        1u64 << (bits.end - bits.start)
    }

    /// Human-readable name of the discriminant field.
    pub fn discriminant_name(self) -> &'static str {
        match self {
            Self::Bdc => "eu_type",
            Self::Gdma => "special_function",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bdc" | "tiu" => Ok(Self::Bdc),
            "gdma" | "dma" => Ok(Self::Gdma),
            _ => Err(Error::UnknownEngine(s.to_string())),
        }
    }
}
