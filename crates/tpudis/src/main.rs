//! tpudis - BDC/GDMA command buffer disassembler
//!
//! Usage:
//!   tpudis <buffer> --layouts <json>                Disassemble a compute (BDC) buffer
//!   tpudis <buffer> --layouts <json> -e gdma        Disassemble a data-movement buffer
//!   tpudis <buffer> --layouts <json> --json         Emit JSON records
//!   tpudis <buffer> --layouts <json> --stats        Count commands per variant

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tpudis_disasm::{
    BitSlice, ConverterTable, DecodeError, Disassembler, Engine, Instruction, InstructionRecord,
    LayoutTable, Registry, StreamConfig, TrailingBits,
};
use tracing::debug;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "tpudis")]
#[command(about = "Disassembler for BM1684X BDC and GDMA command buffers", long_about = None)]
struct Cli {
    /// Path to the raw command buffer
    input: PathBuf,

    /// Engine whose commands the buffer holds
    #[arg(short, long, default_value = "bdc")]
    engine: Engine,

    /// JSON field-layout table keyed by variant name
    #[arg(short, long)]
    layouts: PathBuf,

    /// Bit offset of the first command (decimal or 0x-prefixed hex)
    #[arg(short, long, default_value = "0", value_parser = parse_offset)]
    offset: usize,

    /// Maximum number of commands to decode
    #[arg(short, long)]
    count: Option<usize>,

    /// How to treat bits left over after the last whole command
    #[arg(short, long, value_enum, default_value_t = Trailing::Strict)]
    trailing: Trailing,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Include every decoded field
    #[arg(long)]
    fields: bool,

    /// Print per-variant command counts
    #[arg(long)]
    stats: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Trailing {
    /// A short remainder is an error
    Strict,
    /// A short remainder of zero bits is padding
    ZeroPadding,
    /// A short remainder is dropped
    Ignore,
}

impl From<Trailing> for TrailingBits {
    fn from(t: Trailing) -> Self {
        match t {
            Trailing::Strict => TrailingBits::Strict,
            Trailing::ZeroPadding => TrailingBits::ZeroPadding,
            Trailing::Ignore => TrailingBits::Ignore,
        }
    }
}

fn parse_offset(s: &str) -> Result<usize, String> {
    match s.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => s.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
    }
}

/// JSON output document.
#[derive(Serialize)]
struct Report {
    engine: Engine,
    instructions: Vec<InstructionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<IndexMap<&'static str, usize>>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let data = fs::read(&cli.input)
        .with_context(|| format!("Failed to read command buffer: {}", cli.input.display()))?;
    let json = fs::read_to_string(&cli.layouts)
        .with_context(|| format!("Failed to read layout table: {}", cli.layouts.display()))?;
    let layouts = LayoutTable::from_json(&json)
        .with_context(|| format!("Failed to parse layout table: {}", cli.layouts.display()))?;
    debug!(layouts = layouts.len(), bytes = data.len(), "inputs loaded");

    let total_bits = data.len() * 8;
    if cli.offset > total_bits {
        bail!(
            "Offset {} is past the end of {} ({} bits)",
            cli.offset,
            cli.input.display(),
            total_bits
        );
    }

    let registry = Registry::bm1684x(&layouts, ConverterTable::new())
        .context("Failed to build the BM1684X variant registry")?;

    let config = StreamConfig {
        trailing: cli.trailing.into(),
        max_instructions: cli.count,
    };
    let (instructions, failure) = decode(&registry, &cli, &data, config);

    let mut stats: IndexMap<&'static str, usize> = IndexMap::new();
    for insn in &instructions {
        *stats.entry(insn.key()).or_default() += 1;
    }

    if cli.json {
        let report = Report {
            engine: cli.engine,
            instructions: instructions
                .iter()
                .map(|insn| insn.to_record(cli.fields))
                .collect(),
            stats: cli.stats.then_some(stats),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for insn in &instructions {
            print_instruction(insn, cli.fields);
        }
        if cli.stats {
            print_stats(&stats, instructions.len());
        }
    }

    match failure {
        Some(err) => Err(err).with_context(|| {
            format!(
                "Failed to decode {} stream after {} commands",
                cli.engine,
                instructions.len()
            )
        }),
        None => Ok(()),
    }
}

/// Decodes until the stream ends, keeping what decoded before any error.
fn decode(
    registry: &Registry,
    cli: &Cli,
    data: &[u8],
    config: StreamConfig,
) -> (Vec<Instruction>, Option<DecodeError>) {
    let decoder = registry.decoder(cli.engine);
    let mut instructions = Vec::new();
    for result in decoder
        .instructions(BitSlice::new(data), config)
        .starting_at(cli.offset)
    {
        match result {
            Ok(insn) => instructions.push(insn),
            Err(err) => return (instructions, Some(err)),
        }
    }
    (instructions, None)
}

fn print_instruction(insn: &Instruction, fields: bool) {
    println!("{:>8}  {:<12} {}", insn.offset(), insn.key(), insn);
    if fields {
        for (name, value) in insn.fields().iter() {
            println!("{:>10}{} = {:#x}", "", name, value);
        }
    }
}

fn print_stats(stats: &IndexMap<&'static str, usize>, total: usize) {
    println!();
    println!("Statistics");
    println!("==========");
    let mut rows: Vec<_> = stats.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (key, count) in rows {
        println!("{:<24} {:>8}", key, count);
    }
    println!("{:<24} {:>8}", "total", total);
}
