//! CLI integration tests for tpudis.
//!
//! These run the built binary against the command buffers and layout table
//! under `tests/fixtures/` at the workspace root.

use std::process::{Command, Output};

/// Get the path to the tpudis binary.
fn tpudis_bin() -> String {
    env!("CARGO_BIN_EXE_tpudis").to_string()
}

/// Get the path to a test fixture.
fn fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

/// Run tpudis on a fixture buffer with the fixture layout table.
fn run_tpudis(buffer: &str, args: &[&str]) -> Output {
    Command::new(tpudis_bin())
        .arg(fixture_path(buffer))
        .args(["--layouts", &fixture_path("bm1684x_layouts.json")])
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("Failed to execute tpudis")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help() {
    let output = Command::new(tpudis_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute tpudis");
    assert!(output.status.success(), "tpudis --help should succeed");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("BDC and GDMA"), "Help should describe the tool");
    assert!(stdout.contains("--layouts"), "Help should show --layouts option");
    assert!(stdout.contains("--trailing"), "Help should show --trailing option");
}

#[test]
fn test_missing_layouts_flag() {
    let output = Command::new(tpudis_bin())
        .arg(fixture_path("bdc_stream.bin"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("Failed to execute tpudis");
    assert!(!output.status.success(), "--layouts is required");
}

#[test]
fn test_unreadable_layouts() {
    let output = Command::new(tpudis_bin())
        .arg(fixture_path("bdc_stream.bin"))
        .args(["--layouts", "does-not-exist.json"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("Failed to execute tpudis");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to read layout table"),
        "stderr: {}",
        stderr
    );
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_bdc_stream_with_padding() {
    let output = run_tpudis("bdc_stream.bin", &["--trailing", "zero-padding"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = stdout_of(&output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "       0  CONV         convolution",
            "     512  sCONV        short convolution",
            "     768  SYSID        syncID",
        ]
    );
}

#[test]
fn test_bdc_stream_strict_reports_trailing_bits() {
    let output = run_tpudis("bdc_stream.bin", &[]);
    assert!(!output.status.success(), "32 trailing bits are not a command");
    // Commands before the remainder are still printed.
    assert_eq!(stdout_of(&output).lines().count(), 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("truncated bdc command at bit 896"), "stderr: {}", stderr);
}

#[test]
fn test_count_and_offset() {
    let output = run_tpudis("bdc_stream.bin", &["--offset", "0x200", "--count", "1"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output).trim_end(),
        "     512  sCONV        short convolution"
    );
}

#[test]
fn test_offset_past_end() {
    // bdc_stream.bin holds 116 bytes, 928 bits.
    let output = run_tpudis("bdc_stream.bin", &["--offset", "928"]);
    assert!(output.status.success(), "an offset at the end is an empty stream");
    assert!(stdout_of(&output).is_empty());

    let output = run_tpudis("bdc_stream.bin", &["--offset", "0x1000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("past the end"), "stderr: {}", stderr);
}

#[test]
fn test_gdma_fields() {
    let output = run_tpudis("gdma_stream.bin", &["--engine", "gdma", "--fields"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("       0  DMA_general  DMA general"));
    assert!(stdout.contains("     512  sDMA_sys     short DMA sys"));
    assert!(stdout.contains("cmd_id_dep = 0x2"));
    assert!(stdout.contains("cmd_special_function = 0x1"));
}

#[test]
fn test_wrong_engine_is_rejected() {
    // The short GDMA word read as BDC looks like a long convolution
    // with 384 bits missing.
    let output = run_tpudis("gdma_stream.bin", &["--engine", "tiu", "--offset", "512"]);
    assert!(!output.status.success());
}

#[test]
fn test_json_output() {
    let output = run_tpudis(
        "bdc_stream.bin",
        &["--trailing", "ignore", "--json", "--stats", "--fields"],
    );
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");

    assert_eq!(report["engine"], "bdc");
    let insns = report["instructions"].as_array().unwrap();
    assert_eq!(insns.len(), 3);
    assert_eq!(insns[0]["key"], "CONV");
    assert_eq!(insns[0]["op_name"], "conv.normal");
    assert_eq!(insns[1]["cmd_id"], 2);
    assert_eq!(insns[1]["cmd_id_dep"], 1);
    assert_eq!(insns[1]["fields"]["cmd_short"], 1);
    assert_eq!(insns[2]["text"], "syncID");
    assert_eq!(insns[2]["size_bits"], 128);
    assert_eq!(report["stats"]["SYSID"], 1);
}

#[test]
fn test_stats_table() {
    let output = run_tpudis("gdma_stream.bin", &["-e", "gdma", "--stats"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Statistics"));
    assert!(stdout.lines().any(|l| l.starts_with("total") && l.ends_with('2')));
}
