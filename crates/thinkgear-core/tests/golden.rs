use std::fs;
use std::path::Path;

use thinkgear_core::{ReplayReport, replay_capture_file};

fn load_expected_report(dir: &str) -> ReplayReport {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let expected_path = root.join(dir).join("expected_report.json");

    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let input = root.join(dir).join("input.bin");
    let expected = load_expected_report(dir);

    let mut actual = replay_capture_file(&input).expect("replay capture");
    actual.input.path = expected.input.path.clone();
    actual.tool.version = expected.tool.version.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_esense() {
    run_golden("tests/golden/esense");
}

#[test]
fn golden_power_bands() {
    run_golden("tests/golden/power_bands");
}

#[test]
fn golden_corrupted() {
    run_golden("tests/golden/corrupted");
}

#[test]
fn golden_esense_skips_leading_noise() {
    let report = load_expected_report("tests/golden/esense");
    assert_eq!(report.packets.len(), 3);
    assert!(report.errors.is_empty());
    let first = &report.packets[0].snapshot;
    assert_eq!(first.signal_quality(), 100);
    assert_eq!(first.attention(), 50);
    assert_eq!(first.meditation(), 25);
}

#[test]
fn golden_power_bands_clear_after_band_packet() {
    let report = load_expected_report("tests/golden/power_bands");
    let with_bands = &report.packets[1].snapshot;
    assert!(with_bands.has_power());
    assert_eq!(with_bands.mid_gamma(), 16_777_215);

    let last = &report.packets.last().expect("packets").snapshot;
    assert!(!last.has_power());
    assert_eq!(last.eeg_power(), &[0; 8]);
    assert_eq!(last.attention(), 90);
}

#[test]
fn golden_corrupted_reports_every_failure_kind() {
    let report = load_expected_report("tests/golden/corrupted");
    let kinds: Vec<_> = report.errors.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "packet_too_long",
            "checksum_mismatch",
            "unrecognized_tag",
            "truncated_field",
            "packet_too_long",
        ]
    );
    assert_eq!(report.packets.last().expect("packets").snapshot.attention(), 55);
}
