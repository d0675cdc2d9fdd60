use std::fs;
use std::path::{Path, PathBuf};

use thinkgear_core::{Frame, replay_capture_file};

const TAG_POOR_SIGNAL: u8 = 0x02;
const TAG_ATTENTION: u8 = 0x04;
const TAG_MEDITATION: u8 = 0x05;
const TAG_RAW_WAVE: u8 = 0x80;
const TAG_EEG_POWER: u8 = 0x83;
const EEG_POWER_SUB_LENGTH: u8 = 0x18;

/// Writes each golden capture and the report its replay is expected to
/// produce. Run from the workspace root.
fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    let cases = [
        ("esense", esense_stream()?),
        ("power_bands", power_band_stream()?),
        ("corrupted", corrupted_stream()?),
    ];
    for (name, bytes) in cases {
        let dir = root.join(name);
        let input = dir.join("input.bin");
        write_capture(&input, bytes)?;
        write_expected_report(&input, &dir.join("expected_report.json"))?;
    }
    Ok(())
}

/// Noise, then eSense-only packets as sent once per second.
fn esense_stream() -> Result<Vec<u8>, String> {
    let mut stream = vec![0x00, 0x13, 0xAA, 0x7F];
    for (signal, attention, meditation) in [(100, 50, 25), (51, 60, 31), (0, 72, 48)] {
        stream.extend(frame(&[
            TAG_POOR_SIGNAL,
            signal,
            TAG_ATTENTION,
            attention,
            TAG_MEDITATION,
            meditation,
        ])?);
    }
    Ok(stream)
}

/// Full 32-byte packets with band powers, interleaved with raw-wave packets
/// and a trailing packet without bands.
fn power_band_stream() -> Result<Vec<u8>, String> {
    let mut stream = Vec::new();
    stream.extend(frame(&[TAG_RAW_WAVE, 0x12])?);
    stream.extend(frame(&full_packet(
        26,
        [
            1_204_220, 75_112, 18_022, 9_870, 6_011, 4_390, 2_001, 16_777_215,
        ],
        44,
        57,
    ))?);
    stream.extend(frame(&[TAG_RAW_WAVE, 0xFE, TAG_RAW_WAVE, 0x01])?);
    stream.extend(frame(&full_packet(
        0,
        [812_345, 240_000, 33_333, 21_000, 14_500, 9_999, 3_100, 1_250],
        81,
        66,
    ))?);
    stream.extend(frame(&[TAG_ATTENTION, 90])?);
    Ok(stream)
}

/// Every recoverable failure followed by a packet that must still decode.
fn corrupted_stream() -> Result<Vec<u8>, String> {
    let mut stream = Vec::new();
    // declared length over the limit
    stream.extend([0xAA, 0xAA, 0x21]);
    // checksum off by one
    let mut bad = frame(&[TAG_ATTENTION, 10])?;
    if let Some(last) = bad.last_mut() {
        *last = last.wrapping_add(1);
    }
    stream.extend(bad);
    // unknown tag after a valid field
    stream.extend(frame(&[TAG_POOR_SIGNAL, 7, 0x01, 0x00])?);
    // power field cut short
    stream.extend(frame(&[TAG_EEG_POWER, EEG_POWER_SUB_LENGTH, 0x00, 0x01, 0x02])?);
    // extra sync byte before a good packet
    stream.push(0xAA);
    stream.extend(frame(&[TAG_ATTENTION, 55, TAG_MEDITATION, 45])?);
    Ok(stream)
}

fn full_packet(signal: u8, bands: [u32; 8], attention: u8, meditation: u8) -> Vec<u8> {
    let mut payload = vec![TAG_POOR_SIGNAL, signal, TAG_EEG_POWER, EEG_POWER_SUB_LENGTH];
    for band in bands {
        payload.extend_from_slice(&band.to_be_bytes()[1..]);
    }
    payload.extend([TAG_ATTENTION, attention, TAG_MEDITATION, meditation]);
    payload
}

fn frame(payload: &[u8]) -> Result<Vec<u8>, String> {
    Frame::new(payload)
        .map(|frame| frame.to_bytes())
        .map_err(|err| format!("fixture payload rejected: {err}"))
}

fn write_capture(path: &Path, bytes: Vec<u8>) -> Result<(), String> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn write_expected_report(input: &Path, output: &Path) -> Result<(), String> {
    let report = replay_capture_file(input)
        .map_err(|err| format!("replay failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("report serialization failed: {err}"))?;
    fs::write(output, json).map_err(|err| format!("failed to write {}: {}", output.display(), err))
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    Ok(())
}
