use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use thinkgear_core::{ByteSource, Decoder, MetricsSnapshot, ReplayReport, SerialSource, StallWatchdog};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("THINKGEAR_BUILD_COMMIT"),
    ", ",
    env!("THINKGEAR_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "thinkgear")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for ThinkGear EEG headset serial streams (signal, attention, meditation, band power).",
    long_about = None,
    after_help = "Examples:\n  thinkgear monitor --port /dev/rfcomm0\n  thinkgear replay capture.bin --stdout --pretty\n  thinkgear replay capture.bin --csv -o packets.csv"
)]
struct Cli {
    /// Logging verbosity (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll a headset on a serial port and print every fresh packet.
    Monitor {
        /// Serial port (e.g., /dev/rfcomm0 or COM3)
        #[arg(short, long)]
        port: String,

        /// Baud rate
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,

        /// Output line format
        #[arg(long, value_enum, default_value_t = LineFormat::Csv)]
        format: LineFormat,

        /// Prefix each line with an RFC 3339 UTC timestamp
        #[arg(long)]
        timestamps: bool,

        /// Abandon a frame after this many idle polls (0 disables)
        #[arg(long, default_value_t = 0)]
        stall_limit: u32,

        /// Sleep between polls when no byte is waiting, in milliseconds
        #[arg(long, default_value_t = 1)]
        poll_interval_ms: u64,

        /// Stop after this many packets
        #[arg(long)]
        max_packets: Option<u64>,
    },
    /// Decode a raw byte capture and generate a JSON report (or CSV lines).
    Replay {
        /// Path to a raw capture file (bytes as read from the port)
        input: PathBuf,

        /// Output path
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write output to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// One CSV line per packet instead of a JSON report
        #[arg(long, conflicts_with_all = ["pretty", "compact"])]
        csv: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// List serial ports visible on this machine.
    Ports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LineFormat {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("error: {}", err);
        return ExitCode::from(2);
    }

    let result = match cli.command {
        Commands::Monitor {
            port,
            baud,
            format,
            timestamps,
            stall_limit,
            poll_interval_ms,
            max_packets,
        } => cmd_monitor(
            &port,
            baud,
            MonitorOptions {
                format,
                timestamps,
                stall_limit,
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_packets,
            },
        ),
        Commands::Replay {
            input,
            report,
            stdout,
            pretty,
            compact,
            csv,
            quiet,
        } => cmd_replay(input, report, stdout, pretty, compact, csv, quiet),
        Commands::Ports => cmd_ports(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;
    Ok(())
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[derive(Debug, Clone)]
struct MonitorOptions {
    format: LineFormat,
    timestamps: bool,
    stall_limit: u32,
    poll_interval: Duration,
    max_packets: Option<u64>,
}

#[derive(Serialize)]
struct MonitorLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(flatten)]
    snapshot: &'a MetricsSnapshot,
}

fn cmd_monitor(port: &str, baud: u32, options: MonitorOptions) -> Result<(), CliError> {
    let source = SerialSource::open(port, baud).map_err(|err| {
        CliError::new(
            format!("cannot open serial port '{}': {}", port, err),
            Some("list candidates with `thinkgear ports`".to_string()),
        )
    })?;
    info!(port, baud, "monitoring headset");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_monitor(source, &mut out, &options)
}

/// Poll `source` until `max_packets` fresh packets were printed (or forever).
fn run_monitor<S: ByteSource, W: Write>(
    mut source: S,
    out: &mut W,
    options: &MonitorOptions,
) -> Result<(), CliError> {
    let mut decoder = Decoder::new();
    let mut watchdog = StallWatchdog::new(options.stall_limit);
    let mut errors_seen = 0;
    let mut printed = 0u64;

    loop {
        if options.max_packets.is_some_and(|max| printed >= max) {
            return Ok(());
        }

        let consumed_before = decoder.stats().bytes_consumed;
        let fresh = decoder
            .advance(&mut source)
            .context("reading from headset failed")?;
        watchdog.check(&mut decoder);

        if decoder.stats().errors_total() != errors_seen {
            errors_seen = decoder.stats().errors_total();
            if let Some(err) = decoder.last_error() {
                eprintln!("error: {}", err);
            }
        }

        if fresh {
            let line = format_line(decoder.snapshot(), options)?;
            writeln!(out, "{}", line).context("failed to write output")?;
            out.flush().context("failed to write output")?;
            printed += 1;
        } else if decoder.stats().bytes_consumed == consumed_before
            && !options.poll_interval.is_zero()
        {
            thread::sleep(options.poll_interval);
        }
    }
}

fn format_line(snapshot: &MetricsSnapshot, options: &MonitorOptions) -> Result<String, CliError> {
    let timestamp = if options.timestamps {
        Some(
            OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .context("timestamp formatting failed")?,
        )
    } else {
        None
    };

    match options.format {
        LineFormat::Csv => Ok(match timestamp {
            Some(ts) => format!("{},{}", ts, snapshot.csv_line()),
            None => snapshot.csv_line(),
        }),
        LineFormat::Json => serde_json::to_string(&MonitorLine {
            timestamp,
            snapshot,
        })
        .context("JSON serialization failed")
        .map_err(Into::into),
    }
}

fn cmd_replay(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    csv: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        // A report directory that does not exist yet cannot hold the input.
        let report_abs = report_path
            .parent()
            .filter(|parent| parent.as_os_str().is_empty() || parent.exists())
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose()
            .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
        if let Some(report_dir) = report_abs {
            let report_target = report_dir.join(
                report_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
            );
            if report_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let rep = thinkgear_core::replay_capture_file(&resolved_input).context("capture replay failed")?;
    let output = if csv {
        render_csv(&rep)
    } else {
        serialize_report(&rep, pretty, compact)?
    };

    let Some(report) = report else {
        print!("{}", output);
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, output)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!(
            "OK: {} packets, {} errors -> {}",
            rep.packets.len(),
            rep.errors.len(),
            report.display()
        );
    }
    Ok(())
}

fn serialize_report(rep: &ReplayReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn render_csv(rep: &ReplayReport) -> String {
    rep.packets
        .iter()
        .map(|packet| format!("{}\n", packet.snapshot.csv_line()))
        .collect()
}

fn cmd_ports() -> Result<(), CliError> {
    let ports = thinkgear_core::available_ports().map_err(|err| {
        CliError::new(
            format!("cannot enumerate serial ports: {}", err),
            Some("pass the port path directly to `thinkgear monitor --port`".to_string()),
        )
    })?;
    if ports.is_empty() {
        eprintln!("no serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
    Ok(())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("record a capture with e.g. `cat /dev/rfcomm0 > capture.bin`".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a raw byte capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
