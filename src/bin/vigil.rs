//! Vigil CLI - replay recorded landmark traces through the monitoring core
//!
//! Commands:
//! - replay: run an NDJSON landmark trace through a full session
//! - profiles: print the built-in sensitivity profiles

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Duration, Utc};
use serde::Deserialize;

use synheart_vigil::export;
use synheart_vigil::{
    LandmarkFrame, LandmarkPoint, ProfileKind, RecordingSink, SessionMonitor, VIGIL_VERSION,
};

/// Vigil - On-device behavioral analysis engine for privacy-first attention
/// monitoring
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author = "Synheart AI Inc")]
#[command(version = VIGIL_VERSION)]
#[command(about = "Replay landmark traces through the attention monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded landmark trace through a monitoring session
    Replay {
        /// Input trace path (NDJSON, one frame per line; use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Sensitivity profile
        #[arg(long, default_value = "standard")]
        profile: ProfileArg,

        /// Write the session summary JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Write the behavior log CSV to this path
        #[arg(long)]
        log: Option<PathBuf>,

        /// Emit per-frame diagnostics through the logger
        #[arg(long)]
        debug: bool,
    },

    /// Print the built-in sensitivity profiles as JSON
    Profiles,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// Default detection parameters
    Standard,
    /// Increased tolerance for tremors and involuntary movement
    Tolerant,
}

impl From<ProfileArg> for ProfileKind {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Standard => ProfileKind::Standard,
            ProfileArg::Tolerant => ProfileKind::Tolerant,
        }
    }
}

/// One line of a replay trace.
#[derive(Deserialize)]
struct TraceFrame {
    /// Milliseconds since session start.
    elapsed_ms: i64,
    /// Landmark points as [x, y] pairs, or null when no face was detected.
    landmarks: Option<Vec<[f64; 2]>>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Replay {
            input,
            profile,
            summary,
            log,
            debug,
        } => cmd_replay(&input, profile.into(), summary.as_deref(), log.as_deref(), debug),
        Commands::Profiles => cmd_profiles(),
    }
}

fn cmd_replay(
    input: &Path,
    profile: ProfileKind,
    summary_path: Option<&Path>,
    log_path: Option<&Path>,
    debug: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(input)?;

    let base = Utc::now();
    let mut monitor = SessionMonitor::with_profile(RecordingSink::default(), profile);
    monitor.set_debug(debug);
    monitor.start(base);

    let mut last = base;
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let trace: TraceFrame = serde_json::from_str(line)
            .map_err(|e| format!("line {}: {}", line_no + 1, e))?;

        let frame = trace.landmarks.map(|points| {
            LandmarkFrame::new(
                points
                    .into_iter()
                    .map(|[x, y]| LandmarkPoint::new(x, y))
                    .collect(),
            )
        });

        let now = base + Duration::milliseconds(trace.elapsed_ms);
        monitor.process_frame(frame.as_ref(), now);
        last = now;
    }

    let summary = monitor
        .stop(last)
        .ok_or("trace produced no session to summarize")?;
    let sink = monitor.into_sink();

    for alert in &sink.alerts {
        println!(
            "[{}] {} {} ({:.1}s)",
            alert.timestamp.to_rfc3339(),
            alert.kind.as_str(),
            alert.message,
            alert.duration_seconds
        );
    }
    println!(
        "session {}: {:.1}s, {} alerts ({} gaze, {} head, {} absence), confidence {}",
        summary.session_id,
        summary.duration_seconds,
        summary.total_alerts,
        summary.gaze_alerts,
        summary.head_alerts,
        summary.absence_alerts,
        summary.final_confidence_level.as_str()
    );

    if let Some(path) = summary_path {
        fs::write(path, export::summary_to_json(&summary)?)?;
    }
    if let Some(path) = log_path {
        fs::write(path, export::log_to_csv(&sink.log))?;
    }

    Ok(())
}

fn cmd_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let profiles = serde_json::json!({
        "standard": synheart_vigil::profile::STANDARD,
        "tolerant": synheart_vigil::profile::TOLERANT,
    });
    println!("{}", serde_json::to_string_pretty(&profiles)?);
    Ok(())
}

fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}
