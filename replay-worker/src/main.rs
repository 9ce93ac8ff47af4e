//! ornalens-replay-worker - Replays captured screen snapshots through the interpreter.
//!
//! Reads a JSON-lines file (one `ScreenSnapshot` per line), feeds the
//! snapshots in order through the snapshot service and prints the resulting
//! updates and finished records as JSON on stdout.
//!
//! Usage: ornalens-replay-worker <snapshots.jsonl> [--throttle-ms <n>] [--assess]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::filter::EnvFilter;

use ornalens_core::assess::{FORGE_TIERS, ItemAssessment};
use ornalens_core::context::AppConfigExt;
use ornalens_core::service::{MemorySink, spawn_service};
use ornalens_core::tracking::{DungeonVisit, WayvesselSession};
use ornalens_core::{ScreenSnapshot, ScreenUpdate};
use ornalens_types::ScannerConfig;
use ornalens_types::formatting::{format_elapsed, format_loot, format_quality, format_ready_in};

struct ReplayArgs {
    path: PathBuf,
    throttle_ms: u64,
    assess: bool,
}

fn parse_args() -> Result<ReplayArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut path = None;
    let mut throttle_ms = 0;
    let mut assess = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--throttle-ms" => {
                let value = args.next().ok_or("--throttle-ms needs a value")?;
                throttle_ms = value
                    .parse()
                    .map_err(|e| format!("Invalid --throttle-ms: {}", e))?;
            }
            "--assess" => assess = true,
            other if path.is_none() => path = Some(PathBuf::from(other)),
            other => return Err(format!("Unexpected argument: {}", other)),
        }
    }

    Ok(ReplayArgs {
        path: path.ok_or("Usage: ornalens-replay-worker <snapshots.jsonl> [--throttle-ms <n>] [--assess]")?,
        throttle_ms,
        assess,
    })
}

#[derive(Serialize)]
struct VisitSummary {
    #[serde(flatten)]
    visit: DungeonVisit,
    duration: String,
    orns_text: String,
    gold_text: String,
}

#[derive(Serialize)]
struct SessionSummary {
    #[serde(flatten)]
    session: WayvesselSession,
    duration: String,
}

#[derive(Serialize)]
struct CooldownSummary {
    name: String,
    ready_at: NaiveDateTime,
    ready_in: String,
}

#[derive(Serialize)]
struct AssessmentSummary {
    item: String,
    level: u32,
    quality: String,
    /// `stat -> [(tier, value)]`
    tiers: Vec<(String, Vec<(String, f64)>)>,
}

#[derive(Serialize)]
struct ReplayOutput {
    snapshot_count: usize,
    skipped_lines: usize,
    updates: Vec<ScreenUpdate>,
    visits: Vec<VisitSummary>,
    sessions: Vec<SessionSummary>,
    cooldowns: Vec<CooldownSummary>,
    assessments: Vec<AssessmentSummary>,
    elapsed_ms: u128,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If ORNALENS_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("ORNALENS_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    // Stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse every line of `path` as a snapshot, in parallel, keeping file order.
fn load_snapshots(path: &Path) -> Result<(Vec<ScreenSnapshot>, usize), String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mmap = unsafe { Mmap::map(&file).map_err(|e| format!("Failed to mmap: {}", e))? };
    let bytes = mmap.as_ref();

    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let parsed: Vec<Option<ScreenSnapshot>> = line_ranges
        .par_iter()
        .enumerate()
        .map(|(idx, &(start, end))| {
            let line = &bytes[start..end];
            if line.iter().all(u8::is_ascii_whitespace) {
                return None;
            }
            match serde_json::from_slice::<ScreenSnapshot>(line) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, "Skipping malformed snapshot");
                    None
                }
            }
        })
        .collect();

    let skipped = parsed.iter().filter(|s| s.is_none()).count();
    Ok((parsed.into_iter().flatten().collect(), skipped))
}

fn summarize_assessment(assessment: &ItemAssessment, european: bool) -> AssessmentSummary {
    AssessmentSummary {
        item: assessment.request.item_name.clone(),
        level: assessment.request.level,
        quality: format_quality(assessment.quality, european),
        tiers: assessment
            .stats
            .iter()
            .map(|(stat, values)| {
                let tiers = FORGE_TIERS
                    .iter()
                    .zip(values)
                    .map(|(tier, value)| (tier.to_string(), *value))
                    .collect();
                (stat.clone(), tiers)
            })
            .collect(),
    }
}

async fn replay(args: ReplayArgs, config: ScannerConfig) -> Result<ReplayOutput, String> {
    let (snapshots, skipped_lines) = load_snapshots(&args.path)?;
    let snapshot_count = snapshots.len();
    let replay_end = snapshots.last().map(|s| s.captured_at);
    tracing::info!(snapshot_count, skipped_lines, "Loaded snapshots");

    let sink = Arc::new(MemorySink::new());
    let (handle, mut updates_rx, join) =
        spawn_service(&config, sink.clone()).map_err(|e| e.to_string())?;

    let collector = tokio::spawn(async move {
        let mut updates = Vec::new();
        while let Some(update) = updates_rx.recv().await {
            updates.push(update);
        }
        updates
    });

    for snapshot in snapshots {
        handle.submit(snapshot).await.map_err(|e| e.to_string())?;
    }
    handle.shutdown().await.map_err(|e| e.to_string())?;
    join.await.map_err(|e| format!("Worker failed: {}", e))?;
    let updates = collector
        .await
        .map_err(|e| format!("Collector failed: {}", e))?;

    let european = config.european_numbers;
    let visits = sink
        .visits()
        .into_iter()
        .map(|visit| VisitSummary {
            duration: format_elapsed(visit.duration_seconds.unwrap_or(0)),
            orns_text: format_loot(visit.orns, european),
            gold_text: format_loot(visit.gold, european),
            visit,
        })
        .collect();
    let sessions = sink
        .sessions()
        .into_iter()
        .map(|session| SessionSummary {
            duration: format_elapsed(session.duration_seconds.unwrap_or(0)),
            session,
        })
        .collect();
    let cooldowns = updates
        .iter()
        .filter_map(|u| match u {
            ScreenUpdate::CooldownStarted { name, ready_at } => {
                let left = replay_end
                    .map(|end| ready_at.signed_duration_since(end).num_seconds())
                    .unwrap_or(0);
                Some(CooldownSummary {
                    name: name.clone(),
                    ready_at: *ready_at,
                    ready_in: format_ready_in(left, "ready"),
                })
            }
            _ => None,
        })
        .collect();
    let assessments = sink
        .assessments()
        .iter()
        .map(|a| summarize_assessment(a, european))
        .collect();

    Ok(ReplayOutput {
        snapshot_count,
        skipped_lines,
        updates,
        visits,
        sessions,
        cooldowns,
        assessments,
        elapsed_ms: 0,
    })
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut config = ScannerConfig::load();
    config.throttle.min_interval_ms = args.throttle_ms;
    config.assessment.enabled = args.assess;

    let timer = std::time::Instant::now();
    match replay(args, config).await {
        Ok(mut output) => {
            output.elapsed_ms = timer.elapsed().as_millis();
            match serde_json::to_string(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode output");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            std::process::exit(1);
        }
    }
}
