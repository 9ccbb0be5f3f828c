//! overlay_probe - run an overlay policy over a JSON batch of detections
//!
//! Input is a JSON array with one entry per frame: an array of objects, or
//! `null` for a frame whose metadata is missing. The batch is written back
//! with overlay styles rewritten by the selected policy.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::PathBuf;

use overlay_kernel::{FootPointMode, Frame, MissingFramePolicy, OverlayConfig, PolicyKind};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input batch (JSON). Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output path for the rewritten batch. Writes stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Config file (TOML or JSON).
    #[arg(long, env = "OVERLAY_CONFIG")]
    config: Option<PathBuf>,
    /// Overlay policy (redact|distance).
    #[arg(long)]
    policy: Option<PolicyKind>,
    /// Foot point precision for distancing (truncated|subpixel).
    #[arg(long)]
    foot_point: Option<FootPointMode>,
    /// Handling of frames without metadata (skip-remaining|skip-frame).
    #[arg(long)]
    missing_frame: Option<MissingFramePolicy>,
    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => OverlayConfig::load_from(path)?,
        None => OverlayConfig::load()?,
    };
    if let Some(policy) = args.policy {
        cfg.policy = policy;
    }
    if let Some(mode) = args.foot_point {
        cfg.foot_point = mode;
    }
    if let Some(missing_frame) = args.missing_frame {
        cfg.missing_frame = missing_frame;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_filter))
        .init();

    let raw = read_input(args.input.as_ref())?;
    let mut batch: Vec<Option<Frame>> =
        serde_json::from_str(&raw).map_err(|e| anyhow!("invalid batch: {}", e))?;

    let processor = cfg.processor();
    log::info!(
        "policy={}, foot_point={}, missing_frame={}, frames={}",
        processor.policy_name(),
        cfg.foot_point,
        processor.missing_frame_policy(),
        batch.len()
    );

    let report = processor.process(&mut batch);
    log::info!(
        "status={:?}, processed={}, skipped={}",
        report.status,
        report.frames_processed,
        report.frames_skipped
    );
    if let Some(fault) = &report.fault {
        log::warn!("batch fault: {}", fault);
    }

    let json = if args.pretty {
        serde_json::to_vec_pretty(&batch)?
    } else {
        serde_json::to_vec(&batch)?
    };
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e)),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}
