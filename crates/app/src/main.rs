//! overlay-replay - drive the Loupe capture overlay from a scripted scenario
//!
//! Usage: `overlay-replay <scenario.json> [frame.png]`
//!
//! Prints the outcome as JSON and, when a path is given, writes the last
//! rendered overlay frame as PNG.

mod fixtures;
mod scenario;

use crate::scenario::Scenario;
use anyhow::Context;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: overlay-replay <scenario.json> [frame.png]")?;
    let frame_path = args.next().map(PathBuf::from);

    let scenario = Scenario::load(&scenario_path)?;
    let base_dir = scenario_path.parent().unwrap_or(Path::new("."));
    let report = scenario.replay(base_dir)?;

    if let Some(path) = frame_path {
        report
            .frame
            .save(&path)
            .with_context(|| format!("Failed to write frame to {}", path.display()))?;
        log::info!("frame written to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
