mod config;
mod runner;
mod script;

use std::path::PathBuf;

use anyhow::bail;
use tracing_subscriber::EnvFilter;

use crate::runner::Replay;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run() {
        tracing::error!("replay failed: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(lands_path), Some(script_path)) = (args.next(), args.next()) else {
        bail!("usage: landgrid-replay <lands.json> <script.json>");
    };
    let lands_path = PathBuf::from(lands_path);
    let script_path = PathBuf::from(script_path);

    let lands = script::load_lands(&lands_path)?;
    let script = script::load_script(&script_path)?;
    let grid = config::grid_config();
    let (width, height) = (config::view_width(), config::view_height());
    tracing::info!(
        lands = lands.len(),
        steps = script.steps.len(),
        rows = grid.rows,
        cols = grid.cols,
        width,
        height,
        "starting replay"
    );

    let mut replay = Replay::new(grid, lands, width, height);
    let report = replay.run(&script);
    tracing::info!(
        frames = report.frames,
        draw_commands = report.draw_commands,
        selected = ?report.selected,
        zoom = report.zoom,
        pan_x = report.pan.0,
        pan_y = report.pan.1,
        "replay finished"
    );
    println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    Ok(())
}

fn report_json(report: &runner::ReplayReport) -> serde_json::Value {
    serde_json::json!({
        "steps": report.steps,
        "frames": report.frames,
        "draw_commands": report.draw_commands,
        "selections": report.selections,
        "selected": report.selected,
        "zoom": report.zoom,
        "pan": [report.pan.0, report.pan.1],
    })
}
