use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use landgrid_shared::{LandCollection, LandEvent, LandRecord};

/// Land input: either a feed event or a bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LandsFile {
    Event(LandEvent),
    Records(Vec<LandRecord>),
}

impl LandsFile {
    pub fn into_collection(self) -> LandCollection {
        match self {
            LandsFile::Event(LandEvent::Snapshot { lands, .. }) => lands,
            LandsFile::Event(LandEvent::Update { changes, .. }) => changes,
            LandsFile::Records(lands) => lands,
        }
    }
}

/// One scripted input, in surface-local pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayStep {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    /// Press and release in place.
    Click { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta_y: f64 },
    Resize { width: f64, height: f64 },
    SetUser { address: Option<String> },
    /// Feed event routed through the bound land store.
    Event { event: LandEvent },
    Frame {
        #[serde(default = "one")]
        count: u32,
    },
    Unmount,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub user: Option<String>,
    pub steps: Vec<ReplayStep>,
}

pub fn load_lands(path: &Path) -> anyhow::Result<LandCollection> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading lands file {}", path.display()))?;
    let parsed: LandsFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing lands file {}", path.display()))?;
    Ok(parsed.into_collection())
}

pub fn load_script(path: &Path) -> anyhow::Result<ReplayScript> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
}
