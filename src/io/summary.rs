//! Machine-readable run summary.
//!
//! Optional pretty-printed JSON next to the tabular outputs, carrying the
//! resolved parameters and the run tallies for downstream bookkeeping.

use crate::engine::{RunOutput, SimulationParams};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Metadata of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub params: SimulationParams,
    pub trajectories: usize,
    pub exits: usize,
    pub wall_hits: usize,
    pub field_refreshes: u64,
    pub duration_seconds: f64,
}

impl RunSummary {
    /// Collects the tallies of a finished run.
    pub fn new(params: &SimulationParams, output: &RunOutput) -> Self {
        RunSummary {
            params: *params,
            trajectories: output.records.len(),
            exits: output.exits(),
            wall_hits: output.wall_hits(),
            field_refreshes: output.total_refreshes(),
            duration_seconds: output.duration_seconds,
        }
    }
}

/// Serializes any serializable value as pretty-printed JSON at `path`.
pub fn save_json<T: Serialize>(data: &T, path: &Path) -> Result<(), Box<dyn Error>> {
    let json_data = serde_json::to_string_pretty(data)?;
    fs::write(path, json_data)?;
    Ok(())
}
