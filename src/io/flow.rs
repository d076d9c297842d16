//! Flow-file loader.
//!
//! Whitespace-delimited samples of the background gas from line 10 onward,
//! columns `x y T ρ ρ_m vx vy vz`. The engine maps `x → z`, `y → r`,
//! `vx → axial bulk`, `vy → radial bulk` and keeps `vz` as the unused
//! swirl component; the mass density `ρ_m` is skipped. Samples with
//! `T ≤ 0` carry no usable gas state and are dropped.

use crate::field::FlowPoint;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// First 1-based line of the sample table.
const TABLE_START: usize = 10;

/// Loads the flow samples usable by the field lookup.
///
/// # Errors
///
/// Fails on missing files, malformed rows, or when no sample survives the
/// `T > 0` filter.
pub fn load(path: &Path) -> Result<Vec<FlowPoint>, Box<dyn Error>> {
    let file =
        File::open(path).map_err(|e| format!("cannot open flow file {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut points = Vec::new();
    let mut dropped = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line_number < TABLE_START || line.trim().is_empty() {
            continue;
        }

        let columns = super::parse_columns(&line, 8, line_number)?;
        let temperature = columns[2];
        if temperature <= 0.0 {
            dropped += 1;
            continue;
        }

        points.push(FlowPoint {
            z: columns[0],
            r: columns[1],
            temperature,
            density: columns[3],
            // columns[4] is the mass density, unused here.
            v_axial: columns[5],
            v_radial: columns[6],
            swirl: columns[7],
            d_min: 0.0,
        });
    }

    if points.is_empty() {
        return Err(format!(
            "{}: no usable flow samples (all rows dropped or missing)",
            path.display()
        )
        .into());
    }

    log::info!(
        "loaded {} flow samples from {} ({} dropped with T <= 0)",
        points.len(),
        path.display(),
        dropped
    );
    Ok(points)
}
