//! Geometry-file loader.
//!
//! Whitespace-delimited text with a fixed prelude: a 5-line header, then a
//! 2-line bounding block (`z ρ` minima on line 6, maxima on line 7), two
//! more header lines, and the segment table from line 10 onward with
//! columns `ID z₁ ρ₁ z₂ ρ₂`. The ID column is read but not used by the
//! engine. Blank lines in the table are skipped; malformed rows are
//! errors.

use crate::geometry::{Geometry, Segment};
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// First 1-based line of the segment table.
const TABLE_START: usize = 10;

/// Loads an axisymmetric wall description.
///
/// # Errors
///
/// Fails on missing files, a truncated prelude, or malformed bounding or
/// segment rows.
pub fn load(path: &Path) -> Result<Geometry, Box<dyn Error>> {
    let file = File::open(path)
        .map_err(|e| format!("cannot open geometry file {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut bounds_min: Option<(f64, f64)> = None;
    let mut bounds_max: Option<(f64, f64)> = None;
    let mut segments = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        match line_number {
            6 => {
                let columns = super::parse_columns(&line, 2, line_number)?;
                bounds_min = Some((columns[0], columns[1]));
            }
            7 => {
                let columns = super::parse_columns(&line, 2, line_number)?;
                bounds_max = Some((columns[0], columns[1]));
            }
            n if n >= TABLE_START => {
                if line.trim().is_empty() {
                    continue;
                }
                let columns = super::parse_columns(&line, 5, line_number)?;
                // columns[0] is the segment ID; read and ignored.
                segments.push(Segment {
                    z1: columns[1],
                    rho1: columns[2],
                    z2: columns[3],
                    rho2: columns[4],
                });
            }
            _ => {} // header
        }
    }

    let (z_min, _rho_min) =
        bounds_min.ok_or_else(|| format!("{}: missing bounding block", path.display()))?;
    let (z_max, rho_max) =
        bounds_max.ok_or_else(|| format!("{}: missing bounding block", path.display()))?;

    log::info!(
        "loaded {} wall segments from {} (z in [{z_min:.4}, {z_max:.4}], rho <= {rho_max:.4})",
        segments.len(),
        path.display()
    );
    Ok(Geometry::new(segments, z_min, z_max, rho_max))
}
