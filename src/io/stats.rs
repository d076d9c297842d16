//! Bin-statistics CSV writer.
//!
//! One row per grid cell under the header
//! `r, z, n, t, tvar, vr, vz, vrvar, vzvar, vrvzcov, ncolls, ncollsvar,
//! lfree, lfreevar`, with cell centers in the first two columns. Empty
//! cells keep their zero count and render their `NaN` moments as empty
//! fields.

use crate::stats::grid::BinGrid;
use std::error::Error;
use std::io::Write;

/// Column header of the statistics CSV.
pub const HEADER: &str =
    "r, z, n, t, tvar, vr, vz, vrvar, vzvar, vrvzcov, ncolls, ncollsvar, lfree, lfreevar";

/// Writes the per-cell statistics of `grid` as CSV.
pub fn write<W: Write>(writer: &mut W, grid: &BinGrid) -> Result<(), Box<dyn Error>> {
    writeln!(writer, "{HEADER}")?;

    let spec = grid.spec();
    for (i, j, cell) in grid.iter_cells() {
        let columns = [
            super::format_scientific(spec.r_center(i)),
            super::format_scientific(spec.z_center(j)),
            cell.count().to_string(),
            super::format_stat(cell.time.mean()),
            super::format_stat(cell.time.variance()),
            super::format_stat(cell.velocity.mean_a()),
            super::format_stat(cell.velocity.mean_b()),
            super::format_stat(cell.velocity.variance_a()),
            super::format_stat(cell.velocity.variance_b()),
            super::format_stat(cell.velocity.covariance()),
            super::format_stat(cell.collisions.mean()),
            super::format_stat(cell.collisions.variance()),
            super::format_stat(cell.free_path.mean()),
            super::format_stat(cell.free_path.variance()),
        ];
        writeln!(writer, "{}", columns.join(", "))?;
    }
    writer.flush()?;
    Ok(())
}
