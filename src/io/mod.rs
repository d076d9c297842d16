//! # IO Module - Input Tables and Output Writers
//!
//! This module is the file boundary of the tracer:
//!
//! 1. **Geometry input** → [`geometry`]: whitespace-delimited wall-segment
//!    table with a bounding block
//! 2. **Flow input** → [`flow`]: whitespace-delimited flow-field samples
//! 3. **Per-particle rows** → [`records`]: one text row per emitted
//!    trajectory
//! 4. **Bin statistics** → [`stats`]: one CSV row per grid cell
//! 5. **Run summary** → [`summary`]: optional pretty-printed JSON metadata
//!
//! Input errors surface to the caller as `Box<dyn Error>` and abort the run
//! before any trajectory is traced; writers only fail on the underlying
//! file system.

pub mod flow;
pub mod geometry;
pub mod records;
pub mod stats;
pub mod summary;

use std::error::Error;

/// Splits one whitespace-delimited table row into `count` float columns.
///
/// Repeated whitespace is collapsed; extra trailing columns are ignored.
/// `line_number` is 1-based and only used for error messages.
pub(crate) fn parse_columns(
    line: &str,
    count: usize,
    line_number: usize,
) -> Result<Vec<f64>, Box<dyn Error>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < count {
        return Err(format!(
            "line {line_number}: expected {count} columns, found {}",
            fields.len()
        )
        .into());
    }
    fields[..count]
        .iter()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|e| format!("line {line_number}: bad number '{field}': {e}").into())
        })
        .collect()
}

/// Formats one float in the scientific notation of the row outputs
/// (6 significant figures).
pub(crate) fn format_scientific(value: f64) -> String {
    format!("{value:.5e}")
}

/// Formats one statistics field, rendering `NaN` as an empty field.
pub(crate) fn format_stat(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format_scientific(value)
    }
}
