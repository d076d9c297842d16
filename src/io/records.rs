//! Per-particle row writer.
//!
//! One whitespace-separated row per emitted trajectory under the header
//! `idx x y z xnext ynext znext vx vy vz collides time`; floats use
//! 6-significant-figure scientific notation. A trajectory is emitted when
//! `save_all` is set or when it terminated by exit.

use crate::engine::TrajectoryRecord;
use crate::geometry::Boundary;
use std::error::Error;
use std::io::Write;

/// Column header of the row output.
pub const HEADER: &str = "idx x y z xnext ynext znext vx vy vz collides time";

/// Writes the emitted rows to `writer`.
///
/// Returns the number of rows written (header excluded).
pub fn write<W: Write>(
    writer: &mut W,
    records: &[TrajectoryRecord],
    save_all: bool,
) -> Result<usize, Box<dyn Error>> {
    writeln!(writer, "{HEADER}")?;

    let mut written = 0usize;
    for (index, record) in records.iter().enumerate() {
        if !save_all && record.outcome != Boundary::Exit {
            continue;
        }
        writeln!(writer, "{}", format_row(index, record))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Formats one record as its output row.
fn format_row(index: usize, record: &TrajectoryRecord) -> String {
    let fields: Vec<String> = [
        record.position.x,
        record.position.y,
        record.position.z,
        record.next_position.x,
        record.next_position.y,
        record.next_position.z,
        record.velocity.x,
        record.velocity.y,
        record.velocity.z,
    ]
    .iter()
    .map(|&value| super::format_scientific(value))
    .collect();

    format!(
        "{index} {} {} {}",
        fields.join(" "),
        record.collisions,
        super::format_scientific(record.time)
    )
}

#[cfg(test)]
mod units {
    use super::*;
    use crate::vector::Vec3;

    fn record(outcome: Boundary) -> TrajectoryRecord {
        TrajectoryRecord {
            position: Vec3::new(0.001, 0.0, 0.035),
            next_position: Vec3::new(0.002, -0.001, 0.06),
            velocity: Vec3::new(12.5, -3.0, 140.0),
            collisions: 17,
            time: 0.00125,
            outcome,
            refreshes: 3,
        }
    }

    #[test]
    fn header_and_exit_rows_only_by_default() {
        let records = vec![record(Boundary::Wall), record(Boundary::Exit)];
        let mut buffer = Vec::new();
        let written = write(&mut buffer, &records, false).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(written, 1);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER);
        // The surviving row keeps its original launch index.
        assert!(lines[1].starts_with("1 "));
    }

    #[test]
    fn save_all_emits_everything() {
        let records = vec![record(Boundary::Wall), record(Boundary::Exit)];
        let mut buffer = Vec::new();
        let written = write(&mut buffer, &records, true).unwrap();
        assert_eq!(written, 2);
    }

    #[test]
    fn row_format_is_scientific_with_six_figures() {
        let row = format_row(4, &record(Boundary::Exit));
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0], "4");
        assert_eq!(fields[1], "1.00000e-3");
        assert_eq!(fields[10], "17");
        assert_eq!(fields[11], "1.25000e-3");
    }
}
