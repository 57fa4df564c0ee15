//! CSV export of baked keyframe tables.
//!
//! [`write_csv`] emits one row per frame as `frame,time,low,high` with float
//! intensities. [`write_commands_csv`] emits the 16-bit wireless commands
//! instead: `frame,low,high,duration_ms`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use super::{KeyframeTable, RumbleCommand};
use crate::Result;

#[derive(Serialize)]
struct KeyframeRow {
    frame: usize,
    time: f32,
    low: f32,
    high: f32,
}

#[derive(Serialize)]
struct CommandRow {
    frame: usize,
    low: u16,
    high: u16,
    duration_ms: u32,
}

impl CommandRow {
    fn new(frame: usize, command: RumbleCommand) -> Self {
        Self {
            frame,
            low: command.low,
            high: command.high,
            duration_ms: command.duration_ms,
        }
    }
}

/// Write `table` as CSV with a header row.
pub fn write_csv<W: Write>(table: &KeyframeTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (frame, keyframe) in table.frames().iter().enumerate() {
        csv.serialize(KeyframeRow {
            frame,
            time: frame as f32 / table.frame_rate(),
            low: keyframe.low,
            high: keyframe.high,
        })
        .map_err(io::Error::from)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the table's wireless commands, each held for `duration_ms`.
pub fn write_commands_csv<W: Write>(
    table: &KeyframeTable,
    duration_ms: u32,
    writer: W,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (frame, command) in table.rumble_commands(duration_ms).into_iter().enumerate() {
        csv.serialize(CommandRow::new(frame, command))
            .map_err(io::Error::from)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `table` as CSV to a file, replacing any existing content.
pub fn write_csv_file<P: AsRef<Path>>(table: &KeyframeTable, path: P) -> Result<()> {
    let file = File::create(path)?;
    write_csv(table, io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Keyframe;

    #[test]
    fn writes_header_and_rows() {
        let table = KeyframeTable::from_parts(
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(0.5, 0.25)],
            25.0,
            0.08,
        );
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frame,time,low,high");
        assert_eq!(lines[2], "1,0.04,0.5,0.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn writes_quantized_commands() {
        let table = KeyframeTable::from_parts(
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 0.5)],
            25.0,
            0.08,
        );
        let mut buffer = Vec::new();
        write_commands_csv(&table, 40, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frame,low,high,duration_ms");
        assert_eq!(lines[1], "0,0,0,40");
        assert_eq!(lines[2], "1,65535,32767,40");
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let table = KeyframeTable::from_parts(vec![Keyframe::new(1.0, 0.0)], 25.0, 0.04);
        write_csv_file(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("frame,time,low,high"));
    }
}
