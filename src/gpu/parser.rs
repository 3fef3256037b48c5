//! Parses the captured query output into readings.
//!
//! Input is one device per line, fields comma-separated, with optional
//! surrounding whitespace and an optional unit suffix (e.g. "MiB") on the
//! memory fields. Any malformed line aborts the whole parse; a bad row means
//! the tool's output contract was violated and a partial report would be
//! misleading.

use thiserror::Error;

use crate::gpu::device::GpuReading;

/// Fields expected per row: index, name, memory.used, memory.total.
const FIELDS_PER_ROW: usize = 4;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line_no}: expected {FIELDS_PER_ROW} fields, found {found}: {line:?}")]
    FieldCount {
        line_no: usize,
        found: usize,
        line: String,
    },

    #[error("line {line_no}: invalid device index {value:?}")]
    InvalidIndex { line_no: usize, value: String },

    #[error("line {line_no}: invalid memory value {value:?}")]
    InvalidMemory { line_no: usize, value: String },
}

/// Parse the raw query output into an ordered list of readings.
///
/// Blank lines are skipped. Parsing is a pure function of the input text.
pub fn parse_readings(raw: &str) -> Result<Vec<GpuReading>, ParseError> {
    let mut readings = Vec::new();

    for (i, line) in raw.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FIELDS_PER_ROW {
            return Err(ParseError::FieldCount {
                line_no,
                found: fields.len(),
                line: line.to_string(),
            });
        }

        let index = fields[0]
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidIndex {
                line_no,
                value: fields[0].to_string(),
            })?;

        let memory_used_mb = parse_memory_field(fields[2]).ok_or_else(|| {
            ParseError::InvalidMemory {
                line_no,
                value: fields[2].to_string(),
            }
        })?;
        let memory_total_mb = parse_memory_field(fields[3]).ok_or_else(|| {
            ParseError::InvalidMemory {
                line_no,
                value: fields[3].to_string(),
            }
        })?;

        readings.push(GpuReading {
            index,
            name: fields[1].to_string(),
            memory_used_mb,
            memory_total_mb,
        });
    }

    Ok(readings)
}

/// Parse a memory field, tolerating a unit suffix.
///
/// With `--format=...,nounits` the field is a bare integer ("250"), but
/// unit-bearing output ("250 MiB") parses too: the numeric token is taken and
/// any trailing alphabetic unit text is ignored. The unit must follow the
/// number; a row like "MiB 250" is malformed.
fn parse_memory_field(s: &str) -> Option<u64> {
    let mut tokens = s.split_whitespace();
    let value = tokens.next()?.parse::<u64>().ok()?;
    match tokens.next() {
        None => Some(value),
        Some(unit) if unit.chars().all(|c| c.is_ascii_alphabetic()) && tokens.next().is_none() => {
            Some(value)
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_DEVICES: &str = "\
0, NVIDIA GeForce RTX 3080, 100, 10240
1, NVIDIA GeForce RTX 3080, 50, 10240
2, NVIDIA GeForce RTX 3080, 8000, 10240";

    #[test]
    fn test_parse_well_formed_rows() {
        let readings = parse_readings(THREE_DEVICES).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].index, 0);
        assert_eq!(readings[0].name, "NVIDIA GeForce RTX 3080");
        assert_eq!(readings[0].memory_used_mb, 100);
        assert_eq!(readings[0].memory_total_mb, 10240);
        assert_eq!(readings[1].memory_used_mb, 50);
        assert_eq!(readings[2].memory_used_mb, 8000);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_readings(THREE_DEVICES).unwrap();
        let second = parse_readings(THREE_DEVICES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unit_suffix_is_stripped() {
        let readings = parse_readings("0, RTX 3080, 250 MiB, 10240 MiB").unwrap();
        assert_eq!(readings[0].memory_used_mb, 250);
        assert_eq!(readings[0].memory_total_mb, 10240);
    }

    #[test]
    fn test_empty_output_yields_empty_list() {
        assert!(parse_readings("").unwrap().is_empty());
        assert!(parse_readings("\n").unwrap().is_empty());
        assert!(parse_readings("  \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let err = parse_readings("abc,xyz").unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { found: 2, .. }));
    }

    #[test]
    fn test_short_row_aborts_whole_parse() {
        // The well-formed second row must not survive as a partial result.
        let raw = "0, RTX 3080, 100\n1, RTX 3080, 50, 10240";
        let err = parse_readings(raw).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { line_no: 1, .. }));
    }

    #[test]
    fn test_non_numeric_index_is_fatal() {
        let err = parse_readings("abc, RTX 3080, 100, 10240").unwrap_err();
        assert!(matches!(err, ParseError::InvalidIndex { .. }));
    }

    #[test]
    fn test_non_numeric_memory_is_fatal() {
        let err = parse_readings("0, RTX 3080, lots, 10240").unwrap_err();
        assert!(matches!(err, ParseError::InvalidMemory { .. }));
    }

    #[test]
    fn test_error_carries_line_number() {
        let raw = "0, RTX 3080, 100, 10240\n1, RTX 3080, oops, 10240";
        match parse_readings(raw).unwrap_err() {
            ParseError::InvalidMemory { line_no, value } => {
                assert_eq!(line_no, 2);
                assert_eq!(value, "oops");
            }
            other => panic!("expected InvalidMemory, got {other:?}"),
        }
    }
}
