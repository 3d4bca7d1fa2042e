//! The ddd text record format
//!
//! One record per object:
//!
//! ```text
//! <name>
//! <c0.x> <c0.y> <c0.z> <c0.w>
//! <c1.x> <c1.y> <c1.z> <c1.w>
//! <c2.x> <c2.y> <c2.z> <c2.w>
//! <c3.x> <c3.y> <c3.z> <c3.w>
//!
//! ```
//!
//! Line `i` holds column `i` of the matrix, so the last line is the
//! translation. Values use six fractional digits like C's `%f`.

use ddd_error::{DddError, FormatErrorKind, Result};
use glam::Mat4;
use serde::Serialize;
use std::io::Write;

/// Format a value the way C's `%f` does
pub fn format_fixed(value: f32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    // Widen first: the text must match a double formatted with six digits
    format!("{:.6}", value as f64)
}

pub fn write_record<W: Write + ?Sized>(writer: &mut W, name: &str, matrix: &Mat4) -> Result<()> {
    writeln!(writer, "{name}")?;
    for i in 0..4 {
        let c = matrix.col(i);
        writeln!(
            writer,
            "{} {} {} {}",
            format_fixed(c.x),
            format_fixed(c.y),
            format_fixed(c.z),
            format_fixed(c.w)
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

/// A record read back from a ddd file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    /// The four value lines, each one matrix column
    pub columns: [[f32; 4]; 4],
}

impl Record {
    pub fn new(name: impl Into<String>, matrix: &Mat4) -> Self {
        Self {
            name: name.into(),
            columns: matrix.to_cols_array_2d(),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.columns)
    }

    pub fn translation(&self) -> [f32; 3] {
        let [x, y, z, _] = self.columns[3];
        [x, y, z]
    }
}

/// Parse every record of a ddd file
///
/// Errors carry the 1-based line number where the input stopped making
/// sense.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut records = Vec::new();

    while let Some((_, name)) = lines.next() {
        let mut columns = [[0f32; 4]; 4];
        for column in columns.iter_mut() {
            let (number, line) = lines.next().ok_or_else(|| {
                DddError::format_at_line(
                    format!("Record '{name}' ends before its four matrix lines"),
                    FormatErrorKind::Truncated,
                    text.lines().count() + 1,
                )
            })?;
            *column = parse_column(line, number)?;
        }

        match lines.next() {
            Some((_, "")) => {}
            Some((number, _)) => {
                return Err(DddError::format_at_line(
                    format!("Expected a blank line after record '{name}'"),
                    FormatErrorKind::MissingSeparator,
                    number,
                ));
            }
            None => {
                return Err(DddError::format_at_line(
                    format!("Record '{name}' is not terminated by a blank line"),
                    FormatErrorKind::MissingSeparator,
                    text.lines().count() + 1,
                ));
            }
        }

        records.push(Record {
            name: name.to_string(),
            columns,
        });
    }

    Ok(records)
}

fn parse_column(line: &str, number: usize) -> Result<[f32; 4]> {
    let values: Vec<&str> = line.split(' ').collect();
    if values.len() != 4 {
        return Err(DddError::format_at_line(
            format!("Expected 4 values, found {}", values.len()),
            FormatErrorKind::WrongValueCount,
            number,
        ));
    }

    let mut column = [0f32; 4];
    for (slot, value) in column.iter_mut().zip(values) {
        *slot = value.parse().map_err(|_| {
            DddError::format_at_line(
                format!("'{value}' is not a number"),
                FormatErrorKind::InvalidNumber,
                number,
            )
        })?;
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(1.0), "1.000000");
        assert_eq!(format_fixed(-2.5), "-2.500000");
        assert_eq!(format_fixed(0.1), "0.100000");
        assert_eq!(format_fixed(1e-7), "0.000000");
        assert_eq!(format_fixed(-0.0), "-0.000000");
        assert_eq!(format_fixed(123456.0), "123456.000000");
        assert_eq!(format_fixed(f32::NAN), "nan");
        assert_eq!(format_fixed(f32::INFINITY), "inf");
        assert_eq!(format_fixed(f32::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_record_layout() {
        let m = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 3.0, 0.0),
            Vec4::new(4.0, 5.0, 6.0, 0.0),
            Vec4::new(7.0, 8.0, 9.0, 0.0),
            Vec4::new(10.0, 11.0, 12.0, 1.0),
        );
        let mut out = Vec::new();
        write_record(&mut out, "Cube", &m).unwrap();

        let expected = "Cube\n\
            1.000000 2.000000 3.000000 0.000000\n\
            4.000000 5.000000 6.000000 0.000000\n\
            7.000000 8.000000 9.000000 0.000000\n\
            10.000000 11.000000 12.000000 1.000000\n\
            \n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_parse_back() {
        let mut out = Vec::new();
        let a = Mat4::from_translation(Vec3::new(1.0, 3.0, -2.0));
        let b = Mat4::from_scale(Vec3::splat(2.0));
        write_record(&mut out, "A", &a).unwrap();
        write_record(&mut out, "B with spaces", &b).unwrap();

        let records = parse_records(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].matrix(), a);
        assert_eq!(records[0].translation(), [1.0, 3.0, -2.0]);
        assert_eq!(records[1].name, "B with spaces");
        assert_eq!(records[1].matrix(), b);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_records("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors_report_lines() {
        let err = parse_records("Cube\n1 0 0 0\n0 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            DddError::Format {
                kind: FormatErrorKind::WrongValueCount,
                line: Some(3),
                ..
            }
        ));

        let err = parse_records("Cube\n1 0 0 0\n0 1 x 0\n").unwrap_err();
        assert_eq!(err.line(), Some(3));

        let err = parse_records("Cube\n1 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            DddError::Format {
                kind: FormatErrorKind::Truncated,
                ..
            }
        ));

        let err =
            parse_records("Cube\n1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1\nNext\n").unwrap_err();
        assert!(matches!(
            err,
            DddError::Format {
                kind: FormatErrorKind::MissingSeparator,
                line: Some(6),
                ..
            }
        ));
    }
}
