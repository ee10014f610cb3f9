//! Plain-text training samples.
//!
//! One sample per line: three gaze angles followed by the joint angles,
//! separated by whitespace and/or commas. Blank lines and lines starting
//! with `#` are ignored.

use super::GAZE_DIM;
use crate::error::{Result, VisMotorError};
use std::io::BufRead;

/// A gaze direction paired with the arm posture observed with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Azimuth, elevation, vergence.
    pub gaze: [f64; GAZE_DIM],
    /// Joint angles.
    pub posture: Vec<f64>,
}

/// Parses one sample line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_sample_line(line: &str, posture_dim: usize) -> Result<Option<Sample>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let values = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|e| VisMotorError::Parse(format!("{:?}: {}", field, e)))
        })
        .collect::<Result<Vec<f64>>>()?;

    let expected = GAZE_DIM + posture_dim;
    if values.len() != expected {
        return Err(VisMotorError::Parse(format!(
            "expected {} values, found {}",
            expected,
            values.len()
        )));
    }

    Ok(Some(Sample {
        gaze: [values[0], values[1], values[2]],
        posture: values[GAZE_DIM..].to_vec(),
    }))
}

/// Reads all samples from a reader, reporting the line number of bad rows.
pub fn read_samples<R: BufRead>(reader: R, posture_dim: usize) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_sample_line(&line, posture_dim) {
            Ok(Some(sample)) => samples.push(sample),
            Ok(None) => {}
            Err(VisMotorError::Parse(msg)) => {
                return Err(VisMotorError::Parse(format!("line {}: {}", n + 1, msg)))
            }
            Err(e) => return Err(e),
        }
    }
    Ok(samples)
}
