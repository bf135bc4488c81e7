// src/reading.rs
use crate::config::MAX_DISTANCE_CM;
use chrono::NaiveTime;
use thiserror::Error;

/// One accepted distance sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    pub timestamp: NaiveTime,
    pub distance_cm: i32,
}

impl Reading {
    /// Builds a reading from a raw sensor value, applying the display/storage cap.
    pub fn new(raw_cm: i32, timestamp: NaiveTime) -> Self {
        Self {
            timestamp,
            distance_cm: clamp_distance(raw_cm),
        }
    }

    /// `HH:MM:SS.mmm`, used for both the CSV row and the chart labels.
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("not a distance: {0:?}")]
    NotNumeric(String),
}

/// Parses one serial line into a raw distance in cm.
///
/// Surrounding whitespace is ignored. After removing a single optional leading
/// `-`, the rest must be ASCII digits only; anything else is sensor noise.
/// Negative values are accepted and kept as-is (only the upper bound is capped).
/// Digit runs too long for `i32` saturate, so they still land on the cap.
pub fn parse_distance(line: &str) -> Result<i32, ParseError> {
    let token = line.trim();
    if token.is_empty() {
        return Err(ParseError::Empty);
    }
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NotNumeric(token.to_owned()));
    }
    // digit-only by now, so the only possible parse failure is overflow
    Ok(token.parse::<i32>().unwrap_or(if digits.len() < token.len() {
        i32::MIN
    } else {
        i32::MAX
    }))
}

/// Caps a distance at [`MAX_DISTANCE_CM`] to avoid graph blowouts.
pub fn clamp_distance(raw_cm: i32) -> i32 {
    raw_cm.min(MAX_DISTANCE_CM)
}
