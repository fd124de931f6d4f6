//! Ripplecut Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Clip unique identifier (ULID)
pub type ClipId = String;

/// Track unique identifier (ULID)
pub type TrackId = String;

/// Marker unique identifier (ULID)
pub type MarkerId = String;

/// Filter unique identifier (ULID)
pub type FilterId = String;

/// Operation unique identifier (ULID)
pub type OpId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Ratio (for fps, aspect ratio, etc.)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    /// Numerator
    pub num: i32,
    /// Denominator
    pub den: i32,
}

impl Ratio {
    /// Creates a new ratio with validation
    pub fn new(num: i32, den: i32) -> Self {
        if den == 0 {
            warn!("Ratio created with zero denominator, defaulting to 1");
            return Self { num, den: 1 };
        }
        Self { num, den }
    }

    /// Converts to floating point value
    pub fn as_f64(&self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self { num: 30, den: 1 } // Default 30fps
    }
}

// =============================================================================
// Color
// =============================================================================

/// Color (RGBA)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red (0.0 ~ 1.0)
    pub r: f32,
    /// Green (0.0 ~ 1.0)
    pub g: f32,
    /// Blue (0.0 ~ 1.0)
    pub b: f32,
    /// Alpha (0.0 ~ 1.0, optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<f32>,
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: None,
        }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: Some(a.clamp(0.0, 1.0)),
        }
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parses a hex color string (e.g. `#RRGGBB`, `#RRGGBBAA`).
    pub fn try_from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim().trim_start_matches('#');
        let len = hex.len();

        if len != 6 && len != 8 {
            return Err(format!("Invalid hex color length: {}", len));
        }

        let parse_channel = |s: &str| -> Result<f32, String> {
            u8::from_str_radix(s, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| e.to_string())
        };

        let r = parse_channel(&hex[0..2])?;
        let g = parse_channel(&hex[2..4])?;
        let b = parse_channel(&hex[4..6])?;

        if len == 8 {
            let a = parse_channel(&hex[6..8])?;
            Ok(Self::rgba(r, g, b, a))
        } else {
            Ok(Self::rgb(r, g, b))
        }
    }

    /// Parses a hex color string, falling back to black on invalid input.
    pub fn from_hex(hex: &str) -> Self {
        match Self::try_from_hex(hex) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Failed to parse hex color '{}': {}, defaulting to black",
                    hex, e
                );
                Self::black()
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Time Range
// =============================================================================

/// Time range
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimeRange {
    pub fn new(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        if start_sec > end_sec {
            warn!(
                "TimeRange created with start > end ({} > {}), swapping",
                start_sec, end_sec
            );
            return Self {
                start_sec: end_sec,
                end_sec: start_sec,
            };
        }
        Self { start_sec, end_sec }
    }

    /// Returns duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Checks if a given time is within range
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_sec && time <= self.end_sec
    }

    /// Checks if two ranges overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_sec < other.end_sec && self.end_sec > other.start_sec
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_as_f64() {
        assert_eq!(Ratio::new(30, 1).as_f64(), 30.0);
        assert_eq!(Ratio::new(30000, 1001).as_f64(), 30000.0 / 1001.0);
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let r = Ratio::new(25, 0);
        assert_eq!(r.den, 1);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#FFFFFF");
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 1.0);
        assert_eq!(c.b, 1.0);
        assert!(c.a.is_none());

        let c = Color::from_hex("#00000080");
        assert_eq!(c.r, 0.0);
        assert!((c.a.unwrap() - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_invalid_hex_falls_back_to_black() {
        let c = Color::from_hex("not-a-color");
        assert_eq!(c, Color::black());
    }

    #[test]
    fn test_time_range_swaps_inverted_bounds() {
        let r = TimeRange::new(10.0, 5.0);
        assert_eq!(r.start_sec, 5.0);
        assert_eq!(r.end_sec, 10.0);
        assert_eq!(r.duration(), 5.0);
    }

    #[test]
    fn test_time_range_overlaps() {
        let a = TimeRange::new(0.0, 10.0);
        let b = TimeRange::new(5.0, 15.0);
        let c = TimeRange::new(10.0, 20.0);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // Touching but not overlapping
    }
}
