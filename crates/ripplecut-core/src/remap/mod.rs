//! Speed / Time-Remap Engine
//!
//! Curve-based speed presets over normalized clip progress. The same pure
//! sampling function serves visualization and export-time per-segment speed
//! resolution; an average-speed reducer collapses a curve into the scalar
//! `speed` field kept on the clip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filters::{Filter, FilterCategory, ParamValue, SPEED_CURVE_FILTER};

/// Sample count for the average-speed reducer. Midpoint rule; deterministic.
const AVERAGE_SAMPLES: usize = 1000;

// =============================================================================
// Speed Preset
// =============================================================================

/// Named speed curve presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedPreset {
    Constant,
    EaseIn,
    EaseOut,
    EaseInOut,
    RampIn,
    RampOut,
    SlowMotionCenter,
    ReverseRamp,
}

impl SpeedPreset {
    /// All presets, in display order
    pub fn all() -> &'static [SpeedPreset] {
        &[
            Self::Constant,
            Self::EaseIn,
            Self::EaseOut,
            Self::EaseInOut,
            Self::RampIn,
            Self::RampOut,
            Self::SlowMotionCenter,
            Self::ReverseRamp,
        ]
    }

    /// Kebab-case name as stored in filter parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::RampIn => "ramp-in",
            Self::RampOut => "ramp-out",
            Self::SlowMotionCenter => "slow-motion-center",
            Self::ReverseRamp => "reverse-ramp",
        }
    }
}

impl fmt::Display for SpeedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeedPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Self::Constant),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            "ramp-in" => Ok(Self::RampIn),
            "ramp-out" => Ok(Self::RampOut),
            "slow-motion-center" => Ok(Self::SlowMotionCenter),
            "reverse-ramp" => Ok(Self::ReverseRamp),
            other => Err(format!("Unknown speed preset: {}", other)),
        }
    }
}

// =============================================================================
// Sampling
// =============================================================================

/// Samples the speed function for a preset at normalized clip progress
/// `t ∈ [0, 1]` (clamped). Pure and deterministic.
pub fn sample(preset: SpeedPreset, min: f64, max: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match preset {
        SpeedPreset::Constant => max,
        SpeedPreset::EaseIn => min + (max - min) * t * t,
        SpeedPreset::EaseOut => max + (min - max) * t * t,
        SpeedPreset::EaseInOut => {
            let s = t * t * (3.0 - 2.0 * t);
            min + (max - min) * s
        }
        SpeedPreset::RampIn => {
            if t < 0.3 {
                min
            } else {
                min + (max - min) * ((t - 0.3) / 0.7)
            }
        }
        SpeedPreset::RampOut => {
            if t < 0.7 {
                max
            } else {
                max + (min - max) * ((t - 0.7) / 0.3)
            }
        }
        SpeedPreset::SlowMotionCenter => {
            if (0.25..=0.75).contains(&t) {
                min
            } else {
                1.0
            }
        }
        SpeedPreset::ReverseRamp => max + (min - max) * t,
    }
}

/// Effective average speed of a preset over the full clip. Midpoint-rule
/// average; used to set the clip's scalar `speed` field.
pub fn average_speed(preset: SpeedPreset, min: f64, max: f64) -> f64 {
    let sum: f64 = (0..AVERAGE_SAMPLES)
        .map(|i| {
            let t = (i as f64 + 0.5) / AVERAGE_SAMPLES as f64;
            sample(preset, min, max, t)
        })
        .sum();
    sum / AVERAGE_SAMPLES as f64
}

// =============================================================================
// Speed Curve
// =============================================================================

/// A curve-based time remap, stored on a clip as a Time-category filter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedCurve {
    pub preset: SpeedPreset,
    pub min_speed: f64,
    pub max_speed: f64,
    pub preserve_pitch: bool,
}

impl SpeedCurve {
    pub fn new(preset: SpeedPreset, min_speed: f64, max_speed: f64, preserve_pitch: bool) -> Self {
        Self {
            preset,
            min_speed,
            max_speed,
            preserve_pitch,
        }
    }

    /// Samples the curve at normalized progress `t`
    pub fn sample(&self, t: f64) -> f64 {
        sample(self.preset, self.min_speed, self.max_speed, t)
    }

    /// Effective average speed over the clip
    pub fn average(&self) -> f64 {
        average_speed(self.preset, self.min_speed, self.max_speed)
    }

    /// Encodes the curve as its filter representation. Numeric bounds are
    /// stored as float-expressions, matching the closed parameter type set.
    pub fn to_filter(&self) -> Filter {
        Filter::new(SPEED_CURVE_FILTER, "Speed Curve", FilterCategory::Time)
            .with_param("preset", ParamValue::String(self.preset.as_str().to_string()))
            .with_param("minSpeed", ParamValue::FloatExpr(format!("{}", self.min_speed)))
            .with_param("maxSpeed", ParamValue::FloatExpr(format!("{}", self.max_speed)))
            .with_param(
                "preservePitch",
                ParamValue::Integer(i64::from(self.preserve_pitch)),
            )
    }

    /// Decodes a curve from its filter representation. Returns `None` for
    /// filters that are not a well-formed speed curve.
    pub fn from_filter(filter: &Filter) -> Option<Self> {
        if filter.name != SPEED_CURVE_FILTER {
            return None;
        }
        let preset = filter.param("preset")?.as_str()?.parse().ok()?;
        let min_speed: f64 = filter.param("minSpeed")?.as_expr()?.parse().ok()?;
        let max_speed: f64 = filter.param("maxSpeed")?.as_expr()?.parse().ok()?;
        let preserve_pitch = filter.param("preservePitch")?.as_int()? != 0;
        Some(Self {
            preset,
            min_speed,
            max_speed,
            preserve_pitch,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOL,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_ease_in_samples() {
        // min + (max-min)*t^2
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::EaseIn, min, max, 0.0), 0.5);
        assert_close(sample(SpeedPreset::EaseIn, min, max, 0.25), 0.5 + 1.5 * 0.0625);
        assert_close(sample(SpeedPreset::EaseIn, min, max, 0.5), 0.5 + 1.5 * 0.25);
        assert_close(sample(SpeedPreset::EaseIn, min, max, 0.75), 0.5 + 1.5 * 0.5625);
        assert_close(sample(SpeedPreset::EaseIn, min, max, 1.0), 2.0);
    }

    #[test]
    fn test_ease_out_samples() {
        // max + (min-max)*t^2
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::EaseOut, min, max, 0.0), 2.0);
        assert_close(sample(SpeedPreset::EaseOut, min, max, 0.5), 2.0 - 1.5 * 0.25);
        assert_close(sample(SpeedPreset::EaseOut, min, max, 1.0), 0.5);
    }

    #[test]
    fn test_ease_in_out_samples() {
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::EaseInOut, min, max, 0.0), 0.5);
        // smoothstep(0.25) = 0.15625
        assert_close(
            sample(SpeedPreset::EaseInOut, min, max, 0.25),
            0.5 + 1.5 * 0.15625,
        );
        // smoothstep(0.5) = 0.5
        assert_close(sample(SpeedPreset::EaseInOut, min, max, 0.5), 1.25);
        assert_close(sample(SpeedPreset::EaseInOut, min, max, 1.0), 2.0);
    }

    #[test]
    fn test_ramp_in_samples() {
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::RampIn, min, max, 0.0), 0.5);
        assert_close(sample(SpeedPreset::RampIn, min, max, 0.25), 0.5);
        // t=0.5 → (0.5-0.3)/0.7 of the way up
        assert_close(
            sample(SpeedPreset::RampIn, min, max, 0.5),
            0.5 + 1.5 * (0.2 / 0.7),
        );
        assert_close(sample(SpeedPreset::RampIn, min, max, 1.0), 2.0);
    }

    #[test]
    fn test_ramp_out_samples() {
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::RampOut, min, max, 0.0), 2.0);
        assert_close(sample(SpeedPreset::RampOut, min, max, 0.5), 2.0);
        // t=0.75 → (0.75-0.7)/0.3 of the way down
        assert_close(
            sample(SpeedPreset::RampOut, min, max, 0.75),
            2.0 - 1.5 * (0.05 / 0.3),
        );
        assert_close(sample(SpeedPreset::RampOut, min, max, 1.0), 0.5);
    }

    #[test]
    fn test_slow_motion_center_samples() {
        let (min, max) = (0.25, 1.0);
        assert_close(sample(SpeedPreset::SlowMotionCenter, min, max, 0.0), 1.0);
        assert_close(sample(SpeedPreset::SlowMotionCenter, min, max, 0.25), 0.25);
        assert_close(sample(SpeedPreset::SlowMotionCenter, min, max, 0.5), 0.25);
        assert_close(sample(SpeedPreset::SlowMotionCenter, min, max, 0.75), 0.25);
        assert_close(sample(SpeedPreset::SlowMotionCenter, min, max, 1.0), 1.0);
    }

    #[test]
    fn test_reverse_ramp_samples() {
        let (min, max) = (0.5, 2.0);
        assert_close(sample(SpeedPreset::ReverseRamp, min, max, 0.0), 2.0);
        assert_close(sample(SpeedPreset::ReverseRamp, min, max, 0.5), 1.25);
        assert_close(sample(SpeedPreset::ReverseRamp, min, max, 1.0), 0.5);
    }

    #[test]
    fn test_sample_clamps_progress() {
        assert_close(
            sample(SpeedPreset::EaseIn, 0.5, 2.0, -1.0),
            sample(SpeedPreset::EaseIn, 0.5, 2.0, 0.0),
        );
        assert_close(
            sample(SpeedPreset::EaseIn, 0.5, 2.0, 2.0),
            sample(SpeedPreset::EaseIn, 0.5, 2.0, 1.0),
        );
    }

    #[test]
    fn test_average_speed_constant() {
        assert_close(average_speed(SpeedPreset::Constant, 0.5, 2.0), 2.0);
    }

    #[test]
    fn test_average_speed_linear_ramp() {
        // Linear max→min averages to the midpoint.
        let avg = average_speed(SpeedPreset::ReverseRamp, 0.5, 2.0);
        assert!((avg - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_average_speed_ease_in_matches_closed_form() {
        // ∫ min + (max-min)t² dt = min + (max-min)/3
        let avg = average_speed(SpeedPreset::EaseIn, 0.5, 2.0);
        assert!((avg - (0.5 + 1.5 / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_average_speed_deterministic() {
        let a = average_speed(SpeedPreset::SlowMotionCenter, 0.25, 1.0);
        let b = average_speed(SpeedPreset::SlowMotionCenter, 0.25, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_preset_name_round_trip() {
        for preset in SpeedPreset::all() {
            let parsed: SpeedPreset = preset.as_str().parse().unwrap();
            assert_eq!(parsed, *preset);
        }
        assert!("wobble".parse::<SpeedPreset>().is_err());
    }

    #[test]
    fn test_curve_filter_round_trip() {
        let curve = SpeedCurve::new(SpeedPreset::RampOut, 0.25, 1.75, true);
        let filter = curve.to_filter();

        assert_eq!(filter.name, SPEED_CURVE_FILTER);
        assert_eq!(filter.category, FilterCategory::Time);

        let decoded = SpeedCurve::from_filter(&filter).unwrap();
        assert_eq!(decoded, curve);
    }

    #[test]
    fn test_from_filter_rejects_other_filters() {
        let filter = Filter::reverse();
        assert!(SpeedCurve::from_filter(&filter).is_none());
    }
}
