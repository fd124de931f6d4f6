//! Filter Model Definitions
//!
//! Defines named, parameterized effects attached to clips. A clip's filter
//! list is ordered; order is render order and is preserved through
//! copy/paste.

use serde::{Deserialize, Serialize};

use crate::{Color, FilterId};

/// Well-known filter name: playback direction reversal.
pub const REVERSE_FILTER: &str = "reverse";
/// Well-known filter name: curve-based time remap.
pub const SPEED_CURVE_FILTER: &str = "speed_curve";
/// Well-known filter name: generated text overlay.
pub const DRAWTEXT_FILTER: &str = "drawtext";

// =============================================================================
// Filter Category
// =============================================================================

/// Categories of filters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    /// Time manipulation (speed curves, reverse)
    Time,
    /// Overlay content (text, graphics)
    Overlay,
    /// Color adjustments
    Color,
    /// Audio processing
    Audio,
    /// Anything else
    Custom,
}

// =============================================================================
// Filter Parameters
// =============================================================================

/// Filter parameter value. A closed sum so parameter validation can be
/// exhaustive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Color(Color),
    /// A deferred numeric expression, e.g. a drawtext position such as
    /// `(w-text_w)*0.50`, resolved by the export planner.
    FloatExpr(String),
}

impl ParamValue {
    /// Attempts to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get as a color reference
    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Attempts to get as an expression string
    pub fn as_expr(&self) -> Option<&str> {
        match self {
            Self::FloatExpr(e) => Some(e),
            _ => None,
        }
    }
}

/// A named filter parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParam {
    pub name: String,
    pub value: ParamValue,
}

impl FilterParam {
    pub fn new(name: &str, value: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A filter instance applied to a clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: FilterId,
    /// Machine name (e.g. "reverse", "speed_curve", "drawtext")
    pub name: String,
    /// Human-readable name shown in UIs
    pub display_name: String,
    pub category: FilterCategory,
    /// Ordered parameter list
    pub parameters: Vec<FilterParam>,
    pub enabled: bool,
    pub favorite: bool,
}

impl Filter {
    /// Creates a new enabled filter with no parameters
    pub fn new(name: &str, display_name: &str, category: FilterCategory) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            category,
            parameters: vec![],
            enabled: true,
            favorite: false,
        }
    }

    /// Adds a parameter (builder style)
    pub fn with_param(mut self, name: &str, value: ParamValue) -> Self {
        self.set_param(name, value);
        self
    }

    /// Gets a parameter value by name
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Sets a parameter value, replacing in place to preserve order, or
    /// appending when new.
    pub fn set_param(&mut self, name: &str, value: ParamValue) {
        if let Some(param) = self.parameters.iter_mut().find(|p| p.name == name) {
            param.value = value;
        } else {
            self.parameters.push(FilterParam::new(name, value));
        }
    }

    /// Deep clone with a fresh ID. Later mutation of the original never
    /// affects the clone.
    pub fn deep_clone(&self) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            ..self.clone()
        }
    }

    /// Enables or disables the filter in place. Idempotent.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flips the favorite flag in place.
    pub fn toggle_favorite(&mut self) {
        self.favorite = !self.favorite;
    }

    // =========================================================================
    // Well-known constructors
    // =========================================================================

    /// Playback direction reversal. Carries no parameters; presence is the
    /// whole effect.
    pub fn reverse() -> Self {
        Self::new(REVERSE_FILTER, "Reverse", FilterCategory::Time)
    }

    /// A generated text overlay with drawtext-style position expressions.
    ///
    /// `x_frac`/`y_frac` are normalized placements; they are stored as
    /// deferred expressions and resolved against the output geometry by the
    /// export planner.
    pub fn drawtext(text: &str, x_frac: f64, y_frac: f64) -> Self {
        Self::new(DRAWTEXT_FILTER, "Text", FilterCategory::Overlay)
            .with_param("text", ParamValue::String(text.to_string()))
            .with_param(
                "x",
                ParamValue::FloatExpr(format!("(w-text_w)*{:.2}", x_frac.clamp(0.0, 1.0))),
            )
            .with_param(
                "y",
                ParamValue::FloatExpr(format!("(h-text_h)*{:.2}", y_frac.clamp(0.0, 1.0))),
            )
            .with_param("color", ParamValue::Color(Color::white()))
            .with_param("size", ParamValue::Integer(48))
    }
}

// =============================================================================
// Tests
// =============================================================================
