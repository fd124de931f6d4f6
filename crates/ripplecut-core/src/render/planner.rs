//! Export Planner
//!
//! Converts a timeline snapshot plus an export profile into an ordered,
//! encoder-agnostic render plan. Pure computation: no I/O, no clock reads;
//! identical input always yields an identical plan.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::{Filter, ParamValue, SPEED_CURVE_FILTER};
use crate::remap::SpeedCurve;
use crate::render::{ExportProfile, OutputGeometry};
use crate::timeline::{BlendMode, Clip, Timeline, Track, TrackKind};
use crate::{ClipId, TimeSec, TrackId};

// =============================================================================
// Plan Types
// =============================================================================

/// Planner failure
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No clips to export")]
    NoClips,
    #[error("Invalid segment for clip {clip_id}: {reason}")]
    InvalidSegment { clip_id: ClipId, reason: String },
}

/// One source segment of a planned track, in timeline order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSegment {
    pub clip_id: ClipId,
    pub name: String,
    /// Media reference; empty for generated content
    pub source_path: String,
    /// Resolved trim window
    pub source_in_sec: TimeSec,
    pub source_out_sec: TimeSec,
    /// Placement on the output timeline
    pub start_sec: TimeSec,
    pub duration_sec: TimeSec,
    /// Effective scalar speed (curve remaps resolved to their average)
    pub speed: f64,
    pub preserve_pitch: bool,
    pub volume: f32,
    pub is_freeze: bool,
    /// Source offset held when `is_freeze` is set
    pub freeze_at_sec: TimeSec,
    /// Enabled filters in render order, with expressions resolved
    pub filters: Vec<Filter>,
}

/// One planned track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTrack {
    pub track_id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    pub muted: bool,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub segments: Vec<PlanSegment>,
}

/// The encoder-agnostic render plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub output: OutputGeometry,
    /// Total planned duration
    pub duration_sec: TimeSec,
    pub tracks: Vec<PlanTrack>,
}

// =============================================================================
// Plan Construction
// =============================================================================

/// Builds a render plan from a timeline snapshot and an export profile.
///
/// Hidden tracks are omitted; muted tracks are planned with `muted: true`.
/// Returns [`PlanError::NoClips`] when every track is empty, and
/// [`PlanError::InvalidSegment`] for any clip whose resolved window or
/// duration is non-positive.
pub fn build_plan(timeline: &Timeline, profile: &ExportProfile) -> Result<RenderPlan, PlanError> {
    if timeline.tracks.iter().all(|t| t.clips.is_empty()) {
        return Err(PlanError::NoClips);
    }

    let geometry = profile.geometry();
    let mut tracks = Vec::new();

    for track in &timeline.tracks {
        if track.hidden {
            continue;
        }
        tracks.push(plan_track(track, &geometry)?);
    }

    Ok(RenderPlan {
        output: geometry,
        duration_sec: timeline.duration_sec,
        tracks,
    })
}

fn plan_track(track: &Track, geometry: &OutputGeometry) -> Result<PlanTrack, PlanError> {
    // Snapshot and sort for a deterministic segment order even if the
    // caller bypassed sorted insertion.
    let mut clips = track.clips.clone();
    clips.sort_by(|a, b| {
        a.place
            .timeline_in_sec
            .total_cmp(&b.place.timeline_in_sec)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut segments = Vec::with_capacity(clips.len());
    for clip in &clips {
        segments.push(plan_segment(clip, geometry)?);
    }

    Ok(PlanTrack {
        track_id: track.id.clone(),
        name: track.name.clone(),
        kind: track.kind.clone(),
        muted: track.muted,
        opacity: track.opacity,
        blend_mode: track.blend_mode.clone(),
        segments,
    })
}

fn plan_segment(clip: &Clip, geometry: &OutputGeometry) -> Result<PlanSegment, PlanError> {
    let invalid = |reason: &str| PlanError::InvalidSegment {
        clip_id: clip.id.clone(),
        reason: reason.to_string(),
    };

    if !clip.place.duration_sec.is_finite() || clip.place.duration_sec <= 0.0 {
        return Err(invalid("duration must be > 0"));
    }
    if clip.range.source_out_sec - clip.range.source_in_sec <= 0.0
        || clip.range.source_in_sec < 0.0
    {
        return Err(invalid("resolved source window must be > 0"));
    }
    if !clip.speed.is_finite() || clip.speed <= 0.0 {
        return Err(invalid("speed must be > 0"));
    }

    // A curve remap resolves to its effective average speed.
    let speed = clip
        .filters
        .iter()
        .filter(|f| f.enabled && f.name == SPEED_CURVE_FILTER)
        .find_map(SpeedCurve::from_filter)
        .map(|curve| curve.average())
        .unwrap_or(clip.speed);

    // Disabled filters are dropped; order is render order.
    let filters = clip
        .filters
        .iter()
        .filter(|f| f.enabled)
        .map(|f| resolve_filter(f, geometry))
        .collect();

    Ok(PlanSegment {
        clip_id: clip.id.clone(),
        name: clip.name.clone(),
        source_path: clip.source_path.clone(),
        source_in_sec: clip.range.source_in_sec,
        source_out_sec: clip.range.source_out_sec,
        start_sec: clip.place.timeline_in_sec,
        duration_sec: clip.place.duration_sec,
        speed,
        preserve_pitch: clip.preserve_pitch,
        volume: clip.volume,
        is_freeze: clip.is_freeze_frame,
        freeze_at_sec: clip.freeze_at_sec,
        filters,
    })
}

// =============================================================================
// Expression Resolution
// =============================================================================

fn position_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Drawtext-style placement: (w-text_w)*X or (h-text_h)*Y
        Regex::new(r"^\((w)-text_w\)\*([0-9]*\.?[0-9]+)$|^\((h)-text_h\)\*([0-9]*\.?[0-9]+)$")
            .expect("position expression regex is valid")
    })
}

/// Resolves a drawtext-style position expression against the output
/// geometry: the symbolic canvas dimension becomes a concrete pixel count.
/// Expressions that do not match the known shape pass through unchanged.
pub fn resolve_position_expr(expr: &str, geometry: &OutputGeometry) -> String {
    let Some(captures) = position_expr_regex().captures(expr.trim()) else {
        return expr.to_string();
    };

    if captures.get(1).is_some() {
        let factor = &captures[2];
        format!("({}-text_w)*{}", geometry.width, factor)
    } else {
        let factor = &captures[4];
        format!("({}-text_h)*{}", geometry.height, factor)
    }
}

/// Deep-copies a filter with every float-expression parameter resolved
/// against the output geometry.
fn resolve_filter(filter: &Filter, geometry: &OutputGeometry) -> Filter {
    let mut resolved = filter.clone();
    for param in &mut resolved.parameters {
        if let ParamValue::FloatExpr(expr) = &param.value {
            param.value = ParamValue::FloatExpr(resolve_position_expr(expr, geometry));
        }
    }
    resolved
}

// =============================================================================
// Tests
// =============================================================================
