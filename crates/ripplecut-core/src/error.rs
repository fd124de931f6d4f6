//! Ripplecut Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::{ClipId, FilterId, MarkerId, TimeSec, TrackId};

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Marker not found: {0}")]
    MarkerNotFound(MarkerId),

    #[error("Filter not found on clip {clip_id}: {filter_id}")]
    FilterNotFound {
        clip_id: ClipId,
        filter_id: FilterId,
    },

    // =========================================================================
    // Timeline Errors
    // =========================================================================
    #[error("Invalid time range: {0}~{1} seconds")]
    InvalidTimeRange(TimeSec, TimeSec),

    #[error("Invalid split point: {0} seconds")]
    InvalidSplitPoint(TimeSec),

    #[error(
        "Clip overlap on track {track_id}: {new_start:.3}~{new_end:.3}s conflicts with clip {existing_clip_id}"
    )]
    ClipOverlap {
        track_id: TrackId,
        existing_clip_id: ClipId,
        new_start: TimeSec,
        new_end: TimeSec,
    },

    #[error("Clip {clip_id} has no adjacent clip on its {side} side")]
    NoAdjacentClip { clip_id: ClipId, side: &'static str },

    #[error(
        "Insufficient source material for clip {clip_id}: needs {needed_sec:.3}s, source has {available_sec:.3}s"
    )]
    InsufficientSource {
        clip_id: ClipId,
        needed_sec: TimeSec,
        available_sec: TimeSec,
    },

    #[error("Track is locked: {0}")]
    TrackLocked(TrackId),

    // =========================================================================
    // Command Errors
    // =========================================================================
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
