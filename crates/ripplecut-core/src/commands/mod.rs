//! Edit Commands Module
//!
//! All timeline mutations go through commands: validated, undoable,
//! serializable operations on the timeline document.

mod clip;
mod executor;
mod filter;
mod marker;
mod speed;
mod track;
mod traits;
mod trim;

pub use clip::*;
pub use executor::*;
pub use filter::*;
pub use marker::*;
pub use speed::*;
pub use track::*;
pub use traits::*;
pub use trim::*;

use crate::timeline::Timeline;
use crate::{CoreError, CoreResult, TimeSec};

pub(crate) fn is_valid_time_sec(value: TimeSec) -> bool {
    value.is_finite() && value >= 0.0
}

/// Locates a clip as (track index, clip index), failing when the clip is
/// missing or its track is locked.
pub(crate) fn locate_on_unlocked_track(
    timeline: &Timeline,
    clip_id: &str,
) -> CoreResult<(usize, usize)> {
    let (t_idx, c_idx) = timeline
        .find_clip_location(clip_id)
        .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;
    let track = &timeline.tracks[t_idx];
    if track.locked {
        return Err(CoreError::TrackLocked(track.id.clone()));
    }
    Ok((t_idx, c_idx))
}
