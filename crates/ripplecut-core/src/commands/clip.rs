//! Clip Commands Module
//!
//! Implements clip placement, removal, ripple delete, split and
//! freeze-frame insertion.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{is_valid_time_sec, Command, CommandResult, StateChange},
    timeline::{Clip, ClipPlace, SourceRange, Timeline, TIME_EPSILON},
    ClipId, CoreError, CoreResult, TimeSec, TrackId,
};

fn require_unlocked(timeline: &Timeline, track_id: &str) -> CoreResult<()> {
    let track = timeline
        .get_track(track_id)
        .ok_or_else(|| CoreError::TrackNotFound(track_id.to_string()))?;
    if track.locked {
        return Err(CoreError::TrackLocked(track.id.clone()));
    }
    Ok(())
}

// =============================================================================
// InsertClipCommand
// =============================================================================

/// Command to insert a new clip into a track.
///
/// The caller supplies the probe-resolved source duration; the core never
/// probes media itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertClipCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Clip display name
    pub name: String,
    /// Media reference; empty for generated content
    pub source_path: String,
    /// Timeline position to insert at
    pub timeline_start: TimeSec,
    /// Source trim window
    pub source_in: TimeSec,
    pub source_out: TimeSec,
    /// Probe-resolved source duration (0 = unconstrained/generated)
    pub source_duration: TimeSec,
    /// Created clip ID (stored after execution for undo)
    #[serde(skip)]
    created_clip_id: Option<ClipId>,
}

impl InsertClipCommand {
    /// Creates a new insert clip command
    pub fn new(
        track_id: &str,
        name: &str,
        source_path: &str,
        timeline_start: TimeSec,
        source_in: TimeSec,
        source_out: TimeSec,
    ) -> Self {
        Self {
            track_id: track_id.to_string(),
            name: name.to_string(),
            source_path: source_path.to_string(),
            timeline_start,
            source_in,
            source_out,
            source_duration: 0.0,
            created_clip_id: None,
        }
    }

    /// Sets the probe-resolved source duration
    pub fn with_source_duration(mut self, source_duration: TimeSec) -> Self {
        self.source_duration = source_duration;
        self
    }
}

impl Command for InsertClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.timeline_start) {
            return Err(CoreError::ValidationError(
                "timelineStart must be finite and non-negative".to_string(),
            ));
        }
        if !is_valid_time_sec(self.source_in) || !is_valid_time_sec(self.source_out) {
            return Err(CoreError::ValidationError(
                "Source range must be finite and non-negative".to_string(),
            ));
        }
        if self.source_in >= self.source_out {
            return Err(CoreError::InvalidTimeRange(self.source_in, self.source_out));
        }

        require_unlocked(timeline, &self.track_id)?;

        let mut clip = Clip::new(&self.name, &self.source_path)
            .with_source_duration(self.source_duration)
            .with_source_range(self.source_in, self.source_out)
            .place_at(self.timeline_start);
        clip.validate()?;

        // Reuse the clip ID on redo so undo/redo stay symmetric.
        if let Some(id) = &self.created_clip_id {
            clip.id = id.clone();
        }
        let clip_id = clip.id.clone();
        self.created_clip_id = Some(clip_id.clone());

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        track.validate_no_overlap(&clip.place, None)?;
        track.insert_clip_sorted(clip);

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::ClipCreated {
                clip_id: clip_id.clone(),
            })
            .with_created_id(&clip_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(clip_id) = &self.created_clip_id {
            if let Some(track) = timeline.get_track_mut(&self.track_id) {
                track.clips.retain(|c| &c.id != clip_id);
            }
            timeline.recalculate_duration();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "InsertClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RemoveClipCommand
// =============================================================================

/// Command to remove a clip from a track without rippling siblings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveClipCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Clip ID to remove
    pub clip_id: ClipId,
    /// Stored clip data for undo
    #[serde(skip)]
    removed_clip: Option<Clip>,
}

impl RemoveClipCommand {
    /// Creates a new remove clip command
    pub fn new(track_id: &str, clip_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            clip_id: clip_id.to_string(),
            removed_clip: None,
        }
    }
}

impl Command for RemoveClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_unlocked(timeline, &self.track_id)?;

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        let removed = track
            .remove_clip(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;
        self.removed_clip = Some(removed);

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::ClipDeleted {
                clip_id: self.clip_id.clone(),
            })
            .with_deleted_id(&self.clip_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(clip) = &self.removed_clip {
            if let Some(track) = timeline.get_track_mut(&self.track_id) {
                track.insert_clip_sorted(clip.clone());
            }
            timeline.recalculate_duration();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RemoveClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RippleDeleteCommand
// =============================================================================

/// Command to remove a clip and close the gap: every later clip on the same
/// track shifts left by the removed clip's duration. Other tracks are
/// untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RippleDeleteCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Clip ID to remove
    pub clip_id: ClipId,
    /// Stored clip data for undo
    #[serde(skip)]
    removed_clip: Option<Clip>,
    /// Clips shifted left during execution (for undo)
    #[serde(skip)]
    shifted_clip_ids: Vec<ClipId>,
}

impl RippleDeleteCommand {
    /// Creates a new ripple delete command
    pub fn new(track_id: &str, clip_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            clip_id: clip_id.to_string(),
            removed_clip: None,
            shifted_clip_ids: vec![],
        }
    }
}

impl Command for RippleDeleteCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_unlocked(timeline, &self.track_id)?;

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        let clip_pos = track
            .clip_index(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        let removed = track.clips.remove(clip_pos);
        let gap_start = removed.place.timeline_in_sec;
        let gap = removed.place.duration_sec;

        self.shifted_clip_ids.clear();
        for clip in &mut track.clips {
            if clip.place.timeline_in_sec > gap_start - TIME_EPSILON {
                clip.place.timeline_in_sec -= gap;
                self.shifted_clip_ids.push(clip.id.clone());
            }
        }
        track.sort_clips();

        self.removed_clip = Some(removed);

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::ClipDeleted {
                clip_id: self.clip_id.clone(),
            })
            .with_change(StateChange::TrackModified {
                track_id: self.track_id.clone(),
            })
            .with_deleted_id(&self.clip_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let Some(removed) = &self.removed_clip else {
            return Ok(());
        };

        if let Some(track) = timeline.get_track_mut(&self.track_id) {
            let gap = removed.place.duration_sec;
            for clip in &mut track.clips {
                if self.shifted_clip_ids.contains(&clip.id) {
                    clip.place.timeline_in_sec += gap;
                }
            }
            track.insert_clip_sorted(removed.clone());
        }

        timeline.recalculate_duration();
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RippleDelete"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// MoveClipCommand
// =============================================================================

/// Command to move a clip to a new position, optionally across tracks
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveClipCommand {
    /// Clip ID to move
    pub clip_id: ClipId,
    /// New timeline position
    pub new_timeline_in: TimeSec,
    /// New track ID (optional, for cross-track moves)
    pub new_track_id: Option<TrackId>,
    /// Previous position (for undo)
    #[serde(skip)]
    old_timeline_in: Option<TimeSec>,
    /// Previous track (for undo)
    #[serde(skip)]
    old_track_id: Option<TrackId>,
}

impl MoveClipCommand {
    /// Creates a new move clip command
    pub fn new(clip_id: &str, new_timeline_in: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            new_timeline_in,
            new_track_id: None,
            old_timeline_in: None,
            old_track_id: None,
        }
    }

    /// Sets the target track for cross-track moves
    pub fn to_track(mut self, track_id: &str) -> Self {
        self.new_track_id = Some(track_id.to_string());
        self
    }
}

impl Command for MoveClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.new_timeline_in) {
            return Err(CoreError::ValidationError(
                "newTimelineIn must be finite and non-negative".to_string(),
            ));
        }

        let (src_track_idx, clip_idx) = timeline
            .find_clip_location(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        let src_track_id = timeline.tracks[src_track_idx].id.clone();
        require_unlocked(timeline, &src_track_id)?;

        let dest_track_idx = if let Some(new_track_id) = &self.new_track_id {
            let idx = timeline
                .tracks
                .iter()
                .position(|t| &t.id == new_track_id)
                .ok_or_else(|| CoreError::TrackNotFound(new_track_id.clone()))?;
            require_unlocked(timeline, new_track_id)?;
            idx
        } else {
            src_track_idx
        };

        // Validate overlap BEFORE mutating state.
        let mut candidate_place = timeline.tracks[src_track_idx].clips[clip_idx].place.clone();
        let old_timeline_in = candidate_place.timeline_in_sec;
        candidate_place.timeline_in_sec = self.new_timeline_in;

        if dest_track_idx == src_track_idx {
            timeline.tracks[src_track_idx]
                .validate_no_overlap(&candidate_place, Some(&self.clip_id))?;
        } else {
            timeline.tracks[dest_track_idx].validate_no_overlap(&candidate_place, None)?;
        }

        self.old_timeline_in = Some(old_timeline_in);
        self.old_track_id = Some(src_track_id);

        // Apply move.
        let mut clip = timeline.tracks[src_track_idx].clips.remove(clip_idx);
        clip.place.timeline_in_sec = self.new_timeline_in;
        timeline.tracks[dest_track_idx].insert_clip_sorted(clip);

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let (Some(old_pos), Some(old_track_id)) = (self.old_timeline_in, &self.old_track_id)
        else {
            return Ok(());
        };

        let Some((current_track_idx, clip_idx)) = timeline.find_clip_location(&self.clip_id)
        else {
            return Ok(());
        };

        let Some(orig_idx) = timeline.tracks.iter().position(|t| &t.id == old_track_id) else {
            return Ok(());
        };

        let mut clip = timeline.tracks[current_track_idx].clips.remove(clip_idx);
        clip.place.timeline_in_sec = old_pos;
        timeline.tracks[orig_idx].insert_clip_sorted(clip);

        timeline.recalculate_duration();
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "MoveClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SplitClipCommand
// =============================================================================

/// Command to split a clip at a given timeline position.
///
/// Produces two clips whose combined duration equals the original's; the
/// right clip inherits the original's filters (deep clones) and speed.
/// No sibling ripples.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitClipCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Clip ID to split
    pub clip_id: ClipId,
    /// Time to split at (timeline time, strictly inside the clip)
    pub split_at: TimeSec,
    /// Created clip ID (second half)
    #[serde(skip)]
    created_clip_id: Option<ClipId>,
    /// Original clip data (for undo)
    #[serde(skip)]
    original_clip: Option<Clip>,
}

impl SplitClipCommand {
    /// Creates a new split clip command
    pub fn new(track_id: &str, clip_id: &str, split_at: TimeSec) -> Self {
        Self {
            track_id: track_id.to_string(),
            clip_id: clip_id.to_string(),
            split_at,
            created_clip_id: None,
            original_clip: None,
        }
    }
}

/// Splits `original` at timeline position `split_at`, returning the
/// truncated left clip and the newly created right clip.
pub(crate) fn split_clip_at(original: &Clip, split_at: TimeSec) -> CoreResult<(Clip, Clip)> {
    let clip_start = original.place.timeline_in_sec;
    let clip_end = original.place.timeline_out_sec();

    if split_at <= clip_start + TIME_EPSILON || split_at >= clip_end - TIME_EPSILON {
        return Err(CoreError::InvalidSplitPoint(split_at));
    }

    // Timeline seconds advance `speed` source seconds each.
    let relative_split = split_at - clip_start;
    let source_split = original.range.source_in_sec + relative_split * original.speed;

    let mut left = original.clone();
    left.range.source_out_sec = source_split;
    left.place.duration_sec = relative_split;

    let mut right = original.clone();
    right.id = ulid::Ulid::new().to_string();
    right.filters = original.cloned_filters();
    right.range = SourceRange::new(source_split, original.range.source_out_sec);
    right.place = ClipPlace::new(split_at, clip_end - split_at);

    if left.place.duration_sec <= 0.0 || right.place.duration_sec <= 0.0 {
        return Err(CoreError::InvalidSplitPoint(split_at));
    }

    Ok((left, right))
}

impl Command for SplitClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_unlocked(timeline, &self.track_id)?;

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        let clip_idx = track
            .clip_index(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        let original = track.clips[clip_idx].clone();
        let (left, mut right) = split_clip_at(&original, self.split_at)?;

        // Reuse the right-half ID on redo so undo/redo stay symmetric.
        if let Some(id) = &self.created_clip_id {
            right.id = id.clone();
        }
        let right_id = right.id.clone();

        self.original_clip = Some(original);
        self.created_clip_id = Some(right_id.clone());

        track.clips[clip_idx] = left;
        track.insert_clip_sorted(right);

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: right_id.clone(),
            })
            .with_created_id(&right_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let (Some(original), Some(created_id)) = (&self.original_clip, &self.created_clip_id) {
            if let Some(track) = timeline.get_track_mut(&self.track_id) {
                track.clips.retain(|c| &c.id != created_id);
                if let Some(clip) = track.get_clip_mut(&self.clip_id) {
                    *clip = original.clone();
                }
                track.sort_clips();
            }
            timeline.recalculate_duration();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SplitClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// FreezeFrameCommand
// =============================================================================

/// Command to insert a freeze frame inside a clip.
///
/// Splits the clip at the freeze point, inserts a synthetic one-frame hold
/// clip of the requested duration between the halves, and ripples every
/// later clip on the track right by that duration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeFrameCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Clip ID to freeze
    pub clip_id: ClipId,
    /// Freeze point (timeline time, strictly inside the clip)
    pub freeze_at: TimeSec,
    /// How long the frame is held
    pub hold_duration: TimeSec,
    /// Created clip IDs: (freeze clip, right half)
    #[serde(skip)]
    created_ids: Option<(ClipId, ClipId)>,
    /// Original clip data (for undo)
    #[serde(skip)]
    original_clip: Option<Clip>,
    /// Clips rippled right during execution (for undo)
    #[serde(skip)]
    shifted_clip_ids: Vec<ClipId>,
}

impl FreezeFrameCommand {
    /// Creates a new freeze frame command
    pub fn new(track_id: &str, clip_id: &str, freeze_at: TimeSec, hold_duration: TimeSec) -> Self {
        Self {
            track_id: track_id.to_string(),
            clip_id: clip_id.to_string(),
            freeze_at,
            hold_duration,
            created_ids: None,
            original_clip: None,
            shifted_clip_ids: vec![],
        }
    }
}

impl Command for FreezeFrameCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !self.hold_duration.is_finite() || self.hold_duration <= 0.0 {
            return Err(CoreError::ValidationError(
                "holdDuration must be finite and > 0".to_string(),
            ));
        }

        let frame = timeline.frame_duration_sec();
        if frame <= 0.0 {
            return Err(CoreError::ValidationError(
                "Timeline frame rate must be positive".to_string(),
            ));
        }

        require_unlocked(timeline, &self.track_id)?;

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        let clip_idx = track
            .clip_index(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        let original = track.clips[clip_idx].clone();
        let (left, mut right) = split_clip_at(&original, self.freeze_at)?;

        let source_offset = original.timeline_to_source(self.freeze_at);
        let mut freeze = Clip::new(&original.name, &original.source_path);
        freeze.is_freeze_frame = true;
        freeze.freeze_at_sec = source_offset;
        freeze.source_duration_sec = original.source_duration_sec;
        freeze.volume = original.volume;
        freeze.filters = original.cloned_filters();
        // One source frame held for the requested duration; the hold is
        // not subject to the clip speed relation.
        freeze.range = SourceRange::new(source_offset, source_offset + frame);
        freeze.place = ClipPlace::new(self.freeze_at, self.hold_duration);

        right.place.timeline_in_sec = self.freeze_at + self.hold_duration;

        // Reuse IDs on redo so undo/redo stay symmetric.
        if let Some((freeze_id, right_id)) = &self.created_ids {
            freeze.id = freeze_id.clone();
            right.id = right_id.clone();
        }
        let freeze_id = freeze.id.clone();
        let right_id = right.id.clone();

        // Ripple everything after the original clip right by the hold.
        let original_end = original.place.timeline_out_sec();
        self.shifted_clip_ids.clear();
        for clip in &mut track.clips {
            if clip.id != self.clip_id
                && clip.place.timeline_in_sec > original_end - TIME_EPSILON
            {
                clip.place.timeline_in_sec += self.hold_duration;
                self.shifted_clip_ids.push(clip.id.clone());
            }
        }

        track.clips[clip_idx] = left;
        track.insert_clip_sorted(freeze);
        track.insert_clip_sorted(right);

        self.original_clip = Some(original);
        self.created_ids = Some((freeze_id.clone(), right_id.clone()));

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: freeze_id.clone(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: right_id.clone(),
            })
            .with_change(StateChange::TrackModified {
                track_id: self.track_id.clone(),
            })
            .with_created_id(&freeze_id)
            .with_created_id(&right_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let (Some(original), Some((freeze_id, right_id))) =
            (&self.original_clip, &self.created_ids)
        else {
            return Ok(());
        };

        if let Some(track) = timeline.get_track_mut(&self.track_id) {
            track
                .clips
                .retain(|c| &c.id != freeze_id && &c.id != right_id);
            for clip in &mut track.clips {
                if self.shifted_clip_ids.contains(&clip.id) {
                    clip.place.timeline_in_sec -= self.hold_duration;
                }
            }
            if let Some(clip) = track.get_clip_mut(&self.clip_id) {
                *clip = original.clone();
            }
            track.sort_clips();
        }

        timeline.recalculate_duration();
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "FreezeFrame"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ratio;

    fn timeline_with_track() -> (Timeline, TrackId) {
        let mut timeline = Timeline::new("Main", Ratio::new(25, 1));
        let track = crate::timeline::Track::new_video("Video 1");
        let track_id = track.id.clone();
        timeline.add_track(track);
        (timeline, track_id)
    }

    fn insert(
        timeline: &mut Timeline,
        track_id: &str,
        name: &str,
        start: TimeSec,
        source_in: TimeSec,
        source_out: TimeSec,
    ) -> ClipId {
        let mut cmd = InsertClipCommand::new(
            track_id,
            name,
            "/media/source.mp4",
            start,
            source_in,
            source_out,
        )
        .with_source_duration(120.0);
        let result = cmd.execute(timeline).unwrap();
        result.created_ids[0].clone()
    }

    #[test]
    fn test_insert_clip_command() {
        let (mut timeline, track_id) = timeline_with_track();

        let clip_id = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips.len(), 1);
        assert_eq!(track.clips[0].id, clip_id);
        assert_eq!(timeline.duration_sec, 10.0);
    }

    #[test]
    fn test_insert_clip_rejects_overlap() {
        let (mut timeline, track_id) = timeline_with_track();
        insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);

        let mut cmd =
            InsertClipCommand::new(&track_id, "b", "/media/source.mp4", 5.0, 0.0, 10.0);
        assert!(matches!(
            cmd.execute(&mut timeline),
            Err(CoreError::ClipOverlap { .. })
        ));

        // Model unchanged on failure.
        assert_eq!(timeline.get_track(&track_id).unwrap().clips.len(), 1);
        assert_eq!(timeline.duration_sec, 10.0);
    }

    #[test]
    fn test_insert_clip_rejects_range_beyond_source() {
        let (mut timeline, track_id) = timeline_with_track();

        let mut cmd = InsertClipCommand::new(&track_id, "a", "/media/s.mp4", 0.0, 0.0, 30.0)
            .with_source_duration(20.0);
        assert!(matches!(
            cmd.execute(&mut timeline),
            Err(CoreError::InsufficientSource { .. })
        ));
    }

    #[test]
    fn test_insert_clip_rejects_locked_track() {
        let (mut timeline, track_id) = timeline_with_track();
        timeline.get_track_mut(&track_id).unwrap().locked = true;

        let mut cmd = InsertClipCommand::new(&track_id, "a", "/media/s.mp4", 0.0, 0.0, 5.0);
        assert!(matches!(
            cmd.execute(&mut timeline),
            Err(CoreError::TrackLocked(_))
        ));
    }

    #[test]
    fn test_insert_undo() {
        let (mut timeline, track_id) = timeline_with_track();

        let mut cmd =
            InsertClipCommand::new(&track_id, "a", "/media/s.mp4", 0.0, 0.0, 10.0);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        assert!(timeline.get_track(&track_id).unwrap().clips.is_empty());
        assert_eq!(timeline.duration_sec, 0.0);
    }

    #[test]
    fn test_ripple_delete_shifts_later_clips() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0);
        let c = insert(&mut timeline, &track_id, "c", 20.0, 0.0, 5.0);

        let mut cmd = RippleDeleteCommand::new(&track_id, &a);
        cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips.len(), 2);
        assert_eq!(track.get_clip(&b).unwrap().place.timeline_in_sec, 0.0);
        // The gap after b is preserved; c shifts by exactly a's duration.
        assert_eq!(track.get_clip(&c).unwrap().place.timeline_in_sec, 10.0);
        assert_eq!(timeline.duration_sec, 15.0);
    }

    #[test]
    fn test_ripple_delete_only_affects_owning_track() {
        let (mut timeline, track_id) = timeline_with_track();
        let other = crate::timeline::Track::new_video("Video 2");
        let other_id = other.id.clone();
        timeline.add_track(other);

        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let x = insert(&mut timeline, &other_id, "x", 12.0, 0.0, 5.0);

        let mut cmd = RippleDeleteCommand::new(&track_id, &a);
        cmd.execute(&mut timeline).unwrap();

        let other = timeline.get_track(&other_id).unwrap();
        assert_eq!(other.get_clip(&x).unwrap().place.timeline_in_sec, 12.0);
    }

    #[test]
    fn test_ripple_delete_last_clip_empties_timeline() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 20.0);

        let mut cmd = RippleDeleteCommand::new(&track_id, &a);
        cmd.execute(&mut timeline).unwrap();

        assert!(timeline.get_track(&track_id).unwrap().clips.is_empty());
        assert_eq!(timeline.duration_sec, 0.0);
    }

    #[test]
    fn test_ripple_delete_undo_restores_positions() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0);

        let mut cmd = RippleDeleteCommand::new(&track_id, &a);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips.len(), 2);
        assert_eq!(track.get_clip(&a).unwrap().place.timeline_in_sec, 0.0);
        assert_eq!(track.get_clip(&b).unwrap().place.timeline_in_sec, 10.0);
    }

    #[test]
    fn test_move_clip_command() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);

        let mut cmd = MoveClipCommand::new(&a, 15.0);
        cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.get_clip(&a).unwrap().place.timeline_in_sec, 15.0);
        assert_eq!(timeline.duration_sec, 25.0);

        cmd.undo(&mut timeline).unwrap();
        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.get_clip(&a).unwrap().place.timeline_in_sec, 0.0);
    }

    #[test]
    fn test_move_clip_across_tracks() {
        let (mut timeline, track_id) = timeline_with_track();
        let other = crate::timeline::Track::new_video("Video 2");
        let other_id = other.id.clone();
        timeline.add_track(other);

        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);

        let mut cmd = MoveClipCommand::new(&a, 3.0).to_track(&other_id);
        cmd.execute(&mut timeline).unwrap();

        assert!(timeline.get_track(&track_id).unwrap().clips.is_empty());
        let other = timeline.get_track(&other_id).unwrap();
        assert_eq!(other.get_clip(&a).unwrap().place.timeline_in_sec, 3.0);

        cmd.undo(&mut timeline).unwrap();
        assert!(timeline.get_track(&other_id).unwrap().clips.is_empty());
        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.get_clip(&a).unwrap().place.timeline_in_sec, 0.0);
    }

    #[test]
    fn test_split_clip_preserves_durations() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 2.0, 12.0);

        let mut cmd = SplitClipCommand::new(&track_id, &a, 4.0);
        let result = cmd.execute(&mut timeline).unwrap();
        let right_id = &result.created_ids[0];

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips.len(), 2);

        let left = track.get_clip(&a).unwrap();
        let right = track.get_clip(right_id).unwrap();

        assert_eq!(left.place.duration_sec + right.place.duration_sec, 10.0);
        assert_eq!(left.range.source_in_sec, 2.0);
        assert_eq!(left.range.source_out_sec, 6.0);
        assert_eq!(right.place.timeline_in_sec, 4.0);
        assert_eq!(right.range.source_in_sec, 6.0);
        // Right half keeps the original's source out point.
        assert_eq!(right.range.source_out_sec, 12.0);
        assert_eq!(timeline.duration_sec, 10.0);
    }

    #[test]
    fn test_split_clip_speed_aware_source_point() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        {
            let track = timeline.get_track_mut(&track_id).unwrap();
            let clip = track.get_clip_mut(&a).unwrap();
            clip.speed = 2.0;
            clip.place.duration_sec = clip.expected_duration(); // 5s on timeline
        }
        timeline.recalculate_duration();

        let mut cmd = SplitClipCommand::new(&track_id, &a, 2.0);
        let result = cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        let right = track.get_clip(&result.created_ids[0]).unwrap();
        // Two timeline seconds at 2x consumed four source seconds.
        assert_eq!(right.range.source_in_sec, 4.0);
        assert_eq!(right.speed, 2.0);
    }

    #[test]
    fn test_split_clip_inherits_filters_independently() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        {
            let track = timeline.get_track_mut(&track_id).unwrap();
            track
                .get_clip_mut(&a)
                .unwrap()
                .filters
                .push(crate::filters::Filter::reverse());
        }

        let mut cmd = SplitClipCommand::new(&track_id, &a, 5.0);
        let result = cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        let left = track.get_clip(&a).unwrap();
        let right = track.get_clip(&result.created_ids[0]).unwrap();

        assert_eq!(left.filters.len(), 1);
        assert_eq!(right.filters.len(), 1);
        assert_eq!(right.filters[0].name, left.filters[0].name);
        assert_ne!(right.filters[0].id, left.filters[0].id);
    }

    #[test]
    fn test_split_clip_invalid_point() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 5.0, 0.0, 10.0);

        for at in [3.0, 5.0, 15.0, 20.0] {
            let mut cmd = SplitClipCommand::new(&track_id, &a, at);
            assert!(matches!(
                cmd.execute(&mut timeline),
                Err(CoreError::InvalidSplitPoint(_))
            ));
        }
        assert_eq!(timeline.get_track(&track_id).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_split_undo_restores_original() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let before = timeline.get_track(&track_id).unwrap().clips.clone();

        let mut cmd = SplitClipCommand::new(&track_id, &a, 5.0);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        assert_eq!(timeline.get_track(&track_id).unwrap().clips, before);
    }

    #[test]
    fn test_freeze_frame_insertion() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0);

        let mut cmd = FreezeFrameCommand::new(&track_id, &a, 4.0, 2.0);
        let result = cmd.execute(&mut timeline).unwrap();
        assert_eq!(result.created_ids.len(), 2);

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips.len(), 4);

        // Left half ends at the freeze point.
        let left = track.get_clip(&a).unwrap();
        assert_eq!(left.place.timeline_out_sec(), 4.0);

        // Freeze clip holds the source frame at the freeze offset.
        let freeze = &track.clips[1];
        assert!(freeze.is_freeze_frame);
        assert_eq!(freeze.freeze_at_sec, 4.0);
        assert_eq!(freeze.place.timeline_in_sec, 4.0);
        assert_eq!(freeze.place.duration_sec, 2.0);
        assert!((freeze.range.duration() - timeline.frame_duration_sec()).abs() < 1e-9);

        // Right half resumes after the hold.
        let right = &track.clips[2];
        assert_eq!(right.place.timeline_in_sec, 6.0);
        assert_eq!(right.range.source_in_sec, 4.0);
        assert_eq!(right.range.source_out_sec, 10.0);

        // Later clip rippled right by the hold duration.
        assert_eq!(track.get_clip(&b).unwrap().place.timeline_in_sec, 12.0);
        assert_eq!(timeline.duration_sec, 17.0);
    }

    #[test]
    fn test_freeze_frame_undo() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0);
        let before = timeline.get_track(&track_id).unwrap().clips.clone();

        let mut cmd = FreezeFrameCommand::new(&track_id, &a, 4.0, 2.0);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.clips, before);
        assert_eq!(track.get_clip(&b).unwrap().place.timeline_in_sec, 10.0);
        assert_eq!(timeline.duration_sec, 15.0);
    }

    #[test]
    fn test_freeze_frame_rejects_bad_hold() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0);

        let mut cmd = FreezeFrameCommand::new(&track_id, &a, 4.0, 0.0);
        assert!(matches!(
            cmd.execute(&mut timeline),
            Err(CoreError::ValidationError(_))
        ));
    }
}
