//! Trim Commands Module
//!
//! Implements the classic non-linear trim operations: trim-in, trim-out,
//! rolling edit, slip and slide. Deltas are timeline-time quantities;
//! source-window adjustments scale by the clip speed (one timeline second
//! consumes `speed` source seconds). Slip deltas address the source window
//! directly.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{locate_on_unlocked_track, Command, CommandResult, StateChange},
    timeline::{Clip, ClipPlace, SourceRange, Timeline, Track, TIME_EPSILON},
    ClipId, CoreError, CoreResult, TimeSec, TrackId,
};

/// Saved placement and trim window of a clip, for undo.
#[derive(Clone, Debug)]
struct ClipGeometry {
    place: ClipPlace,
    range: SourceRange,
}

impl ClipGeometry {
    fn capture(clip: &Clip) -> Self {
        Self {
            place: clip.place.clone(),
            range: clip.range.clone(),
        }
    }

    fn restore(&self, clip: &mut Clip) {
        clip.place = self.place.clone();
        clip.range = self.range.clone();
    }
}

fn require_finite_delta(delta: TimeSec) -> CoreResult<()> {
    if !delta.is_finite() {
        return Err(CoreError::ValidationError(
            "delta must be a finite number".to_string(),
        ));
    }
    Ok(())
}

fn check_source_tail(clip: &Clip) -> CoreResult<()> {
    if clip.source_duration_sec > 0.0
        && clip.range.source_out_sec > clip.source_duration_sec + TIME_EPSILON
    {
        return Err(CoreError::InsufficientSource {
            clip_id: clip.id.clone(),
            needed_sec: clip.range.source_out_sec,
            available_sec: clip.source_duration_sec,
        });
    }
    Ok(())
}

/// Validates that a track stays overlap-free after substituting `candidates`
/// for the clips with matching IDs.
fn validate_candidates_no_overlap(track: &Track, candidates: &[&Clip]) -> CoreResult<()> {
    let mut places: Vec<(ClipId, ClipPlace)> = track
        .clips
        .iter()
        .map(|clip| {
            match candidates.iter().find(|c| c.id == clip.id) {
                Some(c) => (c.id.clone(), c.place.clone()),
                None => (clip.id.clone(), clip.place.clone()),
            }
        })
        .collect();
    places.sort_by(|a, b| a.1.timeline_in_sec.total_cmp(&b.1.timeline_in_sec));

    for pair in places.windows(2) {
        let (prev_id, prev) = &pair[0];
        let (_, next) = &pair[1];
        if next.timeline_in_sec < prev.timeline_out_sec() - TIME_EPSILON {
            return Err(CoreError::ClipOverlap {
                track_id: track.id.clone(),
                existing_clip_id: prev_id.clone(),
                new_start: next.timeline_in_sec,
                new_end: next.timeline_out_sec(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// TrimInCommand
// =============================================================================

/// Command to trim the in edge of a clip.
///
/// A positive delta shifts the clip start forward, shortening it and
/// advancing its source-in point; a negative delta extends the head.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimInCommand {
    /// Clip ID to trim
    pub clip_id: ClipId,
    /// Timeline-time delta applied to the in edge
    pub delta: TimeSec,
    #[serde(skip)]
    previous: Option<ClipGeometry>,
}

impl TrimInCommand {
    pub fn new(clip_id: &str, delta: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            delta,
            previous: None,
        }
    }
}

impl Command for TrimInCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_finite_delta(self.delta)?;
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;

        let original = &timeline.tracks[t_idx].clips[c_idx];
        let mut candidate = original.clone();
        candidate.place.timeline_in_sec += self.delta;
        candidate.place.duration_sec -= self.delta;
        candidate.range.source_in_sec += self.delta * candidate.speed;

        if candidate.place.duration_sec <= 0.0 {
            return Err(CoreError::InvalidTimeRange(
                candidate.place.timeline_in_sec,
                candidate.place.timeline_out_sec(),
            ));
        }
        if candidate.range.source_in_sec < 0.0 {
            return Err(CoreError::InvalidTimeRange(
                candidate.range.source_in_sec,
                candidate.range.source_out_sec,
            ));
        }
        if candidate.place.timeline_in_sec < 0.0 {
            return Err(CoreError::ValidationError(
                "Trim would move the clip before the start of the timeline".to_string(),
            ));
        }

        let track = &timeline.tracks[t_idx];
        track.validate_no_overlap(&candidate.place, Some(&self.clip_id))?;

        self.previous = Some(ClipGeometry::capture(original));

        timeline.tracks[t_idx].clips[c_idx] = candidate;
        timeline.tracks[t_idx].sort_clips();
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
        if let Some(previous) = &self.previous {
            if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
                previous.restore(&mut timeline.tracks[t_idx].clips[c_idx]);
                timeline.tracks[t_idx].sort_clips();
                timeline.recalculate_duration();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "TrimIn"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// TrimOutCommand
// =============================================================================

/// Command to trim the out edge of a clip.
///
/// A positive delta extends the clip, consuming more source material; a
/// negative delta shortens it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimOutCommand {
    /// Clip ID to trim
    pub clip_id: ClipId,
    /// Timeline-time delta applied to the out edge
    pub delta: TimeSec,
    #[serde(skip)]
    previous: Option<ClipGeometry>,
}

impl TrimOutCommand {
    pub fn new(clip_id: &str, delta: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            delta,
            previous: None,
        }
    }
}

impl Command for TrimOutCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_finite_delta(self.delta)?;
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;

        let original = &timeline.tracks[t_idx].clips[c_idx];
        let mut candidate = original.clone();
        candidate.place.duration_sec += self.delta;
        candidate.range.source_out_sec += self.delta * candidate.speed;

        if candidate.place.duration_sec <= 0.0 {
            return Err(CoreError::InvalidTimeRange(
                candidate.place.timeline_in_sec,
                candidate.place.timeline_out_sec(),
            ));
        }
        check_source_tail(&candidate)?;

        let track = &timeline.tracks[t_idx];
        track.validate_no_overlap(&candidate.place, Some(&self.clip_id))?;

        self.previous = Some(ClipGeometry::capture(original));

        timeline.tracks[t_idx].clips[c_idx] = candidate;
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
        if let Some(previous) = &self.previous {
            if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
                previous.restore(&mut timeline.tracks[t_idx].clips[c_idx]);
                timeline.recalculate_duration();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "TrimOut"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RollEditCommand
// =============================================================================

/// Command to roll the shared edit point between two adjacent clips.
///
/// The left clip extends, the right clip yields; their combined duration is
/// invariant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollEditCommand {
    /// Target track ID
    pub track_id: TrackId,
    /// Left clip of the adjacent pair
    pub left_clip_id: ClipId,
    /// Timeline-time delta applied to the shared edit point
    pub delta: TimeSec,
    #[serde(skip)]
    previous_left: Option<ClipGeometry>,
    #[serde(skip)]
    previous_right: Option<(ClipId, ClipGeometry)>,
}

impl RollEditCommand {
    pub fn new(track_id: &str, left_clip_id: &str, delta: TimeSec) -> Self {
        Self {
            track_id: track_id.to_string(),
            left_clip_id: left_clip_id.to_string(),
            delta,
            previous_left: None,
            previous_right: None,
        }
    }
}

impl Command for RollEditCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_finite_delta(self.delta)?;

        let track = timeline
            .get_track(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;
        if track.locked {
            return Err(CoreError::TrackLocked(track.id.clone()));
        }

        let left_idx = track
            .clip_index(&self.left_clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.left_clip_id.clone()))?;
        let right_idx = left_idx + 1;
        if right_idx >= track.clips.len() || !track.are_adjacent(left_idx, right_idx) {
            return Err(CoreError::NoAdjacentClip {
                clip_id: self.left_clip_id.clone(),
                side: "right",
            });
        }

        let mut left = track.clips[left_idx].clone();
        let mut right = track.clips[right_idx].clone();

        left.place.duration_sec += self.delta;
        left.range.source_out_sec += self.delta * left.speed;

        right.place.timeline_in_sec += self.delta;
        right.place.duration_sec -= self.delta;
        right.range.source_in_sec += self.delta * right.speed;

        if left.place.duration_sec <= 0.0 {
            return Err(CoreError::InvalidTimeRange(
                left.place.timeline_in_sec,
                left.place.timeline_out_sec(),
            ));
        }
        if right.place.duration_sec <= 0.0 {
            return Err(CoreError::InvalidTimeRange(
                right.place.timeline_in_sec,
                right.place.timeline_out_sec(),
            ));
        }
        check_source_tail(&left)?;
        if right.range.source_in_sec < 0.0 {
            return Err(CoreError::InsufficientSource {
                clip_id: right.id.clone(),
                needed_sec: -right.range.source_in_sec,
                available_sec: 0.0,
            });
        }

        self.previous_left = Some(ClipGeometry::capture(&track.clips[left_idx]));
        self.previous_right = Some((
            right.id.clone(),
            ClipGeometry::capture(&track.clips[right_idx]),
        ));

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;
        track.clips[left_idx] = left;
        track.clips[right_idx] = right;
        track.sort_clips();

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        let right_id = self.previous_right.as_ref().map(|(id, _)| id.clone());
        let mut result =
            CommandResult::new(&op_id).with_change(StateChange::ClipModified {
                clip_id: self.left_clip_id.clone(),
            });
        if let Some(right_id) = right_id {
            result = result.with_change(StateChange::ClipModified { clip_id: right_id });
        }
        Ok(result)
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(track) = timeline.get_track_mut(&self.track_id) {
            if let (Some(prev_left), Some((right_id, prev_right))) =
                (&self.previous_left, &self.previous_right)
            {
                if let Some(clip) = track.get_clip_mut(&self.left_clip_id) {
                    prev_left.restore(clip);
                }
                if let Some(clip) = track.get_clip_mut(right_id) {
                    prev_right.restore(clip);
                }
                track.sort_clips();
                timeline.recalculate_duration();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RollEdit"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SlipCommand
// =============================================================================

/// Command to slip a clip: the source window slides by `delta` (source
/// seconds) while timeline position and duration stay fixed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipCommand {
    /// Clip ID to slip
    pub clip_id: ClipId,
    /// Source-time delta applied to the trim window
    pub delta: TimeSec,
    #[serde(skip)]
    previous: Option<ClipGeometry>,
}

impl SlipCommand {
    pub fn new(clip_id: &str, delta: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            delta,
            previous: None,
        }
    }
}

impl Command for SlipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_finite_delta(self.delta)?;
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;

        let original = &timeline.tracks[t_idx].clips[c_idx];
        let mut candidate = original.clone();
        candidate.range.source_in_sec += self.delta;
        candidate.range.source_out_sec += self.delta;

        if candidate.range.source_in_sec < 0.0 {
            return Err(CoreError::InvalidTimeRange(
                candidate.range.source_in_sec,
                candidate.range.source_out_sec,
            ));
        }
        check_source_tail(&candidate)?;

        self.previous = Some(ClipGeometry::capture(original));

        // Placement untouched: slip never needs an overlap check.
        timeline.tracks[t_idx].clips[c_idx] = candidate;
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(previous) = &self.previous {
            if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
                previous.restore(&mut timeline.tracks[t_idx].clips[c_idx]);
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "Slip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SlideCommand
// =============================================================================

/// Command to slide a clip along its track: the clip moves by `delta`
/// while adjacent neighbors absorb the change, keeping their own outer
/// edges fixed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideCommand {
    /// Clip ID to slide
    pub clip_id: ClipId,
    /// Timeline-time delta applied to the clip position
    pub delta: TimeSec,
    #[serde(skip)]
    previous: Option<ClipGeometry>,
    #[serde(skip)]
    previous_left: Option<(ClipId, ClipGeometry)>,
    #[serde(skip)]
    previous_right: Option<(ClipId, ClipGeometry)>,
}

impl SlideCommand {
    pub fn new(clip_id: &str, delta: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            delta,
            previous: None,
            previous_left: None,
            previous_right: None,
        }
    }
}

impl Command for SlideCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        require_finite_delta(self.delta)?;
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let track = &timeline.tracks[t_idx];

        let left_adjacent = c_idx > 0 && track.are_adjacent(c_idx - 1, c_idx);
        let right_adjacent = track.are_adjacent(c_idx, c_idx + 1);
        if !left_adjacent && !right_adjacent {
            return Err(CoreError::NoAdjacentClip {
                clip_id: self.clip_id.clone(),
                side: "either",
            });
        }

        let mut mid = track.clips[c_idx].clone();
        mid.place.timeline_in_sec += self.delta;
        if mid.place.timeline_in_sec < 0.0 {
            return Err(CoreError::ValidationError(
                "Slide would move the clip before the start of the timeline".to_string(),
            ));
        }

        let mut left_candidate = None;
        if left_adjacent {
            let mut left = track.clips[c_idx - 1].clone();
            left.place.duration_sec += self.delta;
            left.range.source_out_sec += self.delta * left.speed;
            if left.place.duration_sec <= 0.0 {
                return Err(CoreError::InvalidTimeRange(
                    left.place.timeline_in_sec,
                    left.place.timeline_out_sec(),
                ));
            }
            check_source_tail(&left)?;
            left_candidate = Some(left);
        }

        let mut right_candidate = None;
        if right_adjacent {
            let mut right = track.clips[c_idx + 1].clone();
            right.place.timeline_in_sec += self.delta;
            right.place.duration_sec -= self.delta;
            right.range.source_in_sec += self.delta * right.speed;
            if right.place.duration_sec <= 0.0 {
                return Err(CoreError::InvalidTimeRange(
                    right.place.timeline_in_sec,
                    right.place.timeline_out_sec(),
                ));
            }
            if right.range.source_in_sec < 0.0 {
                return Err(CoreError::InsufficientSource {
                    clip_id: right.id.clone(),
                    needed_sec: -right.range.source_in_sec,
                    available_sec: 0.0,
                });
            }
            right_candidate = Some(right);
        }

        let mut candidates: Vec<&Clip> = vec![&mid];
        if let Some(left) = &left_candidate {
            candidates.push(left);
        }
        if let Some(right) = &right_candidate {
            candidates.push(right);
        }
        validate_candidates_no_overlap(track, &candidates)?;

        self.previous = Some(ClipGeometry::capture(&track.clips[c_idx]));
        self.previous_left = left_candidate.as_ref().map(|left| {
            (
                left.id.clone(),
                ClipGeometry::capture(&track.clips[c_idx - 1]),
            )
        });
        self.previous_right = right_candidate.as_ref().map(|right| {
            (
                right.id.clone(),
                ClipGeometry::capture(&track.clips[c_idx + 1]),
            )
        });

        let track = &mut timeline.tracks[t_idx];
        if let Some(left) = left_candidate {
            track.clips[c_idx - 1] = left;
        }
        if let Some(right) = right_candidate {
            track.clips[c_idx + 1] = right;
        }
        track.clips[c_idx] = mid;
        track.sort_clips();

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
        let Some((t_idx, _)) = timeline.find_clip_location(&self.clip_id) else {
            return Ok(());
        };
        let track = &mut timeline.tracks[t_idx];

        if let Some(previous) = &self.previous {
            if let Some(clip) = track.get_clip_mut(&self.clip_id) {
                previous.restore(clip);
            }
        }
        if let Some((id, previous)) = &self.previous_left {
            if let Some(clip) = track.get_clip_mut(id) {
                previous.restore(clip);
            }
        }
        if let Some((id, previous)) = &self.previous_right {
            if let Some(clip) = track.get_clip_mut(id) {
                previous.restore(clip);
            }
        }
        track.sort_clips();
        timeline.recalculate_duration();
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "Slide"
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
    use crate::commands::InsertClipCommand;
    use crate::Ratio;

    fn timeline_with_track() -> (Timeline, TrackId) {
        let mut timeline = Timeline::new("Main", Ratio::default());
        let track = Track::new_video("Video 1");
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
        source_duration: TimeSec,
    ) -> ClipId {
        let mut cmd = InsertClipCommand::new(
            track_id,
            name,
            "/media/source.mp4",
            start,
            source_in,
            source_out,
        )
        .with_source_duration(source_duration);
        cmd.execute(timeline).unwrap().created_ids[0].clone()
    }

    #[test]
    fn test_trim_in() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 5.0, 15.0, 60.0);

        let mut cmd = TrimInCommand::new(&a, 2.0);
        cmd.execute(&mut timeline).unwrap();

        let clip = timeline.get_track(&track_id).unwrap().get_clip(&a).unwrap();
        assert_eq!(clip.place.timeline_in_sec, 2.0);
        assert_eq!(clip.place.duration_sec, 8.0);
        assert_eq!(clip.range.source_in_sec, 7.0);
        assert_eq!(clip.range.source_out_sec, 15.0);
    }

    #[test]
    fn test_trim_in_failures_leave_model_unchanged() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 5.0, 15.0, 60.0);
        let before = timeline.get_track(&track_id).unwrap().clips.clone();

        // Would collapse the clip.
        assert!(matches!(
            TrimInCommand::new(&a, 10.0).execute(&mut timeline),
            Err(CoreError::InvalidTimeRange(_, _))
        ));
        // Would push source_in below zero.
        assert!(matches!(
            TrimInCommand::new(&a, -6.0).execute(&mut timeline),
            Err(CoreError::InvalidTimeRange(_, _))
        ));

        assert_eq!(timeline.get_track(&track_id).unwrap().clips, before);
    }

    #[test]
    fn test_trim_in_negative_before_timeline_start() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 1.0, 5.0, 15.0, 60.0);

        assert!(matches!(
            TrimInCommand::new(&a, -2.0).execute(&mut timeline),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_trim_out_extends_and_respects_source() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 12.0);

        let mut cmd = TrimOutCommand::new(&a, 2.0);
        cmd.execute(&mut timeline).unwrap();

        let clip = timeline.get_track(&track_id).unwrap().get_clip(&a).unwrap();
        assert_eq!(clip.place.duration_sec, 12.0);
        assert_eq!(clip.range.source_out_sec, 12.0);

        // Any further extension runs out of source material.
        assert!(matches!(
            TrimOutCommand::new(&a, 1.0).execute(&mut timeline),
            Err(CoreError::InsufficientSource { .. })
        ));
    }

    #[test]
    fn test_trim_out_unconstrained_for_generated_content() {
        let (mut timeline, track_id) = timeline_with_track();
        // source_duration == 0 means unconstrained.
        let a = insert(&mut timeline, &track_id, "title", 0.0, 0.0, 4.0, 0.0);

        assert!(TrimOutCommand::new(&a, 100.0).execute(&mut timeline).is_ok());
    }

    #[test]
    fn test_trim_out_overlap_rejected() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0, 60.0);

        assert!(matches!(
            TrimOutCommand::new(&a, 1.0).execute(&mut timeline),
            Err(CoreError::ClipOverlap { .. })
        ));
    }

    #[test]
    fn test_roll_edit_scenario() {
        // A [0,10) and B [10,15); rolling +1s moves the boundary to 11.
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0, 60.0);

        let mut cmd = RollEditCommand::new(&track_id, &a, 1.0);
        cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        let clip_a = track.get_clip(&a).unwrap();
        let clip_b = track.get_clip(&b).unwrap();

        assert_eq!(clip_a.place.timeline_in_sec, 0.0);
        assert_eq!(clip_a.place.timeline_out_sec(), 11.0);
        assert_eq!(clip_a.range.source_out_sec, 11.0);
        assert_eq!(clip_b.place.timeline_in_sec, 11.0);
        assert_eq!(clip_b.place.timeline_out_sec(), 15.0);
        assert_eq!(clip_b.range.source_in_sec, 1.0);

        // Combined duration is invariant.
        assert_eq!(
            clip_a.place.duration_sec + clip_b.place.duration_sec,
            15.0
        );
        // Total timeline length unchanged.
        assert_eq!(timeline.duration_sec, 15.0);
    }

    #[test]
    fn test_roll_edit_requires_adjacency() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        insert(&mut timeline, &track_id, "b", 12.0, 0.0, 5.0, 60.0); // 2s gap

        assert!(matches!(
            RollEditCommand::new(&track_id, &a, 1.0).execute(&mut timeline),
            Err(CoreError::NoAdjacentClip { .. })
        ));
    }

    #[test]
    fn test_roll_edit_insufficient_tail() {
        let (mut timeline, track_id) = timeline_with_track();
        // A uses its full source; it cannot extend.
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 10.0);
        insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0, 60.0);

        assert!(matches!(
            RollEditCommand::new(&track_id, &a, 1.0).execute(&mut timeline),
            Err(CoreError::InsufficientSource { .. })
        ));
    }

    #[test]
    fn test_roll_edit_right_clip_cannot_vanish() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0, 60.0);

        assert!(matches!(
            RollEditCommand::new(&track_id, &a, 5.0).execute(&mut timeline),
            Err(CoreError::InvalidTimeRange(_, _))
        ));
    }

    #[test]
    fn test_roll_edit_undo() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        insert(&mut timeline, &track_id, "b", 10.0, 0.0, 5.0, 60.0);
        let before = timeline.get_track(&track_id).unwrap().clips.clone();

        let mut cmd = RollEditCommand::new(&track_id, &a, 1.0);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        assert_eq!(timeline.get_track(&track_id).unwrap().clips, before);
    }

    #[test]
    fn test_slip_preserves_placement() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 3.0, 5.0, 15.0, 60.0);

        let mut cmd = SlipCommand::new(&a, 4.0);
        cmd.execute(&mut timeline).unwrap();

        let clip = timeline.get_track(&track_id).unwrap().get_clip(&a).unwrap();
        assert_eq!(clip.place.timeline_in_sec, 3.0);
        assert_eq!(clip.place.duration_sec, 10.0);
        assert_eq!(clip.range.source_in_sec, 9.0);
        assert_eq!(clip.range.source_out_sec, 19.0);
    }

    #[test]
    fn test_slip_bounds() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 5.0, 15.0, 20.0);

        assert!(matches!(
            SlipCommand::new(&a, -6.0).execute(&mut timeline),
            Err(CoreError::InvalidTimeRange(_, _))
        ));
        assert!(matches!(
            SlipCommand::new(&a, 6.0).execute(&mut timeline),
            Err(CoreError::InsufficientSource { .. })
        ));

        // Model unchanged after both failures.
        let clip = timeline.get_track(&track_id).unwrap().get_clip(&a).unwrap();
        assert_eq!(clip.range.source_in_sec, 5.0);
        assert_eq!(clip.range.source_out_sec, 15.0);
    }

    #[test]
    fn test_slide_between_neighbors() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 10.0, 15.0, 60.0);
        let c = insert(&mut timeline, &track_id, "c", 15.0, 20.0, 30.0, 60.0);

        let mut cmd = SlideCommand::new(&b, 2.0);
        cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        let clip_a = track.get_clip(&a).unwrap();
        let clip_b = track.get_clip(&b).unwrap();
        let clip_c = track.get_clip(&c).unwrap();

        // B moved, keeping its duration.
        assert_eq!(clip_b.place.timeline_in_sec, 12.0);
        assert_eq!(clip_b.place.duration_sec, 5.0);
        // A absorbed the delta at its tail.
        assert_eq!(clip_a.place.timeline_out_sec(), 12.0);
        assert_eq!(clip_a.range.source_out_sec, 12.0);
        // C yielded at its head; its out edge is fixed.
        assert_eq!(clip_c.place.timeline_in_sec, 17.0);
        assert_eq!(clip_c.place.timeline_out_sec(), 25.0);
        assert_eq!(clip_c.range.source_in_sec, 22.0);
        // Total timeline length unchanged.
        assert_eq!(timeline.duration_sec, 25.0);
    }

    #[test]
    fn test_slide_with_single_neighbor() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 10.0, 15.0, 60.0);

        let mut cmd = SlideCommand::new(&b, 3.0);
        cmd.execute(&mut timeline).unwrap();

        let track = timeline.get_track(&track_id).unwrap();
        assert_eq!(track.get_clip(&a).unwrap().place.timeline_out_sec(), 13.0);
        assert_eq!(track.get_clip(&b).unwrap().place.timeline_in_sec, 13.0);
    }

    #[test]
    fn test_slide_requires_a_neighbor() {
        let (mut timeline, track_id) = timeline_with_track();
        let a = insert(&mut timeline, &track_id, "a", 5.0, 0.0, 10.0, 60.0);

        assert!(matches!(
            SlideCommand::new(&a, 1.0).execute(&mut timeline),
            Err(CoreError::NoAdjacentClip { .. })
        ));
    }

    #[test]
    fn test_slide_undo() {
        let (mut timeline, track_id) = timeline_with_track();
        insert(&mut timeline, &track_id, "a", 0.0, 0.0, 10.0, 60.0);
        let b = insert(&mut timeline, &track_id, "b", 10.0, 10.0, 15.0, 60.0);
        insert(&mut timeline, &track_id, "c", 15.0, 20.0, 30.0, 60.0);
        let before = timeline.get_track(&track_id).unwrap().clips.clone();

        let mut cmd = SlideCommand::new(&b, 2.0);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        assert_eq!(timeline.get_track(&track_id).unwrap().clips, before);
    }
}
