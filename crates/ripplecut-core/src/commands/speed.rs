//! Speed Commands Module
//!
//! Constant-speed changes, curve-based remap presets and reverse toggling.
//! Changing speed rescales the clip's timeline duration so that
//! `duration == (source_out - source_in) / speed` always holds.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{locate_on_unlocked_track, Command, CommandResult, StateChange},
    filters::{Filter, REVERSE_FILTER, SPEED_CURVE_FILTER},
    remap::{SpeedCurve, SpeedPreset},
    timeline::{Clip, Timeline},
    ClipId, CoreError, CoreResult,
};

fn apply_speed_candidate(
    timeline: &Timeline,
    t_idx: usize,
    c_idx: usize,
    speed: f64,
) -> CoreResult<Clip> {
    let original = &timeline.tracks[t_idx].clips[c_idx];
    if original.is_freeze_frame {
        return Err(CoreError::ValidationError(
            "Freeze-frame clips have a fixed hold duration and cannot be retimed".to_string(),
        ));
    }

    let mut candidate = original.clone();
    candidate.speed = speed;
    candidate.place.duration_sec = candidate.expected_duration();
    if !candidate.place.duration_sec.is_finite() || candidate.place.duration_sec <= 0.0 {
        return Err(CoreError::ValidationError(
            "Clip duration must be finite and > 0 after speed change".to_string(),
        ));
    }

    // Rescaling the duration can push the clip into its right neighbor.
    let track = &timeline.tracks[t_idx];
    track.validate_no_overlap(&candidate.place, Some(&candidate.id))?;

    Ok(candidate)
}

// =============================================================================
// SetClipSpeedCommand
// =============================================================================

/// Command to set a constant playback speed on a clip
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetClipSpeedCommand {
    /// Clip ID to retime
    pub clip_id: ClipId,
    /// New playback speed (must be finite and > 0)
    pub speed: f64,
    /// Orthogonal flag consumed by the export planner
    pub preserve_pitch: Option<bool>,
    #[serde(skip)]
    previous: Option<Clip>,
}

impl SetClipSpeedCommand {
    pub fn new(clip_id: &str, speed: f64) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            speed,
            preserve_pitch: None,
            previous: None,
        }
    }

    pub fn with_preserve_pitch(mut self, preserve_pitch: bool) -> Self {
        self.preserve_pitch = Some(preserve_pitch);
        self
    }
}

impl Command for SetClipSpeedCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(CoreError::ValidationError(
                "speed must be finite and > 0".to_string(),
            ));
        }

        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let mut candidate = apply_speed_candidate(timeline, t_idx, c_idx, self.speed)?;
        if let Some(preserve_pitch) = self.preserve_pitch {
            candidate.preserve_pitch = preserve_pitch;
        }

        self.previous = Some(timeline.tracks[t_idx].clips[c_idx].clone());
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
                timeline.tracks[t_idx].clips[c_idx] = previous.clone();
                timeline.tracks[t_idx].sort_clips();
                timeline.recalculate_duration();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SetClipSpeed"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// ApplySpeedPresetCommand
// =============================================================================

/// Command to apply a curve-based remap preset to a clip.
///
/// The curve is stored as a Time-category filter; the clip's scalar speed
/// becomes the curve's effective average and the timeline duration is
/// rescaled to match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySpeedPresetCommand {
    /// Clip ID to retime
    pub clip_id: ClipId,
    pub preset: SpeedPreset,
    pub min_speed: f64,
    pub max_speed: f64,
    pub preserve_pitch: bool,
    #[serde(skip)]
    previous: Option<Clip>,
}

impl ApplySpeedPresetCommand {
    pub fn new(
        clip_id: &str,
        preset: SpeedPreset,
        min_speed: f64,
        max_speed: f64,
        preserve_pitch: bool,
    ) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            preset,
            min_speed,
            max_speed,
            preserve_pitch,
            previous: None,
        }
    }
}

impl Command for ApplySpeedPresetCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !self.min_speed.is_finite()
            || !self.max_speed.is_finite()
            || self.min_speed <= 0.0
            || self.max_speed < self.min_speed
        {
            return Err(CoreError::ValidationError(
                "Speed bounds must be finite, positive, and min <= max".to_string(),
            ));
        }

        let curve = SpeedCurve::new(
            self.preset,
            self.min_speed,
            self.max_speed,
            self.preserve_pitch,
        );
        let average = curve.average();

        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let mut candidate = apply_speed_candidate(timeline, t_idx, c_idx, average)?;
        candidate.preserve_pitch = self.preserve_pitch;

        // Replace an existing curve in place to keep the pipeline order;
        // append otherwise.
        let curve_filter = curve.to_filter();
        match candidate
            .filters
            .iter_mut()
            .find(|f| f.name == SPEED_CURVE_FILTER)
        {
            Some(existing) => {
                existing.parameters = curve_filter.parameters;
                existing.enabled = true;
            }
            None => candidate.filters.push(curve_filter),
        }

        self.previous = Some(timeline.tracks[t_idx].clips[c_idx].clone());
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
                timeline.tracks[t_idx].clips[c_idx] = previous.clone();
                timeline.tracks[t_idx].sort_clips();
                timeline.recalculate_duration();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ApplySpeedPreset"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// ToggleReverseCommand
// =============================================================================

/// Command to toggle reversed playback on a clip.
///
/// Attaches or removes the named reverse filter; duration, trim window and
/// placement are untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReverseCommand {
    /// Clip ID to toggle
    pub clip_id: ClipId,
    /// Filter removed during execution (for undo)
    #[serde(skip)]
    removed_filter: Option<(usize, Filter)>,
    /// Filter ID added during execution (for undo)
    #[serde(skip)]
    added_filter_id: Option<String>,
}

impl ToggleReverseCommand {
    pub fn new(clip_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            removed_filter: None,
            added_filter_id: None,
        }
    }
}

impl Command for ToggleReverseCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        self.removed_filter = None;
        self.added_filter_id = None;

        let op_id = ulid::Ulid::new().to_string();
        let result = match clip.filters.iter().position(|f| f.name == REVERSE_FILTER) {
            Some(idx) => {
                let removed = clip.filters.remove(idx);
                let filter_id = removed.id.clone();
                self.removed_filter = Some((idx, removed));
                CommandResult::new(&op_id).with_change(StateChange::FilterRemoved { filter_id })
            }
            None => {
                let filter = Filter::reverse();
                let filter_id = filter.id.clone();
                self.added_filter_id = Some(filter_id.clone());
                clip.filters.push(filter);
                CommandResult::new(&op_id).with_change(StateChange::FilterApplied { filter_id })
            }
        };

        timeline.touch();
        Ok(result)
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) else {
            return Ok(());
        };
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        if let Some((idx, filter)) = &self.removed_filter {
            let idx = (*idx).min(clip.filters.len());
            clip.filters.insert(idx, filter.clone());
        } else if let Some(filter_id) = &self.added_filter_id {
            clip.filters.retain(|f| &f.id != filter_id);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ToggleReverse"
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
    use crate::timeline::Track;
    use crate::{Ratio, TimeSec, TrackId};

    fn timeline_with_clip() -> (Timeline, TrackId, ClipId) {
        let mut timeline = Timeline::new("Main", Ratio::default());
        let track = Track::new_video("Video 1");
        let track_id = track.id.clone();
        timeline.add_track(track);

        let mut cmd =
            InsertClipCommand::new(&track_id, "a", "/media/a.mp4", 0.0, 0.0, 10.0)
                .with_source_duration(60.0);
        let clip_id = cmd.execute(&mut timeline).unwrap().created_ids[0].clone();
        (timeline, track_id, clip_id)
    }

    fn clip_duration(timeline: &Timeline, clip_id: &str) -> TimeSec {
        timeline.find_clip(clip_id).unwrap().1.place.duration_sec
    }

    #[test]
    fn test_set_speed_rescales_duration() {
        let (mut timeline, _, clip_id) = timeline_with_clip();

        let mut cmd = SetClipSpeedCommand::new(&clip_id, 2.0);
        cmd.execute(&mut timeline).unwrap();

        // A 10s source window at 2x occupies 5s of timeline.
        assert_eq!(clip_duration(&timeline, &clip_id), 5.0);
        assert_eq!(timeline.duration_sec, 5.0);

        cmd.undo(&mut timeline).unwrap();
        assert_eq!(clip_duration(&timeline, &clip_id), 10.0);
    }

    #[test]
    fn test_set_speed_slowdown_checks_overlap() {
        let (mut timeline, track_id, clip_id) = timeline_with_clip();
        let mut other =
            InsertClipCommand::new(&track_id, "b", "/media/b.mp4", 10.0, 0.0, 5.0)
                .with_source_duration(60.0);
        other.execute(&mut timeline).unwrap();

        // 0.5x would stretch the clip to 20s, into its neighbor.
        assert!(matches!(
            SetClipSpeedCommand::new(&clip_id, 0.5).execute(&mut timeline),
            Err(CoreError::ClipOverlap { .. })
        ));
        assert_eq!(clip_duration(&timeline, &clip_id), 10.0);
    }

    #[test]
    fn test_set_speed_rejects_invalid() {
        let (mut timeline, _, clip_id) = timeline_with_clip();

        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SetClipSpeedCommand::new(&clip_id, speed).execute(&mut timeline),
                Err(CoreError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_apply_preset_sets_scalar_speed_and_filter() {
        let (mut timeline, _, clip_id) = timeline_with_clip();

        let mut cmd =
            ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::ReverseRamp, 0.5, 2.0, true);
        cmd.execute(&mut timeline).unwrap();

        let (_, clip) = timeline.find_clip(&clip_id).unwrap();
        // Linear max→min averages to 1.25.
        assert!((clip.speed - 1.25).abs() < 1e-6);
        assert!((clip.place.duration_sec - 10.0 / 1.25).abs() < 1e-6);
        assert!(clip.preserve_pitch);

        let filter = clip
            .filters
            .iter()
            .find(|f| f.name == SPEED_CURVE_FILTER)
            .unwrap();
        let decoded = SpeedCurve::from_filter(filter).unwrap();
        assert_eq!(decoded.preset, SpeedPreset::ReverseRamp);
        assert_eq!(decoded.min_speed, 0.5);
        assert_eq!(decoded.max_speed, 2.0);
    }

    #[test]
    fn test_apply_preset_replaces_existing_curve() {
        let (mut timeline, _, clip_id) = timeline_with_clip();

        ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::EaseIn, 0.5, 2.0, false)
            .execute(&mut timeline)
            .unwrap();
        ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::RampOut, 0.25, 1.0, false)
            .execute(&mut timeline)
            .unwrap();

        let (_, clip) = timeline.find_clip(&clip_id).unwrap();
        let curves: Vec<_> = clip
            .filters
            .iter()
            .filter(|f| f.name == SPEED_CURVE_FILTER)
            .collect();
        assert_eq!(curves.len(), 1);
        assert_eq!(
            SpeedCurve::from_filter(curves[0]).unwrap().preset,
            SpeedPreset::RampOut
        );
    }

    #[test]
    fn test_apply_preset_undo_restores_everything() {
        let (mut timeline, _, clip_id) = timeline_with_clip();
        let before = timeline.find_clip(&clip_id).unwrap().1.clone();

        let mut cmd =
            ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::SlowMotionCenter, 0.25, 1.0, false);
        cmd.execute(&mut timeline).unwrap();
        cmd.undo(&mut timeline).unwrap();

        assert_eq!(timeline.find_clip(&clip_id).unwrap().1, &before);
    }

    #[test]
    fn test_apply_preset_rejects_bad_bounds() {
        let (mut timeline, _, clip_id) = timeline_with_clip();

        assert!(matches!(
            ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::EaseIn, 0.0, 2.0, false)
                .execute(&mut timeline),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            ApplySpeedPresetCommand::new(&clip_id, SpeedPreset::EaseIn, 2.0, 1.0, false)
                .execute(&mut timeline),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_toggle_reverse_round_trip() {
        let (mut timeline, _, clip_id) = timeline_with_clip();
        let before = timeline.find_clip(&clip_id).unwrap().1.clone();

        // On
        let mut on = ToggleReverseCommand::new(&clip_id);
        on.execute(&mut timeline).unwrap();
        {
            let (_, clip) = timeline.find_clip(&clip_id).unwrap();
            assert!(clip.filters.iter().any(|f| f.name == REVERSE_FILTER));
            // Geometry untouched.
            assert_eq!(clip.place, before.place);
            assert_eq!(clip.range, before.range);
        }

        // Off
        let mut off = ToggleReverseCommand::new(&clip_id);
        off.execute(&mut timeline).unwrap();
        assert!(!timeline
            .find_clip(&clip_id)
            .unwrap()
            .1
            .filters
            .iter()
            .any(|f| f.name == REVERSE_FILTER));

        // Undo the "off" toggle restores the filter.
        off.undo(&mut timeline).unwrap();
        assert!(timeline
            .find_clip(&clip_id)
            .unwrap()
            .1
            .filters
            .iter()
            .any(|f| f.name == REVERSE_FILTER));
    }

    #[test]
    fn test_retime_freeze_frame_rejected() {
        let (mut timeline, _, clip_id) = timeline_with_clip();
        {
            let (t_idx, c_idx) = timeline.find_clip_location(&clip_id).unwrap();
            timeline.tracks[t_idx].clips[c_idx].is_freeze_frame = true;
        }

        assert!(matches!(
            SetClipSpeedCommand::new(&clip_id, 2.0).execute(&mut timeline),
            Err(CoreError::ValidationError(_))
        ));
    }
}
