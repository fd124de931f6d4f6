//! Track Commands Module
//!
//! Implements all track-related editing commands.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    timeline::{BlendMode, Timeline, Track, TrackKind},
    CoreError, CoreResult, TrackId,
};

// =============================================================================
// AddTrackCommand
// =============================================================================

/// Command to add a new track to the timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackCommand {
    /// Track name
    pub name: String,
    /// Track type
    pub kind: TrackKind,
    /// Position to insert at (optional, defaults to end)
    pub position: Option<usize>,
    /// Created track ID (stored after execution)
    #[serde(skip)]
    created_track_id: Option<TrackId>,
}

impl AddTrackCommand {
    /// Creates a new add track command
    pub fn new(name: &str, kind: TrackKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position: None,
            created_track_id: None,
        }
    }

    /// Sets the position to insert the track at
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl Command for AddTrackCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let mut track = Track::new(&self.name, self.kind.clone());
        // Reuse the track ID on redo so undo/redo stay symmetric.
        if let Some(id) = &self.created_track_id {
            track.id = id.clone();
        }
        let track_id = track.id.clone();
        self.created_track_id = Some(track_id.clone());

        match self.position {
            Some(pos) if pos <= timeline.tracks.len() => timeline.tracks.insert(pos, track),
            _ => timeline.tracks.push(track),
        }

        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::TrackCreated {
                track_id: track_id.clone(),
            })
            .with_created_id(&track_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(track_id) = &self.created_track_id {
            timeline.tracks.retain(|t| &t.id != track_id);
            timeline.recalculate_duration();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AddTrack"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RemoveTrackCommand
// =============================================================================

/// Command to remove a track from the timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTrackCommand {
    /// Track ID to remove
    pub track_id: TrackId,
    /// Removed track data (for undo)
    #[serde(skip)]
    removed_track: Option<Track>,
    /// Original position (for undo)
    #[serde(skip)]
    original_position: Option<usize>,
}

impl RemoveTrackCommand {
    /// Creates a new remove track command
    pub fn new(track_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            removed_track: None,
            original_position: None,
        }
    }
}

impl Command for RemoveTrackCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let position = timeline
            .tracks
            .iter()
            .position(|t| t.id == self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        // Store track and position before removal for undo
        self.removed_track = Some(timeline.tracks[position].clone());
        self.original_position = Some(position);

        timeline.tracks.remove(position);
        timeline.recalculate_duration();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::TrackDeleted {
                track_id: self.track_id.clone(),
            })
            .with_deleted_id(&self.track_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let (Some(track), Some(position)) = (&self.removed_track, self.original_position) {
            if position <= timeline.tracks.len() {
                timeline.tracks.insert(position, track.clone());
            } else {
                timeline.tracks.push(track.clone());
            }
            timeline.recalculate_duration();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RemoveTrack"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RenameTrackCommand
// =============================================================================

/// Command to rename a track
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTrackCommand {
    /// Track ID to rename
    pub track_id: TrackId,
    /// New name
    pub new_name: String,
    /// Original name (for undo)
    #[serde(skip)]
    original_name: Option<String>,
}

impl RenameTrackCommand {
    /// Creates a new rename track command
    pub fn new(track_id: &str, new_name: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            new_name: new_name.to_string(),
            original_name: None,
        }
    }
}

impl Command for RenameTrackCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        self.original_name = Some(track.name.clone());
        track.name = self.new_name.clone();
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::TrackModified {
                track_id: self.track_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(original_name) = &self.original_name {
            if let Some(track) = timeline.get_track_mut(&self.track_id) {
                track.name = original_name.clone();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RenameTrack"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SetTrackStateCommand
// =============================================================================

/// Saved track display state, for undo.
#[derive(Clone, Debug)]
struct TrackStateSnapshot {
    hidden: bool,
    muted: bool,
    locked: bool,
    opacity: f32,
    blend_mode: BlendMode,
}

/// Command to update a track's display state: hidden/muted/locked flags,
/// opacity, and blend mode. Only the provided fields change.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTrackStateCommand {
    pub track_id: TrackId,
    pub hidden: Option<bool>,
    pub muted: Option<bool>,
    pub locked: Option<bool>,
    pub opacity: Option<f32>,
    pub blend_mode: Option<BlendMode>,
    #[serde(skip)]
    previous: Option<TrackStateSnapshot>,
}

impl SetTrackStateCommand {
    pub fn new(track_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            hidden: None,
            muted: None,
            locked: None,
            opacity: None,
            blend_mode: None,
            previous: None,
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = Some(muted);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = Some(blend_mode);
        self
    }
}

impl Command for SetTrackStateCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if self.hidden.is_none()
            && self.muted.is_none()
            && self.locked.is_none()
            && self.opacity.is_none()
            && self.blend_mode.is_none()
        {
            return Err(CoreError::ValidationError(
                "SetTrackState requires at least one field".to_string(),
            ));
        }
        if let Some(opacity) = self.opacity {
            if !opacity.is_finite() {
                return Err(CoreError::ValidationError(
                    "opacity must be a finite number".to_string(),
                ));
            }
        }

        let track = timeline
            .get_track_mut(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;

        self.previous = Some(TrackStateSnapshot {
            hidden: track.hidden,
            muted: track.muted,
            locked: track.locked,
            opacity: track.opacity,
            blend_mode: track.blend_mode.clone(),
        });

        if let Some(hidden) = self.hidden {
            track.hidden = hidden;
        }
        if let Some(muted) = self.muted {
            track.muted = muted;
        }
        if let Some(locked) = self.locked {
            track.locked = locked;
        }
        if let Some(opacity) = self.opacity {
            track.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(blend_mode) = &self.blend_mode {
            track.blend_mode = blend_mode.clone();
        }

        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::TrackModified {
                track_id: self.track_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let Some(previous) = &self.previous else {
            return Ok(());
        };
        if let Some(track) = timeline.get_track_mut(&self.track_id) {
            track.hidden = previous.hidden;
            track.muted = previous.muted;
            track.locked = previous.locked;
            track.opacity = previous.opacity;
            track.blend_mode = previous.blend_mode.clone();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SetTrackState"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
