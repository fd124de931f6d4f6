//! Marker Commands Module
//!
//! Timeline markers and the loop/selection region.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{is_valid_time_sec, Command, CommandResult, StateChange},
    timeline::{Marker, Timeline},
    CoreError, CoreResult, MarkerId, TimeRange, TimeSec,
};

// =============================================================================
// AddMarkerCommand
// =============================================================================

/// Command to add a marker to the timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMarkerCommand {
    pub time_sec: TimeSec,
    pub name: String,
    pub is_chapter: bool,
    /// Created marker ID (stored after execution)
    #[serde(skip)]
    created_marker_id: Option<MarkerId>,
}

impl AddMarkerCommand {
    pub fn new(time_sec: TimeSec, name: &str) -> Self {
        Self {
            time_sec,
            name: name.to_string(),
            is_chapter: false,
            created_marker_id: None,
        }
    }

    pub fn chapter(mut self) -> Self {
        self.is_chapter = true;
        self
    }
}

impl Command for AddMarkerCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.time_sec) {
            return Err(CoreError::ValidationError(
                "Marker time must be finite and non-negative".to_string(),
            ));
        }

        let mut marker = Marker::new(self.time_sec, &self.name);
        marker.is_chapter = self.is_chapter;
        // Reuse the marker ID on redo so undo/redo stay symmetric.
        if let Some(id) = &self.created_marker_id {
            marker.id = id.clone();
        }
        let marker_id = marker.id.clone();
        self.created_marker_id = Some(marker_id.clone());

        timeline.add_marker(marker);

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::MarkerAdded {
                marker_id: marker_id.clone(),
            })
            .with_created_id(&marker_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(marker_id) = &self.created_marker_id {
            timeline.remove_marker(marker_id);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AddMarker"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RemoveMarkerCommand
// =============================================================================

/// Command to remove a marker from the timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMarkerCommand {
    pub marker_id: MarkerId,
    #[serde(skip)]
    removed_marker: Option<Marker>,
}

impl RemoveMarkerCommand {
    pub fn new(marker_id: &str) -> Self {
        Self {
            marker_id: marker_id.to_string(),
            removed_marker: None,
        }
    }
}

impl Command for RemoveMarkerCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let removed = timeline
            .remove_marker(&self.marker_id)
            .ok_or_else(|| CoreError::MarkerNotFound(self.marker_id.clone()))?;
        self.removed_marker = Some(removed);

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::MarkerRemoved {
                marker_id: self.marker_id.clone(),
            })
            .with_deleted_id(&self.marker_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(marker) = &self.removed_marker {
            timeline.add_marker(marker.clone());
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RemoveMarker"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SetLoopRegionCommand
// =============================================================================

/// Command to set or clear the loop/selection region
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLoopRegionCommand {
    /// New in/out points; `None` clears the region
    pub region: Option<(TimeSec, TimeSec)>,
    #[serde(skip)]
    previous: Option<Option<TimeRange>>,
}

impl SetLoopRegionCommand {
    pub fn new(in_point: TimeSec, out_point: TimeSec) -> Self {
        Self {
            region: Some((in_point, out_point)),
            previous: None,
        }
    }

    pub fn clear() -> Self {
        Self {
            region: None,
            previous: None,
        }
    }
}

impl Command for SetLoopRegionCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let new_region = match self.region {
            Some((in_point, out_point)) => {
                if !is_valid_time_sec(in_point) || !is_valid_time_sec(out_point) {
                    return Err(CoreError::ValidationError(
                        "Loop region bounds must be finite and non-negative".to_string(),
                    ));
                }
                if in_point >= out_point {
                    return Err(CoreError::InvalidTimeRange(in_point, out_point));
                }
                Some(TimeRange::new(in_point, out_point))
            }
            None => None,
        };

        self.previous = Some(timeline.loop_region.clone());
        timeline.loop_region = new_region;
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id).with_change(StateChange::TimelineModified))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(previous) = &self.previous {
            timeline.loop_region = previous.clone();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SetLoopRegion"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
