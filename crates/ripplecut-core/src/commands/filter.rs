//! Filter Commands Module
//!
//! Manages the ordered filter pipeline attached to clips: add, remove,
//! enable/disable, favorites, and paste of copied pipelines.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{locate_on_unlocked_track, Command, CommandResult, StateChange},
    filters::Filter,
    timeline::Timeline,
    ClipId, CoreError, CoreResult, FilterId,
};

// =============================================================================
// AddFilterCommand
// =============================================================================

/// Command to append a filter to a clip's pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFilterCommand {
    /// Target clip ID
    pub clip_id: ClipId,
    /// Filter to append
    pub filter: Filter,
    #[serde(skip)]
    added_filter_id: Option<FilterId>,
}

impl AddFilterCommand {
    pub fn new(clip_id: &str, filter: Filter) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            filter,
            added_filter_id: None,
        }
    }
}

impl Command for AddFilterCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        let filter = self.filter.clone();
        let filter_id = filter.id.clone();
        self.added_filter_id = Some(filter_id.clone());
        clip.filters.push(filter);

        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::FilterApplied {
                filter_id: filter_id.clone(),
            })
            .with_created_id(&filter_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some(filter_id) = &self.added_filter_id {
            if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
                timeline.tracks[t_idx].clips[c_idx]
                    .filters
                    .retain(|f| &f.id != filter_id);
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AddFilter"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RemoveFilterCommand
// =============================================================================

/// Command to remove a filter from a clip's pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFilterCommand {
    /// Target clip ID
    pub clip_id: ClipId,
    /// Filter ID to remove
    pub filter_id: FilterId,
    /// Removed filter and its pipeline position (for undo)
    #[serde(skip)]
    removed: Option<(usize, Filter)>,
}

impl RemoveFilterCommand {
    pub fn new(clip_id: &str, filter_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            filter_id: filter_id.to_string(),
            removed: None,
        }
    }
}

impl Command for RemoveFilterCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        let idx = clip
            .filters
            .iter()
            .position(|f| f.id == self.filter_id)
            .ok_or_else(|| CoreError::FilterNotFound {
                clip_id: self.clip_id.clone(),
                filter_id: self.filter_id.clone(),
            })?;

        let removed = clip.filters.remove(idx);
        self.removed = Some((idx, removed));

        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::FilterRemoved {
                filter_id: self.filter_id.clone(),
            })
            .with_deleted_id(&self.filter_id))
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some((idx, filter)) = &self.removed {
            if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
                let filters = &mut timeline.tracks[t_idx].clips[c_idx].filters;
                let idx = (*idx).min(filters.len());
                filters.insert(idx, filter.clone());
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RemoveFilter"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SetFilterEnabledCommand
// =============================================================================

/// Command to enable or disable a filter in place. Idempotent.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFilterEnabledCommand {
    pub clip_id: ClipId,
    pub filter_id: FilterId,
    pub enabled: bool,
    #[serde(skip)]
    previous_enabled: Option<bool>,
}

impl SetFilterEnabledCommand {
    pub fn new(clip_id: &str, filter_id: &str, enabled: bool) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            filter_id: filter_id.to_string(),
            enabled,
            previous_enabled: None,
        }
    }
}

impl Command for SetFilterEnabledCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        let filter = clip
            .filters
            .iter_mut()
            .find(|f| f.id == self.filter_id)
            .ok_or_else(|| CoreError::FilterNotFound {
                clip_id: self.clip_id.clone(),
                filter_id: self.filter_id.clone(),
            })?;

        self.previous_enabled = Some(filter.enabled);
        filter.set_enabled(self.enabled);

        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let Some(previous_enabled) = self.previous_enabled else {
            return Ok(());
        };
        if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
            if let Some(filter) = timeline.tracks[t_idx].clips[c_idx]
                .filters
                .iter_mut()
                .find(|f| f.id == self.filter_id)
            {
                filter.set_enabled(previous_enabled);
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SetFilterEnabled"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// ToggleFilterFavoriteCommand
// =============================================================================

/// Command to flip a filter's favorite flag in place
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFilterFavoriteCommand {
    pub clip_id: ClipId,
    pub filter_id: FilterId,
}

impl ToggleFilterFavoriteCommand {
    pub fn new(clip_id: &str, filter_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            filter_id: filter_id.to_string(),
        }
    }

    fn toggle(&self, timeline: &mut Timeline) -> CoreResult<()> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let filter = timeline.tracks[t_idx].clips[c_idx]
            .filters
            .iter_mut()
            .find(|f| f.id == self.filter_id)
            .ok_or_else(|| CoreError::FilterNotFound {
                clip_id: self.clip_id.clone(),
                filter_id: self.filter_id.clone(),
            })?;
        filter.toggle_favorite();
        Ok(())
    }
}

impl Command for ToggleFilterFavoriteCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        self.toggle(timeline)?;
        timeline.touch();

        let op_id = ulid::Ulid::new().to_string();
        Ok(
            CommandResult::new(&op_id).with_change(StateChange::ClipModified {
                clip_id: self.clip_id.clone(),
            }),
        )
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        // Toggling twice restores the original state.
        self.toggle(timeline)
    }

    fn type_name(&self) -> &'static str {
        "ToggleFilterFavorite"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// PasteFiltersCommand
// =============================================================================

/// Command to paste a copied filter pipeline onto a clip.
///
/// Copy is `Clip::cloned_filters()`: a deep clone taken at copy time, so
/// later mutation of the source clip never affects the paste. Paste appends
/// in order without disturbing existing filters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteFiltersCommand {
    /// Target clip ID
    pub clip_id: ClipId,
    /// Copied filters, in pipeline order
    pub filters: Vec<Filter>,
    #[serde(skip)]
    pasted_ids: Vec<FilterId>,
}

impl PasteFiltersCommand {
    pub fn new(clip_id: &str, filters: Vec<Filter>) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            filters,
            pasted_ids: vec![],
        }
    }
}

impl Command for PasteFiltersCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        let (t_idx, c_idx) = locate_on_unlocked_track(timeline, &self.clip_id)?;
        let clip = &mut timeline.tracks[t_idx].clips[c_idx];

        self.pasted_ids.clear();
        let op_id = ulid::Ulid::new().to_string();
        let mut result = CommandResult::new(&op_id);

        for filter in &self.filters {
            // Fresh IDs per paste; pasting the same pipeline twice yields
            // independent filter instances.
            let pasted = filter.deep_clone();
            self.pasted_ids.push(pasted.id.clone());
            result = result
                .with_change(StateChange::FilterApplied {
                    filter_id: pasted.id.clone(),
                })
                .with_created_id(&pasted.id);
            clip.filters.push(pasted);
        }

        timeline.touch();
        Ok(result)
    }

    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()> {
        if let Some((t_idx, c_idx)) = timeline.find_clip_location(&self.clip_id) {
            timeline.tracks[t_idx].clips[c_idx]
                .filters
                .retain(|f| !self.pasted_ids.contains(&f.id));
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "PasteFilters"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
