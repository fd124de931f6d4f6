//! Command Trait Definition
//!
//! Defines the trait that all edit commands must implement.

use serde::{Deserialize, Serialize};

use crate::{timeline::Timeline, CoreResult, OpId};

/// Command execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Generated Operation ID
    pub op_id: OpId,

    /// List of state changes
    pub changes: Vec<StateChange>,

    /// Newly created IDs (clips, tracks, etc.)
    pub created_ids: Vec<String>,

    /// Deleted IDs
    pub deleted_ids: Vec<String>,
}

impl CommandResult {
    /// Creates a new empty command result with the given operation ID
    pub fn new(op_id: &str) -> Self {
        Self {
            op_id: op_id.to_string(),
            changes: vec![],
            created_ids: vec![],
            deleted_ids: vec![],
        }
    }

    /// Adds a state change
    pub fn with_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Adds a created ID
    pub fn with_created_id(mut self, id: &str) -> Self {
        self.created_ids.push(id.to_string());
        self
    }

    /// Adds a deleted ID
    pub fn with_deleted_id(mut self, id: &str) -> Self {
        self.deleted_ids.push(id.to_string());
        self
    }
}

/// State change types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    ClipCreated { clip_id: String },
    ClipModified { clip_id: String },
    ClipDeleted { clip_id: String },
    TrackCreated { track_id: String },
    TrackModified { track_id: String },
    TrackDeleted { track_id: String },
    MarkerAdded { marker_id: String },
    MarkerRemoved { marker_id: String },
    FilterApplied { filter_id: String },
    FilterRemoved { filter_id: String },
    TimelineModified,
}

/// Trait that all edit commands must implement
///
/// # Core Principles
/// - All state changes must go through Commands.
/// - All Commands must be undoable.
/// - Commands must be serializable (for log storage).
/// - On failure the timeline is left unchanged: validate everything
///   before mutating anything.
pub trait Command: Send + Sync {
    /// Execute the command
    ///
    /// Modifies the timeline and returns the result.
    /// On failure, the timeline must remain unchanged.
    /// Uses &mut self to allow storing undo state during execution.
    fn execute(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult>;

    /// Undo the command
    ///
    /// Inverse operation of execute.
    /// Only called after execute succeeds.
    fn undo(&self, timeline: &mut Timeline) -> CoreResult<()>;

    /// Redo the command
    ///
    /// Default implementation is identical to execute.
    fn redo(&mut self, timeline: &mut Timeline) -> CoreResult<CommandResult> {
        self.execute(timeline)
    }

    /// Command type name
    ///
    /// Used for log storage and debugging.
    fn type_name(&self) -> &'static str;

    /// JSON serialization
    fn to_json(&self) -> serde_json::Value;
}
