//! Project State
//!
//! The project wraps the timeline document with session state (dirty flag)
//! and a thin, versioned JSON snapshot. The external persistence layer owns
//! the real project format; this snapshot keeps the model round-trippable
//! and is what the CLI consumes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::timeline::Timeline;
use crate::{CoreError, CoreResult, Ratio};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Project state (the open editing session)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub timeline: Timeline,
    pub created_at: String,
    /// Unsaved-changes flag; session-only
    #[serde(skip)]
    pub is_dirty: bool,
}

impl Project {
    /// Creates a new project with an empty timeline
    pub fn new(name: &str, fps: Ratio) -> Self {
        Self {
            name: name.to_string(),
            timeline: Timeline::new(name, fps),
            created_at: chrono::Utc::now().to_rfc3339(),
            is_dirty: false,
        }
    }

    /// Marks the project as saved
    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }
}

/// Versioned snapshot envelope
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub version: u32,
    pub project: Project,
}

impl ProjectSnapshot {
    /// Wraps a project in the current snapshot version
    pub fn new(project: Project) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            project,
        }
    }

    /// Saves the snapshot as pretty JSON. Writes to a temporary sibling
    /// first, then renames, so a crash never leaves a truncated snapshot.
    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)?;
        fs::rename(&tmp_path, path)?;

        info!(path = %path.display(), "saved project snapshot");
        Ok(())
    }

    /// Loads and validates a snapshot
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let json = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&json)?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(CoreError::ValidationError(format!(
                "Snapshot version {} is newer than supported version {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

// =============================================================================
// Tests
// =============================================================================
