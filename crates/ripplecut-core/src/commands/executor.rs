//! Command Executor Module
//!
//! Handles command execution, undo/redo history, the document dirty flag,
//! and document-level change notifications.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{
    commands::{Command, CommandResult},
    events::{DocumentEvent, EventBroadcaster},
    project::Project,
    CoreError, CoreResult, OpId,
};

// =============================================================================
// History Entry
// =============================================================================

/// Entry in the undo/redo history
pub struct HistoryEntry {
    /// Operation ID
    pub op_id: OpId,
    /// Command that was executed (wrapped in Mutex for interior mutability)
    pub command: Arc<Mutex<Box<dyn Command>>>,
    /// Result from command execution
    pub result: CommandResult,
    /// Timestamp when command was executed
    pub timestamp: String,
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("op_id", &self.op_id)
            .field("result", &self.result)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl HistoryEntry {
    fn new(command: Box<dyn Command>, result: CommandResult) -> Self {
        Self {
            op_id: result.op_id.clone(),
            command: Arc::new(Mutex::new(command)),
            result,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Command Executor
// =============================================================================

/// Executes commands and manages undo/redo history
pub struct CommandExecutor {
    /// Optional document-level event broadcaster
    broadcaster: Option<EventBroadcaster>,
    /// Undo stack
    undo_stack: VecDeque<HistoryEntry>,
    /// Redo stack
    redo_stack: VecDeque<HistoryEntry>,
    /// Maximum history size
    max_history_size: usize,
}

impl CommandExecutor {
    /// Creates a new command executor
    pub fn new() -> Self {
        Self {
            broadcaster: None,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: 100,
        }
    }

    /// Creates a command executor that publishes document events
    pub fn with_broadcaster(broadcaster: EventBroadcaster) -> Self {
        Self {
            broadcaster: Some(broadcaster),
            ..Self::new()
        }
    }

    /// Sets the maximum history size
    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history_size = size;
        self
    }

    fn publish(&self, event: DocumentEvent) {
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.publish(event);
        }
    }

    /// Executes a command and adds it to history
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        project: &mut Project,
    ) -> CoreResult<CommandResult> {
        debug!(
            command = command.type_name(),
            payload = %command.to_json(),
            "executing command"
        );

        // Execute the command (needs &mut self)
        let result = command.execute(&mut project.timeline)?;

        // Clear redo stack when a new command is executed
        self.redo_stack.clear();

        // Add to undo stack
        let entry = HistoryEntry::new(command, result.clone());
        self.undo_stack.push_back(entry);

        // Trim history if needed
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }

        project.is_dirty = true;
        self.publish(DocumentEvent::executed(&result));

        Ok(result)
    }

    /// Undoes the last command
    pub fn undo(&mut self, project: &mut Project) -> CoreResult<()> {
        let entry = self.undo_stack.pop_back().ok_or(CoreError::NothingToUndo)?;

        {
            let command = entry
                .command
                .lock()
                .map_err(|_| CoreError::Internal("Failed to lock command for undo".into()))?;
            command.undo(&mut project.timeline)?;
        }

        let op_id = entry.op_id.clone();
        self.redo_stack.push_back(entry);

        project.is_dirty = true;
        self.publish(DocumentEvent::undone(&op_id));

        Ok(())
    }

    /// Redoes the last undone command
    pub fn redo(&mut self, project: &mut Project) -> CoreResult<CommandResult> {
        let entry = self.redo_stack.pop_back().ok_or(CoreError::NothingToRedo)?;

        let result = {
            let mut command = entry
                .command
                .lock()
                .map_err(|_| CoreError::Internal("Failed to lock command for redo".into()))?;
            command.redo(&mut project.timeline)?
        };

        // Move back to undo stack with updated result
        let new_entry = HistoryEntry {
            op_id: result.op_id.clone(),
            command: entry.command,
            result: result.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.undo_stack.push_back(new_entry);

        project.is_dirty = true;
        self.publish(DocumentEvent::redone(&result));

        Ok(result)
    }

    /// Returns true if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clears all history (undo and redo)
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Gets the last executed command type name
    pub fn last_command_type(&self) -> Option<String> {
        self.undo_stack
            .back()
            .and_then(|e| e.command.lock().ok().map(|cmd| cmd.type_name().to_string()))
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
