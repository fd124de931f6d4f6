//! Document Event Broadcasting
//!
//! Data types carry no observers; change notifications are published at the
//! document level after successful command execution, undo, or redo.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::commands::{CommandResult, StateChange};
use crate::OpId;

/// What happened to the document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentEventKind {
    Executed,
    Undone,
    Redone,
}

/// A document-level change notification
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    pub kind: DocumentEventKind,
    /// Operation ID of the command, when one is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_id: Option<OpId>,
    /// Individual state changes carried by the operation
    pub changes: Vec<StateChange>,
}

impl DocumentEvent {
    /// Builds an execution event from a command result
    pub fn executed(result: &CommandResult) -> Self {
        Self {
            kind: DocumentEventKind::Executed,
            op_id: Some(result.op_id.clone()),
            changes: result.changes.clone(),
        }
    }

    /// Builds a redo event from a command result
    pub fn redone(result: &CommandResult) -> Self {
        Self {
            kind: DocumentEventKind::Redone,
            op_id: Some(result.op_id.clone()),
            changes: result.changes.clone(),
        }
    }

    /// Builds an undo event for a previously executed operation
    pub fn undone(op_id: &str) -> Self {
        Self {
            kind: DocumentEventKind::Undone,
            op_id: Some(op_id.to_string()),
            changes: vec![],
        }
    }
}

/// Broadcasts document events to any number of subscribers.
///
/// A broadcaster with no subscribers is valid; publishing is then a no-op.
/// Publishing never fails an edit.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<DocumentEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to document events
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers
    pub fn publish(&self, event: DocumentEvent) {
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "published document event"),
            // No subscribers; nothing to deliver.
            Err(_) => debug!("document event dropped (no subscribers)"),
        }
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

// =============================================================================
// Tests
// =============================================================================
