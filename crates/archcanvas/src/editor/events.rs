//! Mutation events
//!
//! Every change to the diagram model is recorded as an event the host can
//! drain to persist, log or export. Pending events are bounded: repeated
//! moves of a node collapse into one, and the oldest events are dropped once
//! the log is full.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ConnectionType, Position, DEFAULT_EVENT_CAPACITY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum MutationEvent {
    NodeCreated { id: String },
    NodeMoved { id: String, position: Position },
    NodeUpdated { id: String },
    NodeDeleted { id: String },
    ConnectionCreated { id: String, from: String, to: String },
    ConnectionUpdated {
        id: String,
        #[serde(rename = "type")]
        connection_type: ConnectionType,
    },
    ConnectionDeleted { id: String },
    TextLabelCreated { id: String },
    TextLabelUpdated { id: String },
    TextLabelDeleted { id: String },
    ContentShifted { dx: f64, dy: f64 },
    CanvasResized { width: f64, height: f64 },
    SelectionChanged,
}

impl MutationEvent {
    /// Short name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            MutationEvent::NodeCreated { .. } => "node_created",
            MutationEvent::NodeMoved { .. } => "node_moved",
            MutationEvent::NodeUpdated { .. } => "node_updated",
            MutationEvent::NodeDeleted { .. } => "node_deleted",
            MutationEvent::ConnectionCreated { .. } => "connection_created",
            MutationEvent::ConnectionUpdated { .. } => "connection_updated",
            MutationEvent::ConnectionDeleted { .. } => "connection_deleted",
            MutationEvent::TextLabelCreated { .. } => "text_label_created",
            MutationEvent::TextLabelUpdated { .. } => "text_label_updated",
            MutationEvent::TextLabelDeleted { .. } => "text_label_deleted",
            MutationEvent::ContentShifted { .. } => "content_shifted",
            MutationEvent::CanvasResized { .. } => "canvas_resized",
            MutationEvent::SelectionChanged => "selection_changed",
        }
    }

    /// True for events that change persisted content rather than view state
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            MutationEvent::SelectionChanged | MutationEvent::CanvasResized { .. }
        )
    }
}

/// Bounded queue of undrained mutation events
#[derive(Debug, Clone)]
pub struct EventLog {
    pending: VecDeque<MutationEvent>,
    capacity: usize,
    dropped: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog {
    /// A capacity of zero keeps nothing
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Events discarded since the last drain because the log was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn push(&mut self, event: MutationEvent) {
        if let MutationEvent::NodeMoved { id, position } = &event {
            // merge only within the trailing run of moves
            let run = self
                .pending
                .iter_mut()
                .rev()
                .take_while(|e| matches!(e, MutationEvent::NodeMoved { .. }));
            for pending in run {
                if let MutationEvent::NodeMoved {
                    id: pending_id,
                    position: pending_position,
                } = pending
                {
                    if *pending_id == *id {
                        *pending_position = *position;
                        return;
                    }
                }
            }
        }

        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.pending.len() == self.capacity {
            self.pending.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                debug!(capacity = self.capacity, "Event log full, dropping oldest events");
            }
        }
        self.pending.push_back(event);
    }

    /// Take every pending event and reset the drop counter
    pub fn drain(&mut self) -> Vec<MutationEvent> {
        self.dropped = 0;
        self.pending.drain(..).collect()
    }
}
