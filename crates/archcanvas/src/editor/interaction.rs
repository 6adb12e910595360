//! Interaction mode state machine
//!
//! Pointer and keyboard input is folded into a single [`InteractionMode`]
//! plus two modifier flags. [`InteractionState::reduce`] is pure: it returns
//! the next state and a list of [`Effect`]s for the editor to apply, so the
//! priority rules can be tested without a model.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{HitTarget, Selection};
use crate::core::{Position, Rect};

/// The single active interaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning {
        last: Position,
    },
    BoxSelecting {
        origin: Position,
        current: Position,
    },
    /// `grab` is the pointer offset from the dragged node's origin
    DraggingNodes {
        node_id: String,
        grab: Position,
        companions: Vec<String>,
        moved: bool,
    },
    DraggingLabel {
        label_id: String,
        grab: Position,
    },
    Connecting {
        from: String,
    },
    CustomArrowEditing {
        connection_id: String,
    },
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::Panning { .. } => "panning",
            InteractionMode::BoxSelecting { .. } => "box_selecting",
            InteractionMode::DraggingNodes { .. } => "dragging_nodes",
            InteractionMode::DraggingLabel { .. } => "dragging_label",
            InteractionMode::Connecting { .. } => "connecting",
            InteractionMode::CustomArrowEditing { .. } => "custom_arrow_editing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }
}

/// Modifier keys tracked independently of the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    pub space_held: bool,
    pub shift_held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Space,
    Shift,
    Escape,
    Delete,
    Backspace,
    Other,
}

/// Where keyboard focus was when a key event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Focus {
    #[default]
    Canvas,
    TextInput,
}

/// Input events in canvas coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    PointerDown {
        at: Position,
        target: HitTarget,
        #[serde(default)]
        toggle: bool,
    },
    PointerMove {
        at: Position,
    },
    PointerUp {
        at: Position,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        focus: Focus,
    },
    KeyUp {
        key: Key,
    },
    WindowBlur,
    BeginConnect {
        from: String,
    },
    OpenCustomArrowEditor {
        connection_id: String,
    },
    CloseCustomArrowEditor,
}

/// Work the editor performs after a transition, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    ClearSelection,
    SelectNode { id: String },
    ToggleNodeSelection { id: String },
    SelectTextLabel { id: String },
    DragNode {
        node_id: String,
        proposed: Position,
        companions: Vec<String>,
    },
    MoveTextLabel { id: String, position: Position },
    FinishNodeDrag,
    SelectInRect { rect: Rect },
    CreateConnection { from: String, to: String },
    DeleteSelection,
    Pan { dx: f64, dy: f64 },
}

/// Result of reducing one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: InteractionState,
    pub effects: Vec<Effect>,
}

/// Mode plus modifiers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractionState {
    pub mode: InteractionMode,
    pub modifiers: Modifiers,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce `event` and adopt the resulting state
    pub fn apply(&mut self, event: &InputEvent, selection: &Selection) -> Vec<Effect> {
        let Transition { next, effects } = self.reduce(event, selection);
        if next.mode.name() != self.mode.name() {
            trace!(from = self.mode.name(), to = next.mode.name(), "Interaction mode changed");
        }
        *self = next;
        effects
    }

    /// Compute the next state for `event` without touching `self`
    pub fn reduce(&self, event: &InputEvent, selection: &Selection) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();

        match event {
            InputEvent::PointerDown { at, target, toggle } => {
                if matches!(self.mode, InteractionMode::CustomArrowEditing { .. }) {
                    return Transition { next, effects };
                }
                if let InteractionMode::DraggingNodes { moved: true, .. } = self.mode {
                    effects.push(Effect::FinishNodeDrag);
                }
                next.mode = self.pointer_down(*at, target, *toggle, selection, &mut effects);
            }
            InputEvent::PointerMove { at } => {
                next.mode = self.pointer_move(*at, &mut effects);
            }
            InputEvent::PointerUp { at } => {
                next.mode = match &self.mode {
                    InteractionMode::DraggingNodes { moved, .. } => {
                        if *moved {
                            effects.push(Effect::FinishNodeDrag);
                        }
                        InteractionMode::Idle
                    }
                    InteractionMode::BoxSelecting { origin, .. } => {
                        effects.push(Effect::SelectInRect {
                            rect: Rect::from_corners(*origin, *at),
                        });
                        InteractionMode::Idle
                    }
                    InteractionMode::Panning { .. } | InteractionMode::DraggingLabel { .. } => {
                        InteractionMode::Idle
                    }
                    other => other.clone(),
                };
            }
            InputEvent::KeyDown { key, focus } => match key {
                Key::Space if *focus == Focus::Canvas => next.modifiers.space_held = true,
                Key::Shift => next.modifiers.shift_held = true,
                Key::Escape => {
                    if let InteractionMode::DraggingNodes { moved: true, .. } = self.mode {
                        effects.push(Effect::FinishNodeDrag);
                    }
                    next.mode = InteractionMode::Idle;
                    next.modifiers = Modifiers::default();
                    effects.push(Effect::ClearSelection);
                }
                Key::Delete | Key::Backspace if *focus == Focus::Canvas && self.mode.is_idle() => {
                    effects.push(Effect::DeleteSelection);
                }
                _ => {}
            },
            InputEvent::KeyUp { key } => match key {
                Key::Space => {
                    next.modifiers.space_held = false;
                    if matches!(self.mode, InteractionMode::Panning { .. }) {
                        next.mode = InteractionMode::Idle;
                    }
                }
                Key::Shift => {
                    next.modifiers.shift_held = false;
                    if matches!(self.mode, InteractionMode::BoxSelecting { .. }) {
                        next.mode = InteractionMode::Idle;
                    }
                }
                _ => {}
            },
            InputEvent::WindowBlur => {
                next.modifiers.space_held = false;
                if matches!(self.mode, InteractionMode::Panning { .. }) {
                    next.mode = InteractionMode::Idle;
                }
            }
            InputEvent::BeginConnect { from } => {
                if self.mode.is_idle() {
                    next.mode = InteractionMode::Connecting { from: from.clone() };
                }
            }
            InputEvent::OpenCustomArrowEditor { connection_id } => {
                if self.mode.is_idle() {
                    next.mode = InteractionMode::CustomArrowEditing {
                        connection_id: connection_id.clone(),
                    };
                }
            }
            InputEvent::CloseCustomArrowEditor => {
                if matches!(self.mode, InteractionMode::CustomArrowEditing { .. }) {
                    next.mode = InteractionMode::Idle;
                }
            }
        }

        Transition { next, effects }
    }

    /// Pointer-down rules, highest priority first
    fn pointer_down(
        &self,
        at: Position,
        target: &HitTarget,
        toggle: bool,
        selection: &Selection,
        effects: &mut Vec<Effect>,
    ) -> InteractionMode {
        if self.modifiers.space_held {
            return InteractionMode::Panning { last: at };
        }

        if let InteractionMode::Connecting { from } = &self.mode {
            match target {
                HitTarget::Node { id, .. } if id != from => {
                    effects.push(Effect::CreateConnection {
                        from: from.clone(),
                        to: id.clone(),
                    });
                }
                _ => trace!(from = %from, "Connect gesture cancelled"),
            }
            return InteractionMode::Idle;
        }

        match target {
            HitTarget::Background if self.modifiers.shift_held => InteractionMode::BoxSelecting {
                origin: at,
                current: at,
            },
            HitTarget::Node { id, origin } => {
                if toggle {
                    effects.push(Effect::ToggleNodeSelection { id: id.clone() });
                    return InteractionMode::Idle;
                }
                let companions = if selection.in_multi(id) {
                    selection.node_ids().into_iter().filter(|n| n != id).collect()
                } else {
                    effects.push(Effect::SelectNode { id: id.clone() });
                    Vec::new()
                };
                InteractionMode::DraggingNodes {
                    node_id: id.clone(),
                    grab: at - *origin,
                    companions,
                    moved: false,
                }
            }
            HitTarget::TextLabel { id, origin } => {
                effects.push(Effect::SelectTextLabel { id: id.clone() });
                InteractionMode::DraggingLabel {
                    label_id: id.clone(),
                    grab: at - *origin,
                }
            }
            HitTarget::Background => {
                effects.push(Effect::ClearSelection);
                InteractionMode::Idle
            }
        }
    }

    fn pointer_move(&self, at: Position, effects: &mut Vec<Effect>) -> InteractionMode {
        match &self.mode {
            InteractionMode::Panning { last } => {
                effects.push(Effect::Pan {
                    dx: at.x - last.x,
                    dy: at.y - last.y,
                });
                InteractionMode::Panning { last: at }
            }
            InteractionMode::BoxSelecting { origin, .. } => InteractionMode::BoxSelecting {
                origin: *origin,
                current: at,
            },
            InteractionMode::DraggingNodes {
                node_id,
                grab,
                companions,
                ..
            } => {
                effects.push(Effect::DragNode {
                    node_id: node_id.clone(),
                    proposed: at - *grab,
                    companions: companions.clone(),
                });
                InteractionMode::DraggingNodes {
                    node_id: node_id.clone(),
                    grab: *grab,
                    companions: companions.clone(),
                    moved: true,
                }
            }
            InteractionMode::DraggingLabel { label_id, grab } => {
                effects.push(Effect::MoveTextLabel {
                    id: label_id.clone(),
                    position: at - *grab,
                });
                self.mode.clone()
            }
            other => other.clone(),
        }
    }

    /// The in-progress selection rectangle, if any
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.mode {
            InteractionMode::BoxSelecting { origin, current } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }
}
