//! Pointer state machine for drag-to-move, drag-to-pan and click-to-select
//!
//! The machine is a pure function of (state, event); the session applies the
//! returned [`Effect`] to the graph store or the viewport.

use crate::model::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current pointer mode. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    /// Moving `node`; its position is the world pointer plus `offset`.
    DraggingNode { node: String, offset: Point },
    /// Panning; `last` is the screen point of the previous event.
    Panning { last: Point },
}

/// Node under the pointer when it went down.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTarget {
    pub id: String,
    pub position: Point,
}

/// A pointer event with both coordinate spaces resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { screen: Point, world: Point, hit: Option<HitTarget> },
    Move { screen: Point, world: Point },
    Up,
    Leave,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Select(String),
    MoveNode { id: String, to: Point },
    /// Screen-space delta to pan by.
    Pan { dx: f64, dy: f64 },
}

/// Raw pointer input in screen coordinates, as delivered by a host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerInput {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
}

/// Compute the next state and the effect of `event` in `state`.
pub fn transition(state: &PointerState, event: PointerEvent) -> (PointerState, Option<Effect>) {
    use PointerEvent::*;
    use PointerState::*;

    match (state, event) {
        (Idle, Down { world, hit: Some(hit), .. }) => {
            let offset = hit.position - world;
            let effect = Effect::Select(hit.id.clone());
            (DraggingNode { node: hit.id, offset }, Some(effect))
        }
        (Idle, Down { screen, hit: None, .. }) => (Panning { last: screen }, None),
        (DraggingNode { node, offset }, Move { world, .. }) => {
            let effect = Effect::MoveNode { id: node.clone(), to: world + *offset };
            (state.clone(), Some(effect))
        }
        (Panning { last }, Move { screen, .. }) => {
            let effect = Effect::Pan { dx: screen.x - last.x, dy: screen.y - last.y };
            (Panning { last: screen }, Some(effect))
        }
        (DraggingNode { .. } | Panning { .. }, Up | Leave) => (Idle, None),
        (DraggingNode { .. } | Panning { .. }, Down { .. }) => {
            debug!("Ignoring pointer-down while {:?}", state);
            (state.clone(), None)
        }
        (Idle, Move { .. } | Up | Leave) => (Idle, None),
    }
}

/// Holds the pointer state between events.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: PointerState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Advance the machine and return the effect to apply.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Effect> {
        let (next, effect) = transition(&self.state, event);
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            debug!("Pointer state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        effect
    }

    /// Drop any drag/pan bookkeeping.
    pub fn reset(&mut self) {
        self.state = PointerState::Idle;
    }
}
