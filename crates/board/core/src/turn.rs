//! Match-wide turn state: phase, turn order, and actor storage.
//!
//! The phase machine itself is driven by the runtime session; this module
//! holds the observable state and the pure pieces (ordering, defensive
//! accessors, co-location queries).

use std::cmp::Reverse;

use crate::actor::{Actor, ActorId};
use crate::board::{BoardGraph, TileId};

/// Current step of the turn state machine, observable by external systems.
///
/// Transitions are strictly linear except for the one-time `RollingOrder`
/// loop at match start and the `Combat` sub-phase entered from `Moving`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    RollingOrder,
    StartingTurn,
    WaitingForRoll,
    Moving,
    ResolvingTile,
    Combat,
    EndingTurn,
}

/// One actor's roll during the initial turn-order phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnOrderEntry {
    pub actor: ActorId,
    pub roll: u32,
}

/// Sorts roll entries into the final turn order: descending by roll,
/// stable, so equal rolls keep their roll-arrival order. That tie policy
/// is deliberate and relied upon by the session.
pub fn sort_turn_order(mut entries: Vec<TurnOrderEntry>) -> Vec<TurnOrderEntry> {
    entries.sort_by_key(|entry| Reverse(entry.roll));
    entries
}

/// Authoritative state of one match.
#[derive(Clone, Debug)]
pub struct MatchState {
    board: BoardGraph,
    actors: Vec<Actor>,
    turn_order: Vec<ActorId>,
    current_index: usize,
    phase: Phase,
}

impl MatchState {
    pub fn new(board: BoardGraph, actors: Vec<Actor>) -> Self {
        Self {
            board,
            actors,
            turn_order: Vec::new(),
            current_index: 0,
            phase: Phase::RollingOrder,
        }
    }

    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id() == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id() == id)
    }

    /// Disjoint mutable borrows of two different actors, for combat.
    pub fn actor_pair_mut(&mut self, a: ActorId, b: ActorId) -> Option<(&mut Actor, &mut Actor)> {
        if a == b {
            return None;
        }
        let ia = self.actors.iter().position(|x| x.id() == a)?;
        let ib = self.actors.iter().position(|x| x.id() == b)?;
        if ia < ib {
            let (left, right) = self.actors.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.actors.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Ids of actors other than `except` standing on `tile`, in
    /// registration order.
    pub fn actors_on_tile(&self, tile: TileId, except: ActorId) -> Vec<ActorId> {
        self.actors
            .iter()
            .filter(|a| a.id() != except && a.current_tile() == tile)
            .map(Actor::id)
            .collect()
    }

    pub fn turn_order(&self) -> &[ActorId] {
        &self.turn_order
    }

    pub fn set_turn_order(&mut self, order: Vec<ActorId>) {
        self.turn_order = order;
        self.current_index = 0;
    }

    /// Id of the actor whose turn it is. Returns `None` when the order is
    /// empty or the index is out of range; callers treat absence as "do
    /// nothing this tick" rather than faulting.
    pub fn current_actor_id(&self) -> Option<ActorId> {
        self.turn_order.get(self.current_index).copied()
    }

    pub fn current_actor(&self) -> Option<&Actor> {
        self.current_actor_id().and_then(|id| self.actor(id))
    }

    pub fn current_actor_mut(&mut self) -> Option<&mut Actor> {
        let id = self.current_actor_id()?;
        self.actor_mut(id)
    }

    /// Advances to the next entry in the turn order, wrapping around.
    pub fn advance_turn(&mut self) {
        if self.turn_order.is_empty() {
            return;
        }
        self.current_index = (self.current_index + 1) % self.turn_order.len();
    }
}
