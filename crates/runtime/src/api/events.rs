//! Events emitted during the match for front-ends to observe.
//!
//! Consumers subscribe through [`crate::MatchSession::subscribe`] and react
//! to phase and state changes without blocking the session; delivery is
//! fire-and-forget over a broadcast channel. A `PhaseChanged` event is
//! always published before any work bound to that phase begins, so
//! observers (camera, HUD, roll-button enablement) see transitions in a
//! deterministic order.

use board_core::{ActorId, AttackReport, Phase, Slot, TemplateId, TileId, TileKind};

/// Events emitted by the session while a match runs.
#[derive(Debug, Clone)]
pub enum MatchEvent {
    /// The turn state machine entered a new phase.
    PhaseChanged { phase: Phase },
    /// An actor's roll for the initial turn order arrived.
    OrderRollReceived { actor: ActorId, roll: u32 },
    /// All order rolls are in; this is the final turn order.
    TurnOrderResolved { order: Vec<ActorId> },
    /// The named actor's turn began.
    TurnStarted { actor: ActorId },
    /// The movement roll for the current turn arrived.
    DiceRolled { actor: ActorId, roll: u32 },
    /// One movement step completed; `remaining` counts down to zero.
    StepTaken {
        actor: ActorId,
        tile: TileId,
        remaining: u32,
    },
    /// An actor's energy changed (salary, tile kind, effect).
    EnergyChanged { actor: ActorId, energy: i32 },
    /// An actor's health changed (tile effect, combat spill-through).
    HealthChanged { actor: ActorId, health: i32 },
    /// A collision battle was resolved.
    BattleResolved {
        attacker: ActorId,
        defender: ActorId,
        front_attack: bool,
        report: AttackReport,
    },
    /// A partner joined an actor's slot.
    PartnerRecruited {
        actor: ActorId,
        slot: Slot,
        template: TemplateId,
    },
    /// A slot's previous occupant was displaced by a new recruit.
    PartnerReplaced {
        actor: ActorId,
        slot: Slot,
        partner: String,
    },
    /// A partner was destroyed in combat.
    PartnerDied {
        actor: ActorId,
        slot: Slot,
        partner: String,
    },
    /// A partner walked out after going unpaid for too long.
    PartnerUnpaidRemoval {
        actor: ActorId,
        slot: Slot,
        partner: String,
    },
    /// The landed tile's effects and kind handler finished.
    TileResolved {
        actor: ActorId,
        tile: TileId,
        kind: TileKind,
    },
    /// Movement for the turn finished (all steps, or early termination).
    MovementFinished { actor: ActorId },
}
