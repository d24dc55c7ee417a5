//! Deterministic board-game logic shared across front-ends.
//!
//! `board-core` defines the canonical rules (tile graph, actors, partners,
//! combat resolution, turn order) and exposes pure APIs that can be reused
//! by both the runtime and offline tools. Nothing in this crate performs
//! I/O or waits on input; every suspension point lives in `board-runtime`.
pub mod actor;
pub mod board;
pub mod combat;
pub mod partner;
pub mod turn;

pub use actor::{Actor, ActorId, SalaryOutcome, SalaryReport, Slot};
pub use board::{
    BoardError, BoardGraph, Facing, Position, TileEffect, TileId, TileKind, TileNode,
};
pub use combat::{AttackReport, apply_attack, resolve_attack};
pub use partner::{DamageOutcome, PartnerTemplate, PartnerUnit, Personality, TemplateId};
pub use turn::{MatchState, Phase, TurnOrderEntry, sort_turn_order};
