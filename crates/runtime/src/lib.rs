//! Cooperative match orchestrator.
//!
//! `board-runtime` drives the turn/phase state machine over the pure rules
//! in `board-core`. Every point where the game waits on the outside world
//! (dice button, fork choice, recruitment pick, dialogue acknowledgment)
//! is an `.await` on an injected provider, so the whole match runs as one
//! logical thread of control: no two phase-bound operations ever overlap,
//! and a suspended sub-flow (combat, recruitment) must finish before the
//! next phase begins.

pub mod api;
pub mod config;
pub mod providers;
pub mod session;

pub use api::{
    DiceProvider, MatchEvent, NotificationSink, Note, PartnerChoiceProvider, Result, RuntimeError,
    TileChoiceProvider, TileHook,
};
pub use config::SessionConfig;
pub use session::{MatchSession, SessionBuilder};
