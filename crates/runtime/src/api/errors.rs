//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from providers and session configuration so clients can
//! bubble them up with consistent context. Authored-content problems are
//! deliberately NOT here: those are logged and degrade the turn instead of
//! failing it (a match keeps going on bad data; it stops on a broken
//! collaborator).

use board_core::{ActorId, TemplateId, TileId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session requires a board with at least one tile")]
    EmptyBoard,

    #[error("session requires at least one actor")]
    NoActors,

    #[error("actor {0} not found in match state")]
    ActorNotFound(ActorId),

    #[error("tile {0} not found on the board")]
    UnknownTile(TileId),

    #[error("tile choice provider for {actor} returned {chosen}, which is not a candidate")]
    InvalidTileChoice { actor: ActorId, chosen: TileId },

    #[error("partner choice provider for {actor} returned {chosen}, which was not offered")]
    InvalidPartnerChoice { actor: ActorId, chosen: TemplateId },

    #[error("partner template {0} is not registered")]
    MissingTemplate(TemplateId),

    #[error("scripted provider ran out of {0} entries")]
    ScriptExhausted(&'static str),

    #[error("provider failed: {0}")]
    Provider(String),
}
