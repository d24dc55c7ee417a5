//! Public API surface: provider traits, events, and error types.

pub mod errors;
pub mod events;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use events::MatchEvent;
pub use providers::{
    DiceProvider, NotificationSink, Note, PartnerChoiceProvider, TileChoiceProvider, TileHook,
};
