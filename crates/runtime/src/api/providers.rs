//! Asynchronous abstractions for sourcing external input.
//!
//! The session plugs in provider implementations so the match can run with
//! human input, scripted fixtures, or automated policies. Each call is a
//! genuine suspension point: the session awaits the future and does no
//! other phase work until it resolves. Cancellation mid-flow is not
//! supported; a provider must eventually answer.

use async_trait::async_trait;
use board_core::{ActorId, Slot, TemplateId, TileId, TileKind};

use super::errors::Result;

/// Source of dice rolls.
///
/// The returned value is treated as uniformly distributed over
/// `[min, max]` inclusive. Values outside the range are clamped (with a
/// warning) rather than rejected.
#[async_trait]
pub trait DiceProvider: Send + Sync {
    async fn request_roll(&self, actor: ActorId, min: u32, max: u32) -> Result<u32>;
}

/// Resolves a fork in the board: given the candidate tiles, eventually
/// answers with exactly one of them.
#[async_trait]
pub trait TileChoiceProvider: Send + Sync {
    async fn choose_tile(&self, actor: ActorId, options: &[TileId]) -> Result<TileId>;
}

/// Resolves a recruitment draw: given up to three candidate templates,
/// eventually answers with one of them and the slot to install it in.
#[async_trait]
pub trait PartnerChoiceProvider: Send + Sync {
    async fn choose_partner(
        &self,
        actor: ActorId,
        options: &[TemplateId],
    ) -> Result<(TemplateId, Slot)>;
}

/// A line of dialogue or a warning surfaced to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub message: String,
    /// Opaque portrait handle for the presentation layer.
    pub portrait: Option<String>,
    pub speaker: Option<String>,
}

impl Note {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            portrait: None,
            speaker: None,
        }
    }

    pub fn from_speaker(
        message: impl Into<String>,
        speaker: impl Into<String>,
        portrait: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            portrait: Some(portrait.into()),
            speaker: Some(speaker.into()),
        }
    }
}

/// Sink for warnings and death lines.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Fire-and-forget notification; the session does not wait.
    async fn notify(&self, note: Note) -> Result<()>;

    /// Blocking notification; completes only once the player acknowledged
    /// it. Used for final salary warnings and death dialogue.
    async fn notify_blocking(&self, note: Note) -> Result<()> {
        self.notify(note).await
    }
}

/// Hook invoked for tile kinds whose behavior is game content rather than
/// core rules (Battle, Chance, Event, Swap, Store). The default does
/// nothing.
#[async_trait]
pub trait TileHook: Send + Sync {
    async fn on_tile(&self, actor: ActorId, kind: TileKind) -> Result<()> {
        let _ = (actor, kind);
        Ok(())
    }
}

// Shared providers are common (one UI panel answering for every actor),
// so every trait is implemented for Arc<T> by delegation.

#[async_trait]
impl<T: DiceProvider + ?Sized> DiceProvider for std::sync::Arc<T> {
    async fn request_roll(&self, actor: ActorId, min: u32, max: u32) -> Result<u32> {
        (**self).request_roll(actor, min, max).await
    }
}

#[async_trait]
impl<T: TileChoiceProvider + ?Sized> TileChoiceProvider for std::sync::Arc<T> {
    async fn choose_tile(&self, actor: ActorId, options: &[TileId]) -> Result<TileId> {
        (**self).choose_tile(actor, options).await
    }
}

#[async_trait]
impl<T: PartnerChoiceProvider + ?Sized> PartnerChoiceProvider for std::sync::Arc<T> {
    async fn choose_partner(
        &self,
        actor: ActorId,
        options: &[TemplateId],
    ) -> Result<(TemplateId, Slot)> {
        (**self).choose_partner(actor, options).await
    }
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    async fn notify(&self, note: Note) -> Result<()> {
        (**self).notify(note).await
    }

    async fn notify_blocking(&self, note: Note) -> Result<()> {
        (**self).notify_blocking(note).await
    }
}

#[async_trait]
impl<T: TileHook + ?Sized> TileHook for std::sync::Arc<T> {
    async fn on_tile(&self, actor: ActorId, kind: TileKind) -> Result<()> {
        (**self).on_tile(actor, kind).await
    }
}
