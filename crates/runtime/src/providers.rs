//! Ready-made provider implementations.
//!
//! `UniformDice` is the production default; the scripted variants exist
//! for tests and replayable fixtures, and the `First*` choosers are
//! fallbacks that never suspend on a human.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use board_core::{ActorId, Slot, TemplateId, TileId};
use rand::Rng;
use tracing::debug;

use crate::api::errors::{Result, RuntimeError};
use crate::api::providers::{
    DiceProvider, NotificationSink, Note, PartnerChoiceProvider, TileChoiceProvider, TileHook,
};

/// Uniformly random dice rolls.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformDice;

#[async_trait]
impl DiceProvider for UniformDice {
    async fn request_roll(&self, _actor: ActorId, min: u32, max: u32) -> Result<u32> {
        if min >= max {
            return Ok(min);
        }
        Ok(rand::thread_rng().gen_range(min..=max))
    }
}

/// Dice that replay a fixed sequence of rolls.
#[derive(Debug, Default)]
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<u32>>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DiceProvider for ScriptedDice {
    async fn request_roll(&self, _actor: ActorId, _min: u32, _max: u32) -> Result<u32> {
        self.rolls
            .lock()
            .map_err(|_| RuntimeError::Provider("scripted dice mutex poisoned".into()))?
            .pop_front()
            .ok_or(RuntimeError::ScriptExhausted("dice"))
    }
}

/// Always takes the first candidate at a fork.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstTileChooser;

#[async_trait]
impl TileChoiceProvider for FirstTileChooser {
    async fn choose_tile(&self, actor: ActorId, options: &[TileId]) -> Result<TileId> {
        options.first().copied().ok_or_else(|| {
            RuntimeError::Provider(format!("no tile candidates offered to {actor}"))
        })
    }
}

/// Plays back a fixed sequence of fork choices.
#[derive(Debug, Default)]
pub struct ScriptedTileChooser {
    choices: Mutex<VecDeque<TileId>>,
}

impl ScriptedTileChooser {
    pub fn new(choices: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            choices: Mutex::new(choices.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TileChoiceProvider for ScriptedTileChooser {
    async fn choose_tile(&self, _actor: ActorId, _options: &[TileId]) -> Result<TileId> {
        self.choices
            .lock()
            .map_err(|_| RuntimeError::Provider("scripted tile chooser mutex poisoned".into()))?
            .pop_front()
            .ok_or(RuntimeError::ScriptExhausted("tile choice"))
    }
}

/// Recruits the first offered template into a fixed slot.
#[derive(Debug, Clone, Copy)]
pub struct FirstPartnerChooser {
    pub slot: Slot,
}

impl Default for FirstPartnerChooser {
    fn default() -> Self {
        Self { slot: Slot::Front }
    }
}

#[async_trait]
impl PartnerChoiceProvider for FirstPartnerChooser {
    async fn choose_partner(
        &self,
        actor: ActorId,
        options: &[TemplateId],
    ) -> Result<(TemplateId, Slot)> {
        let template = options.first().copied().ok_or_else(|| {
            RuntimeError::Provider(format!("no recruitment candidates offered to {actor}"))
        })?;
        Ok((template, self.slot))
    }
}

/// Plays back a fixed sequence of recruitment picks.
#[derive(Debug, Default)]
pub struct ScriptedPartnerChooser {
    picks: Mutex<VecDeque<(TemplateId, Slot)>>,
}

impl ScriptedPartnerChooser {
    pub fn new(picks: impl IntoIterator<Item = (TemplateId, Slot)>) -> Self {
        Self {
            picks: Mutex::new(picks.into_iter().collect()),
        }
    }
}

#[async_trait]
impl PartnerChoiceProvider for ScriptedPartnerChooser {
    async fn choose_partner(
        &self,
        _actor: ActorId,
        _options: &[TemplateId],
    ) -> Result<(TemplateId, Slot)> {
        self.picks
            .lock()
            .map_err(|_| RuntimeError::Provider("scripted partner chooser mutex poisoned".into()))?
            .pop_front()
            .ok_or(RuntimeError::ScriptExhausted("partner choice"))
    }
}

/// Logs notes at debug level and acknowledges immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl NotificationSink for NullNotifier {
    async fn notify(&self, note: Note) -> Result<()> {
        debug!(speaker = ?note.speaker, "{}", note.message);
        Ok(())
    }
}

/// Collects every note for later inspection. Test fixture.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for CollectingNotifier {
    async fn notify(&self, note: Note) -> Result<()> {
        self.notes
            .lock()
            .map_err(|_| RuntimeError::Provider("collecting notifier mutex poisoned".into()))?
            .push(note);
        Ok(())
    }
}

/// Tile hook that does nothing; the default for sessions without content
/// handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTileHook;

#[async_trait]
impl TileHook for NoopTileHook {}
