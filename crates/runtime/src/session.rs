//! High-level match orchestrator.
//!
//! [`MatchSession`] owns the authoritative [`MatchState`] and drives the
//! turn/phase machine: start-turn upkeep, the movement loop with its
//! fork-choice and combat interrupts, tile resolution, and end-of-turn
//! partner attrition. One session per match, built through
//! [`SessionBuilder`] with explicitly injected collaborators; there is no
//! global instance.
//!
//! # Ordering guarantees
//!
//! - A `PhaseChanged` event is broadcast before any work bound to that
//!   phase runs.
//! - Combat entered from within movement suspends the movement loop until
//!   resolution (plus a settle delay) completes.
//! - At most one battle per unordered actor pair per movement step, via
//!   the per-turn battled sets.

use std::collections::HashMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use board_core::{
    Actor, ActorId, BoardGraph, Facing, MatchState, PartnerTemplate, PartnerUnit, Phase,
    SalaryOutcome, Slot, TemplateId, TileEffect, TileId, TileKind, TurnOrderEntry, combat,
    sort_turn_order,
};

use crate::api::errors::{Result, RuntimeError};
use crate::api::events::MatchEvent;
use crate::api::providers::{
    DiceProvider, NotificationSink, Note, PartnerChoiceProvider, TileChoiceProvider, TileHook,
};
use crate::config::SessionConfig;
use crate::providers::{FirstPartnerChooser, FirstTileChooser, NoopTileHook, NullNotifier, UniformDice};

/// One running match.
pub struct MatchSession {
    state: MatchState,
    templates: HashMap<TemplateId, Arc<PartnerTemplate>>,
    dice: Box<dyn DiceProvider>,
    tile_choice: Box<dyn TileChoiceProvider>,
    partner_choice: Box<dyn PartnerChoiceProvider>,
    notifier: Box<dyn NotificationSink>,
    tile_hook: Box<dyn TileHook>,
    config: SessionConfig,
    event_tx: broadcast::Sender<MatchEvent>,
    rng: StdRng,
}

impl std::fmt::Debug for MatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchSession").finish_non_exhaustive()
    }
}

impl MatchSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Subscribe to match events.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.event_tx.subscribe()
    }

    /// Read-only view of the match state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Collects one order roll per actor in registration order, sorts them
    /// descending (stable, so ties keep arrival order), and installs the
    /// turn order. Must run once before the first [`Self::play_turn`].
    pub async fn roll_turn_order(&mut self) -> Result<()> {
        self.set_phase(Phase::RollingOrder);

        let actor_ids: Vec<ActorId> = self.state.actors().iter().map(Actor::id).collect();
        let mut entries = Vec::with_capacity(actor_ids.len());
        for actor in actor_ids {
            let roll = self.request_roll(actor).await?;
            self.emit(MatchEvent::OrderRollReceived { actor, roll });
            entries.push(TurnOrderEntry { actor, roll });
        }

        let order: Vec<ActorId> = sort_turn_order(entries).iter().map(|e| e.actor).collect();
        debug!(?order, "turn order resolved");
        self.state.set_turn_order(order.clone());
        self.emit(MatchEvent::TurnOrderResolved { order });
        Ok(())
    }

    /// Runs `turns` complete turns. Convenience loop over
    /// [`Self::play_turn`].
    pub async fn run(&mut self, turns: usize) -> Result<()> {
        for _ in 0..turns {
            self.play_turn().await?;
        }
        Ok(())
    }

    /// Plays one complete turn for the current actor:
    /// StartingTurn → WaitingForRoll → Moving → ResolvingTile → EndingTurn,
    /// then advances the turn index. An absent current actor (empty or
    /// misconfigured order) skips the turn with a warning instead of
    /// failing the match.
    pub async fn play_turn(&mut self) -> Result<()> {
        self.set_phase(Phase::StartingTurn);
        let Some(actor) = self.state.current_actor_id() else {
            warn!("no current actor; skipping turn");
            return Ok(());
        };
        self.emit(MatchEvent::TurnStarted { actor });
        self.start_turn_upkeep(actor).await?;

        self.set_phase(Phase::WaitingForRoll);
        let roll = self.request_roll(actor).await?;
        self.emit(MatchEvent::DiceRolled { actor, roll });

        self.set_phase(Phase::Moving);
        self.move_actor(actor, roll).await?;
        self.emit(MatchEvent::MovementFinished { actor });

        self.set_phase(Phase::ResolvingTile);
        self.resolve_tile(actor).await?;

        self.set_phase(Phase::EndingTurn);
        self.end_turn_upkeep(actor).await?;
        self.state.advance_turn();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase bodies
    // ------------------------------------------------------------------

    /// Turn-start reset and salary deduction. First-warning grumbles are
    /// fire-and-forget; removal never happens here.
    async fn start_turn_upkeep(&mut self, actor: ActorId) -> Result<()> {
        let (reports, energy) = {
            let state = self
                .state
                .actor_mut(actor)
                .ok_or(RuntimeError::ActorNotFound(actor))?;
            state.begin_turn();
            let reports = state.pay_salaries();
            (reports, state.energy())
        };

        let mut warnings = Vec::new();
        for report in &reports {
            debug!(%actor, slot = %report.slot, outcome = ?report.outcome, "salary");
            if matches!(report.outcome, SalaryOutcome::FirstWarning) {
                if let Some(unit) = self
                    .state
                    .actor(actor)
                    .and_then(|a| a.partner(report.slot))
                {
                    let t = unit.template();
                    warnings.push(Note::from_speaker(
                        t.first_warning.clone(),
                        t.name.clone(),
                        t.portrait.clone(),
                    ));
                }
            }
        }
        for note in warnings {
            self.notifier.notify(note).await?;
        }

        if !reports.is_empty() {
            self.emit(MatchEvent::EnergyChanged { actor, energy });
        }
        Ok(())
    }

    /// The movement loop: walk up to `steps` edges, suspending at forks
    /// and for combat, recruiting when crossing a Start tile.
    async fn move_actor(&mut self, actor: ActorId, steps: u32) -> Result<()> {
        let mut remaining = steps;
        while remaining > 0 {
            let (current, previous) = {
                let a = self
                    .state
                    .actor(actor)
                    .ok_or(RuntimeError::ActorNotFound(actor))?;
                (a.current_tile(), a.previous_tile())
            };

            let candidates = self.state.board().candidates_from(current, previous);
            if candidates.is_empty() {
                // Authored-content problem (dead end), not a runtime fault:
                // stop walking and let the turn continue from here.
                warn!(%actor, tile = %current, "no outgoing tiles; terminating movement early");
                break;
            }

            let next = if candidates.len() == 1 {
                candidates[0]
            } else {
                let chosen = self.tile_choice.choose_tile(actor, &candidates).await?;
                if !candidates.contains(&chosen) {
                    return Err(RuntimeError::InvalidTileChoice { actor, chosen });
                }
                chosen
            };

            // A candidate that is not on the board is a dangling edge in
            // the authored content; stop walking rather than fail the turn.
            let Some(facing) = self.facing_between(current, next) else {
                warn!(%actor, tile = %next, "candidate tile missing from board; terminating movement early");
                break;
            };
            if let Some(a) = self.state.actor_mut(actor) {
                a.step_to(next, facing);
            }
            remaining -= 1;
            self.emit(MatchEvent::StepTaken {
                actor,
                tile: next,
                remaining,
            });

            // First unfought co-located opponent interrupts the step;
            // once combat settles the step is complete (no further
            // collision checks for it).
            self.check_collision(actor).await?;

            self.handle_start_tile_crossing(actor, next).await?;

            if !self.config.step_delay.is_zero() {
                tokio::time::sleep(self.config.step_delay).await;
            }
        }
        Ok(())
    }

    /// Spontaneous combat against the first co-located actor this pair has
    /// not yet fought during the current movement.
    async fn check_collision(&mut self, mover: ActorId) -> Result<()> {
        let tile = self
            .state
            .actor(mover)
            .ok_or(RuntimeError::ActorNotFound(mover))?
            .current_tile();

        let others = self.state.actors_on_tile(tile, mover);
        for other in others {
            let fought = self
                .state
                .actor(mover)
                .is_some_and(|a| a.has_battled(other))
                || self
                    .state
                    .actor(other)
                    .is_some_and(|a| a.has_battled(mover));
            if fought {
                continue;
            }

            // Mark both sides before resolving so a re-entrant overlap in
            // the same step can never double-resolve the pair.
            if let Some(a) = self.state.actor_mut(mover) {
                a.mark_battled(other);
            }
            if let Some(a) = self.state.actor_mut(other) {
                a.mark_battled(mover);
            }

            let front_attack = self.is_front_attack(mover, other);
            self.resolve_combat(mover, other, front_attack).await?;
            break;
        }
        Ok(())
    }

    /// Attack side from relative facing: opposed facings (non-positive dot
    /// product) mean the two met head-on, so the mover strikes with its
    /// front unit; aligned facings mean it caught the other from behind
    /// and leads with the back unit.
    fn is_front_attack(&self, mover: ActorId, other: ActorId) -> bool {
        let (Some(a), Some(b)) = (self.state.actor(mover), self.state.actor(other)) else {
            return true;
        };
        a.facing().dot(b.facing()) <= 0
    }

    /// The Combat sub-phase: synchronous resolution, death sequence for a
    /// destroyed defender unit, settle delay, then back to Moving.
    async fn resolve_combat(
        &mut self,
        attacker: ActorId,
        defender: ActorId,
        front_attack: bool,
    ) -> Result<()> {
        self.set_phase(Phase::Combat);

        let attack_slot = if front_attack { Slot::Front } else { Slot::Back };
        let power = self
            .state
            .actor(attacker)
            .ok_or(RuntimeError::ActorNotFound(attacker))?
            .attack_power(attack_slot);

        let (report, defending_slot) = {
            let (_, def) = self
                .state
                .actor_pair_mut(attacker, defender)
                .ok_or(RuntimeError::ActorNotFound(defender))?;
            combat::apply_attack(def, power)
        };
        debug!(%attacker, %defender, ?report, "battle resolved");
        self.emit(MatchEvent::BattleResolved {
            attacker,
            defender,
            front_attack,
            report,
        });

        if report.direct_damage > 0 {
            let health = self
                .state
                .actor(defender)
                .ok_or(RuntimeError::ActorNotFound(defender))?
                .health();
            self.emit(MatchEvent::HealthChanged {
                actor: defender,
                health,
            });
        }

        if report.unit_destroyed {
            if let Some(slot) = defending_slot {
                self.run_death_sequence(defender, slot).await?;
            }
        }

        tokio::time::sleep(self.config.combat_settle).await;
        self.set_phase(Phase::Moving);
        Ok(())
    }

    /// Plays the (blocking) death line, then detaches the destroyed unit.
    /// The slot still holds the dying unit while the player reads the
    /// line, so observers polling mid-acknowledgment see it in place.
    async fn run_death_sequence(&mut self, owner: ActorId, slot: Slot) -> Result<()> {
        let Some((name, portrait)) = self
            .state
            .actor(owner)
            .and_then(|a| a.partner(slot))
            .map(|u| (u.name().to_string(), u.template().portrait.clone()))
        else {
            return Ok(());
        };
        let note = Note::from_speaker(format!("{name} has been defeated!"), name.clone(), portrait);
        self.notifier.notify_blocking(note).await?;

        if let Some(a) = self.state.actor_mut(owner) {
            a.take_partner(slot);
        }
        self.emit(MatchEvent::PartnerDied {
            actor: owner,
            slot,
            partner: name,
        });
        Ok(())
    }

    /// Start-tile recruitment, gated by the pass-through flag so one
    /// crossing triggers at most one draw; leaving the Start tile re-arms
    /// it.
    async fn handle_start_tile_crossing(&mut self, actor: ActorId, tile: TileId) -> Result<()> {
        let kind = self
            .state
            .board()
            .tile(tile)
            .ok_or(RuntimeError::UnknownTile(tile))?
            .kind;

        if kind != TileKind::Start {
            if let Some(a) = self.state.actor_mut(actor) {
                a.set_recruited_after_start(false);
            }
            return Ok(());
        }

        let already = self
            .state
            .actor(actor)
            .is_some_and(Actor::recruited_after_start);
        if already {
            return Ok(());
        }
        if let Some(a) = self.state.actor_mut(actor) {
            a.set_recruited_after_start(true);
        }
        self.recruitment_flow(actor, tile).await
    }

    /// Draws up to `recruit_draw` distinct templates from the tile's pool
    /// and suspends on the partner-choice provider.
    async fn recruitment_flow(&mut self, actor: ActorId, tile: TileId) -> Result<()> {
        let pool: Vec<TemplateId> = self
            .state
            .board()
            .tile(tile)
            .map(|t| t.partner_pool.clone())
            .unwrap_or_default();

        let known: Vec<TemplateId> = pool
            .iter()
            .copied()
            .filter(|id| {
                let known = self.templates.contains_key(id);
                if !known {
                    warn!(template = %id, tile = %tile, "partner pool references unknown template");
                }
                known
            })
            .collect();
        if known.is_empty() {
            return Ok(());
        }

        let draw = self.config.recruit_draw.min(known.len());
        let options: Vec<TemplateId> = known
            .choose_multiple(&mut self.rng, draw)
            .copied()
            .collect();

        let (chosen, slot) = self.partner_choice.choose_partner(actor, &options).await?;
        if !options.contains(&chosen) {
            return Err(RuntimeError::InvalidPartnerChoice { actor, chosen });
        }
        self.install_partner(actor, chosen, slot)
    }

    /// Assigns a fresh unit of `template` into `slot`, displacing (and
    /// destroying) any previous occupant.
    fn install_partner(&mut self, actor: ActorId, template: TemplateId, slot: Slot) -> Result<()> {
        let t = self
            .templates
            .get(&template)
            .ok_or(RuntimeError::MissingTemplate(template))?
            .clone();
        let unit = PartnerUnit::from_template(t);
        let displaced = self
            .state
            .actor_mut(actor)
            .ok_or(RuntimeError::ActorNotFound(actor))?
            .assign_partner(unit, slot);

        if let Some(old) = displaced {
            self.emit(MatchEvent::PartnerReplaced {
                actor,
                slot,
                partner: old.name().to_string(),
            });
        }
        self.emit(MatchEvent::PartnerRecruited {
            actor,
            slot,
            template,
        });
        Ok(())
    }

    /// Applies the landed tile's effect list in order, then its
    /// kind-specific handler. Start tiles skip effects (recruitment
    /// already ran during movement).
    async fn resolve_tile(&mut self, actor: ActorId) -> Result<()> {
        let tile_id = self
            .state
            .actor(actor)
            .ok_or(RuntimeError::ActorNotFound(actor))?
            .current_tile();
        let Some(tile) = self.state.board().tile(tile_id) else {
            warn!(%actor, tile = %tile_id, "landed tile missing from board; skipping resolution");
            return Ok(());
        };
        let kind = tile.kind;
        let effects = tile.effects.clone();

        if kind != TileKind::Start {
            for effect in effects {
                self.apply_effect(actor, effect)?;
            }
        }

        match kind {
            TileKind::Positive => {
                let delta = self.config.positive_energy;
                self.change_energy(actor, delta)?;
            }
            TileKind::Negative => {
                let delta = -self.config.negative_energy;
                self.change_energy(actor, delta)?;
            }
            k if k.is_content_hook() => {
                self.tile_hook.on_tile(actor, k).await?;
            }
            _ => {}
        }

        self.emit(MatchEvent::TileResolved {
            actor,
            tile: tile_id,
            kind,
        });
        Ok(())
    }

    fn apply_effect(&mut self, actor: ActorId, effect: TileEffect) -> Result<()> {
        match effect {
            TileEffect::Heal { amount } => {
                let health = self
                    .state
                    .actor_mut(actor)
                    .ok_or(RuntimeError::ActorNotFound(actor))?
                    .modify_health(amount);
                self.emit(MatchEvent::HealthChanged { actor, health });
            }
            TileEffect::Damage { amount } => {
                let health = self
                    .state
                    .actor_mut(actor)
                    .ok_or(RuntimeError::ActorNotFound(actor))?
                    .modify_health(-amount);
                self.emit(MatchEvent::HealthChanged { actor, health });
            }
            TileEffect::Recruit { template, to_front } => {
                let slot = if to_front { Slot::Front } else { Slot::Back };
                if self.templates.contains_key(&template) {
                    self.install_partner(actor, template, slot)?;
                } else {
                    warn!(template = %template, "recruit effect references unknown template");
                }
            }
        }
        Ok(())
    }

    fn change_energy(&mut self, actor: ActorId, delta: i32) -> Result<()> {
        let energy = self
            .state
            .actor_mut(actor)
            .ok_or(RuntimeError::ActorNotFound(actor))?
            .modify_energy(delta);
        self.emit(MatchEvent::EnergyChanged { actor, energy });
        Ok(())
    }

    /// End-of-turn attrition: partners at the unpaid threshold deliver a
    /// final warning (blocking, the player must acknowledge) and only then
    /// leave their slot.
    async fn end_turn_upkeep(&mut self, actor: ActorId) -> Result<()> {
        for slot in Slot::ALL {
            let Some(note) = self
                .state
                .actor(actor)
                .and_then(|a| a.partner(slot))
                .filter(|u| u.is_removal_due())
                .map(|u| {
                    let t = u.template();
                    Note::from_speaker(t.final_warning.clone(), t.name.clone(), t.portrait.clone())
                })
            else {
                continue;
            };
            self.notifier.notify_blocking(note).await?;

            let Some(unit) = self
                .state
                .actor_mut(actor)
                .and_then(|a| a.take_partner(slot))
            else {
                continue;
            };
            debug!(%actor, slot = %slot, partner = unit.name(), "partner removed over unpaid salary");
            self.emit(MatchEvent::PartnerUnpaidRemoval {
                actor,
                slot,
                partner: unit.name().to_string(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn request_roll(&mut self, actor: ActorId) -> Result<u32> {
        let (min, max) = (self.config.roll_min, self.config.roll_max);
        let roll = self.dice.request_roll(actor, min, max).await?;
        if roll < min || roll > max {
            warn!(%actor, roll, min, max, "roll outside configured range; clamping");
            return Ok(roll.clamp(min, max));
        }
        Ok(roll)
    }

    /// `None` when either tile is missing from the board.
    fn facing_between(&self, from: TileId, to: TileId) -> Option<Facing> {
        let board = self.state.board();
        let from_pos = board.tile(from)?.position;
        let to_pos = board.tile(to)?.position;
        Some(Facing::between(from_pos, to_pos))
    }

    /// Records the new phase and broadcasts it before any phase-bound
    /// work runs.
    fn set_phase(&mut self, phase: Phase) {
        self.state.set_phase(phase);
        self.emit(MatchEvent::PhaseChanged { phase });
    }

    fn emit(&self, event: MatchEvent) {
        // Fire-and-forget: lagging or absent subscribers never stall the
        // session.
        let _ = self.event_tx.send(event);
    }
}

/// Builder for [`MatchSession`] with flexible configuration.
pub struct SessionBuilder {
    config: SessionConfig,
    board: Option<BoardGraph>,
    actors: Vec<Actor>,
    templates: Vec<Arc<PartnerTemplate>>,
    dice: Option<Box<dyn DiceProvider>>,
    tile_choice: Option<Box<dyn TileChoiceProvider>>,
    partner_choice: Option<Box<dyn PartnerChoiceProvider>>,
    notifier: Option<Box<dyn NotificationSink>>,
    tile_hook: Option<Box<dyn TileHook>>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            board: None,
            actors: Vec::new(),
            templates: Vec::new(),
            dice: None,
            tile_choice: None,
            partner_choice: None,
            notifier: None,
            tile_hook: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn board(mut self, board: BoardGraph) -> Self {
        self.board = Some(board);
        self
    }

    /// Registers an actor; registration order is the roll-order sequence.
    pub fn actor(mut self, actor: Actor) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn actors(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.actors.extend(actors);
        self
    }

    pub fn templates(mut self, templates: impl IntoIterator<Item = Arc<PartnerTemplate>>) -> Self {
        self.templates.extend(templates);
        self
    }

    pub fn dice(mut self, provider: impl DiceProvider + 'static) -> Self {
        self.dice = Some(Box::new(provider));
        self
    }

    pub fn tile_choice(mut self, provider: impl TileChoiceProvider + 'static) -> Self {
        self.tile_choice = Some(Box::new(provider));
        self
    }

    pub fn partner_choice(mut self, provider: impl PartnerChoiceProvider + 'static) -> Self {
        self.partner_choice = Some(Box::new(provider));
        self
    }

    pub fn notifier(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.notifier = Some(Box::new(sink));
        self
    }

    pub fn tile_hook(mut self, hook: impl TileHook + 'static) -> Self {
        self.tile_hook = Some(Box::new(hook));
        self
    }

    /// Builds the session. Board structure problems are logged here once
    /// (the match still runs, degraded, if authored content is broken).
    pub fn build(self) -> Result<MatchSession> {
        let board = self.board.ok_or(RuntimeError::EmptyBoard)?;
        if board.is_empty() {
            return Err(RuntimeError::EmptyBoard);
        }
        if self.actors.is_empty() {
            return Err(RuntimeError::NoActors);
        }

        if let Err(errors) = board.validate() {
            for error in &errors {
                warn!(%error, "board validation");
            }
        }

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (event_tx, _) = broadcast::channel(self.config.event_buffer_size);

        let templates = self
            .templates
            .into_iter()
            .map(|t| (t.id, t))
            .collect::<HashMap<_, _>>();

        Ok(MatchSession {
            state: MatchState::new(board, self.actors),
            templates,
            dice: self.dice.unwrap_or_else(|| Box::new(UniformDice)),
            tile_choice: self
                .tile_choice
                .unwrap_or_else(|| Box::new(FirstTileChooser)),
            partner_choice: self
                .partner_choice
                .unwrap_or_else(|| Box::new(FirstPartnerChooser::default())),
            notifier: self.notifier.unwrap_or_else(|| Box::new(NullNotifier)),
            tile_hook: self.tile_hook.unwrap_or_else(|| Box::new(NoopTileHook)),
            config: self.config,
            event_tx,
            rng,
        })
    }
}
