//! Session configuration shared across the orchestrator.

use std::time::Duration;

/// Tunables for one match session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inclusive movement-roll range.
    pub roll_min: u32,
    pub roll_max: u32,
    /// How many templates a Start-tile recruitment draw offers (capped by
    /// the pool size; drawn without replacement).
    pub recruit_draw: usize,
    /// Settle delay after combat resolution before movement resumes.
    pub combat_settle: Duration,
    /// Optional pacing delay after each movement step. Zero keeps the
    /// logic instantaneous; front-ends that animate set this instead of
    /// blocking the session themselves.
    pub step_delay: Duration,
    /// Energy gained when landing on a Positive tile.
    pub positive_energy: i32,
    /// Energy lost when landing on a Negative tile.
    pub negative_energy: i32,
    /// Broadcast buffer for match events.
    pub event_buffer_size: usize,
    /// Seed for recruitment draws. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            roll_min: 1,
            roll_max: 10,
            recruit_draw: 3,
            combat_settle: Duration::from_millis(200),
            step_delay: Duration::ZERO,
            positive_energy: 2,
            negative_energy: 2,
            event_buffer_size: 100,
            rng_seed: None,
        }
    }
}
