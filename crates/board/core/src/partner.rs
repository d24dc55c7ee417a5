//! Recruitable partner units and their templates.
//!
//! A [`PartnerTemplate`] is immutable authored content; many
//! [`PartnerUnit`] instances may snapshot the same template. Units track
//! the mutable bits: current HP, the unpaid-salary counter, and the
//! dying flag that keeps the death sequence idempotent.

use std::fmt;
use std::sync::Arc;

/// Unique identifier of an authored partner template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TemplateId(pub u32);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Flavor trait shown in dialogue; no rules weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Personality {
    Nice,
    Mean,
    #[default]
    Neutral,
}

/// Immutable partner definition, authored as static content.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartnerTemplate {
    pub id: TemplateId,
    pub name: String,
    pub max_hp: i32,
    pub attack: i32,
    pub salary: i32,
    pub personality: Personality,
    /// Line shown the first end-of-turn the salary goes unpaid.
    pub first_warning: String,
    /// Line shown just before an unpaid partner walks out.
    pub final_warning: String,
    /// Opaque handle for the presentation layer (portrait, voice, model).
    pub portrait: String,
}

/// Number of consecutive unpaid end-of-turns a partner tolerates before
/// leaving. The removal itself happens during the end-of-turn check, never
/// inside the salary call.
pub const UNPAID_REMOVAL_THRESHOLD: u8 = 2;

/// Result of applying damage to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The unit is already mid-death-sequence; the hit is ignored.
    AlreadyDying,
    /// The unit absorbed the hit and lives on.
    Survived { remaining: i32 },
    /// HP reached zero; the caller must run the death sequence and detach
    /// the unit from its slot.
    Destroyed,
}

/// Mutable runtime instance of a partner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerUnit {
    template: Arc<PartnerTemplate>,
    hp: i32,
    unpaid_turns: u8,
    dying: bool,
}

impl PartnerUnit {
    pub fn from_template(template: Arc<PartnerTemplate>) -> Self {
        let hp = template.max_hp;
        Self {
            template,
            hp,
            unpaid_turns: 0,
            dying: false,
        }
    }

    pub fn template(&self) -> &PartnerTemplate {
        &self.template
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// Current HP. Not clamped on the way down; only the destroy gate in
    /// [`Self::take_damage`] matters.
    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn attack_power(&self) -> i32 {
        self.template.attack
    }

    pub fn salary_cost(&self) -> i32 {
        self.template.salary
    }

    pub fn unpaid_turns(&self) -> u8 {
        self.unpaid_turns
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    /// Applies damage. Re-entrant calls during an in-flight death sequence
    /// are no-ops so one combat resolution cannot double-process a unit.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dying {
            return DamageOutcome::AlreadyDying;
        }

        self.hp -= amount;
        if self.hp <= 0 {
            self.dying = true;
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Survived { remaining: self.hp }
        }
    }

    /// Records a successful salary payment.
    pub(crate) fn mark_paid(&mut self) {
        self.unpaid_turns = 0;
    }

    /// Records a missed salary payment and returns the new counter.
    pub(crate) fn mark_unpaid(&mut self) -> u8 {
        self.unpaid_turns = self.unpaid_turns.saturating_add(1);
        self.unpaid_turns
    }

    /// True once the unit has gone unpaid long enough to be removed at the
    /// end-of-turn check.
    pub fn is_removal_due(&self) -> bool {
        self.unpaid_turns >= UNPAID_REMOVAL_THRESHOLD
    }
}
