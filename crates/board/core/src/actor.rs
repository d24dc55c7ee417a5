//! Player avatars: position in the graph, vitals, and partner slots.

use std::collections::HashSet;
use std::fmt;

use crate::board::{Facing, TileId};
use crate::partner::PartnerUnit;

/// Unique identifier of an actor within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// The two partner attachment points. Front fights on offense when the
/// attack comes from the front side; back covers the rear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    Front,
    Back,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Front, Slot::Back];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Front => write!(f, "front"),
            Slot::Back => write!(f, "back"),
        }
    }
}

/// Outcome of one salary deduction at turn start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SalaryOutcome {
    /// Energy covered the cost; the unpaid counter resets.
    Paid { cost: i32 },
    /// First consecutive miss; the partner grumbles but stays.
    FirstWarning,
    /// Second (or later) consecutive miss; removal happens at the
    /// end-of-turn check, not here.
    StillUnpaid,
}

/// Per-slot salary result surfaced to the runtime for notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalaryReport {
    pub slot: Slot,
    pub partner: String,
    pub outcome: SalaryOutcome,
}

/// A player's in-game avatar.
///
/// All mutation of an actor's vitals and slots goes through these methods;
/// no other component writes the fields directly.
#[derive(Clone, Debug)]
pub struct Actor {
    id: ActorId,
    name: String,
    health: i32,
    energy: i32,
    current_tile: TileId,
    previous_tile: Option<TileId>,
    facing: Facing,
    front: Option<PartnerUnit>,
    back: Option<PartnerUnit>,
    /// Opponents already fought during the current movement, reset at turn
    /// start. Enforces at most one battle per pair per step.
    battled: HashSet<ActorId>,
    /// Set once the post-Start recruitment fired, cleared again when the
    /// actor leaves the Start tile so a later pass re-triggers it.
    recruited_after_start: bool,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, start_tile: TileId) -> Self {
        Self {
            id,
            name: name.into(),
            health: 10,
            energy: 10,
            current_tile: start_tile,
            previous_tile: None,
            facing: Facing::default(),
            front: None,
            back: None,
            battled: HashSet::new(),
            recruited_after_start: false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn current_tile(&self) -> TileId {
        self.current_tile
    }

    pub fn previous_tile(&self) -> Option<TileId> {
        self.previous_tile
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Adjusts health by `amount` (negative to damage), flooring at zero.
    /// Returns the new value.
    pub fn modify_health(&mut self, amount: i32) -> i32 {
        self.health = (self.health + amount).max(0);
        self.health
    }

    /// Adjusts energy by `amount`, flooring at zero. Returns the new value.
    pub fn modify_energy(&mut self, amount: i32) -> i32 {
        self.energy = (self.energy + amount).max(0);
        self.energy
    }

    /// Commits one movement step: records the tile left behind, moves onto
    /// `to`, and recomputes facing from the position delta.
    pub fn step_to(&mut self, to: TileId, facing: Facing) {
        self.previous_tile = Some(self.current_tile);
        self.current_tile = to;
        self.facing = facing;
    }

    pub fn partner(&self, slot: Slot) -> Option<&PartnerUnit> {
        match slot {
            Slot::Front => self.front.as_ref(),
            Slot::Back => self.back.as_ref(),
        }
    }

    pub fn partner_mut(&mut self, slot: Slot) -> Option<&mut PartnerUnit> {
        match slot {
            Slot::Front => self.front.as_mut(),
            Slot::Back => self.back.as_mut(),
        }
    }

    /// Detaches and returns the unit in `slot`, if any.
    pub fn take_partner(&mut self, slot: Slot) -> Option<PartnerUnit> {
        match slot {
            Slot::Front => self.front.take(),
            Slot::Back => self.back.take(),
        }
    }

    /// Installs `unit` into `slot`, returning the displaced occupant. The
    /// previous occupant is gone immediately; there is no transitional
    /// state where a slot holds two units.
    pub fn assign_partner(&mut self, unit: PartnerUnit, slot: Slot) -> Option<PartnerUnit> {
        match slot {
            Slot::Front => self.front.replace(unit),
            Slot::Back => self.back.replace(unit),
        }
    }

    /// Occupied slots in front-then-back order.
    pub fn partners(&self) -> impl Iterator<Item = (Slot, &PartnerUnit)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.partner(slot).map(|unit| (slot, unit)))
    }

    /// Attack power when striking with `slot`: the unit's attack, or 1 when
    /// the slot is empty. An unarmed actor still throws a punch.
    pub fn attack_power(&self, slot: Slot) -> i32 {
        self.partner(slot).map_or(1, PartnerUnit::attack_power)
    }

    /// The slot that absorbs an incoming attack: front if occupied, else
    /// back. `None` means damage falls through to the actor directly.
    pub fn defending_slot(&self) -> Option<Slot> {
        if self.front.is_some() {
            Some(Slot::Front)
        } else if self.back.is_some() {
            Some(Slot::Back)
        } else {
            None
        }
    }

    pub fn has_battled(&self, other: ActorId) -> bool {
        self.battled.contains(&other)
    }

    pub fn mark_battled(&mut self, other: ActorId) {
        self.battled.insert(other);
    }

    /// Turn-start reset: forget who was fought last turn.
    pub fn begin_turn(&mut self) {
        self.battled.clear();
    }

    pub fn recruited_after_start(&self) -> bool {
        self.recruited_after_start
    }

    pub fn set_recruited_after_start(&mut self, value: bool) {
        self.recruited_after_start = value;
    }

    /// Deducts each partner's salary from this actor's energy, in
    /// front-then-back order. Payment resets the unpaid counter; a miss
    /// increments it. Removal is deferred to the end-of-turn check.
    pub fn pay_salaries(&mut self) -> Vec<SalaryReport> {
        let mut reports = Vec::new();
        if let Some(unit) = self.front.as_mut() {
            reports.push(SalaryReport {
                slot: Slot::Front,
                partner: unit.name().to_string(),
                outcome: pay_one(&mut self.energy, unit),
            });
        }
        if let Some(unit) = self.back.as_mut() {
            reports.push(SalaryReport {
                slot: Slot::Back,
                partner: unit.name().to_string(),
                outcome: pay_one(&mut self.energy, unit),
            });
        }
        reports
    }
}

fn pay_one(energy: &mut i32, unit: &mut PartnerUnit) -> SalaryOutcome {
    let cost = unit.salary_cost();
    if *energy >= cost {
        *energy -= cost;
        unit.mark_paid();
        SalaryOutcome::Paid { cost }
    } else if unit.mark_unpaid() == 1 {
        SalaryOutcome::FirstWarning
    } else {
        SalaryOutcome::StillUnpaid
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::partner::{PartnerTemplate, Personality, TemplateId};

    fn template(salary: i32) -> Arc<PartnerTemplate> {
        Arc::new(PartnerTemplate {
            id: TemplateId(9),
            name: "Fern".into(),
            max_hp: 4,
            attack: 3,
            salary,
            personality: Personality::Nice,
            first_warning: "pay me".into(),
            final_warning: "bye".into(),
            portrait: "fern".into(),
        })
    }

    fn actor() -> Actor {
        Actor::new(ActorId(0), "P1", TileId(0))
    }

    #[test]
    fn vitals_floor_at_zero() {
        let mut a = actor();
        assert_eq!(a.modify_health(-99), 0);
        assert_eq!(a.modify_energy(-99), 0);
        assert_eq!(a.modify_energy(3), 3);
    }

    #[test]
    fn salary_paid_deducts_exactly_once() {
        let mut a = actor();
        a.assign_partner(PartnerUnit::from_template(template(3)), Slot::Front);

        let reports = a.pay_salaries();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, SalaryOutcome::Paid { cost: 3 });
        assert_eq!(a.energy(), 7);
        assert_eq!(a.partner(Slot::Front).unwrap().unpaid_turns(), 0);
    }

    #[test]
    fn salary_misses_escalate_to_removal_due() {
        let mut a = actor();
        a.modify_energy(-8); // energy 2, salary 3: can never pay
        a.assign_partner(PartnerUnit::from_template(template(3)), Slot::Front);

        let first = a.pay_salaries();
        assert_eq!(first[0].outcome, SalaryOutcome::FirstWarning);
        assert!(!a.partner(Slot::Front).unwrap().is_removal_due());

        let second = a.pay_salaries();
        assert_eq!(second[0].outcome, SalaryOutcome::StillUnpaid);
        assert!(a.partner(Slot::Front).unwrap().is_removal_due());

        // Energy was never touched by the misses.
        assert_eq!(a.energy(), 2);
    }

    #[test]
    fn assigning_over_an_occupied_slot_displaces_the_occupant() {
        let mut a = actor();
        a.assign_partner(PartnerUnit::from_template(template(1)), Slot::Back);
        let displaced = a.assign_partner(PartnerUnit::from_template(template(2)), Slot::Back);

        assert!(displaced.is_some());
        assert_eq!(a.partner(Slot::Back).unwrap().salary_cost(), 2);
    }

    #[test]
    fn unarmed_attack_power_defaults_to_one() {
        let mut a = actor();
        assert_eq!(a.attack_power(Slot::Front), 1);
        a.assign_partner(PartnerUnit::from_template(template(1)), Slot::Front);
        assert_eq!(a.attack_power(Slot::Front), 3);
    }

    #[test]
    fn defending_slot_prefers_front() {
        let mut a = actor();
        assert_eq!(a.defending_slot(), None);
        a.assign_partner(PartnerUnit::from_template(template(1)), Slot::Back);
        assert_eq!(a.defending_slot(), Some(Slot::Back));
        a.assign_partner(PartnerUnit::from_template(template(1)), Slot::Front);
        assert_eq!(a.defending_slot(), Some(Slot::Front));
    }
}
