//! Combat resolution.
//!
//! Resolution is a pure function from (attack power, defending unit HP) to
//! damage deltas; applying the result to an actor is a separate step. The
//! same inputs always produce the same report, which keeps replays and
//! property tests honest.
//!
//! Rules:
//! - the defending unit absorbs at most its own HP; it is destroyed when
//!   the attack power reaches its HP,
//! - excess damage beyond the unit's HP falls through to the defender's
//!   health,
//! - without a defending unit the whole attack hits the defender directly,
//! - the attacker is never damaged and there is no counter-attack.

use crate::actor::{Actor, Slot};

/// Outcome of resolving one attack against a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    /// Effective attack power that went in.
    pub power: i32,
    /// Damage dealt to the defending unit (`None` when no unit defended).
    pub unit_damage: Option<i32>,
    /// Whether the defending unit was destroyed.
    pub unit_destroyed: bool,
    /// Damage applied directly to the defending actor's health.
    pub direct_damage: i32,
}

/// Resolves an attack of `power` against an optional defending unit with
/// the given current HP. Pure and stateless.
pub fn resolve_attack(power: i32, defender_unit_hp: Option<i32>) -> AttackReport {
    let power = power.max(0);
    match defender_unit_hp {
        Some(hp) => {
            let absorbed = power.min(hp.max(0));
            AttackReport {
                power,
                unit_damage: Some(absorbed),
                unit_destroyed: power >= hp,
                direct_damage: (power - hp.max(0)).max(0),
            }
        }
        None => AttackReport {
            power,
            unit_damage: None,
            unit_destroyed: false,
            direct_damage: power,
        },
    }
}

/// Resolves and applies an attack of `power` against `defender`.
///
/// The defending unit is the front one when present, else the back one.
/// A destroyed unit is left in its slot with the dying flag set; the
/// caller runs the death sequence and detaches it afterwards.
///
/// Returns the report together with the slot that defended, if any.
pub fn apply_attack(defender: &mut Actor, power: i32) -> (AttackReport, Option<Slot>) {
    let slot = defender.defending_slot();
    let unit_hp = slot.and_then(|s| defender.partner(s)).map(|u| u.hp());
    let report = resolve_attack(power, unit_hp);

    if let (Some(s), Some(damage)) = (slot, report.unit_damage) {
        if let Some(unit) = defender.partner_mut(s) {
            unit.take_damage(damage);
        }
    }
    if report.direct_damage > 0 {
        defender.modify_health(-report.direct_damage);
    }

    (report, slot)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actor::ActorId;
    use crate::board::TileId;
    use crate::partner::{PartnerTemplate, PartnerUnit, Personality, TemplateId};

    fn unit(hp: i32, attack: i32) -> PartnerUnit {
        PartnerUnit::from_template(Arc::new(PartnerTemplate {
            id: TemplateId(1),
            name: "Brick".into(),
            max_hp: hp,
            attack,
            salary: 1,
            personality: Personality::Mean,
            first_warning: String::new(),
            final_warning: String::new(),
            portrait: String::new(),
        }))
    }

    #[test]
    fn excess_damage_spills_to_defender_health() {
        // Attacker front unit attack=5 vs defending front unit HP=2:
        // unit destroyed, 3 excess to the actor.
        let report = resolve_attack(5, Some(2));
        assert_eq!(report.unit_damage, Some(2));
        assert!(report.unit_destroyed);
        assert_eq!(report.direct_damage, 3);
    }

    #[test]
    fn unarmed_attack_hits_bare_defender_for_one() {
        let report = resolve_attack(1, None);
        assert_eq!(report.unit_damage, None);
        assert_eq!(report.direct_damage, 1);
        assert!(!report.unit_destroyed);
    }

    #[test]
    fn attack_equal_to_hp_destroys_without_excess() {
        let report = resolve_attack(4, Some(4));
        assert_eq!(report.unit_damage, Some(4));
        assert!(report.unit_destroyed);
        assert_eq!(report.direct_damage, 0);
    }

    #[test]
    fn attack_below_hp_leaves_actor_untouched() {
        let report = resolve_attack(3, Some(7));
        assert_eq!(report.unit_damage, Some(3));
        assert!(!report.unit_destroyed);
        assert_eq!(report.direct_damage, 0);
    }

    #[test]
    fn conservation_over_small_input_grid() {
        // Excess to health equals max(0, power - hp) whenever a unit
        // defends, and unit damage never exceeds its HP.
        for power in 0..12 {
            for hp in 0..12 {
                let report = resolve_attack(power, Some(hp));
                assert_eq!(report.direct_damage, (power - hp).max(0));
                assert!(report.unit_damage.unwrap() <= hp);
                assert_eq!(report.unit_destroyed, power >= hp);
            }
        }
    }

    #[test]
    fn apply_routes_through_front_unit_then_health() {
        let mut defender = Actor::new(ActorId(1), "D", TileId(0));
        defender.assign_partner(unit(2, 1), Slot::Front);

        let (report, slot) = apply_attack(&mut defender, 5);
        assert_eq!(slot, Some(Slot::Front));
        assert!(report.unit_destroyed);
        assert_eq!(defender.health(), 7);
        assert!(defender.partner(Slot::Front).unwrap().is_dying());
    }

    #[test]
    fn apply_without_partners_damages_health_directly() {
        let mut defender = Actor::new(ActorId(1), "D", TileId(0));
        let (report, slot) = apply_attack(&mut defender, 1);
        assert_eq!(slot, None);
        assert_eq!(report.direct_damage, 1);
        assert_eq!(defender.health(), 9);
    }

    #[test]
    fn resolution_never_drives_health_negative() {
        let mut defender = Actor::new(ActorId(1), "D", TileId(0));
        apply_attack(&mut defender, 50);
        assert_eq!(defender.health(), 0);
    }
}
