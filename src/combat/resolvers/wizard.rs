//! Wizard turn: finish with the auto-hit missile when it is expected to be enough,
//! otherwise throw the orb at the highest tier, and fall back to the cantrip when
//! every slot is gone. Monster spell resistance reduces all three.

use crate::combat::dice::{attack_roll, dice_damage, roll_die, AttackRoll};
use crate::combat::resolvers::counter_if_ready;
use crate::combat::rng::DiceSource;
use crate::combat::state::{AllyResources, EncounterState};
use crate::data::party::{RoleKit, SlotTable, WizardKit};

/// Damage left after resistance, rounded down.
pub fn resisted(damage: i32, resistance: f64) -> i32 {
    (f64::from(damage) * (1.0 - resistance)).floor() as i32
}

fn slots<'s>(state: &'s mut EncounterState<'_>, index: usize) -> Option<&'s mut SlotTable> {
    match &mut state.ally_mut(index).resources {
        AllyResources::Wizard(wizard) => Some(&mut wizard.slots),
        _ => None,
    }
}

pub fn take_turn<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    dice: &mut D,
) {
    let template = state.ally(index).template;
    let RoleKit::Wizard(kit) = &template.kit else {
        return;
    };
    let monster = state.monster.template;
    let resistance = monster.spell_resistance();

    let spent = slots(state, index).and_then(|slots| {
        let tier = slots.highest_available()?;
        slots.spend(tier).then_some(tier)
    });
    let Some(tier) = spent else {
        let roll = attack_roll(dice);
        spell_attack(state, index, roll, dice, |dice, critical| {
            dice_damage(
                dice,
                kit.cantrip_dice,
                kit.cantrip_die,
                template.stats.damage_mod,
                critical,
            )
        });
        return;
    };

    let expected = kit.missile.expected_damage(tier) * (1.0 - resistance);
    if expected >= f64::from(state.monster.hp()) {
        cast_missile(state, kit, tier, resistance, dice);
        return;
    }

    let roll = attack_roll(dice);
    spell_attack(state, index, roll, dice, |dice, critical| {
        dice_damage(dice, kit.orb.dice_at(tier), kit.orb.die, kit.orb.modifier, critical)
    });
}

fn cast_missile<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    kit: &WizardKit,
    tier: u8,
    resistance: f64,
    dice: &mut D,
) {
    let missile = kit.missile;
    let total: i32 = (0..missile.darts_at(tier))
        .map(|_| roll_die(dice, missile.dart_die) as i32 + missile.dart_mod)
        .sum();
    state.damage_monster(resisted(total, resistance));
}

/// Spell attack roll against the monster's spell armor class.
fn spell_attack<D, F>(
    state: &mut EncounterState<'_>,
    index: usize,
    roll: AttackRoll,
    dice: &mut D,
    damage: F,
) where
    D: DiceSource + ?Sized,
    F: FnOnce(&mut D, bool) -> i32,
{
    let monster = state.monster.template;
    let attack_mod = state.ally(index).template.stats.attack_mod;
    if !roll.hits(attack_mod, monster.spell_armor_class()) {
        counter_if_ready(state, index, dice);
        return;
    }
    let rolled = damage(dice, roll.critical);
    state.damage_monster(resisted(rolled, monster.spell_resistance()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::combat::state::{Actor, WizardResources};
    use crate::data::monsters::{aberrant_screecher, giant_ape};
    use crate::data::party::{PartyComposition, Role};

    fn wizard_slots(state: &EncounterState<'_>, index: usize) -> SlotTable {
        match state.ally(index).resources {
            AllyResources::Wizard(WizardResources { slots, .. }) => slots,
            other => panic!("unexpected resources {other:?}"),
        }
    }

    #[test]
    fn resistance_rounds_down() {
        assert_eq!(resisted(10, 0.25), 7);
        assert_eq!(resisted(10, 0.0), 10);
        assert_eq!(resisted(1, 0.25), 0);
    }

    #[test]
    fn orb_at_highest_tier_spends_slot_even_on_miss() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let wizard = state.ally_index(Role::Wizard).unwrap();

        let mut dice = ScriptedDice::new([2]);
        take_turn(&mut state, wizard, &mut dice);
        assert_eq!(state.monster.hp(), 157);
        assert_eq!(wizard_slots(&state, wizard).count(5), 1);
    }

    #[test]
    fn orb_scales_dice_with_tier() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let wizard = state.ally_index(Role::Wizard).unwrap();

        // Tier 5 orb: 7d8 of ones after a 15 + 4 hit.
        let mut dice = ScriptedDice::new([15, 1, 1, 1, 1, 1, 1, 1]);
        take_turn(&mut state, wizard, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.monster.hp(), 150);
    }

    #[test]
    fn missile_finishes_a_weak_monster() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let wizard = state.ally_index(Role::Wizard).unwrap();
        state.damage_monster(140);

        // Tier 5: 7 darts, 24.5 expected against 17 HP. Each dart 1d4 + 1.
        let mut dice = ScriptedDice::new([2, 2, 2, 2, 2, 2, 2]);
        take_turn(&mut state, wizard, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.monster.hp(), 0);
    }

    #[test]
    fn cantrip_when_out_of_slots_faces_spell_armor_and_resistance() {
        let party = PartyComposition::FullParty.members(10);
        let monster = aberrant_screecher();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let wizard = state.ally_index(Role::Wizard).unwrap();
        state.ally_mut(wizard).resources = AllyResources::Wizard(WizardResources {
            slots: SlotTable::empty(),
            shield_ready: true,
        });

        // 17 + 4 = 21 misses spell AC 22.
        let mut dice = ScriptedDice::new([17]);
        take_turn(&mut state, wizard, &mut dice);
        assert_eq!(state.monster.hp(), 140);

        // 18 + 4 = 22 hits: 2d10 (5, 5) + 5 = 15, resisted to 11.
        let mut dice = ScriptedDice::new([18, 5, 5]);
        take_turn(&mut state, wizard, &mut dice);
        assert_eq!(state.monster.hp(), 140 - 11);
    }
}
