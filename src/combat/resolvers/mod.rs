//! One resolver per role. Each takes the encounter state by mutable reference plus a
//! dice source, and performs exactly one turn for its actor.

pub mod healer;
pub mod monster;
pub mod rogue;
pub mod warrior;
pub mod wizard;

use crate::combat::dice::{attack_roll, damage_roll, dice_damage, roll_dice, AttackRoll};
use crate::combat::rng::DiceSource;
use crate::combat::state::{Actor, AllyResources, EncounterState};
use crate::data::monsters::AttackProfile;
use crate::data::party::Role;

/// A hit that beats AC by less than this can be turned by the Wizard's shield.
pub const SHIELD_MARGIN: i32 = 5;

/// Runs the turn of `actor`. Defeated actors do nothing.
pub fn resolve_turn<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    actor: Actor,
    dice: &mut D,
) {
    match actor {
        Actor::Monster => monster::take_turn(state, dice),
        Actor::Ally(role) => {
            let Some(index) = state.ally_index(role) else {
                return;
            };
            if !state.ally(index).is_alive() || !state.monster.is_alive() {
                return;
            }
            match role {
                Role::Warrior => warrior::take_turn(state, index, dice),
                Role::Healer => healer::take_turn(state, index, dice),
                Role::Rogue => rogue::take_turn(state, index, dice),
                Role::Wizard => wizard::take_turn(state, index, dice),
            }
            state.mark_acted(role);
        }
    }
}

/// Monster-side attack roll (the monster, its counter, or a minion) against ally `target`.
/// Defensive reactions of the target are applied before damage lands.
pub(crate) fn monster_strike<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    target: usize,
    profile: AttackProfile,
    crit_extra_dice: u32,
    dice: &mut D,
) -> AttackRoll {
    let roll = attack_roll(dice);
    let armor = state.ally(target).armor_class();
    if !roll.hits(profile.attack_mod, armor) {
        return roll;
    }

    let mut damage = dice_damage(
        dice,
        profile.damage_dice,
        profile.damage_die,
        profile.damage_mod,
        roll.critical,
    );
    if roll.critical {
        damage += roll_dice(dice, crit_extra_dice, profile.damage_die) as i32;
    }

    let margin = roll.total(profile.attack_mod) - armor;
    let damage = react_to_hit(state, target, roll, margin, damage);
    state.damage_ally(target, damage);
    roll
}

/// Uncanny dodge halves a non-critical hit; shield negates a narrow one by spending
/// the lowest slot. Both are once per round.
fn react_to_hit(
    state: &mut EncounterState<'_>,
    target: usize,
    roll: AttackRoll,
    margin: i32,
    damage: i32,
) -> i32 {
    if roll.critical {
        return damage;
    }
    match &mut state.ally_mut(target).resources {
        AllyResources::Rogue {
            uncanny_dodge_ready,
        } if *uncanny_dodge_ready => {
            *uncanny_dodge_ready = false;
            damage / 2
        }
        AllyResources::Wizard(wizard)
            if wizard.shield_ready && (0..SHIELD_MARGIN).contains(&margin) =>
        {
            match wizard.slots.lowest_available() {
                Some(tier) if wizard.slots.spend(tier) => {
                    wizard.shield_ready = false;
                    0
                }
                _ => damage,
            }
        }
        _ => damage,
    }
}

/// Retaliation after ally `attacker` missed, if the monster has a ready counter.
pub(crate) fn counter_if_ready<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    attacker: usize,
    dice: &mut D,
) {
    if !state.monster.counter_ready
        || !state.monster.is_alive()
        || !state.ally(attacker).is_alive()
    {
        return;
    }
    state.monster.counter_ready = false;
    let monster = state.monster.template;
    monster_strike(
        state,
        attacker,
        monster.attack_profile(),
        monster.crit_extra_dice.unwrap_or(0),
        dice,
    );
}

/// Plain weapon attack by ally `index` with its template stats.
pub(crate) fn weapon_attack<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    dice: &mut D,
) -> AttackRoll {
    let template = state.ally(index).template;
    let stats = &template.stats;
    let roll = attack_roll(dice);
    if roll.hits(stats.attack_mod, state.monster.template.stats.armor_class) {
        let damage = damage_roll(dice, stats.damage_die, stats.damage_mod, roll.critical);
        state.damage_monster(damage);
    } else {
        counter_if_ready(state, index, dice);
    }
    roll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::combat::state::WizardResources;
    use crate::data::monsters::{cloaker, giant_ape};
    use crate::data::party::{PartyComposition, SlotTable};

    fn full_party_state<'a>(
        party: &'a [crate::data::party::AllyTemplate],
        monster: &'a crate::data::monsters::MonsterTemplate,
    ) -> EncounterState<'a> {
        EncounterState::new(party, monster, vec![Actor::Monster])
    }

    #[test]
    fn uncanny_dodge_halves_once_per_round() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = full_party_state(&party, &monster);
        let rogue = state.ally_index(Role::Rogue).unwrap();
        let profile = monster.attack_profile();

        // d20 15 (+7 = 22 vs AC 16), d12 10 + 4 = 14, halved to 7.
        let mut dice = ScriptedDice::new([15, 10]);
        monster_strike(&mut state, rogue, profile, 1, &mut dice);
        assert_eq!(state.ally(rogue).hp(), 80 - 7);

        let mut dice = ScriptedDice::new([15, 10]);
        monster_strike(&mut state, rogue, profile, 1, &mut dice);
        assert_eq!(state.ally(rogue).hp(), 80 - 7 - 14);
    }

    #[test]
    fn critical_bypasses_reactions_and_adds_extra_dice() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = full_party_state(&party, &monster);
        let rogue = state.ally_index(Role::Rogue).unwrap();

        // Crit: two weapon dice (3 + 4) + 4 modifier, then one extra die (5).
        let mut dice = ScriptedDice::new([20, 3, 4, 5]);
        monster_strike(&mut state, rogue, monster.attack_profile(), 1, &mut dice);
        assert_eq!(state.ally(rogue).hp(), 80 - 16);
        assert_eq!(
            state.ally(rogue).resources,
            AllyResources::Rogue {
                uncanny_dodge_ready: true
            }
        );
    }

    #[test]
    fn shield_negates_narrow_hit_with_lowest_slot() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = full_party_state(&party, &monster);
        let wizard = state.ally_index(Role::Wizard).unwrap();

        // 6 + 7 = 13 vs AC 12: margin 1, shield turns it.
        let mut dice = ScriptedDice::new([6, 9]);
        monster_strike(&mut state, wizard, monster.attack_profile(), 1, &mut dice);
        assert_eq!(state.ally(wizard).hp(), 60);
        match state.ally(wizard).resources {
            AllyResources::Wizard(WizardResources {
                slots,
                shield_ready,
            }) => {
                assert!(!shield_ready);
                assert_eq!(slots.count(1), 3);
            }
            other => panic!("unexpected resources {other:?}"),
        }

        // Shield spent: the same hit lands this round.
        let mut dice = ScriptedDice::new([6, 9]);
        monster_strike(&mut state, wizard, monster.attack_profile(), 1, &mut dice);
        assert_eq!(state.ally(wizard).hp(), 60 - 13);
    }

    #[test]
    fn shield_ignores_wide_hits_and_empty_slots() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = full_party_state(&party, &monster);
        let wizard = state.ally_index(Role::Wizard).unwrap();

        // 15 + 7 = 22 vs 12: margin 10, no shield.
        let mut dice = ScriptedDice::new([15, 1]);
        monster_strike(&mut state, wizard, monster.attack_profile(), 1, &mut dice);
        assert_eq!(state.ally(wizard).hp(), 60 - 5);

        state.ally_mut(wizard).resources = AllyResources::Wizard(WizardResources {
            slots: SlotTable::empty(),
            shield_ready: true,
        });
        let mut dice = ScriptedDice::new([6, 1]);
        monster_strike(&mut state, wizard, monster.attack_profile(), 1, &mut dice);
        assert_eq!(state.ally(wizard).hp(), 60 - 10);
    }

    #[test]
    fn counter_fires_once_per_round() {
        let party = PartyComposition::Solo.members(8);
        let monster = cloaker();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);

        // Warrior misses (2 + 3 < 14); counter 12 + 4 = 16 hits AC 16 for 5 + 2.
        let mut dice = ScriptedDice::new([2, 12, 5]);
        weapon_attack(&mut state, 0, &mut dice);
        assert_eq!(state.ally(0).hp(), 71 - 7);
        assert!(!state.monster.counter_ready);

        let mut dice = ScriptedDice::new([2]);
        weapon_attack(&mut state, 0, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.ally(0).hp(), 71 - 7);
    }
}
