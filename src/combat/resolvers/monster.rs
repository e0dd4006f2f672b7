//! Monster turn, in order: regeneration, breath recharge, wolf summon, then either
//! the breath weapon or the normal attack routine.

use tracing::trace;

use crate::combat::dice::{roll_die, roll_dice};
use crate::combat::resolvers::monster_strike;
use crate::combat::rng::DiceSource;
use crate::combat::state::EncounterState;

/// Face count of the recharge die.
const RECHARGE_DIE: u32 = 6;

pub fn take_turn<D: DiceSource + ?Sized>(state: &mut EncounterState<'_>, dice: &mut D) {
    if !state.monster.is_alive() || state.allies_defeated() {
        return;
    }
    let monster = state.monster.template;

    if let Some(regen) = monster.regen_per_turn {
        state.monster.heal(regen);
    }

    recharge_breath(state, dice);
    wolf_attack(state, dice);
    if state.allies_defeated() {
        return;
    }

    if breathe(state, dice) {
        return;
    }

    let profile = monster.attack_profile();
    let extra = monster.crit_extra_dice.unwrap_or(0);
    for _ in 0..monster.stats.attacks_per_turn {
        let Some(target) = state.weakest_living_ally() else {
            break;
        };
        let roll = monster_strike(state, target, profile, extra, dice);
        state.observed.record_monster_attack(roll.critical);
    }
}

fn recharge_breath<D: DiceSource + ?Sized>(state: &mut EncounterState<'_>, dice: &mut D) {
    let monster = state.monster.template;
    let (Some(breath), Some(charge)) = (&monster.breath, state.monster.breath.as_mut()) else {
        return;
    };
    if charge.ready {
        return;
    }
    let face = roll_die(dice, RECHARGE_DIE);
    if breath.recharge_faces.contains(&face) {
        charge.ready = true;
        charge.charges = breath.charges;
        trace!(face, "breath recharged");
    }
}

/// Triggers the summon once the monster is bloodied enough; while it lasts the wolf
/// makes one attack per monster turn, including the turn it arrives.
fn wolf_attack<D: DiceSource + ?Sized>(state: &mut EncounterState<'_>, dice: &mut D) {
    let monster = state.monster.template;
    let (Some(summon), Some(mut pack)) = (monster.wolf_summon, state.monster.summon) else {
        return;
    };

    let threshold = summon.trigger_fraction * f64::from(state.monster.max_hp());
    if !pack.triggered && f64::from(state.monster.hp()) <= threshold {
        pack.triggered = true;
        pack.rounds_left = summon.rounds;
        trace!(rounds = summon.rounds, "wolf summoned");
    }

    if pack.rounds_left > 0 {
        if let Some(target) = state.weakest_living_ally() {
            monster_strike(state, target, summon.attack, 0, dice);
        }
        pack.rounds_left -= 1;
    }
    state.monster.summon = Some(pack);
}

/// Breath on every living ally when ready and at least two remain. Returns whether
/// the breath replaced the normal attacks this turn.
fn breathe<D: DiceSource + ?Sized>(state: &mut EncounterState<'_>, dice: &mut D) -> bool {
    let monster = state.monster.template;
    let (Some(breath), Some(mut charge)) = (&monster.breath, state.monster.breath) else {
        return false;
    };
    if !charge.ready || charge.charges == 0 || state.living_ally_count() < 2 {
        return false;
    }

    let rolled = roll_dice(dice, breath.dice, breath.die) as i32;
    let living: Vec<usize> = (0..state.allies().len())
        .filter(|&index| state.ally(index).is_alive())
        .collect();
    let hits: Vec<(usize, i32)> = living
        .into_iter()
        .map(|index| {
            let saved = dice.chance(breath.save_half_chance);
            (index, if saved { rolled / 2 } else { rolled })
        })
        .collect();

    let doubled = charge.charges >= 2
        && hits
            .iter()
            .any(|&(index, damage)| i64::from(damage) * 2 >= i64::from(state.ally(index).hp()));
    let spent = if doubled { 2 } else { 1 };
    for (index, damage) in hits {
        state.damage_ally(index, if doubled { damage * 2 } else { damage });
    }

    charge.charges -= spent;
    if charge.charges == 0 {
        charge.ready = false;
    }
    state.monster.breath = Some(charge);
    trace!(rolled, doubled, "breath weapon");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::combat::state::{Actor, BreathState};
    use crate::data::monsters::{blue_slaad, doom_marauder, giant_ape, young_blue_dragon};
    use crate::data::party::{PartyComposition, Role};

    #[test]
    fn attacks_the_weakest_ally_and_latches_first_crit() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);

        // The Wizard (60) is the weakest; both swings miss.
        let mut dice = ScriptedDice::new([2, 3]);
        take_turn(&mut state, &mut dice);
        assert_eq!(state.observed.monster_first_attack_crit, Some(false));
        assert_eq!(state.ally(state.ally_index(Role::Wizard).unwrap()).hp(), 60);
    }

    #[test]
    fn regeneration_comes_before_attacks() {
        let party = PartyComposition::Solo.members(8);
        let monster = blue_slaad();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        state.damage_monster(30);

        let mut dice = ScriptedDice::new([1, 1, 1]);
        take_turn(&mut state, &mut dice);
        assert_eq!(state.monster.hp(), 84);
        assert_eq!(state.ally(0).hp(), 71);
    }

    #[test]
    fn breath_hits_every_living_ally_with_saves() {
        let party = PartyComposition::FullParty.members(10);
        let monster = young_blue_dragon();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);

        // 10d10 of threes = 30; Fighter saves (15), the rest take 30. 30 * 2 = 60 reaches
        // the Wizard's 60, so the second charge doubles everything.
        let faces = [3; 10];
        let mut dice = ScriptedDice::new(faces).with_checks([true, false, false, false]);
        take_turn(&mut state, &mut dice);

        assert_eq!(state.ally(0).hp(), 100 - 30);
        assert_eq!(state.ally(1).hp(), 63 - 60);
        assert_eq!(state.ally(2).hp(), 80 - 60);
        assert_eq!(state.ally(3).hp(), 0);
        assert_eq!(
            state.monster.breath,
            Some(BreathState {
                ready: false,
                charges: 0
            })
        );
        assert_eq!(state.observed.monster_first_attack_crit, None);
    }

    #[test]
    fn single_charge_breath_when_doubling_kills_nobody() {
        let party = PartyComposition::FullParty.members(10);
        let monster = young_blue_dragon();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);

        // 10d10 of ones = 10; doubled 20 kills nobody.
        let mut dice = ScriptedDice::new([1; 10]).with_checks([false; 4]);
        take_turn(&mut state, &mut dice);
        assert_eq!(state.ally(3).hp(), 50);
        assert_eq!(
            state.monster.breath,
            Some(BreathState {
                ready: true,
                charges: 1
            })
        );
    }

    #[test]
    fn breath_needs_two_targets_and_recharges_on_five_or_six() {
        let party = PartyComposition::Solo.members(8);
        let monster = young_blue_dragon();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        state.monster.breath = Some(BreathState {
            ready: false,
            charges: 0,
        });

        // Recharge roll 5 refills, but one target means claws: three natural ones.
        let mut dice = ScriptedDice::new([5, 1, 1, 1]);
        take_turn(&mut state, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(
            state.monster.breath,
            Some(BreathState {
                ready: true,
                charges: 2
            })
        );
        assert_eq!(state.ally(0).hp(), 71);
    }

    #[test]
    fn wolf_joins_when_bloodied_for_three_turns() {
        let party = PartyComposition::Solo.members(8);
        let monster = doom_marauder();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        state.damage_monster(90);

        // Wolf: 15 + 5 hits AC 16 for 2d4 (1, 1) + 3. Then two natural ones.
        let mut dice = ScriptedDice::new([15, 1, 1, 1, 1]);
        take_turn(&mut state, &mut dice);
        assert_eq!(state.ally(0).hp(), 66);
        assert_eq!(state.monster.summon.map(|pack| pack.rounds_left), Some(2));

        for _ in 0..2 {
            let mut dice = ScriptedDice::new([1, 1, 1]);
            take_turn(&mut state, &mut dice);
        }
        let mut dice = ScriptedDice::new([1, 1]);
        take_turn(&mut state, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.monster.summon.map(|pack| pack.rounds_left), Some(0));
    }
}
