//! Warrior turn: second wind, weapon swings with technique dice, and action surge.

use crate::combat::dice::{attack_roll_with_advantage, damage_roll, roll_die, AttackOutcome};
use crate::combat::resolvers::counter_if_ready;
use crate::combat::rng::DiceSource;
use crate::combat::state::{AllyResources, EncounterState, WarriorResources};
use crate::data::party::{CombatantTemplate, RoleKit, WarriorKit};

fn resources<'s>(
    state: &'s mut EncounterState<'_>,
    index: usize,
) -> Option<&'s mut WarriorResources> {
    match &mut state.ally_mut(index).resources {
        AllyResources::Warrior(resources) => Some(resources),
        _ => None,
    }
}

fn spend_technique_die(state: &mut EncounterState<'_>, index: usize) -> bool {
    match resources(state, index) {
        Some(res) if res.technique_dice > 0 => {
            res.technique_dice -= 1;
            true
        }
        _ => false,
    }
}

pub fn take_turn<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    dice: &mut D,
) {
    let template = state.ally(index).template;
    let RoleKit::Warrior(kit) = &template.kit else {
        return;
    };
    let stats = &template.stats;

    second_wind(state, index, kit, dice);

    let mut any_critical = false;
    for _ in 0..stats.attacks_per_turn {
        if !state.monster.is_alive() || !state.ally(index).is_alive() {
            return;
        }
        any_critical |= swing(state, index, kit, stats, dice).is_critical();
    }

    if !state.monster.is_alive() || !state.ally(index).is_alive() {
        return;
    }
    let finish_threshold = kit.surge_finish_margin * stats.expected_hit_damage();
    let finishing = f64::from(state.monster.hp()) <= finish_threshold;
    if !(any_critical || finishing) {
        return;
    }
    let surged = match resources(state, index) {
        Some(res) if res.action_surges > 0 => {
            res.action_surges -= 1;
            true
        }
        _ => false,
    };
    if surged {
        swing(state, index, kit, stats, dice);
    }
}

fn second_wind<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    kit: &WarriorKit,
    dice: &mut D,
) {
    let Some(heal) = kit.second_wind else {
        return;
    };
    let ally = state.ally(index);
    if f64::from(ally.hp()) >= kit.second_wind_threshold * f64::from(ally.max_hp()) {
        return;
    }
    let ready = match resources(state, index) {
        Some(res) if res.second_wind_ready => {
            res.second_wind_ready = false;
            true
        }
        _ => false,
    };
    if ready {
        let amount = heal.roll(dice);
        state.heal_ally(index, amount);
    }
}

/// One weapon swing, recorded as a Warrior attack for the observables.
fn swing<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    kit: &WarriorKit,
    stats: &CombatantTemplate,
    dice: &mut D,
) -> AttackOutcome {
    let power = match resources(state, index) {
        Some(res) if res.advantage_next => {
            res.advantage_next = false;
            true
        }
        _ => false,
    };
    let attack_mod = if power {
        stats.attack_mod - kit.power_attack_penalty
    } else {
        stats.attack_mod
    };
    let armor = state.monster.template.stats.armor_class;

    let roll = attack_roll_with_advantage(dice, power);
    let mut hit = roll.hits(attack_mod, armor);
    if !hit && !roll.critical_miss {
        let shortfall = armor - roll.total(attack_mod);
        if shortfall <= kit.technique_die as i32 && spend_technique_die(state, index) {
            let boost = roll_die(dice, kit.technique_die) as i32;
            hit = roll.total(attack_mod) + boost >= armor;
        }
    }

    let outcome = AttackOutcome::classify(roll, hit);
    state.observed.record_warrior_attack(outcome);

    if !hit {
        counter_if_ready(state, index, dice);
        return outcome;
    }

    let bonus = if power { kit.power_attack_bonus } else { 0 };
    let mut damage = damage_roll(dice, stats.damage_die, stats.damage_mod + bonus, roll.critical);
    let monster_healthy = state.monster.hp() > state.monster.max_hp() / 2;
    if monster_healthy && !power && spend_technique_die(state, index) {
        damage += roll_die(dice, kit.technique_die) as i32;
        if let Some(res) = resources(state, index) {
            res.advantage_next = true;
        }
    }
    state.damage_monster(damage);
    outcome
}
