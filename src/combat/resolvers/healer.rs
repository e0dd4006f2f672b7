//! Healer turn: pick the strongest heal the slots allow, otherwise swing.

use std::cmp::Ordering;

use crate::combat::resolvers::weapon_attack;
use crate::combat::rng::DiceSource;
use crate::combat::state::{AllyResources, EncounterState};
use crate::data::party::{Role, RoleKit, SlotTable, SpellDice};

fn slots<'s>(state: &'s mut EncounterState<'_>, index: usize) -> Option<&'s mut SlotTable> {
    match &mut state.ally_mut(index).resources {
        AllyResources::Healer { slots } => Some(slots),
        _ => None,
    }
}

/// Lowest HP first. Two-member parties break ties toward the Warrior; larger ones
/// toward the lower HP fraction.
fn heal_priority(state: &EncounterState<'_>, a: usize, b: usize) -> Ordering {
    let (left, right) = (state.ally(a), state.ally(b));
    left.hp().cmp(&right.hp()).then_with(|| {
        if state.allies().len() == 2 {
            let not_warrior = |role: Role| role != Role::Warrior;
            not_warrior(left.role()).cmp(&not_warrior(right.role()))
        } else {
            left.hp_fraction().total_cmp(&right.hp_fraction())
        }
    })
}

fn living_where(state: &EncounterState<'_>, keep: impl Fn(i32, i32) -> bool) -> Vec<usize> {
    let mut picked: Vec<usize> = state
        .allies()
        .iter()
        .enumerate()
        .filter(|(_, ally)| ally.is_alive() && keep(ally.hp(), ally.max_hp()))
        .map(|(index, _)| index)
        .collect();
    picked.sort_by(|&a, &b| heal_priority(state, a, b).then(a.cmp(&b)));
    picked
}

fn cast<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    spell: &SpellDice,
    tier: u8,
    targets: &[usize],
    dice: &mut D,
) -> bool {
    if !slots(state, index).is_some_and(|slots| slots.spend(tier)) {
        return false;
    }
    for &target in targets {
        let amount = spell.roll(tier, dice);
        state.heal_ally(target, amount);
    }
    true
}

pub fn take_turn<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    dice: &mut D,
) {
    let template = state.ally(index).template;
    let RoleKit::Healer(kit) = &template.kit else {
        return;
    };
    let available = match state.ally(index).resources {
        AllyResources::Healer { slots } => slots,
        _ => SlotTable::empty(),
    };

    let injured = living_where(state, |hp, max| hp < max);
    if injured.is_empty() {
        weapon_attack(state, index, dice);
        return;
    }

    if injured.len() >= 2 {
        if let Some(tier) = available.highest_at_least(kit.pair_heal.min_tier) {
            if cast(state, index, &kit.pair_heal, tier, &injured[..2], dice) {
                return;
            }
        }
    }

    let critical = living_where(state, |hp, max| hp <= max / 2);
    if let (Some(&target), Some(tier)) = (critical.first(), available.highest_available()) {
        if cast(state, index, &kit.single_heal, tier, &[target], dice) {
            return;
        }
    }

    if let Some(tier) = available.lowest_available() {
        if cast(state, index, &kit.quick_heal, tier, &injured[..1], dice) {
            return;
        }
    }

    weapon_attack(state, index, dice);
}
