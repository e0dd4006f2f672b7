use crate::combat::dice::{attack_roll_with_advantage, damage_roll, dice_damage};
use crate::combat::resolvers::counter_if_ready;
use crate::combat::rng::DiceSource;
use crate::combat::state::EncounterState;
use crate::data::party::{Role, RoleKit};

/// One attack. Advantage when no other ally has acted yet this round; sneak attack
/// when another ally already acted or the attack had advantage.
pub fn take_turn<D: DiceSource + ?Sized>(
    state: &mut EncounterState<'_>,
    index: usize,
    dice: &mut D,
) {
    let template = state.ally(index).template;
    let RoleKit::Rogue(kit) = &template.kit else {
        return;
    };
    let stats = &template.stats;

    let ally_acted = state.other_ally_acted(Role::Rogue);
    let advantage = !ally_acted;
    let sneak = ally_acted || advantage;

    let roll = attack_roll_with_advantage(dice, advantage);
    if !roll.hits(stats.attack_mod, state.monster.template.stats.armor_class) {
        counter_if_ready(state, index, dice);
        return;
    }

    let mut damage = damage_roll(dice, stats.damage_die, stats.damage_mod, roll.critical);
    if sneak {
        damage += dice_damage(dice, kit.sneak_dice, kit.sneak_die, 0, roll.critical);
    }
    state.damage_monster(damage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::combat::state::Actor;
    use crate::data::monsters::giant_ape;
    use crate::data::party::PartyComposition;

    #[test]
    fn first_to_act_rolls_with_advantage_and_sneaks() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let rogue = state.ally_index(Role::Rogue).unwrap();

        // Advantage 2 and 11: 11 + 6 = 17 hits AC 12. 1d8 (5) + 3 plus 5d6 of ones.
        let mut dice = ScriptedDice::new([2, 11, 5, 1, 1, 1, 1, 1]);
        take_turn(&mut state, rogue, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.monster.hp(), 157 - 13);
    }

    #[test]
    fn after_an_ally_the_roll_is_plain_but_sneak_applies() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let rogue = state.ally_index(Role::Rogue).unwrap();
        state.mark_acted(Role::Wizard);

        // Critical: weapon 2d8 (4, 4) + 3, sneak 10d6 of twos.
        let mut dice = ScriptedDice::new([20, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2]);
        take_turn(&mut state, rogue, &mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(state.monster.hp(), 157 - 31);
    }

    #[test]
    fn miss_deals_nothing() {
        let party = PartyComposition::FullParty.members(10);
        let monster = giant_ape();
        let mut state = EncounterState::new(&party, &monster, vec![Actor::Monster]);
        let rogue = state.ally_index(Role::Rogue).unwrap();

        let mut dice = ScriptedDice::new([1, 1]);
        take_turn(&mut state, rogue, &mut dice);
        assert_eq!(state.monster.hp(), 157);
    }
}
