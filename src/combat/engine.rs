//! The encounter loop: roll initiative, cycle turns in order, reset once-per-round
//! resources at round boundaries, and stop when one side is down.

use std::iter;

use serde::Serialize;
use tracing::{debug, warn};

use crate::combat::dice::AttackOutcome;
use crate::combat::initiative::initiative_order;
use crate::combat::resolvers::resolve_turn;
use crate::combat::rng::DiceSource;
use crate::combat::state::{Actor, EncounterState};
use crate::data::monsters::MonsterTemplate;
use crate::data::party::AllyTemplate;

pub const DEFAULT_MAX_ROUNDS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    #[default]
    Off,
    /// Record an HP snapshot after every turn.
    Turns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterConfig {
    pub max_rounds: u32,
    pub trace_mode: TraceMode,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            trace_mode: TraceMode::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AlliesWon,
    MonsterWon,
    /// Round cap reached with both sides standing; counts as a loss.
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitPoints {
    pub actor: Actor,
    pub hp: i32,
    pub max_hp: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSnapshot {
    pub round: u32,
    pub actor: Actor,
    pub participants: Vec<HitPoints>,
}

impl TurnSnapshot {
    fn capture(state: &EncounterState<'_>, actor: Actor) -> Self {
        let allies = state.allies().iter().map(|ally| HitPoints {
            actor: Actor::Ally(ally.role()),
            hp: ally.hp(),
            max_hp: ally.max_hp(),
        });
        let monster = HitPoints {
            actor: Actor::Monster,
            hp: state.monster.hp(),
            max_hp: state.monster.max_hp(),
        };
        Self {
            round: state.round(),
            actor,
            participants: allies.chain(iter::once(monster)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterResult {
    pub outcome: Outcome,
    pub allies_won: bool,
    pub allies_first: bool,
    pub first_attack_crit: bool,
    pub first_attack_miss: bool,
    pub monster_first_crit: bool,
    /// Closed Warrior critical-hit runs, in the order they ended.
    pub crit_streaks: Vec<u32>,
    pub max_streak: u32,
    pub rounds: u32,
    pub turns: u32,
    pub initiative: Vec<Actor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TurnSnapshot>,
}

/// Runs one encounter of `party` against `monster` to completion.
pub fn run_encounter<D: DiceSource + ?Sized>(
    party: &[AllyTemplate],
    monster: &MonsterTemplate,
    config: EncounterConfig,
    dice: &mut D,
) -> EncounterResult {
    let actors: Vec<Actor> = party
        .iter()
        .map(|ally| Actor::Ally(ally.role()))
        .chain(iter::once(Actor::Monster))
        .collect();
    let order = initiative_order(&actors, dice);
    let mut state = EncounterState::new(party, monster, order);
    let actor_count = state.order().len();

    let mut trace = Vec::new();
    let mut turns = 0u32;
    let mut stalemate = false;
    while !state.is_resolved() {
        if turns as usize % actor_count == 0 {
            if state.round() >= config.max_rounds {
                warn!(
                    monster = monster.name(),
                    rounds = state.round(),
                    "encounter hit the round cap, scoring it as a stalemate"
                );
                stalemate = true;
                break;
            }
            state.begin_round();
        }

        let actor = state.order()[turns as usize % actor_count];
        resolve_turn(&mut state, actor, dice);
        if config.trace_mode == TraceMode::Turns {
            trace.push(TurnSnapshot::capture(&state, actor));
        }
        turns += 1;
    }

    let outcome = if stalemate {
        Outcome::Stalemate
    } else if state.allies_won() {
        Outcome::AlliesWon
    } else {
        Outcome::MonsterWon
    };
    debug!(?outcome, rounds = state.round(), turns, "encounter resolved");

    let rounds = state.round();
    let initiative = state.order().to_vec();
    let observed = state.observed;
    let first = observed.warrior_first_attack;
    let max_streak = observed.streaks.max();
    EncounterResult {
        outcome,
        allies_won: outcome == Outcome::AlliesWon,
        allies_first: observed.allies_first,
        first_attack_crit: first.is_some_and(AttackOutcome::is_critical),
        first_attack_miss: first.is_some_and(AttackOutcome::is_miss),
        monster_first_crit: observed.monster_first_attack_crit.unwrap_or(false),
        crit_streaks: observed.streaks.into_closed(),
        max_streak,
        rounds,
        turns,
        initiative,
        trace,
    }
}
