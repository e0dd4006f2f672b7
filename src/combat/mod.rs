pub mod dice;
pub mod engine;
pub mod initiative;
pub mod resolvers;
pub mod rng;
pub mod state;

pub use dice::{
    attack_roll, attack_roll_with_advantage, damage_roll, roll_die, AttackOutcome, AttackRoll,
};
pub use engine::{
    run_encounter, EncounterConfig, EncounterResult, HitPoints, Outcome, TraceMode, TurnSnapshot,
    DEFAULT_MAX_ROUNDS,
};
pub use initiative::{initiative_order, initiative_scores};
pub use rng::{DiceSource, Rng, ScriptedDice};
pub use state::{Actor, EncounterState};
