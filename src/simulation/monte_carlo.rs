use rayon::prelude::*;
use tracing::info;

use crate::combat::{run_encounter, EncounterConfig, EncounterResult, Rng};
use crate::data::monsters::{MonsterTemplate, MAX_DIE};
use crate::data::party::{AllyTemplate, PartyComposition};
use crate::error::{Error, Result};
use crate::simulation::summary::{summarize, ScenarioSummary};

pub const DEFAULT_SIMS: usize = 10_000;
pub const DEFAULT_SEED: u64 = 42;

/// One configuration to estimate: a party, the monster it faces, and the Warrior's
/// weapon die, plus sampling parameters.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub label: String,
    pub composition: PartyComposition,
    pub monster: MonsterTemplate,
    pub weapon_die: u32,
    pub sims: usize,
    pub seed: u64,
    pub encounter: EncounterConfig,
}

impl Scenario {
    pub fn new(composition: PartyComposition, monster: MonsterTemplate, weapon_die: u32) -> Self {
        Self {
            label: format!("{composition} vs {} d{weapon_die}", monster.name()),
            composition,
            monster,
            weapon_die,
            sims: DEFAULT_SIMS,
            seed: DEFAULT_SEED,
            encounter: EncounterConfig::default(),
        }
    }

    pub fn with_sims(mut self, sims: usize) -> Self {
        self.sims = sims;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_encounter(mut self, encounter: EncounterConfig) -> Self {
        self.encounter = encounter;
        self
    }

    pub fn party(&self) -> Vec<AllyTemplate> {
        self.composition.members(self.weapon_die)
    }

    /// Base seed for this scenario's encounters; encounter `i` uses this plus `i`.
    pub fn scenario_seed(&self) -> u64 {
        stable_seed(&self.label, self.seed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sims == 0 {
            return Err(Error::InvalidSampleCount(self.sims));
        }
        if !(2..=MAX_DIE).contains(&self.weapon_die) {
            return Err(Error::InvalidDamageDie(self.weapon_die));
        }
        if self.encounter.max_rounds == 0 {
            return Err(Error::InvalidRoundCap(self.encounter.max_rounds));
        }
        let problems = self.monster.problems();
        if !problems.is_empty() {
            return Err(Error::InvalidMonster {
                name: self.monster.name().to_string(),
                problems: problems.join("; "),
            });
        }
        Ok(())
    }
}

/// Mixes the scenario label into the base seed so every scenario draws its own stream.
pub fn stable_seed(label: &str, seed: u64) -> u64 {
    label
        .bytes()
        .fold(seed, |acc, b| acc.wrapping_mul(37).wrapping_add(u64::from(b)))
}

pub fn run_encounters(scenario: &Scenario) -> Result<Vec<EncounterResult>> {
    run_encounters_with_parallelism(scenario, false)
}

/// Like [run_encounters] but spreads the encounters across Rayon workers. Each
/// encounter owns its seed, so the results match the sequential run exactly.
pub fn run_encounters_parallel(scenario: &Scenario) -> Result<Vec<EncounterResult>> {
    run_encounters_with_parallelism(scenario, true)
}

fn run_encounters_with_parallelism(
    scenario: &Scenario,
    parallel: bool,
) -> Result<Vec<EncounterResult>> {
    scenario.validate()?;
    let party = scenario.party();
    let base_seed = scenario.scenario_seed();

    let run_one = |iteration: usize| {
        let mut rng = Rng::new(base_seed.wrapping_add(iteration as u64));
        run_encounter(&party, &scenario.monster, scenario.encounter, &mut rng)
    };

    let results: Vec<EncounterResult> = if parallel {
        (0..scenario.sims).into_par_iter().map(run_one).collect()
    } else {
        (0..scenario.sims).map(run_one).collect()
    };
    Ok(results)
}

pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioSummary> {
    run_scenario_with_parallelism(scenario, false)
}

pub fn run_scenario_parallel(scenario: &Scenario) -> Result<ScenarioSummary> {
    run_scenario_with_parallelism(scenario, true)
}

fn run_scenario_with_parallelism(scenario: &Scenario, parallel: bool) -> Result<ScenarioSummary> {
    let results = run_encounters_with_parallelism(scenario, parallel)?;
    let summary = summarize(scenario, &results);
    info!(
        scenario = %scenario.label,
        sims = scenario.sims,
        win_rate = summary.baseline_win,
        avg_rounds = summary.avg_rounds,
        "scenario finished"
    );
    Ok(summary)
}
