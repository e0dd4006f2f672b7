//! Sweep configuration: which scenarios to estimate and how many samples each.
//!
//! Loaded from YAML (or JSON, by extension). Every field has a default, and the
//! default configuration reproduces the reference study.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combat::{EncounterConfig, TraceMode, DEFAULT_MAX_ROUNDS};
use crate::data::loader::load_roster;
use crate::data::monsters::{find_monster, MonsterTemplate};
use crate::data::party::PartyComposition;
use crate::error::{Error, Result};
use crate::simulation::{Scenario, DEFAULT_SEED, DEFAULT_SIMS};

/// Monster name that expands to every monster in the roster.
pub const ALL_MONSTERS: &str = "all";

pub const DEFAULT_OUTPUT: &str = "critline_summaries.csv";

fn default_sims() -> usize {
    DEFAULT_SIMS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_scenarios() -> Vec<ScenarioSpec> {
    vec![
        ScenarioSpec {
            composition: PartyComposition::Solo,
            monsters: vec!["cloaker".to_string()],
            weapon_dice: vec![4, 6, 8, 10, 12, 20],
        },
        ScenarioSpec {
            composition: PartyComposition::Duo,
            monsters: vec!["giant_ape".to_string()],
            weapon_dice: vec![8],
        },
        ScenarioSpec {
            composition: PartyComposition::FullParty,
            monsters: vec![ALL_MONSTERS.to_string()],
            weapon_dice: vec![10],
        },
    ]
}

/// A party composition crossed with monsters and Warrior weapon dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub composition: PartyComposition,
    pub monsters: Vec<String>,
    pub weapon_dice: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sims")]
    pub sims: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads; 0 uses every core.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Extra YAML/JSON stat blocks merged over the built-in catalog.
    #[serde(default)]
    pub monster_files: Vec<PathBuf>,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioSpec>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sims: DEFAULT_SIMS,
            seed: DEFAULT_SEED,
            workers: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            output: default_output(),
            monster_files: Vec::new(),
            scenarios: default_scenarios(),
        }
    }
}

impl SweepConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        Self::parse(&raw, is_json)
    }

    pub fn parse(raw: &str, json: bool) -> Result<Self> {
        let config: Self = if json {
            serde_json::from_str(raw)?
        } else {
            serde_yaml::from_str(raw)?
        };
        Ok(config)
    }

    fn encounter(&self) -> EncounterConfig {
        EncounterConfig {
            max_rounds: self.max_rounds,
            trace_mode: TraceMode::Off,
        }
    }

    /// Expand into concrete scenarios against the roster (catalog plus `monster_files`).
    /// Fails on the first unknown monster or invalid parameter.
    pub fn scenarios(&self) -> Result<Vec<Scenario>> {
        let roster = load_roster(&self.monster_files)?;
        let mut scenarios = Vec::new();
        for spec in &self.scenarios {
            let monsters = resolve_monsters(&roster, &spec.monsters)?;
            for monster in &monsters {
                for &die in &spec.weapon_dice {
                    let scenario = Scenario::new(spec.composition, monster.clone(), die)
                        .with_sims(self.sims)
                        .with_seed(self.seed)
                        .with_encounter(self.encounter());
                    scenario.validate()?;
                    scenarios.push(scenario);
                }
            }
        }
        Ok(scenarios)
    }
}

fn resolve_monsters(roster: &[MonsterTemplate], names: &[String]) -> Result<Vec<MonsterTemplate>> {
    let mut picked = Vec::new();
    for name in names {
        if name.trim().eq_ignore_ascii_case(ALL_MONSTERS) {
            picked.extend(roster.iter().cloned());
            continue;
        }
        let monster =
            find_monster(roster, name).ok_or_else(|| Error::UnknownMonster(name.clone()))?;
        picked.push(monster.clone());
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::monsters::builtin_monsters;

    #[test]
    fn default_sweep_matches_reference_study() {
        let scenarios = SweepConfig::default().scenarios().unwrap();
        assert_eq!(scenarios.len(), 6 + 1 + builtin_monsters().len());

        let solo: Vec<u32> = scenarios
            .iter()
            .filter(|s| s.composition == PartyComposition::Solo)
            .map(|s| s.weapon_die)
            .collect();
        assert_eq!(solo, vec![4, 6, 8, 10, 12, 20]);
        assert!(scenarios
            .iter()
            .filter(|s| s.composition == PartyComposition::Solo)
            .all(|s| s.monster.name() == "Cloaker"));

        let duo: Vec<&Scenario> = scenarios
            .iter()
            .filter(|s| s.composition == PartyComposition::Duo)
            .collect();
        assert_eq!(duo.len(), 1);
        assert_eq!(duo[0].monster.name(), "Giant Ape");
        assert_eq!(duo[0].weapon_die, 8);
    }

    #[test]
    fn yaml_fills_defaults() {
        let raw = r#"
sims: 500
scenarios:
  - composition: full_party
    monsters: [young_blue_dragon, Doom Marauder]
    weapon_dice: [6, 12]
"#;
        let config = SweepConfig::parse(raw, false).unwrap();
        assert_eq!(config.sims, 500);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        let scenarios = config.scenarios().unwrap();
        assert_eq!(scenarios.len(), 4);
        assert!(scenarios.iter().all(|s| s.sims == 500));
    }

    #[test]
    fn json_is_accepted() {
        let raw = r#"{"sims": 10, "workers": 2, "scenarios": [
            {"composition": "duo", "monsters": ["cloaker"], "weapon_dice": [8]}
        ]}"#;
        let config = SweepConfig::parse(raw, true).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.scenarios().unwrap().len(), 1);
    }

    #[test]
    fn unknown_monster_is_reported() {
        let mut config = SweepConfig::default();
        config.scenarios[0].monsters = vec!["tarrasque".to_string()];
        assert!(matches!(
            config.scenarios(),
            Err(Error::UnknownMonster(name)) if name == "tarrasque"
        ));
    }

    #[test]
    fn zero_round_cap_is_rejected() {
        let config = SweepConfig::parse("max_rounds: 0\n", false).unwrap();
        assert_eq!(config.max_rounds, 0);
        assert!(matches!(config.scenarios(), Err(Error::InvalidRoundCap(0))));
    }

    #[test]
    fn bad_weapon_die_is_rejected() {
        let mut config = SweepConfig::default();
        config.scenarios[1].weapon_dice = vec![0];
        assert!(matches!(config.scenarios(), Err(Error::InvalidDamageDie(0))));
    }
}
