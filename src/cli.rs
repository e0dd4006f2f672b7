use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::combat::{run_encounter, EncounterConfig, Rng, TraceMode};
use crate::config::SweepConfig;
use crate::data::monsters::{builtin_monsters, resolve_monster, MonsterTemplate, MAX_DIE};
use crate::data::party::PartyComposition;
use crate::error::Error;
use crate::parallel::{run_scenario_batches_with_progress, WorkerPool};
use crate::report::{render_table, write_summaries_csv};
use crate::simulation::{run_scenario_parallel, Scenario, DEFAULT_SEED};

const USAGE: &str = "usage: critline <simulate|estimate|sweep|monsters>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Estimate,
    Sweep,
    Monsters,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("estimate") => Some(Command::Estimate),
        Some("sweep") => Some(Command::Sweep),
        Some("monsters") => Some(Command::Monsters),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Estimate) => handle_estimate(args),
        Some(Command::Sweep) => handle_sweep(args),
        Some(Command::Monsters) => handle_monsters(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Arguments after the command name, without `--flags`.
fn positional(args: &[String]) -> Vec<&String> {
    args.iter().skip(2).filter(|arg| !arg.starts_with("--")).collect()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn fail(err: Error) -> i32 {
    eprintln!("error: {err}");
    1
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn monster_arg(raw: Option<&String>) -> Result<MonsterTemplate, Error> {
    let name = raw.map(String::as_str).unwrap_or("cloaker");
    resolve_monster(name).ok_or_else(|| Error::UnknownMonster(name.to_string()))
}

fn composition_arg(raw: Option<&String>) -> Result<PartyComposition, Error> {
    match raw {
        Some(value) => value.parse().map_err(Error::UnknownComposition),
        None => Ok(PartyComposition::Solo),
    }
}

fn monster_and_composition(
    params: &[&String],
) -> Result<(MonsterTemplate, PartyComposition), Error> {
    let monster = monster_arg(params.first().copied())?;
    let composition = composition_arg(params.get(1).copied())?;
    Ok((monster, composition))
}

fn handle_simulate(args: &[String]) -> i32 {
    let params = positional(args);
    let (monster, composition) = match monster_and_composition(&params) {
        Ok(pair) => pair,
        Err(err) => return fail(err),
    };
    let die = parse_die_arg(params.get(2).copied(), 8);
    let seed = parse_u64_arg(params.get(3).copied(), "seed", DEFAULT_SEED);
    if !(2..=MAX_DIE).contains(&die) {
        return fail(Error::InvalidDamageDie(die));
    }

    let party = composition.members(die);
    let config = EncounterConfig {
        trace_mode: TraceMode::Turns,
        ..EncounterConfig::default()
    };
    let result = run_encounter(&party, &monster, config, &mut Rng::new(seed));

    if has_flag(args, "--table") {
        println!("monster\tcomposition\tdie\tseed\toutcome\trounds\tturns\tcrit_streaks");
        println!(
            "{}\t{}\td{}\t{}\t{:?}\t{}\t{}\t{:?}",
            monster.name(),
            composition,
            die,
            seed,
            result.outcome,
            result.rounds,
            result.turns,
            result.crit_streaks
        );
        return 0;
    }
    print_json(&result, "encounter result")
}

fn handle_estimate(args: &[String]) -> i32 {
    let params = positional(args);
    let (monster, composition) = match monster_and_composition(&params) {
        Ok(pair) => pair,
        Err(err) => return fail(err),
    };
    let die = parse_die_arg(params.get(2).copied(), 8);
    let sims = parse_u32_arg(params.get(3).copied(), "sims", 10_000);
    let seed = parse_u64_arg(params.get(4).copied(), "seed", DEFAULT_SEED);

    let scenario = Scenario::new(composition, monster, die)
        .with_sims(sims as usize)
        .with_seed(seed);
    let summary = match run_scenario_parallel(&scenario) {
        Ok(summary) => summary,
        Err(err) => return fail(err),
    };

    if has_flag(args, "--table") {
        print!("{}", render_table(std::slice::from_ref(&summary)));
        return 0;
    }
    print_json(&summary, "scenario summary")
}

fn handle_sweep(args: &[String]) -> i32 {
    let params = positional(args);
    let config = match params.first() {
        Some(path) => match SweepConfig::load(Path::new(path.as_str())) {
            Ok(config) => config,
            Err(err) => return fail(err),
        },
        None => SweepConfig::default(),
    };

    let scenarios = match config.scenarios() {
        Ok(scenarios) => scenarios,
        Err(err) => return fail(err),
    };
    info!(
        scenarios = scenarios.len(),
        sims = config.sims,
        seed = config.seed,
        "starting sweep"
    );

    let pool = WorkerPool::with_workers(config.workers);
    let summaries = match run_scenario_batches_with_progress(&scenarios, &pool, |done, total| {
        info!(done, total, "sweep progress");
    }) {
        Ok(summaries) => summaries,
        Err(err) => return fail(err),
    };

    if let Err(err) = write_summaries_csv(&config.output, &summaries) {
        return fail(err);
    }
    print!("{}", render_table(&summaries));
    eprintln!("wrote {} rows to {}", summaries.len(), config.output.display());
    0
}

fn handle_monsters(args: &[String]) -> i32 {
    let monsters = builtin_monsters();
    if has_flag(args, "--json") {
        return print_json(&monsters, "monster catalog");
    }
    println!("name\thp\tac\tattack\tdamage\tattacks");
    for monster in &monsters {
        let stats = &monster.stats;
        println!(
            "{}\t{}\t{}\t{:+}\td{}{:+}\t{}",
            stats.name,
            stats.max_hp,
            stats.armor_class,
            stats.attack_mod,
            stats.damage_die,
            stats.damage_mod,
            stats.attacks_per_turn
        );
    }
    0
}

/// Accepts `8` or `d8`.
fn parse_die_arg(raw: Option<&String>, default: u32) -> u32 {
    raw.and_then(|value| {
        let digits = value.trim().trim_start_matches(['d', 'D']);
        digits.parse::<u32>().ok()
    })
    .unwrap_or_else(|| {
        if let Some(value) = raw {
            eprintln!("invalid weapon die '{value}', defaulting to d{default}");
        }
        default
    })
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["critline", "sweep"])), Some(Command::Sweep));
        assert_eq!(parse_command(&args(&["critline", "monsters"])), Some(Command::Monsters));
        assert_eq!(parse_command(&args(&["critline", "serve"])), None);
        assert_eq!(parse_command(&args(&["critline"])), None);
    }

    #[test]
    fn positional_skips_flags() {
        let list = args(&["critline", "estimate", "--table", "giant_ape", "duo"]);
        let params = positional(&list);
        assert_eq!(params, vec!["giant_ape", "duo"]);
    }

    #[test]
    fn die_accepts_prefix() {
        let raw = "d12".to_string();
        assert_eq!(parse_die_arg(Some(&raw), 8), 12);
        let raw = "20".to_string();
        assert_eq!(parse_die_arg(Some(&raw), 8), 20);
        let raw = "big".to_string();
        assert_eq!(parse_die_arg(Some(&raw), 8), 8);
        assert_eq!(parse_die_arg(None, 6), 6);
    }

    #[test]
    fn unknown_composition_maps_to_error() {
        let raw = "trio".to_string();
        assert!(matches!(composition_arg(Some(&raw)), Err(Error::UnknownComposition(_))));
    }
}
