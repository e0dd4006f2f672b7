//! Run every scenario once sequentially and once in parallel, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup

use std::time::Instant;

use critline::data::monsters::builtin_monsters;
use critline::data::party::PartyComposition;
use critline::simulation::{run_scenario, run_scenario_parallel, Scenario, ScenarioSummary};

fn main() {
    let seed = 12345u64;
    let sims = 2_000;

    let scenarios: Vec<Scenario> = builtin_monsters()
        .into_iter()
        .flat_map(|monster| {
            [PartyComposition::Solo, PartyComposition::Duo, PartyComposition::FullParty]
                .into_iter()
                .map(move |composition| {
                    Scenario::new(composition, monster.clone(), 10)
                        .with_sims(sims)
                        .with_seed(seed)
                })
        })
        .collect();

    let n = scenarios.len();
    println!("Monte Carlo: {} scenarios × {} encounters", n, sims);
    println!();

    let run_all = |runner: fn(&Scenario) -> critline::Result<ScenarioSummary>| {
        scenarios.iter().map(runner).collect::<critline::Result<Vec<_>>>()
    };

    let t0 = Instant::now();
    let results_seq = match run_all(run_scenario) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("sequential run failed: {err}");
            std::process::exit(1);
        }
    };
    let elapsed_seq = t0.elapsed();
    let seq_ms = elapsed_seq.as_secs_f64() * 1000.0;
    println!(
        "Sequential:  {:.2} ms  ({:.1} sims/s)",
        seq_ms,
        (n * sims) as f64 / elapsed_seq.as_secs_f64()
    );

    let t0 = Instant::now();
    let results_par = match run_all(run_scenario_parallel) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("parallel run failed: {err}");
            std::process::exit(1);
        }
    };
    let elapsed_par = t0.elapsed();
    let par_ms = elapsed_par.as_secs_f64() * 1000.0;
    println!(
        "Parallel:    {:.2} ms  ({:.1} sims/s)",
        par_ms,
        (n * sims) as f64 / elapsed_par.as_secs_f64()
    );

    let speedup = seq_ms / par_ms;
    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", speedup);

    assert_eq!(results_seq.len(), results_par.len());
    for (a, b) in results_seq.iter().zip(results_par.iter()) {
        assert!(
            (a.baseline_win - b.baseline_win).abs() < 1e-12,
            "{} win rate mismatch",
            a.scenario
        );
        assert!(
            (a.avg_rounds - b.avg_rounds).abs() < 1e-12,
            "{} avg_rounds mismatch",
            a.scenario
        );
    }
    println!("(Results match sequential vs parallel)");
}
