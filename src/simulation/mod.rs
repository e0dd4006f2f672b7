pub mod monte_carlo;
pub mod summary;

pub use monte_carlo::{
    run_encounters, run_encounters_parallel, run_scenario, run_scenario_parallel, stable_seed,
    Scenario, DEFAULT_SEED, DEFAULT_SIMS,
};
pub use summary::{conditional_prob, summarize, win_rate, ScenarioSummary, StreakStats};
