//! Reduce a batch of encounter results to win rates, conditional win rates and
//! critical-streak statistics.

use serde::Serialize;

use crate::combat::EncounterResult;
use crate::data::party::PartyComposition;
use crate::simulation::monte_carlo::Scenario;

/// `P(win | flag)`: wins among flagged samples over flagged samples. `None` when no
/// sample is flagged.
pub fn conditional_prob(wins: &[bool], flags: &[bool]) -> Option<f64> {
    let (flagged, won) = wins
        .iter()
        .zip(flags)
        .filter(|(_, &flag)| flag)
        .fold((0usize, 0usize), |(flagged, won), (&win, _)| {
            (flagged + 1, won + usize::from(win))
        });
    (flagged > 0).then(|| won as f64 / flagged as f64)
}

pub fn win_rate(wins: &[bool]) -> f64 {
    if wins.is_empty() {
        return 0.0;
    }
    wins.iter().filter(|&&win| win).count() as f64 / wins.len() as f64
}

/// Min, max and mean over positive streak lengths; all zero when there were none.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StreakStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

impl StreakStats {
    pub fn from_lengths<I: IntoIterator<Item = u32>>(lengths: I) -> Self {
        let mut count = 0u64;
        let mut total = 0u64;
        let mut min = u32::MAX;
        let mut max = 0;
        for length in lengths.into_iter().filter(|&length| length > 0) {
            count += 1;
            total += u64::from(length);
            min = min.min(length);
            max = max.max(length);
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            min,
            max,
            mean: total as f64 / count as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub composition: PartyComposition,
    pub monster: String,
    pub weapon_die: u32,
    pub sims: usize,
    pub baseline_win: f64,
    pub win_if_allies_first: Option<f64>,
    pub win_if_first_attack_crit: Option<f64>,
    /// `P(win | first attack missed) - baseline`.
    pub delta_if_first_attack_missed: Option<f64>,
    /// `P(win | monster's first attack crit) - baseline`.
    pub delta_if_monster_first_crit: Option<f64>,
    pub crit_streaks: StreakStats,
    pub avg_rounds: f64,
}

pub fn summarize(scenario: &Scenario, results: &[EncounterResult]) -> ScenarioSummary {
    let column = |pick: fn(&EncounterResult) -> bool| results.iter().map(pick).collect::<Vec<_>>();
    let wins = column(|r| r.allies_won);
    let baseline = win_rate(&wins);
    let delta = |flags: Vec<bool>| conditional_prob(&wins, &flags).map(|p| p - baseline);

    let avg_rounds = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| f64::from(r.rounds)).sum::<f64>() / results.len() as f64
    };

    ScenarioSummary {
        scenario: scenario.label.clone(),
        composition: scenario.composition,
        monster: scenario.monster.name().to_string(),
        weapon_die: scenario.weapon_die,
        sims: results.len(),
        baseline_win: baseline,
        win_if_allies_first: conditional_prob(&wins, &column(|r| r.allies_first)),
        win_if_first_attack_crit: conditional_prob(&wins, &column(|r| r.first_attack_crit)),
        delta_if_first_attack_missed: delta(column(|r| r.first_attack_miss)),
        delta_if_monster_first_crit: delta(column(|r| r.monster_first_crit)),
        crit_streaks: StreakStats::from_lengths(
            results.iter().flat_map(|r| r.crit_streaks.iter().copied()),
        ),
        avg_rounds,
    }
}
