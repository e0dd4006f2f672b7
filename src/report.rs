//! CSV and console output for scenario summaries.

use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::simulation::ScenarioSummary;

pub const SUMMARY_HEADERS: [&str; 14] = [
    "scenario",
    "composition",
    "monster",
    "warrior_die",
    "sims",
    "baseline_P(win)",
    "P(win | allies first)",
    "P(win | first attack crit)",
    "ΔP(win) if first attack missed",
    "ΔP(win) if received crit on monster first turn",
    "crit_streak_min",
    "crit_streak_max",
    "crit_streak_avg>0",
    "avg_rounds",
];

fn rounded(value: f64) -> String {
    format!("{}", (value * 10_000.0).round() / 10_000.0)
}

fn probability(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), rounded)
}

pub fn summary_row(summary: &ScenarioSummary) -> [String; 14] {
    [
        summary.scenario.clone(),
        summary.composition.to_string(),
        summary.monster.clone(),
        format!("d{}", summary.weapon_die),
        summary.sims.to_string(),
        rounded(summary.baseline_win),
        probability(summary.win_if_allies_first),
        probability(summary.win_if_first_attack_crit),
        probability(summary.delta_if_first_attack_missed),
        probability(summary.delta_if_monster_first_crit),
        summary.crit_streaks.min.to_string(),
        summary.crit_streaks.max.to_string(),
        rounded(summary.crit_streaks.mean),
        rounded(summary.avg_rounds),
    ]
}

pub fn write_summaries<W: io::Write>(writer: W, summaries: &[ScenarioSummary]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(SUMMARY_HEADERS)?;
    for summary in summaries {
        csv.write_record(summary_row(summary))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_summaries_csv(path: &Path, summaries: &[ScenarioSummary]) -> Result<()> {
    write_summaries(File::create(path)?, summaries)
}

/// Tab-separated table for terminals.
pub fn render_table(summaries: &[ScenarioSummary]) -> String {
    let mut out = SUMMARY_HEADERS.join("\t");
    out.push('\n');
    for summary in summaries {
        let _ = writeln!(out, "{}", summary_row(summary).join("\t"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::party::PartyComposition;
    use crate::simulation::StreakStats;

    fn sample() -> ScenarioSummary {
        ScenarioSummary {
            scenario: "solo vs Cloaker d8".to_string(),
            composition: PartyComposition::Solo,
            monster: "Cloaker".to_string(),
            weapon_die: 8,
            sims: 3,
            baseline_win: 2.0 / 3.0,
            win_if_allies_first: Some(1.0),
            win_if_first_attack_crit: None,
            delta_if_first_attack_missed: Some(-0.123456),
            delta_if_monster_first_crit: None,
            crit_streaks: StreakStats {
                min: 1,
                max: 2,
                mean: 1.5,
            },
            avg_rounds: 7.0,
        }
    }

    #[test]
    fn undefined_probabilities_render_as_nan() {
        let row = summary_row(&sample());
        assert_eq!(row[7], "NaN");
        assert_eq!(row[9], "NaN");
    }

    #[test]
    fn floats_are_rounded_to_four_places() {
        let row = summary_row(&sample());
        assert_eq!(row[3], "d8");
        assert_eq!(row[5], "0.6667");
        assert_eq!(row[8], "-0.1235");
        assert_eq!(row[12], "1.5");
    }

    #[test]
    fn csv_has_header_and_one_row_per_summary() {
        let mut buffer = Vec::new();
        write_summaries(&mut buffer, &[sample(), sample()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("scenario,composition,monster,warrior_die"));
        assert!(lines[1].contains("NaN"));
    }

    #[test]
    fn table_is_tab_separated() {
        let table = render_table(&[sample()]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.lines().all(|line| line.split('\t').count() == SUMMARY_HEADERS.len()));
    }
}
