//! Load extra monster stat blocks from YAML or JSON and merge them with the catalog.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::data::monsters::{builtin_monsters, normalize_lookup, MonsterTemplate};
use crate::error::{Error, Result};

/// A monster file holds either a single stat block or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MonsterFile {
    Many(Vec<MonsterTemplate>),
    One(MonsterTemplate),
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse monsters from text; JSON when `json` is set, YAML otherwise.
pub fn parse_monsters(raw: &str, json: bool) -> Result<Vec<MonsterTemplate>> {
    let parsed: MonsterFile = if json {
        serde_json::from_str(raw)?
    } else {
        serde_yaml::from_str(raw)?
    };
    let monsters = match parsed {
        MonsterFile::Many(list) => list,
        MonsterFile::One(monster) => vec![monster],
    };
    for monster in &monsters {
        let problems = monster.problems();
        if !problems.is_empty() {
            return Err(Error::InvalidMonster {
                name: monster.name().to_string(),
                problems: problems.join("; "),
            });
        }
    }
    Ok(monsters)
}

pub fn load_monster_file(path: &Path) -> Result<Vec<MonsterTemplate>> {
    let raw = fs::read_to_string(path)?;
    parse_monsters(&raw, is_json(path))
}

/// Built-in catalog plus every monster in `paths`. A loaded monster replaces a
/// catalog entry with the same normalized name.
pub fn load_roster<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<MonsterTemplate>> {
    let mut roster = builtin_monsters();
    for path in paths {
        for monster in load_monster_file(path.as_ref())? {
            let key = normalize_lookup(monster.name());
            roster.retain(|existing| normalize_lookup(existing.name()) != key);
            roster.push(monster);
        }
    }
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TROLL_YAML: &str = r#"
stats:
  name: Cave Troll
  max_hp: 84
  armor_class: 15
  attack_mod: 7
  damage_mod: 4
  damage_die: 6
  attacks_per_turn: 3
regen_per_turn: 10
"#;

    #[test]
    fn parses_single_yaml_stat_block() {
        let monsters = parse_monsters(TROLL_YAML, false).expect("troll should parse");
        assert_eq!(monsters.len(), 1);
        assert_eq!(monsters[0].name(), "Cave Troll");
        assert_eq!(monsters[0].regen_per_turn, Some(10));
        assert!(!monsters[0].counter_on_miss);
        assert!(monsters[0].breath.is_none());
    }

    #[test]
    fn parses_json_list_with_default_attacks() {
        let raw = r#"[{"stats": {"name": "Dummy", "max_hp": 1, "armor_class": 1,
            "attack_mod": 0, "damage_mod": 0, "damage_die": 4}}]"#;
        let monsters = parse_monsters(raw, true).expect("dummy should parse");
        assert_eq!(monsters[0].stats.attacks_per_turn, 1);
    }

    #[test]
    fn rejects_invalid_stat_block() {
        let raw = TROLL_YAML.replace("max_hp: 84", "max_hp: -3");
        let err = parse_monsters(&raw, false).expect_err("negative hp must be rejected");
        assert!(matches!(err, Error::InvalidMonster { .. }));
    }

    #[test]
    fn rejects_hit_points_beyond_the_cap() {
        let raw = TROLL_YAML.replace("max_hp: 84", "max_hp: 2000000000");
        let err = parse_monsters(&raw, false).expect_err("huge hp must be rejected");
        assert!(matches!(err, Error::InvalidMonster { .. }));
    }

    #[test]
    fn roster_without_files_is_the_catalog() {
        let roster = load_roster::<&Path>(&[]).expect("catalog loads");
        assert_eq!(roster.len(), builtin_monsters().len());
    }
}
