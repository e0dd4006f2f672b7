//! Monster data: stat blocks plus optional capabilities. The built-in catalog covers
//! the six monsters of the study; extra stat blocks can be loaded with [crate::data::loader].

use serde::{Deserialize, Serialize};

use crate::data::party::CombatantTemplate;

/// Upper bounds for loaded stat blocks. Within them every damage roll, doubling and
/// heal stays far inside `i32`.
pub const MAX_HIT_POINTS: i32 = 1_000_000;
pub const MAX_MODIFIER: i32 = 10_000;
pub const MAX_DICE: u32 = 100;
pub const MAX_DIE: u32 = 1_000;

/// To-hit and damage of a monster-side attack (the monster itself or a summoned minion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub attack_mod: i32,
    pub damage_dice: u32,
    pub damage_die: u32,
    pub damage_mod: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathWeapon {
    pub dice: u32,
    pub die: u32,
    /// d6 faces that recharge the breath at the start of the monster's turn.
    pub recharge_faces: Vec<u32>,
    /// Probability each target saves for half damage.
    pub save_half_chance: f64,
    pub charges: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WolfSummon {
    /// Triggers once the monster is at or below this fraction of max HP.
    pub trigger_fraction: f64,
    pub rounds: u32,
    pub attack: AttackProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub stats: CombatantTemplate,
    #[serde(default)]
    pub regen_per_turn: Option<i32>,
    #[serde(default)]
    pub spell_resist_bonus: Option<i32>,
    /// Fraction of Wizard spell damage ignored.
    #[serde(default)]
    pub spell_damage_resistance: Option<f64>,
    #[serde(default)]
    pub crit_extra_dice: Option<u32>,
    #[serde(default)]
    pub breath: Option<BreathWeapon>,
    #[serde(default)]
    pub counter_on_miss: bool,
    #[serde(default)]
    pub wolf_summon: Option<WolfSummon>,
}

impl MonsterTemplate {
    /// Plain stat block with no optional capabilities.
    pub fn basic(stats: CombatantTemplate) -> Self {
        Self {
            stats,
            regen_per_turn: None,
            spell_resist_bonus: None,
            spell_damage_resistance: None,
            crit_extra_dice: None,
            breath: None,
            counter_on_miss: false,
            wolf_summon: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn attack_profile(&self) -> AttackProfile {
        AttackProfile {
            attack_mod: self.stats.attack_mod,
            damage_dice: 1,
            damage_die: self.stats.damage_die,
            damage_mod: self.stats.damage_mod,
        }
    }

    pub fn spell_armor_class(&self) -> i32 {
        self.stats.armor_class + self.spell_resist_bonus.unwrap_or(0)
    }

    pub fn spell_resistance(&self) -> f64 {
        self.spell_damage_resistance.unwrap_or(0.0)
    }

    /// Lists every problem with the stat block; empty means usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let stats = &self.stats;
        if stats.name.trim().is_empty() {
            problems.push("name is empty".to_string());
        }
        if !(1..=MAX_HIT_POINTS).contains(&stats.max_hp) {
            problems.push(format!(
                "max_hp must be in 1..={MAX_HIT_POINTS}, got {}",
                stats.max_hp
            ));
        }
        if stats.damage_die == 0 {
            problems.push("damage_die must be at least 1".to_string());
        }
        check_die("damage_die", stats.damage_die, &mut problems);
        check_modifier("armor_class", stats.armor_class, &mut problems);
        check_modifier("attack_mod", stats.attack_mod, &mut problems);
        check_modifier("damage_mod", stats.damage_mod, &mut problems);
        if stats.attacks_per_turn > MAX_DICE {
            problems.push(format!(
                "attacks_per_turn must be at most {MAX_DICE}, got {}",
                stats.attacks_per_turn
            ));
        }
        if let Some(regen) = self.regen_per_turn {
            check_modifier("regen_per_turn", regen, &mut problems);
        }
        if let Some(bonus) = self.spell_resist_bonus {
            check_modifier("spell_resist_bonus", bonus, &mut problems);
        }
        if let Some(extra) = self.crit_extra_dice {
            check_dice_count("crit_extra_dice", extra, &mut problems);
        }
        if let Some(resistance) = self.spell_damage_resistance {
            if !(0.0..1.0).contains(&resistance) {
                problems.push(format!(
                    "spell_damage_resistance must be in [0, 1), got {resistance}"
                ));
            }
        }
        if let Some(breath) = &self.breath {
            if breath.die == 0 || breath.charges == 0 {
                problems.push("breath needs a die and at least one charge".to_string());
            }
            check_dice_count("breath dice", breath.dice, &mut problems);
            check_die("breath die", breath.die, &mut problems);
            if breath.recharge_faces.iter().any(|face| !(1..=6).contains(face)) {
                problems.push("breath recharge faces must be d6 faces".to_string());
            }
            if !(0.0..=1.0).contains(&breath.save_half_chance) {
                problems.push("breath save_half_chance must be in [0, 1]".to_string());
            }
        }
        if let Some(summon) = &self.wolf_summon {
            if !(0.0..=1.0).contains(&summon.trigger_fraction) {
                problems.push("wolf_summon trigger_fraction must be in [0, 1]".to_string());
            }
            if summon.attack.damage_die == 0 {
                problems.push("wolf_summon attack needs a damage die".to_string());
            }
            check_dice_count("wolf_summon damage_dice", summon.attack.damage_dice, &mut problems);
            check_die("wolf_summon damage_die", summon.attack.damage_die, &mut problems);
            check_modifier("wolf_summon attack_mod", summon.attack.attack_mod, &mut problems);
            check_modifier("wolf_summon damage_mod", summon.attack.damage_mod, &mut problems);
        }
        problems
    }
}

fn check_modifier(field: &str, value: i32, problems: &mut Vec<String>) {
    if !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&value) {
        problems.push(format!("{field} must be within ±{MAX_MODIFIER}, got {value}"));
    }
}

fn check_dice_count(field: &str, value: u32, problems: &mut Vec<String>) {
    if value > MAX_DICE {
        problems.push(format!("{field} must be at most {MAX_DICE}, got {value}"));
    }
}

fn check_die(field: &str, value: u32, problems: &mut Vec<String>) {
    if value > MAX_DIE {
        problems.push(format!("{field} must be at most d{MAX_DIE}, got d{value}"));
    }
}

fn stats(
    name: &str,
    max_hp: i32,
    armor_class: i32,
    attack_mod: i32,
    damage_mod: i32,
    damage_die: u32,
    attacks_per_turn: u32,
) -> CombatantTemplate {
    CombatantTemplate {
        name: name.to_string(),
        max_hp,
        armor_class,
        attack_mod,
        damage_mod,
        damage_die,
        attacks_per_turn,
    }
}

pub fn cloaker() -> MonsterTemplate {
    MonsterTemplate {
        counter_on_miss: true,
        ..MonsterTemplate::basic(stats("Cloaker", 78, 14, 4, 2, 8, 1))
    }
}

pub fn blue_slaad() -> MonsterTemplate {
    MonsterTemplate {
        regen_per_turn: Some(10),
        ..MonsterTemplate::basic(stats("Blue Slaad", 104, 17, 5, 3, 8, 3))
    }
}

pub fn giant_ape() -> MonsterTemplate {
    MonsterTemplate {
        crit_extra_dice: Some(1),
        ..MonsterTemplate::basic(stats("Giant Ape", 157, 12, 7, 4, 12, 2))
    }
}

pub fn young_blue_dragon() -> MonsterTemplate {
    MonsterTemplate {
        breath: Some(BreathWeapon {
            dice: 10,
            die: 10,
            recharge_faces: vec![5, 6],
            save_half_chance: 0.5,
            charges: 2,
        }),
        ..MonsterTemplate::basic(stats("Young Blue Dragon", 152, 18, 7, 4, 10, 3))
    }
}

pub fn aberrant_screecher() -> MonsterTemplate {
    MonsterTemplate {
        spell_resist_bonus: Some(2),
        spell_damage_resistance: Some(0.25),
        ..MonsterTemplate::basic(stats("Aberrant Screecher", 140, 20, 8, 0, 6, 2))
    }
}

pub fn doom_marauder() -> MonsterTemplate {
    MonsterTemplate {
        wolf_summon: Some(WolfSummon {
            trigger_fraction: 0.5,
            rounds: 3,
            attack: AttackProfile {
                attack_mod: 5,
                damage_dice: 2,
                damage_die: 4,
                damage_mod: 3,
            },
        }),
        ..MonsterTemplate::basic(stats("Doom Marauder", 180, 17, 3, 3, 12, 2))
    }
}

pub fn builtin_monsters() -> Vec<MonsterTemplate> {
    vec![
        cloaker(),
        blue_slaad(),
        giant_ape(),
        young_blue_dragon(),
        aberrant_screecher(),
        doom_marauder(),
    ]
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores/dashes.
pub fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Find a monster by name; "Giant Ape", "giant_ape" and "giant-ape" all match.
pub fn find_monster<'a>(
    monsters: &'a [MonsterTemplate],
    name: &str,
) -> Option<&'a MonsterTemplate> {
    let wanted = normalize_lookup(name);
    monsters
        .iter()
        .find(|monster| normalize_lookup(monster.name()) == wanted)
}

pub fn resolve_monster(name: &str) -> Option<MonsterTemplate> {
    find_monster(&builtin_monsters(), name).cloned()
}
