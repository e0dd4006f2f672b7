//! Party data: immutable stat blocks and role kits for the four ally roles, plus the
//! three party compositions the engine knows how to field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::dice::{average_roll, roll_dice};
use crate::combat::rng::DiceSource;

pub const MAX_SLOT_TIER: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Warrior,
    Healer,
    Rogue,
    Wizard,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Healer => "healer",
            Self::Rogue => "rogue",
            Self::Wizard => "wizard",
        }
    }

    /// Monster tie-break among equally wounded targets; lower goes first.
    pub const fn target_priority(self) -> u8 {
        match self {
            Self::Wizard => 0,
            Self::Healer => 1,
            Self::Rogue => 2,
            Self::Warrior => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_attacks_per_turn() -> u32 {
    1
}

/// Base stats shared by allies and monsters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub name: String,
    pub max_hp: i32,
    pub armor_class: i32,
    pub attack_mod: i32,
    pub damage_mod: i32,
    pub damage_die: u32,
    #[serde(default = "default_attacks_per_turn")]
    pub attacks_per_turn: u32,
}

impl CombatantTemplate {
    /// Mean damage of one non-critical weapon hit.
    pub fn expected_hit_damage(&self) -> f64 {
        average_roll(self.damage_die) + f64::from(self.damage_mod)
    }
}

/// Flat dice pool with a modifier, e.g. `1d10 + 5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealDice {
    pub count: u32,
    pub die: u32,
    pub modifier: i32,
}

impl HealDice {
    pub fn roll<D: DiceSource + ?Sized>(&self, dice: &mut D) -> i32 {
        roll_dice(dice, self.count, self.die) as i32 + self.modifier
    }
}

/// Spell whose dice pool grows by one die per tier above its minimum tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpellDice {
    pub min_tier: u8,
    pub base_dice: u32,
    pub die: u32,
    pub modifier: i32,
}

impl SpellDice {
    pub fn dice_at(&self, tier: u8) -> u32 {
        self.base_dice + u32::from(tier.saturating_sub(self.min_tier))
    }

    pub fn roll<D: DiceSource + ?Sized>(&self, tier: u8, dice: &mut D) -> i32 {
        roll_dice(dice, self.dice_at(tier), self.die) as i32 + self.modifier
    }
}

/// Spell slot counts by tier (index 0 is tier 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotTable {
    counts: [u32; MAX_SLOT_TIER],
}

impl SlotTable {
    pub const fn new(counts: [u32; MAX_SLOT_TIER]) -> Self {
        Self { counts }
    }

    pub const fn empty() -> Self {
        Self {
            counts: [0; MAX_SLOT_TIER],
        }
    }

    pub fn count(&self, tier: u8) -> u32 {
        Self::index(tier).map_or(0, |i| self.counts[i])
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn highest_available(&self) -> Option<u8> {
        self.highest_at_least(1)
    }

    /// Highest tier with a slot left, provided it is at least `min_tier`.
    pub fn highest_at_least(&self, min_tier: u8) -> Option<u8> {
        (min_tier.max(1)..=MAX_SLOT_TIER as u8)
            .rev()
            .find(|&tier| self.count(tier) > 0)
    }

    pub fn lowest_available(&self) -> Option<u8> {
        (1..=MAX_SLOT_TIER as u8).find(|&tier| self.count(tier) > 0)
    }

    /// Spends one slot of `tier`. Returns false (and changes nothing) when none is left.
    pub fn spend(&mut self, tier: u8) -> bool {
        match Self::index(tier) {
            Some(i) if self.counts[i] > 0 => {
                self.counts[i] -= 1;
                true
            }
            _ => false,
        }
    }

    fn index(tier: u8) -> Option<usize> {
        let tier = usize::from(tier);
        (1..=MAX_SLOT_TIER).contains(&tier).then(|| tier - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarriorKit {
    pub second_wind: Option<HealDice>,
    /// Second wind fires below this fraction of max HP.
    pub second_wind_threshold: f64,
    pub technique_dice: u32,
    pub technique_die: u32,
    pub action_surges: u32,
    /// Hit penalty and damage bonus of the power attack taken with advantage.
    pub power_attack_penalty: i32,
    pub power_attack_bonus: i32,
    /// Surge when the monster has at most this multiple of one swing's expected damage left.
    pub surge_finish_margin: f64,
}

impl WarriorKit {
    /// Kit with every consumable removed: plain attacks only.
    pub fn bare() -> Self {
        Self {
            second_wind: None,
            second_wind_threshold: 0.5,
            technique_dice: 0,
            technique_die: 8,
            action_surges: 0,
            power_attack_penalty: 5,
            power_attack_bonus: 10,
            surge_finish_margin: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealerKit {
    pub slots: SlotTable,
    /// Heals the two most wounded allies; needs a tier 3+ slot.
    pub pair_heal: SpellDice,
    pub single_heal: SpellDice,
    pub quick_heal: SpellDice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RogueKit {
    pub sneak_dice: u32,
    pub sneak_die: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissileSpell {
    pub min_tier: u8,
    pub base_darts: u32,
    pub dart_die: u32,
    pub dart_mod: i32,
}

impl MissileSpell {
    pub fn darts_at(&self, tier: u8) -> u32 {
        self.base_darts + u32::from(tier.saturating_sub(self.min_tier))
    }

    pub fn expected_damage(&self, tier: u8) -> f64 {
        f64::from(self.darts_at(tier)) * (average_roll(self.dart_die) + f64::from(self.dart_mod))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardKit {
    pub slots: SlotTable,
    pub missile: MissileSpell,
    pub orb: SpellDice,
    pub cantrip_dice: u32,
    pub cantrip_die: u32,
}

/// Role-specific abilities; the variant decides which resolver runs the turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleKit {
    Warrior(WarriorKit),
    Healer(HealerKit),
    Rogue(RogueKit),
    Wizard(WizardKit),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllyTemplate {
    pub stats: CombatantTemplate,
    pub kit: RoleKit,
}

impl AllyTemplate {
    pub fn role(&self) -> Role {
        match self.kit {
            RoleKit::Warrior(_) => Role::Warrior,
            RoleKit::Healer(_) => Role::Healer,
            RoleKit::Rogue(_) => Role::Rogue,
            RoleKit::Wizard(_) => Role::Wizard,
        }
    }
}

/// The level 5 sword-and-board Warrior used in the solo and duo scenarios.
pub fn warrior(weapon_die: u32) -> AllyTemplate {
    AllyTemplate {
        stats: CombatantTemplate {
            name: "Warrior".to_string(),
            max_hp: 71,
            armor_class: 16,
            attack_mod: 3,
            damage_mod: 3,
            damage_die: weapon_die,
            attacks_per_turn: 1,
        },
        kit: RoleKit::Warrior(WarriorKit {
            second_wind: Some(HealDice {
                count: 1,
                die: 10,
                modifier: 5,
            }),
            technique_dice: 4,
            technique_die: 8,
            action_surges: 1,
            ..WarriorKit::bare()
        }),
    }
}

/// The level 10 Warrior that fronts the full party.
pub fn veteran_warrior(weapon_die: u32) -> AllyTemplate {
    AllyTemplate {
        stats: CombatantTemplate {
            name: "Fighter".to_string(),
            max_hp: 100,
            armor_class: 18,
            attack_mod: 5,
            damage_mod: 4,
            damage_die: weapon_die,
            attacks_per_turn: 2,
        },
        kit: RoleKit::Warrior(WarriorKit {
            second_wind: Some(HealDice {
                count: 1,
                die: 10,
                modifier: 10,
            }),
            technique_dice: 5,
            technique_die: 10,
            action_surges: 1,
            ..WarriorKit::bare()
        }),
    }
}

pub fn healer() -> AllyTemplate {
    AllyTemplate {
        stats: CombatantTemplate {
            name: "Healer".to_string(),
            max_hp: 63,
            armor_class: 12,
            attack_mod: 2,
            damage_mod: 2,
            damage_die: 6,
            attacks_per_turn: 1,
        },
        kit: RoleKit::Healer(HealerKit {
            slots: SlotTable::new([4, 3, 3, 3, 2]),
            pair_heal: SpellDice {
                min_tier: 3,
                base_dice: 1,
                die: 8,
                modifier: 5,
            },
            single_heal: SpellDice {
                min_tier: 1,
                base_dice: 2,
                die: 8,
                modifier: 5,
            },
            quick_heal: SpellDice {
                min_tier: 1,
                base_dice: 1,
                die: 4,
                modifier: 5,
            },
        }),
    }
}

pub fn rogue() -> AllyTemplate {
    AllyTemplate {
        stats: CombatantTemplate {
            name: "Rogue".to_string(),
            max_hp: 80,
            armor_class: 16,
            attack_mod: 6,
            damage_mod: 3,
            damage_die: 8,
            attacks_per_turn: 1,
        },
        kit: RoleKit::Rogue(RogueKit {
            sneak_dice: 5,
            sneak_die: 6,
        }),
    }
}

pub fn wizard() -> AllyTemplate {
    AllyTemplate {
        stats: CombatantTemplate {
            name: "Wizard".to_string(),
            max_hp: 60,
            armor_class: 12,
            attack_mod: 4,
            damage_mod: 5,
            damage_die: 6,
            attacks_per_turn: 1,
        },
        kit: RoleKit::Wizard(WizardKit {
            slots: SlotTable::new([4, 3, 3, 3, 2]),
            missile: MissileSpell {
                min_tier: 1,
                base_darts: 3,
                dart_die: 4,
                dart_mod: 1,
            },
            orb: SpellDice {
                min_tier: 1,
                base_dice: 3,
                die: 8,
                modifier: 0,
            },
            cantrip_dice: 2,
            cantrip_die: 10,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyComposition {
    /// Warrior alone.
    Solo,
    /// Warrior and Healer.
    Duo,
    /// Warrior, Healer, Rogue and Wizard.
    FullParty,
}

impl PartyComposition {
    pub const ALL: [Self; 3] = [Self::Solo, Self::Duo, Self::FullParty];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Duo => "duo",
            Self::FullParty => "full_party",
        }
    }

    pub fn members(self, weapon_die: u32) -> Vec<AllyTemplate> {
        match self {
            Self::Solo => vec![warrior(weapon_die)],
            Self::Duo => vec![warrior(weapon_die), healer()],
            Self::FullParty => vec![veteran_warrior(weapon_die), healer(), rogue(), wizard()],
        }
    }
}

impl fmt::Display for PartyComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyComposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "solo" | "1v1" => Ok(Self::Solo),
            "duo" | "healer" => Ok(Self::Duo),
            "full_party" | "full" | "party" => Ok(Self::FullParty),
            other => Err(other.to_string()),
        }
    }
}
