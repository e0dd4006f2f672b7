//! Dice primitives shared by every resolver: die rolls, d20 attack rolls with and
//! without advantage, and damage rolls where a critical doubles rolled dice only.

use serde::Serialize;

use crate::combat::rng::DiceSource;

pub const D20: u32 = 20;

/// A classified d20 attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    /// Face used for the AC comparison (the higher face under advantage).
    pub value: u32,
    pub critical: bool,
    pub critical_miss: bool,
}

impl AttackRoll {
    pub fn from_face(face: u32) -> Self {
        Self {
            value: face,
            critical: face == D20,
            critical_miss: face == 1,
        }
    }

    /// `value + attack_mod`, the number compared against armor class.
    pub fn total(&self, attack_mod: i32) -> i32 {
        self.value as i32 + attack_mod
    }

    /// A critical miss never hits; a critical always does; otherwise meet or beat AC.
    pub fn hits(&self, attack_mod: i32, armor_class: i32) -> bool {
        if self.critical_miss {
            return false;
        }
        self.critical || self.total(attack_mod) >= armor_class
    }
}

/// Final classification of one attack after rerolls and techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    Critical,
    Hit,
    Miss,
}

impl AttackOutcome {
    pub fn classify(roll: AttackRoll, hit: bool) -> Self {
        match (hit, roll.critical) {
            (false, _) => Self::Miss,
            (true, true) => Self::Critical,
            (true, false) => Self::Hit,
        }
    }

    pub fn is_critical(self) -> bool {
        self == Self::Critical
    }

    pub fn is_miss(self) -> bool {
        self == Self::Miss
    }
}

#[inline]
pub fn roll_die<D: DiceSource + ?Sized>(dice: &mut D, sides: u32) -> u32 {
    dice.roll_die(sides)
}

/// Sum of `count` rolls of a `sides`-sided die.
pub fn roll_dice<D: DiceSource + ?Sized>(dice: &mut D, count: u32, sides: u32) -> u32 {
    (0..count).map(|_| dice.roll_die(sides)).sum()
}

pub fn attack_roll<D: DiceSource + ?Sized>(dice: &mut D) -> AttackRoll {
    AttackRoll::from_face(dice.roll_die(D20))
}

/// With advantage: critical if either face is 20, critical miss only if both are 1,
/// and the higher face is used for the AC comparison.
pub fn attack_roll_with_advantage<D: DiceSource + ?Sized>(
    dice: &mut D,
    advantage: bool,
) -> AttackRoll {
    if !advantage {
        return attack_roll(dice);
    }
    let first = dice.roll_die(D20);
    let second = dice.roll_die(D20);
    AttackRoll {
        value: first.max(second),
        critical: first == D20 || second == D20,
        critical_miss: first == 1 && second == 1,
    }
}

/// `count` dice (doubled on a critical) plus a flat modifier.
pub fn dice_damage<D: DiceSource + ?Sized>(
    dice: &mut D,
    count: u32,
    sides: u32,
    modifier: i32,
    critical: bool,
) -> i32 {
    let rolled = if critical { count * 2 } else { count };
    roll_dice(dice, rolled, sides) as i32 + modifier
}

/// One weapon die plus modifier; a critical rolls the die twice.
pub fn damage_roll<D: DiceSource + ?Sized>(
    dice: &mut D,
    die: u32,
    modifier: i32,
    critical: bool,
) -> i32 {
    dice_damage(dice, 1, die, modifier, critical)
}

/// Mean of a single roll of a `sides`-sided die.
pub fn average_roll(sides: u32) -> f64 {
    (f64::from(sides) + 1.0) / 2.0
}
