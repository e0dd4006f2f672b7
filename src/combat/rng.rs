//! Fast PRNG for combat simulation. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.

use std::collections::VecDeque;

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Source of every random decision made during an encounter.
///
/// Resolvers never touch a generator directly; they ask for die faces and
/// probability checks through this trait so tests can script exact outcomes.
pub trait DiceSource {
    /// Uniform face in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Returns true with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform float in `[0, 1)` built from the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

impl DiceSource for Rng {
    #[inline]
    fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        // Multiply-shift range reduction; bias is below 2^-32 for any die size in use.
        let scaled = (u128::from(self.next_u64()) * u128::from(sides)) >> 64;
        scaled as u32 + 1
    }

    #[inline]
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }
}

/// Replays a fixed sequence of die faces and save outcomes.
///
/// Panics when a roll is requested past the end of the script or when a scripted face
/// does not fit the die being rolled, so a test fails loudly if the engine consumes
/// more (or different) randomness than expected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    checks: VecDeque<bool>,
}

impl ScriptedDice {
    pub fn new<I>(faces: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            faces: faces.into_iter().collect(),
            checks: VecDeque::new(),
        }
    }

    pub fn with_checks<I>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.checks = checks.into_iter().collect();
        self
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = self
            .faces
            .pop_front()
            .unwrap_or_else(|| panic!("scripted dice exhausted while rolling d{sides}"));
        assert!(
            (1..=sides).contains(&face),
            "scripted face {face} does not fit a d{sides}"
        );
        face
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.checks
            .pop_front()
            .unwrap_or_else(|| panic!("scripted checks exhausted"))
    }
}
