use std::collections::BTreeMap;

use crate::combat::dice::D20;
use crate::combat::rng::DiceSource;

/// Rolls a d20 for every actor, re-rolling only the members of tied groups until
/// all scores are distinct. Returns `(actor, score)` sorted by score, highest first.
pub fn initiative_scores<T, D>(actors: &[T], dice: &mut D) -> Vec<(T, u32)>
where
    T: Copy,
    D: DiceSource + ?Sized,
{
    let mut scores: Vec<u32> = actors.iter().map(|_| dice.roll_die(D20)).collect();

    loop {
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, &score) in scores.iter().enumerate() {
            groups.entry(score).or_default().push(index);
        }
        let tied: Vec<usize> = groups
            .into_values()
            .filter(|members| members.len() > 1)
            .flatten()
            .collect();
        if tied.is_empty() {
            break;
        }
        for index in tied {
            scores[index] = dice.roll_die(D20);
        }
    }

    let mut ranked: Vec<(T, u32)> = actors.iter().copied().zip(scores).collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1));
    ranked
}

pub fn initiative_order<T, D>(actors: &[T], dice: &mut D) -> Vec<T>
where
    T: Copy,
    D: DiceSource + ?Sized,
{
    initiative_scores(actors, dice)
        .into_iter()
        .map(|(actor, _)| actor)
        .collect()
}
