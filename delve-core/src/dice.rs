//! Dice and damage formulas.
//!
//! Damage dice are drawn from the standard polyhedral set (d4 through
//! d12); the d20 is reserved for the attack/save protocol and rolled
//! through [`d20_with_rng`]. Every rolling function takes an `R: Rng`
//! so a seeded generator can stand in for the table dice under test.

use crate::stats::{Ability, AbilityBlock};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A natural 20 on the d20 always hits.
pub const CRITICAL_HIT: i32 = 20;
/// A natural 1 on the d20 always misses.
pub const CRITICAL_MISS: i32 = 1;

/// Damage die sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl Die {
    pub fn sides(&self) -> i32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
        }
    }

    pub fn from_sides(sides: i32) -> Option<Die> {
        match sides {
            4 => Some(Die::D4),
            6 => Some(Die::D6),
            8 => Some(Die::D8),
            10 => Some(Die::D10),
            12 => Some(Die::D12),
            _ => None,
        }
    }

    /// Roll this die once.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> i32 {
        rng.gen_range(1..=self.sides())
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Roll the d20 and return the natural result.
pub fn d20_with_rng<R: Rng>(rng: &mut R) -> i32 {
    rng.gen_range(1..=20)
}

/// An immutable multiset of damage dice plus the modifier rule.
///
/// Rolling sums one uniform draw per die, conditionally adds the
/// owner's ability modifier, and negates the total for healing
/// formulas (healing is negative damage throughout the engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageFormula {
    pub dice: Vec<Die>,
    pub add_modifier: bool,
    pub ability: Ability,
    pub healing: bool,
}

impl DamageFormula {
    pub fn new(dice: Vec<Die>, add_modifier: bool, ability: Ability, healing: bool) -> Self {
        Self {
            dice,
            add_modifier,
            ability,
            healing,
        }
    }

    /// Roll the formula using `scores` for the ability modifier.
    pub fn roll_with_rng<R: Rng>(&self, scores: &AbilityBlock, rng: &mut R) -> i32 {
        let mut total: i32 = self.dice.iter().map(|d| d.roll_with_rng(rng)).sum();
        if self.add_modifier {
            total += scores.modifier(self.ability);
        }
        if self.healing {
            -total
        } else {
            total
        }
    }

    /// Extra damage for a critical hit: the formula rolled a second
    /// time with the ability-modifier contribution removed, so dice are
    /// doubled but the modifier counts exactly once. Callers compose
    /// criticals as `roll + critical_extra`, never by doubling a total.
    pub fn critical_extra_with_rng<R: Rng>(&self, scores: &AbilityBlock, rng: &mut R) -> i32 {
        let roll = self.roll_with_rng(scores, rng);
        if self.add_modifier {
            roll - scores.modifier(self.ability)
        } else {
            roll
        }
    }
}

impl fmt::Display for DamageFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice = self
            .dice
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("+");
        if self.add_modifier {
            write!(f, "{}+{}", dice, self.ability.abbreviation())
        } else {
            write!(f, "{dice}")
        }
    }
}
