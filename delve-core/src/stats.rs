//! Ability scores, modifiers, and proficiencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of ability scores every combatant carries.
pub const N_ABILITIES: usize = 6;

/// Error type for ability-score mutation.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("expected {expected} ability scores, got {got}")]
    BadArrayLength { expected: usize, got: usize },
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; N_ABILITIES] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// The six-score array plus per-ability proficiency flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityBlock {
    scores: [i32; N_ABILITIES],
    save_proficient: [bool; N_ABILITIES],
    check_proficient: [bool; N_ABILITIES],
}

impl AbilityBlock {
    /// All six scores start at `baseline`, with no proficiencies.
    pub fn new(baseline: i32) -> Self {
        Self {
            scores: [baseline; N_ABILITIES],
            save_proficient: [false; N_ABILITIES],
            check_proficient: [false; N_ABILITIES],
        }
    }

    pub fn score(&self, ability: Ability) -> i32 {
        self.scores[ability.index()]
    }

    /// Modifier for an ability: `(score - 10) / 2`.
    ///
    /// Integer division truncates toward zero, matching the reference
    /// ruleset: scores 7 through 9 are all -1, not -2. This is a
    /// deliberate departure from the usual floor-division reading.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.scores[ability.index()] - 10) / 2
    }

    pub fn set_score(&mut self, ability: Ability, value: i32) {
        self.scores[ability.index()] = value;
    }

    /// Bulk-replace all six scores. Rejects the input without mutating
    /// anything unless it holds exactly six values.
    pub fn set_all(&mut self, scores: &[i32]) -> Result<(), StatsError> {
        if scores.len() != N_ABILITIES {
            return Err(StatsError::BadArrayLength {
                expected: N_ABILITIES,
                got: scores.len(),
            });
        }
        self.scores.copy_from_slice(scores);
        Ok(())
    }

    pub fn is_save_proficient(&self, ability: Ability) -> bool {
        self.save_proficient[ability.index()]
    }

    pub fn is_check_proficient(&self, ability: Ability) -> bool {
        self.check_proficient[ability.index()]
    }

    pub fn set_save_proficient(&mut self, ability: Ability, proficient: bool) {
        self.save_proficient[ability.index()] = proficient;
    }

    pub fn set_check_proficient(&mut self, ability: Ability, proficient: bool) {
        self.check_proficient[ability.index()] = proficient;
    }

    /// Bonus to an ability check: modifier, plus `pb` when proficient.
    pub fn check_bonus(&self, ability: Ability, pb: i32) -> i32 {
        if self.check_proficient[ability.index()] {
            self.modifier(ability) + pb
        } else {
            self.modifier(ability)
        }
    }

    /// Bonus to a saving throw: modifier, plus `pb` when proficient.
    pub fn save_bonus(&self, ability: Ability, pb: i32) -> i32 {
        if self.save_proficient[ability.index()] {
            self.modifier(ability) + pb
        } else {
            self.modifier(ability)
        }
    }
}

impl Default for AbilityBlock {
    fn default() -> Self {
        Self::new(8)
    }
}
