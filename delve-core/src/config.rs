//! Rule tables and tunable constants.
//!
//! Everything the combat math looks up at runtime lives here: the
//! level-to-proficiency-bonus table, XP thresholds, XP rewards by
//! challenge level, and the per-level resource constants. Tables are
//! injected into [`Actor`](crate::actor::Actor)s and the overworld at
//! construction rather than read from static state, so variant rulesets
//! can be tested side by side.

use crate::dice::Die;
use crate::stats::N_ABILITIES;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Immutable rule tables driving all derived combat numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tables {
    /// Proficiency bonus at level `L` is `pb_by_level[L - 1]`.
    pub pb_by_level: [i32; 10],
    /// XP needed to advance *out of* level `L` is `xp_to_level[L - 1]`.
    pub xp_to_level: [i32; 10],
    /// XP awarded for defeating a monster of challenge level `C` is
    /// `xp_reward_by_challenge[C - 1]`.
    pub xp_reward_by_challenge: [i32; 10],
    /// HP gained per level, before the CON modifier.
    pub hp_per_level: i32,
    /// MP gained per level, before the INT modifier.
    pub mp_per_level: i32,
    /// AC granted by unremarkable armor.
    pub base_armor: i32,
    /// Spell save DC floor: `DC = dc_base + PB + casting modifier`.
    pub dc_base: i32,
    /// Every ability score starts here at creation.
    pub base_stat: i32,
    /// Ability scores never rise above this.
    pub max_stat: i32,
    /// Levels clamp to `1..=max_level`.
    pub max_level: u8,
    /// AC bonus while the Parry effect is active.
    pub parry_ac_bonus: i32,
    /// Rounds of Reeling inflicted by a successful parry.
    pub reeling_duration: u32,
    /// Fraction of max HP/MP restored after a victory.
    pub restore_percent: f32,
    /// Inclusive level range rolled for monsters after the first combat.
    pub monster_level_range: (u8, u8),
    /// Level of the very first monster (the tutorial fight is not
    /// re-rolled).
    pub first_monster_level: u8,
    /// Stat array given to freshly spawned monsters.
    pub base_monster_stats: [i32; N_ABILITIES],
    /// Damage dice for the stock monster weapon attack.
    pub monster_damage_dice: Vec<Die>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            pb_by_level: [2, 2, 2, 2, 3, 3, 3, 3, 4, 4],
            xp_to_level: [
                300, 600, 1800, 3800, 7500, 9000, 11000, 14000, 16000, 21000,
            ],
            xp_reward_by_challenge: [
                200, 450, 700, 1100, 1800, 2300, 2900, 3900, 5000, 5900,
            ],
            hp_per_level: 5,
            mp_per_level: 4,
            base_armor: 11,
            dc_base: 8,
            base_stat: 8,
            max_stat: 20,
            max_level: 10,
            parry_ac_bonus: 5,
            reeling_duration: 2,
            restore_percent: 0.1,
            monster_level_range: (2, 5),
            first_monster_level: 2,
            base_monster_stats: [16, 14, 15, 8, 12, 8],
            monster_damage_dice: vec![Die::D4, Die::D6],
        }
    }
}

impl Tables {
    /// Proficiency bonus for a level, clamped into the table.
    pub fn proficiency_bonus(&self, level: u8) -> i32 {
        let idx = (level.clamp(1, self.max_level) - 1) as usize;
        self.pb_by_level[idx]
    }

    /// XP required to advance out of the given level.
    pub fn xp_threshold(&self, level: u8) -> i32 {
        let idx = (level.clamp(1, self.max_level) - 1) as usize;
        self.xp_to_level[idx]
    }

    /// XP reward for defeating a monster of the given challenge level.
    pub fn xp_reward(&self, challenge: u8) -> i32 {
        let idx = (challenge.clamp(1, self.max_level) - 1) as usize;
        self.xp_reward_by_challenge[idx]
    }
}

/// Word lists for monster naming and entrance narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocab {
    pub articles: Vec<String>,
    pub names: Vec<String>,
    pub adjectives: Vec<String>,
    pub entrances: Vec<String>,
    pub punctuation: Vec<String>,
}

impl Default for Vocab {
    fn default() -> Self {
        fn list(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            articles: list(&["A", "The"]),
            names: list(&["Ghoul", "Skeleton", "Gnoll", "Bugbear", "Wight"]),
            adjectives: list(&["snarling", "rotting", "hulking", "ragged", "hungry"]),
            entrances: list(&[
                "lurches out of the dark",
                "blocks your path",
                "rises from the rubble",
                "crawls from the shadows",
            ]),
            punctuation: list(&["!", "...", "!!"]),
        }
    }
}

impl Vocab {
    /// Pick a monster display name at random.
    pub fn monster_name<R: Rng>(&self, rng: &mut R) -> String {
        pick(&self.names, rng).to_string()
    }

    /// Assemble an entrance line for a monster, e.g.
    /// "A snarling Ghoul lurches out of the dark!".
    pub fn entrance_line<R: Rng>(&self, monster_name: &str, rng: &mut R) -> String {
        format!(
            "{} {} {} {}{}",
            pick(&self.articles, rng),
            pick(&self.adjectives, rng),
            monster_name,
            pick(&self.entrances, rng),
            pick(&self.punctuation, rng),
        )
    }
}

fn pick<'a, R: Rng>(words: &'a [String], rng: &mut R) -> &'a str {
    if words.is_empty() {
        return "";
    }
    &words[rng.gen_range(0..words.len())]
}
