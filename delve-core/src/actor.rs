//! Combatant state: progression, resources, and status-effect timers.
//!
//! A single [`Actor`] type covers both the player character and
//! monsters; [`Role`] only selects which turn policy drives it. All
//! combat numbers (AC, spell DC, attack bonuses, HP/MP pools) are
//! derived from level and ability scores by [`Actor::update_resources`]
//! and recomputed after every level or stat change.

use crate::config::Tables;
use crate::dice::{CRITICAL_HIT, CRITICAL_MISS};
use crate::stats::{Ability, AbilityBlock, StatsError, N_ABILITIES};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which turn policy an actor follows. Never affects the combat math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Monster,
}

/// Number of distinct status effects.
pub const N_EFFECTS: usize = 3;

/// Status conditions tracked by a per-actor round timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Cannot act; broken down to one remaining round by taking damage.
    Charm,
    /// +5 effective AC; an attack that misses because of the bonus
    /// leaves the attacker Reeling.
    Parry,
    /// Cannot act; usually inflicted by a parry riposte.
    Reeling,
}

impl EffectKind {
    pub const ALL: [EffectKind; N_EFFECTS] = [EffectKind::Charm, EffectKind::Parry, EffectKind::Reeling];

    pub fn display_name(&self) -> &'static str {
        match self {
            EffectKind::Charm => "Charmed",
            EffectKind::Parry => "Parrying",
            EffectKind::Reeling => "Reeling",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Result of checking an attack total against an actor's defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCheck {
    pub hits: bool,
    /// True when the miss was created by the Parry AC bonus alone; the
    /// caller owes the attacker a Reeling timer.
    pub parry_riposte: bool,
}

/// A combatant: ability scores, progression, resource pools, derived
/// combat numbers, and status-effect timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    name: String,
    role: Role,
    scores: AbilityBlock,
    level: u8,
    xp: i32,
    armor_base: i32,
    spell_ability: Ability,
    weapon_ability: Ability,
    max_hp: i32,
    hp: i32,
    max_mp: i32,
    mp: i32,
    pb: i32,
    ac: i32,
    spell_dc: i32,
    weapon_attack: i32,
    spell_attack: i32,
    timers: [u32; N_EFFECTS],
    tables: Tables,
}

impl Actor {
    /// Create a level-1 actor with baseline scores and full resources.
    pub fn new(name: impl Into<String>, role: Role, tables: Tables) -> Self {
        let mut actor = Self {
            id: ActorId::new(),
            name: name.into(),
            role,
            scores: AbilityBlock::new(tables.base_stat),
            level: 1,
            xp: 0,
            armor_base: tables.base_armor,
            spell_ability: Ability::Charisma,
            weapon_ability: Ability::Strength,
            max_hp: 0,
            hp: 0,
            max_mp: 0,
            mp: 0,
            pb: 0,
            ac: 0,
            spell_dc: 0,
            weapon_attack: 0,
            spell_attack: 0,
            timers: [0; N_EFFECTS],
            tables,
        };
        actor.update_resources();
        actor
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn scores(&self) -> &AbilityBlock {
        &self.scores
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn xp(&self) -> i32 {
        self.xp
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn max_mp(&self) -> i32 {
        self.max_mp
    }

    pub fn proficiency_bonus(&self) -> i32 {
        self.pb
    }

    /// AC before any Parry adjustment.
    pub fn armor_class(&self) -> i32 {
        self.ac
    }

    pub fn spell_dc(&self) -> i32 {
        self.spell_dc
    }

    pub fn weapon_attack_bonus(&self) -> i32 {
        self.weapon_attack
    }

    pub fn spell_attack_bonus(&self) -> i32 {
        self.spell_attack
    }

    pub fn effect_timer(&self, kind: EffectKind) -> u32 {
        self.timers[kind.index()]
    }

    /// Alive is purely `hp > 0`; there is no separate dead state, so
    /// every consumer re-checks this before allowing an action.
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// The first effect currently preventing this actor from acting.
    pub fn incapacitated_by(&self) -> Option<EffectKind> {
        if self.effect_timer(EffectKind::Charm) > 0 {
            Some(EffectKind::Charm)
        } else if self.effect_timer(EffectKind::Reeling) > 0 {
            Some(EffectKind::Reeling)
        } else {
            None
        }
    }

    pub fn can_act(&self) -> bool {
        self.incapacitated_by().is_none()
    }

    // ========================================================================
    // Stat mutation
    // ========================================================================

    /// Set one ability score (clamped into `[1, max_stat]`) and
    /// recompute everything derived from it.
    pub fn set_score(&mut self, ability: Ability, value: i32) {
        let value = value.clamp(1, self.tables.max_stat);
        self.scores.set_score(ability, value);
        self.update_resources();
    }

    /// Bulk-replace all six scores from a slice; fails without mutating
    /// unless exactly six values are supplied.
    pub fn set_all_scores(&mut self, scores: &[i32]) -> Result<(), StatsError> {
        self.scores.set_all(scores)?;
        self.update_resources();
        Ok(())
    }

    /// Bulk-replace from a fixed-size array (infallible by type).
    pub fn set_stat_array(&mut self, scores: [i32; N_ABILITIES]) {
        self.scores
            .set_all(&scores)
            .expect("array length is fixed at six");
        self.update_resources();
    }

    pub fn set_save_proficient(&mut self, ability: Ability, proficient: bool) {
        self.scores.set_save_proficient(ability, proficient);
    }

    pub fn set_check_proficient(&mut self, ability: Ability, proficient: bool) {
        self.scores.set_check_proficient(ability, proficient);
    }

    pub fn set_weapon_ability(&mut self, ability: Ability) {
        self.weapon_ability = ability;
        self.update_resources();
    }

    pub fn set_spell_ability(&mut self, ability: Ability) {
        self.spell_ability = ability;
        self.update_resources();
    }

    pub fn check_bonus(&self, ability: Ability) -> i32 {
        self.scores.check_bonus(ability, self.pb)
    }

    pub fn save_bonus(&self, ability: Ability) -> i32 {
        self.scores.save_bonus(ability, self.pb)
    }

    // ========================================================================
    // Derived resources
    // ========================================================================

    /// Recompute every derived number from level and ability scores.
    ///
    /// Current HP/MP are preserved as missing amounts: the pools are
    /// re-derived, then current = new max - previously missing, clamped
    /// into `[0, max]`. Calling this twice with no stat change is a
    /// no-op.
    pub fn update_resources(&mut self) {
        let missing_hp = self.max_hp - self.hp;
        let missing_mp = self.max_mp - self.mp;

        let level = self.level as i32;
        self.max_hp =
            (level * (self.tables.hp_per_level + self.scores.modifier(Ability::Constitution))).max(0);
        self.max_mp =
            (level * (self.tables.mp_per_level + self.scores.modifier(Ability::Intelligence))).max(0);

        self.hp = (self.max_hp - missing_hp).clamp(0, self.max_hp);
        self.mp = (self.max_mp - missing_mp).clamp(0, self.max_mp);

        self.pb = self.tables.proficiency_bonus(self.level);
        self.ac = self.armor_base + self.scores.modifier(Ability::Dexterity);
        self.spell_dc = self.tables.dc_base + self.pb + self.scores.modifier(self.spell_ability);
        self.spell_attack = self.pb + self.scores.modifier(self.spell_ability);
        self.weapon_attack = self.pb + self.scores.modifier(self.weapon_ability);
    }

    /// Recompute and restore both pools to full. Used when a fresh
    /// monster enters an encounter.
    pub fn refresh_all(&mut self) {
        self.update_resources();
        self.hp = self.max_hp;
        self.mp = self.max_mp;
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// Advance one level (clamped at the table maximum), reset XP
    /// progress, and recompute resources.
    pub fn level_up(&mut self) {
        self.level = (self.level + 1).min(self.tables.max_level);
        self.xp = 0;
        self.update_resources();
    }

    /// Jump to a specific level (clamped into `[1, max_level]`), reset
    /// XP progress, and recompute resources.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.clamp(1, self.tables.max_level);
        self.xp = 0;
        self.update_resources();
    }

    /// Accrue XP, consuming as many level thresholds as the total
    /// covers and carrying the remainder forward. Returns true if at
    /// least one level was gained. At the level cap, XP accrues without
    /// consuming further thresholds.
    pub fn add_xp(&mut self, amount: i32) -> bool {
        self.xp += amount.max(0);

        let mut leveled = false;
        while self.level < self.tables.max_level && self.xp >= self.tables.xp_threshold(self.level) {
            self.xp -= self.tables.xp_threshold(self.level);
            self.level += 1;
            leveled = true;
        }
        if leveled {
            self.update_resources();
        }
        leveled
    }

    // ========================================================================
    // Damage, resources, effects
    // ========================================================================

    /// Apply damage (negative amounts heal) and return remaining HP.
    ///
    /// HP clamps into `[0, max_hp]`. Taking real damage shakes a
    /// prolonged Charm loose: a Charm timer above 1 is capped to 1, so
    /// the condition ends after the current round.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.hp = (self.hp - amount).clamp(0, self.max_hp);

        if amount > 0 && self.timers[EffectKind::Charm.index()] > 1 {
            self.timers[EffectKind::Charm.index()] = 1;
        }

        self.hp
    }

    /// Spend MP (negative amounts restore), clamped into `[0, max_mp]`.
    pub fn spend_mp(&mut self, amount: i32) {
        self.mp = (self.mp - amount).clamp(0, self.max_mp);
    }

    /// Apply a status effect. An effect already running keeps its timer
    /// if longer; applying never shortens a condition.
    pub fn apply_effect(&mut self, kind: EffectKind, duration: u32) {
        let timer = &mut self.timers[kind.index()];
        *timer = (*timer).max(duration);
    }

    /// End-of-turn bookkeeping: every positive timer loses one round.
    pub fn end_turn(&mut self) {
        for timer in &mut self.timers {
            *timer = timer.saturating_sub(1);
        }
    }

    // ========================================================================
    // d20 protocol
    // ========================================================================

    /// Check an attack roll against this actor's defense.
    ///
    /// A natural 20 always hits and a natural 1 always misses,
    /// overriding the numeric comparison. While Parry is active the
    /// effective AC gains `parry_ac_bonus`; a miss that the unmodified
    /// AC would have let through is flagged as a riposte so the caller
    /// can inflict Reeling on the attacker.
    pub fn does_hit(&self, attack_total: i32, natural: i32) -> HitCheck {
        if natural >= CRITICAL_HIT {
            return HitCheck {
                hits: true,
                parry_riposte: false,
            };
        }
        if natural <= CRITICAL_MISS {
            // A fumble is the attacker's own doing, not the parry's.
            return HitCheck {
                hits: false,
                parry_riposte: false,
            };
        }

        if self.effect_timer(EffectKind::Parry) > 0 {
            let parried_ac = self.ac + self.tables.parry_ac_bonus;
            let hits = attack_total >= parried_ac;
            return HitCheck {
                hits,
                parry_riposte: !hits && attack_total >= self.ac,
            };
        }

        HitCheck {
            hits: attack_total >= self.ac,
            parry_riposte: false,
        }
    }

    /// Check a saving-throw total against this caster's spell DC.
    ///
    /// Returns whether the *save succeeded*. Callers resolving a spell
    /// must invert this for the effect outcome (a successful save
    /// prevents the effect) and keep the two booleans distinct.
    pub fn does_save(&self, save_total: i32) -> bool {
        save_total >= self.spell_dc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Actor {
        Actor::new("Tester", Role::Player, Tables::default())
    }

    /// Level 1, all scores 10 (every modifier 0): max HP 5, max MP 4.
    fn baseline_player() -> Actor {
        let mut actor = player();
        actor.set_stat_array([10; 6]);
        actor.refresh_all();
        actor
    }

    #[test]
    fn test_new_actor_is_full() {
        let actor = player();
        assert_eq!(actor.level(), 1);
        assert_eq!(actor.xp(), 0);
        assert_eq!(actor.hp(), actor.max_hp());
        assert_eq!(actor.mp(), actor.max_mp());
        assert!(actor.is_alive());
        assert!(actor.can_act());
    }

    #[test]
    fn test_derived_numbers() {
        let mut actor = baseline_player();
        // STR 16 (+3), DEX 14 (+2), CHA 16 (+3), level 1 (PB 2)
        actor.set_score(Ability::Strength, 16);
        actor.set_score(Ability::Dexterity, 14);
        actor.set_score(Ability::Charisma, 16);

        assert_eq!(actor.armor_class(), 11 + 2);
        assert_eq!(actor.spell_dc(), 8 + 2 + 3);
        assert_eq!(actor.spell_attack_bonus(), 2 + 3);
        assert_eq!(actor.weapon_attack_bonus(), 2 + 3);
    }

    #[test]
    fn test_update_resources_is_idempotent() {
        let mut actor = baseline_player();
        actor.apply_damage(2);
        actor.update_resources();
        let snapshot = (actor.max_hp(), actor.hp(), actor.max_mp(), actor.mp());
        actor.update_resources();
        assert_eq!(
            (actor.max_hp(), actor.hp(), actor.max_mp(), actor.mp()),
            snapshot
        );
    }

    #[test]
    fn test_leveling_preserves_missing_hp() {
        let mut actor = baseline_player();
        actor.apply_damage(3);
        assert_eq!(actor.hp(), actor.max_hp() - 3);

        actor.level_up();
        // level 2, CON mod 0: max HP 10, still missing exactly 3
        assert_eq!(actor.max_hp(), 10);
        assert_eq!(actor.hp(), 7);
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut actor = baseline_player();
        assert_eq!(actor.max_hp(), 5);

        assert_eq!(actor.apply_damage(7), 0);
        assert!(!actor.is_alive());

        assert_eq!(actor.apply_damage(-10), 5);
        assert!(actor.is_alive());
    }

    #[test]
    fn test_spend_mp_clamps() {
        let mut actor = baseline_player();
        assert_eq!(actor.max_mp(), 4);
        actor.spend_mp(10);
        assert_eq!(actor.mp(), 0);
        actor.spend_mp(-99);
        assert_eq!(actor.mp(), 4);
    }

    #[test]
    fn test_damage_breaks_prolonged_charm() {
        let mut actor = baseline_player();
        actor.apply_effect(EffectKind::Charm, 3);

        // healing leaves the charm alone
        actor.apply_damage(-1);
        assert_eq!(actor.effect_timer(EffectKind::Charm), 3);

        actor.apply_damage(1);
        assert_eq!(actor.effect_timer(EffectKind::Charm), 1);
    }

    #[test]
    fn test_apply_effect_never_shortens() {
        let mut actor = player();
        actor.apply_effect(EffectKind::Parry, 2);
        actor.apply_effect(EffectKind::Parry, 1);
        assert_eq!(actor.effect_timer(EffectKind::Parry), 2);
    }

    #[test]
    fn test_end_turn_floors_at_zero() {
        let mut actor = player();
        actor.apply_effect(EffectKind::Reeling, 1);
        actor.end_turn();
        assert_eq!(actor.effect_timer(EffectKind::Reeling), 0);
        actor.end_turn();
        assert_eq!(actor.effect_timer(EffectKind::Reeling), 0);
    }

    #[test]
    fn test_incapacity_gates_action() {
        let mut actor = player();
        assert!(actor.can_act());
        actor.apply_effect(EffectKind::Charm, 2);
        assert_eq!(actor.incapacitated_by(), Some(EffectKind::Charm));
        assert!(!actor.can_act());
        // Parry never prevents acting
        let mut other = player();
        other.apply_effect(EffectKind::Parry, 1);
        assert!(other.can_act());
    }

    #[test]
    fn test_add_xp_multi_level_carries_remainder() {
        let mut actor = player();
        // 950 at level 1: 300 to level 2 (650 left), 600 to level 3 (50 left)
        assert!(actor.add_xp(950));
        assert_eq!(actor.level(), 3);
        assert_eq!(actor.xp(), 50);
    }

    #[test]
    fn test_add_xp_below_threshold() {
        let mut actor = player();
        assert!(!actor.add_xp(299));
        assert_eq!(actor.level(), 1);
        assert_eq!(actor.xp(), 299);
    }

    #[test]
    fn test_level_clamps_at_max() {
        let mut actor = player();
        actor.set_level(99);
        assert_eq!(actor.level(), 10);
        actor.level_up();
        assert_eq!(actor.level(), 10);

        // XP at the cap accrues without looping through thresholds
        actor.add_xp(50000);
        assert_eq!(actor.level(), 10);
        assert_eq!(actor.xp(), 50000);
    }

    #[test]
    fn test_natural_20_always_hits_and_1_always_misses() {
        let actor = baseline_player(); // AC 11
        assert!(actor.does_hit(2, 20).hits);
        let fumble = actor.does_hit(30, 1);
        assert!(!fumble.hits);
        assert!(!fumble.parry_riposte);
    }

    #[test]
    fn test_parry_raises_ac_and_ripostes() {
        let mut actor = baseline_player(); // AC 11
        actor.apply_effect(EffectKind::Parry, 1);

        // would have hit AC 11 but not 16: miss, riposte
        let parried = actor.does_hit(13, 10);
        assert!(!parried.hits);
        assert!(parried.parry_riposte);

        // beats even the parried AC
        assert!(actor.does_hit(16, 10).hits);

        // would have missed regardless: no riposte credit
        let wide = actor.does_hit(9, 5);
        assert!(!wide.hits);
        assert!(!wide.parry_riposte);
    }

    #[test]
    fn test_does_save_vs_dc() {
        let mut caster = baseline_player();
        caster.set_score(Ability::Charisma, 16); // DC 8 + 2 + 3 = 13
        assert!(caster.does_save(13));
        assert!(!caster.does_save(12));
    }

    #[test]
    fn test_set_all_scores_failure_leaves_derived_untouched() {
        let mut actor = baseline_player();
        let ac = actor.armor_class();
        assert!(actor.set_all_scores(&[18, 18]).is_err());
        assert_eq!(actor.armor_class(), ac);
        assert_eq!(actor.scores().score(Ability::Strength), 10);
    }
}
