//! Data-described combat actions and the cast protocol.
//!
//! An [`Action`] bundles everything a spell or attack needs to resolve:
//! its cost, how success is decided, what damage it rolls, and which
//! status effect it leaves behind. [`Action::cast_with_rng`] is the one
//! resolution procedure shared by player spells and the monster's
//! weapon attack.

use crate::actor::{Actor, EffectKind};
use crate::dice::{d20_with_rng, DamageFormula, Die, CRITICAL_HIT, CRITICAL_MISS};
use crate::encounter::SoundTag;
use crate::stats::Ability;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which attack bonus a to-hit roll uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackSource {
    Weapon,
    Spell,
}

/// How an action decides success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionKind {
    /// d20 + attack bonus vs the target's AC.
    AttackRoll(AttackSource),
    /// Target rolls d20 + save bonus vs the caster's spell DC.
    SavingThrow,
    /// Always lands (self buffs, plain healing).
    Unconditional,
}

/// Who the action lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Enemy,
    SelfTarget,
}

/// A spell or attack, fully described by data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub mp_cost: i32,
    pub resolution: ResolutionKind,
    pub damage: Option<DamageFormula>,
    /// Status effect and duration applied to the target on success.
    pub effect: Option<(EffectKind, u32)>,
    /// Ability the caster attacks or forces saves with.
    pub cast_ability: Ability,
    /// Ability the target saves with.
    pub save_ability: Ability,
    pub target: Target,
    pub sound: Option<SoundTag>,
}

impl Action {
    /// A plain weapon attack with the given damage dice; used both for
    /// the player's melee option and for monster attacks.
    pub fn weapon_attack(name: impl Into<String>, damage: DamageFormula) -> Self {
        Self {
            name: name.into(),
            mp_cost: 0,
            resolution: ResolutionKind::AttackRoll(AttackSource::Weapon),
            damage: Some(damage),
            effect: None,
            cast_ability: Ability::Strength,
            save_ability: Ability::Strength,
            target: Target::Enemy,
            sound: None,
        }
    }

    pub fn is_healing(&self) -> bool {
        self.damage.as_ref().map(|f| f.healing).unwrap_or(false)
    }

    /// Resolve this action from `caster` against `enemy`.
    ///
    /// Self-targeted actions land on the caster; `enemy` is untouched.
    /// The sequence is fixed: decide success (attack roll or saving
    /// throw), then on success roll damage (doubled dice on a natural
    /// 20) and apply it, then apply the status effect. MP is *not*
    /// spent here; the encounter checks and spends it before resolving.
    pub fn cast_with_rng<R: Rng>(
        &self,
        caster: &mut Actor,
        enemy: &mut Actor,
        rng: &mut R,
    ) -> CastOutcome {
        let mut outcome = CastOutcome {
            action: self.name.clone(),
            success: matches!(self.resolution, ResolutionKind::Unconditional),
            attack: None,
            save: None,
            damage: None,
            effect_applied: None,
            riposte: false,
        };

        let mut critical = false;

        match self.resolution {
            ResolutionKind::AttackRoll(source) => {
                let bonus = match source {
                    AttackSource::Weapon => caster.weapon_attack_bonus(),
                    AttackSource::Spell => caster.spell_attack_bonus(),
                };
                let natural = d20_with_rng(rng);
                let total = natural + bonus;

                let check = enemy.does_hit(total, natural);
                if check.parry_riposte {
                    caster.apply_effect(EffectKind::Reeling, enemy.tables().reeling_duration);
                    outcome.riposte = true;
                }

                critical = natural == CRITICAL_HIT;
                outcome.success = check.hits;
                outcome.attack = Some(AttackRollResult {
                    natural,
                    bonus,
                    total,
                    critical_hit: natural == CRITICAL_HIT,
                    fumble: natural == CRITICAL_MISS,
                });
            }
            ResolutionKind::SavingThrow => {
                let bonus = enemy.save_bonus(self.save_ability);
                let natural = d20_with_rng(rng);
                let total = natural + bonus;

                // The target's save and the spell's success are distinct
                // booleans with opposite polarity: a save that succeeds
                // is exactly what prevents the effect.
                let saved = caster.does_save(total);
                outcome.success = !saved;
                outcome.save = Some(SaveRollResult {
                    natural,
                    bonus,
                    total,
                    dc: caster.spell_dc(),
                    saved,
                });
            }
            ResolutionKind::Unconditional => {}
        }

        if outcome.success {
            if let Some(formula) = &self.damage {
                let mut damage = formula.roll_with_rng(caster.scores(), rng);
                if critical {
                    damage += formula.critical_extra_with_rng(caster.scores(), rng);
                }
                match self.target {
                    Target::Enemy => enemy.apply_damage(damage),
                    Target::SelfTarget => caster.apply_damage(damage),
                };
                outcome.damage = Some(damage);
            }

            if let Some((kind, duration)) = self.effect {
                match self.target {
                    Target::Enemy => enemy.apply_effect(kind, duration),
                    Target::SelfTarget => caster.apply_effect(kind, duration),
                }
                outcome.effect_applied = Some((kind, duration));
            }
        }

        outcome
    }
}

/// The to-hit portion of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRollResult {
    pub natural: i32,
    pub bonus: i32,
    pub total: i32,
    pub critical_hit: bool,
    pub fumble: bool,
}

/// The saving-throw portion of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRollResult {
    pub natural: i32,
    pub bonus: i32,
    pub total: i32,
    pub dc: i32,
    /// Whether the target's save succeeded (which *prevents* the
    /// effect; see [`Actor::does_save`]).
    pub saved: bool,
}

/// Structured result of resolving one action. The presentation layer
/// narrates from this; the core never formats display text here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastOutcome {
    pub action: String,
    pub success: bool,
    pub attack: Option<AttackRollResult>,
    pub save: Option<SaveRollResult>,
    /// Damage dealt (negative = healing), if any was rolled.
    pub damage: Option<i32>,
    pub effect_applied: Option<(EffectKind, u32)>,
    /// The target's parry sent the caster reeling.
    pub riposte: bool,
}

lazy_static::lazy_static! {
    /// The built-in player action list.
    static ref ACTIONS: Vec<Action> = vec![
        Action::weapon_attack(
            "Attack",
            DamageFormula::new(vec![Die::D8], true, Ability::Strength, false),
        ),
        Action {
            name: "Eldritch Blast".to_string(),
            mp_cost: 1,
            resolution: ResolutionKind::AttackRoll(AttackSource::Spell),
            damage: Some(DamageFormula::new(
                vec![Die::D10],
                true,
                Ability::Charisma,
                false,
            )),
            effect: None,
            cast_ability: Ability::Charisma,
            save_ability: Ability::Strength,
            target: Target::Enemy,
            sound: Some(SoundTag::SpellCast),
        },
        Action {
            name: "Charm".to_string(),
            mp_cost: 2,
            resolution: ResolutionKind::SavingThrow,
            damage: None,
            effect: Some((EffectKind::Charm, 2)),
            cast_ability: Ability::Charisma,
            save_ability: Ability::Wisdom,
            target: Target::Enemy,
            sound: Some(SoundTag::SpellCast),
        },
        Action {
            name: "Parry".to_string(),
            mp_cost: 0,
            resolution: ResolutionKind::Unconditional,
            damage: None,
            effect: Some((EffectKind::Parry, 1)),
            cast_ability: Ability::Strength,
            save_ability: Ability::Strength,
            target: Target::SelfTarget,
            sound: None,
        },
    ];
}

/// Look up a built-in action by name (case-insensitive).
pub fn get_action(name: &str) -> Option<Action> {
    ACTIONS
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Names of all built-in actions.
pub fn action_names() -> Vec<&'static str> {
    ACTIONS.iter().map(|a| a.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;
    use crate::config::Tables;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn actor(name: &str, role: Role) -> Actor {
        let mut actor = Actor::new(name, role, Tables::default());
        actor.set_stat_array([10; 6]);
        actor.refresh_all();
        actor
    }

    #[test]
    fn test_get_action() {
        assert!(get_action("Eldritch Blast").is_some());
        assert!(get_action("eldritch blast").is_some());
        assert!(get_action("Fireball").is_none());
        assert_eq!(action_names().len(), 4);
    }

    #[test]
    fn test_unconditional_self_buff_lands_on_caster() {
        let mut caster = actor("Caster", Role::Player);
        let mut enemy = actor("Enemy", Role::Monster);
        let mut rng = StdRng::seed_from_u64(1);

        let parry = get_action("Parry").unwrap();
        let outcome = parry.cast_with_rng(&mut caster, &mut enemy, &mut rng);

        assert!(outcome.success);
        assert_eq!(outcome.effect_applied, Some((EffectKind::Parry, 1)));
        assert_eq!(caster.effect_timer(EffectKind::Parry), 1);
        assert_eq!(enemy.effect_timer(EffectKind::Parry), 0);
    }

    #[test]
    fn test_attack_roll_damages_only_on_hit() {
        let mut rng = StdRng::seed_from_u64(2);
        let attack = Action::weapon_attack(
            "Bite",
            DamageFormula::new(vec![Die::D6], true, Ability::Strength, false),
        );

        for _ in 0..50 {
            let mut caster = actor("Caster", Role::Monster);
            let mut enemy = actor("Enemy", Role::Player);
            let before = enemy.hp();
            let outcome = attack.cast_with_rng(&mut caster, &mut enemy, &mut rng);

            let roll = outcome.attack.expect("attack roll present");
            assert_eq!(roll.total, roll.natural + roll.bonus);
            if outcome.success {
                assert!(roll.critical_hit || roll.total >= enemy.armor_class());
                assert!(outcome.damage.is_some());
                assert!(enemy.hp() <= before);
            } else {
                assert!(outcome.damage.is_none());
                assert_eq!(enemy.hp(), before);
            }
            if roll.fumble {
                assert!(!outcome.success);
            }
        }
    }

    #[test]
    fn test_save_polarity() {
        let mut rng = StdRng::seed_from_u64(3);
        let charm = get_action("Charm").unwrap();

        for _ in 0..50 {
            let mut caster = actor("Caster", Role::Player);
            let mut enemy = actor("Enemy", Role::Monster);
            let outcome = charm.cast_with_rng(&mut caster, &mut enemy, &mut rng);

            let save = outcome.save.expect("save roll present");
            // effect success is exactly the failed save
            assert_eq!(outcome.success, !save.saved);
            assert_eq!(save.saved, save.total >= caster.spell_dc());
            if outcome.success {
                assert_eq!(enemy.effect_timer(EffectKind::Charm), 2);
            } else {
                assert_eq!(enemy.effect_timer(EffectKind::Charm), 0);
            }
        }
    }

    #[test]
    fn test_unconditional_healing_restores() {
        let mut caster = actor("Caster", Role::Player);
        let mut enemy = actor("Enemy", Role::Monster);
        let mut rng = StdRng::seed_from_u64(4);

        caster.apply_damage(3);
        let heal = Action {
            name: "Mend".to_string(),
            mp_cost: 0,
            resolution: ResolutionKind::Unconditional,
            damage: Some(DamageFormula::new(
                vec![Die::D4],
                false,
                Ability::Wisdom,
                true,
            )),
            effect: None,
            cast_ability: Ability::Wisdom,
            save_ability: Ability::Wisdom,
            target: Target::SelfTarget,
            sound: None,
        };

        let before = caster.hp();
        let outcome = heal.cast_with_rng(&mut caster, &mut enemy, &mut rng);
        let healed = outcome.damage.expect("healing rolled");
        assert!(healed < 0);
        assert!(caster.hp() > before);
        assert!(caster.hp() <= caster.max_hp());
    }

    #[test]
    fn test_riposte_inflicts_reeling() {
        let mut rng = StdRng::seed_from_u64(5);
        let attack = Action::weapon_attack(
            "Claw",
            DamageFormula::new(vec![Die::D4], true, Ability::Strength, false),
        );

        let mut saw_riposte = false;
        for _ in 0..300 {
            let mut caster = actor("Caster", Role::Monster);
            let mut enemy = actor("Enemy", Role::Player);
            enemy.apply_effect(EffectKind::Parry, 1);

            let outcome = attack.cast_with_rng(&mut caster, &mut enemy, &mut rng);
            if outcome.riposte {
                saw_riposte = true;
                assert!(!outcome.success);
                assert_eq!(
                    caster.effect_timer(EffectKind::Reeling),
                    Tables::default().reeling_duration
                );
            }
        }
        // AC 11 vs +2 bonus: naturals 9..=13 riposte, so 300 draws
        // without one would mean a broken protocol.
        assert!(saw_riposte);
    }
}
