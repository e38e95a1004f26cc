//! Character progression through the public API.

use delve_core::{Ability, Actor, EffectKind, Role, Tables};

fn hero() -> Actor {
    let mut player = Actor::new("Hero", Role::Player, Tables::default());
    player.set_stat_array([16, 14, 14, 10, 10, 16]);
    player.refresh_all();
    player
}

#[test]
fn derived_numbers_track_the_tables() {
    let player = hero();
    // STR 16 (+3), DEX 14 (+2), CON 14 (+2), CHA 16 (+3), level 1 (PB 2)
    assert_eq!(player.max_hp(), 7);
    assert_eq!(player.max_mp(), 4);
    assert_eq!(player.armor_class(), 13);
    assert_eq!(player.spell_dc(), 13);
    assert_eq!(player.weapon_attack_bonus(), 5);
    assert_eq!(player.spell_attack_bonus(), 5);
}

#[test]
fn proficiency_steps_at_level_five_and_nine() {
    let mut player = hero();
    assert_eq!(player.proficiency_bonus(), 2);
    player.set_level(5);
    assert_eq!(player.proficiency_bonus(), 3);
    player.set_level(9);
    assert_eq!(player.proficiency_bonus(), 4);
}

#[test]
fn xp_carries_across_several_levels() {
    let mut player = hero();
    // 300 + 600 + 1800 = 2700 reaches level 4 exactly
    assert!(player.add_xp(2700));
    assert_eq!(player.level(), 4);
    assert_eq!(player.xp(), 0);

    // pools scale with level while staying full (nothing was missing)
    assert_eq!(player.max_hp(), 4 * 7);
    assert_eq!(player.hp(), player.max_hp());
}

#[test]
fn wounds_survive_stat_changes() {
    let mut player = hero();
    player.apply_damage(4);
    let missing = player.max_hp() - player.hp();

    // raising CON grows the pool; the wound stays the same size
    player.set_score(Ability::Constitution, 18);
    assert_eq!(player.max_hp() - player.hp(), missing);

    // and shrinking the pool below the wound floors at zero
    player.set_score(Ability::Constitution, 1);
    assert_eq!(player.max_hp(), 1);
    assert_eq!(player.hp(), 0);
}

#[test]
fn weapon_ability_swap_rederives_attack_bonus() {
    let mut player = hero();
    assert_eq!(player.weapon_attack_bonus(), 5); // PB 2 + STR 3
    player.set_weapon_ability(Ability::Dexterity);
    assert_eq!(player.weapon_attack_bonus(), 4); // PB 2 + DEX 2
}

#[test]
fn effects_are_per_actor_and_round_scoped() {
    let mut player = hero();
    player.apply_effect(EffectKind::Charm, 2);
    player.apply_effect(EffectKind::Parry, 1);
    assert!(!player.can_act());

    player.end_turn();
    assert_eq!(player.effect_timer(EffectKind::Charm), 1);
    assert_eq!(player.effect_timer(EffectKind::Parry), 0);

    player.end_turn();
    assert!(player.can_act());
}
