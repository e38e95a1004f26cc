//! Tactical dungeon-crawl engine: character state, d20 combat
//! resolution, and room-to-room exploration.
//!
//! This crate provides:
//! - Ability scores, levels, and the resources derived from them
//! - A d20 attack/save resolution protocol with criticals, parries,
//!   and timed status effects
//! - A round-based encounter loop that emits narration and sound
//!   events for a presentation layer to drain at its own pace
//! - A JSON-described dungeon of rooms and linked doors, with monster
//!   spawns on first entry
//!
//! # Quick Start
//!
//! ```
//! use delve_core::{Actor, Encounter, Role, Tables};
//!
//! let mut player = Actor::new("Thorin", Role::Player, Tables::default());
//! player.set_stat_array([16, 14, 14, 10, 10, 16]);
//! player.refresh_all();
//!
//! let mut monster = Actor::new("Ghoul", Role::Monster, Tables::default());
//! monster.set_level(2);
//! monster.refresh_all();
//!
//! let attack = delve_core::get_action("Attack").unwrap();
//! let mut encounter = Encounter::new(player, monster, attack);
//!
//! encounter.submit("Eldritch Blast").unwrap();
//! while let Some(event) = encounter.poll_event() {
//!     println!("{event:?}");
//! }
//! ```

pub mod action;
pub mod actor;
pub mod config;
pub mod dice;
pub mod dungeon;
pub mod encounter;
pub mod overworld;
pub mod stats;

// Primary public API
pub use action::{get_action, Action, AttackSource, CastOutcome, ResolutionKind, Target};
pub use actor::{Actor, ActorId, EffectKind, Role};
pub use config::{Tables, Vocab};
pub use dice::{DamageFormula, Die};
pub use dungeon::{DoorKey, Dungeon, DungeonError, Wall};
pub use encounter::{
    ActionOutcome, CombatEvent, Encounter, EncounterError, EncounterState, RoundReport, SoundTag,
};
pub use overworld::{Overworld, OverworldError, RoomEntry};
pub use stats::{Ability, AbilityBlock};
