//! Exploration layer tying the dungeon to combat.
//!
//! The overworld holds the player between fights and hands them over to
//! an [`Encounter`] when they step into an uncleared room. Ownership is
//! the guard: while an encounter is outstanding the overworld has no
//! player, so a second fight cannot start until
//! [`Overworld::finish_encounter`] returns them.

use crate::action::Action;
use crate::dice::DamageFormula;
use crate::actor::{Actor, Role};
use crate::config::{Tables, Vocab};
use crate::dungeon::{DoorKey, Dungeon, DungeonError, Room};
use crate::encounter::{CombatEvent, Encounter, EncounterState, SoundTag};
use crate::stats::Ability;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverworldError {
    #[error("no such room: {0}")]
    UnknownRoom(u32),
    #[error("the player is already in an encounter")]
    PlayerBusy,
    #[error("the player has fallen; the delve is over")]
    PlayerDown,
    #[error(transparent)]
    Dungeon(#[from] DungeonError),
}

/// What stepping into a room produced.
#[derive(Debug)]
pub enum RoomEntry {
    /// Nothing here; the room was already cleared.
    Cleared,
    /// A monster spawned. The encounter now owns the player; hand it
    /// back via [`Overworld::finish_encounter`] when it ends.
    Encounter(Encounter),
}

/// The running delve: dungeon state, the player between fights, and the
/// spawn rules for monsters.
#[derive(Debug)]
pub struct Overworld {
    dungeon: Dungeon,
    tables: Tables,
    vocab: Vocab,
    /// None exactly while an encounter is outstanding.
    player: Option<Actor>,
    current_room: u32,
    first_combat: bool,
}

impl Overworld {
    /// Start a delve at room 1, which is the entrance and begins
    /// cleared.
    pub fn new(mut dungeon: Dungeon, player: Actor, tables: Tables, vocab: Vocab) -> Self {
        dungeon.mark_cleared(1);
        Self {
            dungeon,
            tables,
            vocab,
            player: Some(player),
            current_room: 1,
            first_combat: true,
        }
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.dungeon.room(self.current_room)
    }

    pub fn current_room_id(&self) -> u32 {
        self.current_room
    }

    /// The player, when not handed off to an encounter.
    pub fn player(&self) -> Option<&Actor> {
        self.player.as_ref()
    }

    pub fn in_encounter(&self) -> bool {
        self.player.is_none()
    }

    /// Open a door from the current room (and its counterpart on the
    /// far side).
    pub fn open_door(&mut self, key: DoorKey) -> Result<DoorKey, OverworldError> {
        Ok(self.dungeon.open_door(key)?)
    }

    /// Step into a room. A cleared room is uneventful; an uncleared one
    /// spawns a monster and starts an encounter, transferring the
    /// player into it.
    pub fn enter_room<R: Rng>(
        &mut self,
        room_id: u32,
        rng: &mut R,
    ) -> Result<RoomEntry, OverworldError> {
        let cleared = self
            .dungeon
            .room(room_id)
            .ok_or(OverworldError::UnknownRoom(room_id))?
            .cleared;

        let player = self.player.take().ok_or(OverworldError::PlayerBusy)?;
        if !player.is_alive() {
            self.player = Some(player);
            return Err(OverworldError::PlayerDown);
        }

        self.current_room = room_id;
        if cleared {
            self.player = Some(player);
            return Ok(RoomEntry::Cleared);
        }

        let monster = self.spawn_monster(rng);
        let entrance = self.vocab.entrance_line(monster.name(), rng);
        let attack = Action::weapon_attack(
            "Claw",
            DamageFormula::new(
                self.tables.monster_damage_dice.clone(),
                true,
                Ability::Strength,
                false,
            ),
        );

        let mut encounter = Encounter::new(player, monster, attack);
        encounter.push_event(CombatEvent::Sound {
            tag: SoundTag::EnterRoom,
        });
        encounter.narrate(entrance);
        Ok(RoomEntry::Encounter(encounter))
    }

    /// Tear down a finished (or abandoned) encounter and take the
    /// player back. A victory marks the current room cleared, so it
    /// never respawns.
    pub fn finish_encounter(&mut self, encounter: Encounter) -> EncounterState {
        let (player, state) = encounter.finish();
        if state == EncounterState::Victory {
            self.dungeon.mark_cleared(self.current_room);
        }
        self.player = Some(player);
        state
    }

    /// Roll a fresh monster. The first fight of a delve uses a fixed
    /// level so the opening difficulty is predictable; later fights
    /// roll within the configured range.
    fn spawn_monster<R: Rng>(&mut self, rng: &mut R) -> Actor {
        let name = self.vocab.monster_name(rng);
        let mut monster = Actor::new(name, Role::Monster, self.tables.clone());
        monster.set_stat_array(self.tables.base_monster_stats);

        let level = if self.first_combat {
            self.tables.first_monster_level
        } else {
            let (lo, hi) = self.tables.monster_level_range;
            rng.gen_range(lo..=hi)
        };
        self.first_combat = false;

        monster.set_level(level);
        monster.refresh_all();
        monster
    }
}
