//! The dungeon layout: a graph of rectangular rooms joined by doors.
//!
//! Layouts are authored as JSON and deserialized with serde. Doors are
//! directional in the data (each room lists its own doors per wall) but
//! conceptually shared: after parsing, [`Dungeon::link_doors`] pairs
//! every door with its counterpart on the opposite wall of the room it
//! leads to. A door with no counterpart is a fatal layout error, not a
//! warning; a dungeon that parses is fully traversable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("invalid layout json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("room at index {index} has id {id}, expected {expected}")]
    BadRoomId { index: usize, id: u32, expected: u32 },
    #[error("door on the {wall} wall of room {room} leads to unknown room {out_id}")]
    UnknownRoom { room: u32, wall: Wall, out_id: u32 },
    #[error("door on the {wall} wall of room {room} has no matching door back from room {out_id}")]
    UnlinkedDoor { room: u32, wall: Wall, out_id: u32 },
    #[error("no door at {0:?}")]
    UnknownDoor(DoorKey),
}

/// Which wall of a room a door sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    North,
    South,
    East,
    West,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::North, Wall::South, Wall::East, Wall::West];

    /// The wall a matching door sits on in the adjoining room.
    pub fn opposite(self) -> Wall {
        match self {
            Wall::North => Wall::South,
            Wall::South => Wall::North,
            Wall::East => Wall::West,
            Wall::West => Wall::East,
        }
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Wall::North => "north",
            Wall::South => "south",
            Wall::East => "east",
            Wall::West => "west",
        };
        write!(f, "{name}")
    }
}

/// Stable address of one door: room id, wall, position in that wall's
/// door list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorKey {
    pub room: u32,
    pub wall: Wall,
    pub index: usize,
}

/// One door as authored, plus its resolved counterpart after linking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    /// Grid position of the door within the room's wall.
    pub col: i32,
    pub row: i32,
    /// Id of the room this door leads to. Ids are 1-based; 0 marks an
    /// empty door slot that links to nothing.
    pub out_id: u32,
    #[serde(default)]
    pub is_open: bool,
    /// Set by [`Dungeon::link_doors`]; never authored.
    #[serde(skip)]
    pub linked: Option<DoorKey>,
}

/// The doors of one room, grouped per wall. Walls with no doors may be
/// omitted from the JSON entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoorSet {
    #[serde(default)]
    pub north: Vec<Door>,
    #[serde(default)]
    pub south: Vec<Door>,
    #[serde(default)]
    pub east: Vec<Door>,
    #[serde(default)]
    pub west: Vec<Door>,
}

impl DoorSet {
    pub fn wall(&self, wall: Wall) -> &[Door] {
        match wall {
            Wall::North => &self.north,
            Wall::South => &self.south,
            Wall::East => &self.east,
            Wall::West => &self.west,
        }
    }

    fn wall_mut(&mut self, wall: Wall) -> &mut Vec<Door> {
        match wall {
            Wall::North => &mut self.north,
            Wall::South => &mut self.south,
            Wall::East => &mut self.east,
            Wall::West => &mut self.west,
        }
    }

    /// All doors in wall order, with their addresses-to-be.
    pub fn iter(&self) -> impl Iterator<Item = (Wall, usize, &Door)> {
        Wall::ALL.into_iter().flat_map(move |wall| {
            self.wall(wall)
                .iter()
                .enumerate()
                .map(move |(index, door)| (wall, index, door))
        })
    }

    pub fn count(&self) -> usize {
        Wall::ALL.into_iter().map(|w| self.wall(w).len()).sum()
    }
}

/// One rectangular room on the dungeon grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room ids are 1-based and must equal array position + 1.
    pub id: u32,
    pub col: i32,
    pub row: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub doors: DoorSet,
    /// True once the room's monster has been beaten (room 1, the
    /// entrance, starts cleared).
    #[serde(default)]
    pub cleared: bool,
}

/// The serialized layout shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layout {
    rooms: Vec<Room>,
}

/// A parsed, fully linked dungeon.
#[derive(Debug, Clone)]
pub struct Dungeon {
    rooms: Vec<Room>,
}

impl Dungeon {
    /// Parse a layout from JSON, validate room ids, and link every door
    /// to its counterpart.
    pub fn from_json(json: &str) -> Result<Self, DungeonError> {
        let layout: Layout = serde_json::from_str(json)?;
        Self::from_rooms(layout.rooms)
    }

    /// Build from already-constructed rooms (used by tests and by
    /// layout generators).
    pub fn from_rooms(rooms: Vec<Room>) -> Result<Self, DungeonError> {
        for (index, room) in rooms.iter().enumerate() {
            let expected = index as u32 + 1;
            if room.id != expected {
                return Err(DungeonError::BadRoomId {
                    index,
                    id: room.id,
                    expected,
                });
            }
        }
        let mut dungeon = Self { rooms };
        dungeon.link_doors()?;
        Ok(dungeon)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: u32) -> Option<&Room> {
        self.rooms.get((id as usize).checked_sub(1)?)
    }

    pub fn room_mut(&mut self, id: u32) -> Option<&mut Room> {
        self.rooms.get_mut((id as usize).checked_sub(1)?)
    }

    pub fn door(&self, key: DoorKey) -> Option<&Door> {
        self.room(key.room)?.doors.wall(key.wall).get(key.index)
    }

    /// The counterpart of a door, once linked.
    pub fn linked_door(&self, key: DoorKey) -> Option<DoorKey> {
        self.door(key)?.linked
    }

    fn door_mut(&mut self, key: DoorKey) -> Option<&mut Door> {
        self.room_mut(key.room)?
            .doors
            .wall_mut(key.wall)
            .get_mut(key.index)
    }

    pub fn mark_cleared(&mut self, id: u32) {
        if let Some(room) = self.room_mut(id) {
            room.cleared = true;
        }
    }

    /// Open a door and its linked counterpart, so the passage reads as
    /// open from both rooms. Returns the counterpart's address.
    pub fn open_door(&mut self, key: DoorKey) -> Result<DoorKey, DungeonError> {
        let linked = self
            .door(key)
            .ok_or(DungeonError::UnknownDoor(key))?
            .linked
            .ok_or(DungeonError::UnknownDoor(key))?;

        if let Some(door) = self.door_mut(key) {
            door.is_open = true;
        }
        if let Some(door) = self.door_mut(linked) {
            door.is_open = true;
        }
        Ok(linked)
    }

    /// Pair every door with the matching door on the opposite wall of
    /// its target room. Empty slots (`out_id` 0) are skipped and stay
    /// unlinked. When several doors join the same two rooms on the
    /// same wall pair, they match in authored order.
    fn link_doors(&mut self) -> Result<(), DungeonError> {
        let mut links: Vec<(DoorKey, DoorKey)> = Vec::new();

        for room in &self.rooms {
            for (wall, index, door) in room.doors.iter() {
                // out_id 0 is an empty slot, not a passage
                if door.out_id == 0 {
                    continue;
                }
                let key = DoorKey {
                    room: room.id,
                    wall,
                    index,
                };
                let target = self.room(door.out_id).ok_or(DungeonError::UnknownRoom {
                    room: room.id,
                    wall,
                    out_id: door.out_id,
                })?;

                // the k-th door to the target pairs with the target's
                // k-th door back
                let nth = room.doors.wall(wall)[..index]
                    .iter()
                    .filter(|d| d.out_id == door.out_id)
                    .count();
                let back_wall = wall.opposite();
                let back_index = target
                    .doors
                    .wall(back_wall)
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| d.out_id == room.id)
                    .nth(nth)
                    .map(|(i, _)| i)
                    .ok_or(DungeonError::UnlinkedDoor {
                        room: room.id,
                        wall,
                        out_id: door.out_id,
                    })?;

                links.push((
                    key,
                    DoorKey {
                        room: target.id,
                        wall: back_wall,
                        index: back_index,
                    },
                ));
            }
        }

        for (from, to) in links {
            if let Some(door) = self.door_mut(from) {
                door.linked = Some(to);
            }
        }
        Ok(())
    }
}
