//! The combat loop: one player actor against one monster actor.
//!
//! A round is a fixed sequence: the player's submitted action resolves,
//! the monster reacts under its fixed policy, and effect timers decay.
//! The reference paced this with coroutine waits; here every narrated
//! beat and signal is a [`CombatEvent`] pushed onto a queue that the
//! driving loop drains at its own pace via [`Encounter::poll_event`].
//! The `busy` flag set by a submission clears only once the completed
//! round's events have been fully drained, so a second action cannot
//! land mid-round. Once submitted, a round always runs to completion.
//!
//! Timer decay order (part of the public contract): the monster's
//! timers decay at the end of its own turn; the player's decay during
//! end-of-round bookkeeping. Each fires exactly once per round.

use crate::action::{get_action, Action, CastOutcome, Target};
use crate::actor::{Actor, ActorId, EffectKind};
use crate::config::Tables;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors from submitting an action. These reject synchronously and
/// mutate nothing.
#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("an action is already resolving; drain events before submitting again")]
    Busy,
    #[error("the encounter is over")]
    Over,
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Opaque audio cues for the presentation layer. The mapping from tag
/// to asset is entirely external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundTag {
    Damage,
    SpellCast,
    EnterRoom,
    DoorOpened,
}

/// One beat or signal for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    Narrated { text: String },
    Sound { tag: SoundTag },
    RoundEnded { round: u32 },
    ActorDefeated { id: ActorId, name: String },
}

/// Where the encounter currently stands. An encounter value only
/// exists once combat has started, so the idle pre-combat state is the
/// absence of one. `ResolveAction`, `MonsterTurn`, and `EndOfRound`
/// are passed through inside a single submission; between calls the
/// observable states are `PlayerTurn`, `Victory`, and `Defeat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterState {
    PlayerTurn,
    ResolveAction,
    MonsterTurn,
    EndOfRound,
    Victory,
    Defeat,
}

impl EncounterState {
    pub fn is_over(&self) -> bool {
        matches!(self, EncounterState::Victory | EncounterState::Defeat)
    }
}

/// Why a submission was turned away without running the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NotEnoughMp { needed: i32, available: i32 },
}

/// Result of a submission: the round ran, or it was rejected cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Resolved(RoundReport),
    Rejected(RejectReason),
}

/// What the monster did with its turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonsterTurnReport {
    /// The round ended before the monster acted (its defeat).
    NotTaken,
    /// Dead monsters do nothing.
    CannotAct,
    /// Incapacitated by the given effect this round.
    Skipped(EffectKind),
    Acted(CastOutcome),
}

/// Structured record of one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u32,
    /// The player's resolved action, when they were able to act.
    pub player_action: Option<CastOutcome>,
    /// Set instead when an effect kept the player from acting.
    pub player_skipped: Option<EffectKind>,
    pub monster_turn: MonsterTurnReport,
    pub state: EncounterState,
}

/// One combat session between the player and one monster.
///
/// The encounter owns both actors for its duration; no external
/// mutation is possible while a round is in flight. When it ends,
/// [`Encounter::finish`] hands the player back.
#[derive(Debug, Clone)]
pub struct Encounter {
    player: Actor,
    monster: Actor,
    monster_attack: Action,
    state: EncounterState,
    round: u32,
    busy: bool,
    events: VecDeque<CombatEvent>,
}

impl Encounter {
    pub fn new(player: Actor, monster: Actor, monster_attack: Action) -> Self {
        Self {
            player,
            monster,
            monster_attack,
            state: EncounterState::PlayerTurn,
            round: 1,
            busy: false,
            events: VecDeque::new(),
        }
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn monster(&self) -> &Actor {
        &self.monster
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// True from submission until the round's events are drained.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Pop the next beat for the presentation layer. Draining the last
    /// event of a completed round clears the busy flag, which is what
    /// re-opens submissions.
    pub fn poll_event(&mut self) -> Option<CombatEvent> {
        let event = self.events.pop_front();
        if self.events.is_empty() {
            self.busy = false;
        }
        event
    }

    /// Tear down the encounter, returning the player and the state it
    /// ended in (or was abandoned in).
    pub fn finish(self) -> (Actor, EncounterState) {
        (self.player, self.state)
    }

    /// Submit the player's action for this round by name, rolling with
    /// the thread RNG.
    pub fn submit(&mut self, action_name: &str) -> Result<ActionOutcome, EncounterError> {
        self.submit_with_rng(action_name, &mut rand::thread_rng())
    }

    /// Submit by name with an explicit random source.
    pub fn submit_with_rng<R: Rng>(
        &mut self,
        action_name: &str,
        rng: &mut R,
    ) -> Result<ActionOutcome, EncounterError> {
        let action = get_action(action_name)
            .ok_or_else(|| EncounterError::UnknownAction(action_name.to_string()))?;
        self.submit_action_with_rng(&action, rng)
    }

    /// Submit an already-resolved [`Action`] and run the round to
    /// completion. Rejections (busy, over, insufficient MP) happen
    /// before any state mutation.
    pub fn submit_action_with_rng<R: Rng>(
        &mut self,
        action: &Action,
        rng: &mut R,
    ) -> Result<ActionOutcome, EncounterError> {
        if self.busy {
            return Err(EncounterError::Busy);
        }
        if self.state.is_over() {
            return Err(EncounterError::Over);
        }
        if self.player.mp() < action.mp_cost {
            return Ok(ActionOutcome::Rejected(RejectReason::NotEnoughMp {
                needed: action.mp_cost,
                available: self.player.mp(),
            }));
        }

        self.busy = true;
        self.state = EncounterState::ResolveAction;

        let mut report = RoundReport {
            round: self.round,
            player_action: None,
            player_skipped: None,
            monster_turn: MonsterTurnReport::NotTaken,
            state: self.state,
        };

        if let Some(kind) = self.player.incapacitated_by() {
            self.narrate(format!(
                "{} is {} and cannot act!",
                self.player.name(),
                kind
            ));
            report.player_skipped = Some(kind);
        } else {
            self.player.spend_mp(action.mp_cost);
            if let Some(tag) = action.sound {
                self.events.push_back(CombatEvent::Sound { tag });
            }
            let verb = if action.mp_cost > 0 { "casts" } else { "uses" };
            match action.target {
                Target::Enemy => self.narrate(format!(
                    "{} {} {} against {}!",
                    self.player.name(),
                    verb,
                    action.name,
                    self.monster.name()
                )),
                Target::SelfTarget => {
                    self.narrate(format!("{} {} {}!", self.player.name(), verb, action.name))
                }
            }

            let outcome = action.cast_with_rng(&mut self.player, &mut self.monster, rng);
            self.narrate_player_outcome(action, &outcome);
            report.player_action = Some(outcome);
        }

        if !self.monster.is_alive() {
            self.finish_victory();
        } else {
            self.state = EncounterState::MonsterTurn;
            report.monster_turn = self.monster_turn(rng);

            self.state = EncounterState::EndOfRound;
            self.player.end_turn();
            self.events
                .push_back(CombatEvent::RoundEnded { round: self.round });

            if !self.player.is_alive() {
                self.events.push_back(CombatEvent::ActorDefeated {
                    id: self.player.id(),
                    name: self.player.name().to_string(),
                });
                self.narrate(format!("{} has fallen!", self.player.name()));
                self.state = EncounterState::Defeat;
            } else {
                self.state = EncounterState::PlayerTurn;
                self.round += 1;
            }
        }

        report.state = self.state;
        Ok(ActionOutcome::Resolved(report))
    }

    /// The monster's fixed policy: do nothing when dead, sit out while
    /// incapacitated, otherwise make its single weapon attack.
    fn monster_turn<R: Rng>(&mut self, rng: &mut R) -> MonsterTurnReport {
        if !self.monster.is_alive() {
            self.narrate(format!("{} cannot act!", self.monster.name()));
            return MonsterTurnReport::CannotAct;
        }

        if let Some(kind) = self.monster.incapacitated_by() {
            self.narrate(format!(
                "{} is {} and cannot act!",
                self.monster.name(),
                kind
            ));
            // Timers decay whether or not the monster acted.
            self.monster.end_turn();
            return MonsterTurnReport::Skipped(kind);
        }

        self.narrate(format!(
            "{} attacks {}!",
            self.monster.name(),
            self.player.name()
        ));

        let attack = self.monster_attack.clone();
        let outcome = attack.cast_with_rng(&mut self.monster, &mut self.player, rng);

        if outcome.riposte {
            self.narrate(format!(
                "{} parries! {} is sent reeling!",
                self.player.name(),
                self.monster.name()
            ));
        }
        if outcome.success {
            let damage = outcome.damage.unwrap_or(0);
            self.events.push_back(CombatEvent::Sound {
                tag: SoundTag::Damage,
            });
            self.narrate(format!(
                "{} hit {} for {} damage!",
                self.monster.name(),
                self.player.name(),
                damage
            ));
        } else {
            self.narrate(format!("{} missed!", self.monster.name()));
        }

        self.monster.end_turn();
        MonsterTurnReport::Acted(outcome)
    }

    /// Victory bookkeeping: XP award from the challenge table, partial
    /// resource restore, terminal state.
    fn finish_victory(&mut self) {
        self.events.push_back(CombatEvent::ActorDefeated {
            id: self.monster.id(),
            name: self.monster.name().to_string(),
        });
        self.narrate(format!("The {} has been defeated!", self.monster.name()));

        let reward = self.tables().xp_reward(self.monster.level());
        let leveled = self.player.add_xp(reward);
        self.narrate(format!("You gained {reward} xp!"));
        if leveled {
            self.narrate(format!("Welcome to level {}!", self.player.level()));
        }

        let restore = self.tables().restore_percent;
        let to_hp = (restore * self.player.max_hp() as f32) as i32;
        let to_mp = (restore * self.player.max_mp() as f32) as i32;
        self.player.apply_damage(-to_hp);
        self.player.spend_mp(-to_mp);

        self.state = EncounterState::Victory;
    }

    fn tables(&self) -> &Tables {
        self.player.tables()
    }

    pub(crate) fn narrate(&mut self, text: impl Into<String>) {
        self.events
            .push_back(CombatEvent::Narrated { text: text.into() });
    }

    pub(crate) fn push_event(&mut self, event: CombatEvent) {
        self.events.push_back(event);
    }

    fn narrate_player_outcome(&mut self, action: &Action, outcome: &CastOutcome) {
        let target_name = match action.target {
            Target::Enemy => self.monster.name().to_string(),
            Target::SelfTarget => self.player.name().to_string(),
        };

        if let Some(roll) = outcome.attack {
            let critical = if roll.critical_hit || roll.fumble {
                " critically"
            } else {
                ""
            };
            let hit = if outcome.success { "hits" } else { "misses" };
            self.narrate(format!(
                "{}'s {}{} {}!",
                self.player.name(),
                action.name,
                critical,
                hit
            ));
        }

        if outcome.riposte {
            self.narrate(format!(
                "{} parries! {} is sent reeling!",
                self.monster.name(),
                self.player.name()
            ));
        }

        if let Some(save) = outcome.save {
            let fate = if save.saved { "succeeded" } else { "failed" };
            self.narrate(format!("{target_name} {fate} their saving throw!"));
        }

        if let Some(damage) = outcome.damage {
            if action.is_healing() {
                self.narrate(format!("{} is healed for {} HP!", target_name, -damage));
            } else {
                self.events.push_back(CombatEvent::Sound {
                    tag: SoundTag::Damage,
                });
                self.narrate(format!("{target_name} is hit for {damage} damage!"));
            }
        }

        if let Some((kind, duration)) = outcome.effect_applied {
            self.narrate(format!(
                "{target_name} is {kind} for {duration} rounds!"
            ));
        }
    }
}
