//! Per-room actor task.
//!
//! Every room runs as its own tokio task that owns the [`Room`] state
//! outright. All mutation flows through a single command channel, so a
//! move, a timer expiry, and a disconnect can never interleave halfway:
//!
//! ```text
//!   RoomHandle --- mpsc ---> RoomActor --- run loop
//!                              |  \
//!                              |   `-- turn timer (sleep_until)
//!                              `------ outbound senders, one per player
//! ```
//!
//! The engine records *which* turn is on the clock; the actor owns the
//! concrete deadline and re-derives it after every command it applies.

use std::collections::HashMap;
use std::sync::Arc;

use fadeline_engine::{GameEngine, Outcome, Room};
use fadeline_protocol::{PlayerId, Recipient, RpsChoice, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::error::RoomError;

/// Outbound channel for one connected player's writer task.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// How a leave request landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player was removed and the room still has occupants.
    Left,
    /// The player was not in the room; nothing changed.
    NotAMember,
    /// The player was the last occupant; the room shut down.
    Emptied,
}

pub(crate) enum RoomCommand {
    Join {
        player: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<()>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },
    Move {
        player: PlayerId,
        cell: usize,
    },
    Rps {
        player: PlayerId,
        choice: RpsChoice,
    },
    Chat {
        player: PlayerId,
        text: String,
    },
    Occupants {
        reply: oneshot::Sender<usize>,
    },
}

/// Cheap cloneable handle for sending commands into a room's actor.
#[derive(Clone)]
pub struct RoomHandle {
    name: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Name the room was created under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seat a player and register their outbound channel. Resolves once
    /// the actor has applied the join, so the caller sees the room in
    /// its post-join state.
    pub async fn join(&self, player: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        let (reply, done) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player,
                sender,
                reply,
            })
            .await
            .map_err(|_| self.unavailable())?;
        done.await.map_err(|_| self.unavailable())
    }

    /// Remove a player, reporting whether the room emptied out.
    pub async fn leave(&self, player: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply, done) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave { player, reply })
            .await
            .map_err(|_| self.unavailable())?;
        done.await.map_err(|_| self.unavailable())
    }

    /// Submit a move. Invalid moves are dropped by the engine without a
    /// response, so there is nothing to wait for.
    pub async fn make_move(&self, player: PlayerId, cell: usize) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Move { player, cell })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Submit a tiebreak choice.
    pub async fn play_rps(&self, player: PlayerId, choice: RpsChoice) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Rps { player, choice })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Relay a chat line to everyone in the room.
    pub async fn chat(&self, player: PlayerId, text: String) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat { player, text })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Current occupant count, duplicates included.
    pub async fn occupants(&self) -> Result<usize, RoomError> {
        let (reply, done) = oneshot::channel();
        self.sender
            .send(RoomCommand::Occupants { reply })
            .await
            .map_err(|_| self.unavailable())?;
        done.await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.name.clone())
    }
}

struct RoomActor {
    name: String,
    engine: Arc<GameEngine>,
    room: Room,
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Timer the actor is currently sleeping on: the turn it was armed
    /// for and the wall-clock instant it expires.
    deadline: Option<(u64, Instant)>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.name, "room opened");
        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.fire_timer();
                }
            }
            self.sync_timer();
        }
        tracing::info!(room = %self.name, "room closed");
    }

    /// Applies one command. Returns `true` when the room emptied and the
    /// actor should shut down.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player,
                sender,
                reply,
            } => {
                // Register the channel first so the joiner receives the
                // state broadcast triggered by their own join.
                self.senders.insert(player, sender);
                let transition = self.engine.join(&mut self.room, player);
                tracing::info!(
                    room = %self.name,
                    %player,
                    occupants = self.room.occupants(),
                    "player joined"
                );
                self.dispatch(transition.notices);
                let _ = reply.send(());
                false
            }
            RoomCommand::Leave { player, reply } => {
                let outcome = self.apply_leave(player);
                let _ = reply.send(outcome);
                outcome == LeaveOutcome::Emptied
            }
            RoomCommand::Move { player, cell } => {
                let transition = self.engine.make_move(&mut self.room, player, cell);
                match &transition.outcome {
                    Outcome::Rejected(rejection) => {
                        tracing::debug!(room = %self.name, %player, cell, %rejection, "move dropped");
                    }
                    Outcome::Won { winner } => {
                        tracing::info!(room = %self.name, %winner, "four in a row");
                    }
                    _ => {}
                }
                self.dispatch(transition.notices);
                false
            }
            RoomCommand::Rps { player, choice } => {
                let transition = self.engine.play_rps(&mut self.room, player, choice);
                if let Outcome::Rejected(rejection) = &transition.outcome {
                    tracing::debug!(room = %self.name, %player, %rejection, "tiebreak choice dropped");
                }
                self.dispatch(transition.notices);
                false
            }
            RoomCommand::Chat { player, text } => {
                tracing::debug!(room = %self.name, %player, "chat relayed");
                self.dispatch(vec![(Recipient::All, ServerMessage::Chat { text })]);
                false
            }
            RoomCommand::Occupants { reply } => {
                let _ = reply.send(self.room.occupants());
                false
            }
        }
    }

    fn apply_leave(&mut self, player: PlayerId) -> LeaveOutcome {
        let transition = self.engine.leave(&mut self.room, player);
        self.senders.remove(&player);
        match transition.outcome {
            Outcome::RoomEmptied => {
                tracing::info!(room = %self.name, %player, "last player left");
                LeaveOutcome::Emptied
            }
            Outcome::Rejected(_) => LeaveOutcome::NotAMember,
            _ => {
                tracing::info!(
                    room = %self.name,
                    %player,
                    occupants = self.room.occupants(),
                    "player left"
                );
                self.dispatch(transition.notices);
                LeaveOutcome::Left
            }
        }
    }

    fn fire_timer(&mut self) {
        let Some((turn, _)) = self.deadline.take() else {
            return;
        };
        let transition = self.engine.timeout_fire(&mut self.room, turn);
        match &transition.outcome {
            Outcome::Accepted => {
                tracing::info!(room = %self.name, turn, "turn timed out");
            }
            Outcome::Rejected(rejection) => {
                tracing::debug!(room = %self.name, turn, %rejection, "timer expiry dropped");
            }
            _ => {}
        }
        self.dispatch(transition.notices);
    }

    /// Reconciles the sleeping timer with what the engine has armed.
    /// A freshly armed turn gets a deadline one timeout window from now;
    /// an unchanged turn keeps its original deadline.
    fn sync_timer(&mut self) {
        match (self.room.armed_timeout(), self.deadline) {
            (None, _) => self.deadline = None,
            (Some(turn), Some((armed, _))) if armed == turn => {}
            (Some(turn), _) => {
                // The engine only arms when a timeout window is configured.
                self.deadline = self
                    .engine
                    .config()
                    .turn_timeout
                    .map(|window| (turn, Instant::now() + window));
            }
        }
    }

    fn dispatch(&self, notices: Vec<(Recipient, ServerMessage)>) {
        for (recipient, message) in notices {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        // A closed channel means the player is mid-disconnect;
                        // the registry sweep will remove them shortly.
                        let _ = sender.send(message.clone());
                    }
                }
                Recipient::Player(player) => {
                    if let Some(sender) = self.senders.get(&player) {
                        let _ = sender.send(message);
                    }
                }
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<(u64, Instant)>) {
    match deadline {
        Some((_, at)) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Spawns the actor task for a new room and returns its handle.
pub(crate) fn spawn_room(
    name: String,
    engine: Arc<GameEngine>,
    channel_size: usize,
) -> RoomHandle {
    let (sender, receiver) = mpsc::channel(channel_size);
    let actor = RoomActor {
        name: name.clone(),
        room: engine.new_room(),
        engine,
        senders: HashMap::new(),
        receiver,
        deadline: None,
    };
    tokio::spawn(actor.run());
    RoomHandle { name, sender }
}
