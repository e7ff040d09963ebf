//! Commands flowing into the frame loop and events flowing out of it.
//!
//! Entities never touch the loop directly. Arrival callbacks, speech bubbles and
//! hit handlers hold a [`CommandSender`] and post [`GameCommand`]s, which the loop
//! applies between update passes. Presentation code drains [`GameEvent`]s from the loop.

use std::sync::mpsc;

use crate::entity::EntityId;
use crate::room::RoomId;

#[derive(Clone, Debug, PartialEq)]
pub enum GameCommand {
    EnableInput,
    DisableInput,
    /// Take an entity out of play. Removing an entity that is not in play is a no-op.
    Remove(EntityId),
    /// Close the speech bubble of the given entity early, as a click on the overlay does.
    DismissSpeech(EntityId),
    /// Forward an event to the presentation layer.
    Notify(GameEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    FadeOut { room: RoomId },
    RoomEntered { from: RoomId, to: RoomId },
    FadeIn { room: RoomId },
    SpeechShown { entity: EntityId, text: String, width: f64, offset: f64 },
    SpeechHidden { entity: EntityId },
    Removed(EntityId),
}

/// Cloneable handle used to post commands to the loop.
#[derive(Clone, Debug)]
pub struct CommandSender(mpsc::Sender<GameCommand>);

impl CommandSender {
    /// Posts a command. A loop that has already shut down simply drops it.
    pub fn send(&self, command: GameCommand) {
        if self.0.send(command).is_err() {
            tracing::trace!("Command dropped, receiver is gone");
        }
    }
}

/// Receiving half owned by the loop.
#[derive(Debug)]
pub struct CommandQueue(mpsc::Receiver<GameCommand>);

impl CommandQueue {
    /// Drains every pending command without blocking.
    pub fn drain(&self) -> impl Iterator<Item = GameCommand> + '_ {
        self.0.try_iter()
    }
}

/// Creates a connected sender/queue pair.
pub fn command_channel() -> (CommandSender, CommandQueue) {
    let (tx, rx) = mpsc::channel();
    (CommandSender(tx), CommandQueue(rx))
}
