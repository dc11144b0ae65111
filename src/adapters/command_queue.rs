//! Manual-command queue between the MQTT client task and the control loop.
//!
//! The MQTT client delivers messages on its own task.  Its callback only
//! decodes the payload and pushes the result here; the control loop drains
//! the queue at its poll points, so the pump controller keeps one writer.
//!
//! ```text
//! ┌──────────────┐  QueuedCommand  ┌──────────────┐
//! │ MQTT callback│────────────────▶│ Control loop │
//! │  (IDF task)  │ (bounded, 4,    │   (main)     │
//! │              │  oldest evicted)│              │
//! └──────────────┘                 └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::{parse_payload, ManualCommand};
use crate::app::ports::CommandChannel;
use crate::error::CommandError;

/// A decoded command, or the reason a payload was refused.
pub type QueuedCommand = Result<ManualCommand, CommandError>;

/// Depth of the inbound queue.  One per cycle is consumed at the first
/// poll point, thirty more during sampling.
pub const QUEUE_DEPTH: usize = 4;

pub type CommandChannelBuf = Channel<CriticalSectionRawMutex, QueuedCommand, QUEUE_DEPTH>;

/// The queue the firmware uses: MQTT task → control loop.
pub static COMMAND_QUEUE: CommandChannelBuf = Channel::new();

/// Producer half, used from the MQTT callback.
#[derive(Clone, Copy)]
pub struct CommandSender<'a> {
    channel: &'a CommandChannelBuf,
}

impl<'a> CommandSender<'a> {
    pub fn new(channel: &'a CommandChannelBuf) -> Self {
        Self { channel }
    }

    /// Decode `payload` and enqueue the outcome.  Payloads without a switch
    /// field (our own telemetry echo) are dropped.
    ///
    /// Every command is an absolute switch state, so when the queue is full
    /// the oldest entry is evicted and the latest request always lands.
    /// Returns `false` when an older entry had to be discarded.
    pub fn push_payload(&self, payload: &[u8]) -> bool {
        let item = match parse_payload(payload) {
            Ok(None) => return true,
            Ok(Some(cmd)) => Ok(cmd),
            Err(e) => Err(e),
        };
        if self.channel.try_send(item).is_ok() {
            return true;
        }
        if let Ok(stale) = self.channel.try_receive() {
            warn!("command queue full, evicting {:?}", stale);
        }
        if self.channel.try_send(item).is_err() {
            warn!("command queue full, dropping {:?}", item);
        }
        false
    }
}

/// Consumer half, implements [`CommandChannel`] for the control loop.
pub struct CommandQueue<'a> {
    channel: &'a CommandChannelBuf,
}

impl<'a> CommandQueue<'a> {
    pub fn new(channel: &'a CommandChannelBuf) -> Self {
        Self { channel }
    }

    /// Drop anything still queued (e.g. stale commands from before boot
    /// finished).
    pub fn clear(&mut self) {
        while self.channel.try_receive().is_ok() {}
    }
}

impl CommandChannel for CommandQueue<'_> {
    fn poll_pending(&mut self) -> Result<Option<ManualCommand>, CommandError> {
        match self.channel.try_receive() {
            Ok(item) => item.map(Some),
            Err(_) => Ok(None),
        }
    }
}
