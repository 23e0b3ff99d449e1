//! Lock-free inbox for client messages
//!
//! Connection handlers submit through cloned `InputSender`s; the match loop
//! drains everything pending before each tick, so all commands land between
//! ticks and in arrival order.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::game::constants::net::INPUT_BUFFER_SIZE;
use crate::net::protocol::ClientMessage;
use crate::net::session::ConnectionId;

/// A message tagged with the connection it came from
#[derive(Debug, Clone, PartialEq)]
pub struct InputMessage {
    pub connection: ConnectionId,
    pub message: ClientMessage,
}

/// Bounded MPSC inbox
pub struct InputBuffer {
    /// Sender side - cloned to each connection handler
    sender: Sender<InputMessage>,
    /// Receiver side - used by the match loop
    receiver: Receiver<InputMessage>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Sender handle for one connection
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Try to submit a message (non-blocking)
    ///
    /// Returns false if the buffer is full
    #[inline]
    pub fn try_submit(&self, connection: ConnectionId, message: ClientMessage) -> bool {
        self.sender.try_send(InputMessage { connection, message }).is_ok()
    }

    /// Everything pending, oldest first
    pub fn drain(&self) -> Vec<InputMessage> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(INPUT_BUFFER_SIZE)
    }
}

/// Clonable sender handle for connection handlers
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputMessage>,
}

impl InputSender {
    /// Submit a message (non-blocking)
    #[inline]
    pub fn try_send(&self, connection: ConnectionId, message: ClientMessage) -> Result<(), InputBufferError> {
        self.sender
            .try_send(InputMessage { connection, message })
            .map_err(|e| match e {
                TrySendError::Full(_) => InputBufferError::Full,
                TrySendError::Disconnected(_) => InputBufferError::Disconnected,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Buffer is full (backpressure)
    #[error("input buffer full")]
    Full,
    /// Match loop has stopped
    #[error("input buffer disconnected")]
    Disconnected,
}
