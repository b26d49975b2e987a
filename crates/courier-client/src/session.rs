//! Sessions and destination resolution.
//!
//! A session is owned by exactly one connection and carries two immutable
//! flags set at creation: whether it is transacted and its acknowledgment
//! mode. A transacted session buffers publishes locally; they reach the
//! broker — and become visible to consumers — only on [`Session::commit`].

use crate::broker::{Broker, ConnectionId};
use crate::consumer::Consumer;
use crate::error::{DestinationError, SendError, SessionError};
use crate::message::{AcknowledgeMode, MessageId, OutboundMessage, QueueName};
use crate::producer::Producer;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// A named queue handle resolved within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    name: QueueName,
}

impl Queue {
    pub(crate) fn new(name: QueueName) -> Self {
        Self { name }
    }

    /// Get queue name
    pub fn name(&self) -> &QueueName {
        &self.name
    }
}

/// Context for producing and consuming on one connection
pub struct Session {
    broker: Arc<dyn Broker>,
    connection_id: ConnectionId,
    transacted: bool,
    ack_mode: AcknowledgeMode,
    closed: bool,
    pending: Vec<(QueueName, OutboundMessage)>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connection_id", &self.connection_id)
            .field("transacted", &self.transacted)
            .field("ack_mode", &self.ack_mode)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(
        broker: Arc<dyn Broker>,
        connection_id: ConnectionId,
        transacted: bool,
        ack_mode: AcknowledgeMode,
    ) -> Self {
        debug!(connection = %connection_id, transacted, ?ack_mode, "session created");
        Self {
            broker,
            connection_id,
            transacted,
            ack_mode,
            closed: false,
            pending: Vec::new(),
        }
    }

    /// Whether sends on this session require a commit to become visible
    pub fn transacted(&self) -> bool {
        self.transacted
    }

    /// Acknowledgment mode consumers on this session operate under
    pub fn ack_mode(&self) -> AcknowledgeMode {
        self.ack_mode
    }

    /// Resolve a queue name to a destination handle.
    ///
    /// Pure resolution; fails on an empty name or a closed session.
    pub fn queue(&self, name: &str) -> Result<Queue, DestinationError> {
        if self.closed {
            return Err(DestinationError::SessionClosed {
                name: name.to_string(),
            });
        }
        Ok(Queue::new(QueueName::new(name.to_string())?))
    }

    /// Create a producer bound to a destination.
    ///
    /// New producers default to persistent delivery; use
    /// [`Producer::set_delivery_mode`] to change that before sending.
    pub fn create_producer(&self, queue: &Queue) -> Result<Producer, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(Producer::new(queue.clone()))
    }

    /// Create a consumer bound to a destination
    pub fn create_consumer(&self, queue: &Queue) -> Result<Consumer, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(Consumer::new(
            Arc::clone(&self.broker),
            self.connection_id.clone(),
            queue.clone(),
            self.ack_mode,
        ))
    }

    /// Route a message to the broker, or buffer it if transacted
    pub(crate) async fn dispatch(
        &mut self,
        queue: &QueueName,
        message: OutboundMessage,
    ) -> Result<MessageId, SendError> {
        if self.closed {
            return Err(SendError::SessionClosed);
        }

        if self.transacted {
            let message_id = message.message_id().clone();
            self.pending.push((queue.clone(), message));
            Ok(message_id)
        } else {
            self.broker.publish(queue, message).await
        }
    }

    /// Publish every buffered message, in send order.
    ///
    /// A transport failure aborts the flush; messages not yet published
    /// stay buffered.
    pub async fn commit(&mut self) -> Result<(), SendError> {
        if self.closed {
            return Err(SendError::SessionClosed);
        }

        let buffered = std::mem::take(&mut self.pending);
        let total = buffered.len();
        let mut publishes = buffered.into_iter();
        while let Some((queue, message)) = publishes.next() {
            if let Err(error) = self.broker.publish(&queue, message.clone()).await {
                // Keep the failed message and the rest of the batch buffered
                self.pending.push((queue, message));
                self.pending.extend(publishes);
                return Err(error);
            }
        }
        debug!(connection = %self.connection_id, committed = total, "session committed");
        Ok(())
    }

    /// Discard every buffered message
    pub fn rollback(&mut self) {
        let discarded = self.pending.len();
        self.pending.clear();
        debug!(connection = %self.connection_id, discarded, "session rolled back");
    }

    /// Number of sends buffered awaiting a commit
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Close the session. Uncommitted sends are discarded.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if !self.pending.is_empty() {
            warn!(
                connection = %self.connection_id,
                discarded = self.pending.len(),
                "session closed with uncommitted sends"
            );
            self.pending.clear();
        }
    }

    /// Whether the session has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
