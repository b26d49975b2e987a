//! Message consumer.

use crate::broker::{Broker, ConnectionId};
use crate::error::ReceiveError;
use crate::message::{AcknowledgeMode, DeliveredMessage};
use crate::session::Queue;
use std::sync::Arc;
use tracing::debug;

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;

/// Receives messages from one destination by blocking receive
pub struct Consumer {
    broker: Arc<dyn Broker>,
    connection_id: ConnectionId,
    queue: Queue,
    ack_mode: AcknowledgeMode,
    last_delivery_tag: Option<u64>,
}

impl Consumer {
    pub(crate) fn new(
        broker: Arc<dyn Broker>,
        connection_id: ConnectionId,
        queue: Queue,
        ack_mode: AcknowledgeMode,
    ) -> Self {
        Self {
            broker,
            connection_id,
            queue,
            ack_mode,
            last_delivery_tag: None,
        }
    }

    /// Destination this consumer is bound to
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Blocking receive with no timeout.
    ///
    /// Suspends until a message arrives or the broker signals end-of-stream
    /// (`Ok(None)`): the connection was torn down, or the broker shut down
    /// and the queue is drained. A live queue with no such signal blocks
    /// indefinitely.
    pub async fn receive(&mut self) -> Result<Option<DeliveredMessage>, ReceiveError> {
        let delivered = self
            .broker
            .consume(&self.connection_id, self.queue.name(), self.ack_mode)
            .await?;
        if let Some(message) = &delivered {
            self.last_delivery_tag = Some(message.delivery_tag());
        }
        Ok(delivered)
    }

    /// Receive until end-of-stream, decoding each message as text.
    ///
    /// Invokes `on_text` for every message body in delivery order and
    /// returns the number of messages received. A non-text payload is
    /// fatal to the loop, not skipped.
    pub async fn drain<F>(&mut self, mut on_text: F) -> Result<u64, ReceiveError>
    where
        F: FnMut(&str),
    {
        let mut received = 0u64;
        while let Some(delivered) = self.receive().await? {
            let body = delivered.text()?;
            debug!(queue = %self.queue.name(), message_id = %delivered.message_id(), "received message");
            on_text(body);
            received += 1;
        }
        debug!(queue = %self.queue.name(), received, "end of stream");
        Ok(received)
    }

    /// Settle every message delivered to this consumer so far.
    ///
    /// Only meaningful under [`AcknowledgeMode::Client`]; a no-op when
    /// nothing has been delivered yet.
    pub async fn acknowledge(&mut self) -> Result<(), ReceiveError> {
        if let Some(tag) = self.last_delivery_tag {
            self.broker
                .acknowledge(&self.connection_id, self.queue.name(), tag)
                .await?;
        }
        Ok(())
    }
}
