//! Message producer.

use crate::error::SendError;
use crate::message::{DeliveryMode, MessageId, OutboundMessage};
use crate::session::{Queue, Session};
use tracing::info;

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;

/// Sends text messages to one destination.
///
/// The configured delivery mode is attached to each message at send time.
/// New producers default to [`DeliveryMode::Persistent`].
pub struct Producer {
    queue: Queue,
    delivery_mode: DeliveryMode,
}

impl Producer {
    pub(crate) fn new(queue: Queue) -> Self {
        Self {
            queue,
            delivery_mode: DeliveryMode::Persistent,
        }
    }

    /// Configure the persistence contract for subsequent sends
    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.delivery_mode = mode;
    }

    /// Get the configured delivery mode
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    /// Destination this producer is bound to
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Construct a fresh text message and send it synchronously.
    ///
    /// On a transacted session the message is buffered until the session
    /// commits; otherwise it is published immediately.
    pub async fn send(
        &self,
        session: &mut Session,
        body: impl Into<String>,
    ) -> Result<MessageId, SendError> {
        let body = body.into();
        let message = OutboundMessage::text(body.clone()).with_delivery_mode(self.delivery_mode);
        let message_id = session.dispatch(self.queue.name(), message).await?;
        info!(queue = %self.queue.name(), %body, "sent message");
        Ok(message_id)
    }

    /// Send `count` messages with bodies `"<label> 0"` through
    /// `"<label> count-1"`, in ascending index order.
    ///
    /// Each send is a separate synchronous call; the first failure aborts
    /// the remaining iterations. Already-sent messages are not rolled back
    /// unless the session is transacted and the caller rolls back.
    pub async fn send_batch(
        &self,
        session: &mut Session,
        label: &str,
        count: u32,
    ) -> Result<Vec<MessageId>, SendError> {
        let mut sent = Vec::with_capacity(count as usize);
        for i in 0..count {
            sent.push(self.send(session, format!("{label} {i}")).await?);
        }
        Ok(sent)
    }
}
