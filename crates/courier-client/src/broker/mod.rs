//! Broker seam.
//!
//! The broker itself is an external collaborator; the client only depends
//! on this trait. [`InMemoryBroker`] implements it for tests, development,
//! and the single-process demo.

use crate::config::{BrokerUrl, Credentials};
use crate::error::{ConnectionError, ReceiveError, SendError};
use crate::message::{AcknowledgeMode, DeliveredMessage, MessageId, OutboundMessage, QueueName};
use async_trait::async_trait;

mod memory;

pub use memory::InMemoryBroker;

/// Broker-assigned identity of an attached client connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Mint a fresh connection identity
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get connection ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operations a broker exposes to this client.
///
/// Every operation is attempted exactly once; there is no retry logic on
/// this side of the seam.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Authenticate and register a client connection
    async fn attach(
        &self,
        credentials: &Credentials,
        address: &BrokerUrl,
    ) -> Result<ConnectionId, ConnectionError>;

    /// Release a client connection and everything it holds in flight.
    ///
    /// Detaching an unknown connection is a no-op, so teardown can run on
    /// partially failed setups.
    async fn detach(&self, connection: &ConnectionId) -> Result<(), ConnectionError>;

    /// Append a message to the tail of a queue
    async fn publish(
        &self,
        queue: &QueueName,
        message: OutboundMessage,
    ) -> Result<MessageId, SendError>;

    /// Blocking receive with no timeout.
    ///
    /// Resolves with `Ok(None)` — the end-of-stream sentinel — once the
    /// connection has detached, or the broker has shut down and the queue
    /// is drained. Until then an empty queue suspends the caller
    /// indefinitely.
    async fn consume(
        &self,
        connection: &ConnectionId,
        queue: &QueueName,
        ack_mode: AcknowledgeMode,
    ) -> Result<Option<DeliveredMessage>, ReceiveError>;

    /// Settle every delivery on this connection up to and including the tag
    async fn acknowledge(
        &self,
        connection: &ConnectionId,
        queue: &QueueName,
        up_to_tag: u64,
    ) -> Result<(), ReceiveError>;
}
