//! Message types and delivery contracts.

use crate::error::{DestinationError, ReceiveError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Validated queue name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: String) -> Result<Self, DestinationError> {
        if name.is_empty() {
            return Err(DestinationError::EmptyName);
        }

        Ok(Self(name))
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Unique identifier assigned to every message at construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistence contract attached to each message at send time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Broker must survive a restart without losing the message
    Persistent,
    /// Best-effort delivery; the message may be lost on broker restart
    #[default]
    NonPersistent,
}

/// Policy governing when the broker considers a received message consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcknowledgeMode {
    /// Broker settles each message as soon as it is delivered
    #[default]
    Auto,
    /// Consumer must acknowledge explicitly; unacknowledged messages are
    /// requeued when the connection detaches
    Client,
    /// Lazy settlement; duplicates are tolerated
    DupsOk,
}

impl AcknowledgeMode {
    /// Whether the broker settles deliveries without an explicit acknowledge
    pub fn auto_acknowledge(&self) -> bool {
        !matches!(self, Self::Client)
    }
}

/// Logical message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Bytes),
}

impl Payload {
    /// Get payload as text, if it is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(body) => Some(body),
            Self::Bytes(_) => None,
        }
    }
}

/// A message constructed by a producer, ready to publish
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    message_id: MessageId,
    payload: Payload,
    delivery_mode: DeliveryMode,
}

impl OutboundMessage {
    /// Create a fresh text message
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(),
            payload: Payload::Text(body.into()),
            delivery_mode: DeliveryMode::default(),
        }
    }

    /// Create a fresh raw-bytes message
    pub fn bytes(body: Bytes) -> Self {
        Self {
            message_id: MessageId::new(),
            payload: Payload::Bytes(body),
            delivery_mode: DeliveryMode::default(),
        }
    }

    /// Attach a delivery mode
    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = mode;
        self
    }

    /// Get message ID
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Get payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Get delivery mode
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }
}

/// A message delivered to a consumer, with broker metadata
#[derive(Debug, Clone)]
pub struct DeliveredMessage {
    message_id: MessageId,
    payload: Payload,
    delivery_mode: DeliveryMode,
    enqueued_at: DateTime<Utc>,
    delivery_tag: u64,
}

impl DeliveredMessage {
    /// Assemble a delivered message from its parts
    pub fn new(
        message_id: MessageId,
        payload: Payload,
        delivery_mode: DeliveryMode,
        enqueued_at: DateTime<Utc>,
        delivery_tag: u64,
    ) -> Self {
        Self {
            message_id,
            payload,
            delivery_mode,
            enqueued_at,
            delivery_tag,
        }
    }

    /// Get message ID
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Get payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Get delivery mode the message was sent with
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    /// When the broker accepted the message
    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }

    /// Broker-assigned delivery tag, used for explicit acknowledgment
    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }

    /// Decode the payload as text.
    ///
    /// A non-text payload is a contract violation for this client and is
    /// fatal to the receive loop, not skipped.
    pub fn text(&self) -> Result<&str, ReceiveError> {
        self.payload
            .as_text()
            .ok_or_else(|| ReceiveError::MalformedMessage {
                message_id: self.message_id.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
