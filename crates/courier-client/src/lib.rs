//! # Courier Client
//!
//! Point-to-point messaging client: a producer publishes a bounded batch
//! of text messages to a named queue, and a consumer drains that queue by
//! blocking-receive until the broker signals end-of-stream.
//!
//! This library provides:
//! - Connection lifecycle management (open, start, guaranteed close)
//! - Sessions carrying transaction and acknowledgment semantics
//! - Queue resolution, producers with per-message delivery modes, and
//!   drain-until-end-of-stream consumers
//! - A broker trait seam with an in-memory implementation for tests,
//!   development, and single-process demos
//!
//! ## Module Organization
//!
//! - [error] - Error types for all client operations
//! - [config] - Credentials, broker address, and run configuration
//! - [message] - Message structures and delivery contracts
//! - [broker] - Broker seam and the in-memory broker
//! - [connection] - Connection lifecycle
//! - [session] - Sessions, destinations, transactions
//! - [producer] / [consumer] - The two ends of the queue

// Module declarations
pub mod broker;
pub mod config;
pub mod connection;
pub mod consumer;
pub mod error;
pub mod message;
pub mod producer;
pub mod session;

// Re-export commonly used types at crate root for convenience
pub use broker::{Broker, ConnectionId, InMemoryBroker};
pub use config::{
    BrokerUrl, ClientConfig, Credentials, DEFAULT_BROKER_URL, DEFAULT_QUEUE, DEFAULT_SEND_COUNT,
};
pub use connection::Connection;
pub use consumer::Consumer;
pub use error::{
    ClientError, ConnectionError, DestinationError, ReceiveError, SendError, SessionError,
};
pub use message::{
    AcknowledgeMode, DeliveredMessage, DeliveryMode, MessageId, OutboundMessage, Payload, QueueName,
};
pub use producer::Producer;
pub use session::{Queue, Session};
