//! Error types for client operations.
//!
//! One enum per failure category: connection setup, session creation,
//! destination resolution, send path, receive path. `ClientError` is the
//! umbrella the binaries handle at their single top-level handler.

use thiserror::Error;

/// Errors establishing or tearing down a broker connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid broker address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Broker at '{address}' is unreachable")]
    Unreachable { address: String },

    #[error("Broker rejected credentials for user '{username}'")]
    AuthenticationRejected { username: String },

    #[error("Connection is closed")]
    Closed,
}

/// Errors creating a session on a connection
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connection has not been started")]
    NotStarted,

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Session is closed")]
    Closed,
}

/// Errors resolving a queue name to a destination
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("Queue name must not be empty")]
    EmptyName,

    #[error("Cannot resolve '{name}' on a closed session")]
    SessionClosed { name: String },
}

/// Errors on the send path
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Cannot send on a closed session")]
    SessionClosed,

    #[error("Transport failure while sending: {message}")]
    Transport { message: String },
}

/// Errors on the receive path
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("Message '{message_id}' does not carry a text payload")]
    MalformedMessage { message_id: String },

    #[error("Transport failure while receiving: {message}")]
    Transport { message: String },
}

/// Umbrella error for all client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Receive error: {0}")]
    Receive(#[from] ReceiveError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
