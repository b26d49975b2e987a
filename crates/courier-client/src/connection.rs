//! Connection lifecycle.
//!
//! A connection is the single scoped resource of each process: opened once,
//! started before any session is created, and closed exactly once on every
//! exit path. Close never propagates an error to the caller — teardown
//! failures are logged so they cannot mask the failure that triggered the
//! teardown.

use crate::broker::{Broker, ConnectionId};
use crate::config::{BrokerUrl, Credentials};
use crate::error::{ConnectionError, SessionError};
use crate::message::AcknowledgeMode;
use crate::session::Session;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Unstarted,
    Started,
    Closed,
}

/// An authenticated link to the broker
pub struct Connection {
    broker: Arc<dyn Broker>,
    id: ConnectionId,
    address: BrokerUrl,
    state: ConnectionState,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Authenticate against the broker and open a connection.
    ///
    /// The connection starts out unstarted; call [`Connection::start`]
    /// before creating sessions.
    pub async fn open(
        broker: Arc<dyn Broker>,
        credentials: &Credentials,
        address: &BrokerUrl,
    ) -> Result<Self, ConnectionError> {
        let id = broker.attach(credentials, address).await?;
        debug!(connection = %id, address = %address, "connection opened");

        Ok(Self {
            broker,
            id,
            address: address.clone(),
            state: ConnectionState::Unstarted,
        })
    }

    /// Start message flow on the connection.
    ///
    /// Starting an already started connection is a no-op; starting a closed
    /// one is an error.
    pub fn start(&mut self) -> Result<(), ConnectionError> {
        match self.state {
            ConnectionState::Unstarted => {
                self.state = ConnectionState::Started;
                debug!(connection = %self.id, "connection started");
                Ok(())
            }
            ConnectionState::Started => Ok(()),
            ConnectionState::Closed => Err(ConnectionError::Closed),
        }
    }

    /// Create a session carrying the transaction flag and acknowledgment
    /// mode. Single attempt; fails if the connection is not started.
    pub fn create_session(
        &self,
        transacted: bool,
        ack_mode: AcknowledgeMode,
    ) -> Result<Session, SessionError> {
        match self.state {
            ConnectionState::Started => Ok(Session::new(
                Arc::clone(&self.broker),
                self.id.clone(),
                transacted,
                ack_mode,
            )),
            ConnectionState::Unstarted => Err(SessionError::NotStarted),
            ConnectionState::Closed => Err(SessionError::ConnectionClosed),
        }
    }

    /// Release the connection and everything it owns on the broker.
    ///
    /// Safe on a connection that failed mid-setup and on one that is
    /// already closed; repeated calls are no-ops. Teardown errors are
    /// logged, never raised.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;

        if let Err(error) = self.broker.detach(&self.id).await {
            warn!(connection = %self.id, %error, "error while closing connection");
        } else {
            debug!(connection = %self.id, "connection closed");
        }
    }

    /// Whether message flow has been started and the connection is open
    pub fn is_started(&self) -> bool {
        self.state == ConnectionState::Started
    }

    /// Broker address the connection was opened against
    pub fn address(&self) -> &BrokerUrl {
        &self.address
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Drop cannot await the detach; callers are expected to close
        if self.state != ConnectionState::Closed {
            warn!(connection = %self.id, "connection dropped without close");
        }
    }
}
