//! In-memory broker implementation for testing and development.
//!
//! Behaves like a single-process point-to-point broker:
//! - FIFO delivery per queue
//! - blocking consume with no timeout, woken by arrivals
//! - client-acknowledge mode with requeue of unsettled deliveries on detach
//! - optional credential check on attach
//!
//! [`InMemoryBroker::shut_down`] lets attached consumers drain whatever is
//! already enqueued and then observe the end-of-stream sentinel.

use crate::broker::{Broker, ConnectionId};
use crate::config::{BrokerUrl, Credentials};
use crate::error::{ConnectionError, ReceiveError, SendError};
use crate::message::{
    AcknowledgeMode, DeliveredMessage, DeliveryMode, MessageId, OutboundMessage, Payload, QueueName,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::Notify;
use tracing::debug;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

/// A message held by the broker with its delivery metadata
#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: MessageId,
    payload: Payload,
    delivery_mode: DeliveryMode,
    enqueued_at: DateTime<Utc>,
    delivery_tag: u64,
}

impl StoredMessage {
    fn from_outbound(message: OutboundMessage, delivery_tag: u64) -> Self {
        Self {
            message_id: message.message_id().clone(),
            payload: message.payload().clone(),
            delivery_mode: message.delivery_mode(),
            enqueued_at: Utc::now(),
            delivery_tag,
        }
    }

    fn delivered(&self) -> DeliveredMessage {
        DeliveredMessage::new(
            self.message_id.clone(),
            self.payload.clone(),
            self.delivery_mode,
            self.enqueued_at,
            self.delivery_tag,
        )
    }
}

/// A delivery awaiting explicit acknowledgment
#[derive(Debug)]
struct InFlightMessage {
    connection: ConnectionId,
    message: StoredMessage,
}

/// Per-queue state
#[derive(Debug, Default)]
struct QueueState {
    /// Pending messages in FIFO order
    messages: VecDeque<StoredMessage>,
    /// Deliveries waiting for a client acknowledge, keyed by delivery tag
    in_flight: HashMap<u64, InFlightMessage>,
}

/// Shared broker state behind one lock
#[derive(Debug, Default)]
struct BrokerState {
    queues: HashMap<QueueName, QueueState>,
    connections: HashSet<ConnectionId>,
    shut_down: bool,
    next_delivery_tag: u64,
}

/// Single-process broker backed by per-queue FIFO buffers
#[derive(Debug, Default)]
pub struct InMemoryBroker {
    state: Mutex<BrokerState>,
    arrivals: Notify,
    expected_credentials: Option<Credentials>,
}

impl InMemoryBroker {
    /// Create a broker that accepts any credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broker that rejects any credentials other than `expected`
    pub fn with_credentials(expected: Credentials) -> Self {
        Self {
            expected_credentials: Some(expected),
            ..Self::default()
        }
    }

    /// Stop accepting new connections and publishes.
    ///
    /// Consumers keep draining messages already enqueued; once a queue is
    /// empty they observe the end-of-stream sentinel instead of blocking.
    pub fn shut_down(&self) {
        let mut state = self.lock_state();
        state.shut_down = true;
        drop(state);
        self.arrivals.notify_waiters();
        debug!("broker shut down");
    }

    /// Number of pending messages on a queue
    pub fn queue_depth(&self, queue: &QueueName) -> usize {
        let state = self.lock_state();
        state.queues.get(queue).map_or(0, |q| q.messages.len())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BrokerState> {
        // Recover from poisoning; broker state stays usable for teardown
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn attach(
        &self,
        credentials: &Credentials,
        address: &BrokerUrl,
    ) -> Result<ConnectionId, ConnectionError> {
        if let Some(expected) = &self.expected_credentials {
            if credentials != expected {
                return Err(ConnectionError::AuthenticationRejected {
                    username: credentials.username().to_string(),
                });
            }
        }

        let mut state = self.lock_state();
        if state.shut_down {
            return Err(ConnectionError::Unreachable {
                address: address.to_string(),
            });
        }

        let id = ConnectionId::new();
        state.connections.insert(id.clone());
        debug!(connection = %id, address = %address, "connection attached");
        Ok(id)
    }

    async fn detach(&self, connection: &ConnectionId) -> Result<(), ConnectionError> {
        let mut state = self.lock_state();
        if !state.connections.remove(connection) {
            return Ok(());
        }

        // Unsettled deliveries return to the head of their queue in tag order
        for queue_state in state.queues.values_mut() {
            let mut returned: Vec<u64> = queue_state
                .in_flight
                .iter()
                .filter(|(_, in_flight)| in_flight.connection == *connection)
                .map(|(tag, _)| *tag)
                .collect();
            returned.sort_unstable();
            for tag in returned.into_iter().rev() {
                if let Some(in_flight) = queue_state.in_flight.remove(&tag) {
                    queue_state.messages.push_front(in_flight.message);
                }
            }
        }
        drop(state);

        self.arrivals.notify_waiters();
        debug!(connection = %connection, "connection detached");
        Ok(())
    }

    async fn publish(
        &self,
        queue: &QueueName,
        message: OutboundMessage,
    ) -> Result<MessageId, SendError> {
        let mut state = self.lock_state();
        if state.shut_down {
            return Err(SendError::Transport {
                message: "broker is shut down".to_string(),
            });
        }

        state.next_delivery_tag += 1;
        let tag = state.next_delivery_tag;
        let stored = StoredMessage::from_outbound(message, tag);
        let message_id = stored.message_id.clone();
        state
            .queues
            .entry(queue.clone())
            .or_default()
            .messages
            .push_back(stored);
        drop(state);

        self.arrivals.notify_waiters();
        Ok(message_id)
    }

    async fn consume(
        &self,
        connection: &ConnectionId,
        queue: &QueueName,
        ack_mode: AcknowledgeMode,
    ) -> Result<Option<DeliveredMessage>, ReceiveError> {
        loop {
            // Register for wakeups before inspecting state so an arrival
            // between the check and the await is not lost
            let arrival = self.arrivals.notified();

            {
                let mut state = self.lock_state();

                // A torn-down connection reads as end-of-stream
                if !state.connections.contains(connection) {
                    return Ok(None);
                }

                let queue_state = state.queues.entry(queue.clone()).or_default();
                if let Some(stored) = queue_state.messages.pop_front() {
                    let delivered = stored.delivered();
                    if !ack_mode.auto_acknowledge() {
                        queue_state.in_flight.insert(
                            stored.delivery_tag,
                            InFlightMessage {
                                connection: connection.clone(),
                                message: stored,
                            },
                        );
                    }
                    return Ok(Some(delivered));
                }

                if state.shut_down {
                    return Ok(None);
                }
            }

            arrival.await;
        }
    }

    async fn acknowledge(
        &self,
        connection: &ConnectionId,
        queue: &QueueName,
        up_to_tag: u64,
    ) -> Result<(), ReceiveError> {
        let mut state = self.lock_state();
        if !state.connections.contains(connection) {
            return Err(ReceiveError::Transport {
                message: "connection is detached".to_string(),
            });
        }

        if let Some(queue_state) = state.queues.get_mut(queue) {
            queue_state.in_flight.retain(|tag, in_flight| {
                !(in_flight.connection == *connection && *tag <= up_to_tag)
            });
        }
        Ok(())
    }
}
