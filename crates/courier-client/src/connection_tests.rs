//! Tests for connection lifecycle.

use super::*;
use crate::broker::InMemoryBroker;
use crate::error::{ConnectionError, SessionError};
use crate::message::AcknowledgeMode;

fn mem_url() -> BrokerUrl {
    BrokerUrl::parse("mem://local").unwrap()
}

async fn open(broker: &Arc<InMemoryBroker>) -> Connection {
    Connection::open(
        Arc::clone(broker) as Arc<dyn Broker>,
        &Credentials::anonymous(),
        &mem_url(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_open_fails_on_rejected_credentials() {
    let broker: Arc<dyn Broker> =
        Arc::new(InMemoryBroker::with_credentials(Credentials::new("admin", "admin")));

    let error = Connection::open(broker, &Credentials::anonymous(), &mem_url())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ConnectionError::AuthenticationRejected { .. }
    ));
}

#[tokio::test]
async fn test_session_requires_started_connection() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut connection = open(&broker).await;

    let error = connection
        .create_session(false, AcknowledgeMode::Auto)
        .unwrap_err();
    assert!(matches!(error, SessionError::NotStarted));

    connection.start().unwrap();
    assert!(connection
        .create_session(false, AcknowledgeMode::Auto)
        .is_ok());

    connection.close().await;
}

#[tokio::test]
async fn test_start_is_idempotent_until_closed() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut connection = open(&broker).await;

    connection.start().unwrap();
    connection.start().unwrap();
    assert!(connection.is_started());

    connection.close().await;
    let error = connection.start().unwrap_err();
    assert!(matches!(error, ConnectionError::Closed));
}

#[tokio::test]
async fn test_close_is_safe_on_never_started_connection() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut connection = open(&broker).await;

    // Never started; close must not raise
    connection.close().await;
}

#[tokio::test]
async fn test_close_twice_is_a_no_op() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut connection = open(&broker).await;
    connection.start().unwrap();

    connection.close().await;
    connection.close().await;
    assert!(!connection.is_started());
}

#[tokio::test]
async fn test_session_creation_fails_on_closed_connection() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut connection = open(&broker).await;
    connection.start().unwrap();
    connection.close().await;

    let error = connection
        .create_session(false, AcknowledgeMode::Auto)
        .unwrap_err();
    assert!(matches!(error, SessionError::ConnectionClosed));
}
