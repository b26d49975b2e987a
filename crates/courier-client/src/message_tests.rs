//! Tests for message types.

use super::*;
use crate::error::{DestinationError, ReceiveError};

#[test]
fn test_queue_name_rejects_empty() {
    let result = QueueName::new(String::new());
    assert!(matches!(result, Err(DestinationError::EmptyName)));
}

#[test]
fn test_queue_name_round_trips() {
    let name = QueueName::new("queue1".to_string()).unwrap();
    assert_eq!(name.as_str(), "queue1");
    assert_eq!(name.to_string(), "queue1");

    let parsed: QueueName = "queue1".parse().unwrap();
    assert_eq!(parsed, name);
}

#[test]
fn test_message_ids_are_unique() {
    assert_ne!(MessageId::new(), MessageId::new());
}

#[test]
fn test_outbound_message_defaults_and_builder() {
    let message = OutboundMessage::text("hello 3");
    assert_eq!(message.payload().as_text(), Some("hello 3"));
    assert_eq!(message.delivery_mode(), DeliveryMode::NonPersistent);

    let message = message.with_delivery_mode(DeliveryMode::Persistent);
    assert_eq!(message.delivery_mode(), DeliveryMode::Persistent);
}

#[test]
fn test_delivered_text_decodes_text_payload() {
    let delivered = DeliveredMessage::new(
        MessageId::new(),
        Payload::Text("hello 3".to_string()),
        DeliveryMode::NonPersistent,
        chrono::Utc::now(),
        1,
    );
    assert_eq!(delivered.text().unwrap(), "hello 3");
}

#[test]
fn test_delivered_text_rejects_bytes_payload() {
    let delivered = DeliveredMessage::new(
        MessageId::new(),
        Payload::Bytes(bytes::Bytes::from_static(&[0xde, 0xad])),
        DeliveryMode::NonPersistent,
        chrono::Utc::now(),
        1,
    );
    let error = delivered.text().unwrap_err();
    assert!(matches!(error, ReceiveError::MalformedMessage { .. }));
}

#[test]
fn test_ack_mode_auto_acknowledge() {
    assert!(AcknowledgeMode::Auto.auto_acknowledge());
    assert!(AcknowledgeMode::DupsOk.auto_acknowledge());
    assert!(!AcknowledgeMode::Client.auto_acknowledge());
}
