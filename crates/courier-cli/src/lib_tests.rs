//! Tests for the courier CLI.

use super::*;
use clap::Parser;

fn test_config() -> ClientConfig {
    ClientConfig {
        broker_url: BrokerUrl::parse("mem://local").unwrap(),
        queue: QueueName::new("queue1".to_string()).unwrap(),
        ..ClientConfig::default()
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_parse_produce_defaults() {
    let cli = Cli::try_parse_from(["courier", "produce"]).unwrap();
    assert_eq!(cli.broker, "mem://local");
    assert_eq!(cli.queue, "queue1");
    assert!(!cli.transacted);
    assert_eq!(cli.ack_mode, AckModeArg::Auto);
    assert_eq!(cli.delivery_mode, DeliveryModeArg::NonPersistent);

    match cli.command {
        Commands::Produce { count, label } => {
            assert_eq!(count, 10);
            assert_eq!(label, "hello");
        }
        _ => panic!("expected produce command"),
    }
}

#[test]
fn test_parse_mode_flags() {
    let cli = Cli::try_parse_from([
        "courier",
        "--transacted",
        "--ack-mode",
        "dups-ok",
        "--delivery-mode",
        "persistent",
        "consume",
    ])
    .unwrap();

    assert!(cli.transacted);
    assert_eq!(cli.ack_mode, AckModeArg::DupsOk);
    assert_eq!(cli.delivery_mode, DeliveryModeArg::Persistent);
    assert!(matches!(cli.command, Commands::Consume));
}

#[test]
fn test_client_config_rejects_bad_broker_url() {
    let cli = Cli::try_parse_from(["courier", "--broker", "ftp://elsewhere", "consume"]).unwrap();
    let error = cli.client_config().unwrap_err();
    assert!(matches!(error, CliError::Client(_)));
}

#[test]
fn test_client_config_carries_credentials_and_queue() {
    let cli = Cli::try_parse_from([
        "courier",
        "--username",
        "admin",
        "--password",
        "admin",
        "--queue",
        "orders",
        "produce",
    ])
    .unwrap();
    let config = cli.client_config().unwrap();

    assert_eq!(config.credentials, Credentials::new("admin", "admin"));
    assert_eq!(config.queue.as_str(), "orders");
}

#[test]
fn test_unsupported_transport_is_reported() {
    let config = ClientConfig {
        broker_url: BrokerUrl::parse("tcp://localhost:61616").unwrap(),
        ..ClientConfig::default()
    };
    let error = broker_for(&config).unwrap_err();
    assert!(matches!(
        error,
        CliError::UnsupportedTransport { scheme } if scheme == "tcp"
    ));
}

// ============================================================================
// End-to-end runs against the in-memory broker
// ============================================================================

#[tokio::test]
async fn test_produce_publishes_the_batch() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut config = test_config();
    config.send_count = 4;

    run_produce(Arc::clone(&broker), &config, "hello").await.unwrap();
    assert_eq!(broker.queue_depth(&config.queue), 4);
}

#[tokio::test]
async fn test_produce_zero_publishes_nothing() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut config = test_config();
    config.send_count = 0;

    run_produce(Arc::clone(&broker), &config, "hello").await.unwrap();
    assert_eq!(broker.queue_depth(&config.queue), 0);
}

#[tokio::test]
async fn test_demo_round_trips_the_batch() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut config = test_config();
    config.send_count = 10;

    let received = run_demo(broker, &config, "hello").await.unwrap();
    assert_eq!(received, 10);
}

#[tokio::test]
async fn test_demo_with_transacted_session_commits() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut config = test_config();
    config.send_count = 3;
    config.transacted = true;

    let received = run_demo(broker, &config, "hello").await.unwrap();
    assert_eq!(received, 3);
}

#[tokio::test]
async fn test_demo_with_client_ack() {
    let broker = Arc::new(InMemoryBroker::new());
    let mut config = test_config();
    config.send_count = 2;
    config.ack_mode = AcknowledgeMode::Client;

    let received = run_demo(Arc::clone(&broker), &config, "hello").await.unwrap();
    assert_eq!(received, 2);
    // Everything was acknowledged before the consumer detached
    assert_eq!(broker.queue_depth(&config.queue), 0);
}

#[tokio::test]
async fn test_consume_reports_client_errors() {
    let broker = Arc::new(InMemoryBroker::with_credentials(Credentials::new(
        "admin", "admin",
    )));
    let config = test_config();

    let error = run_consume(broker, &config).await.unwrap_err();
    assert!(matches!(error, CliError::Client(ClientError::Connection(_))));
}
