//! # Courier CLI
//!
//! Command line for the courier producer/consumer pair.
//!
//! This module provides:
//! - `produce` - publish a bounded batch of text messages to the queue
//! - `consume` - drain the queue, printing each message until the broker
//!   signals end-of-stream
//! - `demo` - run both ends against one in-memory broker in a single
//!   process
//!
//! The producer and consumer rendezvous only through broker state; in
//! `demo` they run as separate tasks sharing nothing but the broker, the
//! way the two standalone subcommands share nothing but the external
//! broker process.

use clap::{Parser, Subcommand, ValueEnum};
use courier_client::{
    AcknowledgeMode, Broker, BrokerUrl, ClientConfig, ClientError, Connection, Credentials,
    DeliveryMode, InMemoryBroker, QueueName, DEFAULT_SEND_COUNT,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// ============================================================================
// CLI Structure
// ============================================================================

/// Courier - point-to-point messaging sample client
#[derive(Parser)]
#[command(name = "courier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Producer/consumer pair for a point-to-point message queue")]
pub struct Cli {
    /// Broker address
    #[arg(long, env = "COURIER_BROKER", default_value = "mem://local")]
    pub broker: String,

    /// Broker username
    #[arg(long, env = "COURIER_USERNAME", default_value = "")]
    pub username: String,

    /// Broker password
    #[arg(long, env = "COURIER_PASSWORD", default_value = "")]
    pub password: String,

    /// Queue shared by the producer/consumer pair
    #[arg(short, long, env = "COURIER_QUEUE", default_value = "queue1")]
    pub queue: String,

    /// Use a transacted session (sends become visible on commit)
    #[arg(long)]
    pub transacted: bool,

    /// Acknowledgment mode for the session
    #[arg(long, value_enum, default_value_t = AckModeArg::Auto)]
    pub ack_mode: AckModeArg,

    /// Delivery mode attached to produced messages
    #[arg(long, value_enum, default_value_t = DeliveryModeArg::NonPersistent)]
    pub delivery_mode: DeliveryModeArg,

    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Publish a batch of text messages to the queue
    Produce {
        /// Number of messages to send
        #[arg(short, long, default_value_t = 10)]
        count: u32,

        /// Label prefixed to each message body
        #[arg(long, default_value = "hello")]
        label: String,
    },

    /// Drain the queue, printing each message until end-of-stream.
    ///
    /// The receive has no timeout: on a live queue with no end-of-stream
    /// signal this blocks until the process is interrupted.
    Consume,

    /// Run producer and consumer against one in-memory broker
    Demo {
        /// Number of messages to send
        #[arg(short, long, default_value_t = 10)]
        count: u32,

        /// Label prefixed to each message body
        #[arg(long, default_value = "hello")]
        label: String,
    },
}

/// Acknowledgment mode options
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AckModeArg {
    /// Broker settles each delivery automatically
    Auto,
    /// Consumer acknowledges explicitly
    Client,
    /// Lazy settlement, duplicates tolerated
    DupsOk,
}

impl From<AckModeArg> for AcknowledgeMode {
    fn from(value: AckModeArg) -> Self {
        match value {
            AckModeArg::Auto => Self::Auto,
            AckModeArg::Client => Self::Client,
            AckModeArg::DupsOk => Self::DupsOk,
        }
    }
}

/// Delivery mode options
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeliveryModeArg {
    /// Broker must survive a restart without losing the message
    Persistent,
    /// Best-effort delivery
    NonPersistent,
}

impl From<DeliveryModeArg> for DeliveryMode {
    fn from(value: DeliveryModeArg) -> Self {
        match value {
            DeliveryModeArg::Persistent => Self::Persistent,
            DeliveryModeArg::NonPersistent => Self::NonPersistent,
        }
    }
}

impl Cli {
    /// Build the client configuration from the parsed arguments
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        let broker_url = BrokerUrl::parse(&self.broker).map_err(ClientError::from)?;
        let queue = QueueName::new(self.queue.clone()).map_err(ClientError::from)?;

        Ok(ClientConfig {
            broker_url,
            credentials: Credentials::new(self.username.clone(), self.password.clone()),
            queue,
            transacted: self.transacted,
            ack_mode: self.ack_mode.into(),
            delivery_mode: self.delivery_mode.into(),
            send_count: DEFAULT_SEND_COUNT,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Top-level CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Unsupported transport '{scheme}': only the in-memory broker is bundled")]
    UnsupportedTransport { scheme: String },

    #[error("Task failed: {message}")]
    Task { message: String },
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments and execute the selected command
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    let mut config = cli.client_config()?;
    match cli.command {
        Commands::Produce { count, label } => {
            config.send_count = count;
            let broker = broker_for(&config)?;
            run_produce(broker, &config, &label).await
        }
        Commands::Consume => {
            let broker = broker_for(&config)?;
            let received = run_consume(broker, &config).await?;
            info!(received, "consumer finished");
            Ok(())
        }
        Commands::Demo { count, label } => {
            config.send_count = count;
            let broker = broker_for(&config)?;
            let received = run_demo(broker, &config, &label).await?;
            info!(sent = count, received, "demo finished");
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str, json_logs: bool) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(log_level).map_err(|e| CliError::InvalidArgument {
        message: format!("invalid log level '{log_level}': {e}"),
    })?;

    if json_logs {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
    Ok(())
}

/// Resolve the broker implementation for the configured address
fn broker_for(config: &ClientConfig) -> Result<Arc<InMemoryBroker>, CliError> {
    match config.broker_url.scheme() {
        "mem" => Ok(Arc::new(InMemoryBroker::new())),
        other => Err(CliError::UnsupportedTransport {
            scheme: other.to_string(),
        }),
    }
}

// ============================================================================
// Producer / consumer runs
// ============================================================================

/// Open a connection, publish the configured batch, and close the
/// connection on every exit path
pub async fn run_produce(
    broker: Arc<InMemoryBroker>,
    config: &ClientConfig,
    label: &str,
) -> Result<(), CliError> {
    let mut connection = Connection::open(
        broker as Arc<dyn Broker>,
        &config.credentials,
        &config.broker_url,
    )
    .await
    .map_err(ClientError::from)?;

    // Close runs whether the batch succeeded or not; close errors are
    // logged inside and never replace the batch outcome
    let outcome = produce_batch(&mut connection, config, label).await;
    connection.close().await;
    outcome.map_err(CliError::from)
}

async fn produce_batch(
    connection: &mut Connection,
    config: &ClientConfig,
    label: &str,
) -> Result<(), ClientError> {
    connection.start()?;
    let mut session = connection.create_session(config.transacted, config.ack_mode)?;
    let queue = session.queue(config.queue.as_str())?;
    let mut producer = session.create_producer(&queue)?;
    producer.set_delivery_mode(config.delivery_mode);

    producer
        .send_batch(&mut session, label, config.send_count)
        .await?;
    if config.transacted {
        session.commit().await?;
    }

    info!(count = config.send_count, queue = %queue.name(), "batch published");
    Ok(())
}

/// Open a connection, drain the queue printing each message, and close the
/// connection on every exit path. Returns the number of messages printed.
pub async fn run_consume(
    broker: Arc<InMemoryBroker>,
    config: &ClientConfig,
) -> Result<u64, CliError> {
    let mut connection = Connection::open(
        broker as Arc<dyn Broker>,
        &config.credentials,
        &config.broker_url,
    )
    .await
    .map_err(ClientError::from)?;

    let outcome = consume_all(&mut connection, config).await;
    connection.close().await;
    outcome.map_err(CliError::from)
}

async fn consume_all(
    connection: &mut Connection,
    config: &ClientConfig,
) -> Result<u64, ClientError> {
    connection.start()?;
    let session = connection.create_session(config.transacted, config.ack_mode)?;
    let queue = session.queue(config.queue.as_str())?;
    let mut consumer = session.create_consumer(&queue)?;

    let received = consumer.drain(|body| println!("{body}")).await?;
    if config.ack_mode == AcknowledgeMode::Client {
        consumer.acknowledge().await?;
    }

    info!(received, queue = %queue.name(), "queue drained");
    Ok(received)
}

/// Run the full rendezvous in one process: a consumer task drains while
/// the producer publishes its batch, then the broker shuts down and the
/// consumer reports how many messages it printed.
pub async fn run_demo(
    broker: Arc<InMemoryBroker>,
    config: &ClientConfig,
    label: &str,
) -> Result<u64, CliError> {
    // Attach the consumer before producing so it cannot miss the stream
    let mut consuming = Connection::open(
        Arc::clone(&broker) as Arc<dyn Broker>,
        &config.credentials,
        &config.broker_url,
    )
    .await
    .map_err(ClientError::from)?;

    let consumer_config = config.clone();
    let drain_task = tokio::spawn(async move {
        let outcome = consume_all(&mut consuming, &consumer_config).await;
        consuming.close().await;
        outcome
    });

    run_produce(Arc::clone(&broker), config, label).await?;
    broker.shut_down();

    let received = drain_task
        .await
        .map_err(|e| CliError::Task {
            message: e.to_string(),
        })?
        .map_err(CliError::from)?;
    Ok(received)
}
