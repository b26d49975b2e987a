//! Client configuration.
//!
//! All knobs the sample exposes live on one explicit [`ClientConfig`]
//! constructed at process start and passed into the components that need
//! it. There is no process-wide singleton.

use crate::error::ConnectionError;
use crate::message::{AcknowledgeMode, DeliveryMode, QueueName};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default broker endpoint, matching the broker's documented listener
pub const DEFAULT_BROKER_URL: &str = "tcp://localhost:61616";

/// Default queue shared by the producer/consumer pair
pub const DEFAULT_QUEUE: &str = "queue1";

/// Default batch size for a producer run
pub const DEFAULT_SEND_COUNT: u32 = 10;

/// URL schemes the client recognizes
const SUPPORTED_SCHEMES: &[&str] = &["tcp", "mem"];

/// Broker credentials, injected at startup and never persisted
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials for a named user
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The broker's documented anonymous credentials
    pub fn anonymous() -> Self {
        Self::new("", "")
    }

    /// Get username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated broker endpoint address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrokerUrl(Url);

impl BrokerUrl {
    /// Parse and validate a broker address
    pub fn parse(address: &str) -> Result<Self, ConnectionError> {
        let url = Url::parse(address).map_err(|e| ConnectionError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(ConnectionError::InvalidAddress {
                address: address.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if url.host_str().is_none() {
            return Err(ConnectionError::InvalidAddress {
                address: address.to_string(),
                message: "missing host".to_string(),
            });
        }

        Ok(Self(url))
    }

    /// Transport scheme of the address
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Get underlying URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl std::fmt::Display for BrokerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BrokerUrl {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BrokerUrl {
    type Error = ConnectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BrokerUrl> for String {
    fn from(value: BrokerUrl) -> Self {
        value.0.to_string()
    }
}

/// Configuration for one producer or consumer run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub broker_url: BrokerUrl,
    pub credentials: Credentials,
    pub queue: QueueName,
    pub transacted: bool,
    pub ack_mode: AcknowledgeMode,
    pub delivery_mode: DeliveryMode,
    pub send_count: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            broker_url: BrokerUrl::parse(DEFAULT_BROKER_URL)
                .unwrap_or_else(|_| unreachable!("default broker URL is valid")),
            credentials: Credentials::anonymous(),
            queue: QueueName::new(DEFAULT_QUEUE.to_string())
                .unwrap_or_else(|_| unreachable!("default queue name is valid")),
            transacted: false,
            ack_mode: AcknowledgeMode::Auto,
            delivery_mode: DeliveryMode::NonPersistent,
            send_count: DEFAULT_SEND_COUNT,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
