//! Index service configuration loaded from environment variables.

use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::{Error, Result};

/// Default index name.
pub const DEFAULT_INDEX: &str = "photos";

/// Default signing region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Signing name of the managed search service.
pub const DEFAULT_SERVICE: &str = "es";

/// Default per-call timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the remote index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Base URL of the index service, without trailing slash.
    pub endpoint: String,

    /// Index holding photo documents.
    pub index: String,

    /// Region used for request signing and AWS clients.
    pub region: String,

    /// Service name used for request signing.
    pub service: String,

    /// Timeout applied to each external call on its own.
    pub timeout: Duration,
}

impl IndexConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ES_ENDPOINT`: Index service base URL
    ///
    /// Optional:
    /// - `ES_INDEX`: Index name (default: "photos")
    /// - `AWS_REGION`: Signing region (default: "us-east-1")
    /// - `ES_SERVICE`: Signing service name (default: "es")
    /// - `SNAPSEEK_TIMEOUT_SECS`: Per-call timeout (default: 10)
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("ES_ENDPOINT")
            .map_err(|_| Error::Config("ES_ENDPOINT environment variable is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        if endpoint.is_empty() {
            return Err(Error::Config("ES_ENDPOINT must not be empty".to_string()));
        }

        let index = std::env::var("ES_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        let service = std::env::var("ES_SERVICE").unwrap_or_else(|_| DEFAULT_SERVICE.to_string());

        let timeout_secs = match std::env::var("SNAPSEEK_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("SNAPSEEK_TIMEOUT_SECS must be an integer, got '{raw}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        tracing::info!(
            endpoint = %endpoint,
            index = %index,
            region = %region,
            service = %service,
            timeout_secs,
            "index configuration loaded"
        );

        Ok(Self {
            endpoint,
            index,
            region,
            service,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Build the shared AWS SDK configuration.
///
/// Every SDK operation (label detection, metadata reads, NLU calls) gets the
/// same per-call timeout as the index client.
pub async fn aws_sdk_config(config: &IndexConfig) -> SdkConfig {
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(config.timeout)
        .build();

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .timeout_config(timeouts)
        .load()
        .await
}
