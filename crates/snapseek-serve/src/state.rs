//! Application state and configuration.

use std::sync::Arc;

use snapseek_core::{DEFAULT_URL_TEMPLATE, IndexClient, IndexConfig, SigV4Signer, aws_sdk_config};

use crate::intent::{IntentResolver, LexResolver};

/// Default NLU locale.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Default NLU session identifier.
pub const DEFAULT_SESSION_ID: &str = "snapseek";

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Index service location and signing parameters.
    pub index: IndexConfig,

    /// NLU bot identifier.
    pub bot_id: String,

    /// NLU bot alias identifier.
    pub bot_alias_id: String,

    /// NLU locale.
    pub locale_id: String,

    /// Session identifier sent with every NLU request.
    pub session_id: String,

    /// Public photo URL pattern with `{bucket}` and `{key}` placeholders.
    pub url_template: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ES_ENDPOINT`: Index service base URL (see [`IndexConfig::from_env`])
    /// - `BOT_ID`: NLU bot identifier
    /// - `BOT_ALIAS_ID`: NLU bot alias identifier
    ///
    /// Optional environment variables:
    /// - `SNAPSEEK_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `LEX_LOCALE_ID`: NLU locale (default: "en_US")
    /// - `LEX_SESSION_ID`: NLU session identifier (default: "snapseek")
    /// - `PHOTO_URL_TEMPLATE`: Public URL pattern
    ///   (default: "https://{bucket}.s3.amazonaws.com/{key}")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("SNAPSEEK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let index = IndexConfig::from_env()?;

        let bot_id = std::env::var("BOT_ID")
            .map_err(|_| anyhow::anyhow!("BOT_ID environment variable is required"))?;
        let bot_alias_id = std::env::var("BOT_ALIAS_ID")
            .map_err(|_| anyhow::anyhow!("BOT_ALIAS_ID environment variable is required"))?;

        let locale_id =
            std::env::var("LEX_LOCALE_ID").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());
        let session_id =
            std::env::var("LEX_SESSION_ID").unwrap_or_else(|_| DEFAULT_SESSION_ID.to_string());

        let url_template = std::env::var("PHOTO_URL_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_URL_TEMPLATE.to_string());
        if !url_template.contains("{key}") {
            anyhow::bail!("PHOTO_URL_TEMPLATE must contain a {{key}} placeholder");
        }

        tracing::info!(
            bind_addr = %bind_addr,
            bot_id = %bot_id,
            bot_alias_id = %bot_alias_id,
            locale_id = %locale_id,
            url_template = %url_template,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            index,
            bot_id,
            bot_alias_id,
            locale_id,
            session_id,
            url_template,
        })
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Signed client for the index service.
    pub index: IndexClient,

    /// Label extraction service (tier one of label extraction).
    pub resolver: Arc<dyn IntentResolver>,
}

impl AppState {
    pub fn new(config: Config, index: IndexClient, resolver: Arc<dyn IntentResolver>) -> Self {
        Self {
            config: Arc::new(config),
            index,
            resolver,
        }
    }

    /// Build the state with the ambient AWS configuration.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let sdk = aws_sdk_config(&config.index).await;
        let signer = SigV4Signer::from_sdk_config(&sdk, &config.index)?;
        let index = IndexClient::new(&config.index.endpoint, signer, config.index.timeout)?;

        let resolver = LexResolver::new(
            aws_sdk_lexruntimev2::Client::new(&sdk),
            &config.bot_id,
            &config.bot_alias_id,
            &config.locale_id,
            &config.session_id,
        );

        Ok(Self::new(config, index, Arc::new(resolver)))
    }
}
