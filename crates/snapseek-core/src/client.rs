//! Signed HTTP client for the remote index service.
//!
//! [`IndexClient::send`] serializes a JSON body, signs the request with
//! SigV4 through a [`SigV4Signer`], and returns the parsed JSON response.
//! Any transport failure, signing failure, or non-2xx status comes back as
//! an [`Error`] carrying the status and raw body when the service answered.
//!
//! Credentials are resolved on every call, never held across calls, so
//! rotated credentials are picked up by the next request.

use std::time::{Duration, Instant, SystemTime};

use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use metrics::{counter, histogram};
use reqwest::{Method, Url};
use serde_json::Value;

use crate::document::{PhotoDocument, encode_document_id};
use crate::{Error, IndexConfig, Result};

/// Request-signing strategy shared by both pipelines.
///
/// Parameterized by the service signing name and region. Holds a credentials
/// provider, not credentials.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: SharedCredentialsProvider,
    service: String,
    region: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: SharedCredentialsProvider,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            service: service.into(),
            region: region.into(),
        }
    }

    /// Build a signer from the ambient AWS configuration.
    pub fn from_sdk_config(sdk: &SdkConfig, config: &IndexConfig) -> Result<Self> {
        let credentials = sdk
            .credentials_provider()
            .ok_or_else(|| Error::Credentials("no credentials provider configured".to_string()))?;
        Ok(Self::new(credentials, &config.service, &config.region))
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Compute the signature headers for one request.
    ///
    /// `headers` are the headers that will be sent and must be covered by the
    /// signature. The returned headers are to be added to the request as-is.
    pub async fn sign(
        &self,
        method: &Method,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| Error::Credentials(e.to_string()))?;
        let identity: Identity = credentials.into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| Error::Signing(e.to_string()))?
            .into();

        let signable = SignableRequest::new(
            method.as_str(),
            url,
            headers.iter().copied(),
            SignableBody::Bytes(body),
        )
        .map_err(|e| Error::Signing(e.to_string()))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| Error::Signing(e.to_string()))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

/// Authenticated client for the index service.
#[derive(Debug, Clone)]
pub struct IndexClient {
    base_url: String,
    signer: SigV4Signer,
    http: reqwest::Client,
}

impl IndexClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, signer: SigV4Signer, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        tracing::info!(
            base_url = %base_url,
            service = %signer.service(),
            region = %signer.region(),
            timeout_ms = timeout.as_millis() as u64,
            "index client initialized"
        );

        Ok(Self {
            base_url,
            signer,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a signed request and parse the JSON response.
    ///
    /// `path` is rooted at the base URL and must start with `/`. A `None` body
    /// sends an empty payload. An empty 2xx response parses as `Value::Null`.
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        counter!("index_requests_total", "method" => method.to_string()).increment(1);

        let started = Instant::now();
        let result = self.send_inner(&method, path, body).await;
        histogram!("index_request_duration_seconds").record(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            counter!("index_request_errors_total", "method" => method.to_string()).increment(1);
            tracing::error!(
                method = %method,
                path = %path,
                status = ?e.status(),
                body = e.body().unwrap_or(""),
                error = %e,
                "index request failed"
            );
        }
        result
    }

    async fn send_inner(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Value> {
        if !path.starts_with('/') {
            return Err(Error::InvalidUrl(format!("path must start with '/': {path}")));
        }
        let url = format!("{}{}", self.base_url, path);
        Url::parse(&url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

        let payload = match body {
            Some(value) => serde_json::to_vec(value)?,
            None => Vec::new(),
        };

        let signed = self
            .signer
            .sign(method, &url, &[("content-type", "application/json")], &payload)
            .await?;

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in &signed {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.body(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(method = %method, path = %path, status = status.as_u16(), "index response");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Upsert a document at its deterministic identifier.
    pub async fn upsert(&self, index: &str, doc: &PhotoDocument) -> Result<Value> {
        let body = serde_json::to_value(doc)?;
        self.send(Method::PUT, &document_path(index, &doc.object_key), Some(&body))
            .await
    }

    /// Run a search request body against an index.
    pub async fn search(&self, index: &str, query: &Value) -> Result<Value> {
        self.send(Method::POST, &search_path(index), Some(query)).await
    }
}

/// `/{index}/_doc/{encoded key}`
pub fn document_path(index: &str, object_key: &str) -> String {
    format!("/{}/_doc/{}", index, encode_document_id(object_key))
}

/// `/{index}/_search`
pub fn search_path(index: &str) -> String {
    format!("/{index}/_search")
}
