//! Shared building blocks for the snapseek photo search system.
//!
//! This crate provides:
//! - The photo data model ([`LabelSet`], [`PhotoDocument`], [`SearchResult`])
//!   and object-key encoding helpers
//! - The signed index client ([`IndexClient`], [`SigV4Signer`])
//! - Index service configuration ([`IndexConfig`])
//! - Prometheus metrics helpers
//! - Shared error types
//!
//! Both pipelines talk to the index only through [`IndexClient`]:
//!
//! ```text
//!  snapseek-ingest ──┐
//!                    ├──► IndexClient ──(SigV4)──► index service
//!  snapseek-serve ───┘
//! ```

pub mod client;
mod config;
pub mod document;
mod error;
pub mod metrics;

pub use client::{IndexClient, SigV4Signer, document_path, search_path};
pub use config::{
    DEFAULT_INDEX, DEFAULT_REGION, DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS, IndexConfig,
    aws_sdk_config,
};
pub use document::{
    DEFAULT_URL_TEMPLATE, LabelSet, PhotoDocument, SearchResult, decode_event_key,
    encode_document_id, encode_url_path, render_object_url,
};
pub use error::{Error, Result};
