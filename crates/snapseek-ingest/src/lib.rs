//! snapseek ingestion pipeline.
//!
//! Turns storage upload notifications into photo documents in the search
//! index.
//!
//! # Modules
//!
//! - [`event`] - Storage notification parsing and key decoding
//! - [`labels`] - Label sources (image recognition, custom metadata)
//! - [`pipeline`] - Label fusion and per-record upsert
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Storage event   │  batch of (bucket, encoded key)
//! └────────┬─────────┘
//!          │  one record at a time
//!          ▼
//! ┌──────────────────┐
//! │   LabelSources   │  detector + metadata, each degrades to empty
//! └────────┬─────────┘
//!          │  union, sorted
//!          ▼
//! ┌──────────────────┐
//! │  PhotoDocument   │  keyed by percent-encoded object key
//! └────────┬─────────┘
//!          │  signed PUT
//!          ▼
//! ┌──────────────────┐
//! │   IndexClient    │  upsert; failure skips this record only
//! └──────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod labels;
pub mod pipeline;

pub use error::{Error, Result};
pub use event::{EventRecord, ObjectRef, StorageEvent, StorageRecord};
pub use labels::{
    CUSTOM_LABELS_FIELD, DetectorConfig, DetectorSource, LabelSource, MetadataSource,
    parse_custom_labels,
};
pub use pipeline::{BatchReport, Ingestor};
