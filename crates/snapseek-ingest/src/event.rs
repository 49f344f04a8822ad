//! Storage event notifications.
//!
//! One notification carries a batch of records; each record names a bucket
//! and an object key. Keys arrive form-encoded and are decoded here, so the
//! rest of the pipeline only ever sees real object keys.
//!
//! Records that do not look like object notifications are kept as
//! [`EventRecord::Unrecognized`] instead of failing the whole batch.

use serde::Deserialize;
use serde_json::Value;
use snapseek_core::decode_event_key;

use crate::{Error, Result};

/// A batch of storage notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

impl StorageEvent {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One record of a storage event.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventRecord {
    Object(StorageRecord),
    Unrecognized(Value),
}

impl EventRecord {
    /// The object this record refers to, with its key decoded.
    pub fn object(&self) -> Result<ObjectRef> {
        match self {
            Self::Object(record) => record.object(),
            Self::Unrecognized(value) => Err(Error::InvalidRecord(truncate(&value.to_string()))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
}

impl StorageRecord {
    pub fn object(&self) -> Result<ObjectRef> {
        let bucket = self.s3.bucket.name.trim();
        if bucket.is_empty() {
            return Err(Error::InvalidRecord("empty bucket name".to_string()));
        }
        let key = decode_event_key(&self.s3.object.key);
        if key.is_empty() {
            return Err(Error::InvalidRecord("empty object key".to_string()));
        }
        Ok(ObjectRef {
            bucket: bucket.to_string(),
            key,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    /// Form-encoded key (`+` for space).
    pub key: String,
}

/// A decoded (bucket, key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

fn truncate(raw: &str) -> String {
    const MAX: usize = 200;
    match raw.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}
