//! Photo documents, label sets, and key encoding.
//!
//! A [`PhotoDocument`] is rebuilt from scratch on every ingestion event and
//! upserted at an identifier derived only from its object key, so indexing
//! the same object twice overwrites the earlier document.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left untouched when encoding a document identifier.
/// Only RFC 3986 unreserved characters survive; `/` is encoded.
const DOCUMENT_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`DOCUMENT_ID`] but keeps `/` so keys stay readable as URL paths.
const URL_PATH: &AsciiSet = &DOCUMENT_ID.remove(b'/');

/// Default public URL pattern for stored photos.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{bucket}.s3.amazonaws.com/{key}";

/// A deduplicated set of lowercase labels.
///
/// Entries are trimmed and lowercased on insert, and blank entries are
/// dropped. Iteration and serialization are in sorted order so that the
/// document body is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, normalizing it first. Returns `false` if the label was
    /// blank or already present.
    pub fn insert(&mut self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return false;
        }
        self.0.insert(label)
    }

    /// Set union, consuming `other`.
    pub fn union(mut self, other: LabelSet) -> LabelSet {
        self.0.extend(other.0);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    /// Labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label.as_ref());
        }
        set
    }
}

/// One indexed photo, as stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    /// Decoded object key inside the bucket.
    pub object_key: String,

    /// Storage bucket name.
    pub bucket: String,

    /// When the document was built (indexing time, not upload time).
    #[serde(with = "iso8601")]
    pub created_timestamp: DateTime<Utc>,

    /// Union of detected and custom labels.
    pub labels: LabelSet,
}

impl PhotoDocument {
    /// Build a document stamped with the current UTC time.
    pub fn new(bucket: impl Into<String>, object_key: impl Into<String>, labels: LabelSet) -> Self {
        Self::with_timestamp(bucket, object_key, labels, Utc::now())
    }

    pub fn with_timestamp(
        bucket: impl Into<String>,
        object_key: impl Into<String>,
        labels: LabelSet,
        created_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            object_key: object_key.into(),
            bucket: bucket.into(),
            created_timestamp,
            labels,
        }
    }

    /// Index identifier for this document.
    pub fn document_id(&self) -> String {
        encode_document_id(&self.object_key)
    }
}

/// Public view of an index hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub object_key: String,
    pub bucket: String,
    pub labels: Vec<String>,
    pub url: String,
}

/// Percent-encode an object key for use as a single path segment.
pub fn encode_document_id(key: &str) -> String {
    utf8_percent_encode(key, DOCUMENT_ID).to_string()
}

/// Percent-encode an object key for use as a URL path, keeping `/`.
pub fn encode_url_path(key: &str) -> String {
    utf8_percent_encode(key, URL_PATH).to_string()
}

/// Decode an object key as delivered by storage event notifications.
///
/// Keys arrive form-encoded: `+` stands for a space and everything else is
/// percent-encoded. Invalid UTF-8 sequences are replaced rather than failing.
pub fn decode_event_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Fill `{bucket}` and `{key}` in a URL template. The key is path-encoded.
pub fn render_object_url(template: &str, bucket: &str, key: &str) -> String {
    template
        .replace("{bucket}", bucket)
        .replace("{key}", &encode_url_path(key))
}

mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
