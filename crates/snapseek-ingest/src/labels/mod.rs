//! Label sources.
//!
//! Each photo gets labels from independent providers:
//!
//! - [`DetectorSource`] - automatic labels from the image-recognition service
//! - [`MetadataSource`] - custom tags stored in the object's metadata
//!
//! # Degrade-to-empty contract
//!
//! A provider failure must never stop a record from being indexed. Callers
//! use [`LabelSource::labels_or_empty`], which logs the failure and yields an
//! empty [`LabelSet`]; [`LabelSource::fetch`] exposes the raw result for
//! providers and tests.

mod detector;
mod metadata;

pub use detector::{DetectorConfig, DetectorSource};
pub use metadata::{CUSTOM_LABELS_FIELD, MetadataSource, parse_custom_labels};

use async_trait::async_trait;
use metrics::counter;
use snapseek_core::LabelSet;

use crate::Result;
use crate::event::ObjectRef;

/// A provider of labels for a stored object.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Fetch raw labels for an object.
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<String>>;

    /// Fetch labels as a normalized set, degrading to empty on failure.
    async fn labels_or_empty(&self, object: &ObjectRef) -> LabelSet {
        match self.fetch(object).await {
            Ok(labels) => {
                let set: LabelSet = labels.into_iter().collect();
                tracing::debug!(
                    source = self.name(),
                    object = %object,
                    count = set.len(),
                    "labels resolved"
                );
                set
            }
            Err(e) => {
                counter!("ingest_label_source_degraded_total", "source" => self.name())
                    .increment(1);
                tracing::warn!(
                    source = self.name(),
                    object = %object,
                    error = %e,
                    "label source failed, continuing without its labels"
                );
                LabelSet::new()
            }
        }
    }
}
