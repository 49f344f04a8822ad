//! Custom labels stored in object metadata.
//!
//! Uploaders tag photos through the `x-amz-meta-customlabels` header, which
//! the storage service exposes as the `customlabels` metadata entry.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;

use super::LabelSource;
use crate::event::ObjectRef;
use crate::{Error, Result};

/// Metadata entry holding the comma-separated tag list.
pub const CUSTOM_LABELS_FIELD: &str = "customlabels";

/// Labels read from a metadata entry of the stored object.
pub struct MetadataSource {
    client: Client,
    field: String,
}

impl MetadataSource {
    pub fn new(client: Client) -> Self {
        Self::with_field(client, CUSTOM_LABELS_FIELD)
    }

    pub fn with_field(client: Client, field: impl Into<String>) -> Self {
        Self {
            client,
            field: field.into(),
        }
    }
}

#[async_trait]
impl LabelSource for MetadataSource {
    fn name(&self) -> &'static str {
        "metadata"
    }

    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<String>> {
        let head = self
            .client
            .head_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| Error::Metadata(DisplayErrorContext(&e).to_string()))?;

        Ok(head
            .metadata()
            .and_then(|metadata| metadata.get(&self.field))
            .map(|raw| parse_custom_labels(raw))
            .unwrap_or_default())
    }
}

/// Split a comma-separated tag list into lowercase labels, dropping blanks.
pub fn parse_custom_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect()
}
