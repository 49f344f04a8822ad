//! Automatic labels from the image-recognition service.

use async_trait::async_trait;
use aws_sdk_rekognition::Client;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::types::{Image, S3Object};

use super::LabelSource;
use crate::event::ObjectRef;
use crate::{Error, Result};

/// Detection thresholds.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Maximum number of labels returned per image.
    pub max_labels: i32,

    /// Minimum confidence (percent) for a label to be returned.
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 75.0,
        }
    }
}

/// Labels detected in the image itself, lowercased.
pub struct DetectorSource {
    client: Client,
    config: DetectorConfig,
}

impl DetectorSource {
    pub fn new(client: Client, config: DetectorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl LabelSource for DetectorSource {
    fn name(&self) -> &'static str {
        "detector"
    }

    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<String>> {
        let image = Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&object.bucket)
                    .name(&object.key)
                    .build(),
            )
            .build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(self.config.max_labels)
            .min_confidence(self.config.min_confidence)
            .send()
            .await
            .map_err(|e| Error::Detector(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .labels()
            .iter()
            .filter_map(|label| label.name())
            .map(str::to_lowercase)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.max_labels, 10);
        assert_eq!(config.min_confidence, 75.0);
    }
}
