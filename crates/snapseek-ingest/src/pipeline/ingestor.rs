//! Label fusion and idempotent upsert.

use metrics::counter;
use serde::Serialize;
use snapseek_core::{IndexClient, LabelSet, PhotoDocument};

use crate::Result;
use crate::event::{ObjectRef, StorageEvent};
use crate::labels::LabelSource;

/// Outcome of processing one storage event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Records whose document was upserted.
    pub indexed: usize,

    /// Object keys (or record positions) that failed.
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.indexed + self.failed.len()
    }
}

/// Builds photo documents from label sources and writes them to the index.
pub struct Ingestor {
    sources: Vec<Box<dyn LabelSource>>,
    index: IndexClient,
    index_name: String,
}

impl Ingestor {
    /// Create an ingestor that fuses labels from `sources`, in order.
    pub fn new(
        sources: Vec<Box<dyn LabelSource>>,
        index: IndexClient,
        index_name: impl Into<String>,
    ) -> Self {
        let index_name = index_name.into();
        tracing::info!(
            sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            index = %index_name,
            "ingestor initialized"
        );
        Self {
            sources,
            index,
            index_name,
        }
    }

    /// Resolve labels from every source and union them.
    ///
    /// Source failures degrade to empty sets, so this never fails.
    pub async fn resolve_labels(&self, object: &ObjectRef) -> LabelSet {
        let mut labels = LabelSet::new();
        for source in &self.sources {
            labels = labels.union(source.labels_or_empty(object).await);
        }
        labels
    }

    /// Run one record through the pipeline.
    ///
    /// The document is always rebuilt from the sources; nothing is read back
    /// from the index. Only the index write can fail.
    pub async fn process_record(&self, object: &ObjectRef) -> Result<PhotoDocument> {
        tracing::info!(bucket = %object.bucket, key = %object.key, "record received");

        let labels = self.resolve_labels(object).await;
        tracing::info!(
            object = %object,
            labels = ?labels.to_vec(),
            "labels resolved"
        );

        let doc = PhotoDocument::new(&object.bucket, &object.key, labels);
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                document = %serde_json::to_string(&doc).unwrap_or_default(),
                "document built"
            );
        }

        self.index.upsert(&self.index_name, &doc).await?;
        tracing::info!(object = %object, id = %doc.document_id(), "document indexed");

        Ok(doc)
    }

    /// Process every record of an event, in order.
    ///
    /// A failing record is logged and recorded in the report; the remaining
    /// records are still processed.
    pub async fn process_event(&self, event: &StorageEvent) -> BatchReport {
        let mut report = BatchReport::default();

        for (position, record) in event.records.iter().enumerate() {
            counter!("ingest_records_total").increment(1);

            let object = match record.object() {
                Ok(object) => object,
                Err(e) => {
                    counter!("ingest_records_failed_total").increment(1);
                    tracing::error!(position, error = %e, "skipping record");
                    report.failed.push(format!("record #{position}"));
                    continue;
                }
            };

            match self.process_record(&object).await {
                Ok(_) => {
                    counter!("ingest_records_indexed_total").increment(1);
                    report.indexed += 1;
                }
                Err(e) => {
                    counter!("ingest_records_failed_total").increment(1);
                    tracing::error!(position, object = %object, error = %e, "error indexing document");
                    report.failed.push(object.key);
                }
            }
        }

        tracing::info!(
            indexed = report.indexed,
            failed = report.failed.len(),
            "event processed"
        );
        report
    }

    /// Parse a raw event document and process it.
    ///
    /// Malformed JSON is the only error; record failures end up in the report.
    pub async fn handle_event_json(&self, raw: &str) -> Result<BatchReport> {
        let event = StorageEvent::from_json(raw)?;
        tracing::info!(records = event.records.len(), "incoming event");
        Ok(self.process_event(&event).await)
    }
}
