//! Per-event ingestion pipeline.
//!
//! Each record moves through the same stages:
//!
//! ```text
//! Received → LabelsResolved → DocumentBuilt → Indexed
//!                                                 ↘ Failed (logged, batch continues)
//! ```
//!
//! - [`Ingestor`] - runs the stages for one record or a whole event
//! - [`BatchReport`] - what happened to each record of an event

mod ingestor;

pub use ingestor::{BatchReport, Ingestor};
