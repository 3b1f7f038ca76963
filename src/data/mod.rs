//! Telemetry data model, windowing, and the ingestion boundary.

pub mod dataset;
pub mod ingest;
pub mod window;
