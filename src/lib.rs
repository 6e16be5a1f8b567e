//! `samenmeten` - latest readings of every sensor in a SensorThings API
//!
//! This library walks Locations → Things → Datastreams → Observations,
//! classifies each datastream and hands one `MeasurementRecord` per
//! datastream to a presentation sink.

pub mod classify;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod sensorthings;
pub mod sink;

// Re-export core types for public API
pub use classify::{PropertyClass, classify};
pub use config::SamenMetenConfig;
pub use error::SamenMetenError;
pub use models::{LatestObservation, MeasurementRecord, ObservationValue};
pub use pipeline::{RunSummary, TraversalOptions, TraversalPipeline};
pub use sensorthings::{Fetch, SensorThingsClient};
pub use sink::RecordSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SamenMetenError>;
