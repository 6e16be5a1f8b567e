//! Data models for the SensorThings API and the traversal output
//!
//! - Entities: Location, Thing, Datastream, Observation as served by the API
//! - Page: the paginated collection wrapper
//! - Record: the `MeasurementRecord` handed to presentation sinks

pub mod entities;
pub mod location;
pub mod page;
pub mod record;

// Re-export all public types for convenient access
pub use entities::{Datastream, EntityId, Observation, Thing, UnitOfMeasurement};
pub use location::{Coordinates, GeoPoint, Location};
pub use page::Page;
pub use record::{LatestObservation, MeasurementRecord, NO_DATE, ObservationValue};
