//! Locations → Things → Datastreams → latest Observation
//!
//! Walks the API's association links and hands one `MeasurementRecord` per
//! datastream to a [`RecordSink`] as soon as it is built. Missing links,
//! empty collections and failed requests skip the affected entity; they
//! never abort the run.

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::classify::classify;
use crate::config::{AssociationMode, TraversalConfig};
use crate::models::{Coordinates, Datastream, Location, MeasurementRecord, Thing};
use crate::sensorthings::SensorThingsClient;
use crate::sink::RecordSink;

/// Knobs of one traversal
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub association_mode: AssociationMode,
    pub fetch_units: bool,
    /// Datastreams of one Thing in flight at once; output order is unaffected
    pub concurrency: usize,
    pub max_locations: Option<usize>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self::from(&TraversalConfig::default())
    }
}

impl From<&TraversalConfig> for TraversalOptions {
    fn from(config: &TraversalConfig) -> Self {
        Self {
            association_mode: config.association_mode,
            fetch_units: config.fetch_units,
            concurrency: config.concurrency.max(1) as usize,
            max_locations: config.max_locations.map(|n| n as usize),
        }
    }
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub locations: usize,
    /// Locations that produced no Thing with a Datastreams link
    pub skipped_locations: usize,
    pub records: usize,
}

pub struct TraversalPipeline {
    client: SensorThingsClient,
    options: TraversalOptions,
}

/// Position and name context shared by every record of one Thing
struct Origin<'a> {
    location: &'a Location,
    position: Option<Coordinates>,
    thing_name: &'a str,
}

impl TraversalPipeline {
    pub fn new(client: SensorThingsClient, options: TraversalOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Walk every Location and emit its records to `sink`.
    ///
    /// Only sink failures are returned as errors.
    #[instrument(name = "traversal", skip_all)]
    pub async fn run(&self, sink: &mut dyn RecordSink) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let mut locations: Vec<Location> = self
            .client
            .pages()
            .fetch_all_pages(&self.client.locations_url())
            .await;
        if let Some(limit) = self.options.max_locations {
            locations.truncate(limit);
        }
        info!("Processing {} locations", locations.len());

        for location in &locations {
            summary.locations += 1;
            let before = summary.records;
            let reached = self.visit_location(location, sink, &mut summary).await?;
            if !reached {
                summary.skipped_locations += 1;
            }
            debug!(
                "Location {} contributed {} records",
                location.id,
                summary.records - before
            );
        }

        sink.finish()?;
        info!(
            "Traversal finished: {} locations, {} skipped, {} records",
            summary.locations, summary.skipped_locations, summary.records
        );
        Ok(summary)
    }

    /// Run and gather the records in memory
    pub async fn collect(&self) -> Result<Vec<MeasurementRecord>> {
        let mut records = Vec::new();
        self.run(&mut records).await?;
        Ok(records)
    }

    /// Returns whether any Thing with a Datastreams link was reached
    async fn visit_location(
        &self,
        location: &Location,
        sink: &mut dyn RecordSink,
        summary: &mut RunSummary,
    ) -> Result<bool> {
        let Some(things_link) = location.things_link.as_deref() else {
            warn!("Location {} has no Things link, skipping", location.id);
            return Ok(false);
        };

        let things: Vec<Thing> = match self.options.association_mode {
            AssociationMode::FirstOnly => self
                .client
                .links()
                .resolve_first(things_link)
                .await
                .into_iter()
                .collect(),
            AssociationMode::Paginated => self.client.links().resolve_all(things_link).await,
        };

        let position = location.coordinates();
        let mut reached = false;
        for thing in &things {
            let Some(datastreams_link) = thing.datastreams_link.as_deref() else {
                warn!("No datastreams for thing {}", thing.display_name());
                continue;
            };
            reached = true;

            let datastreams: Vec<Datastream> = match self.options.association_mode {
                AssociationMode::FirstOnly => {
                    self.client.links().resolve_page(datastreams_link).await
                }
                AssociationMode::Paginated => {
                    self.client.links().resolve_all(datastreams_link).await
                }
            };

            let origin = Origin {
                location,
                position,
                thing_name: thing.display_name(),
            };
            summary.records += self.emit(&origin, datastreams, sink).await?;
        }

        if things.is_empty() {
            warn!("No thing found for location {}", location.id);
        }
        Ok(reached)
    }

    /// Measure each datastream and push the records to the sink in order
    async fn emit(
        &self,
        origin: &Origin<'_>,
        datastreams: Vec<Datastream>,
        sink: &mut dyn RecordSink,
    ) -> Result<usize> {
        let mut records = stream::iter(datastreams)
            .map(move |datastream| self.measure(origin, datastream))
            .buffered(self.options.concurrency);

        let mut emitted = 0;
        while let Some(record) = records.next().await {
            sink.accept(record)?;
            emitted += 1;
        }
        Ok(emitted)
    }

    async fn measure(&self, origin: &Origin<'_>, datastream: Datastream) -> MeasurementRecord {
        let latest = self.client.observations().latest(&datastream.id).await;
        let unit_symbol = if self.options.fetch_units {
            Some(self.client.units().unit_symbol(&datastream.id).await)
        } else {
            None
        };
        let coordinates = origin.position.unwrap_or(Coordinates::UNKNOWN);

        MeasurementRecord {
            location_id: origin.location.id.clone(),
            thing_name: origin.thing_name.to_string(),
            datastream_id: datastream.id,
            classification: classify(&datastream.name).to_string(),
            datastream_name: datastream.name,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            has_position: origin.position.is_some(),
            result: latest.value,
            observed_at: latest.observed_at,
            phenomenon_time: latest.phenomenon_time,
            unit_symbol,
        }
    }
}
