//! Presentation sinks consuming `MeasurementRecord`s as the traversal emits them

use serde_json::{Value, json};
use std::io::Write;

use crate::Result;
use crate::models::MeasurementRecord;

/// Receives records one at a time, in traversal order
pub trait RecordSink {
    fn accept(&mut self, record: MeasurementRecord) -> Result<()>;

    /// Called once after the last record
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<MeasurementRecord> {
    fn accept(&mut self, record: MeasurementRecord) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Popup/list text for one record:
/// `Sensor A (pm25_kal): 7.3 ug/m3 (fijnstof gekalibreerd < 2.5microm)`
#[must_use]
pub fn describe(record: &MeasurementRecord) -> String {
    format!(
        "{} ({}): {} ({})",
        record.thing_name,
        record.datastream_name,
        record.format_reading(),
        record.classification
    )
}

/// One text line per record, the terminal version of the sensor list page
pub struct ListSink<W: Write> {
    out: W,
}

impl<W: Write> ListSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ListSink<W> {
    fn accept(&mut self, record: MeasurementRecord) -> Result<()> {
        writeln!(
            self.out,
            "{} | {} | Location: {}",
            describe(&record),
            record.observed_at,
            record.coordinates().format_coordinates()
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, record: MeasurementRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, &record).map_err(std::io::Error::from)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Map markers as a GeoJSON `FeatureCollection`, written on `finish`.
/// Records without a position are left off the map.
pub struct GeoJsonSink<W: Write> {
    out: W,
    features: Vec<Value>,
}

impl<W: Write> GeoJsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            features: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn feature(record: &MeasurementRecord) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [record.longitude, record.latitude],
        },
        "properties": {
            "popup": describe(record),
            "thing": record.thing_name,
            "datastream": record.datastream_name,
            "result": record.result,
            "unit": record.unit_symbol,
            "observed_at": record.observed_at,
            "classification": record.classification,
        },
    })
}

impl<W: Write> RecordSink for GeoJsonSink<W> {
    fn accept(&mut self, record: MeasurementRecord) -> Result<()> {
        if record.has_position {
            self.features.push(feature(&record));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let collection = json!({
            "type": "FeatureCollection",
            "features": std::mem::take(&mut self.features),
        });
        serde_json::to_writer_pretty(&mut self.out, &collection).map_err(std::io::Error::from)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
