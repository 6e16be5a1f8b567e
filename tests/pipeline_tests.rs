//! End-to-end traversal scenarios against canned API responses

mod support;

use samenmeten::config::AssociationMode;
use samenmeten::{ObservationValue, RunSummary, TraversalOptions, TraversalPipeline};
use serde_json::json;
use std::sync::Arc;
use support::{BASE, FakeApi, client, datastream_url, latest_url};

fn options(association_mode: AssociationMode) -> TraversalOptions {
    TraversalOptions {
        association_mode,
        ..TraversalOptions::default()
    }
}

fn location(id: u64, coordinates: Option<[f64; 2]>) -> serde_json::Value {
    let mut location = json!({
        "@iot.id": id,
        "name": format!("loc-{id}"),
        "Things@iot.navigationLink": format!("{BASE}/Locations({id})/Things"),
    });
    if let Some(coordinates) = coordinates {
        location["location"] = json!({ "type": "Point", "coordinates": coordinates });
    }
    location
}

/// Location 1 at [5.1, 52.3] → "Sensor A" → datastreams pm25_kal (11) and no2 (12)
fn sensor_a() -> FakeApi {
    FakeApi::new()
        .with(format!("{BASE}/Locations"), json!({ "value": [location(1, Some([5.1, 52.3]))] }))
        .with(
            format!("{BASE}/Locations(1)/Things"),
            json!({ "value": [{
                "@iot.id": 100,
                "name": "Sensor A",
                "Datastreams@iot.navigationLink": format!("{BASE}/Things(100)/Datastreams")
            }] }),
        )
        .with(
            format!("{BASE}/Things(100)/Datastreams"),
            json!({ "value": [
                { "@iot.id": 11, "name": "pm25_kal" },
                { "@iot.id": 12, "name": "no2" }
            ] }),
        )
        .with(
            latest_url(11),
            json!({ "value": [{ "phenomenonTime": "2024-06-01T10:00:00Z", "result": 8.2 }] }),
        )
        .with(
            latest_url(12),
            json!({ "value": [{ "phenomenonTime": "2024-06-01T10:00:00Z", "result": 21 }] }),
        )
        .with(
            datastream_url(11),
            json!({ "@iot.id": 11, "name": "pm25_kal", "unitOfMeasurement": { "symbol": "ug/m3" } }),
        )
        .with(
            datastream_url(12),
            json!({ "@iot.id": 12, "name": "no2", "unitOfMeasurement": { "symbol": "ug/m3" } }),
        )
}

#[tokio::test]
async fn test_one_location_two_datastreams() {
    let api = Arc::new(sensor_a());
    let pipeline = TraversalPipeline::new(client(api), options(AssociationMode::FirstOnly));

    let records = pipeline.collect().await.unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.latitude, 52.3);
        assert_eq!(record.longitude, 5.1);
        assert!(record.has_position);
        assert_eq!(record.thing_name, "Sensor A");
        assert_eq!(record.unit_symbol.as_deref(), Some("ug/m3"));
        // CEST is UTC+2 in June
        assert_eq!(record.observed_at, "1-6-2024, 12:00:00");
    }
    assert_eq!(records[0].datastream_name, "pm25_kal");
    assert_eq!(records[0].classification, "fijnstof gekalibreerd < 2.5microm");
    assert_eq!(records[0].result, ObservationValue::Number(8.2));
    assert_eq!(records[1].datastream_name, "no2");
    assert_eq!(records[1].classification, "stikstofdioxide");
}

#[tokio::test]
async fn test_requests_are_issued_in_traversal_order() {
    let api = Arc::new(sensor_a());
    let pipeline = TraversalPipeline::new(client(api.clone()), options(AssociationMode::FirstOnly));

    pipeline.collect().await.unwrap();

    assert_eq!(
        api.requests(),
        vec![
            format!("{BASE}/Locations"),
            format!("{BASE}/Locations(1)/Things"),
            format!("{BASE}/Things(100)/Datastreams"),
            latest_url(11),
            datastream_url(11),
            latest_url(12),
            datastream_url(12),
        ]
    );
}

#[tokio::test]
async fn test_failing_thing_link_contributes_nothing() {
    let api = Arc::new(
        sensor_a()
            .with(
                format!("{BASE}/Locations"),
                json!({ "value": [location(2, Some([4.9, 52.4])), location(1, Some([5.1, 52.3]))] }),
            )
            .failing(format!("{BASE}/Locations(2)/Things"), 500),
    );
    let pipeline = TraversalPipeline::new(client(api), TraversalOptions::default());

    let mut records = Vec::new();
    let summary = pipeline.run(&mut records).await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            locations: 2,
            skipped_locations: 1,
            records: 2
        }
    );
    assert!(records.iter().all(|r| r.latitude == 52.3));
}

#[tokio::test]
async fn test_location_without_things_link_is_skipped() {
    let api = Arc::new(FakeApi::new().with(
        format!("{BASE}/Locations"),
        json!({ "value": [{ "@iot.id": 3, "location": { "coordinates": [5.0, 52.0] } }] }),
    ));
    let pipeline = TraversalPipeline::new(client(api.clone()), TraversalOptions::default());

    let records = pipeline.collect().await.unwrap();

    assert!(records.is_empty());
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn test_thing_without_datastreams_link_is_skipped() {
    let api = Arc::new(
        sensor_a().with(
            format!("{BASE}/Locations(1)/Things"),
            json!({ "value": [{ "@iot.id": 100, "name": "Sensor A" }] }),
        ),
    );
    let pipeline = TraversalPipeline::new(client(api), TraversalOptions::default());

    let mut records = Vec::new();
    let summary = pipeline.run(&mut records).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(summary.skipped_locations, 1);
}

#[tokio::test]
async fn test_missing_coordinates_use_placeholder_position() {
    let api = Arc::new(
        sensor_a().with(format!("{BASE}/Locations"), json!({ "value": [location(1, None)] })),
    );
    let pipeline = TraversalPipeline::new(client(api), TraversalOptions::default());

    let records = pipeline.collect().await.unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!((record.latitude, record.longitude), (0.0, 0.0));
        assert!(!record.has_position);
    }
}

#[tokio::test]
async fn test_observation_sentinels_flow_into_records() {
    let api = Arc::new(
        sensor_a()
            .with(latest_url(11), json!({ "value": [] }))
            .failing(latest_url(12), 502),
    );
    let pipeline = TraversalPipeline::new(client(api), TraversalOptions::default());

    let records = pipeline.collect().await.unwrap();

    assert_eq!(records[0].result.to_string(), "No Data");
    assert_eq!(records[0].observed_at, "No Date");
    assert_eq!(records[1].result.to_string(), "Error");
    assert_eq!(records[1].observed_at, "No Date");
}

#[tokio::test]
async fn test_paginated_mode_follows_every_thing_and_datastream_page() {
    let api = Arc::new(
        sensor_a()
            .with(
                format!("{BASE}/Locations(1)/Things"),
                json!({ "value": [
                    { "@iot.id": 100, "name": "Sensor A",
                      "Datastreams@iot.navigationLink": format!("{BASE}/Things(100)/Datastreams") },
                    { "@iot.id": 101, "name": "Sensor B",
                      "Datastreams@iot.navigationLink": format!("{BASE}/Things(101)/Datastreams") }
                ] }),
            )
            .with(
                format!("{BASE}/Things(100)/Datastreams"),
                json!({
                    "value": [{ "@iot.id": 11, "name": "pm25_kal" }],
                    "@iot.nextLink": format!("{BASE}/Things(100)/Datastreams?$skip=1")
                }),
            )
            .with(
                format!("{BASE}/Things(100)/Datastreams?$skip=1"),
                json!({ "value": [{ "@iot.id": 12, "name": "no2" }] }),
            )
            .with(
                format!("{BASE}/Things(101)/Datastreams"),
                json!({ "value": [{ "@iot.id": 13, "name": "temp" }] }),
            )
            .with(latest_url(13), json!({ "value": [{ "result": 19.5 }] })),
    );

    let paginated = TraversalPipeline::new(client(api.clone()), options(AssociationMode::Paginated));
    let records = paginated.collect().await.unwrap();
    let seen: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.thing_name.as_str(), r.datastream_name.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![("Sensor A", "pm25_kal"), ("Sensor A", "no2"), ("Sensor B", "temp")]
    );
    assert_eq!(records[2].classification, "temperatuur");
    assert_eq!(records[2].observed_at, "No Date");

    let first_only = TraversalPipeline::new(client(api), options(AssociationMode::FirstOnly));
    let records = first_only.collect().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].datastream_name, "pm25_kal");
}

#[tokio::test]
async fn test_unreachable_api_yields_empty_run() {
    let api = Arc::new(FakeApi::new().failing(format!("{BASE}/Locations"), 503));
    let pipeline = TraversalPipeline::new(client(api), TraversalOptions::default());

    let mut records = Vec::new();
    let summary = pipeline.run(&mut records).await.unwrap();

    assert_eq!(summary, RunSummary::default());
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_rerun_reflects_fresh_upstream_data() {
    let api = Arc::new(sensor_a());
    let pipeline = TraversalPipeline::new(client(api.clone()), options(AssociationMode::FirstOnly));

    let first = pipeline.collect().await.unwrap();
    let second = pipeline.collect().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.requests().len(), 14);
}

#[tokio::test]
async fn test_first_only_uses_first_thing_even_without_id() {
    let api = Arc::new(
        sensor_a().with(
            format!("{BASE}/Locations(1)/Things"),
            json!({ "value": [
                { "name": "First",
                  "Datastreams@iot.navigationLink": format!("{BASE}/Things(100)/Datastreams") },
                { "@iot.id": 101, "name": "Second",
                  "Datastreams@iot.navigationLink": format!("{BASE}/Things(101)/Datastreams") }
            ] }),
        ),
    );
    let pipeline = TraversalPipeline::new(client(api.clone()), options(AssociationMode::FirstOnly));

    let records = pipeline.collect().await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.thing_name == "First"));
    assert!(
        !api.requests()
            .contains(&format!("{BASE}/Things(101)/Datastreams"))
    );
}
