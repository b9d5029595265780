//! Seismic event feed (USGS FDSN, GeoJSON)

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::FeedClient;
use crate::config::SeismicQuery;
use crate::error::DashboardError;
use crate::types::EventMarker;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    /// Epoch milliseconds
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    mag: Option<f64>,
}

/// Parse a GeoJSON FeatureCollection into event markers, oldest first.
///
/// Features without a usable time or a positive magnitude are dropped.
pub fn parse_seismic_events(body: &str) -> Result<Vec<EventMarker>, DashboardError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;

    let mut events: Vec<EventMarker> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties;
            let timestamp = props.time.and_then(DateTime::<Utc>::from_timestamp_millis);
            match (timestamp, props.mag) {
                (Some(timestamp), Some(magnitude)) if magnitude > 0.0 => {
                    Some(EventMarker { timestamp, magnitude })
                }
                _ => {
                    debug!(
                        "Dropping seismic feature (time={:?}, mag={:?})",
                        props.time, props.mag
                    );
                    None
                }
            }
        })
        .collect();

    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

/// Event feed for a fixed region over a trailing window
pub struct SeismicFeed<'a> {
    client: &'a dyn FeedClient,
    base_url: String,
    query: SeismicQuery,
}

impl<'a> SeismicFeed<'a> {
    pub fn new(
        client: &'a dyn FeedClient,
        base_url: impl Into<String>,
        query: SeismicQuery,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            query,
        }
    }

    /// Query URL for the window ending at `now`
    pub fn query_url(&self, now: DateTime<Utc>) -> String {
        let start = now - Duration::days(self.query.lookback_days);
        format!(
            "{}?format=geojson&starttime={}&endtime={}&latitude={}&longitude={}&maxradiuskm={}&minmagnitude={:.1}",
            self.base_url,
            start.format("%Y-%m-%d"),
            now.format("%Y-%m-%d"),
            self.query.latitude,
            self.query.longitude,
            self.query.max_radius_km,
            self.query.min_magnitude,
        )
    }

    /// Fetch and parse without fallback
    pub fn try_fetch(&self, now: DateTime<Utc>) -> Result<Vec<EventMarker>, DashboardError> {
        let body = self.client.get_text(&self.query_url(now))?;
        parse_seismic_events(&body)
    }

    /// Fetch events, returning an empty list on any failure
    pub fn fetch(&self, now: DateTime<Utc>) -> Vec<EventMarker> {
        self.try_fetch(now).unwrap_or_else(|e| {
            warn!("Seismic feed unavailable, plotting no events: {}", e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::testing::CannedClient;
    use crate::feeds::OfflineClient;
    use chrono::TimeZone;

    const BASE: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 15, 45, 0).unwrap()
    }

    fn sample_geojson() -> &'static str {
        r#"{
            "type": "FeatureCollection",
            "metadata": {"count": 9},
            "features": [
                {"type": "Feature", "properties": {"mag": 2.1, "time": 1725900000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": 1.4, "time": 1725800000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": 0.9, "time": 1725700000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": null, "time": 1725850000000}, "geometry": null},
                {"type": "Feature", "properties": {"time": 1725860000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": 0.0, "time": 1725870000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": -0.4, "time": 1725880000000}, "geometry": null},
                {"type": "Feature", "properties": {"mag": 1.2, "time": null}, "geometry": null},
                {"type": "Feature", "properties": {"mag": 1.3}, "geometry": null}
            ]
        }"#
    }

    #[test]
    fn test_query_url() {
        let feed = SeismicFeed::new(&OfflineClient, BASE, SeismicQuery::default());
        assert_eq!(
            feed.query_url(now()),
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson\
             &starttime=2024-09-03&endtime=2024-09-10\
             &latitude=40.82&longitude=14.13&maxradiuskm=50&minmagnitude=1.0"
        );
    }

    #[test]
    fn test_parse_drops_unusable_features() {
        // Null, missing and non-positive magnitudes go, as do null and missing times
        let events = parse_seismic_events(sample_geojson()).unwrap();
        assert_eq!(events.len(), 3);

        // Sorted oldest first
        let magnitudes: Vec<f64> = events.iter().map(|e| e.magnitude).collect();
        assert_eq!(magnitudes, vec![0.9, 1.4, 2.1]);
        assert_eq!(events[2].timestamp.timestamp_millis(), 1725900000000);
    }

    #[test]
    fn test_parsed_events_marker_size() {
        let events = parse_seismic_events(sample_geojson()).unwrap();

        // Below M1.25 the marker is clamped to the minimum size
        assert_eq!(events[0].marker_size(), 5.0);
        assert_eq!(events[0].label(), "M0.9");
        assert_eq!(events[2].marker_size(), 8.4);
    }

    #[test]
    fn test_parse_empty_collection() {
        let events =
            parse_seismic_events(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_geojson() {
        assert!(parse_seismic_events("[]").is_err());
        assert!(parse_seismic_events("Error 400: Bad Request").is_err());
    }

    #[test]
    fn test_fetch_failure_yields_empty() {
        let feed = SeismicFeed::new(&OfflineClient, BASE, SeismicQuery::default());
        assert!(feed.try_fetch(now()).is_err());
        assert!(feed.fetch(now()).is_empty());
    }

    #[test]
    fn test_fetch_malformed_yields_empty() {
        let client = CannedClient::new("{\"features\": 12}");
        let feed = SeismicFeed::new(&client, BASE, SeismicQuery::default());
        assert!(feed.fetch(now()).is_empty());
    }

    #[test]
    fn test_fetch_success_requests_query_url() {
        let client = CannedClient::new(sample_geojson());
        let feed = SeismicFeed::new(&client, BASE, SeismicQuery::default());

        let events = feed.fetch(now());
        assert_eq!(events.len(), 3);
        assert_eq!(client.requested.borrow().clone(), vec![feed.query_url(now())]);
    }
}
