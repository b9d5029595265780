//! External data feeds
//!
//! Live mode reads two independent feeds: solar-wind speed (mapped to drift)
//! and a seismic event catalog (plotted as markers). Each feed parses its own
//! payload and absorbs fetch or parse failures into a fallback value, so
//! nothing here returns an error to the series builder.

mod seismic;
mod solar_wind;

pub use seismic::{parse_seismic_events, SeismicFeed};
pub use solar_wind::{parse_solar_wind, speed_to_drift, stub_series, SolarWindFeed, STUB_SPEEDS};

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::DashboardError;

/// Transport used by the feeds to fetch a response body
pub trait FeedClient {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    fn get_text(&self, url: &str) -> Result<String, DashboardError>;
}

/// Blocking HTTP client with a bounded per-request timeout
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new(timeout: Duration) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .user_agent(concat!("psifold/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedClient for HttpFeedClient {
    fn get_text(&self, url: &str) -> Result<String, DashboardError> {
        debug!("Fetching feed: {}", url);
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Fetch(format!("{} returned {}", url, status)));
        }

        Ok(response.text()?)
    }
}

/// Stand-in used when no HTTP client could be built; every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl FeedClient for OfflineClient {
    fn get_text(&self, url: &str) -> Result<String, DashboardError> {
        Err(DashboardError::Fetch(format!("{url}: no HTTP client available")))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Client that returns a canned body and records requested URLs
    pub struct CannedClient {
        pub body: String,
        pub requested: RefCell<Vec<String>>,
    }

    impl CannedClient {
        pub fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeedClient for CannedClient {
        fn get_text(&self, url: &str) -> Result<String, DashboardError> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(self.body.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_http_client_builds_with_timeout() {
        assert!(HttpFeedClient::new(Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_offline_client_always_fails() {
        let err = OfflineClient.get_text("https://example.test").unwrap_err();
        assert!(matches!(err, DashboardError::Fetch(_)));
    }

    #[test]
    fn test_unreachable_host_is_fetch_error() {
        let client = HttpFeedClient::new(Duration::from_millis(500)).unwrap();
        // Port 9 on localhost is discard; nothing listens in test environments
        let err = client.get_text("http://127.0.0.1:9/feed.json").unwrap_err();
        assert!(matches!(err, DashboardError::Fetch(_)));
    }

    #[test]
    fn test_hung_upstream_times_out() {
        // Accepts the connection and never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(10));
                drop(stream);
            }
        });

        let timeout = Duration::from_millis(400);
        let client = HttpFeedClient::new(timeout).unwrap();
        let started = Instant::now();
        let err = client.get_text(&format!("http://{addr}/feed.json")).unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, DashboardError::Fetch(_)), "{err}");
        assert!(elapsed >= timeout / 2, "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    }
}
