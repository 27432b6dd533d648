//! Runtime configuration for the HTTP client and the chart window.

use std::time::Duration;

/// Public mirror of the disease.sh v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.caw.sh/v3/covid-19";

/// Number of days of worldwide history requested for the chart.
pub const DEFAULT_HISTORY_DAYS: u32 = 120;

/// Settings used to build a [`crate::Client`] and to seed a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL without trailing slash, e.g. `https://disease.sh/v3/covid-19`.
    pub base_url: String,
    /// Total request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// `lastdays` parameter of the history request.
    pub history_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: concat!("covid_dash/", env!("CARGO_PKG_VERSION")).into(),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl Config {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days.max(2);
        self
    }
}
