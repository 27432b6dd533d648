/// Blocking client for the **disease.sh v3 COVID-19 API**.
///
/// Three snapshot endpoints feed the dashboard (`/all`, `/countries`, `/countries/{code}`)
/// and one history endpoint feeds the chart (`/historical/all?lastdays=N`).
///
/// ### Notes
/// - There is no retry and no caching: every call goes to the network. Callers that want
///   to try again simply issue the call again.
/// - Transport failures and non-2xx statuses map to [`DashError::DataUnavailable`];
///   payloads that do not match the schemas in [`crate::models`] map to
///   [`DashError::MalformedResponse`].
/// - The response body is parsed by the `parse_*` functions below, which need no network
///   and are what the offline tests exercise.
///
/// Typical usage:
/// ```no_run
/// # use covid_dash::{Client, StatSource};
/// let client = Client::default();
/// let world = client.fetch_global()?;
/// let countries = client.fetch_all_countries()?;
/// # Ok::<(), covid_dash::DashError>(())
/// ```
use crate::config::Config;
use crate::error::DashError;
use crate::history::{History, RawHistory};
use crate::models::{CountrySnapshot, RawSnapshot};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;

/// Source of statistics. Implemented by [`Client`] over HTTP and by in-memory fakes in tests.
///
/// Implementations are called from background threads, hence `Send + Sync`.
pub trait StatSource: Send + Sync {
    /// Aggregate worldwide snapshot.
    fn fetch_global(&self) -> Result<CountrySnapshot, DashError>;
    /// One snapshot per country, in API order.
    fn fetch_all_countries(&self) -> Result<Vec<CountrySnapshot>, DashError>;
    /// Snapshot of a single country; `code` comes from a prior `fetch_all_countries`.
    fn fetch_country(&self, code: &str) -> Result<CountrySnapshot, DashError>;
    /// Cumulative worldwide history of the last `days` days.
    fn fetch_history(&self, days: u32) -> Result<History, DashError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        // Building with only timeouts, a redirect policy and a user agent cannot fail
        // unless the TLS backend itself is unusable.
        Self::new(&Config::default()).expect("reqwest client build")
    }
}

// Allow -, _, . unescaped in codes; everything else (spaces in country names) is encoded.
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

impl Client {
    pub fn new(config: &Config) -> Result<Self, DashError> {
        let http = HttpClient::builder()
            .timeout(config.timeout) // total request timeout
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DashError::DataUnavailable(format!("http client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `url` and return the body of a 2xx response.
    fn get_text(&self, url: &str) -> Result<String, DashError> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| DashError::DataUnavailable(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::DataUnavailable(format!(
                "GET {url}: request failed with HTTP {status}"
            )));
        }
        resp.text()
            .map_err(|e| DashError::DataUnavailable(format!("GET {url}: reading body: {e}")))
    }
}

impl StatSource for Client {
    fn fetch_global(&self) -> Result<CountrySnapshot, DashError> {
        let body = self.get_text(&format!("{}/all", self.base_url))?;
        parse_global(&body)
    }

    fn fetch_all_countries(&self) -> Result<Vec<CountrySnapshot>, DashError> {
        let body = self.get_text(&format!("{}/countries", self.base_url))?;
        parse_countries(&body)
    }

    fn fetch_country(&self, code: &str) -> Result<CountrySnapshot, DashError> {
        let enc = percent_encoding::utf8_percent_encode(code.trim(), SAFE).to_string();
        let body = self.get_text(&format!("{}/countries/{}", self.base_url, enc))?;
        parse_country(&body)
    }

    fn fetch_history(&self, days: u32) -> Result<History, DashError> {
        let body = self.get_text(&format!(
            "{}/historical/all?lastdays={}",
            self.base_url, days
        ))?;
        parse_history(&body)
    }
}

/// Parse the `/all` payload.
pub fn parse_global(body: &str) -> Result<CountrySnapshot, DashError> {
    let raw: RawSnapshot =
        serde_json::from_str(body).map_err(|e| DashError::malformed("/all", e))?;
    Ok(CountrySnapshot::worldwide(raw))
}

/// Parse the `/countries` payload (a JSON array).
pub fn parse_countries(body: &str) -> Result<Vec<CountrySnapshot>, DashError> {
    let raws: Vec<RawSnapshot> =
        serde_json::from_str(body).map_err(|e| DashError::malformed("/countries", e))?;
    raws.into_iter()
        .map(|r| CountrySnapshot::from_country(r).map_err(|e| DashError::malformed("/countries", e)))
        .collect()
}

/// Parse the `/countries/{code}` payload.
pub fn parse_country(body: &str) -> Result<CountrySnapshot, DashError> {
    let raw: RawSnapshot = serde_json::from_str(body)
        .map_err(|e| DashError::malformed("/countries/{code}", e))?;
    CountrySnapshot::from_country(raw).map_err(|e| DashError::malformed("/countries/{code}", e))
}

/// Parse the `/historical/all` payload.
pub fn parse_history(body: &str) -> Result<History, DashError> {
    let raw: RawHistory =
        serde_json::from_str(body).map_err(|e| DashError::malformed("/historical/all", e))?;
    History::from_raw(raw).map_err(|e| DashError::malformed("/historical/all", e))
}
