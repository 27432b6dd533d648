use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selection code of the aggregate worldwide scope.
pub const WORLDWIDE: &str = "worldwide";

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Map center shown before any country has been selected (mid-Atlantic).
pub const DEFAULT_MAP_CENTER: LatLng = LatLng::new(34.80746, -40.4796);
/// Zoom level of the initial world view.
pub const DEFAULT_MAP_ZOOM: u8 = 2;
/// Zoom level applied when a specific country is selected.
pub const COUNTRY_MAP_ZOOM: u8 = 5;

/// Which statistic drives card highlighting, map colouring and the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cases,
    Recovered,
    Deaths,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cases, Metric::Recovered, Metric::Deaths];

    /// Key used by the API payloads (`cases`, `recovered`, `deaths`).
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Recovered => "recovered",
            Metric::Deaths => "deaths",
        }
    }

    pub fn card_title(self) -> &'static str {
        match self {
            Metric::Cases => "Coronavirus Cases",
            Metric::Recovered => "Recovered",
            Metric::Deaths => "Deaths",
        }
    }

    /// Cards for cases and deaths use the red highlight, recovered uses green.
    pub fn is_red(self) -> bool {
        !matches!(self, Metric::Recovered)
    }

    /// Marker and chart colour as RGB.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Metric::Cases => [0xCC, 0x10, 0x34],
            Metric::Recovered => [0x7D, 0xD7, 0x1D],
            Metric::Deaths => [0xFB, 0x44, 0x43],
        }
    }

    /// Metres of marker radius per square-root unit of the metric value.
    pub fn marker_multiplier(self) -> f64 {
        match self {
            Metric::Cases => 800.0,
            Metric::Recovered => 1200.0,
            Metric::Deaths => 2000.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cases" => Ok(Metric::Cases),
            "recovered" => Ok(Metric::Recovered),
            "deaths" => Ok(Metric::Deaths),
            other => Err(format!(
                "unknown metric `{other}`, expected cases, recovered or deaths"
            )),
        }
    }
}

/// The scope currently shown in the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    Worldwide,
    Country(String),
}

impl Selection {
    pub fn from_code(code: &str) -> Self {
        if code == WORLDWIDE {
            Selection::Worldwide
        } else {
            Selection::Country(code.to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Selection::Worldwide => WORLDWIDE,
            Selection::Country(code) => code,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw API schemas
// ---------------------------------------------------------------------------

/// `countryInfo` object nested in per-country records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCountryInfo {
    /// Null for non-country entries such as cruise ships.
    #[serde(default)]
    pub iso2: Option<String>,
    pub lat: f64,
    pub long: f64,
}

/// One snapshot record as served by `/all`, `/countries` and `/countries/{code}`.
///
/// `country` and `countryInfo` are absent in the `/all` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_info: Option<RawCountryInfo>,
    #[serde(deserialize_with = "de_count")]
    pub cases: u64,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub today_cases: Option<i64>,
    #[serde(deserialize_with = "de_count")]
    pub recovered: u64,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub today_recovered: Option<i64>,
    #[serde(deserialize_with = "de_count")]
    pub deaths: u64,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub today_deaths: Option<i64>,
}

/// Serde helper: parse a daily delta that may be a number, a numeric string, `null`
/// or garbage. Anything that is not a finite number becomes `None`.
fn de_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number, a string or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then(|| v.round() as i64))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            let s = s.trim();
            Ok(s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.round() as i64)
            }))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, d: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// Serde helper: parse a cumulative count from a non-negative JSON number or numeric string.
fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a non-negative number or numeric string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v).map_err(|_| E::custom("negative value for a cumulative count"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_finite() && v >= 0.0 {
                Ok(v.round() as u64)
            } else {
                Err(E::custom("cumulative count must be a finite non-negative number"))
            }
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            s.trim().parse::<u64>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Point-in-time counts for one scope (a country or the whole world).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySnapshot {
    pub country_code: String,
    pub country_name: String,
    pub today_cases: Option<i64>,
    pub total_cases: u64,
    pub today_recovered: Option<i64>,
    pub total_recovered: u64,
    pub today_deaths: Option<i64>,
    pub total_deaths: u64,
    pub latitude: f64,
    pub longitude: f64,
}

impl CountrySnapshot {
    /// Build the aggregate snapshot from an `/all` record.
    pub fn worldwide(raw: RawSnapshot) -> Self {
        Self {
            country_code: WORLDWIDE.to_string(),
            country_name: "Worldwide".to_string(),
            today_cases: raw.today_cases,
            total_cases: raw.cases,
            today_recovered: raw.today_recovered,
            total_recovered: raw.recovered,
            today_deaths: raw.today_deaths,
            total_deaths: raw.deaths,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// Build a per-country snapshot. Fails when `country` or `countryInfo` is missing.
    ///
    /// Records without an ISO2 code fall back to the country name, which the API
    /// also accepts as a lookup key.
    pub fn from_country(raw: RawSnapshot) -> Result<Self, String> {
        let name = raw
            .country
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "record without `country` name".to_string())?;
        let info = raw
            .country_info
            .ok_or_else(|| format!("record `{name}` without `countryInfo`"))?;
        let code = info
            .iso2
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| name.clone());
        Ok(Self {
            country_code: code,
            country_name: name,
            today_cases: raw.today_cases,
            total_cases: raw.cases,
            today_recovered: raw.today_recovered,
            total_recovered: raw.recovered,
            today_deaths: raw.today_deaths,
            total_deaths: raw.deaths,
            latitude: info.lat,
            longitude: info.long,
        })
    }

    pub fn total(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Cases => self.total_cases,
            Metric::Recovered => self.total_recovered,
            Metric::Deaths => self.total_deaths,
        }
    }

    pub fn today(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Cases => self.today_cases,
            Metric::Recovered => self.today_recovered,
            Metric::Deaths => self.today_deaths,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    pub display_name: String,
    pub code: String,
}

/// One line of the "cases by country" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub country_name: String,
    pub total_cases: u64,
}

/// A country paired with the metric that sizes and colours its map marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub snapshot: CountrySnapshot,
    pub metric: Metric,
}

impl MapPoint {
    pub fn value(&self) -> u64 {
        self.snapshot.total(self.metric)
    }

    /// Marker radius in metres: `sqrt(value) * multiplier`.
    pub fn radius_m(&self) -> f64 {
        (self.value() as f64).sqrt() * self.metric.marker_multiplier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_round_trips_through_str() {
        for m in Metric::ALL {
            assert_eq!(m.as_str().parse::<Metric>().unwrap(), m);
        }
        assert!("active".parse::<Metric>().is_err());
        assert_eq!(" Deaths ".parse::<Metric>().unwrap(), Metric::Deaths);
    }

    #[test]
    fn selection_codes() {
        assert_eq!(Selection::from_code(WORLDWIDE), Selection::Worldwide);
        assert_eq!(Selection::from_code("DE").code(), "DE");
    }

    #[test]
    fn map_point_radius_scales_with_sqrt() {
        let raw: RawSnapshot = serde_json::from_str(
            r#"{"country":"X","countryInfo":{"iso2":"XX","lat":0,"long":0},
                "cases":10000,"recovered":0,"deaths":100}"#,
        )
        .unwrap();
        let snap = CountrySnapshot::from_country(raw).unwrap();
        let cases = MapPoint { snapshot: snap.clone(), metric: Metric::Cases };
        let deaths = MapPoint { snapshot: snap, metric: Metric::Deaths };
        assert_eq!(cases.radius_m(), 100.0 * 800.0);
        assert_eq!(deaths.radius_m(), 10.0 * 2000.0);
    }
}
