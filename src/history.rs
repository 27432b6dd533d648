//! Worldwide time series used by the chart.
//!
//! The history endpoint returns cumulative counts keyed by `m/d/yy` date strings.
//! The chart shows *new* values per day, derived here from consecutive cumulative values.

use crate::models::Metric;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload of `GET /historical/all?lastdays=N`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHistory {
    pub cases: BTreeMap<String, f64>,
    #[serde(default)]
    pub recovered: BTreeMap<String, f64>,
    pub deaths: BTreeMap<String, f64>,
}

/// Cumulative daily series, each sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub cases: Vec<(NaiveDate, u64)>,
    pub recovered: Vec<(NaiveDate, u64)>,
    pub deaths: Vec<(NaiveDate, u64)>,
}

/// One chart sample: new values reported on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: u64,
}

fn parse_series(name: &str, raw: BTreeMap<String, f64>) -> Result<Vec<(NaiveDate, u64)>, String> {
    let mut out = raw
        .into_iter()
        .map(|(key, v)| {
            let date = NaiveDate::parse_from_str(&key, "%m/%d/%y")
                .map_err(|e| format!("{name}: bad date key `{key}`: {e}"))?;
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{name}: bad value {v} on {key}"));
            }
            Ok((date, v.round() as u64))
        })
        .collect::<Result<Vec<_>, String>>()?;
    // Keys sort as strings ("1/10/21" < "1/2/21"), so reorder by actual date.
    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

impl History {
    pub fn from_raw(raw: RawHistory) -> Result<Self, String> {
        Ok(Self {
            cases: parse_series("cases", raw.cases)?,
            recovered: parse_series("recovered", raw.recovered)?,
            deaths: parse_series("deaths", raw.deaths)?,
        })
    }

    pub fn series(&self, metric: Metric) -> &[(NaiveDate, u64)] {
        match metric {
            Metric::Cases => &self.cases,
            Metric::Recovered => &self.recovered,
            Metric::Deaths => &self.deaths,
        }
    }
}

/// New values per day for `metric`. The first day has no predecessor and is dropped;
/// downward corrections of the cumulative count clamp to zero.
pub fn daily_new(history: &History, metric: Metric) -> Vec<ChartPoint> {
    history
        .series(metric)
        .windows(2)
        .map(|w| ChartPoint {
            date: w[1].0,
            value: w[1].1.saturating_sub(w[0].1),
        })
        .collect()
}
