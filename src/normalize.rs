//! Projection, ordering and display formatting of country snapshots.

use crate::models::{CountryOption, CountrySnapshot, TableRow};
use num_format::{Locale, ToFormattedString};

/// Dropdown entries, one per snapshot, in input order.
pub fn to_country_options(snapshots: &[CountrySnapshot]) -> Vec<CountryOption> {
    snapshots
        .iter()
        .map(|s| CountryOption {
            display_name: s.country_name.clone(),
            code: s.country_code.clone(),
        })
        .collect()
}

/// Table rows ordered by total cases, largest first.
///
/// The sort is stable: countries with equal totals keep their input order.
pub fn sort_by_total_cases(snapshots: &[CountrySnapshot]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = snapshots
        .iter()
        .map(|s| TableRow {
            country_name: s.country_name.clone(),
            total_cases: s.total_cases,
        })
        .collect();
    rows.sort_by(|a, b| b.total_cases.cmp(&a.total_cases));
    rows
}

/// Daily delta for a summary card: `"+1,234"`, or `"0"` when absent, zero or negative.
pub fn format_delta(n: Option<i64>) -> String {
    match n {
        Some(v) if v > 0 => format!("+{}", v.to_formatted_string(&Locale::en)),
        _ => "0".to_string(),
    }
}

const MAGNITUDES: [(f64, &str); 3] = [(1.0e3, "k"), (1.0e6, "m"), (1.0e9, "b")];

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Abbreviated cumulative total: `950`, `1.5k`, `2.3m`, `4.0b`.
pub fn format_total(n: u64) -> String {
    if n < 1_000 {
        return n.to_string();
    }
    let v = n as f64;
    let mut idx = MAGNITUDES
        .iter()
        .rposition(|(scale, _)| v >= *scale)
        .unwrap_or(0);
    let mut scaled = round1(v / MAGNITUDES[idx].0);
    // 999_950 rounds to 1000.0k; show it as 1.0m instead.
    if scaled >= 1000.0 && idx + 1 < MAGNITUDES.len() {
        idx += 1;
        scaled = round1(v / MAGNITUDES[idx].0);
    }
    format!("{:.1}{}", scaled, MAGNITUDES[idx].1)
}

/// Full count with thousands separators, as shown in the table.
pub fn format_count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}
