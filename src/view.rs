//! Pure derivation of the four display payloads from [`SelectionState`].
//!
//! Nothing here holds state: call [`compose`] again after every state change.

use crate::history::{ChartPoint, daily_new};
use crate::models::{CountryOption, LatLng, Metric, Selection};
use crate::normalize::{format_count, format_delta, format_total};
use crate::state::SelectionState;
use std::f64::consts::PI;

/// One of the three clickable metric cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub metric: Metric,
    pub title: &'static str,
    /// Today's change, e.g. `+1,234` or `0`.
    pub delta: String,
    /// Cumulative total, e.g. `2.3m`.
    pub total: String,
    pub active: bool,
    pub red: bool,
}

/// A proportional circle on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub position: LatLng,
    pub radius_m: f64,
    pub rgb: [u8; 3],
    pub country: String,
    pub cases: String,
    pub recovered: String,
    pub deaths: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub metric: Metric,
    pub markers: Vec<MapMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLine {
    pub country: String,
    pub cases: String,
}

/// Worldwide daily-new series for the active metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub metric: Metric,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// Code held by the dropdown (`worldwide` or a country code).
    pub selected_code: String,
    /// Human label of the selection, e.g. `Worldwide` or `Germany`.
    pub country_label: String,
    pub options: Vec<CountryOption>,
    pub cards: [SummaryCard; 3],
    pub map: MapView,
    pub table: Vec<TableLine>,
    pub chart: ChartRequest,
    pub notice: Option<String>,
    pub loading: bool,
}

fn card(state: &SelectionState, metric: Metric) -> SummaryCard {
    let snap = state.snapshot();
    SummaryCard {
        metric,
        title: metric.card_title(),
        delta: format_delta(snap.and_then(|s| s.today(metric))),
        total: format_total(snap.map(|s| s.total(metric)).unwrap_or(0)),
        active: state.active_metric() == metric,
        red: metric.is_red(),
    }
}

pub fn compose(state: &SelectionState) -> Dashboard {
    let metric = state.active_metric();

    let country_label = match state.active_country() {
        Selection::Worldwide => "Worldwide".to_string(),
        Selection::Country(code) => state
            .country_options()
            .iter()
            .find(|o| &o.code == code)
            .map(|o| o.display_name.clone())
            .unwrap_or_else(|| code.clone()),
    };

    let markers = state
        .map_points()
        .into_iter()
        .map(|p| MapMarker {
            position: p.snapshot.position(),
            radius_m: p.radius_m(),
            rgb: metric.rgb(),
            cases: format_count(p.snapshot.total_cases),
            recovered: format_count(p.snapshot.total_recovered),
            deaths: format_count(p.snapshot.total_deaths),
            country: p.snapshot.country_name,
        })
        .collect();

    let table = state
        .table_rows()
        .iter()
        .map(|r| TableLine {
            country: r.country_name.clone(),
            cases: format_count(r.total_cases),
        })
        .collect();

    let chart = ChartRequest {
        metric,
        title: format!("Worldwide new {}", metric),
        points: state
            .history()
            .map(|h| daily_new(h, metric))
            .unwrap_or_default(),
    };

    Dashboard {
        selected_code: state.active_country().code().to_string(),
        country_label,
        options: state.country_options().to_vec(),
        cards: [
            card(state, Metric::Cases),
            card(state, Metric::Recovered),
            card(state, Metric::Deaths),
        ],
        map: MapView {
            center: state.map_center(),
            zoom: state.map_zoom(),
            metric,
            markers,
        },
        table,
        chart,
        notice: state.notice().map(str::to_string),
        loading: !state.is_idle(),
    }
}

// ---------------------------------------------------------------------------
// Web-Mercator helpers for drawing the map
// ---------------------------------------------------------------------------

const TILE_PX: f64 = 256.0;
const MAX_LAT: f64 = 85.051_128_78;
/// Ground resolution at the equator at zoom 0, in metres per pixel.
const EQUATOR_M_PER_PX: f64 = 156_543.033_92;

/// Width of the whole world in pixels at `zoom`.
pub fn world_px(zoom: u8) -> f64 {
    TILE_PX * 2f64.powi(i32::from(zoom))
}

/// Normalised Web-Mercator coordinates in `[0, 1]`.
fn mercator(p: LatLng) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (p.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Pixel position of `p` in a `viewport` (width, height) centred on `center`.
pub fn project(p: LatLng, center: LatLng, zoom: u8, viewport: (f64, f64)) -> (f64, f64) {
    let w = world_px(zoom);
    let (px, py) = mercator(p);
    let (cx, cy) = mercator(center);
    (viewport.0 / 2.0 + (px - cx) * w, viewport.1 / 2.0 + (py - cy) * w)
}

/// Metres covered by one pixel at latitude `lat` and `zoom`.
pub fn metres_per_pixel(lat: f64, zoom: u8) -> f64 {
    EQUATOR_M_PER_PX * lat.clamp(-MAX_LAT, MAX_LAT).to_radians().cos() / 2f64.powi(i32::from(zoom))
}
