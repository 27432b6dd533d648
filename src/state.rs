//! Session-lifetime dashboard state.
//!
//! All mutations go through the named transitions on [`SelectionState`]:
//! `start`, `select_country`, `select_metric`, `refresh_countries` and `receive`.
//! Every fetch is issued with a fresh [`Ticket`]; `receive` applies a completion only if
//! its ticket is the latest one issued for that slice (last request wins).

use crate::config::DEFAULT_HISTORY_DAYS;
use crate::error::DashError;
use crate::history::History;
use crate::models::{
    COUNTRY_MAP_ZOOM, CountryOption, CountrySnapshot, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM,
    LatLng, MapPoint, Metric, Selection, TableRow,
};
use crate::normalize::{sort_by_total_cases, to_country_options};
use crate::task::{Completion, FetchRequest, FetchTarget, Fetched, Ticket};
use log::{info, warn};

/// Latest ticket issued for one slice and whether it is still outstanding.
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    latest: Option<Ticket>,
    pending: bool,
}

impl Slot {
    fn issue(&mut self, ticket: Ticket) {
        self.latest = Some(ticket);
        self.pending = true;
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        self.pending && self.latest == Some(ticket)
    }

    fn settle(&mut self) {
        self.pending = false;
    }
}

/// What [`SelectionState::receive`] did with a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    /// The result replaced its slice. `follow_up` must be dispatched when present.
    Applied { follow_up: Option<FetchRequest> },
    /// The latest request for the slice failed; the slice is unchanged.
    Failed(DashError),
    /// A newer request for the slice had been issued; nothing changed.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    active_country: Selection,
    active_metric: Metric,
    snapshot: Option<CountrySnapshot>,
    country_options: Vec<CountryOption>,
    table_rows: Vec<TableRow>,
    map_dataset: Vec<CountrySnapshot>,
    map_center: LatLng,
    map_zoom: u8,
    history: Option<History>,
    history_days: u32,
    notice: Option<String>,
    next_ticket: u64,
    snapshot_slot: Slot,
    countries_slot: Slot,
    history_slot: Slot,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DAYS)
    }
}

impl SelectionState {
    pub fn new(history_days: u32) -> Self {
        Self {
            active_country: Selection::Worldwide,
            active_metric: Metric::Cases,
            snapshot: None,
            country_options: Vec::new(),
            table_rows: Vec::new(),
            map_dataset: Vec::new(),
            map_center: DEFAULT_MAP_CENTER,
            map_zoom: DEFAULT_MAP_ZOOM,
            history: None,
            history_days,
            notice: None,
            next_ticket: 0,
            snapshot_slot: Slot::default(),
            countries_slot: Slot::default(),
            history_slot: Slot::default(),
        }
    }

    fn issue(&mut self, target: FetchTarget) -> FetchRequest {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        match target {
            FetchTarget::Global | FetchTarget::Country(_) => self.snapshot_slot.issue(ticket),
            FetchTarget::AllCountries => self.countries_slot.issue(ticket),
            FetchTarget::History { .. } => self.history_slot.issue(ticket),
        }
        FetchRequest { ticket, target }
    }

    /// Initial load: worldwide snapshot, country list and chart history.
    pub fn start(&mut self) -> Vec<FetchRequest> {
        vec![
            self.issue(FetchTarget::Global),
            self.issue(FetchTarget::AllCountries),
            self.issue(FetchTarget::History {
                days: self.history_days,
            }),
        ]
    }

    /// Ask for the snapshot of `code` (`"worldwide"` or a code from the option list).
    ///
    /// The active country changes only once the response arrives. Unknown codes leave
    /// the state untouched.
    pub fn select_country(&mut self, code: &str) -> Result<FetchRequest, DashError> {
        let target = match Selection::from_code(code) {
            Selection::Worldwide => FetchTarget::Global,
            Selection::Country(code) if self.is_listed(&code) => FetchTarget::Country(code),
            Selection::Country(code) => return Err(DashError::UnknownCountry(code)),
        };
        Ok(self.issue(target))
    }

    pub fn select_metric(&mut self, metric: Metric) {
        self.active_metric = metric;
    }

    /// Re-fetch the country list; table rows are re-sorted when it arrives.
    pub fn refresh_countries(&mut self) -> FetchRequest {
        self.issue(FetchTarget::AllCountries)
    }

    /// Clear the last error message. Notices otherwise stay until dismissed.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Apply a fetch result if it answers the latest request for its slice.
    pub fn receive(&mut self, completion: Completion) -> Receipt {
        let Completion { ticket, fetched } = completion;
        let is_snapshot = matches!(fetched, Fetched::Global(_) | Fetched::Country { .. });
        let slot = match &fetched {
            Fetched::Global(_) | Fetched::Country { .. } => &mut self.snapshot_slot,
            Fetched::Countries(_) => &mut self.countries_slot,
            Fetched::History(_) => &mut self.history_slot,
        };
        if !slot.accepts(ticket) {
            warn!("discarding stale response for ticket {}", ticket.0);
            return Receipt::Discarded;
        }
        slot.settle();

        let result = match fetched {
            Fetched::Global(result) => result.map(|snap| {
                self.apply_snapshot(Selection::Worldwide, snap);
                None
            }),
            // The list may have been refreshed without this country while it was in flight.
            Fetched::Country { code, .. } if !self.is_listed(&code) => {
                Err(DashError::UnknownCountry(code))
            }
            Fetched::Country { code, result } => result.map(|snap| {
                self.apply_snapshot(Selection::Country(code), snap);
                None
            }),
            Fetched::Countries(result) => result.map(|list| self.apply_countries(list)),
            Fetched::History(result) => result.map(|history| {
                info!("history loaded ({} days)", history.cases.len());
                self.history = Some(history);
                None
            }),
        };

        match result {
            Ok(follow_up) => Receipt::Applied { follow_up },
            Err(e) => {
                warn!("fetch for ticket {} failed: {e}", ticket.0);
                if is_snapshot && !self.active_is_listed() {
                    self.drop_unlisted_selection();
                }
                self.notice = Some(e.to_string());
                Receipt::Failed(e)
            }
        }
    }

    fn apply_snapshot(&mut self, selection: Selection, snap: CountrySnapshot) {
        info!("showing {}", selection.code());
        // Only a specific country moves the map; going back to worldwide keeps the view.
        if let Selection::Country(_) = selection {
            self.map_center = snap.position();
            self.map_zoom = COUNTRY_MAP_ZOOM;
        }
        self.active_country = selection;
        self.snapshot = Some(snap);
    }

    fn apply_countries(&mut self, list: Vec<CountrySnapshot>) -> Option<FetchRequest> {
        info!("country list loaded ({} entries)", list.len());
        self.country_options = to_country_options(&list);
        self.table_rows = sort_by_total_cases(&list);
        self.map_dataset = list;

        if self.active_is_listed() {
            return None;
        }
        warn!(
            "active country {} is no longer listed, reverting to worldwide",
            self.active_country.code()
        );
        Some(self.issue(FetchTarget::Global))
    }

    fn is_listed(&self, code: &str) -> bool {
        self.country_options.iter().any(|o| o.code == code)
    }

    fn active_is_listed(&self) -> bool {
        match &self.active_country {
            Selection::Worldwide => true,
            Selection::Country(code) => self.is_listed(code),
        }
    }

    /// Fall back to worldwide without data when the shown country left the list and
    /// the worldwide snapshot could not be fetched.
    fn drop_unlisted_selection(&mut self) {
        warn!(
            "{} is no longer listed, falling back to worldwide",
            self.active_country.code()
        );
        self.active_country = Selection::Worldwide;
        self.snapshot = None;
    }

    pub fn active_country(&self) -> &Selection {
        &self.active_country
    }

    pub fn active_metric(&self) -> Metric {
        self.active_metric
    }

    /// Snapshot shown in the summary cards; `None` until the first response.
    pub fn snapshot(&self) -> Option<&CountrySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn country_options(&self) -> &[CountryOption] {
        &self.country_options
    }

    pub fn table_rows(&self) -> &[TableRow] {
        &self.table_rows
    }

    pub fn map_dataset(&self) -> &[CountrySnapshot] {
        &self.map_dataset
    }

    /// Map dataset paired with the active metric.
    pub fn map_points(&self) -> Vec<MapPoint> {
        self.map_dataset
            .iter()
            .map(|s| MapPoint {
                snapshot: s.clone(),
                metric: self.active_metric,
            })
            .collect()
    }

    pub fn map_center(&self) -> LatLng {
        self.map_center
    }

    pub fn map_zoom(&self) -> u8 {
        self.map_zoom
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// A country (or worldwide) selection is still waiting for its snapshot.
    pub fn is_selecting(&self) -> bool {
        self.snapshot_slot.pending
    }

    /// No request is outstanding for any slice.
    pub fn is_idle(&self) -> bool {
        !(self.snapshot_slot.pending || self.countries_slot.pending || self.history_slot.pending)
    }
}
