//! Background fetches tagged with the ticket they were issued under.
//!
//! Each [`FetchRequest`] runs on its own short-lived thread and reports back over an
//! `mpsc` channel. The owner of [`crate::state::SelectionState`] drains the channel on its
//! own thread and hands each [`Completion`] to `SelectionState::receive`, which compares
//! the ticket against the latest one issued and drops stale results.

use crate::api::StatSource;
use crate::error::DashError;
use crate::history::History;
use crate::models::CountrySnapshot;
use log::debug;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Monotonic request identifier handed out by the selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// What a request asks the [`StatSource`] for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Global,
    Country(String),
    AllCountries,
    History { days: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub target: FetchTarget,
}

/// Result of one request, keyed by what was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Global(Result<CountrySnapshot, DashError>),
    Country {
        code: String,
        result: Result<CountrySnapshot, DashError>,
    },
    Countries(Result<Vec<CountrySnapshot>, DashError>),
    History(Result<History, DashError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub ticket: Ticket,
    pub fetched: Fetched,
}

/// Run `req` against `source` on the calling thread.
pub fn execute(source: &dyn StatSource, req: FetchRequest) -> Completion {
    let fetched = match req.target {
        FetchTarget::Global => Fetched::Global(source.fetch_global()),
        FetchTarget::Country(code) => {
            let result = source.fetch_country(&code);
            Fetched::Country { code, result }
        }
        FetchTarget::AllCountries => Fetched::Countries(source.fetch_all_countries()),
        FetchTarget::History { days } => Fetched::History(source.fetch_history(days)),
    };
    Completion {
        ticket: req.ticket,
        fetched,
    }
}

/// Called from worker threads after a completion has been queued (e.g. to wake a GUI).
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Spawns one worker per request and collects completions in arrival order.
pub struct Dispatcher {
    source: Arc<dyn StatSource>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    waker: Option<Waker>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn StatSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            waker: None,
            in_flight: 0,
        }
    }

    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    /// Start `req` in the background. Never blocks.
    pub fn dispatch(&mut self, req: FetchRequest) {
        debug!("dispatching {:?} as ticket {}", req.target, req.ticket.0);
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let waker = self.waker.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let completion = execute(source.as_ref(), req);
            // The receiver is gone only when the session has been dropped.
            if tx.send(completion).is_ok()
                && let Some(wake) = waker
            {
                wake();
            }
        });
    }

    /// Next completion if one is ready.
    pub fn try_next(&mut self) -> Option<Completion> {
        let c = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(c)
    }

    /// Wait up to `timeout` for the next completion.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(c) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(c)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Requests dispatched whose completion has not been taken yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
