//! Glue between [`SelectionState`] and the background [`Dispatcher`].
//!
//! The GUI calls [`Session::pump`] once per frame; the CLI blocks in
//! [`Session::wait_idle`].

use crate::api::StatSource;
use crate::error::DashError;
use crate::models::Metric;
use crate::state::{Receipt, SelectionState};
use crate::task::{Completion, Dispatcher, FetchRequest, Waker};
use crate::view::{Dashboard, compose};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct Session {
    state: SelectionState,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(source: Arc<dyn StatSource>, history_days: u32) -> Self {
        Self {
            state: SelectionState::new(history_days),
            dispatcher: Dispatcher::new(source),
        }
    }

    /// Invoke `waker` from the worker thread whenever a result is queued.
    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.dispatcher = self.dispatcher.with_waker(waker);
        self
    }

    fn send(&mut self, req: FetchRequest) {
        self.dispatcher.dispatch(req);
    }

    /// Kick off the initial global, country-list and history fetches.
    pub fn start(&mut self) {
        for req in self.state.start() {
            self.send(req);
        }
    }

    pub fn select_country(&mut self, code: &str) -> Result<(), DashError> {
        let req = self.state.select_country(code)?;
        self.send(req);
        Ok(())
    }

    pub fn select_metric(&mut self, metric: Metric) {
        self.state.select_metric(metric);
    }

    pub fn refresh_countries(&mut self) {
        let req = self.state.refresh_countries();
        self.send(req);
    }

    pub fn dismiss_notice(&mut self) {
        self.state.dismiss_notice();
    }

    fn apply(&mut self, completion: Completion) -> Receipt {
        let receipt = self.state.receive(completion);
        if let Receipt::Applied {
            follow_up: Some(req),
        } = &receipt
        {
            self.send(req.clone());
        }
        receipt
    }

    /// Apply every completion that is already available. Returns how many changed the state.
    pub fn pump(&mut self) -> usize {
        let mut changed = 0;
        while let Some(c) = self.dispatcher.try_next() {
            if self.apply(c) != Receipt::Discarded {
                changed += 1;
            }
        }
        changed
    }

    /// Block until no request is outstanding, or fail with `DataUnavailable` at `timeout`.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<(), DashError> {
        let deadline = Instant::now() + timeout;
        while !self.state.is_idle() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.dispatcher.next_timeout(left) {
                Some(c) => {
                    self.apply(c);
                }
                None => {
                    return Err(DashError::DataUnavailable(format!(
                        "no response within {:?}",
                        timeout
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn dashboard(&self) -> Dashboard {
        compose(&self.state)
    }
}
