//! covid_dash
//!
//! A small Rust library for fetching global and per-country COVID-19 statistics and
//! turning them into dashboard payloads. Pairs with the `covid-dash` CLI and the
//! `covid-dash-gui` desktop dashboard.
//!
//! ### Features
//! - Fetch the worldwide snapshot, every country's snapshot, or a single country
//! - Stable "cases by country" ordering and compact number formatting (`+1,234`, `2.3m`)
//! - Selection state with last-request-wins handling of overlapping fetches
//! - Summary cards, proportional map markers, table lines and a daily-new chart
//! - Render the chart as SVG
//!
//! ### Example
//! ```no_run
//! use covid_dash::{Client, Session, Config};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = Config::default();
//! let mut session = Session::new(Arc::new(Client::new(&config)?), config.history_days);
//! session.start();
//! session.wait_idle(Duration::from_secs(60))?;
//! session.select_country("DE")?;
//! session.wait_idle(Duration::from_secs(60))?;
//! let dash = session.dashboard();
//! println!("{}: {} cases", dash.country_label, dash.cards[0].total);
//! covid_dash::chart::render_svg(&dash.chart, "new_cases.svg", 1000, 600, "en")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod normalize;
pub mod session;
pub mod state;
pub mod task;
pub mod view;

pub use api::{Client, StatSource};
pub use config::Config;
pub use error::DashError;
pub use models::{CountryOption, CountrySnapshot, LatLng, MapPoint, Metric, Selection, TableRow};
pub use session::Session;
pub use state::{Receipt, SelectionState};
pub use view::{Dashboard, compose};
