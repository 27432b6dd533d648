use covid_dash::api::{parse_countries, parse_global};
use covid_dash::models::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, LatLng, Metric, Selection};
use covid_dash::task::{Completion, FetchRequest, FetchTarget, Fetched};
use covid_dash::{CountrySnapshot, DashError, Receipt, SelectionState, compose};

const GLOBAL: &str = r#"{"cases":100,"todayCases":5,"recovered":50,"todayRecovered":2,"deaths":3,"todayDeaths":0}"#;
const COUNTRIES: &str = r#"[
    {"country":"A","countryInfo":{"iso2":"A","lat":1,"long":2},"cases":60,"recovered":0,"deaths":0},
    {"country":"B","countryInfo":{"iso2":"B","lat":3,"long":4},"cases":40,"recovered":0,"deaths":0}
]"#;

fn country(code: &str) -> CountrySnapshot {
    parse_countries(COUNTRIES)
        .unwrap()
        .into_iter()
        .find(|c| c.country_code == code)
        .unwrap()
}

fn answer_country(req: &FetchRequest) -> Completion {
    let code = match &req.target {
        FetchTarget::Country(code) => code.clone(),
        other => panic!("expected a country request, got {other:?}"),
    };
    Completion {
        ticket: req.ticket,
        fetched: Fetched::Country {
            result: Ok(country(&code)),
            code,
        },
    }
}

/// State after the initial global + country-list fetches resolved.
fn loaded() -> SelectionState {
    let mut st = SelectionState::default();
    let reqs = st.start();
    st.receive(Completion {
        ticket: reqs[0].ticket,
        fetched: Fetched::Global(parse_global(GLOBAL)),
    });
    st.receive(Completion {
        ticket: reqs[1].ticket,
        fetched: Fetched::Countries(parse_countries(COUNTRIES)),
    });
    st
}

#[test]
fn initial_state_defaults() {
    let st = SelectionState::default();
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert_eq!(st.active_metric(), Metric::Cases);
    assert_eq!(st.map_center(), DEFAULT_MAP_CENTER);
    assert_eq!(st.map_zoom(), DEFAULT_MAP_ZOOM);
    assert!(st.snapshot().is_none());
    assert!(st.country_options().is_empty());
    assert!(st.table_rows().is_empty());
    assert!(st.map_dataset().is_empty());
    assert!(st.is_idle());

    let dash = compose(&st);
    assert_eq!(dash.cards[0].total, "0");
    assert_eq!(dash.cards[0].delta, "0");
    assert!(dash.table.is_empty());
}

#[test]
fn initial_load_scenario() {
    let st = loaded();
    let rows: Vec<(&str, u64)> = st
        .table_rows()
        .iter()
        .map(|r| (r.country_name.as_str(), r.total_cases))
        .collect();
    assert_eq!(rows, vec![("A", 60), ("B", 40)]);

    let dash = compose(&st);
    let cases = &dash.cards[0];
    assert_eq!(cases.metric, Metric::Cases);
    assert_eq!(cases.total, "100");
    assert_eq!(cases.delta, "+5");
    assert!(cases.active);
    assert_eq!(dash.cards[1].delta, "+2");
    assert_eq!(dash.cards[2].delta, "0");
    assert_eq!(dash.country_label, "Worldwide");
    assert_eq!(dash.table[0].cases, "60");
    assert_eq!(dash.map.markers.len(), 2);
}

#[test]
fn selecting_a_country_recenters_the_map() {
    let mut st = loaded();
    let req = st.select_country("B").unwrap();
    assert_eq!(req.target, FetchTarget::Country("B".into()));
    // Nothing changes until the response arrives.
    assert_eq!(st.active_country(), &Selection::Worldwide);

    let options_before = st.country_options().to_vec();
    let rows_before = st.table_rows().to_vec();
    assert_eq!(st.receive(answer_country(&req)), Receipt::Applied { follow_up: None });

    assert_eq!(st.active_country(), &Selection::Country("B".into()));
    assert_eq!(st.map_center(), LatLng::new(3.0, 4.0));
    assert_eq!(st.map_zoom(), 5);
    assert_eq!(st.snapshot().unwrap().total_cases, 40);
    assert_eq!(st.country_options(), options_before.as_slice());
    assert_eq!(st.table_rows(), rows_before.as_slice());
    assert_eq!(compose(&st).country_label, "B");
}

#[test]
fn selecting_worldwide_keeps_the_map_view() {
    let mut st = loaded();
    let req = st.select_country("A").unwrap();
    st.receive(answer_country(&req));
    assert_eq!(st.map_center(), LatLng::new(1.0, 2.0));

    let req = st.select_country("worldwide").unwrap();
    assert_eq!(req.target, FetchTarget::Global);
    st.receive(Completion {
        ticket: req.ticket,
        fetched: Fetched::Global(parse_global(GLOBAL)),
    });
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert_eq!(st.snapshot().unwrap().total_cases, 100);
    assert_eq!(st.map_center(), LatLng::new(1.0, 2.0));
    assert_eq!(st.map_zoom(), 5);
}

#[test]
fn unknown_country_is_rejected_without_mutation() {
    let mut st = loaded();
    let before = format!("{st:?}");
    assert_eq!(
        st.select_country("ZZ"),
        Err(DashError::UnknownCountry("ZZ".into()))
    );
    assert_eq!(format!("{st:?}"), before);
}

#[test]
fn stale_response_is_discarded() {
    let mut st = loaded();
    let req_a = st.select_country("A").unwrap();
    let req_b = st.select_country("B").unwrap();

    assert_eq!(st.receive(answer_country(&req_b)), Receipt::Applied { follow_up: None });
    assert_eq!(st.receive(answer_country(&req_a)), Receipt::Discarded);

    assert_eq!(st.active_country(), &Selection::Country("B".into()));
    assert_eq!(st.snapshot().unwrap().country_code, "B");
    assert_eq!(st.map_center(), LatLng::new(3.0, 4.0));
}

#[test]
fn older_response_arriving_first_is_also_discarded() {
    let mut st = loaded();
    let req_a = st.select_country("A").unwrap();
    let req_b = st.select_country("B").unwrap();

    assert_eq!(st.receive(answer_country(&req_a)), Receipt::Discarded);
    assert!(st.is_selecting());
    assert_eq!(st.active_country(), &Selection::Worldwide);
    st.receive(answer_country(&req_b));
    assert_eq!(st.active_country(), &Selection::Country("B".into()));
}

#[test]
fn failed_fetch_leaves_slice_unchanged() {
    let mut st = loaded();
    let req = st.select_country("A").unwrap();
    let err = DashError::DataUnavailable("HTTP 502".into());
    let receipt = st.receive(Completion {
        ticket: req.ticket,
        fetched: Fetched::Country {
            code: "A".into(),
            result: Err(err.clone()),
        },
    });
    assert_eq!(receipt, Receipt::Failed(err));
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert_eq!(st.snapshot().unwrap().total_cases, 100);
    assert_eq!(st.map_center(), DEFAULT_MAP_CENTER);
    assert!(st.notice().unwrap().contains("HTTP 502"));
    assert!(!st.is_selecting());

    st.dismiss_notice();
    assert!(st.notice().is_none());
}

#[test]
fn metric_toggle_only_changes_the_metric() {
    let mut st = loaded();
    let before_rows = st.table_rows().to_vec();
    for m in [Metric::Deaths, Metric::Recovered, Metric::Cases, Metric::Deaths] {
        st.select_metric(m);
        assert_eq!(st.active_metric(), m);
        let dash = compose(&st);
        assert_eq!(dash.cards.iter().filter(|c| c.active).count(), 1);
        assert_eq!(dash.map.metric, m);
        assert!(dash.map.markers.iter().all(|mk| mk.rgb == m.rgb()));
        assert_eq!(dash.chart.metric, m);
    }
    assert_eq!(st.table_rows(), before_rows.as_slice());
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert_eq!(st.map_center(), DEFAULT_MAP_CENTER);
}

#[test]
fn refresh_resorts_the_table() {
    let mut st = loaded();
    let req = st.refresh_countries();
    assert_eq!(req.target, FetchTarget::AllCountries);
    let refreshed = r#"[
        {"country":"A","countryInfo":{"iso2":"A","lat":1,"long":2},"cases":60,"recovered":0,"deaths":0},
        {"country":"B","countryInfo":{"iso2":"B","lat":3,"long":4},"cases":90,"recovered":0,"deaths":0}
    ]"#;
    st.receive(Completion {
        ticket: req.ticket,
        fetched: Fetched::Countries(parse_countries(refreshed)),
    });
    let names: Vec<&str> = st.table_rows().iter().map(|r| r.country_name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
    // Options keep API order.
    assert_eq!(st.country_options()[0].code, "A");
}

const ONLY_A: &str = r#"[
    {"country":"A","countryInfo":{"iso2":"A","lat":1,"long":2},"cases":60,"recovered":0,"deaths":0}
]"#;

#[test]
fn country_dropped_by_refresh_is_not_shown_when_its_response_lands() {
    let mut st = loaded();
    let req = st.select_country("B").unwrap();
    let refresh = st.refresh_countries();
    assert_eq!(
        st.receive(Completion {
            ticket: refresh.ticket,
            fetched: Fetched::Countries(parse_countries(ONLY_A)),
        }),
        Receipt::Applied { follow_up: None }
    );

    assert_eq!(
        st.receive(answer_country(&req)),
        Receipt::Failed(DashError::UnknownCountry("B".into()))
    );
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert_eq!(st.snapshot().unwrap().total_cases, 100);
    assert_eq!(st.map_center(), DEFAULT_MAP_CENTER);
    assert!(st.notice().unwrap().contains("`B`"));
    assert!(!st.is_selecting());
}

#[test]
fn failed_revert_still_leaves_worldwide() {
    let mut st = loaded();
    let req = st.select_country("B").unwrap();
    st.receive(answer_country(&req));
    assert_eq!(st.active_country(), &Selection::Country("B".into()));

    let refresh = st.refresh_countries();
    let revert = match st.receive(Completion {
        ticket: refresh.ticket,
        fetched: Fetched::Countries(parse_countries(ONLY_A)),
    }) {
        Receipt::Applied { follow_up: Some(r) } => r,
        other => panic!("expected a worldwide follow-up, got {other:?}"),
    };
    assert_eq!(revert.target, FetchTarget::Global);

    let err = DashError::DataUnavailable("HTTP 503".into());
    assert_eq!(
        st.receive(Completion {
            ticket: revert.ticket,
            fetched: Fetched::Global(Err(err.clone())),
        }),
        Receipt::Failed(err)
    );
    assert_eq!(st.active_country(), &Selection::Worldwide);
    assert!(st.snapshot().is_none());
    assert!(st.notice().unwrap().contains("HTTP 503"));

    let dash = compose(&st);
    assert_eq!(dash.country_label, "Worldwide");
    assert_eq!(dash.cards[0].total, "0");
}

#[test]
fn failed_country_fetch_keeps_a_still_listed_selection() {
    let mut st = loaded();
    let req = st.select_country("A").unwrap();
    st.receive(answer_country(&req));

    let req = st.select_country("B").unwrap();
    st.receive(Completion {
        ticket: req.ticket,
        fetched: Fetched::Country {
            code: "B".into(),
            result: Err(DashError::DataUnavailable("timeout".into())),
        },
    });
    assert_eq!(st.active_country(), &Selection::Country("A".into()));
    assert_eq!(st.snapshot().unwrap().country_code, "A");
}

#[test]
fn history_feeds_the_chart() {
    let mut st = SelectionState::new(3);
    let reqs = st.start();
    assert_eq!(reqs[2].target, FetchTarget::History { days: 3 });
    let h = covid_dash::api::parse_history(
        r#"{"cases":{"1/1/21":10,"1/2/21":15,"1/3/21":25},
            "deaths":{"1/1/21":1,"1/2/21":1,"1/3/21":2},
            "recovered":{"1/1/21":0,"1/2/21":4,"1/3/21":9}}"#,
    );
    st.receive(Completion {
        ticket: reqs[2].ticket,
        fetched: Fetched::History(h),
    });
    let dash = compose(&st);
    assert_eq!(dash.chart.title, "Worldwide new cases");
    let vals: Vec<u64> = dash.chart.points.iter().map(|p| p.value).collect();
    assert_eq!(vals, vec![5, 10]);

    st.select_metric(Metric::Deaths);
    let vals: Vec<u64> = compose(&st).chart.points.iter().map(|p| p.value).collect();
    assert_eq!(vals, vec![0, 1]);
}
