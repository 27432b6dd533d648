//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use covid_dash::{Client, StatSource};

#[test]
fn fetch_global_snapshot() {
    let cli = Client::default();
    let world = cli.fetch_global().unwrap();
    assert!(world.total_cases > 0);
}

#[test]
fn fetch_countries_and_one_country() {
    let cli = Client::default();
    let list = cli.fetch_all_countries().unwrap();
    assert!(list.len() > 100);
    let de = list.iter().find(|c| c.country_code == "DE").unwrap();
    let single = cli.fetch_country(&de.country_code).unwrap();
    assert_eq!(single.country_name, de.country_name);
}

#[test]
fn fetch_history_window() {
    let cli = Client::default();
    let h = cli.fetch_history(30).unwrap();
    assert_eq!(h.cases.len(), 30);
}
