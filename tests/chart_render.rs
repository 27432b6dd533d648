use chrono::NaiveDate;
use covid_dash::Metric;
use covid_dash::chart::render_svg;
use covid_dash::history::ChartPoint;
use covid_dash::view::ChartRequest;
use tempfile::tempdir;

fn request(values: &[u64]) -> ChartRequest {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    ChartRequest {
        metric: Metric::Deaths,
        title: "Worldwide new deaths".into(),
        points: values
            .iter()
            .enumerate()
            .map(|(i, v)| ChartPoint {
                date: start + chrono::Duration::days(i as i64),
                value: *v,
            })
            .collect(),
    }
}

#[test]
fn writes_svg_with_title_and_metric_colour() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("chart.svg");
    render_svg(&request(&[1200, 5400, 3100, 8000]), &out, 800, 480, "en").unwrap();

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg") || svg.contains("<svg"));
    assert!(svg.contains("Worldwide new deaths"));
    assert!(svg.contains("thousands"));
    // Metric colour #FB4443 appears in the line/area styles.
    assert!(svg.to_uppercase().contains("FB4443"));
}

#[test]
fn empty_chart_is_an_error() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("empty.svg");
    assert!(render_svg(&request(&[]), &out, 800, 480, "en").is_err());
    assert!(!out.exists());
}
