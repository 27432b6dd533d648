//! Render the chart payload to an **SVG** file.
//!
//! - Area + line of daily new values, coloured by metric
//! - Locale-aware tick labels (`30,000` vs `30.000`)
//! - Y axis scaled to thousands/millions when values get large

use crate::view::ChartRequest;
use anyhow::{Result, anyhow};
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::FontFamily;
use plotters_svg::SVGBackend;
use std::path::Path;

/// Number locale for a tag like `de`, `de-AT` or `pt_BR.UTF-8`.
///
/// Only the language subtag is looked up; anything `num_format` does not know is English.
pub fn tick_locale(tag: &str) -> Locale {
    let lang = tag.split(['-', '_', '.']).next().unwrap_or_default();
    Locale::from_name(lang.to_ascii_lowercase()).unwrap_or(Locale::en)
}

const AXIS_SCALES: [(f64, &str); 3] = [
    (1.0e9, "billions"),
    (1.0e6, "millions"),
    (1.0e3, "thousands"),
];

/// Divisor and label for the Y axis given the largest value, e.g. `(1e6, "millions")`.
pub fn axis_scale(max: f64) -> (f64, &'static str) {
    AXIS_SCALES
        .into_iter()
        .find(|&(scale, _)| max >= scale)
        .unwrap_or((1.0, ""))
}

/// Tick label for an already scaled value: whole numbers grouped, otherwise one decimal.
pub fn format_tick(v: f64, locale: &Locale) -> String {
    let rounded = (v * 10.0).round() / 10.0;
    let whole = rounded.trunc();
    let int_part = (whole.abs() as u64).to_formatted_string(locale);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let tenths = ((rounded - whole).abs() * 10.0).round() as u64;
    if tenths == 0 {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}{}{tenths}", locale.decimal())
    }
}

/// Write `chart` as an SVG line chart of `width` x `height` pixels.
pub fn render_svg<P: AsRef<Path>>(
    chart: &ChartRequest,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    if chart.points.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let path_string = out_path.as_ref().to_string_lossy().into_owned();
    let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
    draw_chart(root, chart, locale_tag)
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, chart: &ChartRequest, locale_tag: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;
    let num_locale = tick_locale(locale_tag);
    let [r, g, b] = chart.metric.rgb();
    let color = RGBColor(r, g, b);

    let max_val = chart.points.iter().map(|p| p.value).max().unwrap_or(0) as f64;
    let (yscale, scale_word) = axis_scale(max_val);
    let y_max = (max_val / yscale * 1.05).max(1.0);
    let x_max = (chart.points.len().saturating_sub(1)).max(1) as f64;

    let y_axis_title = if scale_word.is_empty() {
        format!("New {}", chart.metric)
    } else {
        format!("New {} ({})", chart.metric, scale_word)
    };

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(chart.title.as_str(), (FontFamily::SansSerif, 22))
        .set_label_area_size(LabelAreaPosition::Left, 72)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let dates: Vec<String> = chart
        .points
        .iter()
        .map(|p| p.date.format("%m/%d/%y").to_string())
        .collect();
    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if i < 0.0 {
            return String::new();
        }
        dates.get(i as usize).cloned().unwrap_or_default()
    };
    let y_label_fmt = |y: &f64| format_tick(*y, &num_locale);

    ctx.configure_mesh()
        .disable_x_mesh()
        .y_desc(y_axis_title)
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let series: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value as f64 / yscale))
        .collect();

    ctx.draw_series(AreaSeries::new(series.iter().copied(), 0.0, color.mix(0.5)))
        .map_err(|e| anyhow!("{:?}", e))?;
    ctx.draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
