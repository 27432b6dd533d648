/*!
 * Desktop dashboard for covid-dash
 *
 * A single window showing:
 * - A country dropdown (Worldwide + every country the API lists)
 * - Three clickable metric cards (cases, recovered, deaths)
 * - A proportional-circle map coloured by the active metric
 * - Countries ordered by total cases, and the worldwide daily-new chart
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Result;
use covid_dash::models::{LatLng, WORLDWIDE};
use covid_dash::normalize::{format_count, format_total};
use covid_dash::view::{
    ChartRequest, Dashboard, MapMarker, MapView, SummaryCard, metres_per_pixel, project,
};
use covid_dash::{Client, Config, Metric, Session};
use eframe::egui;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::default();
    let client = Client::new(&config)?;
    let history_days = config.history_days;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("COVID-19 Tracker - covid-dash"),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19 Tracker",
        options,
        Box::new(move |cc| Ok(Box::new(DashApp::new(cc, client, history_days)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// User intents collected while drawing a frame, applied afterwards.
enum Action {
    SelectCountry(String),
    SelectMetric(Metric),
    Refresh,
    DismissNotice,
}

struct DashApp {
    session: Session,
    dash: Dashboard,
}

impl DashApp {
    fn new(cc: &eframe::CreationContext<'_>, client: Client, history_days: u32) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut session = Session::new(Arc::new(client), history_days)
            .with_waker(Arc::new(move || ctx.request_repaint()));
        session.start();
        let dash = session.dashboard();
        Self { session, dash }
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::SelectCountry(code) => {
                if let Err(err) = self.session.select_country(&code) {
                    log::warn!("{err}");
                }
            }
            Action::SelectMetric(metric) => self.session.select_metric(metric),
            Action::Refresh => self.session.refresh_countries(),
            Action::DismissNotice => self.session.dismiss_notice(),
        }
        self.dash = self.session.dashboard();
    }
}

impl eframe::App for DashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.pump() > 0 {
            self.dash = self.session.dashboard();
        }

        // Request repaint if loading (for spinner animation)
        if self.dash.loading {
            ctx.request_repaint();
        }

        let mut action: Option<Action> = None;
        let dash = &self.dash;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            header(ui, dash, &mut action);
        });

        egui::SidePanel::right("information")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.heading("Cases by country");
                ui.add_space(5.0);
                table(ui, dash);
                ui.add_space(10.0);
                chart(ui, &dash.chart);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(3, |cols| {
                for (col, card) in cols.iter_mut().zip(dash.cards.iter()) {
                    if summary_card(col, card).clicked() {
                        action = Some(Action::SelectMetric(card.metric));
                    }
                }
            });
            ui.add_space(10.0);
            map(ui, &dash.map);
        });

        if let Some(action) = action {
            self.handle(action);
        }
    }
}

fn header(ui: &mut egui::Ui, dash: &Dashboard, action: &mut Option<Action>) {
    ui.horizontal(|ui| {
        ui.heading("COVID-19 TRACKER");
        ui.add_space(20.0);

        egui::ComboBox::from_id_salt("country")
            .selected_text(dash.country_label.as_str())
            .width(240.0)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(dash.selected_code == WORLDWIDE, "Worldwide")
                    .clicked()
                {
                    *action = Some(Action::SelectCountry(WORLDWIDE.to_string()));
                }
                for opt in &dash.options {
                    if ui
                        .selectable_label(dash.selected_code == opt.code, opt.display_name.as_str())
                        .clicked()
                    {
                        *action = Some(Action::SelectCountry(opt.code.clone()));
                    }
                }
            });

        if ui.button("Refresh countries").clicked() {
            *action = Some(Action::Refresh);
        }

        if dash.loading {
            ui.spinner();
        }

        if let Some(notice) = &dash.notice {
            ui.colored_label(egui::Color32::RED, notice.as_str());
            if ui.small_button("Dismiss").clicked() {
                *action = Some(Action::DismissNotice);
            }
        }
    });
}

fn accent(red: bool) -> egui::Color32 {
    let [r, g, b] = if red {
        Metric::Cases.rgb()
    } else {
        Metric::Recovered.rgb()
    };
    egui::Color32::from_rgb(r, g, b)
}

fn summary_card(ui: &mut egui::Ui, card: &SummaryCard) -> egui::Response {
    let color = accent(card.red);
    let stroke = if card.active {
        egui::Stroke::new(3.0, color)
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };
    let inner = egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new(card.title).color(egui::Color32::GRAY));
        ui.label(egui::RichText::new(card.delta.as_str()).size(26.0).strong().color(color));
        ui.label(egui::RichText::new(format!("{} Total", card.total)).strong());
    });
    inner.response.interact(egui::Sense::click())
}

fn map(ui: &mut egui::Ui, map: &MapView) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, egui::Color32::from_rgb(0xE8, 0xEE, 0xF2));

    let viewport = (f64::from(rect.width()), f64::from(rect.height()));
    let to_screen = |p: LatLng| {
        let (x, y) = project(p, map.center, map.zoom, viewport);
        egui::pos2(rect.left() + x as f32, rect.top() + y as f32)
    };

    let grid = egui::Stroke::new(0.5, egui::Color32::from_gray(190));
    for lng in (-180..=180).step_by(30) {
        let lng = f64::from(lng);
        painter.line_segment(
            [to_screen(LatLng::new(85.0, lng)), to_screen(LatLng::new(-85.0, lng))],
            grid,
        );
    }
    for lat in (-60..=60).step_by(30) {
        let lat = f64::from(lat);
        painter.line_segment(
            [to_screen(LatLng::new(lat, -180.0)), to_screen(LatLng::new(lat, 180.0))],
            grid,
        );
    }

    let hover = response.hover_pos();
    let mut hovered: Option<&MapMarker> = None;
    for m in &map.markers {
        let center = to_screen(m.position);
        let radius = (m.radius_m / metres_per_pixel(m.position.lat, map.zoom)) as f32;
        let radius = radius.max(1.0);
        let [r, g, b] = m.rgb;
        painter.circle(
            center,
            radius,
            egui::Color32::from_rgba_unmultiplied(r, g, b, 70),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(r, g, b)),
        );
        if let Some(pos) = hover
            && pos.distance(center) <= radius.max(3.0)
        {
            hovered = Some(m);
        }
    }

    if let Some(m) = hovered {
        response.on_hover_text_at_pointer(format!(
            "{}\nCases: {}\nRecovered: {}\nDeaths: {}",
            m.country, m.cases, m.recovered, m.deaths
        ));
    }
}

fn table(ui: &mut egui::Ui, dash: &Dashboard) {
    egui::ScrollArea::vertical()
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui| {
            egui::Grid::new("cases_by_country")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    for line in &dash.table {
                        ui.label(line.country.as_str());
                        ui.strong(line.cases.as_str());
                        ui.end_row();
                    }
                });
        });
}

fn chart(ui: &mut egui::Ui, chart: &ChartRequest) {
    ui.heading(chart.title.as_str());
    let size = egui::vec2(ui.available_width(), ui.available_height().max(160.0));
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect.shrink(8.0);

    if chart.points.len() < 2 {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "No history yet",
            egui::FontId::proportional(14.0),
            egui::Color32::GRAY,
        );
        return;
    }

    let [r, g, b] = chart.metric.rgb();
    let color = egui::Color32::from_rgb(r, g, b);
    let max = chart.points.iter().map(|p| p.value).max().unwrap_or(1).max(1);
    let last = (chart.points.len() - 1) as f32;
    let pts: Vec<egui::Pos2> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            egui::pos2(
                rect.left() + rect.width() * i as f32 / last,
                rect.bottom() - rect.height() * p.value as f32 / max as f32,
            )
        })
        .collect();

    let axis = egui::Stroke::new(1.0, egui::Color32::GRAY);
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], axis);
    painter.line_segment([rect.left_bottom(), rect.left_top()], axis);
    painter.add(egui::Shape::line(pts.clone(), egui::Stroke::new(2.0, color)));
    painter.text(
        rect.left_top(),
        egui::Align2::LEFT_TOP,
        format_total(max),
        egui::FontId::proportional(11.0),
        egui::Color32::GRAY,
    );

    if let Some(pos) = response.hover_pos() {
        let i = (((pos.x - rect.left()) / rect.width()) * last).round();
        let i = i.clamp(0.0, last) as usize;
        let p = chart.points[i];
        painter.circle_filled(pts[i], 3.0, color);
        response.on_hover_text_at_pointer(format!(
            "{}: {}",
            p.date.format("%b %d, %Y"),
            format_count(p.value)
        ));
    }
}
