// src/gui.rs
use crate::config::{MAX_POINTS, TICK_INTERVAL, Y_AXIS_MAX, Y_AXIS_MIN};
use crate::engine::{Session, TickOutcome};
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Instant;

const LINE_COLOR: Color32 = Color32::from_rgb(0, 128, 0);

pub struct SonarApp {
    session: Session,
    csv_path: PathBuf,
    last_tick: Option<Instant>,
    last_error: Option<String>,
    log_messages: Vec<String>,
}

impl SonarApp {
    pub fn new(session: Session, csv_path: PathBuf) -> Self {
        let mut app = Self {
            session,
            csv_path,
            last_tick: None,
            last_error: None,
            log_messages: vec![],
        };
        let msg = format!("Data will be saved to: {}", app.csv_path.display());
        app.log(&msg);
        app
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    /// One read-write step. Errors stop here; the next tick runs as usual.
    fn run_tick(&mut self) {
        match self.session.tick() {
            Ok(TickOutcome::Accepted(r)) => {
                log::trace!("{} -> {} cm", r.timestamp_label(), r.distance_cm);
                self.last_error = None;
            }
            Ok(TickOutcome::Idle) | Ok(TickOutcome::Rejected(_)) => {}
            Err(e) => {
                log::error!("Error reading data: {e}");
                let msg = format!("Error reading data: {e}");
                self.log(&msg);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        let port = self.session.source();
        ui.horizontal_wrapped(|ui| {
            ui.label(format!("Port: {} @ {} baud", port.port_name(), port.baud_rate()));
            ui.separator();
            ui.label(format!("Rows: {}", self.session.rows_written()));
            ui.separator();
            if let Some(r) = self.session.window().latest() {
                ui.label(format!("Last: {} cm at {}", r.distance_cm, r.timestamp_label()));
                ui.separator();
            }
            ui.label(format!("File: {}", self.csv_path.display()));
        });
        if let Some(err) = &self.last_error {
            ui.colored_label(Color32::from_rgb(200, 50, 50), err);
        }
    }

    fn show_chart(&self, ui: &mut egui::Ui) {
        let window = self.session.window();
        let points = window.plot_points();
        let labels = window.labels();
        let hover_labels = labels.clone();
        let x_max = points.len().max(2) as f64 - 1.0;

        Plot::new("distance_plot")
            .x_axis_label("Time")
            .y_axis_label("Distance (cm)")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .x_axis_formatter(move |x: f64, _max_chars: usize, _range: &RangeInclusive<f64>| {
                label_at(&labels, x)
            })
            .label_formatter(move |_name, p| {
                format!("{}\n{:.0} cm", label_at(&hover_labels, p.x), p.y)
            })
            .show(ui, |plot_ui| {
                // y 轴固定在 0..50，超出部分画到图外
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [-0.5, Y_AXIS_MIN],
                    [x_max + 0.5, Y_AXIS_MAX],
                ));
                if points.is_empty() {
                    return;
                }
                plot_ui.line(
                    Line::new(PlotPoints::new(points.clone()))
                        .color(LINE_COLOR)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(3.0)
                        .color(LINE_COLOR),
                );
            });
    }
}

/// At most one tick per [`TICK_INTERVAL`]; a late frame runs one tick, never a backlog.
fn tick_due(last_tick: Option<Instant>, now: Instant) -> bool {
    last_tick
        .map(|t| now.saturating_duration_since(t) >= TICK_INTERVAL)
        .unwrap_or(true)
}

/// Tick label for a plot x position: the timestamp of the sample at that index.
fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

impl eframe::App for SonarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if tick_due(self.last_tick, now) {
            self.last_tick = Some(now);
            self.run_tick();
        }
        ctx.request_repaint_after(TICK_INTERVAL);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.show_status(ui);
            egui::CollapsingHeader::new("Logs")
                .default_open(false)
                .show(ui, |ui| {
                    for m in &self.log_messages {
                        ui.monospace(m);
                    }
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Live Ultrasonic Distance Data");
            });
            ui.label(format!(
                "Last {} readings. Close the window to stop and save.",
                MAX_POINTS
            ));
            self.show_chart(ui);
        });
    }
}
