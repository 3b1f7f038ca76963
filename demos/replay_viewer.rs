//! Demo: Interactive timeline replay viewer
//!
//! What it demonstrates
//! - Embedding a `TimelineSession` in an egui application: `tick()` and
//!   `pump()` once per frame, plot the latest window snapshot.
//! - Play/pause/reset, cursor scrubbing, window-length changes and channel
//!   visibility toggles, all funnelled through the session.
//! - Kicking off a background export job from the UI and showing progress.
//!
//! How to run
//! ```bash
//! cargo run --example replay_viewer
//! ```

use std::time::Duration;

use eframe::egui;
use egui_plot::{Line, Plot};
use tracereplay::{
    ChartRasterizer, DatasetBuilder, ExportHandle, ExportSettings, PngSequenceSink,
    TelemetrySample, TimelineSession,
};

struct ViewerApp {
    session: TimelineSession,
    export: Option<ExportHandle>,
    status: String,
}

impl ViewerApp {
    fn new() -> Self {
        // 20 s synthetic session: two smooth channels, one sparse
        let dataset = DatasetBuilder::new()
            .channel("throttle", "%")
            .channel("brake", "%")
            .channel("gear", "")
            .samples((0..=1000).map(|i| {
                let t = i as f64 * 0.02;
                let mut sample = TelemetrySample::new(t)
                    .with_value("throttle", 50.0 + 50.0 * (t * 0.8).sin())
                    .with_value("brake", 50.0 - 50.0 * (t * 0.8).sin());
                if i % 50 == 0 {
                    sample = sample.with_value("gear", 1.0 + (t * 0.3).rem_euclid(5.0).floor());
                }
                sample
            }))
            .build();

        let mut session = TimelineSession::default();
        session.set_renderer(Box::new(ChartRasterizer::new(1280, 720)));
        session.set_dataset(dataset);
        Self {
            session,
            export: None,
            status: "Ready".to_string(),
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let playing = self.session.is_playing();
            if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                self.session.toggle_playback();
            }
            if ui.button("Reset").clicked() {
                self.session.reset();
            }

            let duration = self.session.duration().max(0.001);
            let mut cursor = self.session.cursor();
            if ui
                .add(egui::Slider::new(&mut cursor, 0.0..=duration).text("cursor [s]"))
                .changed()
            {
                self.session.set_cursor(cursor);
            }

            let mut window_length = self.session.window_length();
            if ui
                .add(egui::Slider::new(&mut window_length, 0.0..=duration).text("window [s]"))
                .changed()
            {
                self.session.set_window_length(window_length);
            }
        });

        ui.horizontal(|ui| {
            let channels: Vec<String> = self
                .session
                .dataset()
                .map(|d| d.channels().iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default();
            for name in channels {
                let mut visible = self.session.visible_channels().contains(&name);
                if ui.checkbox(&mut visible, &name).changed() {
                    self.session.set_channel_visible(&name, visible);
                }
            }

            ui.separator();
            let exporting = self.export.is_some();
            if ui
                .add_enabled(!exporting, egui::Button::new("Export frames"))
                .clicked()
            {
                let settings = ExportSettings::default();
                let sink = PngSequenceSink::new("target/replay_viewer_export");
                match self.session.start_export(settings, Box::new(sink)) {
                    Ok(handle) => {
                        self.status = "Exporting...".to_string();
                        self.export = Some(handle);
                    }
                    Err(err) => self.status = format!("Export rejected: {err}"),
                }
            }
            if let Some(handle) = &self.export {
                ui.add(egui::ProgressBar::new(handle.percent() as f32 / 100.0).show_percentage());
                if ui.button("Cancel").clicked() {
                    handle.cancel();
                }
            }
            ui.label(&self.status);
        });
    }

    fn plot(&self, ui: &mut egui::Ui) {
        // snapshot what the plot needs before handing `ui` to the closure
        let looks: Vec<(String, egui::Color32)> = self
            .session
            .dataset()
            .map(|d| {
                d.channels()
                    .iter()
                    .map(|c| {
                        (
                            c.name.clone(),
                            egui::Color32::from_rgb(c.color.0, c.color.1, c.color.2),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        let series: Vec<(String, egui::Color32, Vec<[f64; 2]>)> = looks
            .into_iter()
            .map(|(name, color)| {
                let points = self
                    .session
                    .window_snapshot()
                    .map(|w| w.channel_points(&name).to_vec())
                    .unwrap_or_default();
                (name, color, points)
            })
            .collect();

        Plot::new("timeline")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (name, color, points) in series {
                    if points.is_empty() {
                        continue;
                    }
                    plot_ui.line(Line::new(&name, points).color(color).width(1.5));
                }
            });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.tick();
        self.session.pump();

        if self.export.as_ref().map_or(false, |h| h.is_finished()) {
            let handle = self.export.take().unwrap();
            self.status = format!("Export {:?}", handle.wait());
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.controls(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.plot(ui));

        let tick = self.session.config().playback.tick_interval_ms;
        ctx.request_repaint_after(Duration::from_millis(tick));
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let mut options = eframe::NativeOptions::default();
    options.viewport = egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]);
    eframe::run_native(
        "Telemetry Replay",
        options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new()))),
    )
}
