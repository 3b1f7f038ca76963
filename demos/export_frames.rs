//! Demo: Headless export of a synthetic telemetry session
//!
//! What it demonstrates
//! - Building a dataset programmatically with `DatasetBuilder`.
//! - Binding the software `ChartRasterizer` as the render surface.
//! - Driving a full export job to a PNG sequence by pumping the session.
//!
//! How to run
//! ```bash
//! cargo run --example export_frames
//! ```
//! Frames land in `target/export_frames/`.

use std::io::Write;
use std::time::Duration;

use tracereplay::{
    ChartRasterizer, DatasetBuilder, EventFilter, EventKind, ExportSettings, PngSequenceSink,
    TelemetrySample, TimelineSession,
};

fn main() {
    env_logger::init();

    // 10 s session, 50 Hz samples: throttle ramp and an oscillating rpm
    let dataset = DatasetBuilder::new()
        .channel("throttle", "%")
        .channel("rpm", "1/min")
        .samples((0..=500).map(|i| {
            let t = i as f64 * 0.02;
            TelemetrySample::new(t)
                .with_value("throttle", 50.0 + 50.0 * (t * 0.6).sin())
                .with_value("rpm", 3000.0 + 2000.0 * (t * 2.1).sin())
        }))
        .build();

    let mut session = TimelineSession::default();
    session.set_renderer(Box::new(ChartRasterizer::new(1280, 720)));
    session.set_dataset(dataset);

    let progress = session
        .events()
        .subscribe(EventFilter::only(EventKind::EXPORT_PROGRESS));

    let settings = ExportSettings {
        fps: 30,
        total_frames: Some(90),
    };
    let sink = PngSequenceSink::new("target/export_frames");
    let handle = session
        .start_export(settings, Box::new(sink))
        .expect("start export");

    while !handle.is_finished() {
        session.pump();
        while let Ok(event) = progress.try_recv() {
            if let Some(percent) = event.percent {
                print!("\rexporting... {percent:3}%");
                let _ = std::io::stdout().flush();
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    session.pump();

    let frames = handle.frames_completed();
    let outcome = handle.wait();
    println!("\nexport {outcome:?} after {frames} frames -> target/export_frames/");
}
