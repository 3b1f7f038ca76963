use tracereplay::{
    compute_window, CancelToken, ChartRasterizer, DatasetBuilder, ExportError, FrameRenderer,
    PixelFormat, PixelFrame, PngSequenceSink, RawRgbaSink, RenderView, Rgb, TelemetryDataset,
    TelemetrySample, VideoSink, WindowRequest,
};

fn wave_dataset() -> TelemetryDataset {
    DatasetBuilder::new()
        .channel("sine", "V")
        .channel("cosine", "V")
        .samples((0..=100).map(|i| {
            let t = i as f64 * 0.05;
            TelemetrySample::new(t)
                .with_value("sine", t.sin())
                .with_value("cosine", t.cos())
        }))
        .build()
}

fn rendered_frame(rasterizer: &mut ChartRasterizer) -> PixelFrame {
    let dataset = wave_dataset();
    let request = WindowRequest::new(1.0, 2.0).with_visibility(["sine", "cosine"]);
    let window = compute_window(&dataset, &request, &CancelToken::never()).unwrap();
    let view = RenderView {
        channels: dataset.channels(),
        window: &window,
        cursor: 1.0,
        duration: dataset.duration(),
    };
    rasterizer.render(&view).unwrap()
}

// ── Pixel frames ─────────────────────────────────────────────────────────

#[test]
fn bgra_frames_canonicalise_to_rgba() {
    let frame = PixelFrame::new(1, 2, PixelFormat::Bgra8, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    let rgba = frame.into_rgba8();
    assert_eq!(rgba.format, PixelFormat::Rgba8);
    assert_eq!(rgba.data, vec![3, 2, 1, 4, 7, 6, 5, 8]);
}

#[test]
fn rgba_frames_pass_through_unchanged() {
    let data = vec![9, 8, 7, 6];
    let frame = PixelFrame::new(1, 1, PixelFormat::Rgba8, data.clone());
    assert_eq!(frame.into_rgba8().data, data);
}

// ── Rasterizer ───────────────────────────────────────────────────────────

#[test]
fn identical_inputs_produce_identical_pixels() {
    let mut rasterizer = ChartRasterizer::new(320, 200);
    let first = rendered_frame(&mut rasterizer);
    let second = rendered_frame(&mut rasterizer);
    assert_eq!(first.width, 320);
    assert_eq!(first.height, 200);
    assert_eq!(first.data, second.data, "rendering must be deterministic");
}

#[test]
fn unmeasured_surface_rejects_rendering_until_measured() {
    let mut rasterizer = ChartRasterizer::deferred();
    assert_eq!(rasterizer.size(), (0, 0));

    let dataset = wave_dataset();
    let request = WindowRequest::new(0.0, 1.0).with_visibility(["sine"]);
    let window = compute_window(&dataset, &request, &CancelToken::never()).unwrap();
    let view = RenderView {
        channels: dataset.channels(),
        window: &window,
        cursor: 0.0,
        duration: dataset.duration(),
    };
    let err = rasterizer.render(&view).unwrap_err();
    assert!(matches!(err, ExportError::Render(_)));

    assert_eq!(rasterizer.measure((160, 120)), (160, 120));
    let frame = rasterizer.render(&view).unwrap();
    assert_eq!((frame.width, frame.height), (160, 120));
}

#[test]
fn measure_keeps_an_already_resolved_size() {
    let mut rasterizer = ChartRasterizer::new(320, 200);
    assert_eq!(rasterizer.measure((64, 48)), (320, 200));
}

#[test]
fn empty_window_renders_the_background() {
    let mut rasterizer = ChartRasterizer::new(32, 32).with_background(Rgb(10, 20, 30));
    rasterizer.cursor_marker = false;
    let dataset = DatasetBuilder::new().channel("sine", "").build();
    let request = WindowRequest::new(0.0, 1.0).with_visibility(["sine"]);
    let window = compute_window(&dataset, &request, &CancelToken::never()).unwrap();
    let view = RenderView {
        channels: dataset.channels(),
        window: &window,
        cursor: 0.0,
        duration: 0.0,
    };
    let frame = rasterizer.render(&view).unwrap();
    assert_eq!(&frame.data[..4], &[10, 20, 30, 255]);
    assert_eq!(frame.data.len(), PixelFrame::byte_len(32, 32));
}

// ── Reference sinks ──────────────────────────────────────────────────────

fn tiny_frame(w: u32, h: u32) -> PixelFrame {
    PixelFrame::new(w, h, PixelFormat::Rgba8, vec![255; PixelFrame::byte_len(w, h)])
}

#[test]
fn png_sequence_sink_writes_numbered_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path().join("frames"));
    sink.open(4, 4, 30).unwrap();
    sink.append_frame(&tiny_frame(4, 4)).unwrap();
    sink.append_frame(&tiny_frame(4, 4)).unwrap();
    sink.close().unwrap();

    assert_eq!(sink.frames_written(), 2);
    assert!(dir.path().join("frames/frame_000000.png").exists());
    assert!(dir.path().join("frames/frame_000001.png").exists());
}

#[test]
fn raw_sink_writes_stream_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.rgba");
    let mut sink = RawRgbaSink::new(&path);
    sink.open(4, 2, 30).unwrap();
    sink.append_frame(&tiny_frame(4, 2)).unwrap();
    sink.append_frame(&tiny_frame(4, 2)).unwrap();
    sink.close().unwrap();

    let stream = std::fs::read(&path).unwrap();
    assert_eq!(stream.len(), 2 * PixelFrame::byte_len(4, 2));

    let sidecar = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    assert_eq!(meta["width"], 4);
    assert_eq!(meta["height"], 2);
    assert_eq!(meta["fps"], 30);
    assert_eq!(meta["frames"], 2);
}

#[test]
fn sinks_reject_non_canonical_or_mismatched_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path().join("frames"));
    sink.open(4, 4, 30).unwrap();

    let bgra = PixelFrame::new(4, 4, PixelFormat::Bgra8, vec![0; PixelFrame::byte_len(4, 4)]);
    assert!(matches!(
        sink.append_frame(&bgra),
        Err(ExportError::Encode(_))
    ));

    assert!(matches!(
        sink.append_frame(&tiny_frame(2, 2)),
        Err(ExportError::Encode(_))
    ));
}

#[test]
fn close_tolerates_a_never_opened_sink() {
    let dir = tempfile::tempdir().unwrap();
    assert!(PngSequenceSink::new(dir.path().join("f")).close().is_ok());
    assert!(RawRgbaSink::new(dir.path().join("o.rgba")).close().is_ok());
}
