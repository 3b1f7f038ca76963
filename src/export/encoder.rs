//! Video sinks: the encoder boundary plus file-based reference sinks.
//!
//! Codec internals live outside the crate. A [`VideoSink`] receives frames
//! in canonical RGBA8 layout, strictly in order, and is finalised with
//! `close` on every exit path of the pipeline (successful, failed, or
//! cancelled).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use image::RgbaImage;
use serde::Serialize;

use crate::error::ExportError;
use crate::render::frame::{PixelFormat, PixelFrame};

/// Boundary to the video encoder.
pub trait VideoSink: Send {
    /// Called once, with the dimensions fixed for the entire job.
    fn open(&mut self, width: u32, height: u32, fps: u32) -> Result<(), ExportError>;

    fn append_frame(&mut self, frame: &PixelFrame) -> Result<(), ExportError>;

    /// Finalise the output. Must tolerate being called on a never-opened
    /// sink (a job cancelled before its first frame).
    fn close(&mut self) -> Result<(), ExportError>;
}

fn check_frame(frame: &PixelFrame, dims: Option<(u32, u32)>) -> Result<(), ExportError> {
    let Some((w, h)) = dims else {
        return Err(ExportError::Encode("sink is not open".to_string()));
    };
    if frame.format != PixelFormat::Rgba8 {
        return Err(ExportError::Encode(
            "sink requires canonical RGBA frames".to_string(),
        ));
    }
    if (frame.width, frame.height) != (w, h) {
        return Err(ExportError::Encode(format!(
            "frame is {}x{}, job is {w}x{h}",
            frame.width, frame.height
        )));
    }
    Ok(())
}

/// Writes frames as a numbered PNG sequence (`frame_000000.png`, ...).
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    dims: Option<(u32, u32)>,
    frames_written: u32,
}

impl PngSequenceSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame".to_string(),
            dims: None,
            frames_written: 0,
        }
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }
}

impl VideoSink for PngSequenceSink {
    fn open(&mut self, width: u32, height: u32, _fps: u32) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir)?;
        self.dims = Some((width, height));
        Ok(())
    }

    fn append_frame(&mut self, frame: &PixelFrame) -> Result<(), ExportError> {
        check_frame(frame, self.dims)?;
        let img = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| ExportError::Encode("pixel buffer size mismatch".to_string()))?;
        let path = self
            .dir
            .join(format!("{}_{:06}.png", self.prefix, self.frames_written));
        img.save(&path)
            .map_err(|e| ExportError::Encode(format!("{}: {e}", path.display())))?;
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ExportError> {
        self.dims = None;
        Ok(())
    }
}

#[derive(Serialize)]
struct StreamMeta {
    width: u32,
    height: u32,
    fps: u32,
    frames: u32,
}

/// Writes one raw RGBA stream plus a JSON sidecar describing the geometry
/// (enough for e.g. an external `ffmpeg -f rawvideo` invocation).
pub struct RawRgbaSink {
    path: PathBuf,
    out: Option<BufWriter<File>>,
    meta: Option<StreamMeta>,
}

impl RawRgbaSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            out: None,
            meta: None,
        }
    }

    fn sidecar_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }
}

impl VideoSink for RawRgbaSink {
    fn open(&mut self, width: u32, height: u32, fps: u32) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.out = Some(BufWriter::new(File::create(&self.path)?));
        self.meta = Some(StreamMeta {
            width,
            height,
            fps,
            frames: 0,
        });
        Ok(())
    }

    fn append_frame(&mut self, frame: &PixelFrame) -> Result<(), ExportError> {
        let dims = self.meta.as_ref().map(|m| (m.width, m.height));
        check_frame(frame, dims)?;
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| ExportError::Encode("sink is not open".to_string()))?;
        out.write_all(&frame.data)?;
        if let Some(meta) = self.meta.as_mut() {
            meta.frames += 1;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ExportError> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        if let Some(meta) = self.meta.take() {
            let json = serde_json::to_string_pretty(&meta)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            fs::write(self.sidecar_path(), json)?;
        }
        Ok(())
    }
}
