//! Software chart rasterizer.
//!
//! [`ChartRasterizer`] renders a window result to an RGBA pixel buffer:
//! one polyline per visible channel, x scaled by the visible time range, y
//! scaled by the channel's whole-session value range. Rendering is
//! deterministic: identical inputs produce byte-identical frames, which is
//! what makes exported video reproducible.

use image::{Rgba, RgbaImage};

use crate::data::dataset::{ChannelMeta, Rgb};
use crate::data::window::WindowResult;
use crate::error::ExportError;
use crate::render::frame::{PixelFormat, PixelFrame};

/// Everything a renderer needs to draw the current timeline state.
pub struct RenderView<'a> {
    pub channels: &'a [ChannelMeta],
    pub window: &'a WindowResult,
    pub cursor: f64,
    pub duration: f64,
}

/// Renders the current presentation state to a pixel buffer.
///
/// `measure` resolves the surface size, forcing a layout pass when the
/// surface has not been sized yet; `render` rasterizes the given view.
pub trait FrameRenderer: Send {
    /// Current surface size; `(0, 0)` when not yet measured.
    fn size(&self) -> (u32, u32);

    /// Resolve the surface size, adopting `hint` when unsized. Returns the
    /// resolved size.
    fn measure(&mut self, hint: (u32, u32)) -> (u32, u32);

    fn render(&mut self, view: &RenderView<'_>) -> Result<PixelFrame, ExportError>;
}

pub struct ChartRasterizer {
    width: u32,
    height: u32,
    pub background: Rgb,
    /// Blank border around the plot area, in pixels.
    pub margin: u32,
    /// Draw a vertical marker at the cursor position.
    pub cursor_marker: bool,
}

impl ChartRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Rgb(16, 16, 20),
            margin: 8,
            cursor_marker: true,
        }
    }

    /// A rasterizer with no size yet; `measure` must run before the first
    /// render.
    pub fn deferred() -> Self {
        Self::new(0, 0)
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }
}

impl FrameRenderer for ChartRasterizer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn measure(&mut self, hint: (u32, u32)) -> (u32, u32) {
        if self.width == 0 || self.height == 0 {
            self.width = hint.0.max(1);
            self.height = hint.1.max(1);
        }
        (self.width, self.height)
    }

    fn render(&mut self, view: &RenderView<'_>) -> Result<PixelFrame, ExportError> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::Render(
                "surface has zero dimensions; measure() must run first".to_string(),
            ));
        }
        let (w, h) = (self.width, self.height);
        let bg = Rgba([self.background.0, self.background.1, self.background.2, 255]);
        let mut img = RgbaImage::from_pixel(w, h, bg);

        let margin = self.margin.min(w / 4).min(h / 4);
        let plot_w = (w - 2 * margin).max(1) as f64;
        let plot_h = (h - 2 * margin).max(1) as f64;
        let (t0, t1) = view.window.range;
        let span = (t1 - t0).max(f64::EPSILON);

        for channel in view.channels {
            let Some(points) = view.window.points.get(&channel.name) else {
                continue;
            };
            if points.is_empty() {
                continue;
            }
            let lo = channel.min_value;
            let vspan = (channel.max_value - lo).max(f64::EPSILON);
            let color = Rgba([channel.color.0, channel.color.1, channel.color.2, 255]);

            let mut prev: Option<(i32, i32)> = None;
            for p in points {
                let x = margin as f64 + (p[0] - t0) / span * plot_w;
                let y = margin as f64 + (1.0 - (p[1] - lo) / vspan) * plot_h;
                let cur = (x.round() as i32, y.round() as i32);
                let from = prev.unwrap_or(cur);
                draw_line(&mut img, from.0, from.1, cur.0, cur.1, color);
                prev = Some(cur);
            }
        }

        if self.cursor_marker && view.cursor >= t0 && view.cursor <= t1 {
            let x = (margin as f64 + (view.cursor - t0) / span * plot_w).round() as i32;
            let marker = Rgba([200, 200, 200, 255]);
            draw_line(&mut img, x, margin as i32, x, (h - margin) as i32 - 1, marker);
        }

        Ok(PixelFrame::new(w, h, PixelFormat::Rgba8, img.into_raw()))
    }
}

/// Bresenham line over an RGBA image; out-of-bounds pixels are clipped.
pub(crate) fn draw_line(img: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }
    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let mut err = dx / 2;
    let ystep = if y0 < y1 { 1 } else { -1 };
    let mut y = y0;
    for x in x0..=x1 {
        let (px, py) = if steep { (y, x) } else { (x, y) };
        if px >= 0 && px < img.width() as i32 && py >= 0 && py < img.height() as i32 {
            img.put_pixel(px as u32, py as u32, color);
        }
        err -= dy;
        if err < 0 {
            y += ystep;
            err += dx;
        }
    }
}
