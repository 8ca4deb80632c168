//! Bitmap Chart Rendering
//!
//! Charts are rasterized by hand onto an RGB canvas and encoded as PNG,
//! which is the only image form the workbook embeds. Geometry and colours
//! come from a [`ChartStyle`]; the default palette matches the series
//! colours Excel itself would pick, so the workbook looks uniform next to
//! native charts.
//!
//! The renderer is total: empty or all-zero input produces a blank canvas
//! rather than an error, since chart embedding is skipped upstream only
//! when there is nothing to plot at all.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mailkpi_core::{ChartImage, ChartRenderer, ChartSlice, DailyVolumeSeries, ReportError};
use std::io::Cursor;

/// Canvas geometry and colour scheme for the report charts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Blank border around the plot area, in pixels
    pub margin: u32,
    pub background: [u8; 3],
    pub axis: [u8; 3],
    /// Series colours, cycled when a chart has more series than entries
    pub palette: Vec<[u8; 3]>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::office()
    }
}

impl ChartStyle {
    /// Office-like series colours on a white canvas
    pub fn office() -> Self {
        Self {
            width: 560,
            height: 360,
            margin: 32,
            background: [0xFF, 0xFF, 0xFF],
            axis: [0x59, 0x59, 0x59],
            palette: vec![
                [0x44, 0x72, 0xC4],
                [0xED, 0x7D, 0x31],
                [0xA5, 0xA5, 0xA5],
                [0xFF, 0xC0, 0x00],
                [0x5B, 0x9B, 0xD5],
                [0x70, 0xAD, 0x47],
                [0x26, 0x44, 0x78],
                [0x9E, 0x48, 0x0E],
            ],
        }
    }

    /// Colour for series `index`, cycling through the palette
    pub fn series_color(&self, index: usize) -> [u8; 3] {
        if self.palette.is_empty() {
            self.axis
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}

/// Chart renderer drawing onto an in-memory canvas
#[derive(Clone, Debug, Default)]
pub struct BitmapChartRenderer {
    pub style: ChartStyle,
}

impl BitmapChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }
}

impl ChartRenderer for BitmapChartRenderer {
    fn proportion_chart(&self, slices: &[ChartSlice]) -> Result<ChartImage, ReportError> {
        let style = &self.style;
        let mut canvas = RgbImage::from_pixel(style.width, style.height, Rgb(style.background));

        let total: u64 = slices.iter().map(|s| u64::from(s.count)).sum();
        if total > 0 {
            // Cumulative slice boundaries as fractions of a full turn.
            let mut boundaries = Vec::with_capacity(slices.len());
            let mut cumulative = 0u64;
            for slice in slices {
                cumulative += u64::from(slice.count);
                boundaries.push(cumulative as f64 / total as f64);
            }

            let cx = f64::from(style.width) / 2.0;
            let cy = f64::from(style.height) / 2.0;
            let radius = (f64::from(style.width.min(style.height)) / 2.0
                - f64::from(style.margin))
            .max(0.0);

            for y in 0..style.height {
                for x in 0..style.width {
                    let dx = f64::from(x) - cx + 0.5;
                    let dy = f64::from(y) - cy + 0.5;
                    if dx.mul_add(dx, dy * dy) > radius * radius {
                        continue;
                    }
                    // Angle from twelve o'clock, clockwise, in turns.
                    let mut turn = dx.atan2(-dy) / std::f64::consts::TAU;
                    if turn < 0.0 {
                        turn += 1.0;
                    }
                    let index = boundaries
                        .iter()
                        .position(|&b| turn < b)
                        .unwrap_or(slices.len() - 1);
                    canvas.put_pixel(x, y, Rgb(style.series_color(index)));
                }
            }
        }

        encode_png(canvas)
    }

    fn stacked_bars(&self, series: &DailyVolumeSeries) -> Result<ChartImage, ReportError> {
        let style = &self.style;
        let mut canvas = RgbImage::from_pixel(style.width, style.height, Rgb(style.background));

        let left = style.margin;
        let top = style.margin;
        let right = style.width.saturating_sub(style.margin);
        let bottom = style.height.saturating_sub(style.margin);
        if right <= left || bottom <= top {
            return encode_png(canvas);
        }

        draw_vline(&mut canvas, left, top, bottom, style.axis);
        draw_hline(&mut canvas, left, right, bottom, style.axis);

        let max_total = series.max_day_total();
        if series.days.is_empty() || max_total == 0 {
            return encode_png(canvas);
        }

        let plot_height = bottom - top;
        let slot = ((right - left) / series.days.len() as u32).max(1);
        let bar = (slot * 3 / 4).max(1);

        for (day_index, day) in series.days.iter().enumerate() {
            let x0 = left + 1 + day_index as u32 * slot + (slot - bar) / 2;
            let x1 = x0.saturating_add(bar).min(right);
            let mut stacked = 0u32;
            for (series_index, &count) in day.counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let y1 = bottom - scale(stacked, plot_height, max_total);
                stacked += count;
                let y0 = bottom - scale(stacked, plot_height, max_total);
                fill_rect(&mut canvas, x0, y0, x1, y1, style.series_color(series_index));
            }
        }

        encode_png(canvas)
    }
}

/// Pixel height of `value` out of `max` within a `plot_height`-pixel axis
fn scale(value: u32, plot_height: u32, max: u32) -> u32 {
    (u64::from(value) * u64::from(plot_height) / u64::from(max)) as u32
}

fn fill_rect(canvas: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();
    for y in y0..y1.min(height) {
        for x in x0..x1.min(width) {
            canvas.put_pixel(x, y, Rgb(color));
        }
    }
}

fn draw_hline(canvas: &mut RgbImage, x0: u32, x1: u32, y: u32, color: [u8; 3]) {
    fill_rect(canvas, x0, y, x1, y.saturating_add(1), color);
}

fn draw_vline(canvas: &mut RgbImage, x: u32, y0: u32, y1: u32, color: [u8; 3]) {
    fill_rect(canvas, x, y0, x.saturating_add(1), y1, color);
}

fn encode_png(canvas: RgbImage) -> Result<ChartImage, ReportError> {
    let (width, height) = canvas.dimensions();
    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| ReportError::Chart(e.to_string()))?;
    Ok(ChartImage {
        bytes: encoded.into_inner(),
        width,
        height,
    })
}
