//! PNG rendering of the post-refresh summary.

use std::path::{Path, PathBuf};

use countryxchange_core::summary::{SummaryRendererTrait, SummarySnapshot};
use countryxchange_core::{Error, Result};
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;

pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 600;

/// Directory size the header band is scaled against.
const EXPECTED_DIRECTORY_SIZE: i64 = 250;

const MARGIN: u32 = 60;
const HEADER_TOP: u32 = 40;
const HEADER_HEIGHT: u32 = 40;
const BARS_TOP: u32 = 140;
const BAR_HEIGHT: u32 = 50;
const BAR_GAP: u32 = 30;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TRACK: Rgb<u8> = Rgb([230, 230, 230]);
const HEADER: Rgb<u8> = Rgb([33, 33, 33]);
const BAR: Rgb<u8> = Rgb([46, 125, 196]);

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("failed to prepare summary directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode summary image: {0}")]
    Image(#[from] image::ImageError),
}

impl From<SummaryError> for Error {
    fn from(err: SummaryError) -> Self {
        Error::Render(err.to_string())
    }
}

/// Writes a 1000x600 PNG: a header band proportional to the total count and
/// one bar per top country, scaled to the largest estimate.
pub struct PngSummaryRenderer {
    destination: PathBuf,
}

impl PngSummaryRenderer {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn write(&self, canvas: &RgbImage) -> std::result::Result<(), SummaryError> {
        if let Some(parent) = self
            .destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }
        canvas.save_with_format(&self.destination, ImageFormat::Png)?;
        Ok(())
    }
}

impl SummaryRendererTrait for PngSummaryRenderer {
    fn render(&self, snapshot: &SummarySnapshot) -> Result<()> {
        let canvas = draw(snapshot);
        self.write(&canvas)?;
        debug!(
            "Wrote summary for {} countries to {}",
            snapshot.total_count,
            self.destination.display()
        );
        Ok(())
    }
}

/// Paints the snapshot onto a fresh canvas.
pub fn draw(snapshot: &SummarySnapshot) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);
    let track_width = CANVAS_WIDTH - 2 * MARGIN;

    fill_rect(&mut canvas, MARGIN, HEADER_TOP, track_width, HEADER_HEIGHT, TRACK);
    let header_width = scaled_width(
        snapshot.total_count.max(0) as f64,
        EXPECTED_DIRECTORY_SIZE.max(snapshot.total_count) as f64,
        track_width,
    );
    fill_rect(&mut canvas, MARGIN, HEADER_TOP, header_width, HEADER_HEIGHT, HEADER);

    let largest = snapshot
        .top
        .iter()
        .map(|entry| entry.estimated_gdp)
        .fold(0.0_f64, f64::max);

    for (index, entry) in snapshot.top.iter().enumerate() {
        let top = BARS_TOP + index as u32 * (BAR_HEIGHT + BAR_GAP);
        if top + BAR_HEIGHT > CANVAS_HEIGHT {
            break;
        }
        fill_rect(&mut canvas, MARGIN, top, track_width, BAR_HEIGHT, TRACK);
        let width = scaled_width(entry.estimated_gdp, largest, track_width);
        fill_rect(&mut canvas, MARGIN, top, width, BAR_HEIGHT, BAR);
    }

    canvas
}

fn scaled_width(value: f64, max: f64, full: u32) -> u32 {
    if !value.is_finite() || !max.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    let ratio = (value / max).min(1.0);
    // At least one pixel so a tiny non-zero value stays visible.
    ((ratio * f64::from(full)).round() as u32).clamp(1, full)
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use countryxchange_core::summary::SummaryEntry;

    fn snapshot(total: i64, estimates: &[f64]) -> SummarySnapshot {
        SummarySnapshot {
            total_count: total,
            top: estimates
                .iter()
                .enumerate()
                .map(|(i, gdp)| SummaryEntry {
                    name: format!("Country {i}"),
                    estimated_gdp: *gdp,
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn bars_are_scaled_to_the_largest_estimate() {
        let canvas = draw(&snapshot(10, &[200.0, 100.0]));
        let track = CANVAS_WIDTH - 2 * MARGIN;

        let first_row = BARS_TOP + 1;
        let second_row = BARS_TOP + BAR_HEIGHT + BAR_GAP + 1;
        assert_eq!(*canvas.get_pixel(MARGIN + track - 1, first_row), BAR);
        assert_eq!(*canvas.get_pixel(MARGIN + track / 2 - 1, second_row), BAR);
        assert_eq!(*canvas.get_pixel(MARGIN + track / 2 + 1, second_row), TRACK);
    }

    #[test]
    fn empty_snapshot_draws_only_the_header_track() {
        let canvas = draw(&snapshot(0, &[]));
        assert_eq!(*canvas.get_pixel(MARGIN, HEADER_TOP), TRACK);
        assert_eq!(*canvas.get_pixel(MARGIN, BARS_TOP + 1), BACKGROUND);
    }

    #[test]
    fn render_creates_parent_directories_and_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("summary.png");
        let renderer = PngSummaryRenderer::new(&path);

        renderer.render(&snapshot(3, &[5.0, 4.0, 3.0])).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[test]
    fn unwritable_destination_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let renderer = PngSummaryRenderer::new(blocker.join("summary.png"));

        let err = renderer.render(&snapshot(1, &[1.0])).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
