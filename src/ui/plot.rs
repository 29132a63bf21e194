//! Plot pane. Draws the selected forecast image with Unicode half-blocks,
//! or a placeholder when nothing drawable is available.

use std::collections::HashMap;
use std::sync::Arc;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::Theme;
use crate::app::controller::{ArtifactView, Unavailable};

/// Decoded plots for the committed set, keyed by index.  Cleared whenever a
/// different revision is asked for.
#[derive(Default)]
pub struct PlotCache {
    revision: u64,
    decoded: HashMap<usize, Option<Arc<image::RgbaImage>>>,
}

impl PlotCache {
    /// Decoded image for `index` of `revision`; undecodable payloads are
    /// remembered as `None` so they are not retried every frame.
    pub fn get_or_decode(
        &mut self,
        revision: u64,
        index: usize,
        bytes: &[u8],
    ) -> Option<Arc<image::RgbaImage>> {
        if revision != self.revision {
            self.decoded.clear();
            self.revision = revision;
        }
        self.decoded
            .entry(index)
            .or_insert_with(|| decode(index, bytes))
            .clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.decoded.len()
    }
}

fn decode(index: usize, bytes: &[u8]) -> Option<Arc<image::RgbaImage>> {
    let t0 = std::time::Instant::now();
    match image::load_from_memory(bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            tracing::debug!(
                "decoded plot {index}: {}x{} in {:.2?}",
                rgba.width(),
                rgba.height(),
                t0.elapsed()
            );
            Some(Arc::new(rgba))
        }
        Err(e) => {
            tracing::warn!("plot {index} is not a readable image: {e}");
            None
        }
    }
}

pub struct PlotWidget<'a> {
    pub artifact: ArtifactView<'a>,
    /// Decoded image for a `Payload` artifact, if decoding worked.
    pub image: Option<&'a image::RgbaImage>,
    pub title: String,
    /// Older data is on screen while a newer set loads.
    pub revalidating: bool,
    /// Key shown in the retry hint after a failed fetch.
    pub refresh_key: String,
}

impl Widget for PlotWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title_style = if self.revalidating {
            Theme::stale_style()
        } else {
            Theme::title_style()
        };
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let placeholder = match (self.artifact, self.image) {
            (ArtifactView::Payload(_), Some(img)) => {
                render_image_halfblocks(img, inner, buf);
                return;
            }
            (ArtifactView::Payload(_), None) => {
                "The plot for this horizon could not be decoded.".to_string()
            }
            (ArtifactView::Unavailable(reason), _) => placeholder_text(reason, &self.refresh_key),
        };

        if inner.height == 0 {
            return;
        }
        let y = inner.y + inner.height / 2;
        Paragraph::new(Line::from(Span::styled(placeholder, Theme::placeholder_style())))
            .centered()
            .wrap(Wrap { trim: true })
            .render(Rect::new(inner.x, y, inner.width, inner.bottom() - y), buf);
    }
}

fn placeholder_text(reason: Unavailable, refresh_key: &str) -> String {
    match reason {
        Unavailable::Loading => "Loading…".into(),
        Unavailable::NoData => "No forecasts to show.".into(),
        Unavailable::FetchFailed => {
            format!("Forecast service unavailable. Press {refresh_key} to retry.")
        }
        Unavailable::MissingPayload => "No plot for this horizon.".into(),
    }
}

/// Render an `RgbaImage` using `▀` half-blocks (2 pixels per cell).
///
/// The image is fitted inside `area` preserving aspect ratio and centred
/// horizontally.  Each cell is 1 px wide × 2 px tall.
fn render_image_halfblocks(img: &image::RgbaImage, area: Rect, buf: &mut Buffer) {
    use image::imageops::FilterType;

    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }

    let max_px_w = area.width as f64;
    let max_px_h = (area.height as f64) * 2.0;
    let src_w = img.width() as f64;
    let src_h = img.height() as f64;

    // Plots are usually larger than the terminal; small ones stay 1:1.
    let scale = (max_px_w / src_w).min(max_px_h / src_h).min(1.0);
    let fit_w = (src_w * scale).round().max(1.0) as u32;
    let fit_h = (src_h * scale).round().max(1.0) as u32;

    let rgba = image::imageops::resize(img, fit_w, fit_h, FilterType::Triangle);
    let (iw, ih) = (rgba.width(), rgba.height());
    let col_offset = (area.width.saturating_sub(iw as u16)) / 2;

    for row in 0..area.height {
        let yt = (row as u32) * 2;
        if yt >= ih {
            break;
        }
        let yb = yt + 1;
        for col in 0..iw.min(area.width as u32) {
            let t = rgba.get_pixel(col, yt);
            let fg = Color::Rgb(t[0], t[1], t[2]);
            let bg = if yb < ih {
                let b = rgba.get_pixel(col, yb);
                Color::Rgb(b[0], b[1], b[2])
            } else {
                Color::Reset
            };
            if let Some(cell) =
                buf.cell_mut(Position::new(area.x + col_offset + col as u16, area.y + row))
            {
                cell.set_char('▀').set_fg(fg).set_bg(bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forecast::ForecastArtifact;

    fn cells(buf: &Buffer, area: Rect) -> String {
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 10, 10, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn cache_decodes_once_per_revision() {
        let bytes = png(4, 4);
        let mut cache = PlotCache::default();
        let a = cache.get_or_decode(1, 0, &bytes).unwrap();
        let b = cache.get_or_decode(1, 0, &bytes).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get_or_decode(2, 0, &bytes).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn garbage_payload_is_remembered_as_undecodable() {
        let mut cache = PlotCache::default();
        assert!(cache.get_or_decode(1, 3, b"not an image").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn draws_image_cells() {
        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        let art = ForecastArtifact::with_payload(png(2, 2));
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 10, 10, 255]));
        PlotWidget {
            artifact: ArtifactView::Payload(&art),
            image: Some(&img),
            title: "Space economy".into(),
            revalidating: false,
            refresh_key: "r".into(),
        }
        .render(area, &mut buf);
        assert_eq!(buf[(4, 1)].symbol(), "▀");
        assert_eq!(buf[(4, 1)].fg, Color::Rgb(200, 10, 10));
    }

    #[test]
    fn unavailable_shows_placeholder() {
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        PlotWidget {
            artifact: ArtifactView::Unavailable(Unavailable::Loading),
            image: None,
            title: "Forecast".into(),
            revalidating: false,
            refresh_key: "r".into(),
        }
        .render(area, &mut buf);
        let text = cells(&buf, area);
        assert!(text.contains("Loading"), "{text:?}");
    }

    #[test]
    fn retry_hint_names_the_bound_key() {
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        PlotWidget {
            artifact: ArtifactView::Unavailable(Unavailable::FetchFailed),
            image: None,
            title: "Forecast".into(),
            revalidating: false,
            refresh_key: "F5".into(),
        }
        .render(area, &mut buf);
        let text = cells(&buf, area);
        assert!(text.contains("Press F5 to retry"), "{text:?}");
        assert!(!text.contains("Press r"), "{text:?}");
    }
}
