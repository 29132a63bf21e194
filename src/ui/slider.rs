//! Horizon slider: the range control bounded by the committed set length.
//!
//! Renders as a bordered bar `◀ ━━━━●━━━━ ▶` with a `n / N` label.  The
//! track geometry is exposed so mouse clicks can be mapped back to an index.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::theme::Theme;

/// Width reserved right of the track for the `n / N` label.
const LABEL_WIDTH: u16 = 9;

pub struct SliderWidget {
    /// Clamped index, `None` when there is nothing to browse.
    pub index: Option<usize>,
    pub len: usize,
}

fn block() -> Block<'static> {
    Block::default()
        .title(" Horizon ")
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style())
}

/// The cells the knob can occupy, inside the border, between the arrows.
pub fn track_rect(area: Rect) -> Rect {
    let inner = block().inner(area);
    Rect::new(
        inner.x.saturating_add(2),
        inner.y,
        inner.width.saturating_sub(4 + LABEL_WIDTH),
        inner.height.min(1),
    )
}

/// Knob column for `index` within a track of `width` cells.
fn knob_offset(index: usize, len: usize, width: u16) -> u16 {
    if len <= 1 || width <= 1 {
        return 0;
    }
    let span = (width - 1) as f64;
    ((index as f64 / (len - 1) as f64) * span).round() as u16
}

/// Index under a click at column `col`, if it hit the track.
pub fn index_at(area: Rect, len: usize, col: u16, row: u16) -> Option<usize> {
    let track = track_rect(area);
    if len == 0 || track.width == 0 || !super::layout::point_in_rect(track, col, row) {
        return None;
    }
    if len == 1 || track.width == 1 {
        return Some(0);
    }
    let frac = (col - track.x) as f64 / (track.width - 1) as f64;
    Some(((frac * (len - 1) as f64).round() as usize).min(len - 1))
}

impl Widget for SliderWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = block().inner(area);
        block().render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let track = track_rect(area);
        let dim = Style::default().fg(Color::DarkGray);
        let active = self.index.is_some();

        let at_start = self.index.is_none_or(|i| i == 0);
        let at_end = self.index.is_none_or(|i| i + 1 >= self.len);
        let arrow = |enabled: bool| if enabled { Theme::slider_knob_style() } else { dim };
        buf.set_span(inner.x, inner.y, &Span::styled("◀", arrow(!at_start)), 1);
        if track.width > 0 {
            buf.set_span(track.x + track.width + 1, inner.y, &Span::styled("▶", arrow(!at_end)), 1);
        }

        let knob = self.index.map(|i| knob_offset(i, self.len, track.width));
        for col in 0..track.width {
            let (ch, style) = match knob {
                Some(k) if k == col => ('●', Theme::slider_knob_style()),
                Some(k) if col < k => ('━', Theme::slider_fill_style()),
                _ => ('─', dim),
            };
            if let Some(cell) = buf.cell_mut(Position::new(track.x + col, track.y)) {
                cell.set_char(ch).set_style(style);
            }
        }

        let label = match self.index {
            Some(i) => format!("{:>3} / {:<3}", i + 1, self.len),
            None => "  – / –  ".to_string(),
        };
        let label_x = inner.x + inner.width.saturating_sub(LABEL_WIDTH);
        let style = if active {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            dim
        };
        buf.set_line(label_x, inner.y, &Line::from(Span::styled(label, style)), LABEL_WIDTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        // inner width 38, track width 38 - 4 - 9 = 25
        Rect::new(0, 0, 40, 3)
    }

    #[test]
    fn track_sits_inside_border_and_arrows() {
        let t = track_rect(area());
        assert_eq!(t, Rect::new(3, 1, 25, 1));
    }

    #[test]
    fn clicks_map_to_ends_and_middle() {
        let t = track_rect(area());
        assert_eq!(index_at(area(), 10, t.x, t.y), Some(0));
        assert_eq!(index_at(area(), 10, t.x + t.width - 1, t.y), Some(9));
        assert_eq!(index_at(area(), 3, t.x + t.width / 2, t.y), Some(1));
    }

    #[test]
    fn clicks_outside_track_or_on_empty_set_miss() {
        let t = track_rect(area());
        assert_eq!(index_at(area(), 10, t.x.saturating_sub(1), t.y), None);
        assert_eq!(index_at(area(), 10, t.x, t.y + 1), None);
        assert_eq!(index_at(area(), 0, t.x, t.y), None);
        assert_eq!(index_at(area(), 1, t.x + 5, t.y), Some(0));
    }

    #[test]
    fn knob_spans_track() {
        assert_eq!(knob_offset(0, 10, 25), 0);
        assert_eq!(knob_offset(9, 10, 25), 24);
        assert_eq!(knob_offset(0, 1, 25), 0);
    }

    #[test]
    fn renders_position_label() {
        let mut buf = Buffer::empty(area());
        SliderWidget { index: Some(4), len: 10 }.render(area(), &mut buf);
        let row: String = (0..40).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("5 / 10"), "{row:?}");
        assert!(row.contains('●'));
    }
}
