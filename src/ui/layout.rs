//! Layout helpers that split the terminal area into dashboard regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Dashboard layout: plot, caption, and slider on the left; series, info
/// blurb, and forecast values on the right; status bar at the bottom.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub plot_area: Rect,
    pub caption_area: Rect,
    pub slider_area: Rect,
    pub column_area: Rect,
    pub info_area: Rect,
    pub values_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // panes
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(rows[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),    // plot
                Constraint::Length(1), // caption
                Constraint::Length(3), // slider (bordered)
            ])
            .split(panes[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // selected series (bordered)
                Constraint::Min(4),    // info blurb
                Constraint::Percentage(40),
            ])
            .split(panes[1]);

        Self {
            plot_area: left[0],
            caption_area: left[1],
            slider_area: left[2],
            column_area: right[0],
            info_area: right[1],
            values_area: right[2],
            status_area: rows[1],
        }
    }
}

pub fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Centred rectangle with fixed dimensions, clamped to `area`.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
