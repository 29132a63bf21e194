//! Fetch indicator, a small spinner + label drawn on a pane's top border.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shown top-right of `area` while any fetch is in flight.
pub struct LoadingIndicator<'a> {
    pub visible: bool,
    pub tick: u64,
    pub label: &'a str,
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.height == 0 {
            return;
        }

        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        let text = format!(" {frame} {} ", self.label);
        let width = text.chars().count() as u16;
        if area.width < width + 4 {
            return;
        }

        let x = area.x + area.width.saturating_sub(width + 2);
        let line = Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(x, area.y, &line, width);
    }
}
