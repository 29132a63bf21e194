//! Series picker popup listing the dropdown of columns the service can forecast.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use super::layout::centered_fixed;
use super::theme::Theme;
use crate::core::forecast::Column;

/// Blank line + hint line + borders around the list.
const CHROME_ROWS: u16 = 5;
const POPUP_WIDTH: u16 = 56;

pub struct ColumnPicker<'a> {
    pub columns: &'a [Column],
    /// Highlighted row.
    pub selected: usize,
    /// Column currently selected in the dashboard, marked with `●`.
    pub current: &'a Column,
    /// The service has not reported its column list yet.
    pub loading: bool,
}

/// Popup rectangle for `rows` entries inside `area`.
pub fn popup_rect(rows: usize, area: Rect) -> Rect {
    let height = (rows as u16).saturating_add(CHROME_ROWS);
    centered_fixed(POPUP_WIDTH, height, area)
}

/// Rows of the list that fit in the popup, and the first visible entry.
fn visible_window(selected: usize, total: usize, rows: usize) -> (usize, usize) {
    if rows == 0 || total <= rows {
        return (0, total.min(rows));
    }
    let start = selected.saturating_sub(rows - 1).min(total - rows);
    (start, rows)
}

/// Entry under a click, if it hit a list row of the popup.
pub fn row_at(total: usize, selected: usize, area: Rect, col: u16, row: u16) -> Option<usize> {
    let popup = popup_rect(total, area);
    if !super::layout::point_in_rect(popup, col, row) {
        return None;
    }
    // Border + leading blank line.
    let list_top = popup.y + 2;
    let rows = popup.height.saturating_sub(CHROME_ROWS) as usize;
    if row < list_top || (row - list_top) as usize >= rows {
        return None;
    }
    let (start, shown) = visible_window(selected, total, rows);
    let offset = (row - list_top) as usize;
    (offset < shown).then_some(start + offset)
}

impl Widget for ColumnPicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = popup_rect(self.columns.len(), area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Series ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let rows = popup.height.saturating_sub(CHROME_ROWS) as usize;
        let (start, shown) = visible_window(self.selected, self.columns.len(), rows);

        let mut lines = Vec::with_capacity(shown + 3);
        lines.push(Line::raw(""));
        for (i, column) in self.columns.iter().enumerate().skip(start).take(shown) {
            let is_selected = i == self.selected;
            let prefix = if is_selected { " ▸ " } else { "   " };
            let style = if is_selected {
                Theme::selected_style()
            } else {
                Style::default().fg(Color::White)
            };
            let mut spans = vec![Span::styled(format!("{prefix}{column}"), style)];
            if column == self.current {
                spans.push(Span::styled("  ●", Style::default().fg(Color::Green)));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
        let hint = if self.loading {
            "  Loading series list…  Esc: close"
        } else {
            "  ↑/↓: move  Enter: choose  Esc: close"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(n: usize) -> Vec<Column> {
        (0..n).map(|i| Column::new(format!("Series {i}"))).collect()
    }

    #[test]
    fn window_follows_selection() {
        assert_eq!(visible_window(0, 3, 10), (0, 3));
        assert_eq!(visible_window(0, 30, 10), (0, 10));
        assert_eq!(visible_window(15, 30, 10), (6, 10));
        assert_eq!(visible_window(29, 30, 10), (20, 10));
    }

    #[test]
    fn clicks_map_to_rows() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_rect(4, area);
        let first = popup.y + 2;
        assert_eq!(row_at(4, 0, area, popup.x + 3, first), Some(0));
        assert_eq!(row_at(4, 0, area, popup.x + 3, first + 3), Some(3));
        assert_eq!(row_at(4, 0, area, popup.x + 3, first + 4), None);
        assert_eq!(row_at(4, 0, area, 0, 0), None);
    }

    #[test]
    fn marks_highlight_and_current() {
        let area = Rect::new(0, 0, 80, 20);
        let columns = cols(3);
        let mut buf = Buffer::empty(area);
        ColumnPicker {
            columns: &columns,
            selected: 1,
            current: &columns[2],
            loading: false,
        }
        .render(area, &mut buf);

        let popup = popup_rect(3, area);
        let line = |y: u16| -> String {
            (popup.x..popup.right()).map(|x| buf[(x, y)].symbol().to_string()).collect()
        };
        assert!(line(popup.y + 3).contains("▸ Series 1"));
        assert!(line(popup.y + 4).contains("Series 2  ●"));
    }
}
