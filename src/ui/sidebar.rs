//! Right-hand panes: the selected series, its description, and the
//! forecast values behind the current plot.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use super::theme::Theme;
use crate::core::forecast::{Column, ForecastPoints};

fn pane(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style())
}

// ───────────────────────────────────────── series box ────

/// The dropdown's closed state: the selected column and, when the plot
/// still shows a different one, what is actually on screen.
pub struct ColumnBox<'a> {
    pub selected: &'a Column,
    pub showing: Option<&'a Column>,
}

impl Widget for ColumnBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = pane("Series");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = vec![
            Span::styled(self.selected.as_str().to_string(), Theme::column_style()),
            Span::styled(" ▾", Style::default().fg(Color::DarkGray)),
        ];
        if let Some(showing) = self.showing.filter(|s| *s != self.selected) {
            spans.push(Span::styled(
                format!("  (showing {showing})"),
                Theme::stale_style(),
            ));
        }
        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

// ───────────────────────────────────────── info blurb ────

pub struct InfoPanel<'a> {
    pub text: &'a str,
}

impl Widget for InfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.text)
            .block(pane("About"))
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

// ───────────────────────────────────────── values table ────

pub struct ValuesTable<'a> {
    pub points: Option<&'a ForecastPoints>,
    /// Row to emphasise (the horizon the slider points at).
    pub highlight: Option<usize>,
}

impl Widget for ValuesTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = pane("Values");
        let points = match self.points.filter(|p| !p.is_empty()) {
            Some(p) => p,
            None => {
                Paragraph::new(Span::styled("No values", Theme::placeholder_style()))
                    .block(block)
                    .render(area, buf);
                return;
            }
        };

        let rows = points.rows().enumerate().map(|(i, (date, value))| {
            let style = if Some(i) == self.highlight {
                Theme::selected_style()
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(date.to_string()),
                Cell::from(format_value(value)),
            ])
            .style(style)
        });

        Table::new(rows, [Constraint::Min(10), Constraint::Length(12)])
            .header(Row::new(vec!["Date", "Value"]).style(Theme::caption_style()))
            .block(block)
            .render(area, buf);
    }
}

fn format_value(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    if v.abs() >= 1000.0 {
        format!("{v:>12.0}")
    } else {
        format!("{v:>12.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer, area: Rect) -> String {
        let mut out = String::new();
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn column_box_notes_stale_series() {
        let area = Rect::new(0, 0, 60, 3);
        let selected = Column::new("Retail trade");
        let showing = Column::new("Space economy");

        let mut buf = Buffer::empty(area);
        ColumnBox { selected: &selected, showing: Some(&showing) }.render(area, &mut buf);
        assert!(text(&buf, area).contains("(showing Space economy)"));

        let mut buf = Buffer::empty(area);
        ColumnBox { selected: &selected, showing: Some(&selected) }.render(area, &mut buf);
        assert!(!text(&buf, area).contains("showing"));
    }

    #[test]
    fn values_table_lists_rows() {
        let area = Rect::new(0, 0, 40, 8);
        let points = ForecastPoints {
            dates: vec!["2024-01".into(), "2024-02".into()],
            values: vec![1.5, 2500.0],
        };
        let mut buf = Buffer::empty(area);
        ValuesTable { points: Some(&points), highlight: Some(1) }.render(area, &mut buf);
        let out = text(&buf, area);
        assert!(out.contains("2024-01"));
        assert!(out.contains("1.50"));
        assert!(out.contains("2500"));
    }

    #[test]
    fn empty_values_show_placeholder() {
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        ValuesTable { points: None, highlight: None }.render(area, &mut buf);
        assert!(text(&buf, area).contains("No values"));
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(f64::NAN), "-");
        assert_eq!(format_value(3.14159).trim(), "3.14");
        assert_eq!(format_value(123456.7).trim(), "123457");
    }
}
