//! Home page: banner, random sample table and the column description table.

use crate::chart_data::format_count;
use crate::render::context::RenderContext;
use crate::report::HomeView;
use polars::prelude::AnyValue;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Widget},
};
use std::borrow::Cow;

pub const BANNER_TITLE: &str = "🚗 Used Cars EDA Project";
pub const COVER_IMAGE_URL: &str = "https://storage.googleapis.com/kaggle-datasets-images/62920/121792/0b2d5fa44f4288eb760b7d83f9f1dfd2/dataset-cover.jpg?t=2018-10-10-16-28-48";
pub const BANNER_HEIGHT: u16 = 3;

const MAX_CELL_WIDTH: u16 = 24;
const CELL_PADDING: u16 = 1;

/// Scroll position of the sample table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeScroll {
    pub row_offset: usize,
    pub col_offset: usize,
}

impl HomeScroll {
    pub fn scroll_rows(&mut self, delta: i64, n_rows: usize) {
        self.row_offset = offset_by(self.row_offset, delta, n_rows);
    }

    pub fn scroll_cols(&mut self, delta: i64, n_cols: usize) {
        self.col_offset = offset_by(self.col_offset, delta, n_cols);
    }
}

fn offset_by(current: usize, delta: i64, len: usize) -> usize {
    let max = len.saturating_sub(1) as i64;
    (current as i64 + delta).clamp(0, max.max(0)) as usize
}

/// Display text for one table cell; nulls render empty.
pub fn cell_text<'a>(value: &'a AnyValue<'a>) -> Cow<'a, str> {
    if matches!(value, AnyValue::Null) {
        Cow::Borrowed("")
    } else {
        value.str_value()
    }
}

pub struct HomePage<'a> {
    pub view: &'a HomeView,
    pub scroll: HomeScroll,
    pub show_banner: bool,
    pub focused: bool,
    pub ctx: &'a RenderContext,
}

impl HomePage<'_> {
    fn block<'b>(&self, title: impl Into<Line<'b>>, focused: bool) -> Block<'b> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.ctx.border(focused)))
            .title(title)
    }

    fn render_banner(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                BANNER_TITLE,
                Style::default()
                    .fg(self.ctx.primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Cover image: {}", COVER_IMAGE_URL),
                Style::default().fg(self.ctx.text_secondary),
            )),
        ];
        Paragraph::new(lines).render(area, buf);
    }

    fn render_sample(&self, area: Rect, buf: &mut Buffer) {
        let df = &self.view.sample;
        let title = format!(
            "Random sample ({} of {} rows)",
            df.height(),
            format_count(self.view.total_rows as u64)
        );
        let block = self.block(title, self.focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if df.height() == 0 || df.width() == 0 {
            Paragraph::new("Dataset is empty")
                .style(Style::default().fg(self.ctx.text_secondary))
                .centered()
                .render(inner, buf);
            return;
        }

        let body_rows = inner.height.saturating_sub(1) as usize;
        let row_start = self.scroll.row_offset.min(df.height() - 1);
        let row_end = (row_start + body_rows).min(df.height());

        let mut widths: Vec<u16> = Vec::new();
        let mut headers: Vec<Cell> = Vec::new();
        let mut columns: Vec<Vec<Cell>> = Vec::new();
        let mut used = 0u16;
        for column in df.get_columns().iter().skip(self.scroll.col_offset) {
            let name = column.name().as_str();
            let mut width = name.chars().count() as u16;
            let mut cells = Vec::with_capacity(row_end - row_start);
            for row in row_start..row_end {
                let text = match column.get(row) {
                    Ok(value) => cell_text(&value).into_owned(),
                    Err(_) => String::new(),
                };
                width = width.max(text.chars().count() as u16);
                cells.push(Cell::from(text));
            }
            let width = width.min(MAX_CELL_WIDTH);
            if !widths.is_empty() && used + width > inner.width {
                break;
            }
            used += width + CELL_PADDING;
            widths.push(width);
            headers.push(Cell::from(name.to_string()));
            columns.push(cells);
        }

        let rows: Vec<Row> = (0..row_end - row_start)
            .map(|i| {
                Row::new(
                    columns
                        .iter()
                        .map(|cells| cells.get(i).cloned().unwrap_or_default())
                        .collect::<Vec<_>>(),
                )
                .style(Style::default().fg(self.ctx.text_primary))
            })
            .collect();
        let header_style = Style::default()
            .fg(self.ctx.table_header)
            .add_modifier(Modifier::BOLD);
        Table::new(rows, widths.into_iter().map(Constraint::Length))
            .header(Row::new(headers).style(header_style))
            .column_spacing(CELL_PADDING)
            .render(inner, buf);
    }

    fn render_descriptions(&self, area: Rect, buf: &mut Buffer) {
        let block = self.block("📝 Column Descriptions", false);
        let inner = block.inner(area);
        block.render(area, buf);

        let key_width = self
            .view
            .descriptions
            .iter()
            .map(|(k, _)| k.chars().count() as u16)
            .max()
            .unwrap_or(0);
        let rows: Vec<Row> = self
            .view
            .descriptions
            .iter()
            .map(|(k, v)| {
                Row::new(vec![
                    Cell::from(Span::styled(*k, Style::default().fg(self.ctx.secondary))),
                    Cell::from(Span::styled(*v, Style::default().fg(self.ctx.text_primary))),
                ])
            })
            .collect();
        let header_style = Style::default()
            .fg(self.ctx.table_header)
            .add_modifier(Modifier::BOLD);
        Table::new(rows, [Constraint::Length(key_width), Constraint::Fill(1)])
            .header(Row::new(vec!["Column", "Description"]).style(header_style))
            .column_spacing(2)
            .render(inner, buf);
    }
}

impl Widget for HomePage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let banner_height = if self.show_banner { BANNER_HEIGHT } else { 0 };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height),
                Constraint::Percentage(55),
                Constraint::Fill(1),
            ])
            .split(area);

        if self.show_banner {
            self.render_banner(rows[0], buf);
        }
        self.render_sample(rows[1], buf);
        self.render_descriptions(rows[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_is_clamped() {
        let mut scroll = HomeScroll::default();
        scroll.scroll_rows(-3, 50);
        assert_eq!(scroll.row_offset, 0);
        scroll.scroll_rows(100, 50);
        assert_eq!(scroll.row_offset, 49);
        scroll.scroll_cols(2, 0);
        assert_eq!(scroll.col_offset, 0);
    }

    #[test]
    fn test_cell_text_null_is_empty() {
        assert_eq!(cell_text(&AnyValue::Null), "");
        assert_eq!(cell_text(&AnyValue::String("ford")), "ford");
        assert_eq!(cell_text(&AnyValue::Int64(2015)), "2015");
    }
}
