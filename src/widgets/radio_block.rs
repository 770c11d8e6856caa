//! Bordered block of radio options (● selected, ○ unselected).
//! Used for the page selector, the univariate tab and the chart kind.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

pub struct RadioBlock<'a> {
    title: &'a str,
    options: &'a [&'a str],
    selected: usize,
    focused: bool,
    columns: usize,
    border_color: Color,
    active_color: Color,
}

impl<'a> RadioBlock<'a> {
    pub fn new(title: &'a str, options: &'a [&'a str], selected: usize) -> Self {
        Self {
            title,
            options,
            selected,
            focused: false,
            columns: 1,
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Options per row; 1 stacks them vertically.
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn colors(mut self, border_color: Color, active_color: Color) -> Self {
        self.border_color = border_color;
        self.active_color = active_color;
        self
    }

    /// Rows needed to draw `n` options in `columns` columns, borders included.
    pub fn height(n: usize, columns: usize) -> u16 {
        n.div_ceil(columns.max(1)) as u16 + 2
    }

    fn option_span(&self, idx: usize, label: &str) -> Span<'static> {
        let is_selected = idx == self.selected;
        let marker = if is_selected { "●" } else { "○" };
        let mut style = Style::default().fg(if is_selected {
            self.active_color
        } else {
            self.border_color
        });
        if self.focused && is_selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Span::styled(format!("{} {}", marker, label), style)
    }
}

impl Widget for RadioBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title)
            .border_style(Style::default().fg(if self.focused {
                self.active_color
            } else {
                self.border_color
            }));
        let inner = block.inner(area);
        block.render(area, buf);
        if self.options.is_empty() || inner.width == 0 {
            return;
        }

        let cols = self.columns.min(self.options.len());
        let col_width = inner.width / cols as u16;
        for (idx, label) in self.options.iter().enumerate() {
            let row = (idx / cols) as u16;
            let col = (idx % cols) as u16;
            if row >= inner.height {
                break;
            }
            let cell = Rect::new(inner.x + col * col_width, inner.y + row, col_width, 1);
            Paragraph::new(Line::from(self.option_span(idx, label))).render(cell, buf);
        }
    }
}
