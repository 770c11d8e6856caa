//! Bordered list used for column selectors (single choice) and the state
//! multi-select (checkbox per item).

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
    },
};

pub enum SelectMode<'a> {
    /// Index of the chosen item; the cursor sits on it.
    Single(usize),
    /// Checked flag per item plus the cursor position.
    Multi { checked: &'a [bool], cursor: usize },
}

pub struct SelectList<'a> {
    title: String,
    items: &'a [String],
    mode: SelectMode<'a>,
    focused: bool,
    border_color: Color,
    active_color: Color,
    text_color: Color,
    empty_text: &'a str,
}

impl<'a> SelectList<'a> {
    pub fn single(title: impl Into<String>, items: &'a [String], selected: usize) -> Self {
        Self::with_mode(title.into(), items, SelectMode::Single(selected))
    }

    pub fn multi(
        title: impl Into<String>,
        items: &'a [String],
        checked: &'a [bool],
        cursor: usize,
    ) -> Self {
        Self::with_mode(title.into(), items, SelectMode::Multi { checked, cursor })
    }

    fn with_mode(title: String, items: &'a [String], mode: SelectMode<'a>) -> Self {
        Self {
            title,
            items,
            mode,
            focused: false,
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
            text_color: Color::White,
            empty_text: "No columns",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn colors(mut self, border_color: Color, active_color: Color, text_color: Color) -> Self {
        self.border_color = border_color;
        self.active_color = active_color;
        self.text_color = text_color;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    fn cursor(&self) -> usize {
        match self.mode {
            SelectMode::Single(i) => i,
            SelectMode::Multi { cursor, .. } => cursor,
        }
    }

    fn item<'b>(&self, idx: usize, name: &'b str) -> ListItem<'b> {
        let (marker, on) = match self.mode {
            SelectMode::Single(selected) => {
                (if idx == selected { "▸ " } else { "  " }, idx == selected)
            }
            SelectMode::Multi { checked, .. } => {
                let on = checked.get(idx).copied().unwrap_or(false);
                (if on { "[x] " } else { "[ ] " }, on)
            }
        };
        let style = if on {
            Style::default().fg(self.active_color)
        } else {
            Style::default().fg(self.text_color)
        };
        ListItem::new(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(name, style),
        ]))
    }
}

impl Widget for SelectList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title.as_str())
            .border_style(Style::default().fg(if self.focused {
                self.active_color
            } else {
                self.border_color
            }));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(self.empty_text)
                .style(Style::default().fg(self.border_color))
                .render(inner, buf);
            return;
        }

        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, name)| self.item(i, name.as_str()))
            .collect();
        let list = List::new(list_items).highlight_style(if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });

        let mut state = ListState::default();
        state.select(Some(self.cursor().min(self.items.len() - 1)));
        StatefulWidget::render(list, inner, buf, &mut state);
    }
}
