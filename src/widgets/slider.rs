use crate::report::TopN;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Integer slider drawn as `min [━━━●────] max  value`.
pub struct Slider<'a> {
    title: &'a str,
    value: TopN,
    focused: bool,
    border_color: Color,
    active_color: Color,
}

impl<'a> Slider<'a> {
    pub fn new(title: &'a str, value: TopN) -> Self {
        Self {
            title,
            value,
            focused: false,
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn colors(mut self, border_color: Color, active_color: Color) -> Self {
        self.border_color = border_color;
        self.active_color = active_color;
        self
    }

    pub const HEIGHT: u16 = 3;
}

/// Track of `width` cells with the knob placed proportionally between the bounds.
fn track(value: &TopN, width: usize) -> (String, String) {
    if width == 0 {
        return (String::new(), String::new());
    }
    let (min, max) = value.bounds();
    let span = max.saturating_sub(min).max(1);
    let pos = (value.value() - min) * (width - 1) / span;
    let filled = "━".repeat(pos);
    let rest = "─".repeat(width - 1 - pos);
    (filled, rest)
}

impl Widget for Slider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.active_color
        } else {
            self.border_color
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        let (min, max) = self.value.bounds();
        let min_label = min.to_string();
        let max_label = max.to_string();
        let value_label = format!("{:>3}", self.value.value());
        let reserved = min_label.len() + max_label.len() + value_label.len() + 4;
        let width = (inner.width as usize).saturating_sub(reserved);
        let (filled, rest) = track(&self.value, width);

        let mut knob_style = Style::default().fg(self.active_color);
        if self.focused {
            knob_style = knob_style.add_modifier(Modifier::BOLD);
        }
        let line = Line::from(vec![
            Span::styled(format!("{} ", min_label), Style::default().fg(self.border_color)),
            Span::styled(filled, Style::default().fg(self.active_color)),
            Span::styled("●", knob_style),
            Span::styled(rest, Style::default().fg(self.border_color)),
            Span::styled(format!(" {} ", max_label), Style::default().fg(self.border_color)),
            Span::styled(value_label, knob_style),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
