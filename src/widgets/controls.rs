use crate::chart_data::format_count;
use crate::render::context::RenderContext;
use crate::report::Page;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph, Widget},
};

const COMMON_CONTROLS: [(&str, &str); 5] = [
    ("Tab", "Focus"),
    ("1-3", "Page"),
    ("r", "Rerun"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Page-specific key hints shown before the common ones.
pub fn page_controls(page: Page) -> Vec<(&'static str, &'static str)> {
    let mut controls: Vec<(&str, &str)> = match page {
        Page::Home => vec![("↑↓←→", "Scroll"), ("e", "Export")],
        Page::Univariate => vec![("↑↓", "Select"), ("←→", "Change"), ("e", "Export")],
        Page::Multivariate => vec![
            ("↑↓", "Move"),
            ("Space", "Toggle"),
            ("a/n", "All/None"),
            ("e", "Export"),
        ],
    };
    controls.extend(COMMON_CONTROLS);
    controls
}

pub struct Controls {
    pub controls: Vec<(&'static str, &'static str)>,
    pub row_count: Option<usize>,
    /// Replaces the row count while set (export results, errors).
    pub status: Option<String>,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
}

impl Controls {
    pub fn from_context(page: Page, ctx: &RenderContext) -> Self {
        Self {
            controls: page_controls(page),
            row_count: None,
            status: None,
            bg_color: ctx.controls_bg,
            key_color: ctx.keybind_hints,
            label_color: ctx.keybind_labels,
        }
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    fn right_text(&self) -> Option<String> {
        self.status.clone().or_else(|| {
            self.row_count
                .map(|n| format!("Rows: {}", format_count(n as u64)))
        })
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let no_bg = self.bg_color == Color::Reset;
        if !no_bg {
            Block::default()
                .style(Style::default().bg(self.bg_color))
                .render(area, buf);
        }

        // Key and label each get one trailing space; pairs are never shrunk.
        let pair_width = |(key, action): &(&str, &str)| -> u16 {
            (key.chars().count() as u16 + 1) + (action.chars().count() as u16 + 1)
        };

        let right = self.right_text();
        let right_width = right
            .as_ref()
            .map(|t| t.chars().count() as u16 + 1)
            .unwrap_or(0);
        let mut available = area.width.saturating_sub(right_width + 1);

        let mut n_show = 0;
        for pair in self.controls.iter() {
            let need = pair_width(pair);
            if available < need {
                break;
            }
            available -= need;
            n_show += 1;
        }

        let mut constraints: Vec<Constraint> = self
            .controls
            .iter()
            .take(n_show)
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        constraints.push(Constraint::Length(right_width));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_style, label_style) = if no_bg {
            (
                Style::default().fg(self.key_color),
                Style::default().fg(self.label_color),
            )
        } else {
            let base = Style::default().bg(self.bg_color);
            (base.fg(self.key_color), base.fg(self.label_color))
        };

        for (i, (key, action)) in self.controls.iter().take(n_show).enumerate() {
            let j = i * 2;
            Paragraph::new(*key).style(key_style).render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        if let Some(text) = right {
            Paragraph::new(text)
                .style(label_style)
                .right_aligned()
                .render(layout[n_show * 2 + 1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(controls: &Controls, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        controls.render(area, &mut buf);
        (0..width).map(|x| buf[(x, 0)].symbol()).collect()
    }

    fn plain(page: Page) -> Controls {
        Controls {
            controls: page_controls(page),
            row_count: None,
            status: None,
            bg_color: Color::Reset,
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }

    #[test]
    fn test_row_count_is_right_aligned() {
        let line = render_to_string(&plain(Page::Home).with_row_count(1234), 120);
        assert!(line.trim_end().ends_with("Rows: 1,234"));
        assert!(line.starts_with("↑↓←→ Scroll"));
    }

    #[test]
    fn test_status_replaces_row_count() {
        let controls = plain(Page::Multivariate)
            .with_row_count(10)
            .with_status(Some("Exported 2 files".to_string()));
        let line = render_to_string(&controls, 140);
        assert!(line.contains("Exported 2 files"));
        assert!(!line.contains("Rows:"));
    }

    #[test]
    fn test_narrow_bar_drops_trailing_hints() {
        let line = render_to_string(&plain(Page::Univariate), 20);
        assert!(line.contains("Select"));
        assert!(!line.contains("Quit"));
    }
}
