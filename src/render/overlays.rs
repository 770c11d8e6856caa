//! Help overlay and the error panel shown in place of a page that failed to build.

use crate::render::context::RenderContext;
use crate::render::layout::centered_rect;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap};

/// Split `text` into lines no wider than `width` characters.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            out.push(chunk.iter().collect());
        }
    }
    out
}

/// Help text in a centered popup with a scrollbar. Clamps `scroll` so the caller can keep it.
pub fn render_help_overlay(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    text: &str,
    scroll: &mut usize,
    ctx: &RenderContext,
) {
    let popup_area = centered_rect(area, 80, 80);
    Clear.render(popup_area, buf);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(popup_area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ctx.primary))
        .style(Style::default().bg(ctx.background));
    let inner = block.inner(cols[0]);
    block.render(cols[0], buf);

    let lines = wrap_lines(text, inner.width as usize);
    let height = inner.height as usize;
    let max_scroll = lines.len().saturating_sub(height);
    *scroll = (*scroll).min(max_scroll);

    let visible: Vec<Line> = lines
        .iter()
        .skip(*scroll)
        .take(height)
        .map(|l| Line::from(l.as_str()))
        .collect();
    Paragraph::new(visible)
        .style(Style::default().fg(ctx.text_primary))
        .render(inner, buf);

    if lines.len() > height && cols[1].height > 0 {
        let track = cols[1].height;
        let thumb = ((height as f64 / lines.len() as f64) * track as f64).max(1.0) as u16;
        let thumb = thumb.min(track);
        let pos = if max_scroll > 0 {
            ((*scroll as f64 / max_scroll as f64) * (track - thumb) as f64) as u16
        } else {
            0
        };
        for y in 0..track {
            let style = if y >= pos && y < pos + thumb {
                Style::default().fg(ctx.text_primary)
            } else {
                Style::default().fg(ctx.dimmed)
            };
            buf.set_string(cols[1].x, cols[1].y + y, "█", style);
        }
    }
}

/// Error message in the main panel. The rest of the UI stays usable.
pub fn render_error_panel(area: Rect, buf: &mut Buffer, message: &str, ctx: &RenderContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ctx.error))
        .title("Error")
        .title_style(Style::default().fg(ctx.error).add_modifier(Modifier::BOLD));
    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::styled(
            "Change a control or press r to try again.",
            Style::default().fg(ctx.text_secondary),
        ),
    ];
    Paragraph::new(lines)
        .style(Style::default().fg(ctx.text_primary))
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}
