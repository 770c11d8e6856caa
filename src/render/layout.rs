use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Top-level layout: sidebar and page content side by side, control bar, optional debug row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub sidebar: Rect,
    pub content: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

/// Vertical split into body (fill), control bar (1 row) and optional debug row (1 row);
/// the body is then split into a fixed-width sidebar and the content area.
pub fn app_layout(area: Rect, sidebar_width: u16, debug_enabled: bool) -> AppLayout {
    let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
    if debug_enabled {
        constraints.push(Constraint::Length(1));
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Fill(1)])
        .split(rows[0]);

    AppLayout {
        sidebar: body[0],
        content: body[1],
        control_bar: rows[1],
        debug: debug_enabled.then(|| rows[2]),
    }
}

/// Centered rect within `r` with given percentage width and height.
pub fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
