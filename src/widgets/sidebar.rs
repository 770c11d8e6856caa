use crate::chart_data::format_count;
use crate::render::context::RenderContext;
use crate::report::{
    CategoricalChart, MultivariateState, Page, PageState, PageView, UnivariateState, UnivariateTab,
};
use crate::widgets::radio_block::RadioBlock;
use crate::widgets::select_list::SelectList;
use crate::widgets::slider::Slider;
use crate::Focus;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

/// Left-hand control panel: page radio, then the active page's controls.
pub struct Sidebar<'a> {
    pub state: &'a PageState,
    pub view: Option<&'a PageView>,
    pub focus: Focus,
    pub ctx: &'a RenderContext,
    pub total_rows: usize,
    pub seed: Option<u64>,
}

impl Sidebar<'_> {
    fn radio<'b>(
        &self,
        title: &'b str,
        options: &'b [&'b str],
        selected: usize,
        focus: Focus,
    ) -> RadioBlock<'b> {
        RadioBlock::new(title, options, selected)
            .focused(self.focus == focus)
            .colors(self.ctx.dimmed, self.ctx.primary)
    }

    fn render_home(&self, area: Rect, buf: &mut Buffer) {
        let sample = match self.seed {
            Some(seed) => format!("Sample seed: {}", seed),
            None => "Sample: redrawn every rerun".to_string(),
        };
        let lines = vec![
            Line::from(format!("Rows: {}", format_count(self.total_rows as u64))),
            Line::from(sample),
            Line::from(""),
            Line::from("Press r to draw a new sample."),
        ];
        Paragraph::new(lines)
            .style(Style::default().fg(self.ctx.text_secondary))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Dataset")
                    .border_style(
                        Style::default().fg(self.ctx.border(self.focus == Focus::Content)),
                    ),
            )
            .render(area, buf);
    }

    fn render_univariate(&self, state: &UnivariateState, area: Rect, buf: &mut Buffer) {
        let (numeric, categorical) = match self.view {
            Some(PageView::Univariate(v)) => (
                v.numeric_columns.as_slice(),
                v.categorical_columns.as_slice(),
            ),
            _ => (&[][..], &[][..]),
        };
        let tabs: Vec<&str> = UnivariateTab::ALL.iter().map(|t| t.as_str()).collect();
        let tab_index = UnivariateTab::ALL.iter().position(|t| *t == state.tab).unwrap_or(0);

        match state.tab {
            UnivariateTab::Numerical => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(RadioBlock::height(2, 2)),
                        Constraint::Fill(1),
                    ])
                    .split(area);
                self.radio("Analysis", &tabs, tab_index, Focus::Tab)
                    .columns(2)
                    .render(rows[0], buf);
                SelectList::single("Numeric column", numeric, state.numeric_index)
                    .focused(self.focus == Focus::Column)
                    .colors(self.ctx.dimmed, self.ctx.primary, self.ctx.text_primary)
                    .empty_text("No numeric columns")
                    .render(rows[1], buf);
            }
            UnivariateTab::Categorical => {
                let charts: Vec<&str> = CategoricalChart::ALL.iter().map(|c| c.as_str()).collect();
                let chart_index = CategoricalChart::ALL
                    .iter()
                    .position(|c| *c == state.chart)
                    .unwrap_or(0);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(RadioBlock::height(2, 2)),
                        Constraint::Fill(1),
                        Constraint::Length(Slider::HEIGHT),
                        Constraint::Length(RadioBlock::height(2, 2)),
                    ])
                    .split(area);
                self.radio("Analysis", &tabs, tab_index, Focus::Tab)
                    .columns(2)
                    .render(rows[0], buf);
                SelectList::single("Categorical column", categorical, state.categorical_index)
                    .focused(self.focus == Focus::Column)
                    .colors(self.ctx.dimmed, self.ctx.primary, self.ctx.text_primary)
                    .empty_text("No categorical columns")
                    .render(rows[1], buf);
                Slider::new("Top N", state.top_n)
                    .focused(self.focus == Focus::TopN)
                    .colors(self.ctx.dimmed, self.ctx.primary)
                    .render(rows[2], buf);
                self.radio("Chart", &charts, chart_index, Focus::ChartKind)
                    .columns(2)
                    .render(rows[3], buf);
            }
        }
    }

    fn render_multivariate(&self, state: &MultivariateState, area: Rect, buf: &mut Buffer) {
        let universe = match self.view {
            Some(PageView::Multivariate(v)) => v.universe(),
            _ => Vec::new(),
        };
        let checked: Vec<bool> = universe.iter().map(|s| state.is_selected(s)).collect();
        let n_checked = checked.iter().filter(|c| **c).count();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(Slider::HEIGHT), Constraint::Fill(1)])
            .split(area);
        Slider::new("Top N states by price", state.top_n)
            .focused(self.focus == Focus::TopN)
            .colors(self.ctx.dimmed, self.ctx.primary)
            .render(rows[0], buf);
        SelectList::multi(
            format!("States ({}/{})", n_checked, universe.len()),
            &universe,
            &checked,
            state.cursor,
        )
        .focused(self.focus == Focus::States)
        .colors(self.ctx.dimmed, self.ctx.primary, self.ctx.text_primary)
        .empty_text("No states")
        .render(rows[1], buf);
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pages: Vec<&str> = Page::ALL.iter().map(|p| p.as_str()).collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(RadioBlock::height(pages.len(), 1)),
                Constraint::Fill(1),
            ])
            .split(area);
        self.radio("Page", &pages, self.state.page().index(), Focus::Page)
            .render(rows[0], buf);

        match self.state {
            PageState::Home => self.render_home(rows[1], buf),
            PageState::Univariate(s) => self.render_univariate(s, rows[1], buf),
            PageState::Multivariate(s) => self.render_multivariate(s, rows[1], buf),
        }
    }
}
