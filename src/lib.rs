use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::{debug, info, warn};

use ratatui::style::Style;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Block, widgets::Widget};

pub mod aggregate;
pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod dataset;
pub mod error_display;
pub mod help_strings;
pub mod logging;
pub mod render;
pub mod report;
pub mod widgets;

pub use cache::CacheManager;
pub use carscope_cli::{Args, FileFormat};
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use dataset::Dataset;
pub use report::{Page, PageState, PageView};

use chart_export::{export_view, ExportOptions};
use error_display::user_message_from_report;
use render::context::RenderContext;
use render::layout::app_layout;
use render::overlays::{render_error_panel, render_help_overlay};
use report::{build_view, CategoricalChart, UnivariateTab};
use widgets::charts::{render_multivariate_view, render_univariate_view};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::home::{HomePage, HomeScroll};
use widgets::sidebar::Sidebar;

/// Application name used for cache and config directories
pub const APP_NAME: &str = "carscope";

/// Top-N slider step for PageUp/PageDown.
const TOP_N_PAGE_STEP: i64 = 5;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16), // resized (width, height)
    /// Rebuild the active page from the dataset and current selections.
    Rerun,
    Export,
    Exit,
}

/// Sidebar control (or main panel) that receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Page,
    Tab,
    Column,
    TopN,
    ChartKind,
    States,
    Content,
}

impl Focus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Tab => "tab",
            Self::Column => "column",
            Self::TopN => "top_n",
            Self::ChartKind => "chart",
            Self::States => "states",
            Self::Content => "content",
        }
    }
}

pub struct App {
    dataset: Dataset,
    config: AppConfig,
    theme: Theme,
    export: ExportOptions,
    state: PageState,
    view: Option<PageView>,
    view_error: Option<String>,
    seed: Option<u64>,
    focus: Focus,
    home_scroll: HomeScroll,
    show_help: bool,
    help_scroll: usize,
    status: Option<String>,
    pub debug: DebugState,
}

impl App {
    pub fn new(dataset: Dataset) -> Result<App> {
        Self::new_with_config(dataset, AppConfig::default())
    }

    /// Build the app and run the start page once so there is always something to draw.
    pub fn new_with_config(dataset: Dataset, config: AppConfig) -> Result<App> {
        let theme = Theme::from_config(&config.theme)?;
        let export = ExportOptions::from_config(&config.chart)?;
        let mut app = App {
            dataset,
            theme,
            export,
            state: PageState::new(Page::default()),
            view: None,
            view_error: None,
            seed: None,
            focus: Focus::default(),
            home_scroll: HomeScroll::default(),
            show_help: false,
            help_scroll: 0,
            status: None,
            debug: DebugState {
                enabled: config.debug.enabled,
                ..DebugState::default()
            },
            config,
        };
        app.rerun();
        Ok(app)
    }

    /// Make the Home sample reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        if self.page() == Page::Home {
            self.rerun();
        }
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        if self.state.switch_to(page) {
            self.rerun();
        }
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn page(&self) -> Page {
        self.state.page()
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn view(&self) -> Option<&PageView> {
        self.view.as_ref()
    }

    pub fn view_error(&self) -> Option<&str> {
        self.view_error.as_deref()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn help_visible(&self) -> bool {
        self.show_help
    }

    pub fn home_scroll(&self) -> HomeScroll {
        self.home_scroll
    }

    /// Controls the focus cycles through on the current page.
    pub fn focus_order(&self) -> Vec<Focus> {
        match &self.state {
            PageState::Home => vec![Focus::Page, Focus::Content],
            PageState::Univariate(s) => match s.tab {
                UnivariateTab::Numerical => vec![Focus::Page, Focus::Tab, Focus::Column],
                UnivariateTab::Categorical => vec![
                    Focus::Page,
                    Focus::Tab,
                    Focus::Column,
                    Focus::TopN,
                    Focus::ChartKind,
                ],
            },
            PageState::Multivariate(_) => vec![Focus::Page, Focus::TopN, Focus::States],
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Rebuild the active page. A failure is kept for the error panel, never fatal.
    pub fn rerun(&mut self) {
        let started = Instant::now();
        match build_view(&self.dataset, &self.state, self.seed) {
            Ok(view) => {
                self.view = Some(view);
                self.view_error = None;
            }
            Err(e) => {
                warn!(page = self.page().as_str(), error = %e, "page build failed");
                self.view = None;
                self.view_error = Some(user_message_from_report(&e));
            }
        }
        let took = started.elapsed();
        self.debug.on_rerun(took);
        debug!(
            page = self.page().as_str(),
            ms = took.as_secs_f64() * 1000.0,
            "rerun"
        );

        if let (PageState::Multivariate(s), Some(PageView::Multivariate(v))) =
            (&mut self.state, &self.view)
        {
            s.cursor = s.cursor.min(v.top_states.len().saturating_sub(1));
        }
        if let Some(PageView::Home(home)) = &self.view {
            let n = home.sample.height();
            self.home_scroll.row_offset = self.home_scroll.row_offset.min(n.saturating_sub(1));
        }
    }

    fn switch_page(&mut self, page: Page) -> Option<AppEvent> {
        if !self.state.switch_to(page) {
            return None;
        }
        info!(page = page.as_str(), "switched page");
        self.focus = Focus::Page;
        self.home_scroll = HomeScroll::default();
        Some(AppEvent::Rerun)
    }

    fn export(&mut self) {
        let Some(view) = &self.view else {
            self.status = Some("Nothing to export".to_string());
            return;
        };
        match export_view(view, &self.state, &self.export) {
            Ok(paths) => {
                info!(files = paths.len(), dir = %self.export.dir.display(), "export finished");
                self.status = Some(format!(
                    "Exported {} file(s) to {}",
                    paths.len(),
                    self.export.dir.display()
                ));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.status = Some(user_message_from_report(&e));
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Rerun => {
                self.rerun();
                None
            }
            AppEvent::Export => {
                self.export();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                    self.help_scroll = 0;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                KeyCode::PageDown => {
                    self.help_scroll = self.help_scroll.saturating_add(10);
                }
                KeyCode::PageUp => {
                    self.help_scroll = self.help_scroll.saturating_sub(10);
                }
                _ => {}
            }
            return None;
        }

        self.status = None;
        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Exit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Tab => {
                self.cycle_focus(true);
                None
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                None
            }
            KeyCode::Char('1') => self.switch_page(Page::Home),
            KeyCode::Char('2') => self.switch_page(Page::Univariate),
            KeyCode::Char('3') => self.switch_page(Page::Multivariate),
            KeyCode::Char('r') => Some(AppEvent::Rerun),
            KeyCode::Char('e') => Some(AppEvent::Export),
            _ => self.focused_key(event),
        }
    }

    /// Keys routed to the focused control. Returns `Rerun` when a selection changed.
    fn focused_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let universe = match &self.view {
            Some(PageView::Multivariate(v)) => v.universe(),
            _ => Vec::new(),
        };
        let (n_numeric, n_categorical) = match &self.view {
            Some(PageView::Univariate(v)) => (v.numeric_columns.len(), v.categorical_columns.len()),
            _ => (0, 0),
        };
        let sample_shape = match &self.view {
            Some(PageView::Home(h)) => (h.sample.height(), h.sample.width()),
            _ => (0, 0),
        };

        if let PageState::Multivariate(s) = &mut self.state {
            match event.code {
                KeyCode::Char('a') => {
                    s.select_all();
                    return Some(AppEvent::Rerun);
                }
                KeyCode::Char('n') => {
                    s.clear();
                    return Some(AppEvent::Rerun);
                }
                _ => {}
            }
        }

        match self.focus {
            Focus::Page => {
                let idx = self.page().index();
                let next = match event.code {
                    KeyCode::Up | KeyCode::Char('k') | KeyCode::Left => idx.saturating_sub(1),
                    KeyCode::Down | KeyCode::Char('j') | KeyCode::Right => {
                        (idx + 1).min(Page::ALL.len() - 1)
                    }
                    _ => idx,
                };
                return self.switch_page(Page::ALL[next]);
            }
            Focus::Content => {
                let (rows, cols) = sample_shape;
                match event.code {
                    KeyCode::Up | KeyCode::Char('k') => self.home_scroll.scroll_rows(-1, rows),
                    KeyCode::Down | KeyCode::Char('j') => self.home_scroll.scroll_rows(1, rows),
                    KeyCode::PageUp => self.home_scroll.scroll_rows(-10, rows),
                    KeyCode::PageDown => self.home_scroll.scroll_rows(10, rows),
                    KeyCode::Left | KeyCode::Char('h') => self.home_scroll.scroll_cols(-1, cols),
                    KeyCode::Right | KeyCode::Char('l') => self.home_scroll.scroll_cols(1, cols),
                    _ => {}
                }
                return None;
            }
            _ => {}
        }

        let changed = match (self.focus, &mut self.state) {
            (Focus::Tab, PageState::Univariate(s)) => match event.code {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Enter
                | KeyCode::Char(' ') => {
                    s.tab = match s.tab {
                        UnivariateTab::Numerical => UnivariateTab::Categorical,
                        UnivariateTab::Categorical => UnivariateTab::Numerical,
                    };
                    true
                }
                _ => false,
            },
            (Focus::Column, PageState::Univariate(s)) => {
                let (index, len) = match s.tab {
                    UnivariateTab::Numerical => (&mut s.numeric_index, n_numeric),
                    UnivariateTab::Categorical => (&mut s.categorical_index, n_categorical),
                };
                step_index(index, event.code, len)
            }
            (Focus::TopN, PageState::Univariate(s)) => match top_n_delta(event.code) {
                Some(delta) => s.top_n.step(delta),
                None => false,
            },
            (Focus::TopN, PageState::Multivariate(s)) => match top_n_delta(event.code) {
                Some(delta) => s.step_top_n(delta),
                None => false,
            },
            (Focus::ChartKind, PageState::Univariate(s)) => match event.code {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Enter
                | KeyCode::Char(' ') => {
                    s.chart = match s.chart {
                        CategoricalChart::Histogram => CategoricalChart::Pie,
                        CategoricalChart::Pie => CategoricalChart::Histogram,
                    };
                    true
                }
                _ => false,
            },
            (Focus::States, PageState::Multivariate(s)) => match event.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    s.cursor = s.cursor.saturating_sub(1);
                    false
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    s.cursor = (s.cursor + 1).min(universe.len().saturating_sub(1));
                    false
                }
                KeyCode::Enter | KeyCode::Char(' ') => match universe.get(s.cursor) {
                    Some(state) => {
                        s.toggle(state, &universe);
                        true
                    }
                    None => false,
                },
                _ => false,
            },
            _ => false,
        };
        changed.then_some(AppEvent::Rerun)
    }

    fn row_count(&self) -> usize {
        match &self.view {
            Some(PageView::Multivariate(v)) => v.filtered_rows,
            _ => self.dataset.height(),
        }
    }
}

fn top_n_delta(code: KeyCode) -> Option<i64> {
    match code {
        KeyCode::Right | KeyCode::Up | KeyCode::Char('l') => Some(1),
        KeyCode::Left | KeyCode::Down | KeyCode::Char('h') => Some(-1),
        KeyCode::PageUp => Some(TOP_N_PAGE_STEP),
        KeyCode::PageDown => Some(-TOP_N_PAGE_STEP),
        _ => None,
    }
}

/// Move a list index with Up/Down/Home/End. Returns true when it moved.
fn step_index(index: &mut usize, code: KeyCode, len: usize) -> bool {
    if len == 0 {
        return false;
    }
    let next = match code {
        KeyCode::Up | KeyCode::Char('k') => index.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (*index + 1).min(len - 1),
        KeyCode::Home => 0,
        KeyCode::End => len - 1,
        _ => *index,
    };
    let changed = next != *index;
    *index = next;
    changed
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        self.debug.focus = self.focus.as_str().to_string();
        let ctx = RenderContext::from_theme(&self.theme);

        Block::default()
            .style(Style::default().bg(ctx.background))
            .render(area, buf);

        let layout = app_layout(area, self.config.display.sidebar_width, self.debug.enabled);

        Sidebar {
            state: &self.state,
            view: self.view.as_ref(),
            focus: self.focus,
            ctx: &ctx,
            total_rows: self.dataset.height(),
            seed: self.seed,
        }
        .render(layout.sidebar, buf);

        if let Some(message) = &self.view_error {
            render_error_panel(layout.content, buf, message, &ctx);
        } else {
            match (&self.view, &self.state) {
                (Some(PageView::Home(view)), _) => HomePage {
                    view,
                    scroll: self.home_scroll,
                    show_banner: self.config.display.show_banner,
                    focused: self.focus == Focus::Content,
                    ctx: &ctx,
                }
                .render(layout.content, buf),
                (Some(PageView::Univariate(view)), PageState::Univariate(state)) => {
                    render_univariate_view(layout.content, buf, &ctx, view, state)
                }
                (Some(PageView::Multivariate(view)), _) => {
                    render_multivariate_view(layout.content, buf, &ctx, view)
                }
                _ => {}
            }
        }

        if self.show_help {
            let text = help_strings::for_page(self.page());
            render_help_overlay(area, buf, "Help", &text, &mut self.help_scroll, &ctx);
        }

        let controls = Controls::from_context(self.page(), &ctx)
            .with_row_count(self.row_count())
            .with_status(self.status.clone());
        (&controls).render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            (&self.debug).render(debug_area, buf);
        }
    }
}
