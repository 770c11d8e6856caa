use carscope::config::AppConfig;
use carscope::report::{CategoricalChart, MultivariateState, UnivariateTab};
use carscope::{App, AppEvent, Dataset, Focus, Page, PageState, PageView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use polars::prelude::*;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

mod common;

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Send a key and process whatever follow-up event it produces, like the main loop does.
fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    let mut next = app.event(&key(code));
    while let Some(event) = next.clone() {
        match event {
            AppEvent::Rerun | AppEvent::Export => next = app.event(&event),
            _ => break,
        }
    }
    next
}

fn app() -> App {
    App::new(common::used_cars_dataset()).unwrap().with_seed(Some(42))
}

fn screen(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| frame.render_widget(&mut *app, frame.area()))
        .unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn multivariate_view(app: &App) -> &carscope::report::MultivariateView {
    match app.view() {
        Some(PageView::Multivariate(v)) => v,
        _ => panic!("expected multivariate view"),
    }
}

#[test]
fn test_app_starts_on_home() {
    let app = app();
    assert_eq!(app.page(), Page::Home);
    assert_eq!(app.focus(), Focus::Page);
    assert!(app.view_error().is_none());
    match app.view() {
        Some(PageView::Home(home)) => assert_eq!(home.sample.height(), 50),
        _ => panic!("expected home view"),
    }
}

#[test]
fn test_number_keys_switch_pages() {
    let mut app = app();
    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.page(), Page::Univariate);
    assert!(matches!(app.view(), Some(PageView::Univariate(_))));

    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.page(), Page::Multivariate);
    assert!(matches!(app.view(), Some(PageView::Multivariate(_))));

    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.page(), Page::Home);
}

#[test]
fn test_page_radio_follows_arrow_keys() {
    let mut app = app();
    press(&mut app, KeyCode::Down);
    assert_eq!(app.page(), Page::Univariate);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.page(), Page::Multivariate);
    press(&mut app, KeyCode::Up);
    assert_eq!(app.page(), Page::Univariate);
}

#[test]
fn test_tab_cycles_controls_of_current_page() {
    let mut app = app().with_page(Page::Univariate);
    assert_eq!(app.focus_order(), vec![Focus::Page, Focus::Tab, Focus::Column]);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::Tab);

    // Switching to the categorical tab adds its controls.
    press(&mut app, KeyCode::Right);
    match app.state() {
        PageState::Univariate(s) => assert_eq!(s.tab, UnivariateTab::Categorical),
        _ => panic!("expected univariate state"),
    }
    assert_eq!(app.focus_order().len(), 5);

    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus(), Focus::Page);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus(), Focus::ChartKind);
    press(&mut app, KeyCode::Enter);
    match app.state() {
        PageState::Univariate(s) => assert_eq!(s.chart, CategoricalChart::Pie),
        _ => panic!("expected univariate state"),
    }
}

#[test]
fn test_categorical_top_n_changes_chart() {
    let mut app = app().with_page(Page::Univariate);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Right); // categorical tab
    press(&mut app, KeyCode::Tab); // column list
    press(&mut app, KeyCode::End); // state
    press(&mut app, KeyCode::Tab); // top n
    assert_eq!(app.focus(), Focus::TopN);
    press(&mut app, KeyCode::PageUp);
    press(&mut app, KeyCode::Right);

    match app.view() {
        Some(PageView::Univariate(view)) => {
            let categories = view.categories.as_ref().unwrap();
            assert_eq!(categories.column, "state");
            assert_eq!(categories.top_n, 11);
            assert_eq!(categories.counts.len(), 11);
        }
        _ => panic!("expected univariate view"),
    }
}

#[test]
fn test_state_selection_and_top_n_reset() {
    let mut app = app().with_page(Page::Multivariate);
    assert_eq!(multivariate_view(&app).selected.len(), 10);

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::States);

    // Cursor moves do not change the selection.
    press(&mut app, KeyCode::Down);
    assert_eq!(multivariate_view(&app).selected.len(), 10);

    press(&mut app, KeyCode::Char(' '));
    let view = multivariate_view(&app);
    assert_eq!(view.selected.len(), 9);
    assert!(!view.selected.contains(&view.top_states[1].group));
    assert_eq!(view.filtered_rows, 180);

    // Changing Top N resets to every candidate.
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus(), Focus::TopN);
    press(&mut app, KeyCode::Right);
    let view = multivariate_view(&app);
    assert_eq!(view.top_states.len(), 11);
    assert_eq!(view.selected.len(), 11);
}

#[test]
fn test_select_none_gives_empty_charts() {
    let mut app = app().with_page(Page::Multivariate);
    press(&mut app, KeyCode::Char('n'));
    let view = multivariate_view(&app);
    assert!(view.selected.is_empty());
    assert_eq!(view.filtered_rows, 0);
    assert!(view.box_plot.stats.is_empty());
    assert!(view.grouped.is_empty());

    let text = screen(&mut app, 140, 40);
    assert!(text.contains("No data for box plot"));

    press(&mut app, KeyCode::Char('a'));
    assert_eq!(multivariate_view(&app).selected.len(), 10);
}

#[test]
fn test_pages_keep_separate_state() {
    let mut app = app().with_page(Page::Multivariate);
    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.state(), &PageState::Multivariate(MultivariateState::default()));
    assert_eq!(multivariate_view(&app).selected.len(), 10);
}

#[test]
fn test_help_overlay_and_quit() {
    let mut app = app();
    assert!(press(&mut app, KeyCode::Char('?')).is_none());
    assert!(app.help_visible());
    // q closes the overlay first
    assert!(press(&mut app, KeyCode::Char('q')).is_none());
    assert!(!app.help_visible());
    assert!(matches!(press(&mut app, KeyCode::Char('q')), Some(AppEvent::Exit)));

    let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));
}

#[test]
fn test_resize_and_exit_produce_no_follow_up() {
    let mut app = app().with_page(Page::Univariate);
    assert!(app.event(&AppEvent::Resize(80, 24)).is_none());
    assert!(app.event(&AppEvent::Exit).is_none());
    assert_eq!(app.page(), Page::Univariate);
    assert!(matches!(app.view(), Some(PageView::Univariate(_))));
}

#[test]
fn test_home_scroll_does_not_redraw_sample() {
    let mut app = app();
    let before = match app.view() {
        Some(PageView::Home(home)) => home.sample.clone(),
        _ => panic!("expected home view"),
    };
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::Content);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.home_scroll().row_offset, 1);
    assert_eq!(app.home_scroll().col_offset, 1);
    match app.view() {
        Some(PageView::Home(home)) => assert!(home.sample.equals_missing(&before)),
        _ => panic!("expected home view"),
    }
}

#[test]
fn test_home_export_writes_sample_csv() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.chart.export_dir = Some(dir.path().to_path_buf());
    let mut app = App::new_with_config(common::used_cars_dataset(), config).unwrap();

    press(&mut app, KeyCode::Char('e'));
    let status = app.status().unwrap().to_string();
    assert!(status.starts_with("Exported 1 file(s)"), "{status}");
    assert!(dir.path().join("sample.csv").exists());

    // Any later key clears the status line.
    press(&mut app, KeyCode::Tab);
    assert!(app.status().is_none());
}

#[test]
fn test_build_error_shows_panel_not_crash() {
    let df = df!("price" => [1i64, 2, 3], "fuel" => ["gas", "gas", "diesel"]).unwrap();
    let mut app = App::new(Dataset::from_frame(df)).unwrap();
    press(&mut app, KeyCode::Char('3'));
    assert!(app.view().is_none());
    assert!(app.view_error().is_some());

    let text = screen(&mut app, 120, 30);
    assert!(text.contains("press r to try again"));

    // Other pages still work.
    press(&mut app, KeyCode::Char('2'));
    assert!(app.view_error().is_none());
}

#[test]
fn test_render_home_page() {
    let mut app = app();
    let text = screen(&mut app, 160, 48);
    assert!(text.contains("Used Cars EDA Project"));
    assert!(text.contains("Rows: 240"));
    assert!(text.contains("Column Descriptions"));
    assert_eq!(app.debug.num_frames, 1);
}

#[test]
fn test_render_univariate_and_multivariate() {
    let mut app = app();
    press(&mut app, KeyCode::Char('2'));
    let text = screen(&mut app, 160, 48);
    assert!(text.contains("Numeric column"));

    press(&mut app, KeyCode::Char('3'));
    let text = screen(&mut app, 160, 48);
    assert!(text.contains("States selected: 10/10"));
    assert!(text.contains("Filtered rows: 200"));
}
