use carscope::report::{
    build_view, CategoricalChart, MultivariateState, Page, PageState, PageView, UnivariateState,
    UnivariateTab, HOME_SAMPLE_SIZE,
};
use carscope::Dataset;
use polars::prelude::*;

mod common;

fn multivariate(view: PageView) -> carscope::report::MultivariateView {
    match view {
        PageView::Multivariate(v) => v,
        other => panic!("expected multivariate view, got {:?}", other),
    }
}

#[test]
fn test_home_sample_size_is_capped() {
    let dataset = common::used_cars_dataset();
    let PageView::Home(home) = build_view(&dataset, &PageState::Home, None).unwrap() else {
        panic!("expected home view");
    };
    assert_eq!(home.sample.height(), HOME_SAMPLE_SIZE);
    assert_eq!(home.total_rows, common::ROWS);
    assert_eq!(home.sample.width(), dataset.frame().width());

    let small = Dataset::from_frame(common::used_cars_frame().head(Some(7)));
    let PageView::Home(home) = build_view(&small, &PageState::Home, None).unwrap() else {
        panic!("expected home view");
    };
    assert_eq!(home.sample.height(), 7);
}

#[test]
fn test_seeded_home_sample_is_reproducible() {
    let dataset = common::used_cars_dataset();
    let sample = |seed| match build_view(&dataset, &PageState::Home, Some(seed)).unwrap() {
        PageView::Home(home) => home.sample,
        _ => unreachable!(),
    };
    assert!(sample(7).equals_missing(&sample(7)));
}

#[test]
fn test_univariate_view_lists_columns() {
    let dataset = common::used_cars_dataset();
    let state = PageState::new(Page::Univariate);
    let PageView::Univariate(view) = build_view(&dataset, &state, None).unwrap() else {
        panic!("expected univariate view");
    };
    assert_eq!(view.numeric_columns, vec!["id", "price", "year", "odometer"]);
    assert_eq!(view.categorical_columns, vec!["manufacturer", "fuel", "state"]);

    let histogram = view.histogram.unwrap();
    assert_eq!(histogram.column, "id");
    let counted: f64 = histogram.bins.iter().map(|b| b.count).sum();
    assert_eq!(counted as usize, common::ROWS);

    let categories = view.categories.unwrap();
    assert_eq!(categories.column, "manufacturer");
    assert_eq!(categories.counts.len(), 5);
}

#[test]
fn test_univariate_top_n_limits_categories() {
    let dataset = common::used_cars_dataset();
    let mut u = UnivariateState {
        tab: UnivariateTab::Categorical,
        categorical_index: 2,
        chart: CategoricalChart::Pie,
        ..UnivariateState::default()
    };
    for delta in [-10, 2, 4, 30] {
        u.top_n.step(delta);
        let PageView::Univariate(view) =
            build_view(&dataset, &PageState::Univariate(u.clone()), None).unwrap()
        else {
            panic!("expected univariate view");
        };
        let categories = view.categories.unwrap();
        assert_eq!(categories.column, "state");
        assert_eq!(categories.counts.len(), u.top_n.value().min(common::STATES.len()));
        let shares: f64 = categories.slices().iter().map(|s| s.fraction).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_multivariate_selection_is_subset_of_top_states() {
    let dataset = common::used_cars_dataset();
    let mut m = MultivariateState::default();
    let state = PageState::Multivariate(m.clone());
    let view = multivariate(build_view(&dataset, &state, None).unwrap());
    assert_eq!(view.top_states.len(), 10);
    assert_eq!(view.selected, view.universe());
    assert_eq!(view.filtered_rows, 200);

    let universe = view.universe();
    m.toggle(&universe[0], &universe);
    m.toggle("zz", &universe);
    let state = PageState::Multivariate(m.clone());
    let view = multivariate(build_view(&dataset, &state, None).unwrap());
    assert_eq!(view.selected.len(), 9);
    assert!(view.selected.iter().all(|s| universe.contains(s)));
    assert_eq!(view.filtered_rows, 180);
    assert_eq!(view.box_plot.stats.len(), 9);
    assert!(view.grouped.groups.iter().all(|g| view.selected.contains(g)));
}

#[test]
fn test_top_n_change_resets_selection() {
    let mut m = MultivariateState::default();
    let universe: Vec<String> = common::STATES.iter().map(|s| s.to_string()).collect();
    m.clear();
    assert!(m.effective_selection(&universe).is_empty());
    assert!(m.step_top_n(1));
    assert_eq!(m.effective_selection(&universe), universe);
    assert_eq!(m.top_n.value(), 11);

    // Already at the lower bound: nothing changes, so the selection is kept.
    let mut at_min = MultivariateState::default();
    at_min.step_top_n(-10);
    at_min.clear();
    assert!(!at_min.step_top_n(-1));
    assert!(at_min.effective_selection(&universe).is_empty());
}

#[test]
fn test_empty_selection_gives_empty_charts() {
    let dataset = common::used_cars_dataset();
    let mut m = MultivariateState::default();
    m.clear();
    let view = multivariate(build_view(&dataset, &PageState::Multivariate(m), None).unwrap());
    assert_eq!(view.top_states.len(), 10);
    assert!(view.selected.is_empty());
    assert_eq!(view.filtered_rows, 0);
    assert!(view.box_plot.stats.is_empty());
    assert!(view.grouped.is_empty());
}

#[test]
fn test_page_switch_does_not_leak_selections() {
    let mut state = PageState::new(Page::Multivariate);
    if let PageState::Multivariate(m) = &mut state {
        m.clear();
        m.step_top_n(5);
    }
    state.switch_to(Page::Univariate);
    if let PageState::Univariate(u) = &mut state {
        u.categorical_index = 1;
        u.top_n.step(3);
    }
    state.switch_to(Page::Multivariate);
    assert_eq!(state, PageState::Multivariate(MultivariateState::default()));
    state.switch_to(Page::Univariate);
    assert_eq!(state, PageState::Univariate(UnivariateState::default()));
}

#[test]
fn test_missing_state_column_is_an_error() {
    let df = df!("price" => [1i64, 2, 3]).unwrap();
    let dataset = Dataset::from_frame(df);
    assert!(build_view(&dataset, &PageState::new(Page::Multivariate), None).is_err());
}
