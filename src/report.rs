//! Page dispatch and per-page widget state.
//!
//! A [`PageState`] only ever holds the active page's selections; switching pages
//! replaces it with the new page's defaults. [`build_view`] turns the dataset and
//! those selections into a [`PageView`] on every rerun.

use crate::aggregate::{
    box_stats_by_group, filter_by_groups, mean_by_two_groups, top_groups_by_mean,
    top_n_value_counts, GroupMean,
};
use crate::chart_data::{histogram_data, BoxPlotData, CategoryChart, GroupedBarData, HistogramData};
use crate::dataset::{Dataset, COLUMN_DESCRIPTIONS};
use color_eyre::Result;
use polars::prelude::DataFrame;

/// Rows shown in the Home page sample.
pub const HOME_SAMPLE_SIZE: usize = 50;

pub const STATE_COLUMN: &str = "state";
pub const MANUFACTURER_COLUMN: &str = "manufacturer";
pub const PRICE_COLUMN: &str = "price";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Univariate,
    Multivariate,
}

impl Page {
    pub const ALL: [Self; 3] = [Self::Home, Self::Univariate, Self::Multivariate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Univariate => "Univariate",
            Self::Multivariate => "Multivariate",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

impl From<carscope_cli::Page> for Page {
    fn from(page: carscope_cli::Page) -> Self {
        match page {
            carscope_cli::Page::Home => Self::Home,
            carscope_cli::Page::Univariate => Self::Univariate,
            carscope_cli::Page::Multivariate => Self::Multivariate,
        }
    }
}

/// Bounded integer slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN {
    value: usize,
    min: usize,
    max: usize,
}

impl TopN {
    pub fn new(value: usize, min: usize, max: usize) -> Self {
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    /// Top-N categories on the Univariate page: 1..=30, default 5.
    pub fn categories() -> Self {
        Self::new(5, 1, 30)
    }

    /// Top-N states by mean price on the Multivariate page: 5..=50, default 10.
    pub fn states() -> Self {
        Self::new(10, 5, 50)
    }

    pub fn value(&self) -> usize {
        self.value
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.min, self.max)
    }

    /// Move by `delta`, clamped to the bounds. Returns true when the value changed.
    pub fn step(&mut self, delta: i64) -> bool {
        let next = (self.value as i64 + delta).clamp(self.min as i64, self.max as i64) as usize;
        let changed = next != self.value;
        self.value = next;
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnivariateTab {
    #[default]
    Numerical,
    Categorical,
}

impl UnivariateTab {
    pub const ALL: [Self; 2] = [Self::Numerical, Self::Categorical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numerical => "Numerical",
            Self::Categorical => "Categorical",
        }
    }
}

/// How the categorical Top-N counts are drawn. "Histogram" is a bar per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoricalChart {
    #[default]
    Histogram,
    Pie,
}

impl CategoricalChart {
    pub const ALL: [Self; 2] = [Self::Histogram, Self::Pie];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Histogram => "Histogram",
            Self::Pie => "Pie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnivariateState {
    pub top_n: TopN,
    pub tab: UnivariateTab,
    pub numeric_index: usize,
    pub categorical_index: usize,
    pub chart: CategoricalChart,
}

impl Default for UnivariateState {
    fn default() -> Self {
        Self {
            top_n: TopN::categories(),
            tab: UnivariateTab::default(),
            numeric_index: 0,
            categorical_index: 0,
            chart: CategoricalChart::default(),
        }
    }
}

impl UnivariateState {
    pub fn numeric_column(&self, dataset: &Dataset) -> Option<String> {
        dataset.numeric_columns().get(self.numeric_index).cloned()
    }

    pub fn categorical_column(&self, dataset: &Dataset) -> Option<String> {
        dataset.categorical_columns().get(self.categorical_index).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultivariateState {
    pub top_n: TopN,
    /// `None` means every candidate state is selected.
    selected: Option<Vec<String>>,
    pub cursor: usize,
}

impl Default for MultivariateState {
    fn default() -> Self {
        Self {
            top_n: TopN::states(),
            selected: None,
            cursor: 0,
        }
    }
}

impl MultivariateState {
    /// Change the number of candidate states. The selection resets to all candidates.
    pub fn step_top_n(&mut self, delta: i64) -> bool {
        let changed = self.top_n.step(delta);
        if changed {
            self.selected = None;
            self.cursor = 0;
        }
        changed
    }

    /// Selected states in candidate order. Always a subset of `universe`.
    pub fn effective_selection(&self, universe: &[String]) -> Vec<String> {
        match &self.selected {
            None => universe.to_vec(),
            Some(chosen) => universe
                .iter()
                .filter(|s| chosen.contains(s))
                .cloned()
                .collect(),
        }
    }

    pub fn is_selected(&self, state: &str) -> bool {
        match &self.selected {
            None => true,
            Some(chosen) => chosen.iter().any(|s| s == state),
        }
    }

    pub fn toggle(&mut self, state: &str, universe: &[String]) {
        let mut chosen = self.effective_selection(universe);
        if let Some(pos) = chosen.iter().position(|s| s == state) {
            chosen.remove(pos);
        } else if universe.iter().any(|s| s == state) {
            chosen.push(state.to_string());
        }
        self.selected = Some(chosen);
    }

    pub fn select_all(&mut self) {
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.selected = Some(Vec::new());
    }
}

/// Widget state of the page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Home,
    Univariate(UnivariateState),
    Multivariate(MultivariateState),
}

impl PageState {
    pub fn new(page: Page) -> Self {
        match page {
            Page::Home => Self::Home,
            Page::Univariate => Self::Univariate(UnivariateState::default()),
            Page::Multivariate => Self::Multivariate(MultivariateState::default()),
        }
    }

    pub fn page(&self) -> Page {
        match self {
            Self::Home => Page::Home,
            Self::Univariate(_) => Page::Univariate,
            Self::Multivariate(_) => Page::Multivariate,
        }
    }

    /// Switch page, dropping the previous page's selections. Returns false if already there.
    pub fn switch_to(&mut self, page: Page) -> bool {
        if self.page() == page {
            return false;
        }
        *self = Self::new(page);
        true
    }
}

#[derive(Debug, Clone)]
pub struct HomeView {
    pub sample: DataFrame,
    pub descriptions: &'static [(&'static str, &'static str)],
    pub total_rows: usize,
}

#[derive(Debug, Clone)]
pub struct UnivariateView {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub histogram: Option<HistogramData>,
    pub categories: Option<CategoryChart>,
}

#[derive(Debug, Clone)]
pub struct MultivariateView {
    /// Candidate universe for the state multi-select, highest mean price first.
    pub top_states: Vec<GroupMean>,
    pub selected: Vec<String>,
    pub filtered_rows: usize,
    pub box_plot: BoxPlotData,
    pub grouped: GroupedBarData,
}

impl MultivariateView {
    pub fn universe(&self) -> Vec<String> {
        self.top_states.iter().map(|g| g.group.clone()).collect()
    }
}

/// Everything the main panel needs for one render of the active page.
#[derive(Debug, Clone)]
pub enum PageView {
    Home(HomeView),
    Univariate(UnivariateView),
    Multivariate(MultivariateView),
}

/// Build the active page's view from scratch. `seed` only affects the Home sample.
pub fn build_view(dataset: &Dataset, state: &PageState, seed: Option<u64>) -> Result<PageView> {
    match state {
        PageState::Home => Ok(PageView::Home(HomeView {
            sample: dataset.sample(HOME_SAMPLE_SIZE, seed)?,
            descriptions: &COLUMN_DESCRIPTIONS,
            total_rows: dataset.height(),
        })),
        PageState::Univariate(s) => build_univariate(dataset, s).map(PageView::Univariate),
        PageState::Multivariate(s) => build_multivariate(dataset, s).map(PageView::Multivariate),
    }
}

fn build_univariate(dataset: &Dataset, state: &UnivariateState) -> Result<UnivariateView> {
    let numeric_columns = dataset.numeric_columns();
    let categorical_columns = dataset.categorical_columns();
    let df = dataset.frame();

    let histogram = match numeric_columns.get(state.numeric_index) {
        Some(column) => Some(histogram_data(df, column)?),
        None => None,
    };
    let categories = match categorical_columns.get(state.categorical_index) {
        Some(column) => {
            let n = state.top_n.value();
            Some(CategoryChart::new(column, n, top_n_value_counts(df, column, n)?))
        }
        None => None,
    };

    Ok(UnivariateView {
        numeric_columns,
        categorical_columns,
        histogram,
        categories,
    })
}

fn build_multivariate(dataset: &Dataset, state: &MultivariateState) -> Result<MultivariateView> {
    let df = dataset.frame();
    let top_states = top_groups_by_mean(df, STATE_COLUMN, PRICE_COLUMN, state.top_n.value())?;
    let universe: Vec<String> = top_states.iter().map(|g| g.group.clone()).collect();
    let selected = state.effective_selection(&universe);

    let filtered = filter_by_groups(df, STATE_COLUMN, &selected)?;
    let stats = box_stats_by_group(&filtered, STATE_COLUMN, PRICE_COLUMN, &selected)?;
    let pairs = mean_by_two_groups(&filtered, STATE_COLUMN, MANUFACTURER_COLUMN, PRICE_COLUMN)?;

    Ok(MultivariateView {
        top_states,
        filtered_rows: filtered.height(),
        box_plot: BoxPlotData::new(stats),
        grouped: GroupedBarData::new(pairs, &selected),
        selected,
    })
}
