//! Chart export: PNG or SVG through plotters, a JSON copy of the chart data
//! next to each image, and the Home sample as CSV.

use crate::chart_data::{
    format_axis_label, point_on_circle, BoxPlotData, CategoryChart, GroupedBarData, HistogramData,
};
use crate::config::ChartConfig;
use crate::report::{CategoricalChart, PageState, PageView, UnivariateTab};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

const PALETTE: [RGBColor; 7] = [
    CYAN,
    MAGENTA,
    GREEN,
    YELLOW,
    BLUE,
    RED,
    RGBColor(128, 255, 255),
];

/// Image format for exported charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Svg,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
        }
    }

    pub fn from_config(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(value))
            .ok_or_else(|| eyre!("Unknown export format: {}", value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ChartExportFormat,
    pub dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ExportOptions {
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        let dir = match &config.export_dir {
            Some(dir) => expand_tilde(dir),
            None => PathBuf::from("."),
        };
        Ok(Self {
            format: ChartExportFormat::from_config(&config.export_format)?,
            dir,
            width: config.export_width,
            height: config.export_height,
        })
    }
}

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// File-name friendly version of a column or title.
fn slug(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    while out.contains("__") {
        out = out.replace("__", "_");
    }
    out.trim_matches('_').to_string()
}

/// A single exportable chart.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartPlot<'a> {
    Histogram(&'a HistogramData),
    CategoryBars(&'a CategoryChart),
    CategoryPie(&'a CategoryChart),
    BoxPlot(&'a BoxPlotData),
    GroupedBars(&'a GroupedBarData),
}

impl ChartPlot<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Histogram(d) => d.bins.is_empty(),
            Self::CategoryBars(c) | Self::CategoryPie(c) => c.counts.is_empty(),
            Self::BoxPlot(d) => d.stats.is_empty(),
            Self::GroupedBars(d) => d.is_empty(),
        }
    }

    pub fn file_stem(&self) -> String {
        match self {
            Self::Histogram(d) => format!("histogram_{}", slug(&d.column)),
            Self::CategoryBars(c) => format!("top{}_{}_bar", c.top_n, slug(&c.column)),
            Self::CategoryPie(c) => format!("top{}_{}_pie", c.top_n, slug(&c.column)),
            Self::BoxPlot(_) => "price_box_plot_by_state".to_string(),
            Self::GroupedBars(_) => "mean_price_by_state_manufacturer".to_string(),
        }
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        match self {
            Self::Histogram(d) => draw_histogram(root, d),
            Self::CategoryBars(c) => draw_category_bars(root, c),
            Self::CategoryPie(c) => draw_pie(root, c),
            Self::BoxPlot(d) => draw_box_plot(root, d),
            Self::GroupedBars(d) => draw_grouped_bars(root, d),
        }
    }
}

/// Charts shown by the active page. Home has none.
pub fn page_charts<'a>(view: &'a PageView, state: &PageState) -> Vec<ChartPlot<'a>> {
    match (view, state) {
        (PageView::Univariate(v), PageState::Univariate(s)) => match s.tab {
            UnivariateTab::Numerical => v.histogram.iter().map(ChartPlot::Histogram).collect(),
            UnivariateTab::Categorical => v
                .categories
                .iter()
                .map(|c| match s.chart {
                    CategoricalChart::Histogram => ChartPlot::CategoryBars(c),
                    CategoricalChart::Pie => ChartPlot::CategoryPie(c),
                })
                .collect(),
        },
        (PageView::Multivariate(v), _) => vec![
            ChartPlot::BoxPlot(&v.box_plot),
            ChartPlot::GroupedBars(&v.grouped),
        ],
        _ => Vec::new(),
    }
}

/// Export everything the active page shows. Returns the files written.
pub fn export_view(
    view: &PageView,
    state: &PageState,
    opts: &ExportOptions,
) -> Result<Vec<PathBuf>> {
    if let PageView::Home(home) = view {
        if home.sample.height() == 0 {
            return Err(eyre!("No data to export"));
        }
        fs::create_dir_all(&opts.dir)?;
        let path = opts.dir.join("sample.csv");
        write_sample_csv(&home.sample, &path)?;
        info!(path = %path.display(), rows = home.sample.height(), "exported sample");
        return Ok(vec![path]);
    }

    let charts = page_charts(view, state);
    if charts.is_empty() || charts.iter().all(|c| c.is_empty()) {
        return Err(eyre!("No data to export"));
    }

    fs::create_dir_all(&opts.dir)
        .wrap_err_with(|| format!("Could not create {}", opts.dir.display()))?;
    let mut written = Vec::new();
    for chart in charts.iter().filter(|c| !c.is_empty()) {
        let stem = chart.file_stem();
        let json_path = opts.dir.join(format!("{}.json", stem));
        write_payload(chart, &json_path)?;
        written.push(json_path);

        let image_path = opts.dir.join(format!("{}.{}", stem, opts.format.extension()));
        write_image(chart, &image_path, opts)?;
        info!(path = %image_path.display(), "exported chart");
        written.push(image_path);
    }
    Ok(written)
}

pub fn write_sample_csv(df: &polars::prelude::DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

pub fn write_payload(chart: &ChartPlot, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, chart)?;
    Ok(())
}

pub fn write_image(chart: &ChartPlot, path: &Path, opts: &ExportOptions) -> Result<()> {
    if chart.is_empty() {
        return Err(eyre!("No data to export"));
    }
    let size = (opts.width, opts.height);
    match opts.format {
        ChartExportFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            chart.draw(&root)?;
            root.present()?;
        }
        ChartExportFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            chart.draw(&root)?;
            root.present()?;
        }
    }
    Ok(())
}

/// Label for integer positions on a categorical axis; blank between categories.
fn category_label(labels: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &HistogramData,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let y_max = data.max_count.max(1.0) * 1.05;
    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .caption(format!("Distribution of {}", data.column), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(data.x_min..data.x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(data.column.as_str())
        .y_desc("Count")
        .x_label_formatter(&|v| format_axis_label(*v))
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    let color = PALETTE[0];
    chart.draw_series(data.bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count)], color.filled())
    }))?;
    chart.draw_series(data.bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count)], BLACK.stroke_width(1))
    }))?;
    Ok(())
}

fn draw_category_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &CategoryChart,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = data.counts.iter().map(|c| c.value.clone()).collect();
    let n = labels.len();
    let y_max = data.max_count().max(1) as f64 * 1.1;
    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .caption(data.title.as_str(), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)?;

    let x_fmt = |v: &f64| category_label(&labels, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(data.column.as_str())
        .y_desc("Count")
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    let color = PALETTE[0];
    chart.draw_series(data.counts.iter().enumerate().map(|(i, c)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, c.count as f64)], color.filled())
    }))?;
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &CategoryChart) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(&data.title, ("sans-serif", 20))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = (w.min(h) as f64) * 0.35;
    let to_pixel = |turn: f64, r: f64| -> (i32, i32) {
        let (x, y) = point_on_circle(turn, r);
        ((center.0 + x) as i32, (center.1 - y) as i32)
    };

    for (i, slice) in data.slices().iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let steps = ((slice.fraction * 360.0).ceil() as usize).max(2);
        let mut points = vec![(center.0 as i32, center.1 as i32)];
        for k in 0..=steps {
            let turn = slice.start + (slice.end - slice.start) * k as f64 / steps as f64;
            points.push(to_pixel(turn, radius));
        }
        area.draw(&Polygon::new(points, color.filled()))?;

        let label = format!("{} ({:.1}%)", slice.label, slice.fraction * 100.0);
        let (lx, ly) = to_pixel(slice.mid(), radius * 1.2);
        let anchor = if point_on_circle(slice.mid(), 1.0).0 >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        let style = TextStyle::from(("sans-serif", 15).into_font())
            .color(&BLACK)
            .pos(Pos::new(anchor, VPos::Center));
        area.draw(&Text::new(label, (lx, ly), style))?;
    }
    Ok(())
}

fn draw_box_plot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &BoxPlotData,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = data.stats.iter().map(|s| s.group.clone()).collect();
    let n = labels.len();
    let pad = (data.y_max - data.y_min) * 0.05;
    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .caption(data.title.as_str(), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, (data.y_min - pad)..(data.y_max + pad))?;

    let x_fmt = |v: &f64| category_label(&labels, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    for (i, s) in data.stats.iter().enumerate() {
        let x = i as f64;
        let color = PALETTE[i % PALETTE.len()];
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            color.mix(0.4).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            BLACK.stroke_width(1),
        )))?;
        let segments = [
            vec![(x - 0.3, s.median), (x + 0.3, s.median)],
            vec![(x, s.lower_whisker), (x, s.q1)],
            vec![(x, s.q3), (x, s.upper_whisker)],
            vec![(x - 0.15, s.lower_whisker), (x + 0.15, s.lower_whisker)],
            vec![(x - 0.15, s.upper_whisker), (x + 0.15, s.upper_whisker)],
        ];
        chart.draw_series(
            segments
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;
    }
    Ok(())
}

fn draw_grouped_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &GroupedBarData,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n = data.groups.len();
    let y_max = data.max_mean().max(1.0) * 1.1;
    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .caption(data.title.as_str(), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)?;

    let x_fmt = |v: &f64| category_label(&data.groups, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    // Bar slot of each pair inside its cluster.
    let mut bars: Vec<(usize, f64, f64, f64)> = Vec::new();
    for (gi, group) in data.groups.iter().enumerate() {
        let pairs: Vec<_> = data.bars_for(group).collect();
        let width = 0.8 / pairs.len().max(1) as f64;
        for (k, pair) in pairs.iter().enumerate() {
            let x0 = gi as f64 - 0.4 + width * k as f64;
            let slot = data.series_index(&pair.inner).unwrap_or(0);
            bars.push((slot, x0, x0 + width, pair.mean));
        }
    }

    for (slot, name) in data.series.iter().enumerate() {
        let color = PALETTE[slot % PALETTE.len()];
        chart
            .draw_series(
                bars.iter()
                    .filter(|b| b.0 == slot)
                    .map(|&(_, x0, x1, mean)| {
                        Rectangle::new([(x0, 0.0), (x1, mean)], color.filled())
                    }),
            )?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryCount;
    use crate::report::{HomeView, UnivariateState, UnivariateView};
    use polars::prelude::*;

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions {
            format: ChartExportFormat::Png,
            dir: dir.to_path_buf(),
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(ChartExportFormat::from_config("png").unwrap(), ChartExportFormat::Png);
        assert_eq!(ChartExportFormat::from_config("SVG").unwrap(), ChartExportFormat::Svg);
        assert!(ChartExportFormat::from_config("eps").is_err());
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Paint Color"), "paint_color");
        assert_eq!(slug("title_status"), "title_status");
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde(Path::new("out/charts")), PathBuf::from("out/charts"));
    }

    #[test]
    fn test_empty_chart_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let view = PageView::Univariate(UnivariateView {
            numeric_columns: Vec::new(),
            categorical_columns: vec!["fuel".to_string()],
            histogram: None,
            categories: Some(CategoryChart::new("fuel", 5, Vec::new())),
        });
        let mut state = UnivariateState::default();
        state.tab = UnivariateTab::Categorical;
        let err = export_view(&view, &PageState::Univariate(state), &options(dir.path()))
            .unwrap_err();
        assert_eq!(err.to_string(), "No data to export");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_home_exports_sample_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let sample = df!("manufacturer" => &["ford", "bmw"], "price" => &[1000i64, 2000]).unwrap();
        let view = PageView::Home(HomeView {
            sample,
            descriptions: &crate::dataset::COLUMN_DESCRIPTIONS,
            total_rows: 2,
        });
        let paths = export_view(&view, &PageState::Home, &options(dir.path())).unwrap();
        assert_eq!(paths, vec![dir.path().join("sample.csv")]);
        let text = fs::read_to_string(&paths[0]).unwrap();
        assert!(text.starts_with("manufacturer,price"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_payload_is_tagged_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let chart = CategoryChart::new(
            "fuel",
            2,
            vec![CategoryCount {
                value: "gas".into(),
                count: 3,
            }],
        );
        let path = dir.path().join("fuel.json");
        write_payload(&ChartPlot::CategoryPie(&chart), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["kind"], "category_pie");
        assert_eq!(value["data"]["title"], "Top 2 Categories for fuel");
        assert_eq!(value["data"]["counts"][0]["count"], 3);
    }

    #[test]
    fn test_page_charts_follow_tab_and_chart_kind() {
        let chart = CategoryChart::new("fuel", 5, Vec::new());
        let view = PageView::Univariate(UnivariateView {
            numeric_columns: Vec::new(),
            categorical_columns: vec!["fuel".to_string()],
            histogram: None,
            categories: Some(chart),
        });
        let mut state = UnivariateState::default();
        assert!(page_charts(&view, &PageState::Univariate(state.clone())).is_empty());
        state.tab = UnivariateTab::Categorical;
        state.chart = CategoricalChart::Pie;
        let charts = page_charts(&view, &PageState::Univariate(state));
        assert!(matches!(charts[..], [ChartPlot::CategoryPie(_)]));
        assert_eq!(charts[0].file_stem(), "top5_fuel_pie");
    }
}
