//! Chart rendering for the Univariate and Multivariate pages.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, GraphType,
        Paragraph, Widget, Wrap,
    },
};

use crate::chart_data::{
    format_axis_label, format_count, point_on_circle, BoxPlotData, CategoryChart, GroupedBarData,
    HistogramData,
};
use crate::render::context::RenderContext;
use crate::report::{
    CategoricalChart, MultivariateView, UnivariateState, UnivariateTab, UnivariateView,
};

const PIE_RADIUS: f64 = 1.0;
const LEGEND_WIDTH: u16 = 30;

fn placeholder(area: Rect, buf: &mut Buffer, ctx: &RenderContext, text: &str) {
    Paragraph::new(text)
        .style(Style::default().fg(ctx.text_secondary))
        .centered()
        .render(area, buf);
}

fn chart_block<'a>(title: impl Into<Line<'a>>, ctx: &RenderContext) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ctx.table_border))
        .title(title)
        .title_style(Style::default().fg(ctx.text_primary).add_modifier(Modifier::BOLD))
}

/// Three evenly spaced tick labels between `min` and `max`.
fn axis_labels(min: f64, max: f64, ctx: &RenderContext) -> Vec<Span<'static>> {
    let style = Style::default().fg(ctx.text_primary);
    vec![
        Span::styled(format_axis_label(min), style),
        Span::styled(format_axis_label((min + max) / 2.0), style),
        Span::styled(format_axis_label(max), style),
    ]
}

pub fn render_histogram(
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    data: Option<&HistogramData>,
) {
    let Some(data) = data else {
        placeholder(area, buf, ctx, "Select a numeric column for histogram");
        return;
    };
    if data.bins.is_empty() {
        placeholder(area, buf, ctx, "No data for histogram");
        return;
    }

    let points: Vec<(f64, f64)> = data.bins.iter().map(|b| (b.center, b.count)).collect();
    let y_max = if data.max_count > 0.0 { data.max_count } else { 1.0 };

    let x_axis = Axis::default()
        .title(data.column.as_str())
        .bounds([data.x_min, data.x_max])
        .style(Style::default().fg(ctx.text_primary))
        .labels(axis_labels(data.x_min, data.x_max, ctx));
    let y_axis = Axis::default()
        .title("Count")
        .bounds([0.0, y_max])
        .style(Style::default().fg(ctx.text_primary))
        .labels(axis_labels(0.0, y_max, ctx));

    let dataset = Dataset::default()
        .name("")
        .marker(symbols::Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(ctx.series_color(0)))
        .data(&points);

    Chart::new(vec![dataset])
        .x_axis(x_axis)
        .y_axis(y_axis)
        .render(area, buf);
}

/// One horizontal bar per category, highest count on top.
pub fn render_category_bars(
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    chart: &CategoryChart,
) {
    if chart.counts.is_empty() {
        placeholder(area, buf, ctx, "No values to count");
        return;
    }
    let color = ctx.series_color(0);
    let bars: Vec<Bar> = chart
        .counts
        .iter()
        .map(|c| {
            Bar::default()
                .label(Line::from(c.value.clone()))
                .value(c.count)
                .text_value(format_count(c.count))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(ctx.text_primary).add_modifier(Modifier::REVERSED))
        })
        .collect();

    BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .label_style(Style::default().fg(ctx.text_primary))
        .data(BarGroup::default().bars(&bars))
        .max(chart.max_count().max(1))
        .render(area, buf);
}

/// Pie with a legend on the right. Wedges start at 12 o'clock and run clockwise.
pub fn render_pie(area: Rect, buf: &mut Buffer, ctx: &RenderContext, chart: &CategoryChart) {
    let slices = chart.slices();
    if slices.is_empty() {
        placeholder(area, buf, ctx, "No values to count");
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(LEGEND_WIDTH)])
        .split(area);
    let pie_area = cols[0];
    if pie_area.width == 0 || pie_area.height == 0 {
        return;
    }

    // Terminal cells are about twice as tall as wide.
    let aspect = pie_area.width as f64 / (pie_area.height as f64 * 2.0);
    let extent = PIE_RADIUS * 1.1;
    let colors: Vec<_> = (0..slices.len()).map(|i| ctx.series_color(i)).collect();
    Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([-extent * aspect.max(1.0), extent * aspect.max(1.0)])
        .y_bounds([-extent / aspect.min(1.0), extent / aspect.min(1.0)])
        .paint(|painter| {
            for (slice, color) in slices.iter().zip(&colors) {
                let steps = ((slice.fraction * 720.0).ceil() as usize).max(2);
                for k in 0..=steps {
                    let turn = slice.start + (slice.end - slice.start) * k as f64 / steps as f64;
                    let (x, y) = point_on_circle(turn, PIE_RADIUS);
                    painter.draw(&CanvasLine::new(0.0, 0.0, x, y, *color));
                }
            }
        })
        .render(pie_area, buf);

    let lines: Vec<Line> = slices
        .iter()
        .zip(&colors)
        .map(|(slice, color)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(*color)),
                Span::styled(
                    format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
                    Style::default().fg(ctx.text_primary),
                ),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(cols[1], buf);
}

/// Box per state from Q1 to Q3 with the median, whiskers to the 1.5 IQR fences.
pub fn render_box_plot(area: Rect, buf: &mut Buffer, ctx: &RenderContext, data: &BoxPlotData) {
    if data.stats.is_empty() {
        placeholder(area, buf, ctx, "No data for box plot");
        return;
    }

    let box_half = 0.3;
    let cap_half = 0.2;
    let mut segments: Vec<(Vec<(f64, f64)>, Style)> = Vec::new();
    for (i, stat) in data.stats.iter().enumerate() {
        let x = i as f64;
        let style = Style::default().fg(ctx.series_color(i));
        segments.push((
            vec![
                (x - box_half, stat.q1),
                (x + box_half, stat.q1),
                (x + box_half, stat.q3),
                (x - box_half, stat.q3),
                (x - box_half, stat.q1),
            ],
            style,
        ));
        segments.push((vec![(x - box_half, stat.median), (x + box_half, stat.median)], style));
        segments.push((vec![(x, stat.lower_whisker), (x, stat.q1)], style));
        segments.push((vec![(x, stat.q3), (x, stat.upper_whisker)], style));
        segments.push((
            vec![(x - cap_half, stat.lower_whisker), (x + cap_half, stat.lower_whisker)],
            style,
        ));
        segments.push((
            vec![(x - cap_half, stat.upper_whisker), (x + cap_half, stat.upper_whisker)],
            style,
        ));
    }

    let datasets: Vec<Dataset> = segments
        .iter()
        .map(|(points, style)| {
            Dataset::default()
                .name("")
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Braille)
                .style(*style)
                .data(points)
        })
        .collect();

    let label_style = Style::default().fg(ctx.text_primary);
    let x_labels: Vec<Span> = data
        .stats
        .iter()
        .map(|s| Span::styled(s.group.as_str(), label_style))
        .collect();
    let x_axis = Axis::default()
        .title(data.x_label.as_str())
        .bounds([-0.5, (data.stats.len() as f64 - 1.0).max(0.0) + 0.5])
        .style(label_style)
        .labels(x_labels);
    let y_axis = Axis::default()
        .title(data.y_label.as_str())
        .bounds([data.y_min, data.y_max])
        .style(label_style)
        .labels(axis_labels(data.y_min, data.y_max, ctx));

    Chart::new(datasets)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .render(area, buf);
}

/// Clustered bars per state, one color per manufacturer, legend underneath.
pub fn render_grouped_bars(
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    data: &GroupedBarData,
) {
    if data.is_empty() {
        placeholder(area, buf, ctx, "No data for grouped bar chart");
        return;
    }

    let legend = legend_line(data, ctx);
    let legend_height = legend_rows(&legend, area.width).min(area.height / 3).max(1);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(legend_height)])
        .split(area);

    let groups: Vec<Vec<Bar>> = data
        .groups
        .iter()
        .map(|group| {
            data.bars_for(group)
                .map(|pair| {
                    let slot = data.series_index(&pair.inner).unwrap_or(0);
                    Bar::default()
                        .value(pair.mean.round().max(0.0) as u64)
                        .text_value(String::new())
                        .style(Style::default().fg(ctx.series_color(slot)))
                })
                .collect()
        })
        .collect();

    let mut chart = BarChart::default()
        .bar_width(1)
        .bar_gap(0)
        .group_gap(2)
        .label_style(Style::default().fg(ctx.text_primary))
        .max(data.max_mean().round().max(1.0) as u64);
    for (group, bars) in data.groups.iter().zip(&groups) {
        chart = chart.data(BarGroup::default().label(Line::from(group.clone())).bars(bars));
    }
    chart.render(rows[0], buf);

    Paragraph::new(legend)
        .wrap(Wrap { trim: true })
        .render(rows[1], buf);
}

fn legend_line(data: &GroupedBarData, ctx: &RenderContext) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{}: ", data.legend_title),
        Style::default().fg(ctx.text_secondary),
    )];
    for (i, name) in data.series.iter().enumerate() {
        spans.push(Span::styled("■ ", Style::default().fg(ctx.series_color(i))));
        spans.push(Span::styled(
            format!("{}  ", name),
            Style::default().fg(ctx.text_primary),
        ));
    }
    Line::from(spans)
}

fn legend_rows(line: &Line, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    (line.width() as u16).div_ceil(width).max(1)
}

pub fn render_univariate_view(
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    view: &UnivariateView,
    state: &UnivariateState,
) {
    match state.tab {
        UnivariateTab::Numerical => {
            let title = match &view.histogram {
                Some(h) => format!(
                    "Distribution of {} ({} values)",
                    h.column,
                    format_count(h.total as u64)
                ),
                None => "Distribution".to_string(),
            };
            let block = chart_block(title, ctx);
            let inner = block.inner(area);
            block.render(area, buf);
            render_histogram(inner, buf, ctx, view.histogram.as_ref());
        }
        UnivariateTab::Categorical => {
            let Some(chart) = &view.categories else {
                let block = chart_block("Categories", ctx);
                let inner = block.inner(area);
                block.render(area, buf);
                placeholder(inner, buf, ctx, "No categorical columns");
                return;
            };
            let block = chart_block(chart.title.clone(), ctx);
            let inner = block.inner(area);
            block.render(area, buf);
            match state.chart {
                CategoricalChart::Histogram => render_category_bars(inner, buf, ctx, chart),
                CategoricalChart::Pie => render_pie(inner, buf, ctx, chart),
            }
        }
    }
}

pub fn render_multivariate_view(
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    view: &MultivariateView,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(format!(
        "States selected: {}/{}   Filtered rows: {}",
        view.selected.len(),
        view.top_states.len(),
        format_count(view.filtered_rows as u64)
    ))
    .style(Style::default().fg(ctx.text_secondary))
    .render(rows[0], buf);

    let block = chart_block(view.box_plot.title.clone(), ctx);
    let inner = block.inner(rows[1]);
    block.render(rows[1], buf);
    render_box_plot(inner, buf, ctx, &view.box_plot);

    let block = chart_block(view.grouped.title.clone(), ctx);
    let inner = block.inner(rows[2]);
    block.render(rows[2], buf);
    render_grouped_bars(inner, buf, ctx, &view.grouped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryCount;
    use ratatui::style::Color;

    fn ctx() -> RenderContext {
        RenderContext {
            primary: Color::Cyan,
            secondary: Color::Yellow,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            dimmed: Color::DarkGray,
            background: Color::Reset,
            controls_bg: Color::Reset,
            keybind_hints: Color::Cyan,
            keybind_labels: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            table_header: Color::White,
            table_border: Color::DarkGray,
            palette: vec![Color::Cyan, Color::Magenta],
        }
    }

    fn text(buf: &Buffer, area: Rect) -> String {
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_box_plot_shows_placeholder() {
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        render_box_plot(area, &mut buf, &ctx(), &BoxPlotData::new(Vec::new()));
        assert!(text(&buf, area).contains("No data for box plot"));
    }

    #[test]
    fn test_pie_legend_lists_every_slice() {
        let chart = CategoryChart::new(
            "fuel",
            2,
            vec![
                CategoryCount {
                    value: "gas".into(),
                    count: 3,
                },
                CategoryCount {
                    value: "diesel".into(),
                    count: 1,
                },
            ],
        );
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        render_pie(area, &mut buf, &ctx(), &chart);
        let out = text(&buf, area);
        assert!(out.contains("gas 75.0%"));
        assert!(out.contains("diesel 25.0%"));
    }

    #[test]
    fn test_category_bars_show_labels() {
        let chart = CategoryChart::new(
            "fuel",
            1,
            vec![CategoryCount {
                value: "gas".into(),
                count: 3,
            }],
        );
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        render_category_bars(area, &mut buf, &ctx(), &chart);
        assert!(text(&buf, area).contains("gas"));
    }
}
