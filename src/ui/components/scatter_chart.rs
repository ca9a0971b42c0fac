use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget};
use rust_i18n::t;

use crate::session::report::Report;
use crate::ui::format;
use crate::ui::theme::Theme;

const CURVE_SAMPLES: usize = 100;

/// Lagged rate vs price scatter with the fitted curve and the query point.
pub struct ScatterChart<'a> {
    report: &'a Report,
    theme: &'a Theme,
}

impl<'a> ScatterChart<'a> {
    pub fn new(report: &'a Report, theme: &'a Theme) -> Self {
        Self { report, theme }
    }
}

/// Axis bounds covering every value, padded by 5% of the span (or ±1 when flat).
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> Option<[f64; 2]> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return None;
    }
    let pad = if hi - lo > f64::EPSILON {
        (hi - lo) * 0.05
    } else {
        1.0
    };
    Some([lo - pad, hi + pad])
}

fn axis_labels(bounds: [f64; 2], fmt: impl Fn(f64) -> String) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![fmt(bounds[0]), fmt(mid), fmt(bounds[1])]
}

impl Widget for ScatterChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let title = t!("titles.scatter", region = report.region, lag = report.lag).to_string();
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let points: Vec<(f64, f64)> = report
            .series
            .observations()
            .iter()
            .map(|o| (o.rate, o.price))
            .collect();

        if points.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(Span::styled(
                t!("charts.no_points").to_string(),
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let analysis = report.analysis();
        let curve = analysis
            .map(|a| a.curve(&report.series, CURVE_SAMPLES))
            .unwrap_or_default();
        let query: Vec<(f64, f64)> = analysis
            .map(|a| vec![(a.query_rate, a.result.predicted_price)])
            .unwrap_or_default();

        let all = || points.iter().chain(curve.iter()).chain(query.iter());
        let (Some(x_bounds), Some(y_bounds)) = (
            padded_bounds(all().map(|(x, _)| *x)),
            padded_bounds(all().map(|(_, y)| *y)),
        ) else {
            block.render(area, buf);
            return;
        };

        let mut datasets = vec![
            Dataset::default()
                .name(t!("charts.observed").to_string())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(colors.scatter()))
                .data(&points),
        ];
        if !curve.is_empty() {
            datasets.push(
                Dataset::default()
                    .name(t!("charts.fit").to_string())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(colors.fit_line()))
                    .data(&curve),
            );
        }
        if !query.is_empty() {
            datasets.push(
                Dataset::default()
                    .name(t!("charts.query").to_string())
                    .marker(symbols::Marker::Block)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(colors.query_point()))
                    .data(&query),
            );
        }

        let axis_style = Style::default().fg(colors.text_muted()).bg(colors.bg());
        let chart = Chart::new(datasets)
            .style(Style::default().fg(colors.fg()).bg(colors.bg()))
            .block(block)
            .x_axis(
                Axis::default()
                    .title(t!("charts.rate_axis", lag = report.lag).to_string())
                    .style(axis_style)
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds, format::rate)),
            )
            .y_axis(
                Axis::default()
                    .title(t!("charts.price_axis").to_string())
                    .style(axis_style)
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds, format::thousands)),
            );

        chart.render(area, buf);
    }
}
