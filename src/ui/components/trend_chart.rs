use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};
use rust_i18n::t;

use crate::data::observation::Series;
use crate::ui::components::scatter_chart::padded_bounds;
use crate::ui::format;
use crate::ui::theme::Theme;

const GUTTER_WIDTH: u16 = 7;

/// Price and (lagged) rate over time. The rate shares the price axis after a
/// linear rescale; its own scale is drawn in a gutter on the right.
pub struct TrendChart<'a> {
    series: &'a Series,
    theme: &'a Theme,
}

impl<'a> TrendChart<'a> {
    pub fn new(series: &'a Series, theme: &'a Theme) -> Self {
        Self { series, theme }
    }
}

/// Map `value` from `from` onto `to`. A degenerate source range maps to the middle.
pub fn rescale(value: f64, from: [f64; 2], to: [f64; 2]) -> f64 {
    let span = from[1] - from[0];
    if span.abs() < f64::EPSILON {
        return (to[0] + to[1]) / 2.0;
    }
    to[0] + (value - from[0]) / span * (to[1] - to[0])
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ", t!("titles.trend")),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let observations = self.series.observations();
        if observations.len() < 2 || inner.width <= GUTTER_WIDTH + 10 || inner.height < 4 {
            return;
        }

        let prices: Vec<(f64, f64)> = observations
            .iter()
            .map(|o| (o.period.ordinal(), o.price))
            .collect();
        let (Some(y_bounds), Some(rate_bounds)) = (
            padded_bounds(prices.iter().map(|(_, y)| *y)),
            padded_bounds(observations.iter().map(|o| o.rate)),
        ) else {
            return;
        };
        let rates: Vec<(f64, f64)> = observations
            .iter()
            .map(|o| (o.period.ordinal(), rescale(o.rate, rate_bounds, y_bounds)))
            .collect();

        let x_bounds = [prices[0].0, prices[prices.len() - 1].0];
        let first = self.series.first_period().map(|p| p.label()).unwrap_or_default();
        let last = self.series.last_period().map(|p| p.label()).unwrap_or_default();

        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(GUTTER_WIDTH)])
            .split(inner);
        let (plot, gutter) = (split[0], split[1]);

        let axis_style = Style::default().fg(colors.text_muted()).bg(colors.bg());
        let chart = Chart::new(vec![
            Dataset::default()
                .name(t!("charts.price").to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.price_line()))
                .data(&prices),
            Dataset::default()
                .name(t!("charts.rate").to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.rate_line()))
                .data(&rates),
        ])
        .style(Style::default().fg(colors.fg()).bg(colors.bg()))
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds(x_bounds)
                .labels(vec![first, last]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds(y_bounds)
                .labels(vec![
                    format::thousands(y_bounds[0]),
                    format::thousands(y_bounds[1]),
                ]),
        );
        chart.render(plot, buf);

        // Rate scale: top aligns with the plot's top row, bottom with the row above the x labels.
        let rate_style = Style::default().fg(colors.rate_line()).bg(colors.bg());
        let top = gutter.y;
        let bottom = gutter.y + gutter.height.saturating_sub(3);
        let mid = top + (bottom - top) / 2;
        for (row, value) in [
            (top, rate_bounds[1]),
            (mid, (rate_bounds[0] + rate_bounds[1]) / 2.0),
            (bottom, rate_bounds[0]),
        ] {
            buf.set_string(gutter.x + 1, row, format::rate(value), rate_style);
        }
    }
}
