use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::data::observation::Granularity;
use crate::engine::{Correlation, FeatureDegree, Weighting};
use crate::session::report::{Advisory, Report};
use crate::ui::format;
use crate::ui::theme::Theme;

/// Localized explanation of why no prediction is shown.
pub fn advisory_message(advisory: &Advisory) -> String {
    match advisory {
        Advisory::EmptyDataset => t!("advisory.empty_dataset").to_string(),
        Advisory::InsufficientData {
            required,
            available,
        } => t!(
            "advisory.insufficient_data",
            required = required,
            available = available
        )
        .to_string(),
        Advisory::InvalidWeights => t!("advisory.invalid_weights").to_string(),
        Advisory::MismatchedColumns { expected, got } => t!(
            "advisory.mismatched_columns",
            expected = expected,
            got = got
        )
        .to_string(),
    }
}

pub struct PredictionPanel<'a> {
    report: &'a Report,
    granularity: Granularity,
    theme: &'a Theme,
}

impl<'a> PredictionPanel<'a> {
    pub fn new(report: &'a Report, granularity: Granularity, theme: &'a Theme) -> Self {
        Self {
            report,
            granularity,
            theme,
        }
    }

    fn range_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let series = &self.report.series;
        let (Some(first), Some(last)) = (series.first_period(), series.last_period()) else {
            return Line::default();
        };
        let unit = match self.granularity {
            Granularity::Monthly => t!("panel.months", n = series.len()),
            Granularity::Yearly => t!("panel.years", n = series.len()),
        };
        Line::from(Span::styled(
            format!(
                "  {} {} ~ {} ({unit})",
                t!("panel.range"),
                first.label(),
                last.label()
            ),
            Style::default().fg(colors.text_muted()),
        ))
    }
}

impl Widget for PredictionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let title = t!(
            "titles.prediction",
            region = report.region,
            rate = format::rate(report.query_rate)
        );
        let block = Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = |text: String| Span::styled(format!("  {text:<14}"), Style::default().fg(colors.fg()));

        let Some(analysis) = report.analysis() else {
            let message = report.advisory().map(advisory_message).unwrap_or_default();
            let lines = vec![
                Line::from(Span::styled(
                    format!("  {}", t!("panel.no_prediction")),
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {message}"),
                    Style::default().fg(colors.warning()),
                )),
                self.range_line(),
            ];
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(inner, buf);
            return;
        };

        let result = analysis.result;
        let corr_color = match result.correlation {
            Correlation::Coefficient(r) if r.abs() >= 0.7 => colors.success(),
            Correlation::Coefficient(_) => colors.fg(),
            Correlation::Undefined => colors.text_muted(),
        };
        let degree = match report.degree {
            FeatureDegree::Linear => t!("degree.linear"),
            FeatureDegree::Quadratic => t!("degree.quadratic"),
        };
        let weighting = match report.weighting {
            Weighting::Uniform => t!("weighting.uniform"),
            Weighting::Recency => t!("weighting.recency"),
        };
        let r_squared = analysis
            .model
            .r_squared
            .map(|r2| format!("{r2:.3}"))
            .unwrap_or_else(|| t!("panel.undefined").to_string());

        let lines = vec![
            Line::from(vec![
                label(t!("panel.predicted").to_string()),
                Span::styled(
                    format::price(result.predicted_price),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                label(t!("panel.correlation", lag = report.lag).to_string()),
                Span::styled(
                    format::correlation(result.correlation),
                    Style::default().fg(corr_color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                label(t!("panel.fit").to_string()),
                Span::styled(
                    format!("R² {r_squared}  ·  {degree}  ·  {weighting}"),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            Line::from(vec![
                label(t!("panel.observations").to_string()),
                Span::styled(
                    result.observations.to_string(),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            self.range_line(),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::observation::{Dataset, Observation, Period};
    use crate::session::selection::Selection;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect()
    }

    fn report(years: std::ops::RangeInclusive<i32>) -> Report {
        let obs = years
            .map(|y| {
                let rate = (y - 2010) as f64 * 0.5;
                Observation::new("Seoul", Period::Year(y), rate, 380.0 + 40.0 * rate)
            })
            .collect();
        let dataset = Dataset::new(obs, Granularity::Yearly);
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.set_lag(0);
        selection.degree = FeatureDegree::Linear;
        Report::build(&dataset, &selection)
    }

    #[test]
    fn test_panel_shows_prediction() {
        let report = report(2011..=2016);
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 7);
        let mut buf = Buffer::empty(area);
        PredictionPanel::new(&report, Granularity::Yearly, &theme).render(area, &mut buf);
        // 380 + 40 * 3.5
        assert!(buffer_text(&buf).contains("520"));
        assert!(buffer_text(&buf).contains("1.000"));
    }

    #[test]
    fn test_panel_shows_advisory() {
        let report = report(2011..=2012);
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 7);
        let mut buf = Buffer::empty(area);
        PredictionPanel::new(&report, Granularity::Yearly, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains(&advisory_message(&Advisory::InsufficientData {
            required: 3,
            available: 2,
        })));
    }

    #[test]
    fn test_panel_predicts_for_constant_rate() {
        let obs = (2015..=2017)
            .zip([500.0, 520.0, 540.0])
            .map(|(y, price)| Observation::new("Seoul", Period::Year(y), 1.5, price))
            .collect();
        let dataset = Dataset::new(obs, Granularity::Yearly);
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.set_lag(0);
        let report = Report::build(&dataset, &selection);

        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 7);
        let mut buf = Buffer::empty(area);
        PredictionPanel::new(&report, Granularity::Yearly, &theme).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("520"));
        assert!(text.contains(&*t!("panel.undefined")));
    }

    #[test]
    fn test_mismatched_columns_message_names_lengths() {
        let message = advisory_message(&Advisory::MismatchedColumns {
            expected: 12,
            got: 11,
        });
        assert!(message.contains("12"));
        assert!(message.contains("11"));
    }
}
