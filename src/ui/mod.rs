pub mod components;
pub mod format;
pub mod layout;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::app::{App, AppScreen, Notice};
use components::controls::ControlsPanel;
use components::help::HelpOverlay;
use components::prediction_panel::{PredictionPanel, advisory_message};
use components::scatter_chart::ScatterChart;
use components::trend_chart::TrendChart;
use layout::{DashboardLayout, centered_rect, pack_hint_lines};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = DashboardLayout::new(area);
    let granularity = app.dataset().granularity();

    render_header(frame, app, layout.header);

    frame.render_widget(
        ControlsPanel::new(&app.selection, app.focus, granularity, &app.theme)
            .compact(!layout.tier.show_sidebar()),
        layout.controls,
    );
    frame.render_widget(
        PredictionPanel::new(&app.report, granularity, &app.theme),
        layout.panel,
    );

    match app.report.advisory() {
        None => {
            frame.render_widget(ScatterChart::new(&app.report, &app.theme), layout.scatter);
            if let Some(trend) = layout.trend {
                frame.render_widget(TrendChart::new(&app.report.series, &app.theme), trend);
            }
        }
        Some(advisory) => {
            let charts = match layout.trend {
                Some(trend) => layout.scatter.union(trend),
                None => layout.scatter,
            };
            let block = Block::bordered()
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            let inner = block.inner(charts);
            frame.render_widget(block, charts);
            frame.render_widget(
                Paragraph::new(vec![
                    Line::default(),
                    Line::from(Span::styled(
                        advisory_message(advisory),
                        Style::default().fg(colors.warning()),
                    )),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
                inner,
            );
        }
    }

    render_footer(frame, app, layout.footer);

    if app.screen == AppScreen::Help {
        let popup = centered_rect(50, 60, area);
        frame.render_widget(HelpOverlay::new(&app.theme), popup);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let mut spans = vec![
        Span::styled(
            format!(" {} ", t!("titles.app")),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", app.source.describe()),
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ];
    match &app.notice {
        Some(Notice::Reloaded { observations }) => spans.push(Span::styled(
            format!(" {} ", t!("notice.reloaded", count = observations)),
            Style::default().fg(colors.success()).bg(colors.header_bg()),
        )),
        Some(Notice::ReloadFailed { error }) => spans.push(Span::styled(
            format!(" {} ", t!("notice.reload_failed", error = error)),
            Style::default().fg(colors.error()).bg(colors.header_bg()),
        )),
        None => {}
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(colors.header_bg()))
        .render(area, frame.buffer_mut());
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let hints = [
        t!("footer.select").to_string(),
        t!("footer.adjust").to_string(),
        t!("footer.degree").to_string(),
        t!("footer.weighting").to_string(),
        t!("footer.reload").to_string(),
        t!("footer.help").to_string(),
        t!("footer.quit").to_string(),
    ];
    let hints: Vec<&str> = hints.iter().map(String::as_str).collect();
    let line = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    Paragraph::new(Line::from(Span::styled(
        line,
        Style::default().fg(colors.accent()),
    )))
    .render(area, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::Config;
    use crate::data::observation::{Dataset, Granularity, Observation, Period};

    fn app(months: u32) -> App {
        let obs = (1..=months)
            .map(|m| {
                let rate = 0.5 + m as f64 * 0.1;
                Observation::new("Seoul", Period::month(2023, m).unwrap(), rate, 1000.0 - 80.0 * rate)
            })
            .collect();
        App::with_dataset(Config::default(), Dataset::new(obs, Granularity::Monthly))
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_wide_and_narrow() {
        let app = app(12);
        assert!(app.report.analysis().is_some());
        for (w, h) in [(160, 50), (80, 30), (50, 24)] {
            let text = draw(&app, w, h);
            assert!(text.contains("Seoul"), "{w}x{h}");
        }
    }

    #[test]
    fn test_render_advisory_instead_of_charts() {
        // four months minus a lag of three leaves one observation
        let app = app(4);
        assert!(app.report.advisory().is_some());
        let text = draw(&app, 160, 50);
        let advisory = advisory_message(app.report.advisory().unwrap());
        assert!(text.contains(&advisory));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = app(12);
        app.toggle_help();
        let text = draw(&app, 120, 40);
        assert!(text.contains(&t!("help.reload").to_string()));
    }
}
