use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::ui::theme::Theme;

/// Key binding overlay.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn bindings() -> Vec<(&'static str, String)> {
        vec![
            ("↑↓ / k j", t!("help.select").to_string()),
            ("←→ / h l", t!("help.adjust").to_string()),
            ("[ ]", t!("help.coarse").to_string()),
            ("d", t!("help.degree").to_string()),
            ("w", t!("help.weighting").to_string()),
            ("r", t!("help.reload").to_string()),
            ("?", t!("help.toggle").to_string()),
            ("q / Esc", t!("help.quit").to_string()),
        ]
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(format!(" {} ", t!("titles.help")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![Line::default()];
        for (keys, action) in Self::bindings() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {keys:<10}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(action, Style::default().fg(colors.fg())),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("  {}", t!("help.about")),
            Style::default().fg(colors.text_muted()),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
