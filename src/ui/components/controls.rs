use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::data::observation::{Granularity, Period};
use crate::engine::{FeatureDegree, Weighting};
use crate::session::selection::{Control, Selection};
use crate::ui::format;
use crate::ui::theme::Theme;

pub fn control_label(control: Control) -> String {
    match control {
        Control::Region => t!("controls.region"),
        Control::Start => t!("controls.start"),
        Control::End => t!("controls.end"),
        Control::Rate => t!("controls.rate"),
        Control::Lag => t!("controls.lag"),
        Control::Degree => t!("controls.degree"),
        Control::Weighting => t!("controls.weighting"),
    }
    .to_string()
}

/// Display value of one control for the current selection.
pub fn control_value(selection: &Selection, control: Control, granularity: Granularity) -> String {
    let period = |p: Option<Period>| {
        p.map(|p| p.label()).unwrap_or_else(|| "-".to_string())
    };
    match control {
        Control::Region => selection.region().unwrap_or("-").to_string(),
        Control::Start => period(selection.start()),
        Control::End => period(selection.end()),
        Control::Rate => format::rate(selection.rate()),
        Control::Lag => match granularity {
            Granularity::Monthly => t!("controls.lag_months", n = selection.lag).to_string(),
            Granularity::Yearly => t!("controls.lag_years", n = selection.lag).to_string(),
        },
        Control::Degree => match selection.degree {
            FeatureDegree::Linear => t!("degree.linear").to_string(),
            FeatureDegree::Quadratic => t!("degree.quadratic").to_string(),
        },
        Control::Weighting => match selection.weighting {
            Weighting::Uniform => t!("weighting.uniform").to_string(),
            Weighting::Recency => t!("weighting.recency").to_string(),
        },
    }
}

/// Control list. Renders as a two-row-per-control sidebar, or as a
/// wrapped single-paragraph strip when `compact` is set.
pub struct ControlsPanel<'a> {
    selection: &'a Selection,
    focus: Control,
    granularity: Granularity,
    theme: &'a Theme,
    compact: bool,
}

impl<'a> ControlsPanel<'a> {
    pub fn new(
        selection: &'a Selection,
        focus: Control,
        granularity: Granularity,
        theme: &'a Theme,
    ) -> Self {
        Self {
            selection,
            focus,
            granularity,
            theme,
            compact: false,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    fn render_sidebar(&self, inner: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines = Vec::with_capacity(Control::ALL.len() * 3);

        for control in Control::ALL {
            let selected = control == self.focus;
            let indicator = if selected { " > " } else { "   " };
            let label_style = Style::default()
                .fg(if selected { colors.accent() } else { colors.fg() })
                .add_modifier(if selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });
            let value_style = Style::default().fg(if selected {
                colors.border_focused()
            } else {
                colors.text_muted()
            });

            lines.push(Line::from(Span::styled(
                format!("{indicator}{}:", control_label(control)),
                label_style,
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "    < {} >",
                    control_value(self.selection, control, self.granularity)
                ),
                value_style,
            )));
            if inner.height as usize >= Control::ALL.len() * 3 {
                lines.push(Line::default());
            }
        }

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_strip(&self, inner: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut spans = Vec::with_capacity(Control::ALL.len() * 2);

        for control in Control::ALL {
            let selected = control == self.focus;
            let style = if selected {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            spans.push(Span::styled(
                format!(
                    " {} {} ",
                    control_label(control),
                    control_value(self.selection, control, self.granularity)
                ),
                style,
            ));
            spans.push(Span::raw(" "));
        }

        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

impl Widget for ControlsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("titles.controls")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.compact {
            self.render_strip(inner, buf);
        } else {
            self.render_sidebar(inner, buf);
        }
    }
}
