use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: controls sidebar, panel, both charts
    Medium, // 60-99 cols: control strip under the header, panel, both charts stacked
    Narrow, // <60 cols: control strip, panel, scatter chart only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn show_trend(&self, height: u16) -> bool {
        height >= 16 && *self != LayoutTier::Narrow
    }
}

pub struct DashboardLayout {
    pub header: Rect,
    pub controls: Rect,
    pub panel: Rect,
    pub scatter: Rect,
    pub trend: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl DashboardLayout {
    pub const PANEL_HEIGHT: u16 = 7;
    const SIDEBAR_WIDTH: u16 = 34;
    const STRIP_HEIGHT: u16 = 4;

    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(area);
        let (header, body, footer) = (vertical[0], vertical[1], vertical[2]);

        let (controls, main) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(Self::SIDEBAR_WIDTH), Constraint::Min(40)])
                .split(body);
            (horizontal[0], horizontal[1])
        } else {
            let stacked = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(Self::STRIP_HEIGHT), Constraint::Min(6)])
                .split(body);
            (stacked[0], stacked[1])
        };

        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(Self::PANEL_HEIGHT), Constraint::Min(4)])
            .split(main);
        let (panel, charts) = (split[0], split[1]);

        let (scatter, trend) = if !tier.show_trend(charts.height) && charts.width < 120 {
            (charts, None)
        } else {
            let direction = if charts.width >= 120 {
                Direction::Horizontal
            } else {
                Direction::Vertical
            };
            let halves = Layout::default()
                .direction(direction)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(charts);
            (halves[0], Some(halves[1]))
        };

        Self {
            header,
            controls,
            panel,
            scatter,
            trend,
            footer,
            tier,
        }
    }
}

/// Greedily pack key hints into as few lines of `width` columns as possible.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 14;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
