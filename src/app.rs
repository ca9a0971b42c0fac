use std::rc::Rc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::cache::DatasetCache;
use crate::data::observation::Dataset;
use crate::data::source::DataSource;
use crate::session::report::Report;
use crate::session::selection::{Control, Selection};
use crate::ui::theme::Theme;

/// Steps taken by `[` and `]`.
pub const COARSE_STEP: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Dashboard,
    Help,
}

/// Outcome of the last reload, shown in the header until the next one.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Reloaded { observations: usize },
    ReloadFailed { error: String },
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: Theme,
    pub source: DataSource,
    pub selection: Selection,
    pub focus: Control,
    pub report: Report,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    cache: DatasetCache,
    dataset: Rc<Dataset>,
}

impl App {
    /// Load the configured data source. A source that cannot be read is fatal here.
    pub fn new(config: Config) -> Result<Self> {
        let source = config.data_source();
        let cache = Self::cache_for(&source, None);
        let dataset = cache
            .get()
            .with_context(|| format!("loading {}", source.describe()))?;
        Ok(Self::assemble(config, source, cache, dataset))
    }

    /// Start from an already loaded dataset; reloads still go through the configured source.
    pub fn with_dataset(config: Config, dataset: Dataset) -> Self {
        let source = config.data_source();
        let dataset = Rc::new(dataset);
        let cache = Self::cache_for(&source, Some(Rc::clone(&dataset)));
        Self::assemble(config, source, cache, dataset)
    }

    fn cache_for(source: &DataSource, preloaded: Option<Rc<Dataset>>) -> DatasetCache {
        let source = source.clone();
        let loader = move || source.load().map(|(dataset, _)| dataset);
        match preloaded {
            Some(dataset) => DatasetCache::preloaded(dataset, loader),
            None => DatasetCache::new(loader),
        }
    }

    fn assemble(config: Config, source: DataSource, cache: DatasetCache, dataset: Rc<Dataset>) -> Self {
        let theme = Theme::load_or_default(&config.theme);
        let selection = Selection::new(&dataset, &config);
        let report = Report::build(&dataset, &selection);
        Self {
            screen: AppScreen::Dashboard,
            config,
            theme,
            source,
            selection,
            focus: Control::Region,
            report,
            notice: None,
            should_quit: false,
            cache,
            dataset,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn focus_next(&mut self) {
        self.focus = Self::cycle(self.focus, 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = Self::cycle(self.focus, -1);
    }

    fn cycle(current: Control, delta: isize) -> Control {
        let len = Control::ALL.len() as isize;
        let idx = Control::ALL
            .iter()
            .position(|c| *c == current)
            .unwrap_or(0) as isize;
        Control::ALL[(idx + delta).rem_euclid(len) as usize]
    }

    /// Adjust the focused control and recompute when the selection changed.
    pub fn adjust(&mut self, delta: i32) {
        self.adjust_control(self.focus, delta);
    }

    pub fn adjust_control(&mut self, control: Control, delta: i32) {
        if self.selection.adjust(control, delta) {
            self.recompute();
        }
    }

    pub fn toggle_help(&mut self) {
        self.screen = match self.screen {
            AppScreen::Dashboard => AppScreen::Help,
            AppScreen::Help => AppScreen::Dashboard,
        };
    }

    /// Drop the cached dataset and read the source again. On failure the
    /// previous dataset stays in use.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        match self.cache.get() {
            Ok(dataset) => {
                self.selection.rebase(&dataset);
                self.notice = Some(Notice::Reloaded {
                    observations: dataset.len(),
                });
                self.dataset = dataset;
                self.recompute();
            }
            Err(err) => {
                tracing::warn!(source = %self.source.describe(), %err, "reload failed, keeping previous dataset");
                self.notice = Some(Notice::ReloadFailed {
                    error: err.to_string(),
                });
            }
        }
    }

    pub fn recompute(&mut self) {
        self.report = Report::build(&self.dataset, &self.selection);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::data::observation::{Granularity, Observation, Period};

    fn dataset() -> Dataset {
        let obs = (1..=12)
            .map(|m| {
                let rate = 1.0 + m as f64 * 0.25;
                Observation::new("서울", Period::month(2022, m).unwrap(), rate, 900.0 - 50.0 * rate)
            })
            .collect();
        Dataset::new(obs, Granularity::Monthly)
    }

    fn config_for(path: &std::path::Path) -> Config {
        Config {
            data_path: path.display().to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_adjust_recomputes_report() {
        let mut app = App::with_dataset(Config::default(), dataset());
        assert!(app.report.analysis().is_some());
        app.focus = Control::Rate;
        app.adjust(COARSE_STEP);
        assert_eq!(app.report.query_rate, 4.5);
        app.adjust_control(Control::Degree, 1);
        assert_eq!(app.report.degree, app.selection.degree);
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = App::with_dataset(Config::default(), dataset());
        app.focus_prev();
        assert_eq!(app.focus, Control::Weighting);
        app.focus_next();
        assert_eq!(app.focus, Control::Region);
    }

    #[test]
    fn test_failed_reload_keeps_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::with_dataset(config_for(&dir.path().join("missing.csv")), dataset());
        app.reload();
        assert!(matches!(app.notice, Some(Notice::ReloadFailed { .. })));
        assert_eq!(app.dataset().len(), 12);
        assert!(app.report.analysis().is_some());
    }

    #[test]
    fn test_reload_picks_up_new_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "region,date,rate,price\n부산,2023-01,3.0,500\n").unwrap();

        let mut app = App::with_dataset(config_for(&path), dataset());
        app.reload();
        assert_eq!(app.notice, Some(Notice::Reloaded { observations: 1 }));
        assert_eq!(app.selection.region(), Some("부산"));
        assert!(app.report.advisory().is_some());
    }

    #[test]
    fn test_new_fails_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(App::new(config_for(&dir.path().join("nope.csv"))).is_err());
    }
}
