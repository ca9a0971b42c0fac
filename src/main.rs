use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ratedash::app::{App, AppScreen, COARSE_STEP};
use ratedash::config::Config;
use ratedash::data::observation::Granularity;
use ratedash::engine::{FeatureDegree, Weighting};
use ratedash::event::{AppEvent, EventHandler};
use ratedash::session::report::{Advisory, Report};
use ratedash::session::selection::Control;
use ratedash::ui;

#[derive(Parser)]
#[command(
    name = "ratedash",
    version,
    about = "Terminal dashboard relating the base interest rate to apartment prices"
)]
struct Cli {
    #[arg(long, help = "Long-format CSV (region, date or year, rate, price)")]
    data: Option<String>,

    #[arg(long, value_parser = ["monthly", "yearly"], help = "Period granularity of --data")]
    granularity: Option<String>,

    #[arg(long, requires = "rates", help = "Wide price-by-year table (merge mode)")]
    prices: Option<String>,

    #[arg(long, requires = "prices", help = "Wide indicator-by-year table (merge mode)")]
    rates: Option<String>,

    #[arg(long = "rate-pattern", help = "Indicator name to match in --rates (repeatable)")]
    rate_patterns: Vec<String>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2), help = "Polynomial degree (1 or 2)")]
    degree: Option<u8>,

    #[arg(long, value_parser = ["uniform", "recency"], help = "Observation weighting")]
    weighting: Option<String>,

    #[arg(long, help = "Drop observations before this year")]
    year_floor: Option<i32>,

    #[arg(long, help = "Rate lag in periods")]
    lag: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_parser = ["en", "ko"], help = "Interface language")]
    locale: Option<String>,

    #[arg(long, help = "Log file path")]
    log_file: Option<String>,

    #[arg(long, help = "Print a JSON report for --region/--rate and exit")]
    report: bool,

    #[arg(long, help = "Region for --report (defaults to the first region)")]
    region: Option<String>,

    #[arg(long, help = "Query rate in percent")]
    rate: Option<f64>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(granularity) = self.granularity.as_deref() {
            config.granularity = match granularity {
                "yearly" => Granularity::Yearly,
                _ => Granularity::Monthly,
            };
        }
        if self.prices.is_some() {
            config.price_table = self.prices.clone();
            config.rate_table = self.rates.clone();
        }
        if !self.rate_patterns.is_empty() {
            config.rate_patterns = self.rate_patterns.clone();
        }
        if let Some(degree) = self.degree.and_then(FeatureDegree::from_order) {
            config.degree = degree;
        }
        if let Some(weighting) = self.weighting.as_deref() {
            config.weighting = match weighting {
                "recency" => Weighting::Recency,
                _ => Weighting::Uniform,
            };
        }
        if self.year_floor.is_some() {
            config.year_floor = self.year_floor;
        }
        if self.lag.is_some() {
            config.default_lag = self.lag;
        }
        if let Some(rate) = self.rate {
            config.default_rate = rate;
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    cli.apply(&mut config);

    init_logging(&config.log_path(), cli.report);
    if let Some(err) = config_error {
        tracing::warn!(path = %Config::config_path().display(), "{err:#}; using defaults");
    }
    config.normalize();
    rust_i18n::set_locale(&config.locale);

    let app = App::new(config)?;

    if cli.report {
        return run_report(app, cli.region.as_deref());
    }

    run_tui(app)?;
    Ok(ExitCode::SUCCESS)
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// The terminal belongs to the UI, so log records go to a file. Without a
/// usable file they go to stderr in headless mode and are dropped otherwise.
fn init_logging(path: &Path, headless: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ratedash=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match open_log_file(path) {
        Ok(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init(),
        Err(err) => {
            if headless {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(io::stderr)
                            .with_ansi(false),
                    )
                    .init();
            } else {
                registry
                    .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
                    .init();
            }
            tracing::warn!("log file unavailable: {err:#}");
        }
    }
}

fn run_report(mut app: App, region: Option<&str>) -> Result<ExitCode> {
    if let Some(region) = region {
        if !app.selection.select_region(region) {
            bail!(
                "unknown region {region:?}; available: {}",
                app.selection.regions().join(", ")
            );
        }
    }
    let report = Report::build(app.dataset(), &app.selection);
    println!("{}", serde_json::to_string_pretty(&report.summary())?);

    match report.advisory() {
        None => Ok(ExitCode::SUCCESS),
        Some(advisory) => {
            eprintln!("{}", ui::components::prediction_panel::advisory_message(advisory));
            Ok(match advisory {
                Advisory::InsufficientData { .. } | Advisory::EmptyDataset => ExitCode::from(2),
                Advisory::InvalidWeights | Advisory::MismatchedColumns { .. } => ExitCode::from(3),
            })
        }
    }
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.screen == AppScreen::Help {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => app.toggle_help(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.focus_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.focus_next(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust(-1),
        KeyCode::Right | KeyCode::Char('l') => app.adjust(1),
        KeyCode::Char('[') => app.adjust(-COARSE_STEP),
        KeyCode::Char(']') => app.adjust(COARSE_STEP),
        KeyCode::Char('d') => app.adjust_control(Control::Degree, 1),
        KeyCode::Char('w') => app.adjust_control(Control::Weighting, 1),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}
