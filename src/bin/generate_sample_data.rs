use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Approximate base rate (%) at the start of each year.
const RATE_ANCHORS: &[(i32, f64)] = &[
    (2012, 3.25),
    (2013, 2.75),
    (2014, 2.50),
    (2015, 2.00),
    (2016, 1.50),
    (2017, 1.25),
    (2018, 1.50),
    (2019, 1.75),
    (2020, 1.25),
    (2021, 0.50),
    (2022, 1.00),
    (2023, 3.25),
    (2024, 3.50),
];

/// Region name and price level (million KRW) at a 2% rate.
const REGIONS: &[(&str, f64)] = &[
    ("서울", 1050.0),
    ("경기", 560.0),
    ("부산", 430.0),
    ("대구", 380.0),
    ("광주", 300.0),
];

/// Lag (months) between a rate move and its effect on prices.
const PRICE_LAG: usize = 3;

#[derive(Parser)]
#[command(name = "generate_sample_data", about = "Write synthetic rate/price CSVs")]
struct Cli {
    #[arg(long, default_value = "data", help = "Output directory")]
    out: PathBuf,

    #[arg(long, default_value_t = 7, help = "RNG seed")]
    seed: u64,

    #[arg(long, default_value_t = 0.02, help = "Relative price noise")]
    noise: f64,
}

/// Monthly rate path: piecewise linear between the yearly anchors, on a 0.25 grid.
fn monthly_rates() -> Vec<(i32, u32, f64)> {
    let mut out = Vec::new();
    for pair in RATE_ANCHORS.windows(2) {
        let ((year, from), (_, to)) = (pair[0], pair[1]);
        for month in 1..=12u32 {
            let t = (month - 1) as f64 / 12.0;
            let rate = ((from + (to - from) * t) * 4.0).round() / 4.0;
            out.push((year, month, rate));
        }
    }
    out
}

fn price_for(level: f64, lagged_rate: f64, trend: f64) -> f64 {
    // convex in the rate: cuts help prices more at low levels
    level * (1.0 + trend) * (1.0 - 0.09 * (lagged_rate - 2.0) + 0.012 * (lagged_rate - 2.0).powi(2))
}

fn write_monthly(path: &Path, rng: &mut SmallRng, noise: f64) -> Result<usize> {
    let rates = monthly_rates();
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["지역", "날짜", "기준금리", "평균가격"])?;

    let mut rows = 0;
    for &(region, level) in REGIONS {
        for (i, &(year, month, rate)) in rates.iter().enumerate() {
            let lagged = rates[i.saturating_sub(PRICE_LAG)].2;
            let trend = i as f64 * 0.002;
            let jitter = 1.0 + rng.gen_range(-noise..=noise);
            let price = price_for(level, lagged, trend) * jitter;
            writer.write_record([
                region.to_string(),
                format!("{year}-{month:02}"),
                format!("{rate:.2}"),
                format!("{price:.1}"),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn write_wide(dir: &Path, rng: &mut SmallRng, noise: f64) -> Result<()> {
    let years: Vec<i32> = RATE_ANCHORS.iter().map(|(y, _)| *y).collect();

    let prices_path = dir.join("yearly_prices.csv");
    let mut prices = csv::Writer::from_path(&prices_path)
        .with_context(|| format!("creating {}", prices_path.display()))?;
    let mut header = vec!["지역".to_string()];
    header.extend(years.iter().map(|y| format!("{y}년")));
    prices.write_record(&header)?;
    for &(region, level) in REGIONS {
        let mut row = vec![region.to_string()];
        for i in 0..years.len() {
            let lagged = RATE_ANCHORS[i.saturating_sub(1)].1;
            let jitter = 1.0 + rng.gen_range(-noise..=noise);
            row.push(format!("{:.0}", price_for(level, lagged, i as f64 * 0.024) * jitter));
        }
        prices.write_record(&row)?;
    }
    prices.flush()?;

    let rates_path = dir.join("indicators.csv");
    let mut rates = csv::Writer::from_path(&rates_path)
        .with_context(|| format!("creating {}", rates_path.display()))?;
    let mut header = vec!["항목".to_string()];
    header.extend(years.iter().map(|y| y.to_string()));
    rates.write_record(&header)?;
    let mut cpi = vec!["소비자물가 상승률(%)".to_string()];
    cpi.extend(years.iter().map(|_| format!("{:.1}", rng.gen_range(0.5..4.0))));
    rates.write_record(&cpi)?;
    let mut base = vec!["한국은행 기준금리(%)".to_string()];
    base.extend(RATE_ANCHORS.iter().map(|(_, r)| format!("{r:.2}")));
    rates.write_record(&base)?;
    rates.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;

    let mut rng = SmallRng::seed_from_u64(cli.seed);
    let rows = write_monthly(&cli.out.join("monthly_sample.csv"), &mut rng, cli.noise)?;
    write_wide(&cli.out, &mut rng, cli.noise)?;

    println!(
        "wrote {rows} monthly rows and yearly tables for {} regions to {}",
        REGIONS.len(),
        cli.out.display()
    );
    Ok(())
}
