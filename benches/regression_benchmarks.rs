use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ratedash::config::Config;
use ratedash::data::loader::load_long_csv;
use ratedash::data::observation::{Dataset, Granularity, Observation, Period, Series};
use ratedash::engine::lag::apply_lag;
use ratedash::engine::predictor::analyze;
use ratedash::engine::weighting::compute_weights;
use ratedash::engine::FeatureDegree;
use ratedash::session::report::Report;
use ratedash::session::selection::Selection;

const REGIONS: &[&str] = &["서울", "부산", "대구", "광주", "대전", "울산", "세종", "경기"];

fn make_observations(months: u32) -> Vec<Observation> {
    let mut out = Vec::with_capacity(REGIONS.len() * months as usize);
    for (r, region) in REGIONS.iter().enumerate() {
        for i in 0..months {
            let year = 2000 + (i / 12) as i32;
            let Some(period) = Period::month(year, i % 12 + 1) else {
                continue;
            };
            let rate = 0.5 + (i % 40) as f64 * 0.1;
            let price = 300.0 + r as f64 * 80.0 - 25.0 * rate + (i % 7) as f64;
            out.push(Observation::new(*region, period, rate, price));
        }
    }
    out
}

fn bench_fit(c: &mut Criterion) {
    let series = Series::new(
        make_observations(240)
            .into_iter()
            .filter(|o| o.region == "서울")
            .collect(),
    );
    let weights = compute_weights(&series);

    c.bench_function("analyze quadratic (240 obs)", |b| {
        b.iter(|| analyze(black_box(&series), FeatureDegree::Quadratic, None, 3.5))
    });
    c.bench_function("analyze quadratic weighted (240 obs)", |b| {
        b.iter(|| {
            analyze(
                black_box(&series),
                FeatureDegree::Quadratic,
                Some(&weights),
                3.5,
            )
        })
    });
}

fn bench_lag(c: &mut Criterion) {
    let observations = make_observations(240);

    c.bench_function("apply_lag 12 (8 regions x 240 months)", |b| {
        b.iter(|| apply_lag(black_box(&observations), 12))
    });
}

fn bench_report(c: &mut Criterion) {
    let dataset = Dataset::new(make_observations(240), Granularity::Monthly);
    let selection = Selection::new(&dataset, &Config::default());

    // One key press worth of work: lag, filter, weights, fit.
    c.bench_function("report rebuild (8 regions x 240 months)", |b| {
        b.iter(|| Report::build(black_box(&dataset), black_box(&selection)))
    });
}

fn bench_load(c: &mut Criterion) {
    let mut csv = String::from("region,date,rate,price\n");
    for o in make_observations(240) {
        csv.push_str(&format!("{},{},{},{}\n", o.region, o.period.label(), o.rate, o.price));
    }

    c.bench_function("load_long_csv (1920 rows)", |b| {
        b.iter(|| load_long_csv(black_box(csv.as_bytes()), Granularity::Monthly))
    });
}

criterion_group!(benches, bench_fit, bench_lag, bench_report, bench_load);
criterion_main!(benches);
