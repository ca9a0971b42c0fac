use std::collections::BTreeMap;

use crate::data::observation::Observation;

/// Replace each rate with the rate `lag` positions earlier in the same
/// region's period-ordered history. Observations without such a
/// predecessor are dropped. Output is ordered by (region, period).
pub fn apply_lag(observations: &[Observation], lag: usize) -> Vec<Observation> {
    let mut by_region: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        by_region.entry(obs.region.as_str()).or_default().push(obs);
    }

    let mut out = Vec::with_capacity(observations.len());
    for mut history in by_region.into_values() {
        history.sort_by(|a, b| a.period.cmp(&b.period));
        for (idx, obs) in history.iter().enumerate().skip(lag) {
            out.push(Observation {
                rate: history[idx - lag].rate,
                ..(*obs).clone()
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::data::observation::{Dataset, Granularity, Period};

    fn monthly(region: &str, rates: &[f64]) -> Vec<Observation> {
        rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| {
                let period = Period::month(2020 + (i / 12) as i32, (i % 12) as u32 + 1).unwrap();
                Observation::new(region, period, rate, 100.0 + i as f64)
            })
            .collect()
    }

    #[test]
    fn test_zero_lag_is_identity() {
        let mut input = monthly("a", &[1.0, 1.25, 1.5]);
        input.extend(monthly("b", &[0.5, 0.75]));
        assert_eq!(apply_lag(&input, 0), input);
    }

    #[test]
    fn test_lag_shifts_within_region_only() {
        let mut input = monthly("b", &[9.0, 8.0, 7.0]);
        input.extend(monthly("a", &[1.0, 2.0, 3.0, 4.0]));
        let out = apply_lag(&input, 2);

        let a: Vec<(f64, f64)> = out.iter().filter(|o| o.region == "a").map(|o| (o.rate, o.price)).collect();
        assert_eq!(a, vec![(1.0, 102.0), (2.0, 103.0)]);
        let b: Vec<f64> = out.iter().filter(|o| o.region == "b").map(|o| o.rate).collect();
        assert_eq!(b, vec![9.0]);
    }

    #[test]
    fn test_lag_longer_than_history_drops_everything() {
        let input = monthly("a", &[1.0, 2.0]);
        assert!(apply_lag(&input, 12).is_empty());
    }

    #[test]
    fn test_lag_properties_on_random_histories() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut input = Vec::new();
            for region in ["a", "b", "c"] {
                let len = rng.gen_range(0..30);
                let rates: Vec<f64> = (0..len).map(|_| rng.gen_range(0.0..5.0)).collect();
                input.extend(monthly(region, &rates));
            }
            let input = Dataset::new(input, Granularity::Monthly);
            let k = rng.gen_range(1..=12);
            let out = apply_lag(input.observations(), k);
            assert!(out.len() <= input.len());

            for obs in &out {
                let history: Vec<&Observation> =
                    input.observations().iter().filter(|o| o.region == obs.region).collect();
                let pos = history.iter().position(|o| o.period == obs.period).unwrap();
                assert!(pos >= k);
                assert_eq!(obs.rate, history[pos - k].rate);
                assert_eq!(obs.price, history[pos].price);
            }
        }
    }
}
