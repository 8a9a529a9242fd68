//! Estimated GDP derivation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::countries::{NewCountry, RawCountry};

/// Inclusive bounds of the per-country random multiplier.
pub const GDP_MULTIPLIER_MIN: u32 = 1000;
pub const GDP_MULTIPLIER_MAX: u32 = 2000;

/// Supplies one multiplier per estimated country.
pub trait MultiplierSource: Send {
    fn next_multiplier(&mut self) -> u32;
}

/// Uniform draw over `[GDP_MULTIPLIER_MIN, GDP_MULTIPLIER_MAX]`.
pub struct RandomMultiplier {
    rng: StdRng,
}

impl RandomMultiplier {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MultiplierSource for RandomMultiplier {
    fn next_multiplier(&mut self) -> u32 {
        self.rng.gen_range(GDP_MULTIPLIER_MIN..=GDP_MULTIPLIER_MAX)
    }
}

/// Builds a fresh multiplier source for each refresh run.
pub type MultiplierFactory = Arc<dyn Fn() -> Box<dyn MultiplierSource> + Send + Sync>;

/// Factory for production use: entropy-seeded per run, or a fixed seed for reproducible runs.
pub fn random_multipliers(seed: Option<u64>) -> MultiplierFactory {
    Arc::new(move || -> Box<dyn MultiplierSource> {
        match seed {
            Some(seed) => Box::new(RandomMultiplier::seeded(seed)),
            None => Box::new(RandomMultiplier::from_entropy()),
        }
    })
}

/// `population * multiplier / rate`.
pub fn estimate_gdp(population: i64, multiplier: u32, rate: f64) -> f64 {
    population as f64 * f64::from(multiplier) / rate
}

pub struct GdpEstimator {
    source: Box<dyn MultiplierSource>,
}

impl GdpEstimator {
    pub fn new(source: Box<dyn MultiplierSource>) -> Self {
        Self { source }
    }

    /// Draws one multiplier and applies it.
    pub fn estimate(&mut self, population: i64, rate: f64) -> f64 {
        let multiplier = self.source.next_multiplier();
        estimate_gdp(population, multiplier, rate)
    }
}

fn usable_rate(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Merges a directory entry with the rate table.
///
/// - no currency: code `None`, rate `None`, estimate `Some(0.0)`
/// - currency without a usable rate: code `Some`, rate `None`, estimate `None`
/// - currency with rate: estimate drawn from `estimator`
pub fn merge_country(
    raw: &RawCountry,
    rates: &HashMap<String, f64>,
    estimator: &mut GdpEstimator,
    refreshed_at: DateTime<Utc>,
) -> NewCountry {
    let (currency_code, exchange_rate, estimated_gdp) = match raw.primary_currency() {
        None => (None, None, Some(0.0)),
        Some(code) => match rates.get(code).copied().and_then(usable_rate) {
            Some(rate) => (
                Some(code.to_string()),
                Some(rate),
                Some(estimator.estimate(raw.population, rate)),
            ),
            None => (Some(code.to_string()), None, None),
        },
    };

    NewCountry {
        name: raw.name.trim().to_string(),
        capital: raw.capital.clone().filter(|v| !v.is_empty()),
        region: raw.region.clone().filter(|v| !v.is_empty()),
        population: raw.population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: raw.flag_url.clone().filter(|v| !v.is_empty()),
        last_refreshed_at: refreshed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl MultiplierSource for Fixed {
        fn next_multiplier(&mut self) -> u32 {
            self.0
        }
    }

    fn raw(currencies: &[&str]) -> RawCountry {
        RawCountry {
            name: "Testland".to_string(),
            population: 1_000_000,
            currency_codes: currencies.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn rates() -> HashMap<String, f64> {
        HashMap::from([("USD".to_string(), 2.0), ("BAD".to_string(), 0.0)])
    }

    #[test]
    fn no_currency_falls_back_to_zero() {
        let mut estimator = GdpEstimator::new(Box::new(Fixed(1500)));
        let merged = merge_country(&raw(&[]), &rates(), &mut estimator, Utc::now());
        assert_eq!(merged.currency_code, None);
        assert_eq!(merged.exchange_rate, None);
        assert_eq!(merged.estimated_gdp, Some(0.0));
    }

    #[test]
    fn unknown_currency_has_no_estimate() {
        let mut estimator = GdpEstimator::new(Box::new(Fixed(1500)));
        let merged = merge_country(&raw(&["XYZ"]), &rates(), &mut estimator, Utc::now());
        assert_eq!(merged.currency_code.as_deref(), Some("XYZ"));
        assert_eq!(merged.exchange_rate, None);
        assert_eq!(merged.estimated_gdp, None);
    }

    #[test]
    fn known_currency_is_estimated() {
        let mut estimator = GdpEstimator::new(Box::new(Fixed(1500)));
        let merged = merge_country(&raw(&["USD"]), &rates(), &mut estimator, Utc::now());
        assert_eq!(merged.exchange_rate, Some(2.0));
        assert_eq!(merged.estimated_gdp, Some(750_000_000.0));
    }

    #[test]
    fn non_positive_rate_is_treated_as_missing() {
        let mut estimator = GdpEstimator::new(Box::new(Fixed(1500)));
        let merged = merge_country(&raw(&["BAD"]), &rates(), &mut estimator, Utc::now());
        assert_eq!(merged.currency_code.as_deref(), Some("BAD"));
        assert_eq!(merged.estimated_gdp, None);
    }

    #[test]
    fn random_multiplier_stays_in_bounds() {
        let mut source = RandomMultiplier::seeded(7);
        for _ in 0..10_000 {
            let m = source.next_multiplier();
            assert!((GDP_MULTIPLIER_MIN..=GDP_MULTIPLIER_MAX).contains(&m));
        }
    }

    #[test]
    fn seeded_factory_is_reproducible() {
        let factory = random_multipliers(Some(42));
        let mut a = factory();
        let mut b = factory();
        let first: Vec<u32> = (0..16).map(|_| a.next_multiplier()).collect();
        let second: Vec<u32> = (0..16).map(|_| b.next_multiplier()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_strings_become_none() {
        let mut input = raw(&["USD"]);
        input.capital = Some(String::new());
        input.region = Some("Africa".to_string());
        let mut estimator = GdpEstimator::new(Box::new(Fixed(1000)));
        let merged = merge_country(&input, &rates(), &mut estimator, Utc::now());
        assert_eq!(merged.capital, None);
        assert_eq!(merged.region.as_deref(), Some("Africa"));
    }
}
