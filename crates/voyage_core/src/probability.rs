//! Per-tick Bernoulli trials.
//!
//! Named frequencies map to a fixed tick count N from content; a trial
//! succeeds with probability 1/N. The table is authored for five-second
//! ticks and is not rescaled at runtime.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Bidaily,
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub daily: u64,
    pub bidaily: u64,
    pub weekly: u64,
    pub biweekly: u64,
    pub monthly: u64,
    pub bimonthly: u64,
}

impl FrequencyTable {
    pub fn ticks(&self, frequency: Frequency) -> u64 {
        match frequency {
            Frequency::Daily => self.daily,
            Frequency::Bidaily => self.bidaily,
            Frequency::Weekly => self.weekly,
            Frequency::Biweekly => self.biweekly,
            Frequency::Monthly => self.monthly,
            Frequency::Bimonthly => self.bimonthly,
        }
    }
}

/// Succeeds with probability `1/n`. `n <= 1` always succeeds.
pub fn coin(rng: &mut impl Rng, n: u64) -> bool {
    if n <= 1 {
        return true;
    }
    rng.gen_range(0..n) == 0
}

/// One trial at a named recurrence period.
pub fn chance(rng: &mut impl Rng, frequency: Frequency, table: &FrequencyTable) -> bool {
    coin(rng, table.ticks(frequency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn coin_of_one_always_lands() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!((0..100).all(|_| coin(&mut rng, 1)));
        assert!(coin(&mut rng, 0));
    }

    #[test]
    fn empirical_rate_converges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trials = 2_000_000_u64;
        let k = 200;
        let hits = (0..trials).filter(|_| coin(&mut rng, k)).count() as f64;
        let expected = trials as f64 / k as f64;
        // Binomial standard deviation is ~99.7 here; allow five of them.
        assert!(
            (hits - expected).abs() < 500.0,
            "hits {hits} vs expected {expected}"
        );
    }

    #[test]
    fn named_frequency_uses_table() {
        let table = FrequencyTable {
            daily: 1,
            bidaily: 2,
            weekly: 3,
            biweekly: 4,
            monthly: 5,
            bimonthly: u64::MAX,
        };
        assert_eq!(table.ticks(Frequency::Monthly), 5);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(chance(&mut rng, Frequency::Daily, &table));
        assert!(!(0..1000).any(|_| chance(&mut rng, Frequency::Bimonthly, &table)));
    }
}
