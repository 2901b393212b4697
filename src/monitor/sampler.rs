use rand::{rngs::StdRng, Rng, SeedableRng};

/// Decides which activity events also ping the server. Sampling keeps the
/// server-side session roughly in sync without a request per event.
pub struct PingSampler {
    rate: f64,
    rng: StdRng,
}

impl PingSampler {
    pub fn from_rate(rate: f64) -> Self {
        Self {
            rate,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sampler for tests.
    pub fn with_seed(rate: f64, seed: u64) -> Self {
        Self {
            rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn should_ping(&mut self) -> bool {
        self.rng.gen::<f64>() < self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::PingSampler;

    #[test]
    fn zero_rate_never_pings() {
        let mut sampler = PingSampler::with_seed(0.0, 17);
        assert!((0..1000).all(|_| !sampler.should_ping()));
    }

    #[test]
    fn full_rate_always_pings() {
        let mut sampler = PingSampler::with_seed(1.0, 17);
        assert!((0..1000).all(|_| sampler.should_ping()));
    }

    #[test]
    fn seeded_sampler_stays_near_the_rate() {
        let mut sampler = PingSampler::with_seed(0.1, 42);
        let hits = (0..1000).filter(|_| sampler.should_ping()).count();
        assert!((50..=200).contains(&hits), "hits: {hits}");
    }
}
