// Pseudo-random outcome source for simulated check units.
//
// These outcomes are NOT security assertions. They stand in for response
// inspection until a unit is switched to its live strategy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct Simulator {
    rng: Arc<Mutex<StdRng>>,
    latency: Duration,
}

impl Simulator {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
            latency: Duration::ZERO,
        }
    }

    /// Delay awaited before each simulated unit reports
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// True with probability `p`
    pub fn chance(&self, p: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_bool(p.clamp(0.0, 1.0))
    }

    pub async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}
