use serde::Serialize;
use std::sync::Arc;

use super::frame::{LiveFrameCheck, SimulatedFrameCheck};
use super::headers::{LiveHeaderCheck, SimulatedHeaderCheck};
use super::paths::{LivePathCheck, SimulatedPathCheck};
use super::probe::HttpProbe;
use super::simulation::Simulator;
use super::tls::TlsSchemeCheck;
use super::CheckUnit;

/// Progress reached once each built-in unit finishes, in registry order.
/// Front-loaded on purpose; completion takes progress to 100.
pub const CHECKPOINTS: [u8; 4] = [15, 30, 50, 80];

#[derive(Clone)]
pub struct RegisteredCheck {
    pub unit: Arc<dyn CheckUnit>,
    pub checkpoint: u8,
}

/// Fixed, ordered list of check units
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<RegisteredCheck>,
}

#[derive(Debug, Serialize)]
pub struct CheckInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub checkpoint: u8,
    pub simulated: bool,
    pub labels: Vec<String>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, unit: impl CheckUnit + 'static, checkpoint: u8) -> Self {
        self.checks.push(RegisteredCheck {
            unit: Arc::new(unit),
            checkpoint,
        });
        self
    }

    /// Registry whose units 2-4 draw outcomes from `simulator`
    pub fn simulated(simulator: Simulator) -> Self {
        Self::new()
            .register(TlsSchemeCheck, CHECKPOINTS[0])
            .register(SimulatedFrameCheck::new(simulator.clone()), CHECKPOINTS[1])
            .register(SimulatedPathCheck::new(simulator.clone()), CHECKPOINTS[2])
            .register(SimulatedHeaderCheck::new(simulator), CHECKPOINTS[3])
    }

    /// Registry whose units 2-4 inspect real responses through `probe`
    pub fn live(probe: HttpProbe) -> Self {
        Self::new()
            .register(TlsSchemeCheck, CHECKPOINTS[0])
            .register(LiveFrameCheck::new(probe.clone()), CHECKPOINTS[1])
            .register(LivePathCheck::new(probe.clone()), CHECKPOINTS[2])
            .register(LiveHeaderCheck::new(probe), CHECKPOINTS[3])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCheck> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Number of results a full scan produces
    pub fn expected_results(&self) -> usize {
        self.checks.iter().map(|c| c.unit.labels().len()).sum()
    }

    pub fn describe(&self) -> Vec<CheckInfo> {
        self.checks
            .iter()
            .map(|c| CheckInfo {
                id: c.unit.id(),
                name: c.unit.name(),
                checkpoint: c.checkpoint,
                simulated: c.unit.simulated(),
                labels: c.unit.labels(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simulated_registry_shape() {
        let registry = CheckRegistry::simulated(Simulator::seeded(0));
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.expected_results(), 13);

        let ids: Vec<&str> = registry.iter().map(|c| c.unit.id()).collect();
        assert_eq!(
            ids,
            vec!["tls_scheme", "frame_protection", "path_exposure", "security_headers"]
        );

        let checkpoints: Vec<u8> = registry.iter().map(|c| c.checkpoint).collect();
        assert_eq!(checkpoints, CHECKPOINTS.to_vec());
    }

    #[test]
    fn test_live_registry_matches_simulated_labels() {
        let live = CheckRegistry::live(HttpProbe::new(Duration::from_secs(1)).unwrap());
        let simulated = CheckRegistry::simulated(Simulator::seeded(0));

        let live_labels: Vec<Vec<String>> = live.describe().into_iter().map(|c| c.labels).collect();
        let sim_labels: Vec<Vec<String>> =
            simulated.describe().into_iter().map(|c| c.labels).collect();
        assert_eq!(live_labels, sim_labels);
        assert!(live.describe().iter().all(|c| !c.simulated));
    }

    #[test]
    fn test_labels_are_unique() {
        let registry = CheckRegistry::simulated(Simulator::seeded(0));
        let mut labels: Vec<String> = registry.describe().into_iter().flat_map(|c| c.labels).collect();
        let before = labels.len();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), before);
    }
}
