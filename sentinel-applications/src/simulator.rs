//! Mock search backend
//!
//! Stands in for a real retrieval pipeline: every query yields one finding
//! picked from a fixed set of templates after a random delay.

use async_trait::async_trait;
use sentinel_core::{Finding, FindingType, SearchBackend, SimulatorConfig};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Finding templates as (type, title)
pub const FINDING_TEMPLATES: [(FindingType, &str); 6] = [
    (FindingType::Person, "Known associate: Jane Smith"),
    (FindingType::Social, "LinkedIn profile found"),
    (FindingType::Place, "Last seen location: Downtown Cafe"),
    (FindingType::Organization, "Works at: Acme Corporation"),
    (
        FindingType::Document,
        "Public record of property ownership found",
    ),
    (
        FindingType::Other,
        "Interest in vintage cars noted from forum posts",
    ),
];

/// Search backend producing template findings after a simulated delay
pub struct MockSearchSimulator {
    rng: Mutex<fastrand::Rng>,
    min_delay: Duration,
    max_delay: Duration,
}

impl MockSearchSimulator {
    pub fn new(config: &SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let min_delay_ms = config.min_delay_ms.min(config.max_delay_ms);

        Self {
            rng: Mutex::new(rng),
            min_delay: Duration::from_millis(min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Simulator that answers without delay
    pub fn instant() -> Self {
        Self::new(&SimulatorConfig::instant())
    }

    /// Pick a template index and a delay
    fn draw(&self) -> (usize, Duration) {
        // A poisoned lock still holds a usable generator
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let index = rng.usize(..FINDING_TEMPLATES.len());
        let min_ms = self.min_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let delay = Duration::from_millis(rng.u64(min_ms..=max_ms));
        (index, delay)
    }
}

#[async_trait]
impl SearchBackend for MockSearchSimulator {
    async fn search(&self, query: &str) -> Finding {
        let (index, delay) = self.draw();
        debug!(query = %query, delay_ms = delay.as_millis() as u64, "Simulating search");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (finding_type, title) = FINDING_TEMPLATES[index];
        Finding::new(
            finding_type,
            title,
            format!("Based on the query: \"{}\"", query),
            query,
        )
    }
}
