use std::sync::{Arc, PoisonError, RwLock};

use metrics::counter;
use strum_macros::IntoStaticStr;
use tracing::info;

use crate::model::SupplySnapshot;

/// Result of offering a candidate snapshot to the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PublishOutcome {
    /// The candidate replaced the previous snapshot (or was the first one).
    Published,
    /// The candidate's total was lower than the published one and was dropped.
    Discarded,
}

impl PublishOutcome {
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Holds the most recently accepted [`SupplySnapshot`].
///
/// Readers receive an `Arc` to a complete snapshot, so they never observe a
/// value that is half old and half new. The monotonicity check and the swap
/// happen under the same write lock.
#[derive(Debug, Default)]
pub struct SupplyPublisher {
    current: RwLock<Option<Arc<SupplySnapshot>>>,
}

impl SupplyPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest accepted snapshot, or `None` before the first successful tick.
    pub fn current(&self) -> Option<Arc<SupplySnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the published snapshot unless the candidate's total supply is
    /// lower than the current one.
    pub fn publish(&self, candidate: SupplySnapshot) -> PublishOutcome {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = guard.as_ref() {
            if candidate.total_supply < existing.total_supply {
                info!(
                    candidate_total = %candidate.total_supply,
                    published_total = %existing.total_supply,
                    "discarding supply candidate below published total"
                );
                counter!("supply_publish_total", "outcome" => PublishOutcome::Discarded.label())
                    .increment(1);
                return PublishOutcome::Discarded;
            }
        }

        *guard = Some(Arc::new(candidate));
        counter!("supply_publish_total", "outcome" => PublishOutcome::Published.label())
            .increment(1);
        PublishOutcome::Published
    }
}
