//! Shared market beliefs for the GD family.
//!
//! One estimator per (repetition, kind) is shared by every agent of that
//! kind. Whoever refreshes it first in a round pays for the recompute; the
//! others see the same curves.
//!
//! ```text
//!   BeliefRegistry
//!     (0, Gd)  ─▶ Arc<Mutex<BeliefEstimator>> ◀─ gd1, gd2, ...
//!     (0, Gdx) ─▶ Arc<Mutex<BeliefEstimator>> ◀─ gdx1, gdx2, ...
//!     (1, Gd)  ─▶ ...
//! ```

mod estimator;
pub mod interpolate;

use std::sync::Arc;

use agora_core::MarketParams;
use dashmap::DashMap;
use parking_lot::Mutex;

pub use estimator::{BeliefEstimator, MEMORY};

/// Which strategy family owns an estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeliefKind {
    Gd,
    Gdx,
}

pub type SharedBelief = Arc<Mutex<BeliefEstimator>>;

/// Lazily created estimators keyed by repetition and kind
pub struct BeliefRegistry {
    params: MarketParams,
    beliefs: DashMap<(usize, BeliefKind), SharedBelief>,
}

impl BeliefRegistry {
    pub fn new(params: &MarketParams) -> Self {
        Self {
            params: params.clone(),
            beliefs: DashMap::new(),
        }
    }

    /// The estimator for `repetition`, created on first use
    pub fn get(&self, repetition: usize, kind: BeliefKind) -> SharedBelief {
        self.beliefs
            .entry((repetition, kind))
            .or_insert_with(|| {
                log::debug!("creating {kind:?} belief for repetition {repetition}");
                Arc::new(Mutex::new(BeliefEstimator::new(&self.params)))
            })
            .value()
            .clone()
    }

    /// Forget all estimators
    pub fn reset(&self) {
        self.beliefs.clear();
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_shares_estimator() {
        let registry = BeliefRegistry::new(&MarketParams::default());
        let a = registry.get(0, BeliefKind::Gd);
        let b = registry.get(0, BeliefKind::Gd);
        let c = registry.get(0, BeliefKind::Gdx);
        let d = registry.get(1, BeliefKind::Gd);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(!Arc::ptr_eq(&a, &d));
        assert_eq!(registry.len(), 3);

        registry.reset();
        assert!(registry.is_empty());
    }
}
