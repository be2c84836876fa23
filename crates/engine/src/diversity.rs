//! Category-capped re-ranking.
//!
//! A single greedy pass over the score-sorted list: the first item of each
//! category is always admitted, a repeat only while the admitted count is
//! below `(1 - factor) * candidates`.

use recsys_core::{CategoryId, ItemId, Recommendation};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct DiversityReranker {
    factor: f64,
}

impl DiversityReranker {
    /// `factor` is clamped to [0, 1]; higher values leave less room for repeats.
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Re-rank `candidates`, resolving categories through `category_of`.
    /// Items whose category cannot be resolved are always admitted.
    pub fn rerank<F>(&self, mut candidates: Vec<Recommendation>, category_of: F) -> Vec<Recommendation>
    where
        F: Fn(ItemId) -> Option<CategoryId>,
    {
        if candidates.is_empty() {
            return candidates;
        }

        sort_by_score_desc(&mut candidates);

        let repeat_cap = (1.0 - self.factor) * candidates.len() as f64;
        let mut seen_categories: HashSet<CategoryId> = HashSet::new();
        let mut admitted = Vec::with_capacity(candidates.len());

        for rec in candidates {
            let Some(category_id) = category_of(rec.item_id) else {
                warn!(
                    item_id = rec.item_id,
                    "Item not found in catalog during diversity check; admitting"
                );
                admitted.push(rec);
                continue;
            };

            if seen_categories.insert(category_id) || (admitted.len() as f64) < repeat_cap {
                admitted.push(rec);
            }
        }

        sort_by_score_desc(&mut admitted);
        admitted
    }
}

/// Stable descending sort; equal scores keep their relative order.
pub(crate) fn sort_by_score_desc(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
