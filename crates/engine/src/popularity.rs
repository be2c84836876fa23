//! Popularity and freshness scoring, used on its own for cold-start users and
//! as one of the three signals of the hybrid blend.

use crate::diversity::{sort_by_score_desc, DiversityReranker};
use crate::normalize::normalize_scores;
use recsys_core::{
    CategoryId, InteractionLog, ItemCatalog, ItemId, ReasonTag, Recommendation,
    RecommendationConfig, ScoreMap,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Popularity share of the blend outside the cold-start path. Fixed, and
/// independent of the configured hybrid `weights.popularity`.
pub const STANDALONE_POPULARITY_WEIGHT: f64 = 0.7;

/// Candidates kept before diversity re-ranking, as a multiple of the request.
pub const CANDIDATE_OVERSIZE_FACTOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityMode {
    Regular,
    ColdStart,
}

pub struct PopularityScorer {
    global: ScoreMap,
    by_category: BTreeMap<CategoryId, f64>,
    freshness: ScoreMap,
    cold_start_weight: f64,
    cold_start_diversity: DiversityReranker,
    regular_diversity: DiversityReranker,
}

impl PopularityScorer {
    pub fn new(
        catalog: &ItemCatalog,
        interactions: &InteractionLog,
        config: &RecommendationConfig,
    ) -> Self {
        let global = global_popularity(interactions);
        let by_category = category_popularity(catalog, interactions);
        let freshness = freshness_scores(catalog, config.freshness_decay_days);

        info!(
            items = global.len(),
            categories = by_category.len(),
            "Popularity scores computed"
        );

        Self {
            global,
            by_category,
            freshness,
            cold_start_weight: config.cold_start_weights.popularity,
            cold_start_diversity: DiversityReranker::new(config.cold_start_weights.category_diversity),
            regular_diversity: DiversityReranker::new(config.category_diversity_factor),
        }
    }

    /// Normalized interaction counts per item.
    pub fn global_popularity(&self) -> &ScoreMap {
        &self.global
    }

    /// Normalized interaction counts per category.
    pub fn category_popularity(&self) -> &BTreeMap<CategoryId, f64> {
        &self.by_category
    }

    pub fn popularity(&self, item_id: ItemId) -> f64 {
        self.global.get(&item_id).copied().unwrap_or(0.0)
    }

    pub fn freshness(&self, item_id: ItemId) -> f64 {
        self.freshness.get(&item_id).copied().unwrap_or(0.0)
    }

    /// Popularity weight used by `mode`.
    pub fn alpha(&self, mode: PopularityMode) -> f64 {
        match mode {
            PopularityMode::Regular => STANDALONE_POPULARITY_WEIGHT,
            PopularityMode::ColdStart => self.cold_start_weight,
        }
    }

    /// `alpha * popularity + (1 - alpha) * freshness`.
    pub fn blended_score(&self, item_id: ItemId, alpha: f64) -> f64 {
        alpha * self.popularity(item_id) + (1.0 - alpha) * self.freshness(item_id)
    }

    /// Rank unread catalog items by blended score, re-rank for category
    /// diversity and keep at most `n`.
    pub fn recommend(
        &self,
        catalog: &ItemCatalog,
        history: &HashSet<ItemId>,
        n: usize,
        mode: PopularityMode,
    ) -> Vec<Recommendation> {
        let alpha = self.alpha(mode);

        let mut candidates: Vec<Recommendation> = catalog
            .iter()
            .filter(|item| !history.contains(&item.item_id))
            .map(|item| {
                Recommendation::from_item(
                    item,
                    self.blended_score(item.item_id, alpha),
                    ReasonTag::PopularityTrending,
                )
            })
            .collect();

        sort_by_score_desc(&mut candidates);
        candidates.truncate(n.saturating_mul(CANDIDATE_OVERSIZE_FACTOR));

        let diversity = match mode {
            PopularityMode::Regular => &self.regular_diversity,
            PopularityMode::ColdStart => &self.cold_start_diversity,
        };
        let mut recommendations =
            diversity.rerank(candidates, |id| catalog.get(id).map(|item| item.category_id));
        recommendations.truncate(n);

        debug!(
            ?mode,
            alpha,
            returned = recommendations.len(),
            "Popularity recommendations generated"
        );
        recommendations
    }

    /// The regular-path list as a score map, for blending.
    pub fn score_map(&self, catalog: &ItemCatalog, history: &HashSet<ItemId>, n: usize) -> ScoreMap {
        self.recommend(catalog, history, n, PopularityMode::Regular)
            .into_iter()
            .map(|rec| (rec.item_id, rec.score))
            .collect()
    }
}

fn global_popularity(interactions: &InteractionLog) -> ScoreMap {
    let mut counts = ScoreMap::new();
    for interaction in interactions.iter() {
        *counts.entry(interaction.item_id).or_insert(0.0) += 1.0;
    }
    normalize_scores(&counts)
}

/// Interactions whose item is missing from the catalog are left out.
fn category_popularity(
    catalog: &ItemCatalog,
    interactions: &InteractionLog,
) -> BTreeMap<CategoryId, f64> {
    let mut counts = ScoreMap::new();
    for interaction in interactions.iter() {
        if let Some(item) = catalog.get(interaction.item_id) {
            *counts.entry(item.category_id).or_insert(0.0) += 1.0;
        }
    }
    normalize_scores(&counts)
}

/// `exp(-age_days / decay_days)`, with age measured in whole days from the
/// newest item in the catalog.
fn freshness_scores(catalog: &ItemCatalog, decay_days: f64) -> ScoreMap {
    let Some(reference) = catalog.max_created_at() else {
        return ScoreMap::new();
    };

    catalog
        .iter()
        .map(|item| {
            let age_ms = reference.saturating_sub(item.created_at).max(0);
            let age_days = chrono::Duration::milliseconds(age_ms).num_days() as f64;
            (item.item_id, (-age_days / decay_days).exp())
        })
        .collect()
}
