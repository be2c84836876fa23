//! Hybrid recommendation engine: routes each request by the user's
//! interaction volume and blends content, collaborative and popularity scores.
//!
//! | tier       | interactions `c`              | strategy                          |
//! |------------|-------------------------------|-----------------------------------|
//! | cold start | `c < min_interactions_collab` | popularity/freshness only         |
//! | sparse     | up to [`SPARSE_HISTORY_MAX`]  | blend with [`SPARSE_HISTORY_WEIGHTS`] |
//! | rich       | above                         | blend with configured weights     |

use crate::collaborative::CollaborativeScorer;
use crate::content_based::ContentBasedScorer;
use crate::diversity::DiversityReranker;
use crate::matrix::UserItemMatrix;
use crate::normalize::normalize_scores;
use crate::popularity::{PopularityMode, PopularityScorer};
use recsys_core::config::ComponentWeights;
use recsys_core::{
    CategoryId, EmbeddingStore, InteractionLog, ItemCatalog, ItemId, ReasonTag, RecError,
    RecResult, Recommendation, RecommendationConfig, ScoreMap, UserId,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Largest interaction count still treated as a sparse history.
pub const SPARSE_HISTORY_MAX: usize = 10;

/// Weights that replace the configured ones for sparse histories.
pub const SPARSE_HISTORY_WEIGHTS: ComponentWeights = ComponentWeights {
    content_based: 0.45,
    collaborative: 0.15,
    popularity: 0.40,
};

/// Each scorer is asked for this many times the requested count.
pub const HYBRID_CANDIDATE_FACTOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTier {
    ColdStart,
    Sparse,
    Rich,
}

impl HistoryTier {
    pub fn classify(interaction_count: usize, min_interactions_collab: usize) -> Self {
        if interaction_count < min_interactions_collab {
            HistoryTier::ColdStart
        } else if interaction_count <= SPARSE_HISTORY_MAX {
            HistoryTier::Sparse
        } else {
            HistoryTier::Rich
        }
    }
}

/// Sizes of the loaded inputs and derived artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub users: usize,
    pub items: usize,
    pub interactions: usize,
    pub matrix_nnz: usize,
    pub matrix_sparsity: f64,
    pub items_with_embedding: usize,
    pub embedding_dimensions: usize,
    pub categories: usize,
}

/// Owns immutable snapshots of the inputs plus everything derived from them
/// at construction. Requests only read this state, so one engine can serve
/// concurrent callers by reference.
pub struct RecommendationEngine {
    config: RecommendationConfig,
    catalog: ItemCatalog,
    interactions: InteractionLog,
    embeddings: EmbeddingStore,
    matrix: UserItemMatrix,
    popularity: PopularityScorer,
    collaborative: CollaborativeScorer,
    diversity: DiversityReranker,
}

impl RecommendationEngine {
    pub fn new(
        catalog: ItemCatalog,
        interactions: InteractionLog,
        embeddings: EmbeddingStore,
        config: RecommendationConfig,
    ) -> RecResult<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(RecError::EmptyCatalog);
        }

        let missing_embeddings = catalog
            .iter()
            .filter(|item| !embeddings.contains(item.item_id))
            .count();
        if missing_embeddings > 0 {
            warn!(
                missing_embeddings,
                "Catalog items without an embedding are excluded from content-based scoring"
            );
        }

        let matrix = UserItemMatrix::build(&interactions, &catalog);
        let popularity = PopularityScorer::new(&catalog, &interactions, &config);
        let collaborative = CollaborativeScorer::new(config.max_similar_users);
        let diversity = DiversityReranker::new(config.category_diversity_factor);

        info!(
            items = catalog.len(),
            interactions = interactions.len(),
            users = matrix.n_users(),
            embedding_dimensions = embeddings.dimension(),
            similarity_threshold = config.similarity_threshold,
            "Recommendation engine initialized"
        );

        Ok(Self {
            config,
            catalog,
            interactions,
            embeddings,
            matrix,
            popularity,
            collaborative,
            diversity,
        })
    }

    /// Recommend up to `n_recommendations` unread items for `user_id`.
    ///
    /// Unknown users take the cold-start path, so any user id yields a list.
    /// The list is shorter than requested only when the catalog runs out of
    /// eligible items or diversity re-ranking drops a repeated category.
    pub fn recommend(
        &self,
        user_id: UserId,
        n_recommendations: usize,
    ) -> RecResult<Vec<Recommendation>> {
        if n_recommendations == 0 {
            return Err(RecError::InvalidRequest(
                "n_recommendations must be positive".to_string(),
            ));
        }

        let interaction_count = self.interactions.interaction_count(user_id);
        let tier = HistoryTier::classify(interaction_count, self.config.min_interactions_collab);
        debug!(user_id, interaction_count, ?tier, "Routing recommendation request");

        let history = self.interactions.history(user_id);
        let recommendations = match tier {
            HistoryTier::ColdStart => self.popularity.recommend(
                &self.catalog,
                &history,
                n_recommendations,
                PopularityMode::ColdStart,
            ),
            HistoryTier::Sparse | HistoryTier::Rich => {
                self.hybrid(user_id, &history, n_recommendations, self.weights_for(tier))
            }
        };

        info!(
            user_id,
            ?tier,
            returned = recommendations.len(),
            "Recommendations generated"
        );
        Ok(recommendations)
    }

    fn hybrid(
        &self,
        user_id: UserId,
        history: &HashSet<ItemId>,
        n: usize,
        weights: ComponentWeights,
    ) -> Vec<Recommendation> {
        let content = ContentBasedScorer::score(
            user_id,
            &self.catalog,
            &self.interactions,
            &self.embeddings,
        );
        let collaborative = self.collaborative.score(user_id, &self.matrix, &self.interactions);
        let popularity = self.popularity.score_map(
            &self.catalog,
            history,
            n.saturating_mul(HYBRID_CANDIDATE_FACTOR),
        );
        debug!(
            user_id,
            content = content.len(),
            collaborative = collaborative.len(),
            popularity = popularity.len(),
            "Component scores ready"
        );

        let combined = combine_scores(&content, &collaborative, &popularity, &weights);
        let mut ranked: Vec<(ItemId, f64)> = combined.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut assembled = Vec::with_capacity(n.min(self.catalog.len()));
        for (item_id, score) in ranked {
            if history.contains(&item_id) {
                continue;
            }
            let Some(item) = self.catalog.get(item_id) else {
                warn!(item_id, "Scored item missing from catalog; skipped");
                continue;
            };
            assembled.push(Recommendation::from_item(
                item,
                score,
                ReasonTag::HybridCombination,
            ));
            if assembled.len() >= n {
                break;
            }
        }

        let mut recommendations = self.diversity.rerank(assembled, |id| self.category_of(id));
        recommendations.truncate(n);
        recommendations
    }

    fn category_of(&self, item_id: ItemId) -> Option<CategoryId> {
        self.catalog.get(item_id).map(|item| item.category_id)
    }

    pub fn tier_for(&self, user_id: UserId) -> HistoryTier {
        HistoryTier::classify(
            self.interactions.interaction_count(user_id),
            self.config.min_interactions_collab,
        )
    }

    /// Blend weights used for `tier`. Cold start does not blend and reports
    /// the configured weights.
    pub fn weights_for(&self, tier: HistoryTier) -> ComponentWeights {
        match tier {
            HistoryTier::Sparse => SPARSE_HISTORY_WEIGHTS,
            HistoryTier::ColdStart | HistoryTier::Rich => self.config.weights,
        }
    }

    pub fn category_popularity(&self) -> &BTreeMap<CategoryId, f64> {
        self.popularity.category_popularity()
    }

    pub fn stats(&self) -> EngineStats {
        let categories: BTreeSet<CategoryId> =
            self.catalog.iter().map(|item| item.category_id).collect();
        EngineStats {
            users: self.matrix.n_users(),
            items: self.catalog.len(),
            interactions: self.interactions.len(),
            matrix_nnz: self.matrix.nnz(),
            matrix_sparsity: self.matrix.sparsity(),
            items_with_embedding: self.embeddings.len(),
            embedding_dimensions: self.embeddings.dimension(),
            categories: categories.len(),
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn interactions(&self) -> &InteractionLog {
        &self.interactions
    }
}

/// Weighted sum of the three independently normalized maps over the union
/// of their keys. A missing entry contributes 0 for that component.
pub fn combine_scores(
    content: &ScoreMap,
    collaborative: &ScoreMap,
    popularity: &ScoreMap,
    weights: &ComponentWeights,
) -> ScoreMap {
    let content = normalize_scores(content);
    let collaborative = normalize_scores(collaborative);
    let popularity = normalize_scores(popularity);

    let candidates: BTreeSet<ItemId> = content
        .keys()
        .chain(collaborative.keys())
        .chain(popularity.keys())
        .copied()
        .collect();

    candidates
        .into_iter()
        .map(|item_id| {
            let score = content.get(&item_id).copied().unwrap_or(0.0) * weights.content_based
                + collaborative.get(&item_id).copied().unwrap_or(0.0) * weights.collaborative
                + popularity.get(&item_id).copied().unwrap_or(0.0) * weights.popularity;
            (item_id, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use recsys_core::{Interaction, Item};

    fn engine() -> RecommendationEngine {
        let catalog = ItemCatalog::new(vec![
            Item::new(1, 1, 0),
            Item::new(2, 1, 0),
            Item::new(3, 2, 0),
            Item::new(4, 3, 0),
        ]);
        let log = InteractionLog::new(
            (0..12)
                .map(|t| Interaction::new(5, 1 + (t % 2), 1, t))
                .chain([Interaction::new(6, 3, 2, 0)])
                .collect(),
        );
        let embeddings = EmbeddingStore::new(
            &[1, 2, 3, 4],
            array![[1.0, 0.0], [1.0, 0.1], [0.0, 1.0], [0.9, 0.2]],
        )
        .unwrap();
        RecommendationEngine::new(catalog, log, embeddings, RecommendationConfig::default())
            .unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(HistoryTier::classify(0, 3), HistoryTier::ColdStart);
        assert_eq!(HistoryTier::classify(2, 3), HistoryTier::ColdStart);
        assert_eq!(HistoryTier::classify(3, 3), HistoryTier::Sparse);
        assert_eq!(HistoryTier::classify(10, 3), HistoryTier::Sparse);
        assert_eq!(HistoryTier::classify(11, 3), HistoryTier::Rich);
    }

    #[test]
    fn test_weights_by_tier() {
        let engine = engine();
        assert_eq!(engine.weights_for(HistoryTier::Sparse), SPARSE_HISTORY_WEIGHTS);
        assert_eq!(engine.weights_for(HistoryTier::Rich), ComponentWeights::default());
        assert_eq!(engine.tier_for(5), HistoryTier::Rich);
        assert_eq!(engine.tier_for(6), HistoryTier::ColdStart);
    }

    #[test]
    fn test_combine_treats_missing_component_as_zero() {
        let content: ScoreMap = [(1, 0.0), (2, 1.0)].into_iter().collect();
        let popularity: ScoreMap = [(2, 0.2), (3, 0.8)].into_iter().collect();
        let combined = combine_scores(
            &content,
            &ScoreMap::new(),
            &popularity,
            &ComponentWeights::default(),
        );
        assert_eq!(combined.len(), 3);
        assert!((combined[&1] - 0.0).abs() < 1e-12);
        assert!((combined[&2] - 0.4).abs() < 1e-12);
        assert!((combined[&3] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_rich_user_gets_unread_hybrid_items() {
        let engine = engine();
        let recs = engine.recommend(5, 2).unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.item_id == 3 || r.item_id == 4));
        assert!(recs.iter().all(|r| r.reason == ReasonTag::HybridCombination));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            engine().recommend(5, 0),
            Err(RecError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let embeddings = EmbeddingStore::new(&[], ndarray::Array2::zeros((0, 4))).unwrap();
        let result = RecommendationEngine::new(
            ItemCatalog::default(),
            InteractionLog::default(),
            embeddings,
            RecommendationConfig::default(),
        );
        assert!(matches!(result, Err(RecError::EmptyCatalog)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RecommendationConfig {
            weights: ComponentWeights {
                content_based: 0.1,
                collaborative: 0.1,
                popularity: 0.1,
            },
            ..Default::default()
        };
        let embeddings = EmbeddingStore::new(&[1], array![[1.0]]).unwrap();
        let result = RecommendationEngine::new(
            ItemCatalog::new(vec![Item::new(1, 1, 0)]),
            InteractionLog::default(),
            embeddings,
            config,
        );
        assert!(matches!(result, Err(RecError::Config(_))));
    }

    #[test]
    fn test_stats() {
        let stats = engine().stats();
        assert_eq!(stats.items, 4);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.interactions, 13);
        assert_eq!(stats.matrix_nnz, 3);
        assert_eq!(stats.categories, 3);
        assert_eq!(stats.embedding_dimensions, 2);
    }
}
