//! Content-based scoring: cosine similarity between each unread item's
//! embedding and the centroid of the user's most recent items.

use crate::normalize::normalize_scores;
use ndarray::Array1;
use recsys_core::embedding::{cosine_similarity, mean_vector};
use recsys_core::{EmbeddingStore, InteractionLog, ItemCatalog, ScoreMap, UserId};
use std::collections::HashSet;
use tracing::debug;

/// Number of recent interactions that form the taste centroid.
pub const RECENT_WINDOW: usize = 5;

pub struct ContentBasedScorer;

impl ContentBasedScorer {
    /// Mean embedding of the user's [`RECENT_WINDOW`] most recent items.
    /// Items without an embedding are skipped; `None` when nothing is left.
    pub fn taste_centroid(
        user_id: UserId,
        interactions: &InteractionLog,
        embeddings: &EmbeddingStore,
    ) -> Option<Array1<f32>> {
        let recent = interactions.most_recent(user_id, RECENT_WINDOW);
        mean_vector(recent.iter().filter_map(|r| embeddings.get(r.item_id)))
    }

    /// Normalized similarity scores for every catalog item that has an
    /// embedding and is not in the user's history. Empty when the user
    /// cannot be personalised.
    pub fn score(
        user_id: UserId,
        catalog: &ItemCatalog,
        interactions: &InteractionLog,
        embeddings: &EmbeddingStore,
    ) -> ScoreMap {
        let Some(centroid) = Self::taste_centroid(user_id, interactions, embeddings) else {
            debug!(user_id, "No usable recent embeddings; content-based scores empty");
            return ScoreMap::new();
        };

        let history: HashSet<_> = interactions.history(user_id);
        let scores: ScoreMap = catalog
            .iter()
            .filter(|item| !history.contains(&item.item_id))
            .filter_map(|item| {
                embeddings
                    .get(item.item_id)
                    .map(|embedding| (item.item_id, cosine_similarity(embedding, centroid.view())))
            })
            .collect();

        debug!(user_id, candidates = scores.len(), "Content-based scores computed");
        normalize_scores(&scores)
    }
}
