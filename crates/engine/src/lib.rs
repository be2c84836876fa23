//! Hybrid recommendation engine: content similarity, user-based
//! collaborative filtering and popularity/freshness blended into one ranked,
//! category-diversified list, with a popularity fallback for new users.

pub mod collaborative;
pub mod content_based;
pub mod diversity;
pub mod hybrid;
pub mod matrix;
pub mod normalize;
pub mod popularity;

pub use collaborative::CollaborativeScorer;
pub use content_based::ContentBasedScorer;
pub use diversity::DiversityReranker;
pub use hybrid::{combine_scores, EngineStats, HistoryTier, RecommendationEngine};
pub use matrix::UserItemMatrix;
pub use normalize::normalize_scores;
pub use popularity::{PopularityMode, PopularityScorer};
