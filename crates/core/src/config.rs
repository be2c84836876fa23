use crate::error::{RecError, RecResult};
use serde::Deserialize;
use std::path::Path;

/// Tolerance used when checking that blend weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Recommendation engine configuration. Loaded from an optional TOML file
/// and environment variables with the prefix `RECSYS__`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default)]
    pub weights: ComponentWeights,
    #[serde(default)]
    pub cold_start_weights: ColdStartWeights,
    /// Declared but not consumed by any scorer.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_min_interactions_collab")]
    pub min_interactions_collab: usize,
    #[serde(default = "default_max_similar_users")]
    pub max_similar_users: usize,
    #[serde(default = "default_freshness_decay_days")]
    pub freshness_decay_days: f64,
    #[serde(default = "default_category_diversity_factor")]
    pub category_diversity_factor: f64,
}

/// Blend weights for the personalised path. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ComponentWeights {
    #[serde(default = "default_content_weight")]
    pub content_based: f64,
    #[serde(default = "default_collaborative_weight")]
    pub collaborative: f64,
    #[serde(default = "default_popularity_weight")]
    pub popularity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColdStartWeights {
    /// Popularity share of the popularity/freshness blend for new users.
    #[serde(default = "default_cold_start_popularity")]
    pub popularity: f64,
    /// Diversity factor applied to cold-start lists.
    #[serde(default = "default_cold_start_category_diversity")]
    pub category_diversity: f64,
}

// Default functions
fn default_content_weight() -> f64 {
    0.4
}
fn default_collaborative_weight() -> f64 {
    0.3
}
fn default_popularity_weight() -> f64 {
    0.3
}
fn default_cold_start_popularity() -> f64 {
    0.7
}
fn default_cold_start_category_diversity() -> f64 {
    0.3
}
fn default_similarity_threshold() -> f64 {
    0.1
}
fn default_min_interactions_collab() -> usize {
    3
}
fn default_max_similar_users() -> usize {
    50
}
fn default_freshness_decay_days() -> f64 {
    7.0
}
fn default_category_diversity_factor() -> f64 {
    0.2
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            content_based: default_content_weight(),
            collaborative: default_collaborative_weight(),
            popularity: default_popularity_weight(),
        }
    }
}

impl Default for ColdStartWeights {
    fn default() -> Self {
        Self {
            popularity: default_cold_start_popularity(),
            category_diversity: default_cold_start_category_diversity(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            cold_start_weights: ColdStartWeights::default(),
            similarity_threshold: default_similarity_threshold(),
            min_interactions_collab: default_min_interactions_collab(),
            max_similar_users: default_max_similar_users(),
            freshness_decay_days: default_freshness_decay_days(),
            category_diversity_factor: default_category_diversity_factor(),
        }
    }
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.content_based + self.collaborative + self.popularity
    }
}

impl RecommendationConfig {
    /// Load configuration from an optional TOML file and environment variables,
    /// then validate it.
    pub fn load(path: Option<&Path>) -> RecResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("RECSYS")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> RecResult<()> {
        let weights = [
            ("weights.content_based", self.weights.content_based),
            ("weights.collaborative", self.weights.collaborative),
            ("weights.popularity", self.weights.popularity),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RecError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RecError::Config(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }

        let fractions = [
            ("cold_start_weights.popularity", self.cold_start_weights.popularity),
            (
                "cold_start_weights.category_diversity",
                self.cold_start_weights.category_diversity,
            ),
            ("similarity_threshold", self.similarity_threshold),
            ("category_diversity_factor", self.category_diversity_factor),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(RecError::Config(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        if self.min_interactions_collab == 0 {
            return Err(RecError::Config(
                "min_interactions_collab must be positive".to_string(),
            ));
        }
        if self.max_similar_users == 0 {
            return Err(RecError::Config(
                "max_similar_users must be positive".to_string(),
            ));
        }
        if !self.freshness_decay_days.is_finite() || self.freshness_decay_days <= 0.0 {
            return Err(RecError::Config(format!(
                "freshness_decay_days must be positive, got {}",
                self.freshness_decay_days
            )));
        }
        Ok(())
    }
}
