//! Shared domain model for the hybrid recommender: item and interaction
//! records, the read-only data collaborators, typed configuration and errors.

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod error;
pub mod types;

pub use catalog::{InteractionLog, ItemCatalog};
pub use config::RecommendationConfig;
pub use embedding::EmbeddingStore;
pub use error::{RecError, RecResult};
pub use types::{
    CategoryId, Interaction, Item, ItemId, ReasonTag, Recommendation, ScoreMap, UserId,
};
