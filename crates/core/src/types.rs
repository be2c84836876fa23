use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type UserId = i64;
pub type ItemId = i64;
pub type CategoryId = i64;

/// Item id -> score. Ordered so that iteration, and therefore every stable
/// sort built on it, is reproducible across calls.
pub type ScoreMap = BTreeMap<ItemId, f64>;

/// A content item from the catalog. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "article_id")]
    pub item_id: ItemId,
    pub category_id: CategoryId,
    #[serde(alias = "created_at_ts")]
    pub created_at: i64,
    #[serde(default, alias = "words_count")]
    pub word_count: u32,
    #[serde(default)]
    pub publisher_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Item {
    pub fn new(item_id: ItemId, category_id: CategoryId, created_at: i64) -> Self {
        Self {
            item_id,
            category_id,
            created_at,
            word_count: 0,
            publisher_id: None,
            title: None,
        }
    }

    /// Title shown to users; catalogs without titles get a placeholder.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Article {}", self.item_id),
        }
    }
}

/// One click from the interaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    #[serde(alias = "click_article_id")]
    pub item_id: ItemId,
    #[serde(default)]
    pub session_id: i64,
    #[serde(alias = "click_timestamp")]
    pub timestamp: i64,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, session_id: i64, timestamp: i64) -> Self {
        Self {
            user_id,
            item_id,
            session_id,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    ContentBased,
    Collaborative,
    PopularityTrending,
    HybridCombination,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::ContentBased => "content-based",
            ReasonTag::Collaborative => "collaborative",
            ReasonTag::PopularityTrending => "popularity/trending",
            ReasonTag::HybridCombination => "hybrid combination",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored item handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub category_id: CategoryId,
    pub title: String,
    pub score: f64,
    pub reason: ReasonTag,
}

impl Recommendation {
    pub fn from_item(item: &Item, score: f64, reason: ReasonTag) -> Self {
        Self {
            item_id: item.item_id,
            category_id: item.category_id,
            title: item.display_title(),
            score,
            reason,
        }
    }
}
