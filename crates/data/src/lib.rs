//! Local-filesystem loader for a prepared news dataset.
//!
//! ```text
//! <dir>/articles_metadata.json   JSON lines, one article per line
//! <dir>/user_interactions.json   JSON lines, one click per line
//! <dir>/embeddings.json          JSON array of rows, in article order
//! <dir>/data_summary.json        optional precomputed summary
//! ```

use recsys_core::embedding::rows_to_matrix;
use recsys_core::{
    EmbeddingStore, Interaction, InteractionLog, Item, ItemCatalog, RecError, RecResult,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ARTICLES_FILE: &str = "articles_metadata.json";
pub const INTERACTIONS_FILE: &str = "user_interactions.json";
pub const EMBEDDINGS_FILE: &str = "embeddings.json";
pub const SUMMARY_FILE: &str = "data_summary.json";

/// Headline counts for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_interactions: usize,
    pub total_users: usize,
    pub total_articles: usize,
    pub total_sessions: usize,
    pub embedding_dimensions: usize,
}

impl DataSummary {
    pub fn compute(
        catalog: &ItemCatalog,
        interactions: &InteractionLog,
        embeddings: &EmbeddingStore,
    ) -> Self {
        let sessions: HashSet<i64> = interactions.iter().map(|r| r.session_id).collect();
        Self {
            total_interactions: interactions.len(),
            total_users: interactions.users().len(),
            total_articles: catalog.len(),
            total_sessions: sessions.len(),
            embedding_dimensions: embeddings.dimension(),
        }
    }
}

/// Everything the engine needs, loaded once.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: ItemCatalog,
    pub interactions: InteractionLog,
    pub embeddings: EmbeddingStore,
    pub summary: DataSummary,
}

pub struct DataLoader {
    dir: PathBuf,
}

impl DataLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> RecResult<Dataset> {
        info!(dir = %self.dir.display(), "Loading dataset");

        let items: Vec<Item> = read_json_lines(&self.dir.join(ARTICLES_FILE))?;
        let catalog = ItemCatalog::new(items);
        info!(articles = catalog.len(), "Article metadata loaded");

        let records: Vec<Interaction> = read_json_lines(&self.dir.join(INTERACTIONS_FILE))?;
        let interactions = InteractionLog::new(records);
        info!(interactions = interactions.len(), "User interactions loaded");

        let embeddings = self.load_embeddings(&catalog)?;
        info!(
            rows = embeddings.len(),
            dimensions = embeddings.dimension(),
            "Embeddings loaded"
        );

        let summary = match self.load_summary()? {
            Some(summary) => summary,
            None => DataSummary::compute(&catalog, &interactions, &embeddings),
        };

        Ok(Dataset {
            catalog,
            interactions,
            embeddings,
            summary,
        })
    }

    fn load_embeddings(&self, catalog: &ItemCatalog) -> RecResult<EmbeddingStore> {
        let path = self.dir.join(EMBEDDINGS_FILE);
        let rows: Vec<Vec<f32>> = serde_json::from_reader(BufReader::new(open(&path)?))
            .map_err(|e| RecError::Data(format!("{}: {}", path.display(), e)))?;
        let matrix = rows_to_matrix(rows)?;
        Ok(EmbeddingStore::from_catalog_order(catalog, matrix))
    }

    fn load_summary(&self) -> RecResult<Option<DataSummary>> {
        let path = self.dir.join(SUMMARY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        match serde_json::from_reader(BufReader::new(open(&path)?)) {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable data summary; recomputing");
                Ok(None)
            }
        }
    }
}

fn open(path: &Path) -> RecResult<File> {
    File::open(path).map_err(|e| RecError::Data(format!("{}: {}", path.display(), e)))
}

/// Parse one JSON record per non-blank line.
fn read_json_lines<T: DeserializeOwned>(path: &Path) -> RecResult<Vec<T>> {
    let mut records = Vec::new();
    for (line_number, line) in BufReader::new(open(path)?).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
            RecError::Data(format!("{}:{}: {}", path.display(), line_number + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}
