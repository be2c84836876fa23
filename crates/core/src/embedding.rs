//! Fixed-dimension item embeddings addressed through an item-id -> row map.

use crate::catalog::ItemCatalog;
use crate::error::{RecError, RecResult};
use crate::types::ItemId;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    matrix: Array2<f32>,
    row_of: HashMap<ItemId, usize>,
}

impl EmbeddingStore {
    /// Pair every row of `matrix` with the id at the same position.
    pub fn new(item_ids: &[ItemId], matrix: Array2<f32>) -> RecResult<Self> {
        if item_ids.len() != matrix.nrows() {
            return Err(RecError::DimensionMismatch {
                expected: item_ids.len(),
                found: matrix.nrows(),
            });
        }
        let row_of = item_ids
            .iter()
            .enumerate()
            .map(|(row, &id)| (id, row))
            .collect();
        Ok(Self { matrix, row_of })
    }

    /// Rows are assigned to catalog items in catalog order. Items past the
    /// last row have no embedding; surplus rows are ignored.
    pub fn from_catalog_order(catalog: &ItemCatalog, matrix: Array2<f32>) -> Self {
        let rows = matrix.nrows();
        if rows != catalog.len() {
            tracing::warn!(
                catalog_items = catalog.len(),
                embedding_rows = rows,
                "Embedding row count differs from catalog size"
            );
        }
        let row_of = catalog
            .iter()
            .take(rows)
            .enumerate()
            .map(|(row, item)| (item.item_id, row))
            .collect();
        Self { matrix, row_of }
    }

    /// Build from nested rows, rejecting ragged input.
    pub fn from_rows(item_ids: &[ItemId], rows: Vec<Vec<f32>>) -> RecResult<Self> {
        let matrix = rows_to_matrix(rows)?;
        Self::new(item_ids, matrix)
    }

    pub fn get(&self, item_id: ItemId) -> Option<ArrayView1<'_, f32>> {
        self.row_of.get(&item_id).map(|&row| self.matrix.row(row))
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.row_of.contains_key(&item_id)
    }

    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn len(&self) -> usize {
        self.row_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_of.is_empty()
    }
}

/// Stack equally sized rows into a matrix.
pub fn rows_to_matrix(rows: Vec<Vec<f32>>) -> RecResult<Array2<f32>> {
    let dim = rows.first().map_or(0, Vec::len);
    let n = rows.len();
    let mut flat = Vec::with_capacity(n * dim);
    for row in rows {
        if row.len() != dim {
            return Err(RecError::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((n, dim), flat).map_err(|e| RecError::Internal(e.into()))
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot = a.dot(&b) as f64;
    let norm_a = a.dot(&a).sqrt() as f64;
    let norm_b = b.dot(&b).sqrt() as f64;
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Arithmetic mean of a set of vectors, `None` for an empty set.
pub fn mean_vector<'a>(vectors: impl IntoIterator<Item = ArrayView1<'a, f32>>) -> Option<Array1<f32>> {
    let mut sum: Option<Array1<f32>> = None;
    let mut count = 0usize;
    for v in vectors {
        match sum.as_mut() {
            Some(acc) => *acc += &v,
            None => sum = Some(v.to_owned()),
        }
        count += 1;
    }
    sum.map(|acc| acc / count as f32)
}
