//! Sparse binary user-item matrix built once from the interaction log.

use recsys_core::{InteractionLog, ItemCatalog, ItemId, UserId};
use std::collections::HashMap;
use tracing::{info, warn};

/// Rows are users in order of first appearance in the log, columns are
/// catalog items in catalog order. Repeated interactions collapse to a
/// single 1; interactions with items outside the catalog are dropped.
#[derive(Debug, Clone)]
pub struct UserItemMatrix {
    /// Sorted, deduplicated column indices per row.
    rows: Vec<Vec<usize>>,
    user_to_row: HashMap<UserId, usize>,
    row_to_user: Vec<UserId>,
    column_to_item: Vec<ItemId>,
}

impl UserItemMatrix {
    pub fn build(interactions: &InteractionLog, catalog: &ItemCatalog) -> Self {
        let row_to_user: Vec<UserId> = interactions.users().to_vec();
        let user_to_row: HashMap<UserId, usize> = row_to_user
            .iter()
            .enumerate()
            .map(|(row, &user)| (user, row))
            .collect();
        let column_to_item: Vec<ItemId> = catalog.iter().map(|item| item.item_id).collect();

        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); row_to_user.len()];
        let mut dropped = 0usize;
        for interaction in interactions.iter() {
            match catalog.position(interaction.item_id) {
                Some(column) => rows[user_to_row[&interaction.user_id]].push(column),
                None => dropped += 1,
            }
        }
        for row in &mut rows {
            row.sort_unstable();
            row.dedup();
        }

        if dropped > 0 {
            warn!(
                dropped,
                "Interactions reference items missing from the catalog; excluded from user-item matrix"
            );
        }

        let matrix = Self {
            rows,
            user_to_row,
            row_to_user,
            column_to_item,
        };
        info!(
            users = matrix.n_users(),
            items = matrix.n_items(),
            nnz = matrix.nnz(),
            sparsity = matrix.sparsity(),
            "User-item matrix built"
        );
        matrix
    }

    pub fn n_users(&self) -> usize {
        self.rows.len()
    }

    pub fn n_items(&self) -> usize {
        self.column_to_item.len()
    }

    /// Number of stored ones.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Fraction of zero cells; 1.0 for an empty matrix.
    pub fn sparsity(&self) -> f64 {
        let cells = self.n_users() * self.n_items();
        if cells == 0 {
            1.0
        } else {
            1.0 - self.nnz() as f64 / cells as f64
        }
    }

    pub fn row_of(&self, user_id: UserId) -> Option<usize> {
        self.user_to_row.get(&user_id).copied()
    }

    pub fn user_at(&self, row: usize) -> UserId {
        self.row_to_user[row]
    }

    pub fn item_at(&self, column: usize) -> ItemId {
        self.column_to_item[column]
    }

    pub fn row(&self, row: usize) -> &[usize] {
        &self.rows[row]
    }

    /// Cosine similarity of two binary rows: shared items over the geometric
    /// mean of row sizes.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (ra, rb) = (&self.rows[a], &self.rows[b]);
        if ra.is_empty() || rb.is_empty() {
            return 0.0;
        }
        let shared = intersection_size(ra, rb);
        shared as f64 / ((ra.len() * rb.len()) as f64).sqrt()
    }
}

/// Size of the intersection of two sorted slices.
fn intersection_size(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}
