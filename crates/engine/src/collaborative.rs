//! User-based collaborative filtering over the binary user-item matrix.
//!
//! Neighbours are the most cosine-similar users with positive similarity.
//! Each neighbour casts one vote for every item it interacted with; votes are
//! not weighted by similarity.

use crate::matrix::UserItemMatrix;
use crate::normalize::normalize_scores;
use recsys_core::{InteractionLog, ScoreMap, UserId};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

pub struct CollaborativeScorer {
    max_similar_users: usize,
}

impl CollaborativeScorer {
    pub fn new(max_similar_users: usize) -> Self {
        Self { max_similar_users }
    }

    /// Up to `max_similar_users` neighbour rows with similarity > 0, most
    /// similar first. Ties keep row order.
    pub fn similar_users(&self, matrix: &UserItemMatrix, row: usize) -> Vec<(usize, f64)> {
        let mut neighbours: Vec<(usize, f64)> = (0..matrix.n_users())
            .filter(|&other| other != row)
            .map(|other| (other, matrix.cosine(row, other)))
            .filter(|&(_, similarity)| similarity > 0.0)
            .collect();

        neighbours.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        neighbours.truncate(self.max_similar_users);
        neighbours
    }

    /// Normalized neighbour vote counts for items outside the user's history.
    /// Empty for users without a matrix row or without neighbours.
    pub fn score(
        &self,
        user_id: UserId,
        matrix: &UserItemMatrix,
        interactions: &InteractionLog,
    ) -> ScoreMap {
        let Some(row) = matrix.row_of(user_id) else {
            debug!(user_id, "User not in interaction matrix; collaborative scores empty");
            return ScoreMap::new();
        };

        let neighbours = self.similar_users(matrix, row);
        if neighbours.is_empty() {
            debug!(user_id, "No similar users found; collaborative scores empty");
            return ScoreMap::new();
        }

        let mut votes = ScoreMap::new();
        for &(neighbour, _) in &neighbours {
            for &column in matrix.row(neighbour) {
                *votes.entry(matrix.item_at(column)).or_insert(0.0) += 1.0;
            }
        }

        let history: HashSet<_> = interactions.history(user_id);
        votes.retain(|item_id, _| !history.contains(item_id));

        debug!(
            user_id,
            neighbours = neighbours.len(),
            candidates = votes.len(),
            "Collaborative scores computed"
        );
        normalize_scores(&votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsys_core::{Interaction, Item, ItemCatalog};

    fn fixture() -> (UserItemMatrix, InteractionLog) {
        let catalog = ItemCatalog::new((1..=6).map(|id| Item::new(id, 1, 0)).collect());
        let log = InteractionLog::new(vec![
            // target
            Interaction::new(1, 1, 1, 0),
            Interaction::new(1, 2, 1, 1),
            // strong neighbour
            Interaction::new(2, 1, 2, 0),
            Interaction::new(2, 2, 2, 1),
            Interaction::new(2, 3, 2, 2),
            // weak neighbour
            Interaction::new(3, 2, 3, 0),
            Interaction::new(3, 3, 3, 1),
            Interaction::new(3, 4, 3, 2),
            Interaction::new(3, 5, 3, 3),
            // unrelated
            Interaction::new(4, 6, 4, 0),
        ]);
        let matrix = UserItemMatrix::build(&log, &catalog);
        (matrix, log)
    }

    #[test]
    fn test_neighbours_sorted_and_positive() {
        let (matrix, _) = fixture();
        let scorer = CollaborativeScorer::new(50);
        let neighbours = scorer.similar_users(&matrix, matrix.row_of(1).unwrap());
        let users: Vec<UserId> = neighbours.iter().map(|&(r, _)| matrix.user_at(r)).collect();
        assert_eq!(users, vec![2, 3]);
        assert!(neighbours[0].1 > neighbours[1].1);
    }

    #[test]
    fn test_votes_are_unweighted_counts() {
        let (matrix, log) = fixture();
        let scores = CollaborativeScorer::new(50).score(1, &matrix, &log);
        // item 3: two votes, items 4 and 5: one vote each.
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[&3], 1.0);
        assert_eq!(scores[&4], 0.0);
        assert_eq!(scores[&5], 0.0);
        assert!(!scores.contains_key(&1));
        assert!(!scores.contains_key(&6));
    }

    #[test]
    fn test_neighbour_cap() {
        let (matrix, log) = fixture();
        let scores = CollaborativeScorer::new(1).score(1, &matrix, &log);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&3], 0.5);
    }

    #[test]
    fn test_unknown_user_and_isolated_user() {
        let (matrix, log) = fixture();
        let scorer = CollaborativeScorer::new(50);
        assert!(scorer.score(99, &matrix, &log).is_empty());
        assert!(scorer.score(4, &matrix, &log).is_empty());
    }
}
