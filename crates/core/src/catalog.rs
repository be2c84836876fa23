//! Read-only views over the item metadata and the interaction log.

use crate::types::{Interaction, Item, ItemId, UserId};
use std::collections::{HashMap, HashSet};

/// Ordered item collection, queryable by item id.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    /// Build a catalog. A repeated item id keeps its first record.
    pub fn new(items: Vec<Item>) -> Self {
        let mut kept = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for item in items {
            if index.contains_key(&item.item_id) {
                tracing::warn!(item_id = item.item_id, "Duplicate catalog entry ignored");
                continue;
            }
            index.insert(item.item_id, kept.len());
            kept.push(item);
        }
        Self { items: kept, index }
    }

    pub fn get(&self, item_id: ItemId) -> Option<&Item> {
        self.index.get(&item_id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    /// Position of the item in catalog order.
    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.index.get(&item_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Latest creation timestamp across the catalog.
    pub fn max_created_at(&self) -> Option<i64> {
        self.items.iter().map(|item| item.created_at).max()
    }
}

/// Append-only click log, indexed by user.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    records: Vec<Interaction>,
    by_user: HashMap<UserId, Vec<usize>>,
    user_order: Vec<UserId>,
}

impl InteractionLog {
    pub fn new(records: Vec<Interaction>) -> Self {
        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        let mut user_order = Vec::new();
        for (i, record) in records.iter().enumerate() {
            by_user
                .entry(record.user_id)
                .or_insert_with(|| {
                    user_order.push(record.user_id);
                    Vec::new()
                })
                .push(i);
        }
        Self {
            records,
            by_user,
            user_order,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Users in order of their first appearance in the log.
    pub fn users(&self) -> &[UserId] {
        &self.user_order
    }

    /// The user's interactions in log order. Unknown users have none.
    pub fn for_user(&self, user_id: UserId) -> impl Iterator<Item = &Interaction> + '_ {
        self.by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.records[i])
    }

    pub fn interaction_count(&self, user_id: UserId) -> usize {
        self.by_user.get(&user_id).map_or(0, Vec::len)
    }

    /// Distinct items the user has interacted with.
    pub fn history(&self, user_id: UserId) -> HashSet<ItemId> {
        self.for_user(user_id).map(|r| r.item_id).collect()
    }

    /// The user's `k` most recent interactions, newest first. Equal
    /// timestamps keep log order.
    pub fn most_recent(&self, user_id: UserId, k: usize) -> Vec<&Interaction> {
        let mut records: Vec<&Interaction> = self.for_user(user_id).collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(k);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_and_duplicates() {
        let catalog = ItemCatalog::new(vec![
            Item::new(10, 1, 100),
            Item::new(11, 2, 300),
            Item::new(10, 9, 999),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(10).unwrap().category_id, 1);
        assert_eq!(catalog.position(11), Some(1));
        assert!(!catalog.contains(12));
        assert_eq!(catalog.max_created_at(), Some(300));
    }

    #[test]
    fn test_log_history_and_counts() {
        let log = InteractionLog::new(vec![
            Interaction::new(1, 10, 1, 100),
            Interaction::new(2, 10, 2, 150),
            Interaction::new(1, 11, 1, 200),
            Interaction::new(1, 10, 3, 300),
        ]);
        assert_eq!(log.users(), &[1, 2]);
        assert_eq!(log.interaction_count(1), 3);
        assert_eq!(log.interaction_count(99), 0);
        assert_eq!(log.history(1).len(), 2);
        assert!(log.history(99).is_empty());
    }

    #[test]
    fn test_most_recent_orders_by_timestamp() {
        let log = InteractionLog::new(vec![
            Interaction::new(1, 10, 1, 300),
            Interaction::new(1, 11, 1, 100),
            Interaction::new(1, 12, 1, 200),
        ]);
        let recent: Vec<ItemId> = log.most_recent(1, 2).iter().map(|r| r.item_id).collect();
        assert_eq!(recent, vec![10, 12]);
    }
}
