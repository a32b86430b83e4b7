use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cursor::Cursor;
use crate::error::ItemResult;
use crate::models::{Item, UpdateItem};
use crate::similarity;

/// Predicates shared by text search and the semantic post-filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredFilters {
    pub category: Option<String>,
    pub vendor: Option<String>,
    /// Case-insensitive substring of `colour_hex`
    pub colour_hex: Option<String>,
    pub price_max: Option<f64>,
}

impl StructuredFilters {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(hex) = &self.colour_hex {
            let needle = hex.to_lowercase();
            let hit = item
                .colour_hex
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(max) = self.price_max
            && !item.price.is_some_and(|p| p <= max)
        {
            return false;
        }
        self.matches_labels(item)
    }

    /// Lenient form used on semantic hits: colour and price only reject
    /// items that carry a conflicting value.
    pub fn admits(&self, item: &Item) -> bool {
        if let (Some(hex), Some(colour)) = (&self.colour_hex, &item.colour_hex)
            && !colour.to_lowercase().contains(&hex.to_lowercase())
        {
            return false;
        }
        if let (Some(max), Some(price)) = (self.price_max, item.price)
            && price > max
        {
            return false;
        }
        self.matches_labels(item)
    }

    fn matches_labels(&self, item: &Item) -> bool {
        if let Some(category) = &self.category
            && item.category.as_ref() != Some(category)
        {
            return false;
        }
        if let Some(vendor) = &self.vendor
            && item.vendor.as_ref() != Some(vendor)
        {
            return false;
        }
        true
    }
}

/// Text-mode query: owner scoped, newest first.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub owner_id: String,
    pub text: Option<String>,
    pub filters: StructuredFilters,
    pub cursor: Option<Cursor>,
    pub limit: u64,
}

impl ItemQuery {
    pub fn matches(&self, item: &Item) -> bool {
        if item.owner_id != self.owner_id {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = [&item.title, &item.vendor, &item.description, &item.category]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(cursor) = &self.cursor
            && !cursor.admits(item)
        {
            return false;
        }
        self.filters.matches(item)
    }
}

/// Owner-scoped item persistence. Every lookup takes the owner so a foreign
/// id behaves exactly like a missing one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert(&self, item: Item) -> ItemResult<Item>;

    async fn get(&self, owner_id: &str, id: &str) -> ItemResult<Option<Item>>;

    /// The owner's items among `ids`, newest first. Unknown ids are skipped.
    async fn get_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<Vec<Item>>;

    async fn update(&self, owner_id: &str, id: &str, update: UpdateItem)
    -> ItemResult<Option<Item>>;

    async fn delete(&self, owner_id: &str, id: &str) -> ItemResult<bool>;

    /// Returns the number of rows removed.
    async fn delete_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<u64>;

    async fn search(&self, query: &ItemQuery) -> ItemResult<Vec<Item>>;

    /// Same owner and category as the source, source excluded, newest first.
    async fn same_category(
        &self,
        owner_id: &str,
        category: Option<String>,
        exclude_id: &str,
        limit: u64,
    ) -> ItemResult<Vec<Item>>;

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> ItemResult<()>;

    async fn embedding(&self, owner_id: &str, id: &str) -> ItemResult<Option<Vec<f32>>>;

    /// Owner's items with similarity above `threshold`, most similar first.
    async fn nearest(
        &self,
        owner_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: u64,
    ) -> ItemResult<Vec<Item>>;

    async fn count(&self) -> ItemResult<u64>;
}

#[derive(Debug, Clone)]
struct Stored {
    item: Item,
    embedding: Option<Vec<f32>>,
}

/// In-memory implementation (development and tests). Similarity is ranked
/// with [`similarity::rank`] over a full owner scan.
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<String, Stored>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: Item) -> ItemResult<Item> {
        let mut items = self.items.write().await;
        items.insert(
            item.id.clone(),
            Stored {
                item: item.clone(),
                embedding: None,
            },
        );
        tracing::debug!(item_id = %item.id, "Inserted item");
        Ok(item)
    }

    async fn get(&self, owner_id: &str, id: &str) -> ItemResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .get(id)
            .filter(|s| s.item.owner_id == owner_id)
            .map(|s| s.item.clone()))
    }

    async fn get_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut found: Vec<Item> = ids
            .iter()
            .filter_map(|id| items.get(id))
            .filter(|s| s.item.owner_id == owner_id)
            .map(|s| s.item.clone())
            .collect();
        newest_first(&mut found);
        found.dedup_by(|a, b| a.id == b.id);
        Ok(found)
    }

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateItem,
    ) -> ItemResult<Option<Item>> {
        let mut items = self.items.write().await;
        let Some(stored) = items.get_mut(id).filter(|s| s.item.owner_id == owner_id) else {
            return Ok(None);
        };
        stored.item.apply_update(update);
        Ok(Some(stored.item.clone()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> ItemResult<bool> {
        let mut items = self.items.write().await;
        if items.get(id).is_some_and(|s| s.item.owner_id == owner_id) {
            items.remove(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<u64> {
        let mut items = self.items.write().await;
        let mut deleted = 0;
        for id in ids {
            if items.get(id).is_some_and(|s| s.item.owner_id == owner_id) {
                items.remove(id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn search(&self, query: &ItemQuery) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut found: Vec<Item> = items
            .values()
            .map(|s| &s.item)
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        newest_first(&mut found);
        found.truncate(query.limit as usize);
        Ok(found)
    }

    async fn same_category(
        &self,
        owner_id: &str,
        category: Option<String>,
        exclude_id: &str,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut found: Vec<Item> = items
            .values()
            .map(|s| &s.item)
            .filter(|item| {
                item.owner_id == owner_id && item.id != exclude_id && item.category == category
            })
            .cloned()
            .collect();
        newest_first(&mut found);
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> ItemResult<()> {
        let mut items = self.items.write().await;
        if let Some(stored) = items.get_mut(id) {
            stored.embedding = Some(embedding.to_vec());
        }
        Ok(())
    }

    async fn embedding(&self, owner_id: &str, id: &str) -> ItemResult<Option<Vec<f32>>> {
        let items = self.items.read().await;
        Ok(items
            .get(id)
            .filter(|s| s.item.owner_id == owner_id)
            .and_then(|s| s.embedding.clone()))
    }

    async fn nearest(
        &self,
        owner_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;
        let candidates = items
            .values()
            .filter(|s| s.item.owner_id == owner_id)
            .filter_map(|s| s.embedding.clone().map(|e| (s.item.clone(), e)));
        Ok(similarity::rank(
            candidates,
            embedding,
            threshold,
            limit as usize,
        ))
    }

    async fn count(&self) -> ItemResult<u64> {
        Ok(self.items.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateItem;
    use chrono::{Duration, Utc};

    fn item(owner: &str, title: &str) -> Item {
        Item::new(
            owner,
            CreateItem {
                img_url: "https://example.com/i.jpg".into(),
                title: Some(title.into()),
                ..Default::default()
            },
            "https://example.com/i.jpg".into(),
        )
    }

    #[test]
    fn missing_price_fails_text_filter_but_passes_semantic_filter() {
        let filters = StructuredFilters {
            price_max: Some(500.0),
            colour_hex: Some("#FFF".into()),
            ..Default::default()
        };
        let bare = item("alice", "Stool");
        assert!(!filters.matches(&bare));
        assert!(filters.admits(&bare));

        let mut priced = item("alice", "Stool");
        priced.price = Some(650.0);
        priced.colour_hex = Some("#fff8e7".into());
        assert!(!filters.matches(&priced));
        assert!(!filters.admits(&priced));

        priced.price = Some(120.0);
        assert!(filters.matches(&priced));
        assert!(filters.admits(&priced));

        let labelled = StructuredFilters {
            category: Some("Chair".into()),
            ..Default::default()
        };
        assert!(!labelled.admits(&bare));
    }

    #[tokio::test]
    async fn foreign_items_are_invisible() {
        let repo = InMemoryItemRepository::new();
        let mine = repo.insert(item("alice", "Sofa")).await.unwrap();

        assert!(repo.get("bob", &mine.id).await.unwrap().is_none());
        assert!(!repo.delete("bob", &mine.id).await.unwrap());
        assert!(
            repo.update("bob", &mine.id, UpdateItem::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(repo.get("alice", &mine.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_many_only_counts_own_items() {
        let repo = InMemoryItemRepository::new();
        let a = repo.insert(item("alice", "A")).await.unwrap();
        let b = repo.insert(item("bob", "B")).await.unwrap();

        let deleted = repo
            .delete_many("alice", &[a.id.clone(), b.id.clone(), "missing".into()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.get("bob", &b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn search_matches_text_case_insensitively() {
        let repo = InMemoryItemRepository::new();
        repo.insert(item("alice", "Brass Floor Lamp")).await.unwrap();
        repo.insert(item("alice", "Linen Sofa")).await.unwrap();

        let found = repo
            .search(&ItemQuery {
                owner_id: "alice".into(),
                text: Some("LAMP".into()),
                limit: 20,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title.as_deref(), Some("Brass Floor Lamp"));
    }

    #[tokio::test]
    async fn search_orders_by_created_at_then_id() {
        let repo = InMemoryItemRepository::new();
        let now = Utc::now();
        for (id, offset) in [("a", 0), ("b", 0), ("c", 1)] {
            let mut it = item("alice", id);
            it.id = id.into();
            it.created_at = now - Duration::seconds(offset);
            repo.insert(it).await.unwrap();
        }

        let found = repo
            .search(&ItemQuery {
                owner_id: "alice".into(),
                limit: 20,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn filters_require_price_for_price_max() {
        let filters = StructuredFilters {
            price_max: Some(100.0),
            ..Default::default()
        };
        let mut it = item("alice", "x");
        assert!(!filters.matches(&it));
        it.price = Some(100.0);
        assert!(filters.matches(&it));
        it.price = Some(100.5);
        assert!(!filters.matches(&it));
    }

    #[test]
    fn colour_filter_is_substring() {
        let filters = StructuredFilters {
            colour_hex: Some("e9e4".into()),
            ..Default::default()
        };
        let mut it = item("alice", "x");
        it.colour_hex = Some("#E9E4DC".into());
        assert!(filters.matches(&it));
        it.colour_hex = None;
        assert!(!filters.matches(&it));
    }

    #[tokio::test]
    async fn nearest_uses_stored_embeddings() {
        let repo = InMemoryItemRepository::new();
        let a = repo.insert(item("alice", "A")).await.unwrap();
        let b = repo.insert(item("alice", "B")).await.unwrap();
        repo.set_embedding(&a.id, &[1.0, 0.0]).await.unwrap();
        repo.set_embedding(&b.id, &[0.0, 1.0]).await.unwrap();

        let found = repo.nearest("alice", &[1.0, 0.1], 0.7, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
        assert!(repo.nearest("bob", &[1.0, 0.1], 0.7, 10).await.unwrap().is_empty());
    }
}
