//! Item Service - ranking pipeline and capture orchestration

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cursor::Cursor;
use crate::embedding::{EmbeddingProvider, embedding_text};
use crate::error::{ItemError, ItemResult};
use crate::extraction::{ExtractionInput, VisionExtractor, demo_product};
use crate::models::{
    BatchDeleteResult, CreateItem, ExtractRequest, ExtractionResponse, Item, ItemPage, SearchMode,
    UpdateItem,
};
use crate::repository::ItemRepository;
use crate::search::{SearchRequest, clamp_limit, post_filter};
use crate::storage::{ImageStore, PassthroughImageStore};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Items business logic.
///
/// Upstream collaborators (image store, embeddings, vision model) are
/// optional tiers: their failures are logged and the service degrades to
/// the next tier. Only repository errors reach the caller.
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    images: Arc<dyn ImageStore>,
    extractor: Option<Arc<dyn VisionExtractor>>,
    similarity_threshold: f32,
}

impl<R: ItemRepository + 'static> ItemService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            embeddings: None,
            images: Arc::new(PassthroughImageStore),
            extractor: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_embeddings(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embeddings = Some(provider);
        self
    }

    pub fn with_image_store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.images = store;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn VisionExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Durable image URL, or the source URL when storage fails.
    async fn store_image(&self, source_url: &str, owner_id: &str) -> String {
        match self.images.store(source_url, owner_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, source_url, "Image storage failed, keeping original URL");
                source_url.to_string()
            }
        }
    }

    /// Fire-and-forget embedding for a committed item.
    fn spawn_embedding(&self, item: &Item) {
        let Some(provider) = self.embeddings.clone() else {
            return;
        };
        let text = embedding_text(item);
        if text.is_empty() {
            debug!(item_id = %item.id, "Nothing to embed");
            return;
        }

        let repository = Arc::clone(&self.repository);
        let item_id = item.id.clone();
        tokio::spawn(async move {
            match provider.embed(&text).await {
                Ok(embedding) => match repository.set_embedding(&item_id, &embedding).await {
                    Ok(()) => debug!(item_id = %item_id, dimensions = embedding.len(), "Stored embedding"),
                    Err(e) => warn!(item_id = %item_id, error = %e, "Failed to store embedding"),
                },
                Err(e) => warn!(item_id = %item_id, error = %e, "Embedding generation failed"),
            }
        });
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: &str, input: CreateItem) -> ItemResult<Item> {
        let img_url = self.store_image(&input.img_url, owner_id).await;
        let item = self
            .repository
            .insert(Item::new(owner_id, input, img_url))
            .await?;
        info!(item_id = %item.id, "Created item");

        self.spawn_embedding(&item);
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: &str, id: &str) -> ItemResult<Item> {
        self.repository
            .get(owner_id, id)
            .await?
            .ok_or_else(|| ItemError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, owner_id: &str, id: &str, update: UpdateItem) -> ItemResult<Item> {
        if update.is_empty() {
            return Err(ItemError::NoFieldsToUpdate);
        }
        let reembed = update.touches_embedding();

        let item = self
            .repository
            .update(owner_id, id, update)
            .await?
            .ok_or_else(|| ItemError::NotFound(id.to_string()))?;

        if reembed {
            self.spawn_embedding(&item);
        }
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: &str) -> ItemResult<()> {
        if !self.repository.delete(owner_id, id).await? {
            return Err(ItemError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Best effort: foreign and unknown ids are skipped silently.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn batch_delete(&self, owner_id: &str, ids: &[String]) -> ItemResult<BatchDeleteResult> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let deleted = self.repository.delete_many(owner_id, &unique).await?;
        Ok(BatchDeleteResult { deleted })
    }

    /// Semantic ranking when asked for and available, otherwise structured
    /// text search with a keyset cursor.
    #[instrument(skip(self, request), fields(owner_id = %request.owner_id, semantic = request.semantic))]
    pub async fn search(&self, request: SearchRequest) -> ItemResult<ItemPage> {
        if request.wants_semantic()
            && let Some(items) = self.semantic_search(&request).await
        {
            return Ok(ItemPage {
                items,
                next_cursor: None,
                mode: SearchMode::Semantic,
            });
        }

        let items = self.repository.search(&request.text_query()).await?;
        let next_cursor = items.last().map(|last| Cursor::after(last).encode());
        Ok(ItemPage {
            items,
            next_cursor,
            mode: SearchMode::Text,
        })
    }

    /// `None` means "fall back to text".
    async fn semantic_search(&self, request: &SearchRequest) -> Option<Vec<Item>> {
        let provider = self.embeddings.as_ref()?;
        let text = request.text.as_deref()?;

        let embedding = match provider.embed(text).await {
            Ok(embedding) if !embedding.is_empty() => embedding,
            Ok(_) => {
                warn!("Empty query embedding, falling back to text search");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Query embedding failed, falling back to text search");
                return None;
            }
        };

        match self
            .repository
            .nearest(&request.owner_id, &embedding, self.similarity_threshold, request.limit)
            .await
        {
            Ok(items) if items.is_empty() => {
                debug!("No embedded neighbours, falling back to text search");
                None
            }
            Ok(items) => Some(post_filter(items, &request.filters)),
            Err(e) => {
                warn!(error = %e, "Vector search failed, falling back to text search");
                None
            }
        }
    }

    /// Nearest neighbours of a stored item, or same-category items when the
    /// source has no usable embedding.
    #[instrument(skip(self))]
    pub async fn similar(&self, owner_id: &str, id: &str, limit: Option<i64>) -> ItemResult<ItemPage> {
        let limit = clamp_limit(limit);
        let source = self.get(owner_id, id).await?;

        match self.repository.embedding(owner_id, id).await {
            Ok(Some(embedding)) => match self
                .repository
                .nearest(owner_id, &embedding, self.similarity_threshold, limit + 1)
                .await
            {
                Ok(mut items) => {
                    items.retain(|item| item.id != source.id);
                    items.truncate(limit as usize);
                    return Ok(ItemPage {
                        items,
                        next_cursor: None,
                        mode: SearchMode::Semantic,
                    });
                }
                Err(e) => warn!(error = %e, "Vector search failed, using category match"),
            },
            Ok(None) => debug!("Source item has no embedding, using category match"),
            Err(e) => warn!(error = %e, "Failed to load embedding, using category match"),
        }

        let items = self
            .repository
            .same_category(owner_id, source.category.clone(), &source.id, limit)
            .await?;
        Ok(ItemPage {
            items,
            next_cursor: None,
            mode: SearchMode::Text,
        })
    }

    /// Store the image, then describe it with the vision model (or the fixed
    /// demo payload when none is configured).
    #[instrument(skip(self, request), fields(owner_id = %owner_id))]
    pub async fn extract(&self, owner_id: &str, request: ExtractRequest) -> ItemResult<ExtractionResponse> {
        let Some(image_url) = request.image().map(str::to_string) else {
            let message = if request.raw_text.as_deref().is_some_and(|t| !t.is_empty()) {
                "Image URL is required. Text-only extraction not yet implemented."
            } else {
                "Provide imageUrl (or legacy image_url) for image analysis, or raw_text for text analysis"
            };
            return Err(ItemError::Validation(message.to_string()));
        };

        let stored_url = self.store_image(&image_url, owner_id).await;

        let product = match &self.extractor {
            Some(extractor) => {
                let input = ExtractionInput {
                    image_url,
                    source_url: request.source_url.clone(),
                    page_title: request.title.clone(),
                };
                extractor.extract(&input).await.map_err(|e| {
                    warn!(error = %e, "Extraction failed");
                    ItemError::Extraction(e.to_string())
                })?
            }
            None => {
                debug!("No vision model configured, returning demo metadata");
                demo_product()
            }
        };

        let mut response = ExtractionResponse::new(product, stored_url, request.source_url);
        response.embedding_preview = self.embedding_preview(&response).await;
        Ok(response)
    }

    async fn embedding_preview(&self, response: &ExtractionResponse) -> Option<String> {
        let provider = self.embeddings.as_ref()?;
        let text = embedding_text(response);
        if text.is_empty() {
            return None;
        }
        match provider.embed(&text).await {
            Ok(embedding) if !embedding.is_empty() => Some(format!(
                "Generated {}-dimensional embedding",
                embedding.len()
            )),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to generate embedding during extraction");
                None
            }
        }
    }

    pub async fn count(&self) -> ItemResult<u64> {
        self.repository.count().await
    }
}

impl<R: ItemRepository> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            embeddings: self.embeddings.clone(),
            images: Arc::clone(&self.images),
            extractor: self.extractor.clone(),
            similarity_threshold: self.similarity_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingError, MockEmbeddingProvider};
    use crate::extraction::{ExtractionError, MockVisionExtractor};
    use crate::models::ListItemsQuery;
    use crate::repository::{InMemoryItemRepository, MockItemRepository};
    use crate::storage::{MockImageStore, StorageError};
    use chrono::{Duration, SubsecRound, Utc};

    const OWNER: &str = "owner-a";

    fn create(title: &str) -> CreateItem {
        CreateItem {
            img_url: format!("https://cdn.example.com/{title}.jpg"),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn item(id: &str, category: Option<&str>, minutes_ago: i64) -> Item {
        let mut item = Item::new(
            OWNER,
            CreateItem {
                img_url: "https://cdn.example.com/x.jpg".into(),
                title: Some(id.to_string()),
                category: category.map(String::from),
                ..Default::default()
            },
            "https://cdn.example.com/x.jpg".into(),
        );
        item.id = id.to_string();
        item.created_at = (Utc::now() - Duration::minutes(minutes_ago)).trunc_subsecs(6);
        item
    }

    fn failing_embeddings() -> Arc<dyn EmbeddingProvider> {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .returning(|_| Err(EmbeddingError::Api("connection refused".into())));
        Arc::new(provider)
    }

    fn query(text: &str, semantic: bool) -> SearchRequest {
        SearchRequest::new(
            OWNER,
            ListItemsQuery {
                query: Some(text.to_string()),
                semantic,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn create_keeps_original_url_when_storage_fails() {
        let mut store = MockImageStore::new();
        store
            .expect_store()
            .returning(|_, _| Err(StorageError::Upload("bucket missing".into())));
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()))
            .with_image_store(Arc::new(store));

        let created = service.create(OWNER, create("lamp")).await.unwrap();
        assert_eq!(created.img_url, "https://cdn.example.com/lamp.jpg");
        assert_eq!(created.title.as_deref(), Some("lamp"));
    }

    #[tokio::test]
    async fn create_uses_stored_url() {
        let mut store = MockImageStore::new();
        store
            .expect_store()
            .returning(|_, owner| Ok(format!("https://storage.example.com/{owner}/abc.jpg")));
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()))
            .with_image_store(Arc::new(store));

        let created = service.create(OWNER, create("lamp")).await.unwrap();
        assert_eq!(created.img_url, "https://storage.example.com/owner-a/abc.jpg");
    }

    #[tokio::test]
    async fn empty_update_is_rejected_before_touching_storage() {
        let repo = MockItemRepository::new();
        let service = ItemService::new(Arc::new(repo));
        let err = service
            .update(OWNER, "id", UpdateItem::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::NoFieldsToUpdate));
    }

    #[tokio::test]
    async fn delete_of_missing_item_is_not_found() {
        let mut repo = MockItemRepository::new();
        repo.expect_delete().returning(|_, _| Ok(false));
        let service = ItemService::new(Arc::new(repo));
        assert!(matches!(
            service.delete(OWNER, "nope").await,
            Err(ItemError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn batch_delete_deduplicates_ids() {
        let mut repo = MockItemRepository::new();
        repo.expect_delete_many()
            .times(1)
            .returning(|_, ids| Ok(ids.len() as u64));
        let service = ItemService::new(Arc::new(repo));

        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let result = service.batch_delete(OWNER, &ids).await.unwrap();
        assert_eq!(result.deleted, 2);
    }

    #[tokio::test]
    async fn semantic_search_falls_back_to_text_when_provider_fails() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let plain = ItemService::new(Arc::clone(&repo));
        plain.create(OWNER, create("lamp")).await.unwrap();
        plain.create(OWNER, create("sofa")).await.unwrap();

        let degraded = ItemService::new(Arc::clone(&repo)).with_embeddings(failing_embeddings());

        let text = plain.search(query("lamp", false)).await.unwrap();
        let semantic = degraded.search(query("lamp", true)).await.unwrap();

        assert_eq!(semantic.mode, SearchMode::Text);
        let ids = |page: &ItemPage| page.items.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&semantic), ids(&text));
        assert_eq!(semantic.next_cursor, text.next_cursor);
    }

    #[tokio::test]
    async fn semantic_search_ranks_and_filters() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let near = repo.insert(item("near", Some("Lighting"), 2)).await.unwrap();
        let far = repo.insert(item("far", Some("Lighting"), 1)).await.unwrap();
        let other = repo.insert(item("other", Some("Sofa"), 0)).await.unwrap();
        repo.set_embedding(&near.id, &[1.0, 0.0]).await.unwrap();
        repo.set_embedding(&far.id, &[0.8, 0.6]).await.unwrap();
        repo.set_embedding(&other.id, &[1.0, 0.05]).await.unwrap();

        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let service = ItemService::new(repo).with_embeddings(Arc::new(provider));

        let mut request = query("lamp", true);
        request.filters.category = Some("Lighting".into());
        let page = service.search(request).await.unwrap();

        assert_eq!(page.mode, SearchMode::Semantic);
        assert!(page.next_cursor.is_none());
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["near", "far"]);
    }

    #[tokio::test]
    async fn semantic_search_without_neighbours_uses_text() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let lamp = repo.insert(item("lamp", None, 0)).await.unwrap();
        repo.set_embedding(&lamp.id, &[0.0, 1.0]).await.unwrap();

        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let service = ItemService::new(repo).with_embeddings(Arc::new(provider));

        let page = service.search(query("lamp", true)).await.unwrap();
        assert_eq!(page.mode, SearchMode::Text);
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["lamp"]);
        assert!(page.next_cursor.is_some());
    }

    #[tokio::test]
    async fn semantic_filters_keep_items_missing_the_attribute() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let unpriced = repo.insert(item("unpriced", None, 2)).await.unwrap();
        let mut pricey = item("pricey", None, 1);
        pricey.price = Some(900.0);
        pricey.colour_hex = Some("#C4A484".into());
        let pricey = repo.insert(pricey).await.unwrap();
        repo.set_embedding(&unpriced.id, &[1.0, 0.0]).await.unwrap();
        repo.set_embedding(&pricey.id, &[1.0, 0.0]).await.unwrap();

        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let service = ItemService::new(Arc::clone(&repo)).with_embeddings(Arc::new(provider));

        let mut request = query("chair", true);
        request.filters.price_max = Some(500.0);
        let page = service.search(request).await.unwrap();
        assert_eq!(page.mode, SearchMode::Semantic);
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["unpriced"]);

        let mut request = query("chair", true);
        request.filters.colour_hex = Some("c4a4".into());
        let page = service.search(request).await.unwrap();
        assert_eq!(page.items.len(), 2);

        let mut request = query("chair", true);
        request.filters.colour_hex = Some("000000".into());
        let page = service.search(request).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["unpriced"]);
    }

    #[tokio::test]
    async fn cursor_chain_visits_identical_timestamps_once() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let created_at = Utc::now().trunc_subsecs(6);
        for id in ["a", "b", "c"] {
            let mut row = item(id, None, 0);
            row.created_at = created_at;
            repo.insert(row).await.unwrap();
        }
        let service = ItemService::new(repo);

        let mut request = SearchRequest::new(OWNER, ListItemsQuery::default());
        request.limit = 1;
        let mut seen = Vec::new();
        loop {
            let page = service.search(request.clone()).await.unwrap();
            seen.extend(page.items.iter().map(|i| i.id.clone()));
            match page.next_cursor {
                Some(cursor) if !page.items.is_empty() => {
                    request.cursor = Cursor::parse(&cursor);
                }
                _ => break,
            }
            assert!(seen.len() <= 3, "cursor chain did not terminate: {seen:?}");
        }
        assert_eq!(seen, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn text_search_sets_cursor_from_last_row() {
        let repo = Arc::new(InMemoryItemRepository::new());
        repo.insert(item("old", None, 10)).await.unwrap();
        repo.insert(item("new", None, 0)).await.unwrap();
        let service = ItemService::new(repo);

        let mut request = SearchRequest::new(OWNER, ListItemsQuery::default());
        request.limit = 1;
        let first = service.search(request.clone()).await.unwrap();
        assert_eq!(first.items[0].id, "new");

        request.cursor = first.next_cursor.as_deref().and_then(Cursor::parse);
        let second = service.search(request.clone()).await.unwrap();
        assert_eq!(second.items[0].id, "old");

        request.cursor = second.next_cursor.as_deref().and_then(Cursor::parse);
        let third = service.search(request).await.unwrap();
        assert!(third.items.is_empty());
        assert!(third.next_cursor.is_none());
    }

    #[tokio::test]
    async fn similar_excludes_source_item() {
        let repo = Arc::new(InMemoryItemRepository::new());
        for (id, vector) in [("src", [1.0, 0.0]), ("a", [0.95, 0.1]), ("b", [0.9, 0.2])] {
            repo.insert(item(id, None, 0)).await.unwrap();
            repo.set_embedding(id, &vector).await.unwrap();
        }
        let service = ItemService::new(repo);

        let page = service.similar(OWNER, "src", Some(1)).await.unwrap();
        assert_eq!(page.mode, SearchMode::Semantic);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "a");
    }

    #[tokio::test]
    async fn similar_without_embedding_uses_category() {
        let repo = Arc::new(InMemoryItemRepository::new());
        repo.insert(item("src", Some("Chair"), 3)).await.unwrap();
        repo.insert(item("same", Some("Chair"), 2)).await.unwrap();
        repo.insert(item("diff", Some("Table"), 1)).await.unwrap();
        let service = ItemService::new(repo);

        let page = service.similar(OWNER, "src", None).await.unwrap();
        assert_eq!(page.mode, SearchMode::Text);
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["same"]);
    }

    #[tokio::test]
    async fn similar_of_unknown_item_is_not_found() {
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()));
        assert!(matches!(
            service.similar(OWNER, "missing", None).await,
            Err(ItemError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn extract_requires_an_image() {
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()));

        let err = service.extract(OWNER, ExtractRequest::default()).await.unwrap_err();
        assert!(err.to_string().starts_with("Provide imageUrl"));

        let text_only = ExtractRequest {
            raw_text: Some("Oak table".into()),
            ..Default::default()
        };
        let err = service.extract(OWNER, text_only).await.unwrap_err();
        assert!(err.to_string().starts_with("Image URL is required"));
    }

    #[tokio::test]
    async fn extract_without_model_returns_demo_payload() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| Ok(vec![0.1; 1536]));
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()))
            .with_embeddings(Arc::new(provider));

        let request = ExtractRequest {
            image_url: Some("https://cdn.example.com/chair.jpg".into()),
            source_url: Some("https://www.wayfair.com/chair".into()),
            ..Default::default()
        };
        let response = service.extract(OWNER, request).await.unwrap();
        assert_eq!(response.title, "Modern Furniture Piece");
        assert_eq!(response.img_url, "https://cdn.example.com/chair.jpg");
        assert_eq!(response.src_url.as_deref(), Some("https://www.wayfair.com/chair"));
        assert_eq!(
            response.embedding_preview.as_deref(),
            Some("Generated 1536-dimensional embedding")
        );
    }

    #[tokio::test]
    async fn extractor_failure_is_reported() {
        let mut extractor = MockVisionExtractor::new();
        extractor
            .expect_extract()
            .returning(|_| Err(ExtractionError::EmptyResponse));
        let service = ItemService::new(Arc::new(InMemoryItemRepository::new()))
            .with_extractor(Arc::new(extractor));

        let request = ExtractRequest {
            legacy_image_url: Some("https://cdn.example.com/chair.jpg".into()),
            ..Default::default()
        };
        let err = service.extract(OWNER, request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "AI extraction failed: Empty response from OpenAI API"
        );
    }
}
