//! Items Domain
//!
//! Captured products, their storage, AI metadata extraction, embeddings,
//! and the keyword / semantic ranking pipeline.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐   ┌──────────────────────────────┐
//! │   Service   │ → │ ImageStore · Embeddings · AI │
//! └──────┬──────┘   └──────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + Postgres / in-memory implementations
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_items::{ItemService, InMemoryItemRepository, handlers};
//!
//! let service = ItemService::new(Arc::new(InMemoryItemRepository::new()));
//! let router = handlers::router(service);
//! ```

pub mod cursor;
pub mod embedding;
pub mod entity;
pub mod error;
pub mod extraction;
mod fetch;
pub mod handlers;
pub mod models;
pub mod openai;
pub mod postgres;
pub mod repository;
pub mod search;
pub mod service;
pub mod similarity;
pub mod storage;

pub use cursor::Cursor;
pub use embedding::{EmbeddingProvider, OpenAIEmbeddings, embedding_text};
pub use error::{ItemError, ItemResult};
pub use extraction::{ExtractedProduct, OpenAIVisionExtractor, VisionExtractor};
pub use handlers::ApiDoc;
pub use models::{
    BatchDelete, BatchDeleteResult, CreateItem, ExtractRequest, ExtractionResponse, Item,
    ItemPage, ListItemsQuery, SearchMode, SimilarQuery, UpdateItem,
};
pub use openai::OpenAIConfig;
pub use postgres::PgItemRepository;
pub use repository::{InMemoryItemRepository, ItemQuery, ItemRepository, StructuredFilters};
pub use search::SearchRequest;
pub use service::ItemService;
pub use storage::{
    ImageStore, PassthroughImageStore, StorageError, SupabaseImageStore, SupabaseStorageConfig,
};
