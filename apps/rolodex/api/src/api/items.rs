use axum::Router;
use domain_items::{
    ItemService, OpenAIEmbeddings, OpenAIVisionExtractor, SupabaseImageStore, handlers,
};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> eyre::Result<Router> {
    let config = &state.config;
    let mut service = ItemService::new(Arc::clone(&state.items));

    match OpenAIEmbeddings::from_config(&config.openai)? {
        Some(embeddings) => service = service.with_embeddings(Arc::new(embeddings)),
        None => info!("OPENAI_API_KEY not set; semantic search disabled"),
    }

    match OpenAIVisionExtractor::from_config(&config.openai)? {
        Some(extractor) => service = service.with_extractor(Arc::new(extractor)),
        None => info!("Vision extraction disabled; /items/extract returns demo data"),
    }

    match SupabaseImageStore::from_config(&config.storage)? {
        Some(store) => service = service.with_image_store(Arc::new(store)),
        None => info!("Supabase storage not configured; keeping original image URLs"),
    }

    Ok(handlers::router(service))
}
