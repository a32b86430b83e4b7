//! pgvector interop.
//!
//! Embeddings are bound as text literals (`'[0.1,0.2,...]'::vector`) so the
//! entities never need a native vector column type.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

/// Width of `text-embedding-3-small` vectors.
pub const EMBEDDING_DIMENSIONS: usize = 1536;

/// Whether the `vector` extension is installed in the connected database.
pub async fn has_vector_extension<C: ConnectionTrait>(db: &C) -> Result<bool, DbErr> {
    let row = db
        .query_one_raw(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'vector') AS present"
                .to_owned(),
        ))
        .await?;

    match row {
        Some(row) => row.try_get::<bool>("", "present"),
        None => Ok(false),
    }
}

pub fn format_vector_literal(values: &[f32]) -> String {
    let mut out = String::with_capacity(values.len() * 10 + 2);
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parse the text form pgvector returns for `embedding::text`.
pub fn parse_vector_literal(raw: &str) -> Option<Vec<f32>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect()
}
