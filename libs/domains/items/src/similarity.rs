//! In-process cosine ranking, used when the database has no vector operator.
//!
//! Every call scans all embedded items of one owner, so cost grows linearly
//! with the size of that owner's library.

use crate::models::Item;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Keep candidates with similarity above `threshold`, best first, at most `limit`.
pub fn rank(
    candidates: impl IntoIterator<Item = (Item, Vec<f32>)>,
    query: &[f32],
    threshold: f32,
    limit: usize,
) -> Vec<Item> {
    let mut scored: Vec<(f32, Item)> = candidates
        .into_iter()
        .filter_map(|(item, embedding)| {
            cosine_similarity(query, &embedding)
                .filter(|score| *score > threshold)
                .map(|score| (score, item))
        })
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.truncate(limit);
    scored.into_iter().map(|(_, item)| item).collect()
}
