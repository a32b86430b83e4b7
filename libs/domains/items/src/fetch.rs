//! Bounded image downloads shared by storage and extraction.

use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;

pub(crate) const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("image too large: {0} bytes")]
    TooLarge(usize),
}

#[derive(Debug)]
pub(crate) struct Downloaded {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// GET `url`, checking the content type with `accept` before reading the
/// body and aborting once more than `max_bytes` have arrived.
pub(crate) async fn download(
    client: &Client,
    url: &str,
    user_agent: Option<&str>,
    max_bytes: usize,
    accept: impl Fn(&str) -> bool,
) -> Result<Downloaded, FetchError> {
    let mut request = client.get(url);
    if let Some(agent) = user_agent {
        request = request.header(USER_AGENT, agent);
    }
    let mut response = request.send().await?.error_for_status()?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    if !accept(&content_type) {
        return Err(FetchError::UnsupportedType(content_type));
    }

    let declared = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if let Some(len) = declared
        && len > max_bytes
    {
        return Err(FetchError::TooLarge(len));
    }

    let mut bytes = Vec::with_capacity(declared.unwrap_or(64 * 1024).min(max_bytes));
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(FetchError::TooLarge(bytes.len() + chunk.len()));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(Downloaded {
        bytes,
        content_type,
    })
}

/// Any `image/*` type.
pub(crate) fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Formats the vision model accepts.
pub(crate) fn is_vision_format(content_type: &str) -> bool {
    ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"]
        .iter()
        .any(|fmt| content_type.contains(fmt))
}
