mod openai;
mod provider;
mod text;

pub use openai::OpenAIEmbeddings;
pub use provider::{EmbeddingError, EmbeddingProvider};
pub use text::{EmbeddingFields, embedding_text};

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
