//! Embedding provider contract and a local hashing embedder.
//!
//! The retrieval engine treats every provider as optional: any error from
//! [`EmbeddingProvider::embed`] sends the search down the keyword path.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::{Error, Result, Vector};

/// Default dimension for hashed text embeddings
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Trait for embedding providers.
/// Implementations must be thread-safe (Send + Sync).
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Return `Error::Embedding` when the backend is unavailable.
    fn embed(&self, text: &str) -> Result<Vector>;

    /// Number of dimensions this provider produces
    fn dimensions(&self) -> usize;

    /// Model identifier, used in logs
    fn model_id(&self) -> &str;
}

/// Deterministic trigram + word hashing into a fixed number of buckets.
/// Needs no model files, so it is always available.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("embedding dimension must be positive".into()));
        }
        Ok(Self { dim })
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vector> {
        Ok(hash_text_to_vector(text, self.dim))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        "hashing-trigram"
    }
}

fn bucket<T: Hash + ?Sized>(value: &T, dim: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    (hasher.finish() as usize) % dim
}

/// Hash character trigrams and whole words of `text` into a unit vector
fn hash_text_to_vector(text: &str, dim: usize) -> Vector {
    let mut components = vec![0.0f32; dim];
    let normalized = text.to_lowercase();

    let padded: Vec<char> = format!("  {normalized}  ").chars().collect();
    for window in padded.windows(3) {
        let trigram: String = window.iter().collect();
        components[bucket(&trigram, dim)] += 1.0;
    }

    // words contribute more than trigrams
    for word in crate::text::tokenize(&normalized) {
        components[bucket(word.as_str(), dim)] += 2.0;
    }

    let mut vector = Vector::new(components);
    vector.normalize();
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_vector() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Crop insurance").unwrap();
        let b = embedder.embed("crop INSURANCE").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dim(), DEFAULT_EMBEDDING_DIM);
    }

    #[test]
    fn test_related_text_is_closer() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let query = embedder.embed("crop insurance").unwrap();
        let near = embedder.embed("Crop Insurance Scheme").unwrap();
        let far = embedder.embed("Animal Husbandry Grant").unwrap();
        assert!(query.cosine_similarity(&near) > query.cosine_similarity(&far));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(HashingEmbedder::new(0), Err(Error::InvalidConfig(_))));
    }
}
