//! Deterministic stand-ins for the external services.

use crate::embed::{Embedder, Embedding};
use crate::filter::ScoredCandidate;
use crate::index::{IndexedRecipe, VectorIndex};
use crate::{Error, Result};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const VOCABULARY: &[&str] = &[
    "rice", "garlic", "salt", "tomato", "onion", "water", "egg", "soy", "sauce", "butter",
];

/// Bag-of-words embedder over a small fixed vocabulary
#[derive(Default)]
pub struct WordEmbedder {
    calls: AtomicUsize,
}

impl WordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for WordEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            let mut vector = vec![0.0; VOCABULARY.len() + 1];
            for word in text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                let word = word.to_lowercase();
                let slot = VOCABULARY
                    .iter()
                    .position(|v| *v == word)
                    .unwrap_or(VOCABULARY.len());
                vector[slot] += 1.0;
            }
            Ok(vector)
        })
    }

    fn model_name(&self) -> &str {
        "word-counts"
    }
}

/// Embedder whose service is always down
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Embedding>> {
        Box::pin(async { Err(Error::UpstreamUnavailable("connection refused".to_string())) })
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

/// Index that always answers with the same candidates and records upserts
#[derive(Default)]
pub struct StaticIndex {
    candidates: Vec<ScoredCandidate>,
    pub upserted: Mutex<Vec<IndexedRecipe>>,
}

impl StaticIndex {
    pub fn new(candidates: Vec<ScoredCandidate>) -> Self {
        Self {
            candidates,
            upserted: Mutex::new(Vec::new()),
        }
    }
}

impl VectorIndex for StaticIndex {
    fn query<'a>(&'a self, _vector: &'a [f32], top_k: usize) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>> {
        Box::pin(async move { Ok(self.candidates.iter().take(top_k).cloned().collect()) })
    }

    fn upsert<'a>(&'a self, vectors: &'a [IndexedRecipe]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.upserted
                .lock()
                .map_err(|_| Error::Internal("upsert log poisoned".to_string()))?
                .extend_from_slice(vectors);
            Ok(())
        })
    }
}
