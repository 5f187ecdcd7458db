//! External vector index boundary.
//!
//! The index stores one vector per recipe with the recipe itself as
//! metadata, so a nearest-neighbour query yields ready-to-filter candidates.

pub mod pinecone;

pub use pinecone::PineconeIndex;

use crate::embed::{recipe_text, Embedder, Embedding};
use crate::filter::ScoredCandidate;
use crate::recipe::{Corpus, Recipe};
use crate::{Error, Result};
use futures::future::BoxFuture;
use tracing::info;

/// Vectors written per upsert call
pub const DEFAULT_UPSERT_BATCH: usize = 100;

/// A recipe vector ready to be written to the index
#[derive(Debug, Clone)]
pub struct IndexedRecipe {
    pub id: String,
    pub values: Embedding,
    pub recipe: Recipe,
}

impl IndexedRecipe {
    /// Ids follow the corpus position: `recipe-0`, `recipe-1`, ...
    pub fn new(position: usize, values: Embedding, recipe: Recipe) -> Self {
        Self {
            id: format!("recipe-{position}"),
            values,
            recipe,
        }
    }
}

/// Trait for nearest-neighbour vector stores
pub trait VectorIndex: Send + Sync {
    /// Fetch the `top_k` nearest recipes, best match first
    fn query<'a>(&'a self, vector: &'a [f32], top_k: usize) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>>;

    /// Insert or replace recipe vectors
    fn upsert<'a>(&'a self, vectors: &'a [IndexedRecipe]) -> BoxFuture<'a, Result<()>>;
}

/// Embed every corpus recipe and write it to the index.
///
/// Returns the number of vectors written.
pub async fn upload_corpus(
    corpus: &Corpus,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    batch_size: usize,
) -> Result<usize> {
    if batch_size == 0 {
        return Err(Error::Validation("Batch size must be at least 1".to_string()));
    }

    let mut written = 0;
    for (batch_number, batch) in corpus.recipes().chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(recipe_text).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(Error::MalformedUpstreamResponse(format!(
                "Embedder returned {} vectors for {} recipes",
                embeddings.len(),
                batch.len()
            )));
        }

        let offset = batch_number * batch_size;
        let vectors: Vec<IndexedRecipe> = batch
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (recipe, values))| IndexedRecipe::new(offset + i, values, recipe.clone()))
            .collect();

        index.upsert(&vectors).await?;
        written += vectors.len();
        info!("Uploaded {}/{} recipes", written, corpus.len());
    }

    Ok(written)
}
