//! Text embedding boundary.
//!
//! The recommender never computes embeddings itself. It hands text to an
//! [`Embedder`] and compares the returned vectors with cosine similarity.
//! Queries and recipes must go through the same embedder for the scores to
//! mean anything.

pub mod openai;
pub mod similarity;

pub use openai::OpenAiEmbedder;
pub use similarity::cosine_similarity;

use crate::recipe::Recipe;
use crate::Result;
use futures::future::BoxFuture;

/// A vector embedding
pub type Embedding = Vec<f32>;

/// Trait for text embedding backends
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding>>;

    /// Embed several texts, preserving order.
    ///
    /// The default issues one call per text; backends with a batch API
    /// should override it.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Embedding>>> {
        Box::pin(async move {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.embed(text).await?);
            }
            Ok(embeddings)
        })
    }

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Text embedded for a user's ingredient list; blank entries are skipped
pub fn query_text<S: AsRef<str>>(ingredients: &[S]) -> String {
    ingredients
        .iter()
        .map(|ingredient| ingredient.as_ref().trim())
        .filter(|ingredient| !ingredient.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text embedded for a recipe: its ingredients, then its instructions
pub fn recipe_text(recipe: &Recipe) -> String {
    format!("{}. {}", recipe.ingredients.join(", "), recipe.instructions)
}
