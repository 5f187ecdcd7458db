use crate::embed::{cosine_similarity, recipe_text, Embedder, Embedding};
use crate::recipe::Corpus;
use crate::{Error, Result};
use tracing::info;

/// Texts sent per embedding call while building the matrix
pub const EMBED_BATCH_SIZE: usize = 64;

/// Precomputed recipe embeddings; row `i` belongs to corpus recipe `i`.
///
/// Built once at startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMatrix {
    rows: Vec<Embedding>,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Wrap existing rows, checking they all share one dimension
    pub fn from_rows(rows: Vec<Embedding>) -> Result<Self> {
        let dimension = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(Error::MalformedUpstreamResponse(format!(
                "Embedding {} has dimension {}, expected {}",
                i,
                row.len(),
                dimension
            )));
        }
        Ok(Self { rows, dimension })
    }

    /// Embed every recipe in the corpus
    pub async fn build(corpus: &Corpus, embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = corpus.iter().map(recipe_text).collect();
        let mut rows = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let embeddings = embedder.embed_batch(batch).await?;
            if embeddings.len() != batch.len() {
                return Err(Error::MalformedUpstreamResponse(format!(
                    "Embedder returned {} vectors for {} recipes",
                    embeddings.len(),
                    batch.len()
                )));
            }
            rows.extend(embeddings);
        }

        let matrix = Self::from_rows(rows)?;
        info!(
            "Embedded {} recipes with {} (dimension {})",
            matrix.len(),
            embedder.model_name(),
            matrix.dimension()
        );
        Ok(matrix)
    }

    /// Cosine similarity of `query` against every row, in row order
    pub fn similarities(&self, query: &[f32]) -> Result<Vec<f32>> {
        if !self.rows.is_empty() && query.len() != self.dimension {
            return Err(Error::MalformedUpstreamResponse(format!(
                "Query embedding has dimension {}, corpus uses {}",
                query.len(),
                self.dimension
            )));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| cosine_similarity(query, row))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
