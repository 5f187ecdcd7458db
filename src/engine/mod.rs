//! Recommendation pipelines.
//!
//! Two ways of scoring candidates, one filter:
//! - **local**: every recipe is embedded at startup and each query is
//!   compared against the whole [`EmbeddingMatrix`];
//! - **index**: the query vector is sent to an external [`VectorIndex`]
//!   that returns its nearest recipes.
//!
//! Either way the scored candidates go through [`IngredientFilter::apply`].

pub mod local;

#[cfg(test)]
pub(crate) mod testing;

pub use local::EmbeddingMatrix;

use crate::config::PipelineKind;
use crate::embed::{query_text, Embedder};
use crate::filter::{self, FilterPolicy, IngredientFilter, Query, ScoredCandidate};
use crate::index::VectorIndex;
use crate::recipe::Corpus;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

enum Retrieval {
    Local(EmbeddingMatrix),
    Index {
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    },
}

/// Answers recommendation queries against a fixed corpus
pub struct Recommender {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn Embedder>,
    retrieval: Retrieval,
}

impl Recommender {
    /// Local-corpus pipeline: embeds the corpus before returning
    pub async fn local(corpus: Arc<Corpus>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let matrix = EmbeddingMatrix::build(&corpus, embedder.as_ref()).await?;
        Self::with_matrix(corpus, embedder, matrix)
    }

    /// Local-corpus pipeline from an already computed matrix.
    ///
    /// The matrix must hold exactly one row per corpus recipe.
    pub fn with_matrix(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn Embedder>,
        matrix: EmbeddingMatrix,
    ) -> Result<Self> {
        if matrix.len() != corpus.len() {
            return Err(Error::Internal(format!(
                "Embedding matrix has {} rows for {} recipes",
                matrix.len(),
                corpus.len()
            )));
        }

        Ok(Self {
            corpus,
            embedder,
            retrieval: Retrieval::Local(matrix),
        })
    }

    /// External-index pipeline
    pub fn with_index(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            corpus,
            embedder,
            retrieval: Retrieval::Index { index, top_k },
        }
    }

    pub fn pipeline(&self) -> PipelineKind {
        match self.retrieval {
            Retrieval::Local(_) => PipelineKind::Local,
            Retrieval::Index { .. } => PipelineKind::Index,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Rank and filter recipes for a query.
    ///
    /// An unknown filter type returns nothing without contacting any
    /// upstream service. An ingredient list with no non-blank entries has
    /// nothing to embed, so the corpus is filtered in its own order without
    /// scores.
    pub async fn recommend(&self, query: &Query) -> Result<Vec<ScoredCandidate>> {
        let filter = IngredientFilter::from_query(query);

        if filter.policy() == FilterPolicy::Unknown {
            debug!("Unknown filter type, returning no results");
            return Ok(Vec::new());
        }

        if !filter.has_ingredients() {
            debug!("Empty ingredient list, filtering corpus without similarity");
            return Ok(filter.apply(self.corpus.iter().cloned().map(ScoredCandidate::unscored)));
        }

        let text = query_text(&query.ingredients);

        let vector = self.embedder.embed(&text).await?;

        let results = match &self.retrieval {
            Retrieval::Local(matrix) => {
                let similarities = matrix.similarities(&vector)?;
                let passing = self
                    .corpus
                    .iter()
                    .zip(similarities)
                    .filter(|(recipe, _)| filter.accepts(recipe))
                    .map(|(recipe, similarity)| ScoredCandidate::scored(recipe.clone(), similarity))
                    .collect();
                filter::rank(passing)
            }
            Retrieval::Index { index, top_k } => {
                let candidates = index.query(&vector, *top_k).await?;
                filter.apply(candidates)
            }
        };

        debug!(
            "Query {:?} ({}) matched {} recipes",
            query.ingredients,
            query.filter_type,
            results.len()
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingEmbedder, StaticIndex, WordEmbedder};
    use super::*;
    use crate::recipe::Recipe;

    fn corpus() -> Arc<Corpus> {
        Arc::new(Corpus::new(vec![
            Recipe::new("Garlic Rice", ["rice", "garlic", "salt"], "Fry garlic, add rice."),
            Recipe::new("Tomato Soup", ["tomato", "onion", "water", "salt"], "Simmer tomato and onion."),
            Recipe::new("Fried Rice", ["rice", "egg", "soy sauce"], "Fry rice with egg."),
            Recipe::new("Omelette", ["egg", "butter"], "Whisk egg, cook in butter."),
        ]))
    }

    async fn local_recommender(embedder: Arc<WordEmbedder>) -> Recommender {
        Recommender::local(corpus(), embedder).await.unwrap()
    }

    fn names(results: &[ScoredCandidate]) -> Vec<&str> {
        results.iter().map(|c| c.recipe.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_local_pipeline_scores_and_filters() {
        let recommender = local_recommender(Arc::new(WordEmbedder::new())).await;
        assert_eq!(recommender.pipeline(), PipelineKind::Local);

        let results = recommender
            .recommend(&Query::new(["rice"], FilterPolicy::Loose))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|c| c.similarity.is_some()));
        assert!(results[0].similarity >= results[1].similarity);
        assert!(names(&results).contains(&"Garlic Rice"));
        assert!(names(&results).contains(&"Fried Rice"));
    }

    #[tokio::test]
    async fn test_local_pipeline_strict() {
        let recommender = local_recommender(Arc::new(WordEmbedder::new())).await;

        let results = recommender
            .recommend(&Query::new(["rice", "garlic"], FilterPolicy::Strict))
            .await
            .unwrap();

        assert_eq!(names(&results), vec!["Garlic Rice"]);
    }

    #[tokio::test]
    async fn test_local_pipeline_flexible_budget() {
        let recommender = local_recommender(Arc::new(WordEmbedder::new())).await;

        let none = recommender
            .recommend(&Query::new(["rice", "garlic"], FilterPolicy::Flexible))
            .await
            .unwrap();
        let one = recommender
            .recommend(&Query::new(["rice", "garlic"], FilterPolicy::Flexible).with_allowed_extras(1))
            .await
            .unwrap();

        assert!(none.is_empty());
        assert_eq!(names(&one), vec!["Garlic Rice"]);
    }

    #[tokio::test]
    async fn test_unknown_policy_skips_upstream() {
        let embedder = Arc::new(WordEmbedder::new());
        let recommender = local_recommender(embedder.clone()).await;
        let calls_after_build = embedder.calls();

        let results = recommender
            .recommend(&Query::new(["rice"], FilterPolicy::Unknown))
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(embedder.calls(), calls_after_build);
    }

    #[tokio::test]
    async fn test_empty_query_filters_without_scores() {
        let embedder = Arc::new(WordEmbedder::new());
        let recommender = local_recommender(embedder.clone()).await;
        let calls_after_build = embedder.calls();
        let empty: [&str; 0] = [];

        let loose = recommender
            .recommend(&Query::new(empty, FilterPolicy::Loose))
            .await
            .unwrap();
        assert_eq!(
            names(&loose),
            vec!["Garlic Rice", "Tomato Soup", "Fried Rice", "Omelette"]
        );
        assert!(loose.iter().all(|c| c.similarity.is_none()));

        let strict = recommender
            .recommend(&Query::new(empty, FilterPolicy::Strict))
            .await
            .unwrap();
        assert!(strict.is_empty());
        assert_eq!(embedder.calls(), calls_after_build);
    }

    #[tokio::test]
    async fn test_blank_ingredients_filter_without_scores() {
        let embedder = Arc::new(WordEmbedder::new());
        let recommender = local_recommender(embedder.clone()).await;
        let calls_after_build = embedder.calls();

        let results = recommender
            .recommend(&Query::new(["", "  "], FilterPolicy::Loose))
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|c| c.similarity.is_none()));
        assert_eq!(embedder.calls(), calls_after_build);
    }

    #[tokio::test]
    async fn test_blank_ingredients_need_no_embedder() {
        let recommender = Recommender::with_matrix(
            corpus(),
            Arc::new(FailingEmbedder),
            EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]; 4]).unwrap(),
        )
        .unwrap();

        let results = recommender
            .recommend(&Query::new(["", "  "], FilterPolicy::Loose))
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_matrix_must_cover_corpus() {
        let result = Recommender::with_matrix(
            corpus(),
            Arc::new(WordEmbedder::new()),
            EmbeddingMatrix::default(),
        );
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_surfaced() {
        let recommender = Recommender::with_matrix(
            corpus(),
            Arc::new(FailingEmbedder),
            EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]; 4]).unwrap(),
        )
        .unwrap();

        let err = recommender
            .recommend(&Query::new(["rice"], FilterPolicy::Loose))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_build_failure_is_surfaced() {
        let result = Recommender::local(corpus(), Arc::new(FailingEmbedder)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_index_pipeline_filters_candidates() {
        let index = StaticIndex::new(vec![
            ScoredCandidate::scored(
                Recipe::new("Fried Rice", ["rice", "egg", "soy sauce"], ""),
                0.7,
            ),
            ScoredCandidate::scored(Recipe::new("Garlic Rice", ["rice", "garlic", "salt"], ""), 0.9),
            ScoredCandidate::scored(Recipe::new("Omelette", ["egg", "butter"], ""), 0.8),
        ]);
        let recommender =
            Recommender::with_index(corpus(), Arc::new(WordEmbedder::new()), Arc::new(index), 30);
        assert_eq!(recommender.pipeline(), PipelineKind::Index);

        let results = recommender
            .recommend(&Query::new(["rice"], FilterPolicy::Loose))
            .await
            .unwrap();

        assert_eq!(names(&results), vec!["Garlic Rice", "Fried Rice"]);
        assert_eq!(results[0].similarity, Some(0.9));
    }
}
