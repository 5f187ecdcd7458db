use crate::config::PipelineKind;
use crate::filter::ScoredCandidate;
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// Body of `POST /recommend`
pub use crate::filter::Query as RecommendRequest;

/// Ranked recommendations, at most ten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub results: Vec<ScoredCandidate>,
}

/// Every recipe in the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub results: Vec<Recipe>,
}

/// Body of `POST /ai_recipe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRecipeRequest {
    pub ingredients: Vec<String>,
}

/// Generated recipe text, relayed verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRecipeResponse {
    pub recipe: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub recipes: usize,
    pub pipeline: PipelineKind,
    pub generation: bool,
}
