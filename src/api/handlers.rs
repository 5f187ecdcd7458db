use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*, config::Settings, engine::Recommender, generate::RecipeGenerator, Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub generator: Arc<RecipeGenerator>,
    pub settings: Settings,
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// POST /recommend - Rank recipes for a list of ingredients
pub async fn recommend(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>> {
    let query = json_body(body)?;
    debug!("Recommend request: {:?}", query);

    let results = state.recommender.recommend(&query).await?;

    Ok(Json(RecommendResponse { results }))
}

/// GET /all_recipes - List the whole corpus
pub async fn all_recipes(State(state): State<AppState>) -> Json<RecipesResponse> {
    debug!("All recipes request");

    Json(RecipesResponse {
        results: state.recommender.corpus().recipes().to_vec(),
    })
}

/// POST /ai_recipe - Generate a recipe from ingredients
pub async fn ai_recipe(
    State(state): State<AppState>,
    body: std::result::Result<Json<AiRecipeRequest>, JsonRejection>,
) -> Result<Json<AiRecipeResponse>> {
    let request = json_body(body)?;
    debug!("AI recipe request: {:?}", request.ingredients);

    let recipe = state.generator.generate(&request.ingredients).await?;

    Ok(Json(AiRecipeResponse { recipe }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    // The corpus and pipeline are built before the server starts listening
    Json(ReadinessResponse {
        ready: true,
        recipes: state.recommender.corpus().len(),
        pipeline: state.recommender.pipeline(),
        generation: state.generator.is_configured(),
    })
}
