use crate::api::models::{RecipesResponse, RecommendRequest, RecommendResponse};
use crate::config::Settings;
use crate::embed::OpenAiEmbedder;
use crate::filter::{FilterPolicy, ScoredCandidate};
use crate::index::{upload_corpus, PineconeIndex};
use crate::recipe::{Corpus, Recipe};
use crate::{Error, Result};
use regex::Regex;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Split ingredient arguments on commas and whitespace, like the web client
pub fn split_ingredients<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>> {
    let separator =
        Regex::new(r"[,\s]+").map_err(|e| Error::Internal(format!("Invalid separator pattern: {e}")))?;

    Ok(args
        .iter()
        .flat_map(|arg| {
            separator
                .split(arg.as_ref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect())
}

/// Ask a server for recommendations and print them
pub async fn recommend(
    server_url: &str,
    ingredients: &[String],
    filter: FilterPolicy,
    allowed_extras: usize,
) -> Result<()> {
    let request = RecommendRequest {
        ingredients: split_ingredients(ingredients)?,
        filter_type: filter,
        allowed_extras,
    };

    let response = Client::new()
        .post(format!("{}/recommend", server_url.trim_end_matches('/')))
        .json(&request)
        .send()
        .await?;

    let results: RecommendResponse = read_json(response).await?;
    print!("{}", format_recommendations(&results.results));

    Ok(())
}

/// Print every recipe a server knows
pub async fn list_recipes(server_url: &str) -> Result<()> {
    let response = Client::new()
        .get(format!("{}/all_recipes", server_url.trim_end_matches('/')))
        .send()
        .await?;

    let recipes: RecipesResponse = read_json(response).await?;
    for recipe in &recipes.results {
        println!("{}", format_recipe(recipe));
    }
    println!("{} recipes", recipes.results.len());

    Ok(())
}

/// Embed a dataset and upload it to the configured vector index
pub async fn upload(settings: &Settings, recipes_path: &Path, batch_size: usize) -> Result<usize> {
    let corpus = Corpus::load(recipes_path).await?;
    let embedder = OpenAiEmbedder::new(&settings.embedding, settings.upstream_timeout())?;
    let index = PineconeIndex::new(&settings.index, settings.upstream_timeout())?;

    info!(
        "Uploading {} recipes in batches of {}",
        corpus.len(),
        batch_size
    );
    upload_corpus(&corpus, &embedder, &index, batch_size).await
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "no error details".to_string());
        return Err(Error::UpstreamUnavailable(format!(
            "Server returned {status}: {message}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| Error::MalformedUpstreamResponse(format!("Unexpected server response: {e}")))
}

// Helper functions

fn format_details(recipe: &Recipe) -> String {
    format!(
        "   Ingredients: {}\n   {}\n",
        recipe.ingredients.join(", "),
        recipe.instructions
    )
}

fn format_recipe(recipe: &Recipe) -> String {
    format!("{}\n{}", recipe.name, format_details(recipe))
}

fn format_recommendations(results: &[ScoredCandidate]) -> String {
    if results.is_empty() {
        return "No recipes found\n".to_string();
    }

    let mut out = format!("Found {} recipes:\n\n", results.len());
    for (i, candidate) in results.iter().enumerate() {
        let score = candidate
            .similarity
            .map(|s| format!(" (similarity {s:.3})"))
            .unwrap_or_default();
        out.push_str(&format!("{}. {}{}\n", i + 1, candidate.recipe.name, score));
        out.push_str(&format_details(&candidate.recipe));
    }
    out
}
