use crate::config::IndexConfig;
use crate::filter::ScoredCandidate;
use crate::index::{IndexedRecipe, VectorIndex};
use crate::recipe::Recipe;
use crate::upstream::{build_client, post_json, secret_header};
use crate::{Error, Result};
use futures::future::BoxFuture;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Pinecone data-plane client for a single index
#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    host: String,
    namespace: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<Vector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
struct Vector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a Recipe,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

impl PineconeIndex {
    pub fn new(config: &IndexConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::MissingCredential("PINECONE_API_KEY is not set".to_string()))?;
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| Error::Config("PINECONE_INDEX_HOST is not set".to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("api-key", secret_header(api_key)?);

        Ok(Self {
            client: build_client(headers, timeout)?,
            host: host.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
        })
    }
}

impl VectorIndex for PineconeIndex {
    fn query<'a>(&'a self, vector: &'a [f32], top_k: usize) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>> {
        Box::pin(async move {
            let url = format!("{}/query", self.host);
            let body = QueryRequest {
                vector,
                top_k,
                include_metadata: true,
                namespace: self.namespace.as_deref(),
            };
            let response: QueryResponse = post_json(&self.client, &url, &body, "Vector index").await?;

            let total = response.matches.len();
            let candidates: Vec<ScoredCandidate> = response
                .matches
                .into_iter()
                .filter_map(|m| {
                    let Some(metadata) = m.metadata else {
                        warn!("Index match {} has no metadata, skipping", m.id);
                        return None;
                    };
                    match serde_json::from_value::<Recipe>(metadata) {
                        Ok(recipe) => Some(ScoredCandidate {
                            similarity: m.score,
                            recipe,
                        }),
                        Err(e) => {
                            warn!("Index match {} has unreadable metadata: {}", m.id, e);
                            None
                        }
                    }
                })
                .collect();

            debug!("Index returned {} matches ({} usable)", total, candidates.len());
            Ok(candidates)
        })
    }

    fn upsert<'a>(&'a self, vectors: &'a [IndexedRecipe]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if vectors.is_empty() {
                return Ok(());
            }

            let url = format!("{}/vectors/upsert", self.host);
            let body = UpsertRequest {
                vectors: vectors
                    .iter()
                    .map(|v| Vector {
                        id: &v.id,
                        values: &v.values,
                        metadata: &v.recipe,
                    })
                    .collect(),
                namespace: self.namespace.as_deref(),
            };
            let response: UpsertResponse = post_json(&self.client, &url, &body, "Vector index").await?;

            debug!("Upserted {} vectors", response.upserted_count);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn index(host: String) -> PineconeIndex {
        let config = IndexConfig {
            api_key: Some("pc-key".to_string()),
            host: Some(host),
            namespace: None,
            top_k: 30,
        };
        PineconeIndex::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_query_maps_matches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_header("api-key", "pc-key")
            .match_body(Matcher::Json(json!({
                "vector": [1.0, 0.0],
                "topK": 30,
                "includeMetadata": true
            })))
            .with_status(200)
            .with_body(
                json!({
                    "matches": [
                        {"id": "recipe-0", "score": 0.9, "metadata": {"name": "Garlic Rice", "ingredients": ["rice", "garlic", "salt"], "instructions": "Cook."}},
                        {"id": "recipe-1", "score": 0.5},
                        {"id": "recipe-2", "score": 0.4, "metadata": {"title": "no name"}},
                        {"id": "recipe-3", "score": 0.3, "metadata": {"name": "Pancakes", "ingredients": [{"item": "egg"}, {"item": "flour"}], "instructions": "Mix."}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let candidates = index(server.url()).query(&[1.0, 0.0], 30).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].recipe.name, "Garlic Rice");
        assert_eq!(candidates[0].similarity, Some(0.9));
        assert_eq!(candidates[1].recipe.ingredients, vec!["egg", "flour"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(503)
            .create_async()
            .await;

        let err = index(server.url()).query(&[1.0], 5).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_upsert_sends_recipe_metadata() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/vectors/upsert")
            .match_body(Matcher::Json(json!({
                "vectors": [{
                    "id": "recipe-0",
                    "values": [0.5, 0.5],
                    "metadata": {"name": "Toast", "ingredients": ["bread"], "instructions": "Toast it."}
                }]
            })))
            .with_status(200)
            .with_body(r#"{"upsertedCount": 1}"#)
            .create_async()
            .await;

        let vectors = vec![IndexedRecipe::new(
            0,
            vec![0.5, 0.5],
            Recipe::new("Toast", ["bread"], "Toast it."),
        )];
        index(server.url()).upsert(&vectors).await.unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_missing_api_key() {
        let config = IndexConfig {
            api_key: None,
            host: Some("https://index.example.com".to_string()),
            namespace: None,
            top_k: 30,
        };
        let err = PineconeIndex::new(&config, Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, Error::MissingCredential(_)));
    }
}
