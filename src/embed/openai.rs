use crate::config::EmbeddingConfig;
use crate::embed::{Embedder, Embedding};
use crate::upstream::{build_client, post_json, secret_header};
use crate::{Error, Result};
use futures::future::BoxFuture;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Embedder for any OpenAI-compatible `/embeddings` endpoint.
///
/// Works against the hosted API as well as local model servers that speak
/// the same protocol, which is how the local-corpus pipeline is usually run.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: EmbeddingInput<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(header::AUTHORIZATION, secret_header(&format!("Bearer {key}"))?);
        }

        Ok(Self {
            client: build_client(headers, timeout)?,
            url: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    async fn request(&self, input: EmbeddingInput<'_>, expected: usize) -> Result<Vec<Embedding>> {
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };
        let mut response: EmbeddingResponse =
            post_json(&self.client, &self.url, &body, "Embedding API").await?;

        if response.data.len() != expected {
            return Err(Error::MalformedUpstreamResponse(format!(
                "Embedding API returned {} vectors for {} inputs",
                response.data.len(),
                expected
            )));
        }

        response.data.sort_by_key(|item| item.index);
        debug!("Embedded {} texts with {}", expected, self.model);
        Ok(response.data.into_iter().map(|item| item.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding>> {
        Box::pin(async move {
            let mut embeddings = self.request(EmbeddingInput::One(text), 1).await?;
            embeddings.pop().ok_or_else(|| {
                Error::MalformedUpstreamResponse("Embedding API returned no vectors".to_string())
            })
        })
    }

    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Embedding>>> {
        Box::pin(async move {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            self.request(EmbeddingInput::Many(texts), texts.len()).await
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
