//! "Invent a recipe" relay.
//!
//! Formats a prompt from the user's ingredients, sends it to an
//! OpenAI-compatible chat-completions endpoint and hands back the first
//! answer untouched.

use crate::config::GenerationConfig;
use crate::upstream::{build_client, post_json, secret_header};
use crate::{Error, Result};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct RecipeGenerator {
    /// `None` when no credential is configured; every call then fails
    client: Option<Client>,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Prompt asking for a recipe built from the given ingredients
pub fn build_prompt<S: AsRef<str>>(ingredients: &[S]) -> String {
    let list = ingredients
        .iter()
        .map(|i| i.as_ref().trim())
        .filter(|i| !i.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Create a recipe using the following ingredients: {list}. \
         You may add common pantry staples such as salt, pepper, oil or water. \
         Give the recipe a name, list the ingredients, and write numbered step-by-step instructions."
    )
}

impl RecipeGenerator {
    pub fn new(config: &GenerationConfig, timeout: Duration) -> Result<Self> {
        let client = match &config.api_key {
            Some(key) => {
                let mut headers = header::HeaderMap::new();
                headers.insert(header::AUTHORIZATION, secret_header(&format!("Bearer {key}"))?);
                Some(build_client(headers, timeout)?)
            }
            None => None,
        };

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generate a recipe and return the model's text verbatim
    pub async fn generate<S: AsRef<str>>(&self, ingredients: &[S]) -> Result<String> {
        if ingredients.iter().all(|i| i.as_ref().trim().is_empty()) {
            return Err(Error::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        let client = self.client.as_ref().ok_or_else(|| {
            Error::MissingCredential("OPENAI_API_KEY is not configured".to_string())
        })?;

        let prompt = build_prompt(ingredients);
        debug!("Requesting generated recipe from {}", self.model);

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        let response: ChatResponse = post_json(client, &self.url, &body, "Generation API").await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::MalformedUpstreamResponse("Generation API returned no content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn generator(base_url: String, api_key: Option<&str>) -> RecipeGenerator {
        let config = GenerationConfig {
            base_url,
            model: "gpt-4o-mini".to_string(),
            api_key: api_key.map(str::to_string),
        };
        RecipeGenerator::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(&["egg", " spinach ", ""]);
        assert!(prompt.contains("egg, spinach."));
        assert!(prompt.contains("step-by-step"));
    }

    #[tokio::test]
    async fn test_generate_relays_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "Spinach Omelette\n1. Whisk eggs."}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let recipe = generator(server.url(), Some("sk-test"))
            .generate(&["egg", "spinach"])
            .await
            .unwrap();

        assert_eq!(recipe, "Spinach Omelette\n1. Whisk eggs.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_without_key() {
        let generator = generator("http://127.0.0.1:9".to_string(), None);
        assert!(!generator.is_configured());

        let err = generator.generate(&["egg"]).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_generate_empty_ingredients() {
        let generator = generator("http://127.0.0.1:9".to_string(), Some("sk-test"));
        let empty: [&str; 0] = [];

        let err = generator.generate(&empty).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let err = generator(server.url(), Some("sk-test"))
            .generate(&["egg"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_generate_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = generator(server.url(), Some("sk-test"))
            .generate(&["egg"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedUpstreamResponse(_)));
    }
}
