use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub pipeline: PipelineKind,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub generation: GenerationConfig,
    pub upstream_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

/// Which retrieval pipeline scores candidates before filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Embed the whole corpus at startup and scan it per query
    Local,
    /// Ask an external vector index for nearest neighbours
    Index,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineKind::Local => f.write_str("local"),
            PipelineKind::Index => f.write_str("index"),
        }
    }
}

impl FromStr for PipelineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(PipelineKind::Local),
            "index" => Ok(PipelineKind::Index),
            other => Err(Error::Config(format!(
                "Invalid RECOMMEND_PIPELINE value: {other}. Must be local or index"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub api_key: Option<String>,
    /// Data-plane URL of the index
    pub host: Option<String>,
    pub namespace: Option<String>,
    /// Neighbours fetched before filtering
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let host = var_or("HOST", "0.0.0.0");
        let port = parse(&var_or("PORT", "8000"), "PORT")?;
        let api_rate_limit = parse(&var_or("API_RATE_LIMIT", "50"), "API_RATE_LIMIT")?;
        let max_request_body_size = parse(
            &var_or("MAX_REQUEST_BODY_SIZE", "65536"),
            "MAX_REQUEST_BODY_SIZE",
        )?;
        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let corpus_path = var_or("RECIPES_PATH", "recipes.json").into();
        let pipeline = var_or("RECOMMEND_PIPELINE", "local").parse()?;

        let openai_key = var("OPENAI_API_KEY");
        let embedding = EmbeddingConfig {
            base_url: var_or("EMBEDDING_BASE_URL", OPENAI_BASE_URL),
            model: var_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            api_key: var("EMBEDDING_API_KEY").or_else(|| openai_key.clone()),
        };

        let index = IndexConfig {
            api_key: var("PINECONE_API_KEY"),
            host: var("PINECONE_INDEX_HOST"),
            namespace: var("PINECONE_NAMESPACE"),
            top_k: parse(&var_or("INDEX_TOP_K", "30"), "INDEX_TOP_K")?,
        };

        let generation = GenerationConfig {
            base_url: var_or("GENERATION_BASE_URL", OPENAI_BASE_URL),
            model: var_or("GENERATION_MODEL", "gpt-4o-mini"),
            api_key: openai_key,
        };

        let upstream_timeout_seconds =
            parse(&var_or("UPSTREAM_TIMEOUT_SECS", "30"), "UPSTREAM_TIMEOUT_SECS")?;

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                api_rate_limit,
                max_request_body_size,
                cors_origins,
            },
            corpus: CorpusConfig { path: corpus_path },
            pipeline,
            embedding,
            index,
            generation,
            upstream_timeout_seconds,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("Rate limit must be non-zero".to_string()));
        }

        if self.index.top_k == 0 {
            return Err(Error::Config("INDEX_TOP_K must be at least 1".to_string()));
        }

        if self.upstream_timeout_seconds == 0 {
            return Err(Error::Config("UPSTREAM_TIMEOUT_SECS must be non-zero".to_string()));
        }

        let embedding_url = check_base_url(&self.embedding.base_url, "EMBEDDING_BASE_URL")?;
        check_base_url(&self.generation.base_url, "GENERATION_BASE_URL")?;

        // Hosted embeddings always need a key; local model servers usually don't
        if embedding_url.host_str() == Some("api.openai.com") && self.embedding.api_key.is_none() {
            return Err(Error::Config(
                "EMBEDDING_API_KEY or OPENAI_API_KEY is required for hosted embeddings".to_string(),
            ));
        }

        if self.pipeline == PipelineKind::Index {
            if self.index.api_key.is_none() {
                return Err(Error::Config(
                    "PINECONE_API_KEY is required for the index pipeline".to_string(),
                ));
            }
            match &self.index.host {
                Some(host) => {
                    check_base_url(host, "PINECONE_INDEX_HOST")?;
                }
                None => {
                    return Err(Error::Config(
                        "PINECONE_INDEX_HOST is required for the index pipeline".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Base URL the CLI uses to reach a running server
    pub fn server_url(&self) -> String {
        let host = if self.server.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            &self.server.host
        };
        format!("http://{}:{}", host, self.server.port)
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {key} value")))
}

fn check_base_url(value: &str, key: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| Error::Config(format!("Invalid {key}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "{key} must use http or https, got {other}"
        ))),
    }
}
