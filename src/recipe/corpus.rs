use crate::error::{Error, Result};
use crate::recipe::Recipe;
use std::path::Path;
use tracing::info;

/// The fixed, read-only recipe dataset.
///
/// Loaded once at startup and shared behind an `Arc`; nothing mutates it
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    recipes: Vec<Recipe>,
}

impl Corpus {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Parse a JSON array of recipes
    pub fn from_json(content: &str) -> Result<Self> {
        let recipes: Vec<Recipe> = serde_json::from_str(content)
            .map_err(|e| Error::Corpus(format!("Invalid recipe dataset: {e}")))?;
        Ok(Self { recipes })
    }

    /// Load the dataset from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Corpus(format!("Failed to read {}: {e}", path.display()))
        })?;

        let corpus = Self::from_json(&content)?;
        info!("Loaded {} recipes from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
