pub mod corpus;

pub use corpus::Corpus;

use serde::{Deserialize, Deserializer, Serialize};

/// A recipe as stored in the dataset and returned by the API.
///
/// Ingredients are always plain names once deserialized; structured entries
/// like `{"item": "egg", "quantity": "2"}` are flattened to `"egg"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(deserialize_with = "deserialize_ingredients")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

impl Recipe {
    pub fn new(
        name: impl Into<String>,
        ingredients: impl IntoIterator<Item = impl Into<String>>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            instructions: instructions.into(),
        }
    }
}

/// Ingredient as it may appear in a dataset file or index metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawIngredient {
    Plain(String),
    Structured {
        #[serde(default)]
        item: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawIngredient {
    /// The ingredient's name, if the entry carries one
    pub fn into_name(self) -> Option<String> {
        match self {
            RawIngredient::Plain(name) => Some(name),
            RawIngredient::Structured { item, name } => item.or(name),
        }
    }
}

fn deserialize_ingredients<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawIngredient>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|ingredient| {
            ingredient
                .into_name()
                .ok_or_else(|| serde::de::Error::custom("ingredient object is missing an `item` field"))
        })
        .collect()
}
