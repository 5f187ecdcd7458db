//! Ingredient filtering and ranking.
//!
//! Both recommendation pipelines end here: candidates (scored or not) are
//! checked against the query's [`FilterPolicy`], ordered by similarity and
//! cut to [`MAX_RESULTS`].

pub mod ingredients;

pub use ingredients::{is_pantry_staple, normalize_ingredient, IngredientSet, PANTRY_STAPLES};

use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Maximum number of recipes returned for a query
pub const MAX_RESULTS: usize = 10;

/// How closely a recipe's ingredients must match the user's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Recipe may only add pantry staples to the user's ingredients
    Strict,
    /// Recipe may add up to `allowed_extras` ingredients of any kind
    Flexible,
    /// Recipe must use every user ingredient; extras are unconstrained
    Loose,
    /// Unrecognized policy name. Matches nothing.
    #[serde(other)]
    Unknown,
}

impl FilterPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterPolicy::Strict => "strict",
            FilterPolicy::Flexible => "flexible",
            FilterPolicy::Loose => "loose",
            FilterPolicy::Unknown => "unknown",
        }
    }

    /// Decide whether a recipe's ingredients satisfy this policy
    pub fn matches(&self, recipe: &IngredientSet, query: &IngredientSet, allowed_extras: usize) -> bool {
        match self {
            FilterPolicy::Strict => {
                query.is_subset(recipe) && recipe.extras(query).all(is_pantry_staple)
            }
            FilterPolicy::Flexible => recipe.extras(query).count() <= allowed_extras,
            FilterPolicy::Loose => query.is_subset(recipe),
            FilterPolicy::Unknown => false,
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(FilterPolicy::Strict),
            "flexible" => Ok(FilterPolicy::Flexible),
            "loose" => Ok(FilterPolicy::Loose),
            other => Err(format!(
                "Invalid filter type: {other}. Must be strict, flexible, or loose"
            )),
        }
    }
}

/// A recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub ingredients: Vec<String>,
    pub filter_type: FilterPolicy,
    #[serde(default)]
    pub allowed_extras: usize,
}

impl Query {
    pub fn new(ingredients: impl IntoIterator<Item = impl Into<String>>, filter_type: FilterPolicy) -> Self {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            filter_type,
            allowed_extras: 0,
        }
    }

    pub fn with_allowed_extras(mut self, allowed_extras: usize) -> Self {
        self.allowed_extras = allowed_extras;
        self
    }
}

/// A recipe paired with its similarity to the query, if one was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(flatten)]
    pub recipe: Recipe,
}

impl ScoredCandidate {
    pub fn scored(recipe: Recipe, similarity: f32) -> Self {
        Self {
            similarity: Some(similarity),
            recipe,
        }
    }

    pub fn unscored(recipe: Recipe) -> Self {
        Self {
            similarity: None,
            recipe,
        }
    }
}

/// A query's filter, with the user's ingredients normalized once up front
#[derive(Debug, Clone)]
pub struct IngredientFilter {
    query: IngredientSet,
    policy: FilterPolicy,
    allowed_extras: usize,
}

impl IngredientFilter {
    pub fn new<S: AsRef<str>>(ingredients: &[S], policy: FilterPolicy, allowed_extras: usize) -> Self {
        Self {
            query: IngredientSet::new(ingredients),
            policy,
            allowed_extras,
        }
    }

    pub fn from_query(query: &Query) -> Self {
        Self::new(&query.ingredients, query.filter_type, query.allowed_extras)
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    /// False when every query ingredient was blank
    pub fn has_ingredients(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn accepts(&self, recipe: &Recipe) -> bool {
        let recipe_set = IngredientSet::new(&recipe.ingredients);
        self.policy
            .matches(&recipe_set, &self.query, self.allowed_extras)
    }

    /// Keep passing candidates, rank them, and cut to [`MAX_RESULTS`]
    pub fn apply(&self, candidates: impl IntoIterator<Item = ScoredCandidate>) -> Vec<ScoredCandidate> {
        let passing = candidates
            .into_iter()
            .filter(|candidate| self.accepts(&candidate.recipe))
            .collect();
        rank(passing)
    }
}

/// Order candidates by descending similarity and truncate.
///
/// The sort is stable, so equal scores keep input order. Unscored candidates
/// sort after scored ones; a fully unscored list keeps its input order.
/// A non-finite score counts as unscored.
pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    if candidates.iter().any(|c| c.similarity.is_some()) {
        candidates.sort_by(|a, b| compare_similarity(a.similarity, b.similarity));
    }
    candidates.truncate(MAX_RESULTS);
    candidates
}

fn compare_similarity(a: Option<f32>, b: Option<f32>) -> Ordering {
    let finite = |score: Option<f32>| score.filter(|s| s.is_finite());
    match (finite(a), finite(b)) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter an unscored recipe list, preserving corpus order
pub fn filter_recipes<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
    query: &Query,
) -> Vec<Recipe> {
    IngredientFilter::from_query(query)
        .apply(recipes.into_iter().cloned().map(ScoredCandidate::unscored))
        .into_iter()
        .map(|candidate| candidate.recipe)
        .collect()
}
