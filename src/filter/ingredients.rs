use std::collections::HashSet;

/// Common ingredients a strict match may add on top of the user's list
pub const PANTRY_STAPLES: &[&str] = &[
    "salt",
    "pepper",
    "oil",
    "sugar",
    "water",
    "vinegar",
    "spice",
    "herbs",
    "butter",
    "cumin",
    "flour",
    "rice",
    "pasta",
    "panko",
    "garlic powder",
    "onion powder",
    "oregano",
    "thyme",
    "basil",
    "paprika",
    "chili flakes",
    "cayenne pepper",
    "soy sauce",
];

/// Normalize ingredient name (lowercase, trim)
///
/// No stemming: "tomato" and "tomatoes" stay distinct.
pub fn normalize_ingredient(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether a normalized ingredient is a pantry staple
pub fn is_pantry_staple(normalized: &str) -> bool {
    PANTRY_STAPLES.contains(&normalized)
}

/// Normalized set of ingredient names used for comparisons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSet(HashSet<String>);

impl IngredientSet {
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            ingredients
                .into_iter()
                .map(|i| normalize_ingredient(i.as_ref()))
                .filter(|i| !i.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, ingredient: &str) -> bool {
        self.0.contains(&normalize_ingredient(ingredient))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset(&self, other: &IngredientSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Ingredients in `self` that are not in `other`
    pub fn extras<'a>(&'a self, other: &'a IngredientSet) -> impl Iterator<Item = &'a str> + 'a {
        self.0.difference(&other.0).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
