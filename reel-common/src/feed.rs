//! Feed filtering
//!
//! Category, search and country selection happen upstream of playback.
//! Any change produces a fresh article list which is turned into a new
//! [`ReelSet`](crate::ReelSet); the controller only ever sees the result.

use crate::item::Article;

/// Categories offered by the feed
pub const CATEGORIES: &[&str] = &[
    "general",
    "politics",
    "business",
    "technology",
    "sports",
    "entertainment",
    "health",
    "science",
];

/// Returns true if `name` is one of [`CATEGORIES`] (case-insensitive)
pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// Current feed selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub country: Option<String>,
}

impl FeedQuery {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = (!query.trim().is_empty()).then_some(query);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Whether a single article passes the current selection
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(category) = &self.category {
            let matches_category = article
                .category
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case(category))
                .unwrap_or(false);
            if !matches_category {
                return false;
            }
        }

        if let Some(country) = &self.country {
            let matches_country = article
                .country_code
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case(country))
                .unwrap_or(false);
            if !matches_country {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            let in_title = article.title.to_lowercase().contains(&needle);
            let in_summary = article
                .summary()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_summary {
                return false;
            }
        }

        true
    }

    /// Apply the selection, preserving feed order
    pub fn apply<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        articles.iter().filter(|a| self.matches(a)).collect()
    }
}
