//! Reel data model
//!
//! Articles arrive from the feed layer as loosely-populated JSON records.
//! Only articles carrying both an image and some narratable text become
//! reels; everything downstream works with the immutable [`ReelSet`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::Result;

/// Article as delivered by the feed layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    /// Source URL, used as the stable identity of the reel
    pub url: String,

    #[serde(default)]
    pub url_to_image: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub country_code: Option<String>,
}

impl Article {
    /// Description if present and non-blank, otherwise content
    pub fn summary(&self) -> Option<&str> {
        non_blank(self.description.as_deref()).or_else(|| non_blank(self.content.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Load a JSON array of articles from disk
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// One narratable reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReelItem {
    pub title: String,
    pub narration_text: String,
    pub media_url: String,
    pub identity: String,
}

impl ReelItem {
    /// Build a reel from an article
    ///
    /// Returns `None` when the article has no image or nothing to narrate.
    pub fn from_article(article: &Article) -> Option<Self> {
        let media_url = non_blank(article.url_to_image.as_deref())?;
        let summary = article.summary()?;

        Some(Self {
            title: article.title.clone(),
            narration_text: format!("{}. {}", article.title, summary),
            media_url: media_url.to_string(),
            identity: article.url.clone(),
        })
    }
}

/// Ordered, immutable sequence of reels eligible for narration
///
/// Cloning is cheap; all clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct ReelSet {
    items: Arc<[ReelItem]>,
}

impl ReelSet {
    pub fn new(items: Vec<ReelItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Keep only the articles that qualify as reels, preserving order
    pub fn from_articles<'a, I>(articles: I) -> Self
    where
        I: IntoIterator<Item = &'a Article>,
    {
        Self::new(articles.into_iter().filter_map(ReelItem::from_article).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReelItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReelItem> {
        self.items.iter()
    }
}
