use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Normalizes a category or tag label into the key used for matching.
///
/// Lower-cases and collapses every run of non-alphanumeric characters into a
/// single `-`, so `"Web Design"` and `"web-design"` compare equal.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Treats an explicit `null` like a missing field. Nullable backend columns
/// arrive as `null` rather than being omitted.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn category_key(category: &str, category_slug: Option<&str>) -> String {
    match category_slug.map(str::trim) {
        Some(slug) if !slug.is_empty() => slugify(slug),
        _ => slugify(category),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Article {
    pub fn category_key(&self) -> String {
        category_key(&self.category, Some(&self.category_slug))
    }

    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id.clone(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            cover_image: self.cover_image.clone(),
            date: self.date,
            category: self.category.clone(),
            category_slug: self.category_slug.clone(),
            author: self.author.clone(),
        }
    }
}

/// Lightweight projection of an [`Article`] returned by the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub date: DateTime<Utc>,
    pub category: String,
    pub category_slug: String,
    pub author: String,
}

/// One article the reader has viewed, as stored in the client-held history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistoryEntry {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ReadingHistoryEntry {
    pub fn to_history_ref(&self) -> HistoryRef {
        HistoryRef {
            id: self.id.clone(),
            category: self.category.clone(),
            category_slug: Some(self.category_slug.clone()).filter(|s| !s.is_empty()),
            tags: self.tags.clone(),
        }
    }
}

impl From<&Article> for ReadingHistoryEntry {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            slug: article.slug.clone(),
            title: article.title.clone(),
            cover_image: article.cover_image.clone(),
            category: article.category.clone(),
            category_slug: article.category_slug.clone(),
            tags: article.tags.clone(),
        }
    }
}

/// The part of a history entry the recommender looks at. Extra fields sent
/// by clients (title, cover image, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRef {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl HistoryRef {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            category_slug: None,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn category_key(&self) -> String {
        category_key(&self.category, self.category_slug.as_deref())
    }
}

/// A recommended article and the relevance score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub score: f64,
}
