//! Core data structures for the newsarchive application.
//!
//! This module contains the news API response shapes, the persisted
//! `SavedArticle` record and the `Patch` applied on update.
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{NewsError, Result};

/// Open key/value bag holding everything a saved article carries besides its
/// metadata: title, url, source, user notes and so on.
pub type ArticleFields = Map<String, Value>;

/// Keys that belong to the archive and are never taken from caller data.
pub const RESERVED_KEYS: [&str; 3] = ["id", "saved_date", "updated_date"];

/// Top-level body returned by the news API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Publisher of a news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A news item exactly as the API returned it. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub source: NewsSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsArticle {
    /// Flattens the article into the shape stored in the archive:
    /// title, url, source name, publication time and description.
    pub fn to_fields(&self) -> ArticleFields {
        let mut fields = ArticleFields::new();
        fields.insert("title".into(), opt_value(&self.title));
        fields.insert("url".into(), opt_value(&self.url));
        fields.insert("source".into(), opt_value(&self.source.name));
        fields.insert("publishedAt".into(), opt_value(&self.published_at));
        fields.insert("description".into(), opt_value(&self.description));
        fields
    }
}

fn opt_value(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

/// An article kept in the local archive.
///
/// The metadata fields are typed. Every other key is kept in `fields` and
/// serialized flat next to them, so the on-disk object is a single map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArticle {
    /// Unique, positive identifier assigned at save time
    pub id: u64,
    /// When the article was first saved, never changes afterwards
    #[serde(with = "timestamp")]
    pub saved_date: NaiveDateTime,
    /// When the article was last updated
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

impl SavedArticle {
    /// Creates a new record, dropping any reserved keys from `fields`.
    pub fn new(id: u64, mut fields: ArticleFields) -> Self {
        for key in RESERVED_KEYS {
            fields.remove(key);
        }
        Self {
            id,
            saved_date: now(),
            updated_date: None,
            fields,
        }
    }

    /// Convenience accessor for a string-valued field.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> &str {
        self.field_str("title").unwrap_or("(untitled)")
    }
}

/// Partial set of field updates for a saved article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parses a `key=value` assignment. The value is read as JSON when it is
    /// valid JSON and kept as a plain string otherwise.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| NewsError::InvalidInput {
                message: format!("expected key=value, got '{}'", assignment),
            })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(NewsError::InvalidInput {
                message: format!("empty key in '{}'", assignment),
            });
        }

        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok((key.to_string(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Patch {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Current local time at second precision, matching the on-disk format.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::FORMAT;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => NaiveDateTime::parse_from_str(&raw, FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_drops_reserved_keys() {
        let fields = json!({ "id": 42, "saved_date": "x", "title": "Hello" })
            .as_object()
            .cloned()
            .unwrap();
        let saved = SavedArticle::new(1, fields);
        assert_eq!(saved.id, 1);
        assert_eq!(saved.fields.len(), 1);
        assert_eq!(saved.title(), "Hello");
    }

    #[test]
    fn saved_article_serializes_flat() {
        let mut saved = SavedArticle::new(3, ArticleFields::new());
        saved.fields.insert("notes".into(), json!("çok ilginç"));
        let value = serde_json::to_value(&saved).unwrap();

        assert_eq!(value["id"], json!(3));
        assert_eq!(value["notes"], json!("çok ilginç"));
        assert!(value.get("updated_date").is_none());
        assert!(value["saved_date"].is_string());
    }

    #[test]
    fn reads_legacy_record() {
        let raw = r#"{
            "title": "T",
            "url": "https://example.com",
            "source": "Example",
            "publishedAt": "2024-05-01T10:00:00Z",
            "description": null,
            "id": 1,
            "saved_date": "2024-05-02 08:30:00",
            "updated_date": "2024-05-03 09:00:00",
            "notes": "Bu makale çok ilginç!"
        }"#;
        let saved: SavedArticle = serde_json::from_str(raw).unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.saved_date.to_string(), "2024-05-02 08:30:00");
        assert!(saved.updated_date.is_some());
        assert_eq!(saved.field_str("notes"), Some("Bu makale çok ilginç!"));
        assert_eq!(saved.fields.get("description"), Some(&Value::Null));
    }

    #[test]
    fn news_article_flattens_source_name() {
        let article: NewsArticle = serde_json::from_value(json!({
            "source": { "id": null, "name": "BBC News" },
            "title": "Headline",
            "url": "https://bbc.co.uk/x",
            "publishedAt": "2024-01-01T00:00:00Z",
            "description": "desc",
            "urlToImage": "https://img"
        }))
        .unwrap();

        let fields = article.to_fields();
        assert_eq!(fields["source"], json!("BBC News"));
        assert_eq!(fields["publishedAt"], json!("2024-01-01T00:00:00Z"));
        assert!(!fields.contains_key("urlToImage"));
    }

    #[test]
    fn assignment_parses_json_or_string() {
        assert_eq!(
            Patch::parse_assignment("rating=5").unwrap(),
            ("rating".to_string(), json!(5))
        );
        assert_eq!(
            Patch::parse_assignment("notes=worth a read").unwrap(),
            ("notes".to_string(), json!("worth a read"))
        );
        assert_eq!(
            Patch::parse_assignment("url=a=b").unwrap(),
            ("url".to_string(), json!("a=b"))
        );
        assert!(Patch::parse_assignment("no-equals").is_err());
        assert!(Patch::parse_assignment("=value").is_err());
    }
}
