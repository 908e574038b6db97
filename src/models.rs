//! Data models for the conversation and for news articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Message`]: One entry in the chat transcript, sent by the user or the bot
//! - [`ChatOption`]: A selectable choice attached to a bot message
//! - [`NormalizedArticle`]: The single article shape the formatter consumes
//! - [`UpstreamResponse`] / [`UpstreamArticle`]: Lenient views of the JSON
//!   returned by the news endpoint
//!
//! Upstream providers disagree on field names (`title` vs `headline`,
//! `urlToImage` vs `image`, `source` as a string or an object). The upstream
//! types accept all of them and [`UpstreamArticle::normalize`] picks one value
//! per field in a fixed priority order.

use crate::utils::{clean_text, collapse_whitespace};
use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier of a transcript message. Assigned in append order.
pub type MessageId = u64;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A selectable choice: a category name or a region code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOption {
    /// Text shown to the user and echoed back when picked.
    pub label: String,
    /// Value handed to the controller.
    pub value: String,
}

impl ChatOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// A single chat message.
///
/// Messages are immutable once appended to the transcript.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    /// Choices offered with this message. Empty for user messages and
    /// for plain bot replies.
    pub options: Vec<ChatOption>,
    pub sent_at: DateTime<Local>,
}

impl Message {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Look up one of this message's options by value.
    pub fn option(&self, value: &str) -> Option<&ChatOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// An article in the one shape the rest of the application understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_name: String,
    pub image_url: Option<String>,
}

impl NormalizedArticle {
    /// Build an article from static text. Used for the built-in sets.
    pub fn new(title: &str, description: &str, url: &str, source_name: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            source_name: source_name.to_string(),
            image_url: None,
        }
    }
}

/// Top-level body returned by the news endpoint.
///
/// A missing `articles` key (for example a proxy's `{ "error": "..." }`
/// body) deserializes as an empty list.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub articles: Vec<UpstreamArticle>,
    /// Present on proxy error bodies.
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// One upstream article, with every known field-name variant.
///
/// All fields are optional and tolerate the wrong JSON type; a field that is
/// not a string (or a number) is treated as missing.
#[allow(non_snake_case)]
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamArticle {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub urlToImage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    /// Either `"Reuters"` or `{ "name": "Reuters", ... }`.
    #[serde(default)]
    pub source: Option<Value>,
}

impl UpstreamArticle {
    /// Collapse the upstream variants into a [`NormalizedArticle`].
    ///
    /// Priority per field:
    ///
    /// | Field | Order |
    /// |-------|-------|
    /// | title | `title`, `headline` |
    /// | description | `description`, `summary` |
    /// | url | `url` |
    /// | image | `urlToImage`, `image` |
    /// | source | `source` (string), `source.name` |
    ///
    /// Empty strings count as missing so the next candidate is tried.
    /// Markup is stripped from the title and description.
    pub fn normalize(self) -> NormalizedArticle {
        let title = first_present([self.title, self.headline]);
        let description = first_present([self.description, self.summary]);
        let image_url = first_present([self.urlToImage, self.image]);

        NormalizedArticle {
            title: title.map(|t| clean_text(&t)).unwrap_or_default(),
            description: description.map(|d| clean_text(&d)).unwrap_or_default(),
            url: self.url.map(|u| u.trim().to_string()).unwrap_or_default(),
            source_name: source_name(self.source.as_ref()),
            image_url,
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

fn source_name(source: Option<&Value>) -> String {
    let name = match source {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(map)) => map.get("name").and_then(Value::as_str),
        _ => None,
    };
    name.map(collapse_whitespace).unwrap_or_default()
}

/// Accept any JSON value; keep strings, stringify numbers, drop the rest.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
