//! Text catalog: the editable, translated snippets shown on the pages.
//!
//! Entries come from an external [`TextSource`], are turned into view-ready
//! [`PreparedText`]s for the request language, and are handed to templates as
//! two maps: every text keyed by id, and the current page's texts keyed by
//! editable id.

use crate::i18n::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Catalog identifier. Content services hand out numeric ids, hand-written
/// catalogs tend to use strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextId::Number(n) => write!(f, "{}", n),
            TextId::Text(s) => f.write_str(s),
        }
    }
}

/// A catalog record as stored by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub id: TextId,
    /// Page (view name) the text belongs to
    pub page_name: String,
    /// Key used by the page to place the text; texts without one are not
    /// editable in place
    #[serde(default)]
    pub editable_id: Option<String>,
    /// Content per language code
    #[serde(default)]
    pub contents: BTreeMap<String, String>,
}

/// A text ready for the templates, resolved to one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedText {
    pub id: TextId,
    pub page_name: String,
    pub editable_id: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_en: Option<String>,
}

/// Resolve every entry to `language`, falling back to `fallback` and then to
/// an empty string. The English content is attached when `show_english` is on.
pub fn prepare_texts_for_view(
    entries: Vec<TextEntry>,
    language: &Language,
    fallback: &Language,
    show_english: bool,
) -> Vec<PreparedText> {
    entries
        .into_iter()
        .map(|entry| {
            let content = entry
                .contents
                .get(language.code())
                .filter(|s| !s.is_empty())
                .or_else(|| entry.contents.get(fallback.code()))
                .cloned()
                .unwrap_or_default();

            let content_en = if show_english {
                Some(
                    entry
                        .contents
                        .get(Language::ENGLISH_CODE)
                        .cloned()
                        .unwrap_or_default(),
                )
            } else {
                None
            };

            PreparedText {
                id: entry.id,
                page_name: entry.page_name,
                editable_id: entry.editable_id,
                content,
                content_en,
            }
        })
        .collect()
}

/// Index texts by id. A repeated id keeps the last entry.
pub fn index_by_id(texts: &[PreparedText]) -> BTreeMap<String, PreparedText> {
    texts
        .iter()
        .map(|text| (text.id.to_string(), text.clone()))
        .collect()
}

/// The texts owned by `view`, indexed by editable id. Ownership is an exact
/// match of `page_name` against the view name; texts without an editable id
/// are left out. A repeated editable id keeps the last entry.
pub fn editable_texts_for(view: &str, texts: &[PreparedText]) -> BTreeMap<String, PreparedText> {
    texts
        .iter()
        .filter(|text| text.page_name == view)
        .filter_map(|text| {
            text.editable_id
                .as_ref()
                .map(|editable_id| (editable_id.clone(), text.clone()))
        })
        .collect()
}

/// Where the text catalog is read from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// JSON array of [`TextEntry`] on disk, read on every request
    File(PathBuf),
    /// Content service answering `GET url` with a JSON array of [`TextEntry`]
    Http { client: reqwest::Client, url: String },
    /// Fixed in-memory catalog
    Static(Vec<TextEntry>),
}

impl TextSource {
    pub fn http(url: impl Into<String>) -> Self {
        TextSource::Http {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Read the whole catalog.
    pub async fn load_all(&self) -> Result<Vec<TextEntry>> {
        match self {
            TextSource::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read texts file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse texts file {}", path.display()))
            }
            TextSource::Http { client, url } => {
                let response = client
                    .get(url)
                    .header("Accept", "application/json")
                    .send()
                    .await
                    .with_context(|| format!("Failed to send request to {}", url))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    anyhow::bail!("Text service error ({}): {}", status, body);
                }

                response
                    .json()
                    .await
                    .context("Failed to parse text service response")
            }
            TextSource::Static(entries) => Ok(entries.clone()),
        }
    }
}
