//! Steps that run before a page handler body.
//!
//! 1. the language must be allowed, otherwise the request ends on the 404 page
//! 2. the "show English" flag and the text catalog are resolved in parallel
//! 3. texts are prepared for the request language

use crate::error::ViewError;
use crate::i18n::{Language, LanguageRegistry};
use crate::texts::{prepare_texts_for_view, PreparedText, TextEntry, TextSource};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Query string understood by every page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub show_english: Option<String>,
}

/// Everything the pipeline hands to a handler.
#[derive(Debug, Clone)]
pub struct Prerequisites {
    pub language: Language,
    pub show_english: bool,
    pub texts: Vec<PreparedText>,
}

/// Why the pipeline stopped before the handler body.
#[derive(Debug, Error)]
pub enum Abort {
    #[error("language '{0}' is not allowed")]
    InvalidLanguage(String),

    #[error(transparent)]
    Failed(#[from] ViewError),
}

/// Run all stages for `lang`.
pub async fn run(
    registry: &LanguageRegistry,
    source: &TextSource,
    lang: &str,
    query: &PageQuery,
) -> Result<Prerequisites, Abort> {
    let language = abort_if_invalid_lang(registry, lang)?;

    let (show_english, entries) =
        tokio::join!(async { read_show_english(query) }, read_all_texts(source));
    let entries = entries?;

    debug!(
        lang = %language,
        show_english,
        texts = entries.len(),
        "Prerequisites resolved"
    );

    let fallback = Language::default_for(registry);
    let texts = prepare_texts_for_view(entries, &language, &fallback, show_english);

    Ok(Prerequisites {
        language,
        show_english,
        texts,
    })
}

pub fn abort_if_invalid_lang(registry: &LanguageRegistry, lang: &str) -> Result<Language, Abort> {
    Language::from_code(registry, lang).map_err(|_| {
        warn!(lang, "Rejected request for a language outside the allow-list");
        Abort::InvalidLanguage(lang.to_string())
    })
}

/// `?show_english=1|true|yes|on`, case-insensitive. Anything else is off.
pub fn read_show_english(query: &PageQuery) -> bool {
    query
        .show_english
        .as_deref()
        .map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

pub async fn read_all_texts(source: &TextSource) -> Result<Vec<TextEntry>, ViewError> {
    source.load_all().await.map_err(ViewError::Texts)
}
