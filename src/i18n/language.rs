//! Language type: a language code validated against the registry.

use crate::i18n::LanguageRegistry;
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// Only codes present in a [`LanguageRegistry`] can be turned into a
/// `Language`, so holding one means the language check already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "pt", "en")
    code: String,
}

impl Language {
    /// English; the language of the optional "show English" content.
    pub const ENGLISH_CODE: &'static str = "en";

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry's allow-list
    /// * `Err` otherwise
    pub fn from_code(registry: &LanguageRegistry, code: &str) -> Result<Language> {
        match registry.get_by_code(code) {
            Some(allowed) => Ok(Language {
                code: allowed.to_string(),
            }),
            None => bail!("Language '{}' is not allowed", code),
        }
    }

    /// The registry's default language.
    pub fn default_for(registry: &LanguageRegistry) -> Language {
        Language {
            code: registry.default_language().to_string(),
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
