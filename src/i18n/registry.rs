//! Language registry: the allow-list of languages the site is served in.
//!
//! The registry is built once at startup from the configured language codes
//! and is immutable thereafter. The first configured language is the default
//! one, the target of the `/` redirect.

use anyhow::{bail, Result};

/// Allow-list of site languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    /// ISO 639-1 codes (e.g., "pt", "en"), in configuration order
    codes: Vec<String>,
}

impl LanguageRegistry {
    /// Build a registry from the configured language codes.
    ///
    /// Codes go through [`normalize_codes`]. Fails when no code is left.
    pub fn new(codes: &[String]) -> Result<Self> {
        let codes = normalize_codes(codes);
        if codes.is_empty() {
            bail!("At least one allowed language is required");
        }

        Ok(Self { codes })
    }

    /// The registry's own copy of `code`, if it is allowed.
    pub fn get_by_code(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|allowed| allowed.as_str() == code)
            .map(String::as_str)
    }

    /// The default language (first configured).
    pub fn default_language(&self) -> &str {
        // new() rejects an empty list
        &self.codes[0]
    }
}

/// Trim and lower-case language codes, dropping blanks and duplicates while
/// keeping the first occurrence.
pub fn normalize_codes<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(codes.len());

    for raw in codes {
        let code = raw.as_ref().trim().to_lowercase();
        if !code.is_empty() && !normalized.contains(&code) {
            normalized.push(code);
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_code_is_default() {
        let registry = LanguageRegistry::new(&codes(&["pt", "en"])).unwrap();
        assert_eq!(registry.default_language(), "pt");
    }

    #[test]
    fn test_get_by_code() {
        let registry = LanguageRegistry::new(&codes(&["pt", "en"])).unwrap();
        assert_eq!(registry.get_by_code("en"), Some("en"));
        assert!(registry.get_by_code("fr").is_none());
    }

    #[test]
    fn test_codes_are_normalized_and_deduplicated() {
        assert_eq!(normalize_codes(&[" EN", "pt", "en", ""]), vec!["en", "pt"]);

        let registry = LanguageRegistry::new(&codes(&[" EN", "pt"])).unwrap();
        assert_eq!(registry.default_language(), "en");
        assert_eq!(registry.get_by_code("EN"), None);
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(LanguageRegistry::new(&[]).is_err());
        assert!(LanguageRegistry::new(&codes(&[" "])).is_err());
    }
}
