use crate::i18n::normalize_codes;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Deployment mode name that turns template caching on.
pub const PRODUCTION: &str = "production";

#[derive(Debug, Clone)]
pub struct Config {
    // Deployment
    pub environment: String,
    pub port: u16,

    // Templates
    pub templates_dir: PathBuf,

    // Languages, lower-cased and deduplicated (first entry is the redirect
    // target for "/")
    pub allowed_languages: Vec<String>,

    // Template globals
    pub bundles: Vec<String>,
    pub public_uri: String,
    pub public_port: u16,

    // Text catalog
    pub texts_url: Option<String>,
    pub texts_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = parse_port("PORT", 3000)?;

        let allowed_languages = normalize_codes(&split_list(
            &std::env::var("ALLOWED_LANGUAGES").unwrap_or_else(|_| "pt,en".to_string()),
        ));
        if allowed_languages.is_empty() {
            bail!("ALLOWED_LANGUAGES must name at least one language");
        }

        Ok(Self {
            // Deployment
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            port,

            // Templates
            templates_dir: std::env::var("TEMPLATES_DIR")
                .unwrap_or_else(|_| "templates".to_string())
                .into(),

            allowed_languages,

            // Template globals
            bundles: std::env::var("BUNDLES")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            public_uri: std::env::var("PUBLIC_URI")
                .unwrap_or_else(|_| "http://localhost".to_string()),
            public_port: parse_port("PUBLIC_PORT", port)?,

            // Text catalog
            texts_url: std::env::var("TEXTS_URL").ok().filter(|v| !v.trim().is_empty()),
            texts_file: std::env::var("TEXTS_FILE")
                .unwrap_or_else(|_| "data/texts.json".to_string())
                .into(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// The language `/` redirects to.
    pub fn default_language(&self) -> &str {
        // from_env guarantees a non-empty list
        self.allowed_languages
            .first()
            .map(String::as_str)
            .unwrap_or("pt")
    }
}

fn parse_port(key: &str, default: u16) -> Result<u16> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid port: {:?}", key, v)),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
