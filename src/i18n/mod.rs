//! Internationalization (i18n) module for the site's language handling.
//!
//! # Architecture
//!
//! - `registry`: The allow-list of site languages, built from configuration
//! - `language`: Type-safe Language type that can only hold an allowed code
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, LanguageRegistry};
//!
//! let registry = LanguageRegistry::new(&["pt".into(), "en".into()])?;
//!
//! // "/" redirects here
//! let default = registry.default_language();
//!
//! // Validate a path segment
//! let english = Language::from_code(&registry, "en")?;
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{normalize_codes, LanguageRegistry};
