//! Template environment: minijinja configured for the site's `.html` views.

use crate::config::Config;
use minijinja::{context, AutoEscape, Environment, Error, ErrorKind, Value};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Language used by templates rendered without an explicit one.
pub const DEFAULT_TEMPLATE_LANG: &str = "pt";

/// View rendered for unknown pages and languages.
pub const NOT_FOUND_VIEW: &str = "404";

const LOREM_SMALL: &str = "Lorem ipsum dolor sit amet, mnesarchum reprehendunt ut usu. ";
const LOREM_MEDIUM: &str = "Velit veniam munere his an, pri cu fuisset ponderum, nominavi appellantur ne mea. Vim eu malorum accumsan dissentiet. ";
const LOREM_BIG: &str = "Vim te altera facete conclusionemque, est stet evertitur ad. Possit periculis ocurreret sit te, pri iracundia deseruisse ad. Eum at graecis liberavisse, pro natum novum movet at. Cu mucius aliquip adversarium pro, vidisse fuisset ei mel. Causae meliore necessitatibus cu eos, doming verterem vulputate ut sed, libris commodo laoreet nam at.";

/// Values every template sees, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGlobals {
    pub environment: String,
    pub bundles: Vec<String>,
    pub public_uri: String,
    pub public_port: u16,
}

impl TemplateGlobals {
    pub fn from_config(config: &Config) -> Self {
        Self {
            environment: config.environment.clone(),
            bundles: config.bundles.clone(),
            public_uri: config.public_uri.clone(),
            public_port: config.public_port,
        }
    }
}

/// Renders views from a template directory.
///
/// With caching on, one environment is built up front and compiled templates
/// live as long as the process. With caching off, every render builds a
/// fresh environment so edits on disk show up on the next request.
///
/// The engine is never mutated after construction. The request language is a
/// render argument, so concurrent renders cannot see each other's language.
pub struct TemplateEngine {
    dir: PathBuf,
    globals: TemplateGlobals,
    cached: Option<Environment<'static>>,
}

impl TemplateEngine {
    pub fn new(dir: impl Into<PathBuf>, globals: TemplateGlobals, cache: bool) -> Self {
        let dir = dir.into();
        info!(dir = %dir.display(), cache, "Configuring template environment");

        let cached = cache.then(|| build_environment(&dir, &globals));
        Self {
            dir,
            globals,
            cached,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Whether `<view>.html` exists in the template directory.
    pub async fn has_view(&self, view: &str) -> bool {
        tokio::fs::metadata(self.dir.join(format!("{}.html", view)))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Render `<view>.html` with `lang` and the page context as `ctx`.
    pub fn render<S: Serialize>(&self, view: &str, lang: &str, ctx: S) -> Result<String, Error> {
        let name = format!("{}.html", view);
        let ctx = context! { lang => lang, ctx => ctx };

        match &self.cached {
            Some(env) => env.get_template(&name)?.render(ctx),
            None => build_environment(&self.dir, &self.globals)
                .get_template(&name)?
                .render(ctx),
        }
    }
}

fn build_environment(dir: &Path, globals: &TemplateGlobals) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(dir));
    env.set_auto_escape_callback(|_| AutoEscape::None);

    add_filters(&mut env);
    add_globals(&mut env, globals);
    env
}

fn add_filters(env: &mut Environment<'static>) {
    env.add_filter("stringify", stringify);
    env.add_filter("lorem", lorem);
}

fn add_globals(env: &mut Environment<'static>, globals: &TemplateGlobals) {
    env.add_global("lang", DEFAULT_TEMPLATE_LANG);
    env.add_global("environment", globals.environment.clone());
    env.add_global("bundles", Value::from_serialize(&globals.bundles));
    env.add_global("publicUri", globals.public_uri.clone());
    env.add_global("publicPort", globals.public_port);
}

/// `{{ value|stringify }}`: the JSON text of a value.
fn stringify(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|err| {
        Error::new(ErrorKind::InvalidOperation, "value cannot be written as JSON").with_source(err)
    })
}

/// `{{ text|lorem(size) }}`: `text` when it is truthy, filler otherwise.
fn lorem(text: Option<Value>, size: Option<String>) -> Value {
    match text {
        Some(text) if text.is_true() => text,
        _ => Value::from(filler(size.as_deref().unwrap_or("small"))),
    }
}

/// Canned filler for `small`, `medium` and `big`; any other size is used as
/// the filler itself.
pub fn filler(size: &str) -> &str {
    match size {
        "small" => LOREM_SMALL,
        "medium" => LOREM_MEDIUM,
        "big" => LOREM_BIG,
        other => other,
    }
}
