//! Page handlers: the general page and the not-found page.

use crate::error::ViewError;
use crate::i18n::Language;
use crate::prerequisites::{self, Abort, PageQuery, Prerequisites};
use crate::server::{AppState, SharedState};
use crate::templates::{TemplateEngine, NOT_FOUND_VIEW};
use crate::texts::{editable_texts_for, index_by_id, PreparedText};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// View rendered for the language root (`/{lang}`).
pub const INDEX_VIEW: &str = "index";

static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn segment_regex() -> &'static Regex {
    SEGMENT_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex"))
}

/// Path parameters of the page routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub lang: Option<String>,
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub level4: Option<String>,
    pub level5: Option<String>,
}

impl PageParams {
    /// The present path levels, in order.
    pub fn levels(&self) -> Vec<&str> {
        [
            &self.level1,
            &self.level2,
            &self.level3,
            &self.level4,
            &self.level5,
        ]
        .into_iter()
        .filter_map(|level| level.as_deref())
        .collect()
    }

    /// The request path without its language segment; empty for the
    /// language root so templates can write `/{{ other_lang }}{{ ctx.urlWithoutLang }}`.
    pub fn url_without_lang(&self) -> String {
        self.levels()
            .iter()
            .map(|level| format!("/{}", level))
            .collect()
    }
}

/// Authentication state set by the host's auth layer as a request extension.
/// Requests without one are anonymous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub is_authenticated: bool,
    pub strategy: Option<String>,
    pub credentials: Option<serde_json::Value>,
}

/// What a page template receives as `ctx`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url_param1: Option<String>,
    pub url_param2: Option<String>,
    pub url_param3: Option<String>,
    pub url_param4: Option<String>,
    pub url_param5: Option<String>,
    pub url_without_lang: String,
    pub auth: AuthInfo,
    pub show_english: bool,
    /// Every text, keyed by id
    pub texts: BTreeMap<String, PreparedText>,
    /// The texts of the rendered view, keyed by editable id
    pub editable_texts: BTreeMap<String, PreparedText>,
}

impl PageContext {
    pub fn build(params: &PageParams, view: &str, auth: &AuthInfo, pre: &Prerequisites) -> Self {
        Self {
            url_param1: params.level1.clone(),
            url_param2: params.level2.clone(),
            url_param3: params.level3.clone(),
            url_param4: params.level4.clone(),
            url_param5: params.level5.clone(),
            url_without_lang: params.url_without_lang(),
            auth: auth.clone(),
            show_english: pre.show_english,
            texts: index_by_id(&pre.texts),
            editable_texts: editable_texts_for(view, &pre.texts),
        }
    }
}

/// Map the path levels to a view name.
///
/// No levels is the index view. A level that is not a plain name, or a view
/// without a template file, is the 404 view.
pub async fn resolve_view(templates: &TemplateEngine, params: &PageParams) -> String {
    let levels = params.levels();
    if levels.iter().any(|level| !segment_regex().is_match(level)) {
        return NOT_FOUND_VIEW.to_string();
    }

    let view = if levels.is_empty() {
        INDEX_VIEW.to_string()
    } else {
        levels.join("/")
    };

    if templates.has_view(&view).await {
        view
    } else {
        NOT_FOUND_VIEW.to_string()
    }
}

/// `GET /{lang}` through `GET /{lang}/{level1}/.../{level5}`.
pub async fn general_page(
    State(state): State<SharedState>,
    Path(params): Path<PageParams>,
    Query(query): Query<PageQuery>,
    auth: Option<Extension<AuthInfo>>,
) -> Result<Response, ViewError> {
    let auth = auth.map(|Extension(auth)| auth).unwrap_or_default();
    render_page(&state, &params, &query, &auth).await
}

/// Anything deeper than five levels, and any other unmatched path. The first
/// path segment is taken as the language.
pub async fn not_found(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, ViewError> {
    let lang = uri
        .path()
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();

    match prerequisites::run(&state.registry, &state.texts, lang, &query).await {
        Ok(pre) => render_not_found(&state, &pre.language),
        Err(Abort::InvalidLanguage(_)) => {
            render_not_found(&state, &Language::default_for(&state.registry))
        }
        Err(Abort::Failed(err)) => Err(err),
    }
}

pub async fn render_page(
    state: &AppState,
    params: &PageParams,
    query: &PageQuery,
    auth: &AuthInfo,
) -> Result<Response, ViewError> {
    let default_language = Language::default_for(&state.registry);

    let Some(lang) = params.lang.as_deref() else {
        return render_not_found(state, &default_language);
    };

    let pre = match prerequisites::run(&state.registry, &state.texts, lang, query).await {
        Ok(pre) => pre,
        Err(Abort::InvalidLanguage(_)) => return render_not_found(state, &default_language),
        Err(Abort::Failed(err)) => return Err(err),
    };

    let view = resolve_view(&state.templates, params).await;
    debug!(view = %view, lang = %pre.language, "Resolved view file");

    let ctx = PageContext::build(params, &view, auth, &pre);
    let html = state.templates.render(&view, pre.language.code(), &ctx)?;

    let status = if view == NOT_FOUND_VIEW {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok((status, Html(html)).into_response())
}

fn render_not_found(state: &AppState, language: &Language) -> Result<Response, ViewError> {
    let html = state
        .templates
        .render(NOT_FOUND_VIEW, language.code(), minijinja::context! {})?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageRegistry;
    use crate::templates::TemplateGlobals;
    use crate::texts::{TextEntry, TextId, TextSource};
    use axum::body;
    use tempfile::TempDir;

    fn params(lang: Option<&str>, levels: &[&str]) -> PageParams {
        let level = |i: usize| levels.get(i).map(|s| s.to_string());
        PageParams {
            lang: lang.map(str::to_string),
            level1: level(0),
            level2: level(1),
            level3: level(2),
            level4: level(3),
            level5: level(4),
        }
    }

    fn state(dir: &TempDir) -> AppState {
        std::fs::write(dir.path().join("404.html"), "not found {{ lang }}").unwrap();
        std::fs::write(
            dir.path().join("home.html"),
            "{{ lang }}|{{ ctx.urlWithoutLang }}|{{ ctx.editableTexts.t1.content }}|{{ ctx.texts['2'].pageName }}",
        )
        .unwrap();
        std::fs::write(dir.path().join("index.html"), "index {{ lang }}").unwrap();

        let entry = |id: i64, page: &str, editable: &str, pt: &str| TextEntry {
            id: TextId::Number(id),
            page_name: page.to_string(),
            editable_id: Some(editable.to_string()),
            contents: BTreeMap::from([("pt".to_string(), pt.to_string())]),
        };

        AppState {
            registry: LanguageRegistry::new(&["pt".to_string(), "en".to_string()]).unwrap(),
            templates: TemplateEngine::new(
                dir.path(),
                TemplateGlobals {
                    environment: "test".to_string(),
                    bundles: Vec::new(),
                    public_uri: "http://localhost".to_string(),
                    public_port: 3000,
                },
                true,
            ),
            texts: TextSource::Static(vec![
                entry(1, "home", "t1", "Bem-vindo"),
                entry(2, "about", "t2", "Sobre"),
            ]),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ==================== PageParams Tests ====================

    #[test]
    fn test_url_without_lang() {
        assert_eq!(params(Some("pt"), &[]).url_without_lang(), "");
        assert_eq!(
            params(Some("pt"), &["about", "team"]).url_without_lang(),
            "/about/team"
        );
    }

    #[test]
    fn test_page_params_deserialize_with_missing_levels() {
        let params: PageParams =
            serde_json::from_value(serde_json::json!({"lang": "pt", "level1": "home"})).unwrap();
        assert_eq!(params.levels(), vec!["home"]);
        assert_eq!(params.level2, None);
    }

    // ==================== View Resolution Tests ====================

    #[tokio::test]
    async fn test_resolve_view() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let cases: [(&[&str], &str); 5] = [
            (&[], "index"),
            (&["home"], "home"),
            (&["missing"], "404"),
            (&[".."], "404"),
            (&["a.b"], "404"),
        ];

        for (levels, expected) in cases {
            let view = resolve_view(&state.templates, &params(Some("pt"), levels)).await;
            assert_eq!(view, expected, "levels {:?}", levels);
        }
    }

    // ==================== Context Tests ====================

    #[test]
    fn test_context_indexes_texts() {
        let pre = Prerequisites {
            language: Language::from_code(
                &LanguageRegistry::new(&["pt".to_string()]).unwrap(),
                "pt",
            )
            .unwrap(),
            show_english: true,
            texts: vec![
                PreparedText {
                    id: TextId::Number(1),
                    page_name: "home".to_string(),
                    editable_id: Some("t1".to_string()),
                    content: String::new(),
                    content_en: None,
                },
                PreparedText {
                    id: TextId::Number(2),
                    page_name: "about".to_string(),
                    editable_id: Some("t2".to_string()),
                    content: String::new(),
                    content_en: None,
                },
            ],
        };
        let auth = AuthInfo {
            is_authenticated: true,
            strategy: Some("session".to_string()),
            credentials: Some(serde_json::json!({"id": 9})),
        };

        let ctx = PageContext::build(&params(Some("pt"), &["home"]), "home", &auth, &pre);

        assert_eq!(ctx.url_param1.as_deref(), Some("home"));
        assert_eq!(ctx.url_param2, None);
        assert_eq!(ctx.url_without_lang, "/home");
        assert_eq!(ctx.auth, auth);
        assert!(ctx.show_english);
        assert_eq!(ctx.editable_texts.keys().collect::<Vec<_>>(), vec!["t1"]);
        assert_eq!(ctx.editable_texts["t1"], pre.texts[0]);
        assert_eq!(ctx.texts.keys().collect::<Vec<_>>(), vec!["1", "2"]);

        let json = serde_json::to_value(&ctx).expect("Should serialize");
        assert_eq!(json["urlParam1"], "home");
        assert_eq!(json["urlWithoutLang"], "/home");
        assert_eq!(json["showEnglish"], true);
        assert_eq!(json["auth"]["isAuthenticated"], true);
        assert_eq!(json["editableTexts"]["t1"]["pageName"], "home");
        assert!(json.get("editable_texts").is_none());
    }

    // ==================== Handler Tests ====================

    #[tokio::test]
    async fn test_missing_lang_renders_404() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let response = render_page(
            &state,
            &params(None, &["home"]),
            &PageQuery::default(),
            &AuthInfo::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "not found pt");
    }

    #[tokio::test]
    async fn test_invalid_lang_renders_404() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let response = render_page(
            &state,
            &params(Some("xx"), &["home"]),
            &PageQuery::default(),
            &AuthInfo::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_renders_with_texts() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let response = render_page(
            &state,
            &params(Some("en"), &["home"]),
            &PageQuery::default(),
            &AuthInfo::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "en|/home|Bem-vindo|about");
    }

    #[tokio::test]
    async fn test_unknown_view_renders_404_with_status() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let response = render_page(
            &state,
            &params(Some("en"), &["nope"]),
            &PageQuery::default(),
            &AuthInfo::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "not found en");
    }
}
