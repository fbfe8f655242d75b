use crate::config::Config;
use crate::i18n::LanguageRegistry;
use crate::routes::build_router;
use crate::templates::{TemplateEngine, TemplateGlobals};
use crate::texts::TextSource;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

pub type SharedState = Arc<AppState>;

/// Process-wide state shared by every request. Immutable after startup.
pub struct AppState {
    pub registry: LanguageRegistry,
    pub templates: TemplateEngine,
    pub texts: TextSource,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = LanguageRegistry::new(&config.allowed_languages)?;

        let templates = TemplateEngine::new(
            &config.templates_dir,
            TemplateGlobals::from_config(config),
            config.is_production(),
        );
        if !templates.is_cached() {
            info!("Template caching is off; templates are reloaded on every request");
        }

        let texts = match &config.texts_url {
            Some(url) => {
                info!("Reading texts from {}", url);
                TextSource::http(url.clone())
            }
            None => {
                info!("Reading texts from {}", config.texts_file.display());
                TextSource::File(config.texts_file.clone())
            }
        };

        Ok(Self {
            registry,
            templates,
            texts,
        })
    }
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        %addr,
        environment = %config.environment,
        languages = ?config.allowed_languages,
        default_language = config.default_language(),
        "Binding HTTP listener"
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
