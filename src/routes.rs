//! Route table.
//!
//! | Route                                   | Handler                   |
//! |-----------------------------------------|---------------------------|
//! | `GET /`                                 | redirect to `/<default>`  |
//! | `GET /:lang` … `/:lang/:level1/…/:level5` | [`views::general_page`] |
//! | anything else                           | [`views::not_found`]      |

use crate::server::SharedState;
use crate::views;
use axum::extract::State;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Page routes, one per nesting depth from 0 to 5.
pub const PAGE_ROUTES: [&str; 6] = [
    "/:lang",
    "/:lang/:level1",
    "/:lang/:level1/:level2",
    "/:lang/:level1/:level2/:level3",
    "/:lang/:level1/:level2/:level3/:level4",
    "/:lang/:level1/:level2/:level3/:level4/:level5",
];

pub fn build_router(state: SharedState) -> Router {
    let mut router = Router::new().route("/", get(redirect_to_default_language));

    for path in PAGE_ROUTES {
        router = router.route(path, get(views::general_page));
    }

    // Deeper than five levels: /:lang/*any_path
    router
        .fallback(views::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn redirect_to_default_language(State(state): State<SharedState>) -> Redirect {
    Redirect::to(&format!("/{}", state.registry.default_language()))
}
