pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    extract::State,
    http::HeaderValue,
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    // Event routes
    let event_routes = Router::new()
        .route("/", get(routes::event::list).post(routes::event::create))
        .route("/live", get(routes::event::live))
        .route("/upcoming", get(routes::event::upcoming))
        .route("/category/{category}", get(routes::event::by_category))
        .route(
            "/{event_id}",
            get(routes::event::get)
                .put(routes::event::update)
                .delete(routes::event::delete),
        )
        .route("/{event_id}/live", post(routes::event::set_live))
        .route("/{event_id}/attendee", post(routes::event::attendee))
        .route(
            "/{event_id}/session",
            get(routes::session::list_by_event).post(routes::session::create),
        );

    // Session routes, with their questions and feedback
    let session_routes = Router::new()
        .route(
            "/{session_id}",
            get(routes::session::get)
                .put(routes::session::update)
                .delete(routes::session::delete),
        )
        .route("/{session_id}/start", post(routes::session::start))
        .route("/{session_id}/end", post(routes::session::end))
        .route(
            "/{session_id}/question",
            get(routes::question::list).post(routes::question::ask),
        )
        .route(
            "/{session_id}/hand",
            post(routes::question::raise_hand).delete(routes::question::lower_hand),
        )
        .route(
            "/{session_id}/feedback",
            get(routes::feedback::get)
                .put(routes::feedback::submit)
                .delete(routes::feedback::delete),
        );

    let question_routes = Router::new()
        .route(
            "/{question_id}",
            put(routes::question::update).delete(routes::question::delete),
        )
        .route("/{question_id}/hand", post(routes::question::toggle_hand));

    let feedback_routes = Router::new().route("/tags", get(routes::feedback::tags));

    // Compose API
    let api = Router::new()
        .nest("/event", event_routes)
        .nest("/session", session_routes)
        .nest("/question", question_routes)
        .nest("/feedback", feedback_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the configured ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "ws_connections": state.ws_storage.connection_count(),
    }))
}
