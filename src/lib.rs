pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod session;
pub mod state;
pub mod types;

use axum::Router;

/// All API routes, without the transport layers added in `main`.
pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::stats::router())
        .merge(routes::sessions::router())
        .merge(routes::upload::router())
        .merge(routes::activities::router())
        .with_state(state)
}
