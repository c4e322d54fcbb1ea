use axum::Router;

use crate::{Config, UpstreamClient};

mod alerts;
mod dashboard;
mod health;

// ---

pub fn router(upstream: UpstreamClient, config: Config) -> Router {
    // ---
    Router::new()
        .merge(alerts::router())
        .merge(dashboard::router())
        .merge(health::router())
        .with_state((upstream, config))
}
