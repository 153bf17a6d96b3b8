//! Router assembly and state initialization

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{self, AppState};
use crate::automation::AutomationClient;
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::lookup::{ImageLookupRelay, SerpApiClient, VisualSearchProvider};

/// Build the relay router
///
/// Lookup routes are served at the root (legacy paths) and under `/api/v1`.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let lookup_routes = Router::new()
        .route("/identify", post(handlers::identify))
        .route("/identify-watch", post(handlers::identify_watch))
        .route("/send-to-automation", post(handlers::send_to_automation));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(lookup_routes.clone())
        .nest("/api/v1", lookup_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Build handler state around a given provider
pub fn init_app_state_with_provider(
    config: Config,
    provider: Arc<dyn VisualSearchProvider>,
) -> Result<AppState> {
    if !config.provider.has_api_key() {
        warn!("Provider API key is not set; lookups will fail with a configuration error");
    }

    let relay = ImageLookupRelay::new(
        provider,
        config.provider.api_key,
        config.relay.max_results,
    );
    let automation = AutomationClient::new(config.automation.webhook_url)?;

    Ok(AppState {
        relay: Arc::new(relay),
        automation: Arc::new(automation),
    })
}

/// Build handler state with the SerpAPI provider from configuration
pub fn init_app_state(config: Config) -> Result<AppState> {
    let provider = SerpApiClient::new(&config.provider).map_err(|e| {
        RelayError::configuration(format!("Failed to create provider client: {}", e))
    })?;

    init_app_state_with_provider(config, Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_app_state_without_credential() {
        let state = init_app_state(Config::default()).unwrap();
        assert!(!state.relay.has_credential());
        assert!(!state.automation.is_configured());
        assert_eq!(state.relay.max_results(), 5);
    }
}
