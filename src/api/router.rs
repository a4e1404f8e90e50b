use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use super::gateway;
use super::health;
use super::keymem;
use super::middleware::logging_middleware;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    // every other path is a protected route
    let gateway_routes = get(gateway::verify_token)
        .put(gateway::mint_token)
        .post(gateway::metered_access);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .merge(keymem::create_keymem_router())
        .route("/", gateway_routes.clone())
        .route("/{*path}", gateway_routes)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(
            // spans carry the path only; tokens can ride in the query string
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::super::keymem::test_support::TestApp;

    #[tokio::test]
    async fn test_static_routes_win_over_gateway() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call("GET", "/keymem/listkey", Some(&app.admin), None)
            .await;
        assert_eq!(status, 200);
        assert!(body["keys"].is_array());
    }

    #[tokio::test]
    async fn test_root_path_is_a_protected_route() {
        let app = TestApp::new().await;
        let secret = app.entitled_key(1, 1).await;

        let (status, body) = app.call("PUT", "/", Some(&secret), None).await;
        assert_eq!(status, 200);
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let app = TestApp::new().await;

        let (status, _) = app.call("DELETE", "/v1", None, None).await;
        assert_eq!(status, 405);
    }
}
