//! HTTP server with graceful shutdown

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    handlers,
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
    openapi,
    state::AppState,
};

/// Routes of the service, with state applied but without middleware
pub fn routes(state: AppState) -> Result<Router> {
    let docs = openapi::router(openapi::api_docs(state.config()))?;

    let router = Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::readiness))
        .merge(docs)
        .with_state(state);

    Ok(router)
}

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full application: routes for `state` wrapped in the middleware stack
    pub fn app(&self, state: AppState) -> Result<Router> {
        Ok(self.with_middleware(routes(state)?))
    }

    /// Run the server until SIGINT or SIGTERM
    pub async fn serve(self, state: AppState) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let listener = TcpListener::bind(&addr).await?;
        self.serve_on(listener, state).await
    }

    /// Run the server on an already bound listener
    pub async fn serve_on(self, listener: TcpListener, state: AppState) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!("Starting {} on {}", self.config.service.name, addr);

        self.log_middleware_config();
        let app = self.app(state)?;

        tracing::info!("Server listening on {}", addr);
        tracing::info!("  GET    /users - List users");
        tracing::info!("  POST   /users - Create user");
        tracing::info!("  GET    /users/{{id}} - Get user");
        tracing::info!("  PUT    /users/{{id}} - Update user");
        tracing::info!("  DELETE /users/{{id}} - Delete user");
        tracing::info!("  GET    {} - OpenAPI document", openapi::OPENAPI_JSON_PATH);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Wrap `app` in the middleware stack
    ///
    /// Layers are applied in reverse order: the last one added runs first.
    fn with_middleware(&self, app: Router) -> Router {
        let body_limit = self.config.middleware.body_limit_mb * 1024 * 1024;

        app
            // CORS (outermost layer) - configurable
            .layer(self.build_cors_layer())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(self.config.service.timeout_secs),
            ))
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer())
            // Panic recovery (innermost layer)
            .layer(CatchPanicLayer::new())
    }

    /// Log middleware configuration for debugging
    fn log_middleware_config(&self) {
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - Sensitive header masking: enabled");
        tracing::info!(
            "  - Request body limit: {} MB",
            self.config.middleware.body_limit_mb
        );
        tracing::info!("  - Compression: enabled");
        tracing::info!("  - CORS mode: {}", self.config.middleware.cors_mode);
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );
        tracing::info!(
            "  - Id strategy: {:?}, ignore empty fields: {}",
            self.config.store.id_strategy,
            self.config.store.ignore_empty_fields
        );
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                CorsLayer::permissive()
            }
            "restrictive" | "disabled" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                CorsLayer::new()
            }
            other => {
                tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", other);
                CorsLayer::permissive()
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::IdStrategy, middleware::REQUEST_ID_HEADER, store::UserStore};
    use axum::body::Body;
    use http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(config: Config) -> Router {
        let state = AppState::new(config.clone());
        Server::new(config).app(state).unwrap()
    }

    fn app() -> Router {
        app_with(Config::default())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn ids(users: &Value) -> Vec<u64> {
        users
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, 3000);
    }

    #[tokio::test]
    async fn test_list_seeded_users() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/users", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "id": 1, "firstName": "Steven", "lastName": "Spielberg" },
                { "id": 2, "firstName": "Peter", "lastName": "Jackson" },
                { "id": 3, "firstName": "James", "lastName": "Cameron" }
            ])
        );
    }

    #[tokio::test]
    async fn test_create_appends_and_confirms() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "firstName": "Ann", "lastName": "Lee" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "New user added",
                "user": { "id": 4, "firstName": "Ann", "lastName": "Lee" }
            })
        );

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(ids(&users), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_create_with_empty_body() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/users", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], json!({ "id": 4 }));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_field() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/2",
            Some(json!({ "firstName": "Petra" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "User successfully updated",
                "user": { "id": 2, "firstName": "Petra", "lastName": "Jackson" }
            })
        );
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_404() {
        let app = app();
        let (_, before) = send(&app, Method::GET, "/users", None).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/999",
            Some(json!({ "firstName": "Nobody" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "User not found" }));

        let (_, after) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_non_numeric_id_is_404() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/abc",
            Some(json!({ "firstName": "X" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_update_malformed_json_is_400() {
        let app = app();
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/users/1")
            .body(Body::from("{firstName"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_non_string_name() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "firstName": 5, "lastName": "Lee" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], json!({ "id": 4, "firstName": "5", "lastName": "Lee" }));
    }

    #[tokio::test]
    async fn test_update_unknown_user_with_non_string_name_is_404() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/999",
            Some(json!({ "firstName": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_update_with_falsy_name_keeps_record() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/2",
            Some(json!({ "firstName": false, "lastName": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["user"],
            json!({ "id": 2, "firstName": "Peter", "lastName": "Jackson" })
        );
    }

    #[tokio::test]
    async fn test_create_with_array_body_has_no_names() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!(["Ann", "Lee"])),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], json!({ "id": 4 }));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_success() {
        let app = app();

        for _ in 0..2 {
            let (status, body) = send(&app, Method::DELETE, "/users/1", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "message": "User has been deleted." }));

            let (_, users) = send(&app, Method::GET, "/users", None).await;
            assert_eq!(ids(&users), vec![2, 3]);
        }
    }

    #[tokio::test]
    async fn test_delete_non_numeric_id_is_noop() {
        let app = app();
        let (status, body) = send(&app, Method::DELETE, "/users/abc", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User has been deleted.");

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(ids(&users), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/users/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lastName"], "Cameron");

        let (status, _) = send(&app, Method::GET, "/users/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_length_strategy_reuses_id_after_tail_delete() {
        let mut config = Config::default();
        config.store.id_strategy = IdStrategy::Length;
        let app = app_with(config);

        send(&app, Method::DELETE, "/users/3", None).await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "firstName": "Ann", "lastName": "Lee" })),
        )
        .await;
        assert_eq!(body["user"]["id"], 3);
    }

    #[tokio::test]
    async fn test_sequential_strategy_skips_freed_id() {
        let app = app();

        send(&app, Method::DELETE, "/users/3", None).await;
        let (_, body) = send(&app, Method::POST, "/users", Some(json!({}))).await;
        assert_eq!(body["user"]["id"], 4);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app();
        let (status, body) = send(&app, Method::GET, openapi::OPENAPI_JSON_PATH, None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["openapi"].as_str().unwrap().starts_with("3."));
        assert!(body["paths"]["/users"]["get"].is_object());
        assert!(body["paths"]["/users/{id}"]["put"].is_object());
        assert!(body["components"]["schemas"]["User"].is_object());
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"], 3);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let request = Request::builder().uri("/users").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(id.starts_with("req_"));
    }

    #[tokio::test]
    async fn test_routes_share_injected_store() {
        let config = Config::default();
        let state = AppState::with_store(config.clone(), UserStore::seeded());
        let app = Server::new(config).app(state.clone()).unwrap();

        send(&app, Method::DELETE, "/users/2", None).await;
        assert_eq!(state.users().len().await, 2);
    }

    #[tokio::test]
    async fn test_serve_on_bound_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = Config::default();
        let state = AppState::new(config.clone());

        let server = tokio::spawn(Server::new(config).serve_on(listener, state));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /users HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Spielberg"));
        server.abort();
    }
}
