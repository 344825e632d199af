//! OpenAPI documentation
//!
//! The document is generated by utoipa from the `#[utoipa::path]` annotations
//! on the handlers and the `ToSchema` derives on the models. It is served as
//! JSON at [`OPENAPI_JSON_PATH`]; with the `swagger-ui` feature a Swagger UI is
//! mounted at [`SWAGGER_UI_PATH`] on top of the same document.

use axum::Router;
use utoipa::OpenApi;

use crate::{
    config::Config,
    error::{ErrorResponse, Result},
    handlers::users,
    health::{self, HealthResponse, ReadinessResponse},
    models::{CreateUserRequest, MessageResponse, UpdateUserRequest, User, UserMessageResponse},
    state::AppState,
};

/// Where the generated document is served
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Where Swagger UI is mounted (feature `swagger-ui`)
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    paths(
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        health::health,
        health::readiness,
    ),
    components(schemas(
        User,
        CreateUserRequest,
        UpdateUserRequest,
        UserMessageResponse,
        MessageResponse,
        ErrorResponse,
        HealthResponse,
        ReadinessResponse,
    )),
    tags(
        (name = "users", description = "In-memory user records"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Builder for adjusting the generated document's metadata
///
/// # Example
///
/// ```rust
/// use user_store::openapi::{ApiDoc, OpenApiBuilder};
/// use utoipa::OpenApi;
///
/// let doc = OpenApiBuilder::new(ApiDoc::openapi())
///     .title("Users")
///     .version("1.0.0")
///     .build();
/// assert_eq!(doc.info.title, "Users");
/// ```
pub struct OpenApiBuilder {
    openapi: utoipa::openapi::OpenApi,
}

impl OpenApiBuilder {
    /// Create a new OpenAPI builder from an existing OpenApi instance
    pub fn new(openapi: utoipa::openapi::OpenApi) -> Self {
        Self { openapi }
    }

    /// Set the API title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.openapi.info.title = title.into();
        self
    }

    /// Set the API version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.openapi.info.version = version.into();
        self
    }

    /// Set the API description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.openapi.info.description = Some(description.into());
        self
    }

    /// Add a server URL
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        use utoipa::openapi::ServerBuilder;
        let mut builder = ServerBuilder::new().url(url.into());
        if let Some(desc) = description {
            builder = builder.description(Some(desc));
        }
        self.openapi
            .servers
            .get_or_insert_with(Vec::new)
            .push(builder.build());
        self
    }

    /// Build the final OpenAPI specification
    pub fn build(self) -> utoipa::openapi::OpenApi {
        self.openapi
    }
}

/// The document for a service running with `config`
pub fn api_docs(config: &Config) -> utoipa::openapi::OpenApi {
    OpenApiBuilder::new(ApiDoc::openapi())
        .title(config.service.name.clone())
        .version(env!("CARGO_PKG_VERSION"))
        .description("CRUD operations over an in-memory collection of user records")
        .server(
            format!("http://localhost:{}", config.service.port),
            Some(format!("{} environment", config.service.environment)),
        )
        .build()
}

/// Routes serving the document (and Swagger UI when enabled)
#[cfg(not(feature = "swagger-ui"))]
pub fn router(openapi: utoipa::openapi::OpenApi) -> Result<Router<AppState>> {
    use axum::{
        http::{header, StatusCode},
        response::IntoResponse,
        routing::get,
    };

    use crate::error::Error;

    let body = openapi
        .to_json()
        .map_err(|e| Error::Internal(format!("Failed to serialize OpenAPI document: {}", e)))?;

    Ok(Router::new().route(
        OPENAPI_JSON_PATH,
        get(move || {
            let body = body.clone();
            async move {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response()
            }
        }),
    ))
}

/// Routes serving the document (and Swagger UI when enabled)
#[cfg(feature = "swagger-ui")]
pub fn router(openapi: utoipa::openapi::OpenApi) -> Result<Router<AppState>> {
    use utoipa_swagger_ui::SwaggerUi;

    Ok(SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, openapi)
        .into())
}
