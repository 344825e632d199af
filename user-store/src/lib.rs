//! # user-store
//!
//! A small HTTP service holding user records in process memory and exposing
//! list, create, update and delete over JSON, with a generated OpenAPI
//! document describing the endpoints.
//!
//! ## Endpoints
//!
//! - `GET /users` - every record, in insertion order
//! - `POST /users` - append a record
//! - `GET /users/{id}` - one record
//! - `PUT /users/{id}` - overwrite the names present in the body
//! - `DELETE /users/{id}` - remove every record with that id
//! - `GET /health`, `GET /ready` - probes
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! ## Example
//!
//! ```rust,no_run
//! use user_store::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone());
//!     Server::new(config).serve(state).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod openapi;
pub mod server;
pub mod state;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, IdStrategy, LogFormat, StoreConfig};
    pub use crate::error::{Error, Result};
    pub use crate::ids::{RequestId, UserId};
    pub use crate::models::{CreateUserRequest, UpdateUserRequest, User};
    pub use crate::observability::init_tracing;
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::store::UserStore;
}
