//! HTTP handlers
//!
//! Request bodies go through [`JsonBody`] rather than axum's `Json`: an empty
//! body or a JSON array counts as `{}`, the content type is not checked, and
//! malformed JSON or a bare scalar becomes a `400` with the service's error
//! body.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

pub mod users;

pub use crate::health::{health, readiness};
pub use users::{create_user, delete_user, get_user, list_users, update_user};

/// Lenient JSON body extractor
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| Error::from(e).into_response())?;

        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map(Self)
                .map_err(|e| Error::from(e).into_response()),
            // Arrays carry no named fields
            Value::Array(_) => Ok(Self(T::default())),
            _ => Err(Error::BadRequest(
                "Invalid JSON body: expected an object or array".to_string(),
            )
            .into_response()),
        }
    }
}
