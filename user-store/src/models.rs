//! Data models for the users API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::ids::UserId;

/// Confirmation sent after a successful create
pub const MSG_CREATED: &str = "New user added";
/// Confirmation sent after a successful update
pub const MSG_UPDATED: &str = "User successfully updated";
/// Confirmation sent for every delete, whether or not a record was removed
pub const MSG_DELETED: &str = "User has been deleted.";

/// A stored user record
///
/// Names that were never supplied stay absent and are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = u64, example = 1)]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Steven")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Spielberg")]
    pub last_name: Option<String>,
}

impl User {
    pub fn new(id: UserId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }
}

/// The records present at process start
pub fn seed_users() -> Vec<User> {
    vec![
        User::new(UserId::new(1), "Steven", "Spielberg"),
        User::new(UserId::new(2), "Peter", "Jackson"),
        User::new(UserId::new(3), "James", "Cameron"),
    ]
}

/// Create user request; both names are optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "lenient_name")]
    #[schema(example = "Ann")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_name")]
    #[schema(example = "Lee")]
    pub last_name: Option<String>,
}

/// Update user request
///
/// A field that is absent, `null`, `false` or `0` leaves the stored value
/// alone.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "lenient_name")]
    #[schema(example = "Petra")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_name")]
    pub last_name: Option<String>,
}

/// Read a name from any JSON value.
///
/// Names are never a validation failure: strings pass through, `null`,
/// `false` and `0` count as not provided, and anything else is kept as its
/// JSON text.
fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    };
    Ok(name)
}

impl UpdateUserRequest {
    /// Check if the request names any field
    pub fn has_updates(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }
}

/// Body of create and update responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserMessageResponse {
    #[schema(example = "New user added")]
    pub message: String,
    pub user: User,
}

impl UserMessageResponse {
    pub fn created(user: User) -> Self {
        Self {
            message: MSG_CREATED.to_string(),
            user,
        }
    }

    pub fn updated(user: User) -> Self {
        Self {
            message: MSG_UPDATED.to_string(),
            user,
        }
    }
}

/// Body of the delete response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User has been deleted.")]
    pub message: String,
}

impl MessageResponse {
    pub fn deleted() -> Self {
        Self {
            message: MSG_DELETED.to_string(),
        }
    }
}
