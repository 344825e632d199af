//! Identifiers: user record ids and per-request tracing ids
//!
//! # User ids
//!
//! User ids are positive integers. Path segments are parsed leniently: leading
//! digits win and trailing garbage is ignored, so `/users/12abc` addresses user
//! 12. A segment with no leading digits is "not a number" and matches no
//! record.
//!
//! ```rust
//! use user_store::ids::UserId;
//!
//! assert_eq!(UserId::parse_lenient("12abc"), Some(UserId::new(12)));
//! assert_eq!(UserId::parse_lenient("abc"), None);
//! ```
//!
//! # Request ids
//!
//! Request ids use the TypeID format with a "req" prefix and a UUIDv7 suffix,
//! making them time-sortable for log correlation.

use mti::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use http::Request;

/// Identifier of a stored user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parse a path segment the way a lenient integer parser would.
    ///
    /// Leading/trailing whitespace and a `+` sign are accepted; parsing stops
    /// at the first non-digit. Returns `None` when there are no leading
    /// digits, the value is negative or zero, or it overflows `u64`: none of
    /// those can name a stored record.
    pub fn parse_lenient(segment: &str) -> Option<Self> {
        let trimmed = segment.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..digits_end];
        if digits.is_empty() {
            return None;
        }

        let value: u64 = digits.parse().ok()?;
        if negative || value == 0 {
            return None;
        }

        Some(Self(value))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A type-safe request identifier for distributed tracing.
///
/// Example: `req_01h455vb4pex5vsknk084sn02q`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    /// The prefix used for request IDs
    pub const PREFIX: &'static str = "req";

    /// Creates a new request ID with a UUIDv7 (time-sortable).
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `MakeRequestId` for tower-http's `SetRequestIdLayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = RequestId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}
