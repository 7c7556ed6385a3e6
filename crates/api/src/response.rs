//! Shared response envelope for API handlers.
//!
//! Every JSON response uses a `{ "data": ... }` envelope; use
//! [`DataResponse`] rather than ad-hoc `serde_json::json!` so the payload
//! shape is checked at compile time.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
