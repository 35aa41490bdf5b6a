//! Shared response envelope types for API handlers.
//!
//! List-style endpoints use a `{ "data": ... }` envelope; the generation
//! endpoints return their fixed wire shapes directly because callers poll
//! them with non-envelope clients.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
