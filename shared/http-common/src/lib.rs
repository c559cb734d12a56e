//! Shared HTTP utilities for the QR URL workspace.
//!
//! Provides the JSON error envelope, timestamp formatting and query parsing
//! used by the api-server.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::SystemTime;

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Create a structured error JSON with a default message based on the code.
///
/// Returns: `{"error": {"code": "<code>", "message": "<default message>"}}`
pub fn json_err(code: &str) -> serde_json::Value {
    let message = match code {
        "not_found" => "Resource not found",
        "bad_request" => "Bad request",
        "invalid_url" => "The URL is not valid",
        "confirmation_required" => "The URL was corrected and needs your approval",
        "error" | "internal" => "Internal server error",
        _ => code, // Fallback to code as message for unknown codes
    };
    serde_json::json!({"error": {"code": code, "message": message}})
}

/// Create a structured error JSON with a custom message.
///
/// Returns: `{"error": {"code": "<code>", "message": "<message>"}}`
pub fn json_error_with_message(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"code": code, "message": message}})
}

// ============================================================================
// Time Utilities
// ============================================================================

/// Convert SystemTime to RFC3339 string (seconds precision, UTC).
pub fn system_time_to_rfc3339(t: SystemTime) -> String {
    let dt: DateTime<Utc> = t.into();
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Query Parsing
// ============================================================================

/// Largest page a list endpoint will return.
pub const MAX_LIMIT: usize = 500;

/// Parse a `limit` query parameter from a query string.
///
/// Returns `Some(n)` if `limit=n` is found and `n` is in range 1-500.
/// Returns `None` otherwise.
pub fn parse_limit_query(query: Option<&str>) -> Option<usize> {
    let q = query?;
    for pair in q.split('&') {
        let mut it = pair.splitn(2, '=');
        let key = it.next()?;
        if key == "limit" {
            if let Some(val) = it.next() {
                if let Ok(n) = val.parse::<usize>() {
                    if (1..=MAX_LIMIT).contains(&n) {
                        return Some(n);
                    }
                }
            }
        }
    }
    None
}

/// Whether a query string carries a `limit` key at all, valid or not.
pub fn has_limit_param(query: Option<&str>) -> bool {
    query.is_some_and(|q| {
        q.split('&')
            .any(|pair| pair.split('=').next() == Some("limit"))
    })
}
