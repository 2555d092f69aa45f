//! Data models for the URL shortener application
//!
//! This module defines the persisted link record and the request/response
//! bodies exchanged over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single short code -> original URL mapping as stored in the database
///
/// Every field is immutable after creation except `click_count`, which only
/// grows through the redirect path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Surrogate key assigned by the store, strictly increasing and never reused
    pub id: u64,

    /// The URL exactly as it was submitted (no normalization)
    pub original_url: String,

    /// Unique short code (e.g., "aB3x9Z" or a custom "promo2024")
    pub short_code: String,

    /// Timestamp when this record was created
    pub created_at: DateTime<Utc>,

    /// Number of redirects served for this short code
    #[serde(default)]
    pub click_count: u64,
}

/// Request payload for creating a new short URL
///
/// # Example
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "custom_code": "promo24"  // Optional
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct CreateRequest {
    /// The original URL to be shortened
    pub url: String,

    /// Optional custom short code (4-10 alphanumeric characters)
    /// If not provided, a random 6-character code is generated
    pub custom_code: Option<String>,
}

/// Response returned after successfully creating (or deduplicating) a short URL
///
/// # Example
/// ```json
/// {
///   "short_url": "http://localhost:8080/aB3x9Z"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    /// The complete shortened URL
    pub short_url: String,
}

/// Liveness probe payload
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}
