//! Error types for Blaze operations.
//!
//! This module defines the main error type [`BlazeError`] which represents
//! everything that can go wrong while locating, cleaning, fetching, or
//! rendering an article.
//!
//! # Example
//!
//! ```rust
//! use blaze_core::{BlazeError, Result};
//!
//! fn require_markup(html: &str) -> Result<&str> {
//!     if html.is_empty() {
//!         return Err(BlazeError::NoCandidate);
//!     }
//!     Ok(html)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for content extraction operations.
///
/// Only [`BlazeError::NoCandidate`] is a domain outcome. Every other variant
/// reports a failure of the environment (bad selector, bad pattern, network,
/// file system) and is propagated unchanged to the caller.
///
/// # Example
///
/// ```rust
/// use blaze_core::{BlazeError, parse};
///
/// match parse("<html><body><p>Too short.</p></body></html>") {
///     Ok(article) => println!("Title: {}", article.title),
///     Err(BlazeError::NoCandidate) => println!("Nothing worth reading here"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum BlazeError {
    /// No semantic element and no scored container met the minimum bar.
    ///
    /// Callers usually answer this with a "page could not be simplified"
    /// fallback. The extractor never fabricates content for it.
    #[error("No suitable content candidate was found in the document")]
    NoCandidate,

    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, including invalid CSS selectors in configuration.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A noise phrase or other configured pattern is not a valid regex.
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Streaming HTML rewrite failed.
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),

    /// Serialization of an article or configuration failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File or stream I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for BlazeError.
pub type Result<T> = std::result::Result<T, BlazeError>;
