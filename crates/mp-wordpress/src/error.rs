//! Error types for the WordPress client.

use std::str::Utf8Error;

/// Error from WordPress API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Invalid proxy URL in the site configuration.
    #[error("invalid proxy {url}: {message}")]
    Proxy {
        /// Configured proxy URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The server answered with an XML-RPC fault.
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// `faultCode` member.
        code: i64,
        /// `faultString` member.
        message: String,
    },

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] Utf8Error),

    /// Response parsed as XML but does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}
