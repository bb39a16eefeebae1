//! Failures of the build and dispatch stages.

use std::error::Error as StdError;

use thiserror::Error;

/// Every failure the request pipeline can report.
///
/// None of these is fatal: the `Display` text is what ends up in the
/// Response pane.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The URL pane does not hold a parseable absolute URL.
    #[error("Error parsing URL: {0}")]
    InvalidUrl(String),

    /// The parameter map could not be encoded as JSON.
    #[error("Error creating JSON body: {0}")]
    BodySerialization(String),

    /// DNS, connect, TLS, timeout, or any failure before headers arrived.
    #[error("Error sending request: {0}")]
    Transport(String),

    /// Status and headers arrived but the body could not be read.
    #[error("Error reading response ({status}): {detail}")]
    BodyRead { status: String, detail: String },
}

/// Render an error with its `source()` chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
pub fn describe_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
