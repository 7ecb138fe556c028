/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Error types for the A/V client.

use thiserror::Error;

/// Errors returned by fallible [`JitsiAvClient`](crate::JitsiAvClient) operations.
///
/// Most host-facing calls never fail (they log and degrade instead); these
/// cover configuration problems and calls that need a live conference.
#[derive(Debug, Error)]
pub enum AvError {
    /// `initialize()` has not completed, so there are no connection options.
    #[error("client is not initialized")]
    NotInitialized,

    /// The operation needs a joined conference.
    #[error("not connected to a conference")]
    NotConnected,

    /// Establishing the transport or conference took too long.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// A configured URL or option could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error reported by the wrapped conferencing library.
    #[error("library error: {0}")]
    Library(#[from] anyhow::Error),
}

impl From<url::ParseError> for AvError {
    fn from(err: url::ParseError) -> Self {
        AvError::InvalidConfig(err.to_string())
    }
}
