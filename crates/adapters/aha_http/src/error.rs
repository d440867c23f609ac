//! AHA adapter error types.

/// Errors specific to the AHA HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum AhaError {
    /// HTTP transport failure.
    #[error("AHA transport error")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with an unexpected HTTP status.
    #[error("gateway answered with HTTP {0}")]
    Status(u16),

    /// Response body could not be parsed as the expected XML document.
    #[error("failed to parse AHA response")]
    Xml(#[from] quick_xml::DeError),

    /// An endpoint path could not be joined onto the base url.
    #[error("invalid AHA endpoint url")]
    Url(#[from] url::ParseError),

    /// The gateway returned the all-zero session id — wrong credentials.
    #[error("login rejected (retry blocked for {block_time}s)")]
    LoginRejected {
        /// Seconds the gateway blocks further attempts.
        block_time: u64,
    },

    /// The gateway presented a challenge scheme this adapter cannot answer.
    #[error("unsupported login challenge {challenge}")]
    UnsupportedChallenge { challenge: String },

    /// The challenge could not be decoded (malformed salts or rounds).
    #[error("malformed login challenge {challenge}")]
    MalformedChallenge { challenge: String },

    /// A call was made without a session id.
    #[error("no session established")]
    NotLoggedIn,
}
