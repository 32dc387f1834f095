use thiserror::Error;

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Failure taxonomy for every server round trip.
///
/// The mirror is guaranteed untouched whenever one of these is returned;
/// nothing here is retried automatically and none of it is fatal.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure: no usable response arrived.
    #[error("request to {url} failed before a response arrived: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status. `detail` carries the
    /// backend's own message when the body had one.
    #[error("server rejected {url} ({status}): {detail}")]
    Server {
        url: String,
        status: u16,
        detail: String,
    },
    /// Success status but the body was empty or did not decode as the
    /// expected record shape. Fails closed: nothing partial is mirrored.
    #[error("unusable success body from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
    /// Another mutation of the same scope is still awaiting its response.
    #[error("a {operation} request is already in flight")]
    MutationInFlight { operation: &'static str },
    /// The synchronizer was detached from its view; the request was
    /// aborted and no local state was changed.
    #[error("synchronizer is detached from its view")]
    Detached,
}

impl SyncError {
    /// Message suitable for direct display, preferring the server's
    /// `detail` text verbatim.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Server { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}
