use serde::{Deserialize, Serialize};

/// Error body the backend attaches to non-success responses.
///
/// The `detail` string is shown to the user verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
