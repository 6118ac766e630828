use serde::{Deserialize, Serialize};

/// An excerpt from an uploaded document that supports an answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceExcerpt {
    /// The excerpt text.
    pub content: String,
}

impl SourceExcerpt {
    /// Creates an excerpt.
    #[inline]
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// An answer produced by the remote service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub text: String,
    /// Supporting excerpts, in the order the service ranked them.
    #[serde(default)]
    pub sources: Vec<SourceExcerpt>,
    /// Whether the service flagged a problem while producing the answer.
    ///
    /// The text is still meant to be shown as-is.
    #[serde(default)]
    pub flagged: bool,
}

/// Acknowledgement of an accepted upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// An informational message from the service, if any.
    #[serde(default)]
    pub message: Option<String>,
}
