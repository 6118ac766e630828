use std::error::Error;

use crate::answer::{Answer, UploadReceipt};
use crate::error::ErrorKind;
use crate::file::DocumentFile;

/// The error type for a remote service.
pub trait RemoteServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the human-readable message the service itself supplied, if
    /// any.
    ///
    /// This is different from the `Display` output, which describes the
    /// failure from the client side.
    fn server_message(&self) -> Option<&str> {
        None
    }
}

/// A remote service that stores documents and answers questions about them.
///
/// Once the service is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it, and
/// the service should be prepared for being dropped anytime.
pub trait RemoteService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: RemoteServiceError;

    /// Uploads a document.
    ///
    /// The returned future must not borrow `self` or `file`.
    fn upload(
        &self,
        file: &DocumentFile,
    ) -> impl Future<Output = Result<UploadReceipt, Self::Error>> + Send + 'static;

    /// Asks a question about the uploaded documents.
    ///
    /// The returned future must not borrow `self` or `question`.
    fn ask(
        &self,
        question: &str,
    ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + 'static;
}
