use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use docqa_service::{
    Answer, DocumentFile, ErrorKind, RemoteService, RemoteServiceError,
    UploadReceipt,
};
use tokio::time::timeout;
use tracing::Instrument;

/// How long a remote call may take unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

type DispatchResult<T> = Result<T, DispatchError>;
type BoxedFuture<T> = Pin<Box<dyn Future<Output = DispatchResult<T>> + Send>>;
type UploadFn = Arc<dyn Fn(&DocumentFile) -> BoxedFuture<UploadReceipt> + Send + Sync>;
type AskFn = Arc<dyn Fn(&str) -> BoxedFuture<Answer> + Send + Sync>;

/// A failed remote call, with the service's own error type erased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct DispatchError {
    kind: ErrorKind,
    detail: String,
    server_message: Option<String>,
}

impl DispatchError {
    fn from_service<E: RemoteServiceError>(err: E) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
            server_message: err.server_message().map(ToOwned::to_owned),
        }
    }

    fn timed_out(after: Duration) -> Self {
        Self {
            kind: ErrorKind::TimedOut,
            detail: format!("no response after {after:?}"),
            server_message: None,
        }
    }
}

impl RemoteServiceError for DispatchError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }
}

/// A wrapper around a remote service that provides a type-erased interface
/// for the session, and bounds every call with a timeout.
#[derive(Clone)]
pub struct RequestDispatcher {
    upload_fn: UploadFn,
    ask_fn: AskFn,
    timeout: Duration,
}

impl RequestDispatcher {
    /// Wraps `service`, using [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new<S: RemoteService + 'static>(service: S) -> Self {
        // Erase `S` so the session state doesn't need a type parameter.
        let service = Arc::new(service);
        let upload_fn: UploadFn = {
            let service = Arc::clone(&service);
            Arc::new(move |file: &DocumentFile| -> BoxedFuture<UploadReceipt> {
                let fut = service.upload(file);
                Box::pin(async move { fut.await.map_err(DispatchError::from_service) })
            })
        };
        let ask_fn: AskFn = Arc::new(move |question: &str| -> BoxedFuture<Answer> {
            let fut = service.ask(question);
            Box::pin(async move { fut.await.map_err(DispatchError::from_service) })
        });
        Self {
            upload_fn,
            ask_fn,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the per-call timeout.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uploads a document.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, dropping the future abandons the request.
    pub async fn upload(&self, file: &DocumentFile) -> DispatchResult<UploadReceipt> {
        let fut = (self.upload_fn)(file);
        self.bounded(fut)
            .instrument(debug_span!("dispatch upload", name = %file.name))
            .await
    }

    /// Asks a question.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, dropping the future abandons the request.
    pub async fn ask(&self, question: &str) -> DispatchResult<Answer> {
        let fut = (self.ask_fn)(question);
        self.bounded(fut).instrument(debug_span!("dispatch ask")).await
    }

    async fn bounded<T>(&self, fut: BoxedFuture<T>) -> DispatchResult<T> {
        let result = match timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::timed_out(self.timeout)),
        };
        if let Err(err) = &result {
            warn!("remote call failed: {err}");
        } else {
            trace!("remote call succeeded");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use docqa_test_service::{
        PresetAnswer, PresetFailure, PresetUpload, TestService,
    };

    use super::*;

    #[tokio::test]
    async fn test_ask() {
        let service = TestService::default();
        service.add_answer(PresetAnswer::text("Yes."));
        let dispatcher = RequestDispatcher::new(service.clone());

        let answer = dispatcher.ask("Is it?").await.unwrap();
        assert_eq!(answer.text, "Yes.");

        // The script is exhausted now.
        let err = dispatcher.ask("Is it?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(service.asked_questions(), ["Is it?", "Is it?"]);
    }

    #[tokio::test]
    async fn test_error_erasure() {
        let service = TestService::default();
        service.add_answer(PresetAnswer::Failure(PresetFailure::rejected(
            "Question cannot be empty",
        )));
        service.set_upload(
            "a.txt",
            PresetUpload::Failure(PresetFailure::transport()),
        );
        let dispatcher = RequestDispatcher::new(service);

        let err = dispatcher.ask("?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.server_message(), Some("Question cannot be empty"));

        let file = DocumentFile::new("a.txt", "text/plain", "abc");
        let err = dispatcher.upload(&file).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let service = TestService::default();
        service.add_answer(PresetAnswer::text("Too late."));
        service.set_answer_delay(Duration::from_secs(10));
        let dispatcher = RequestDispatcher::new(service)
            .with_timeout(Duration::from_secs(1));

        let err = dispatcher.ask("Still there?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }
}
