//! A local fake remote service for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use docqa_service::{
    Answer, DocumentFile, ErrorKind, RemoteService, RemoteServiceError,
    UploadReceipt,
};
use tokio::sync::watch;
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
}

impl From<PresetFailure> for Error {
    fn from(failure: PresetFailure) -> Self {
        Self {
            kind: failure.kind.into(),
            message: failure.message,
        }
    }
}

impl RemoteServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn server_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A gate that pending calls wait on. Open by default.
struct Gate(watch::Sender<bool>);

impl Gate {
    fn new(open: bool) -> Self {
        Self(watch::Sender::new(open))
    }

    fn set_open(&self, open: bool) {
        self.0.send_replace(open);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

async fn pass_gate(gate: Option<watch::Receiver<bool>>) {
    if let Some(mut gate) = gate {
        // An error means the service was dropped, let the call go through.
        gate.wait_for(|open| *open).await.ok();
    }
}

#[derive(Default)]
struct Script {
    answers: VecDeque<PresetAnswer>,
    uploads: HashMap<String, PresetUpload>,
    upload_delays: HashMap<String, Duration>,
    upload_gates: HashMap<String, Gate>,
    answer_delay: Option<Duration>,
    asked: Vec<String>,
    uploaded: Vec<String>,
}

struct Inner {
    script: Mutex<Script>,
    answer_gate: Gate,
    calls: AtomicUsize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            script: Default::default(),
            answer_gate: Gate::new(true),
            calls: AtomicUsize::new(0),
        }
    }
}

/// A local fake service for testing purpose.
///
/// Questions are answered from a queue of [`PresetAnswer`]s in call order.
/// When the queue runs dry, calls fail with a transport error. Uploads are
/// accepted unless a [`PresetUpload`] was registered for the file name.
///
/// Clones share the same script and call records, so a test can keep one
/// clone around to inspect what the session did with the other.
///
/// # Note
///
/// This type is not optimized for production use, you should only use it for
/// testing.
#[derive(Clone, Default)]
pub struct TestService {
    inner: Arc<Inner>,
}

impl TestService {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the response to the next unanswered question.
    #[inline]
    pub fn add_answer(&self, preset: PresetAnswer) {
        self.script().answers.push_back(preset);
    }

    /// Sets how uploads of the named file respond.
    #[inline]
    pub fn set_upload(&self, name: &str, preset: PresetUpload) {
        self.script().uploads.insert(name.to_owned(), preset);
    }

    /// Delays uploads of the named file.
    #[inline]
    pub fn set_upload_delay(&self, name: &str, delay: Duration) {
        self.script().upload_delays.insert(name.to_owned(), delay);
    }

    /// Delays every answer.
    #[inline]
    pub fn set_answer_delay(&self, delay: Duration) {
        self.script().answer_delay = Some(delay);
    }

    /// Makes questions hang until [`TestService::release_answers`].
    #[inline]
    pub fn hold_answers(&self) {
        self.inner.answer_gate.set_open(false);
    }

    /// Lets held and future questions complete.
    #[inline]
    pub fn release_answers(&self) {
        self.inner.answer_gate.set_open(true);
    }

    /// Makes uploads of the named file hang until released.
    pub fn hold_upload(&self, name: &str) {
        let mut script = self.script();
        match script.upload_gates.get(name) {
            Some(gate) => gate.set_open(false),
            None => {
                script.upload_gates.insert(name.to_owned(), Gate::new(false));
            }
        }
    }

    /// Lets held uploads of the named file complete.
    pub fn release_upload(&self, name: &str) {
        if let Some(gate) = self.script().upload_gates.get(name) {
            gate.set_open(true);
        }
    }

    /// Total number of calls made, uploads and questions alike.
    #[inline]
    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Questions asked so far, in call order.
    #[inline]
    pub fn asked_questions(&self) -> Vec<String> {
        self.script().asked.clone()
    }

    /// Names of the files uploaded so far, in call order.
    #[inline]
    pub fn uploaded_files(&self) -> Vec<String> {
        self.script().uploaded.clone()
    }
}

impl RemoteService for TestService {
    type Error = crate::Error;

    fn upload(
        &self,
        file: &DocumentFile,
    ) -> impl Future<Output = Result<UploadReceipt, Self::Error>> + Send + 'static
    {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let (preset, delay, gate) = {
            let mut script = self.script();
            script.uploaded.push(file.name.clone());
            (
                script.uploads.get(&file.name).cloned().unwrap_or_default(),
                script.upload_delays.get(&file.name).copied(),
                script.upload_gates.get(&file.name).map(Gate::subscribe),
            )
        };

        async move {
            pass_gate(gate).await;
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match preset {
                PresetUpload::Accept => Ok(UploadReceipt::default()),
                PresetUpload::Failure(failure) => Err(failure.into()),
            }
        }
    }

    fn ask(
        &self,
        question: &str,
    ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + 'static
    {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let (preset, delay) = {
            let mut script = self.script();
            script.asked.push(question.to_owned());
            (script.answers.pop_front(), script.answer_delay)
        };
        let gate = Some(self.inner.answer_gate.subscribe());

        async move {
            pass_gate(gate).await;
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match preset {
                Some(PresetAnswer::Answer(answer)) => Ok(answer),
                Some(PresetAnswer::Failure(failure)) => Err(failure.into()),
                None => Err(Error {
                    kind: ErrorKind::Transport,
                    message: Some("no preset answer left".to_owned()),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_answers_in_order() {
        let service = TestService::default();
        service.add_answer(PresetAnswer::text("First."));
        service.add_answer(PresetAnswer::Failure(PresetFailure::transport()));

        let first = service.ask("one");
        let second = service.ask("two");
        assert_eq!(first.await.unwrap().text, "First.");
        assert_eq!(second.await.unwrap_err().kind(), ErrorKind::Transport);

        let err = service.ask("three").await.unwrap_err();
        assert_eq!(err.server_message(), Some("no preset answer left"));
        assert_eq!(service.asked_questions(), ["one", "two", "three"]);
        assert_eq!(service.call_count(), 3);
    }

    #[tokio::test]
    async fn test_hold_answers() {
        let service = TestService::default();
        service.add_answer(PresetAnswer::text("Done."));
        service.hold_answers();

        let mut fut = Box::pin(service.ask("wait"));
        assert!(
            timeout(Duration::from_millis(20), &mut fut).await.is_err(),
            "held answer completed early"
        );

        service.release_answers();
        let answer = timeout(Duration::from_millis(500), fut)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(answer.text, "Done.");
    }

    #[tokio::test]
    async fn test_uploads() {
        let service = TestService::default();
        service.set_upload(
            "bad.pdf",
            PresetUpload::Failure(PresetFailure::rejected("Corrupt PDF")),
        );

        let good = DocumentFile::new("good.txt", "text/plain", "text");
        let bad = DocumentFile::new("bad.pdf", "application/pdf", "%PDF");
        assert!(service.upload(&good).await.is_ok());

        let err = service.upload(&bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.server_message(), Some("Corrupt PDF"));
        assert_eq!(service.uploaded_files(), ["good.txt", "bad.pdf"]);
    }

    #[tokio::test]
    async fn test_hold_upload() {
        let service = TestService::default();
        service.hold_upload("slow.txt");

        let slow = DocumentFile::new("slow.txt", "text/plain", "");
        let mut fut = Box::pin(service.upload(&slow));
        assert!(timeout(Duration::from_millis(20), &mut fut).await.is_err());

        service.release_upload("slow.txt");
        assert!(
            timeout(Duration::from_millis(500), fut)
                .await
                .unwrap()
                .is_ok()
        );
    }
}
