mod builder;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use docqa_actor::Actor;
use docqa_service::DocumentFile;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::conversation::{Conversation, Message};
use crate::dispatcher::RequestDispatcher;
use crate::notify::NotificationSink;
use crate::upload::{FileRegistry, UploadPolicy, UploadedFileRecord};
use crate::view::ViewBinding;
pub use builder::SessionBuilder;
use state::{Action, DroppedFiles};

/// Whether a question is waiting for its answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionStage {
    /// Ready to accept a question.
    #[default]
    Idle,
    /// A question is in flight, further questions are ignored.
    AwaitingAnswer,
}

/// Everything a view needs to render the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The transcript, oldest first.
    pub messages: Vec<Message>,
    /// Uploaded files, in completion order.
    pub files: Vec<UploadedFileRecord>,
    /// The unsent question text.
    pub draft: String,
    /// Whether a question is in flight.
    pub stage: SessionStage,
    /// Number of uploads that haven't settled yet.
    pub uploads_in_flight: usize,
}

impl SessionSnapshot {
    /// Returns `true` while a question is in flight.
    #[inline]
    pub fn is_awaiting_answer(&self) -> bool {
        self.stage == SessionStage::AwaitingAnswer
    }

    /// Returns `true` while at least one upload is in flight.
    #[inline]
    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }
}

/// State of a session, owned by its actor task.
///
/// Every change goes through [`Action`]s, handled one at a time. Remote
/// calls run as separate tasks that report back with another action, so
/// the session keeps handling input while they are in flight.
pub(crate) struct SessionState {
    dispatcher: RequestDispatcher,
    sink: Arc<dyn NotificationSink>,
    policy: UploadPolicy,
    conversation: Conversation,
    stage: SessionStage,
    draft: String,
    registry: FileRegistry,
    uploads_in_flight: usize,
    view: ViewBinding,
    running_tasks: HashMap<u64, JoinHandle<()>>,
    next_task_id: u64,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

/// A Q&A session: one transcript, one file registry, one remote service.
///
/// All methods return immediately; observe the outcome through
/// [`Session::subscribe`]. Dropping the session stops it and abandons any
/// request still in flight.
pub struct Session {
    actor: Actor<SessionState>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl Session {
    /// Asks a question.
    ///
    /// Ignored if the trimmed text is empty or another question is still
    /// waiting for its answer.
    #[inline]
    pub fn submit_question<S: Into<String>>(&self, text: S) {
        self.send(Action::UserSubmitted(text.into()));
    }

    /// Replaces the unsent question text.
    #[inline]
    pub fn edit_draft<S: Into<String>>(&self, text: S) {
        self.send(Action::DraftEdited(text.into()));
    }

    /// Validates a batch of files and uploads the acceptable ones
    /// concurrently.
    #[inline]
    pub fn upload_files(&self, files: Vec<DocumentFile>) {
        self.send(Action::FilesDropped(DroppedFiles(files)));
    }

    /// Forgets the uploaded file at `index`. The service keeps the document.
    #[inline]
    pub fn remove_file(&self, index: usize) {
        self.send(Action::FileRemoved(index));
    }

    /// Empties the transcript, even while a question is in flight.
    #[inline]
    pub fn clear_chat(&self) {
        self.send(Action::ChatCleared);
    }

    /// Returns the latest state.
    #[inline]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a receiver that is notified on every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    fn send(&self, action: Action) {
        if let Err(err) = self.actor.send(action) {
            warn!("cannot reach the session: {err}");
        }
    }

    fn spawn_from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            dispatcher,
            sink,
            policy,
            on_scroll,
        } = builder;

        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let state = SessionState {
            dispatcher,
            sink,
            policy,
            conversation: Default::default(),
            stage: Default::default(),
            draft: Default::default(),
            registry: Default::default(),
            uploads_in_flight: 0,
            view: ViewBinding::new(on_scroll),
            running_tasks: Default::default(),
            next_task_id: 1,
            snapshot_tx,
        };
        let actor = Actor::spawn(state, Some("session"));
        Self { actor, snapshot_rx }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.actor.try_kill();
    }
}
