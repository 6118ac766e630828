use std::fmt::{self, Debug};

use docqa_actor::{Actor, Reducer};
use docqa_service::{Answer, DocumentFile, RemoteServiceError};
use tracing::Instrument;

use super::{SessionSnapshot, SessionStage, SessionState};
use crate::conversation::display_time;
use crate::dispatcher::DispatchError;
use crate::notify::Notification;
use crate::upload::{REJECTED_FILES_MESSAGE, UploadedFileRecord};

const ANSWER_FLAGGED_MESSAGE: &str =
    "The assistant encountered an error processing your question";
const ANSWER_FAILED_MESSAGE: &str =
    "Failed to get a response from the assistant";
const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";

/// Everything that can happen to a session.
#[derive(Debug)]
pub(crate) enum Action {
    DraftEdited(String),
    UserSubmitted(String),
    AssistantReplied { epoch: u64, answer: Answer },
    AssistantFailed { epoch: u64, error: DispatchError },
    ChatCleared,
    FilesDropped(DroppedFiles),
    FileUploaded { name: String, size_bytes: u64 },
    FileUploadFailed { name: String, error: DispatchError },
    FileRemoved(usize),
    TaskEnded(u64),
}

/// A batch of files, printed without their contents.
pub(crate) struct DroppedFiles(pub Vec<DocumentFile>);

impl Debug for DroppedFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|file| (&file.name, file.size_bytes)))
            .finish()
    }
}

impl Reducer for SessionState {
    type Action = Action;

    fn reduce(&mut self, action: Action, handle: &Actor<Self>) {
        match action {
            Action::DraftEdited(text) => self.draft = text,
            Action::UserSubmitted(text) => self.submit_question(text, handle),
            Action::AssistantReplied { epoch, answer } => {
                self.finish_question(epoch, Ok(answer))
            }
            Action::AssistantFailed { epoch, error } => {
                self.finish_question(epoch, Err(error))
            }
            Action::ChatCleared => {
                if !self.conversation.is_empty() {
                    debug!("clear {} message(s)", self.conversation.len());
                }
                self.conversation.clear();
                self.sink.notify(Notification::success("Chat cleared"));
            }
            Action::FilesDropped(DroppedFiles(files)) => {
                self.upload_files(files, handle)
            }
            Action::FileUploaded { name, size_bytes } => {
                self.settle_upload();
                self.sink.notify(Notification::success(format!(
                    "Successfully uploaded: {name}"
                )));
                self.registry.push(UploadedFileRecord {
                    name,
                    size_bytes,
                    uploaded_at: display_time(),
                });
            }
            Action::FileUploadFailed { name, error } => {
                self.settle_upload();
                debug!("upload of {name} failed: {error}");
                let message = error
                    .server_message()
                    .unwrap_or(UPLOAD_FAILED_MESSAGE);
                self.sink.notify(Notification::error(message));
            }
            Action::FileRemoved(index) => {
                if self.registry.remove(index).is_none() {
                    warn!("no uploaded file at index {index}");
                }
            }
            Action::TaskEnded(task_id) => {
                if self.running_tasks.remove(&task_id).is_none() {
                    warn!("task {task_id} is not tracked");
                }
            }
        }

        self.view.observe(self.conversation.messages());
        self.publish();
    }
}

impl SessionState {
    fn submit_question(&mut self, text: String, handle: &Actor<Self>) {
        let question = text.trim();
        if question.is_empty() {
            trace!("ignore an empty question");
            return;
        }
        if self.stage != SessionStage::Idle {
            debug!("a question is already in flight, ignore the new one");
            return;
        }

        let question = question.to_owned();
        self.conversation.push_user(question.clone());
        self.draft.clear();
        self.stage = SessionStage::AwaitingAnswer;

        let epoch = self.conversation.epoch();
        let dispatcher = self.dispatcher.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            async move {
                let action = match dispatcher.ask(&question).await {
                    Ok(answer) => Action::AssistantReplied { epoch, answer },
                    Err(error) => Action::AssistantFailed { epoch, error },
                };
                handle_clone.send(action).ok();
            },
            handle,
        );
    }

    fn finish_question(
        &mut self,
        epoch: u64,
        result: Result<Answer, DispatchError>,
    ) {
        if epoch != self.conversation.epoch() {
            // The chat was cleared while this question was in flight.
            debug!("discard a stale response");
        } else {
            match result {
                Ok(answer) => {
                    let flagged = answer.flagged;
                    self.conversation.push_answer(answer);
                    if flagged {
                        self.sink
                            .notify(Notification::error(ANSWER_FLAGGED_MESSAGE));
                    }
                }
                Err(error) => {
                    debug!("question failed: {error}");
                    self.conversation.push_apology();
                    self.sink.notify(Notification::error(ANSWER_FAILED_MESSAGE));
                }
            }
        }

        self.stage = SessionStage::Idle;
    }

    fn upload_files(&mut self, files: Vec<DocumentFile>, handle: &Actor<Self>) {
        let (accepted, rejected) = self.policy.partition(files);
        if !rejected.is_empty() {
            for (name, why) in &rejected {
                debug!("rejected {name}: {why}");
            }
            self.sink.notify(Notification::error(REJECTED_FILES_MESSAGE));
        }

        for file in accepted {
            self.uploads_in_flight += 1;
            let dispatcher = self.dispatcher.clone();
            let handle_clone = handle.clone();
            self.spawn_task(
                async move {
                    let result = dispatcher.upload(&file).await;
                    let action = match result {
                        Ok(_) => Action::FileUploaded {
                            name: file.name,
                            size_bytes: file.size_bytes,
                        },
                        Err(error) => Action::FileUploadFailed {
                            name: file.name,
                            error,
                        },
                    };
                    handle_clone.send(action).ok();
                },
                handle,
            );
        }
    }

    fn settle_upload(&mut self) {
        match self.uploads_in_flight.checked_sub(1) {
            Some(n) => self.uploads_in_flight = n,
            None => warn!("an upload settled, but none was in flight"),
        }
    }

    fn spawn_task<Fut>(&mut self, fut: Fut, handle: &Actor<Self>)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let handle = handle.clone();
        let task = tokio::spawn(
            async move {
                fut.await;
                handle.send(Action::TaskEnded(task_id)).ok();
            }
            .instrument(debug_span!("session task", id = task_id)),
        );
        self.running_tasks.insert(task_id, task);
    }

    fn publish(&self) {
        let snapshot = SessionSnapshot {
            messages: self.conversation.messages().to_vec(),
            files: self.registry.records().to_vec(),
            draft: self.draft.clone(),
            stage: self.stage,
            uploads_in_flight: self.uploads_in_flight,
        };
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        for (_, task) in self.running_tasks.drain() {
            task.abort();
        }
    }
}
