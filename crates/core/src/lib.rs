//! Session logic for a document-grounded Q&A client.
//!
//! A [`Session`] owns the transcript and the registry of uploaded files. It
//! lets one question be in flight at a time, runs uploads concurrently, and
//! reports outcomes as notices through a [`notify::NotificationSink`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod dispatcher;
pub mod notify;
mod session;
pub mod upload;
mod view;

pub use dispatcher::{DEFAULT_REQUEST_TIMEOUT, DispatchError, RequestDispatcher};
pub use session::{Session, SessionBuilder, SessionSnapshot, SessionStage};
pub use view::ScrollAnchor;
