//! An abstraction layer over the remote document Q&A service.
//!
//! The remote service ingests uploaded documents and answers questions
//! grounded in them. This crate fixes the protocol that a session uses to
//! talk to it, so the session logic doesn't care whether the other end is a
//! real HTTP backend or a scripted fake.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod answer;
mod error;
mod file;
mod service;

pub use answer::*;
pub use error::*;
pub use file::*;
pub use service::*;
