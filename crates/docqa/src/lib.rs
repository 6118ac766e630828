//! A client for document Q&A services.
//!
//! The crate includes a CLI tool for using in the terminal. You can also use
//! it as a library: build a [`Session`] on top of [`HttpService`] and render
//! its snapshots in your own host app.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod command;
pub mod files;

pub use docqa_core::{Session, SessionBuilder, SessionSnapshot, SessionStage};
pub use docqa_http_service::{
    HttpService, HttpServiceConfig, HttpServiceConfigBuilder,
};

/// Re-exports of [`docqa_core`] crate.
pub mod core {
    pub use docqa_core::*;
}
