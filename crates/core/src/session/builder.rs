use std::sync::Arc;
use std::time::Duration;

use docqa_service::RemoteService;

use super::Session;
use crate::dispatcher::RequestDispatcher;
use crate::notify::{LogSink, NotificationSink};
use crate::upload::UploadPolicy;
use crate::view::{ScrollAnchor, ScrollFn};

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) dispatcher: RequestDispatcher,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) policy: UploadPolicy,
    pub(crate) on_scroll: Option<ScrollFn>,
}

impl SessionBuilder {
    /// Creates a new builder talking to the specified remote service.
    #[inline]
    pub fn with_remote_service<S: RemoteService + 'static>(service: S) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(service),
            sink: Arc::new(LogSink),
            policy: UploadPolicy::default(),
            on_scroll: None,
        }
    }

    /// Sets where notices go. Defaults to the log.
    #[inline]
    pub fn with_notification_sink(mut self, sink: impl NotificationSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Sets which files may be uploaded.
    #[inline]
    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how long each remote call may take.
    #[inline]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher = self.dispatcher.with_timeout(timeout);
        self
    }

    /// Attaches a callback to be invoked when the view should scroll.
    #[inline]
    pub fn on_scroll(
        mut self,
        on_scroll: impl Fn(ScrollAnchor) + Send + Sync + 'static,
    ) -> Self {
        self.on_scroll = Some(Box::new(on_scroll));
        self
    }

    /// Builds the session. Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> Session {
        Session::spawn_from_builder(self)
    }
}
