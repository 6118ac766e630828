use std::sync::Arc;

use tracing::Instrument;

use crate::mailbox::{Mailbox, MailboxParts};
use crate::scheduler::run_actor;
use crate::{ActorDeadError, Reducer};

/// Handle to a running actor.
pub struct Actor<S: Reducer> {
    mailbox: Arc<Mailbox<S::Action>>,
}

impl<S: Reducer> Actor<S> {
    /// Spawns a new actor owning `state`, with an optional label used in
    /// its tracing span.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let MailboxParts {
            mailbox,
            action_rx,
            kill_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, action_rx, kill_rx)
                .instrument(debug_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S::Action>>) -> Self {
        Self { mailbox }
    }

    /// Sends an action to the actor.
    #[inline]
    pub fn send(&self, action: S::Action) -> Result<(), ActorDeadError> {
        self.mailbox.send(action)
    }

    /// Attempts to kill the actor.
    ///
    /// The actor is not guaranteed to stop immediately, but it will not
    /// handle any further actions, and its state is dropped soon after.
    #[inline]
    pub fn try_kill(&self) {
        self.mailbox.try_kill();
    }

    /// Returns `false` once the actor has stopped accepting actions.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.mailbox.is_alive()
    }
}

impl<S: Reducer> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}
