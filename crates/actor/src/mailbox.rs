use tokio::sync::{mpsc, watch};

use crate::ActorDeadError;

pub struct MailboxParts<A> {
    pub mailbox: Mailbox<A>,
    pub action_rx: mpsc::UnboundedReceiver<A>,
    pub kill_rx: watch::Receiver<bool>,
}

pub struct Mailbox<A> {
    action_tx: mpsc::UnboundedSender<A>,
    kill_tx: watch::Sender<bool>,
}

impl<A: Send + 'static> Mailbox<A> {
    #[inline]
    pub fn new() -> MailboxParts<A> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        MailboxParts {
            mailbox: Mailbox { action_tx, kill_tx },
            action_rx,
            kill_rx,
        }
    }

    #[inline]
    pub fn send(&self, action: A) -> Result<(), ActorDeadError> {
        self.action_tx.send(action).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn try_kill(&self) {
        self.kill_tx.send(true).ok();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.action_tx.is_closed()
    }
}
