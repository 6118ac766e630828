use std::sync::Weak;

use tokio::select;
use tokio::sync::{mpsc, watch};

use crate::mailbox::Mailbox;
use crate::{Actor, Reducer};

#[inline]
pub async fn run_actor<S: Reducer>(
    mailbox: Weak<Mailbox<S::Action>>,
    mut state: S,
    mut action_rx: mpsc::UnboundedReceiver<S::Action>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let action = select! {
            biased;

            _ = kill_rx.changed() => {
                break;
            }
            action = action_rx.recv() => {
                let Some(action) = action else {
                    break;
                };
                action
            }
        };
        trace!("received action: {action:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last handle has been dropped, discard the action");
            break;
        };

        let span = trace_span!("reduce");
        span.in_scope(|| {
            state.reduce(action, &Actor::from_mailbox(mailbox));
            trace!("finished");
        });
    }

    // Senders must see the actor as dead before the state goes away.
    action_rx.close();
    drop(state);
    debug!("terminated");
}
