//! A lightweight actor runtime.
//!
//! An actor is a piece of state owned by a single task. Nothing outside that
//! task touches the state: callers send actions, and the task applies them one
//! at a time in the order they arrive.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

use std::fmt::Debug;

pub use error::ActorDeadError;
pub use handle::Actor;

/// State that can be driven by an [`Actor`].
pub trait Reducer: Sized + Send + 'static {
    /// The closed set of actions this state understands.
    type Action: Send + Debug + 'static;

    /// Applies an action to the state.
    ///
    /// `handle` points back at the running actor, so work spawned from here
    /// can report its outcome as another action.
    fn reduce(&mut self, action: Self::Action, handle: &Actor<Self>);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio::time::timeout;

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
        on_drop: Option<oneshot::Sender<u32>>,
    }

    #[derive(Debug)]
    enum CounterAction {
        Add(u32),
        Get(oneshot::Sender<u32>),
        AddLater(u32),
    }

    impl Reducer for Counter {
        type Action = CounterAction;

        fn reduce(&mut self, action: CounterAction, handle: &Actor<Self>) {
            match action {
                CounterAction::Add(n) => self.value += n,
                CounterAction::Get(tx) => {
                    tx.send(self.value).unwrap();
                }
                CounterAction::AddLater(n) => {
                    let handle = handle.clone();
                    tokio::spawn(async move {
                        handle.send(CounterAction::Add(n)).unwrap();
                    });
                }
            }
        }
    }

    impl Drop for Counter {
        fn drop(&mut self) {
            if let Some(tx) = self.on_drop.take() {
                tx.send(self.value).ok();
            }
        }
    }

    async fn get(actor: &Actor<Counter>) -> u32 {
        let (tx, rx) = oneshot::channel();
        actor.send(CounterAction::Get(tx)).unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_actions_apply_in_order() {
        let actor = Actor::spawn(Counter::default(), Some("counter"));
        actor.send(CounterAction::Add(40)).unwrap();
        actor.send(CounterAction::Add(2)).unwrap();
        assert_eq!(get(&actor).await, 42);
    }

    #[tokio::test]
    async fn test_spawned_work_reports_back() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send(CounterAction::AddLater(7)).unwrap();

        let value = timeout(Duration::from_millis(500), async {
            loop {
                let value = get(&actor).await;
                if value != 0 {
                    break value;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_kill_drops_state() {
        let (drop_tx, drop_rx) = oneshot::channel();
        let actor = Actor::spawn(
            Counter {
                value: 3,
                on_drop: Some(drop_tx),
            },
            None,
        );
        actor.try_kill();

        let value = timeout(Duration::from_millis(500), drop_rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 3);
        assert!(!actor.is_alive());
        assert!(actor.send(CounterAction::Add(1)).is_err());
    }
}
