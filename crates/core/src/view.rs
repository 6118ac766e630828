use crate::conversation::Message;

/// Where the view should scroll to after the transcript changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollAnchor {
    /// The message with this id, the newest one.
    Message(u64),
    /// The placeholder shown when the transcript is empty.
    EmptyState,
}

pub(crate) type ScrollFn = Box<dyn Fn(ScrollAnchor) + Send + Sync>;

/// Keeps the newest message in view by watching the transcript length.
pub(crate) struct ViewBinding {
    observed_len: usize,
    on_scroll: Option<ScrollFn>,
}

impl ViewBinding {
    #[inline]
    pub fn new(on_scroll: Option<ScrollFn>) -> Self {
        Self {
            observed_len: 0,
            on_scroll,
        }
    }

    /// Requests a scroll if the length differs from the last observation.
    pub fn observe(&mut self, messages: &[Message]) {
        if messages.len() == self.observed_len {
            return;
        }
        self.observed_len = messages.len();

        let anchor = match messages.last() {
            Some(msg) => ScrollAnchor::Message(msg.id()),
            None => ScrollAnchor::EmptyState,
        };
        trace!("scroll to {anchor:?}");
        if let Some(on_scroll) = &self.on_scroll {
            on_scroll(anchor);
        }
    }
}
