//! Conversation-related types.

use chrono::Local;
use docqa_service::{Answer, SourceExcerpt};

/// Shown in place of an answer when the question couldn't be answered.
pub const APOLOGY: &str = "I apologize, but I encountered an error \
    processing your question. Please try again.";

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person asking questions.
    User,
    /// The remote service answering them.
    Assistant,
}

/// One entry of the transcript.
///
/// Messages can only be made by a [`Conversation`], which keeps the ids
/// increasing and only ever gives sources and the error flag to assistant
/// messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    id: u64,
    role: Role,
    content: String,
    sources: Vec<SourceExcerpt>,
    timestamp: String,
    error: bool,
}

impl Message {
    /// Returns the id, unique and increasing within a session.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the display text.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the supporting excerpts. Always empty for user messages.
    #[inline]
    pub fn sources(&self) -> &[SourceExcerpt] {
        &self.sources
    }

    /// Returns the human-readable creation time.
    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns `true` if this message stands in for an answer that could
    /// not be obtained.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// Formats the current local time for display, e.g. `3:07:12 PM`.
pub(crate) fn display_time() -> String {
    Local::now().format("%-I:%M:%S %p").to_string()
}

/// The transcript of a session.
#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    epoch: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: vec![],
            next_id: 1,
            epoch: 0,
        }
    }
}

impl Conversation {
    /// Returns the messages in creation order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the current epoch, which changes on every clear.
    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn push_user(&mut self, content: String) -> &Message {
        self.push(Role::User, content, vec![], false)
    }

    pub(crate) fn push_answer(&mut self, answer: Answer) -> &Message {
        self.push(Role::Assistant, answer.text, answer.sources, false)
    }

    pub(crate) fn push_apology(&mut self) -> &Message {
        self.push(Role::Assistant, APOLOGY.to_owned(), vec![], true)
    }

    /// Drops every message. Ids keep increasing afterwards.
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.epoch += 1;
    }

    fn push(
        &mut self,
        role: Role,
        content: String,
        sources: Vec<SourceExcerpt>,
        error: bool,
    ) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            sources,
            timestamp: display_time(),
            error,
        });
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_across_clear() {
        let mut conversation = Conversation::default();
        let first = conversation.push_user("Hi".to_owned()).id();
        let second = conversation.push_apology().id();
        assert!(first < second);

        let epoch = conversation.epoch();
        conversation.clear();
        assert!(conversation.is_empty());
        assert_ne!(conversation.epoch(), epoch);

        let third = conversation.push_user("Again".to_owned()).id();
        assert!(second < third);
    }

    #[test]
    fn test_answer_keeps_sources() {
        let mut conversation = Conversation::default();
        let msg = conversation.push_answer(Answer {
            text: "Section 420 covers cheating.".to_owned(),
            sources: vec![SourceExcerpt::new("IPC §420 text...")],
            flagged: true,
        });
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.content(), "Section 420 covers cheating.");
        assert_eq!(msg.sources().len(), 1);
        // A flagged answer is still a real answer.
        assert!(!msg.is_error());
    }

    #[test]
    fn test_apology() {
        let mut conversation = Conversation::default();
        let msg = conversation.push_apology();
        assert_eq!(msg.content(), APOLOGY);
        assert!(msg.is_error());
        assert!(msg.sources().is_empty());
        assert!(!msg.timestamp().is_empty());
    }
}
