use docqa_service::{Answer, ErrorKind};
use serde::{Deserialize, Serialize};

/// A scripted failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetFailure {
    /// What kind of failure to report.
    pub kind: FailureKind,
    /// The message the service itself supplies, if any.
    #[serde(default)]
    pub message: Option<String>,
}

impl PresetFailure {
    /// A transport-level failure with no server message.
    #[inline]
    pub fn transport() -> Self {
        Self {
            kind: FailureKind::Transport,
            message: None,
        }
    }

    /// An explicit rejection carrying the server's message.
    #[inline]
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self {
            kind: FailureKind::Rejected,
            message: Some(message.into()),
        }
    }
}

/// Serializable mirror of [`ErrorKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Rejected,
    MalformedResponse,
    TimedOut,
}

impl From<FailureKind> for ErrorKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Transport => ErrorKind::Transport,
            FailureKind::Rejected => ErrorKind::Rejected,
            FailureKind::MalformedResponse => ErrorKind::MalformedResponse,
            FailureKind::TimedOut => ErrorKind::TimedOut,
        }
    }
}

/// How the service responds to one question.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetAnswer {
    #[serde(rename = "answer")]
    Answer(Answer),
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

impl PresetAnswer {
    /// A successful answer with the given text and no sources.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Answer(Answer {
            text: text.into(),
            ..Default::default()
        })
    }
}

/// How the service responds to an upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetUpload {
    #[default]
    #[serde(rename = "accept")]
    Accept,
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

#[cfg(test)]
mod tests {
    use docqa_service::SourceExcerpt;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let script = vec![
            PresetAnswer::Answer(Answer {
                text: "Section 420 covers cheating.".to_owned(),
                sources: vec![SourceExcerpt::new("IPC §420 text...")],
                flagged: false,
            }),
            PresetAnswer::Failure(PresetFailure::transport()),
        ];

        let serialized = serde_json::to_string(&script).unwrap();
        let deserialized: Vec<PresetAnswer> =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(script, deserialized);
    }

    #[test]
    fn test_deserialize_hand_written() {
        let preset: PresetUpload = serde_json::from_str(
            r#"{ "type": "failure", "data": { "kind": "rejected", "message": "Too big" } }"#,
        )
        .unwrap();
        assert_eq!(preset, PresetUpload::Failure(PresetFailure::rejected("Too big")));
    }
}
