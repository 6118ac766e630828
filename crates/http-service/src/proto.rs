use docqa_service::{Answer, ErrorKind, SourceExcerpt, UploadReceipt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AskResponse {
    pub data: AskData,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AskData {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    /// Either a boolean or an error description, depending on the server.
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub content: String,
}

/// Body of a failed request, as far as we care about it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

// -----------
// Conversions
// -----------

pub fn parse_upload_response(
    status: StatusCode,
    body: &[u8],
) -> Result<UploadReceipt, Error> {
    match serde_json::from_slice::<UploadResponse>(body) {
        Ok(resp) if resp.success && status.is_success() => Ok(UploadReceipt {
            message: resp.message,
        }),
        Ok(UploadResponse {
            error: Some(error), ..
        }) => Err(Error::rejected(error)),
        Ok(_) if !status.is_success() => Err(Error::status(status)),
        Ok(_) => Err(Error::new(
            "the service reported a failure without a reason",
            ErrorKind::Rejected,
        )),
        Err(_) if !status.is_success() => Err(Error::status(status)),
        Err(err) => Err(Error::malformed(err)),
    }
}

pub fn parse_ask_response(
    status: StatusCode,
    body: &[u8],
) -> Result<Answer, Error> {
    if !status.is_success() {
        let server_message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.error);
        return Err(match server_message {
            Some(message) => Error::rejected(message),
            None => Error::status(status),
        });
    }

    let resp: AskResponse =
        serde_json::from_slice(body).map_err(Error::malformed)?;
    Ok(create_answer(resp.data))
}

#[inline]
fn create_answer(data: AskData) -> Answer {
    Answer {
        text: data.answer,
        sources: data
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(|source| SourceExcerpt::new(source.content))
            .collect(),
        flagged: data.error.as_ref().is_some_and(is_truthy),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use docqa_service::RemoteServiceError;

    use super::*;

    #[test]
    fn test_answer_with_sources() {
        let body = r#"{
            "success": true,
            "message": "Question processed successfully",
            "data": {
                "question": "What is section 420?",
                "answer": "Section 420 covers cheating.",
                "sources": [{ "content": "IPC §420 text...", "metadata": {} }],
                "timestamp": 1700000000.0
            }
        }"#;
        let answer =
            parse_ask_response(StatusCode::OK, body.as_bytes()).unwrap();
        assert_eq!(answer.text, "Section 420 covers cheating.");
        assert_eq!(answer.sources, [SourceExcerpt::new("IPC §420 text...")]);
        assert!(!answer.flagged);
    }

    #[test]
    fn test_answer_error_indicator() {
        let body = br#"{ "data": { "answer": "Partial.", "sources": null, "error": "LLM timeout" } }"#;
        let answer = parse_ask_response(StatusCode::OK, body).unwrap();
        assert!(answer.sources.is_empty());
        assert!(answer.flagged);

        let body = br#"{ "data": { "answer": "Fine.", "error": false } }"#;
        let answer = parse_ask_response(StatusCode::OK, body).unwrap();
        assert!(!answer.flagged);

        let body = br#"{ "data": { "answer": "Odd.", "error": true } }"#;
        let answer = parse_ask_response(StatusCode::OK, body).unwrap();
        assert!(answer.flagged);
    }

    #[test]
    fn test_ask_failures() {
        let err = parse_ask_response(StatusCode::OK, b"<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = parse_ask_response(StatusCode::OK, br#"{ "data": {} }"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let body = br#"{ "success": false, "error": "RAG service not available" }"#;
        let err = parse_ask_response(StatusCode::SERVICE_UNAVAILABLE, body)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.server_message(), Some("RAG service not available"));

        let err = parse_ask_response(StatusCode::BAD_GATEWAY, b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_upload_success() {
        let body = br#"{ "success": true, "message": "Ingested 12 chunks" }"#;
        let receipt = parse_upload_response(StatusCode::OK, body).unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Ingested 12 chunks"));
    }

    #[test]
    fn test_upload_failures() {
        let body = br#"{ "success": false, "error": "No file selected" }"#;
        let err =
            parse_upload_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.server_message(), Some("No file selected"));

        // Some servers report failures with a 200.
        let err = parse_upload_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.server_message(), Some("No file selected"));

        let err = parse_upload_response(StatusCode::INTERNAL_SERVER_ERROR, b"")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.server_message(), None);

        let err = parse_upload_response(StatusCode::OK, b"ok").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
