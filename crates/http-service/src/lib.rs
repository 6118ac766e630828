//! A remote service backed by the document Q&A HTTP API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::fmt::Display;
use std::sync::Arc;

use docqa_service::{
    Answer, DocumentFile, ErrorKind, RemoteService, RemoteServiceError,
    UploadReceipt,
};
use mime::Mime;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use tracing::Instrument;

pub use config::{HttpServiceConfig, HttpServiceConfigBuilder};

/// Error type for [`HttpService`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: String,
    kind: ErrorKind,
    server_message: Option<String>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            server_message: None,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::TimedOut
        } else {
            ErrorKind::Transport
        };
        Self::new(format!("{err}"), kind)
    }

    fn status(status: StatusCode) -> Self {
        Self::new(
            format!("the service responded with {status}"),
            ErrorKind::Transport,
        )
    }

    fn rejected(server_message: String) -> Self {
        Self {
            message: format!("the service rejected the request: {server_message}"),
            kind: ErrorKind::Rejected,
            server_message: Some(server_message),
        }
    }

    fn malformed(err: impl Display) -> Self {
        Self::new(
            format!("unexpected response body: {err}"),
            ErrorKind::MalformedResponse,
        )
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl RemoteServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }
}

/// A remote service reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpService {
    client: Client,
    config: Arc<HttpServiceConfig>,
}

impl HttpService {
    /// Creates a new `HttpService` with the given configuration.
    pub fn new(config: HttpServiceConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::transport)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn upload_request(&self, file: &DocumentFile) -> Result<RequestBuilder, Error> {
        // The part length follows the bytes actually sent, not the declared
        // size.
        let len = file.contents.len() as u64;
        let mut part = Part::stream_with_length(file.contents.clone(), len)
            .file_name(file.name.clone());
        if let Some(mime) = file.mime() {
            part = part
                .mime_str(mime.as_ref())
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Transport))?;
        }
        let form = Form::new().part("file", part);
        Ok(self.client.post(self.config.upload_url()).multipart(form))
    }
}

impl RemoteService for HttpService {
    type Error = Error;

    fn upload(
        &self,
        file: &DocumentFile,
    ) -> impl Future<Output = Result<UploadReceipt, Self::Error>> + Send + 'static
    {
        let req = self.upload_request(file);
        let span = debug_span!("upload", name = %file.name, size = file.size_bytes);

        async move {
            let resp = req?.send().await.map_err(Error::transport)?;
            let status = resp.status();
            let body = resp.bytes().await.map_err(Error::transport)?;
            trace!("got upload response ({status}): {} bytes", body.len());
            proto::parse_upload_response(status, &body)
        }
        .instrument(span)
    }

    fn ask(
        &self,
        question: &str,
    ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + 'static
    {
        let req = self
            .client
            .post(self.config.ask_url())
            .header(header::ACCEPT, "application/json")
            .json(&proto::AskRequest { question });

        async move {
            let resp = req.send().await.map_err(Error::transport)?;
            let status = resp.status();
            if status.is_success() {
                check_content_type(&resp)?;
            }
            let body = resp.bytes().await.map_err(Error::transport)?;
            trace!("got ask response ({status}): {} bytes", body.len());
            proto::parse_ask_response(status, &body)
        }
        .instrument(debug_span!("ask"))
    }
}

/// Rejects successful responses that declare a non-JSON body.
///
/// A missing `Content-Type` is tolerated, the body parser decides then.
fn check_content_type(resp: &Response) -> Result<(), Error> {
    let Some(content_type) = resp.headers().get(header::CONTENT_TYPE) else {
        return Ok(());
    };
    let is_json = content_type
        .to_str()
        .ok()
        .and_then(|v| v.parse::<Mime>().ok())
        .is_some_and(|m| {
            m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
        });
    if !is_json {
        return Err(Error::malformed(format_args!(
            "unexpected content type {content_type:?}"
        )));
    }
    Ok(())
}
