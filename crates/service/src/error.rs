use std::fmt::{self, Display};

/// The kind of error that occurred while talking to the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never got a usable answer: connection failures,
    /// non-success status codes without a readable body, etc.
    Transport,
    /// The service answered, but explicitly reported a failure.
    Rejected,
    /// The service answered with a body of an unexpected shape.
    MalformedResponse,
    /// The request took longer than allowed.
    TimedOut,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::Rejected => write!(f, "Rejected by the service"),
            ErrorKind::MalformedResponse => write!(f, "Malformed response"),
            ErrorKind::TimedOut => write!(f, "Timed out"),
        }
    }
}
