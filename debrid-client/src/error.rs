use std::time::Duration;

use crate::status::TorrentStatus;

/// Coarse classification of [`Error`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidToken,
    AccountLocked,
    Transport,
    MalformedResponse,
    BadStatus,
    TerminalStatus,
    PollTimeout,
    NoEligibleFile,
    InvalidConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid token")]
    InvalidToken,
    #[error("account locked")]
    AccountLocked,
    #[error("couldn't send {method} request to '{url}': {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(
        "bad HTTP response status: {status} ({method} request to '{url}'{})",
        .body.as_deref().map(|b| format!("; response body: '{b}'")).unwrap_or_default()
    )]
    BadStatus {
        status: u16,
        method: &'static str,
        url: String,
        body: Option<String>,
    },
    #[error("bad torrent status: {0}")]
    TerminalStatus(TorrentStatus),
    #[error("torrent still {status} after waiting for {} seconds", .waited.as_secs())]
    PollTimeout {
        status: TorrentStatus,
        waited: Duration,
    },
    #[error("no eligible file: {0}")]
    NoEligibleFile(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidToken => ErrorKind::InvalidToken,
            Error::AccountLocked => ErrorKind::AccountLocked,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::BadStatus { .. } => ErrorKind::BadStatus,
            Error::TerminalStatus(_) => ErrorKind::TerminalStatus,
            Error::PollTimeout { .. } => ErrorKind::PollTimeout,
            Error::NoEligibleFile(_) => ErrorKind::NoEligibleFile,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::Context { source, .. } => source.kind(),
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        Error::MalformedResponse(what.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait ResultExt<T> {
    /// Wraps the error with a description of the step that failed.
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Context {
            context,
            source: Box::new(source),
        })
    }
}
