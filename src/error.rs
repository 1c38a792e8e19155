use std::io;

use thiserror::Error;

use crate::engine::SaslCode;

/// Phase of the authentication attempt an [Error] originated from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Credential,
    EngineInit,
    Context,
    Transport,
    Handshake,
}

#[derive(Debug, Error)]
pub enum Error {
    /// `kinit` could not be started or exited with a non-zero/abnormal status.
    #[error("credential acquisition failed: {0}")]
    Credential(#[from] CredentialError),

    #[error("security engine initialization failed: {}", DisplayCode(.code))]
    EngineInit { code: i32 },

    #[error("cannot establish security context: {}", DisplayCode(.code))]
    ContextCreation { code: i32 },

    /// Any send or receive failure. The underlying cause is kept for diagnostics only.
    #[error("connection closed by service")]
    ConnectionClosed(#[source] io::Error),

    #[error("authentication handshake was not completed: {}", DisplayCode(.code))]
    HandshakeFailed { code: i32 },

    #[error("token of {len} bytes exceeds the {max} bytes limit")]
    TokenTooLarge { len: usize, max: u32 },

    #[error("handshake did not complete within {max} rounds")]
    TooManyRounds { max: u32 },
}

impl Error {
    pub fn phase(&self) -> AuthPhase {
        match self {
            Error::Credential(_) => AuthPhase::Credential,
            Error::EngineInit { .. } => AuthPhase::EngineInit,
            Error::ContextCreation { .. } => AuthPhase::Context,
            Error::ConnectionClosed(_) | Error::TokenTooLarge { .. } => AuthPhase::Transport,
            Error::HandshakeFailed { .. } | Error::TooManyRounds { .. } => AuthPhase::Handshake,
        }
    }

    /// Raw engine status code, if the failure came from the engine.
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            Error::EngineInit { code } | Error::ContextCreation { code } | Error::HandshakeFailed { code } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with status code {code}")]
    ExitCode { program: String, code: i32 },

    #[error("`{program}` was terminated abnormally")]
    Terminated { program: String },
}

struct DisplayCode<'a>(&'a i32);

impl std::fmt::Display for DisplayCode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match SaslCode::from_code(*self.0) {
            Some(name) => write!(f, "code {} ({:?})", self.0, name),
            None => write!(f, "code {}", self.0),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
