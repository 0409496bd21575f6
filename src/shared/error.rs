// This is free and unencumbered software released into the public domain.

use crate::shared::Identifier;
use std::error::Error as StdError;
use thiserror::Error;

pub type BridgeResult<T = ()> = core::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no instance registered for identifier {0}")]
    NotFound(Identifier),

    #[error("instance {identifier} is a {actual}, expected a {expected}")]
    WrongKind {
        identifier: Identifier,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("identifier {0} is already in use")]
    IdentifierInUse(Identifier),

    #[error("instance is already registered as {0}")]
    AlreadyRegistered(Identifier),

    #[error("{0} instance has no identifier")]
    Unregistered(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("malformed message")]
    Codec(#[from] serde_json::Error),

    #[error("message channel is full")]
    ChannelFull,

    #[error("message channel closed")]
    Closed,

    #[error("native error while {context}")]
    Native {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl BridgeError {
    #[inline]
    pub fn native(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Native {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[inline]
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The error code sent back across the message boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not-found",
            Self::WrongKind { .. } => "wrong-kind",
            Self::IdentifierInUse(_) => "identifier-in-use",
            Self::AlreadyRegistered(_) => "already-registered",
            Self::Unregistered(_) => "unregistered",
            Self::InvalidArgument(_) => "invalid-argument",
            Self::NotReady(_) => "not-ready",
            Self::Codec(_) => "malformed-message",
            Self::ChannelFull => "channel-full",
            Self::Closed => "channel-closed",
            Self::Native { .. } => "native-error",
            Self::Other(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_errors_keep_their_source() {
        let io = std::io::Error::other("surface abandoned");
        let err = BridgeError::native("creating a surface", io);
        assert_eq!(err.to_string(), "native error while creating a surface");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("surface abandoned"));
        assert_eq!(err.code(), "native-error");
    }

    #[test]
    fn registry_misses_name_the_identifier() {
        assert_eq!(
            BridgeError::NotFound(42).to_string(),
            "no instance registered for identifier 42"
        );
    }
}
