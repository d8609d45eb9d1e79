use std::fmt;

use thiserror::Error;

use crate::{config::LoadError, domain::error::DomainError, infra::error::InfraError};

use super::ports::GatewayError;

/// Network call a transport failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Upload => "image upload",
            Stage::Submit => "document submission",
        })
    }
}

/// Coarse classification used for reporting and log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The author can fix it without leaving the editor.
    User,
    /// Upload or submission failed on the wire or at the server.
    Transport,
    /// Extraction and rewrite disagreed; a correlation bug, not a user mistake.
    Invariant,
}

/// Terminal failure of a publish attempt. Nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("image #{index} could not be decoded: {message}")]
    Decode { index: usize, message: String },
    #[error("unsupported file type `{media_type}`; only images can be embedded")]
    UnsupportedFileType { media_type: String },
    #[error("network error during {stage}: {message}")]
    Network { stage: Stage, message: String },
    #[error("{stage} failed with status {status}")]
    Server {
        stage: Stage,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {stage}: {message}")]
    Protocol { stage: Stage, message: String },
    #[error("document holds {embeds} inline images but {references} references were supplied")]
    ReferenceCountMismatch { embeds: usize, references: usize },
    #[error("draft cannot be published: {reason}")]
    InvalidDraft { reason: String },
}

impl PublishError {
    pub fn invalid_draft(reason: impl Into<String>) -> Self {
        Self::InvalidDraft {
            reason: reason.into(),
        }
    }

    /// Attach the payload position to a domain failure raised while decoding.
    pub fn from_domain(index: usize, error: DomainError) -> Self {
        match error {
            DomainError::Decode { message } => Self::Decode { index, message },
            DomainError::UnsupportedFileType { media_type } => {
                Self::UnsupportedFileType { media_type }
            }
        }
    }

    pub fn from_gateway(stage: Stage, error: GatewayError) -> Self {
        match error {
            GatewayError::Network(message) => Self::Network { stage, message },
            GatewayError::Server { status, body } => Self::Server {
                stage,
                status,
                body,
            },
            GatewayError::Protocol(message) => Self::Protocol { stage, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } | Self::UnsupportedFileType { .. } | Self::InvalidDraft { .. } => {
                ErrorKind::User
            }
            Self::Network { .. } | Self::Server { .. } | Self::Protocol { .. } => {
                ErrorKind::Transport
            }
            Self::ReferenceCountMismatch { .. } => ErrorKind::Invariant,
        }
    }

    /// Short message suitable for an inline notice next to the editor.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "An embedded image is corrupted; remove it and insert it again.",
            Self::UnsupportedFileType { .. } => "You can only upload images.",
            Self::InvalidDraft { .. } => "Add a title and some content before publishing.",
            Self::Network { .. } | Self::Server { .. } | Self::Protocol { .. } => {
                "Publishing failed. Please try again."
            }
            Self::ReferenceCountMismatch { .. } => "Unexpected error occurred",
        }
    }
}

impl From<DomainError> for PublishError {
    fn from(error: DomainError) -> Self {
        Self::from_domain(0, error)
    }
}

/// Top-level error of the `inkpost` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error("invalid document `{path}`: {source}")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
