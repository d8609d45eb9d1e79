use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("malformed image payload: {message}")]
    Decode { message: String },
    #[error("unsupported file type `{media_type}`; only images can be embedded")]
    UnsupportedFileType { media_type: String },
}

impl DomainError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn unsupported(media_type: impl Into<String>) -> Self {
        Self::UnsupportedFileType {
            media_type: media_type.into(),
        }
    }
}
