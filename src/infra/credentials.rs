//! Auth token resolution.

use std::{fs, path::Path};

use tracing::debug;

use crate::{application::ports::CredentialSource, config::CredentialSettings};

use super::error::InfraError;

/// Token resolved once at startup and handed to every request.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|value| !value.is_empty()),
        }
    }

    /// A configured token file wins over a token from the environment.
    /// Having neither is not an error; requests simply go out unauthenticated.
    pub fn from_settings(settings: &CredentialSettings) -> Result<Self, InfraError> {
        let token = match settings.token_file.as_deref() {
            Some(path) => Some(read_token_file(path)?),
            None => settings.token.clone(),
        };
        debug!(
            target = "inkpost::credentials",
            present = token.is_some(),
            "Resolved credentials"
        );
        Ok(Self::new(token))
    }
}

impl CredentialSource for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

fn read_token_file(path: &Path) -> Result<String, InfraError> {
    let raw = fs::read_to_string(path).map_err(|source| InfraError::file(path, source))?;
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn token_file_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "  from-file  ").expect("write token");

        let settings = CredentialSettings {
            token_file: Some(file.path().to_path_buf()),
            token: Some("from-env".into()),
        };
        let credentials = StaticCredentials::from_settings(&settings).expect("credentials");
        assert_eq!(credentials.token().as_deref(), Some("from-file"));
    }

    #[test]
    fn falls_back_to_inline_token() {
        let settings = CredentialSettings {
            token_file: None,
            token: Some("from-env".into()),
        };
        let credentials = StaticCredentials::from_settings(&settings).expect("credentials");
        assert_eq!(credentials.token().as_deref(), Some("from-env"));
    }

    #[test]
    fn absence_is_not_an_error() {
        let credentials =
            StaticCredentials::from_settings(&CredentialSettings::default()).expect("credentials");
        assert!(credentials.token().is_none());
    }

    #[test]
    fn missing_token_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = CredentialSettings {
            token_file: Some(dir.path().join("absent")),
            token: None,
        };
        let err = StaticCredentials::from_settings(&settings).expect_err("missing file");
        assert!(matches!(err, InfraError::File { .. }));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let rendered = format!("{:?}", StaticCredentials::new(Some("secret".into())));
        assert!(!rendered.contains("secret"));
    }
}
