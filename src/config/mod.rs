//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, EmbedArgs, LoggingOverrides, PublishArgs, PublishOverrides, RenderArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "inkpost";
const ENV_PREFIX: &str = "INKPOST";
const DEFAULT_UPLOAD_PATH: &str = "image/";
const DEFAULT_DOCUMENTS_PATH: &str = "question/";
const DEFAULT_MEDIA_PREFIX: &str = "/media/";
const DEFAULT_UPLOAD_FIELD: &str = "images";
const DEFAULT_AUTH_SCHEME: &str = "JWT";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DECODE_CONCURRENCY: u64 = 4;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub publish: PublishTuning,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Only required by commands that talk to the server.
    pub base_url: Option<Url>,
    pub upload_path: String,
    pub documents_path: String,
    pub media_prefix: String,
    pub upload_field: String,
    pub auth_scheme: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct PublishTuning {
    pub decode_concurrency: NonZeroUsize,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialSettings {
    pub token_file: Option<PathBuf>,
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Publish(args) => raw.apply_publish_overrides(&args.overrides),
        Command::Embed(args) => raw.apply_logging_overrides(&args.logging),
        Command::Render(args) => raw.apply_logging_overrides(&args.logging),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
    publish: RawPublishSettings,
    credentials: RawCredentialSettings,
}

impl RawSettings {
    fn apply_publish_overrides(&mut self, overrides: &PublishOverrides) {
        self.apply_logging_overrides(&overrides.logging);

        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(prefix) = overrides.api_media_prefix.as_ref() {
            self.api.media_prefix = Some(prefix.clone());
        }
        if let Some(seconds) = overrides.api_timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if let Some(value) = overrides.decode_concurrency {
            self.publish.decode_concurrency = Some(value);
        }
        if let Some(path) = overrides.token_file.as_ref() {
            self.credentials.token_file = Some(path.clone());
        }
        if let Some(token) = overrides.token.as_ref() {
            self.credentials.token = Some(token.clone());
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            logging,
            publish,
            credentials,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            logging: build_logging_settings(logging)?,
            publish: build_publish_settings(publish)?,
            credentials: build_credential_settings(credentials),
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = match non_blank(api.base_url) {
        Some(raw) => Some(parse_base_url(&raw)?),
        None => None,
    };

    let upload_path = required_text(api.upload_path, DEFAULT_UPLOAD_PATH, "api.upload_path")?;
    let documents_path =
        required_text(api.documents_path, DEFAULT_DOCUMENTS_PATH, "api.documents_path")?;
    let upload_field = required_text(api.upload_field, DEFAULT_UPLOAD_FIELD, "api.upload_field")?;
    let auth_scheme = required_text(api.auth_scheme, DEFAULT_AUTH_SCHEME, "api.auth_scheme")?;
    let media_prefix = api
        .media_prefix
        .unwrap_or_else(|| DEFAULT_MEDIA_PREFIX.to_string());

    let timeout_secs = api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "api.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ApiSettings {
        base_url,
        upload_path,
        documents_path,
        media_prefix,
        upload_field,
        auth_scheme,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_publish_settings(publish: RawPublishSettings) -> Result<PublishTuning, LoadError> {
    let value = publish
        .decode_concurrency
        .unwrap_or(DEFAULT_DECODE_CONCURRENCY);
    Ok(PublishTuning {
        decode_concurrency: non_zero_usize(value, "publish.decode_concurrency")?,
    })
}

fn build_credential_settings(credentials: RawCredentialSettings) -> CredentialSettings {
    CredentialSettings {
        token_file: credentials
            .token_file
            .filter(|path| !path.as_os_str().is_empty()),
        token: non_blank(credentials.token),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    upload_path: Option<String>,
    documents_path: Option<String>,
    media_prefix: Option<String>,
    upload_field: Option<String>,
    auth_scheme: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPublishSettings {
    decode_concurrency: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCredentialSettings {
    token_file: Option<PathBuf>,
    token: Option<String>,
}

/// Parse the API root; a trailing slash is added so relative paths nest under it.
fn parse_base_url(raw: &str) -> Result<Url, LoadError> {
    let mut url = Url::parse(raw)
        .map_err(|err| LoadError::invalid("api.base_url", format!("invalid URL `{raw}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "api.base_url",
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn required_text(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        None => Ok(default.to_string()),
        Some(value) => {
            non_blank(Some(value)).ok_or_else(|| LoadError::invalid(key, "must not be empty"))
        }
    }
}

fn non_zero_usize(value: u64, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    let value: usize = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
