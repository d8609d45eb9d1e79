use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the inkpost binary.
#[derive(Debug, Parser)]
#[command(
    name = "inkpost",
    version,
    about = "Publish rich-text drafts with inline images"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "INKPOST_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Upload inline images, rewrite the document and submit it.
    Publish(Box<PublishArgs>),
    /// Insert a local image into a document as an inline payload.
    Embed(EmbedArgs),
    /// Print the markup a document renders to.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PublishOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Override the API base URL.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Override the prefix prepended to uploaded file references.
    #[arg(long = "api-media-prefix", value_name = "PREFIX")]
    pub api_media_prefix: Option<String>,

    /// Override the request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS")]
    pub api_timeout_seconds: Option<u64>,

    /// Override how many payloads are decoded at once.
    #[arg(long = "publish-decode-concurrency", value_name = "COUNT")]
    pub decode_concurrency: Option<u64>,

    /// Read the auth token from a file instead of the environment.
    #[arg(long = "token-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub token_file: Option<PathBuf>,

    /// Auth token sent with every request.
    #[arg(long = "token", env = "INKPOST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PublishArgs {
    #[command(flatten)]
    pub overrides: PublishOverrides,

    /// Document title.
    #[arg(long)]
    pub title: String,

    /// Tag to attach; repeat for several.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Delta JSON of the document to publish.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub document: PathBuf,

    /// Delta JSON the editor started from; defaults to an empty editor.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub initial: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EmbedArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Delta JSON to insert into.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub document: PathBuf,

    /// Image to embed.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub image: PathBuf,

    /// Operation index to insert before; defaults to the end.
    #[arg(long, value_name = "INDEX")]
    pub at: Option<usize>,

    /// Write the result here instead of overwriting the input.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Delta JSON to render.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub document: PathBuf,
}
