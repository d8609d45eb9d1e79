#![deny(clippy::all, clippy::pedantic)]

use std::{path::Path, process, sync::Arc};

use inkpost::{
    application::{
        draft::Draft,
        error::AppError,
        publish::{PublishSettings, Publisher},
        render::render,
    },
    config::{self, EmbedArgs, PublishArgs, RenderArgs, Settings},
    domain::document::Document,
    infra::{
        credentials::StaticCredentials,
        error::InfraError,
        files,
        http::{ApiClient, HttpDocumentGateway, HttpUploadGateway},
        telemetry,
    },
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let hint = match error {
        AppError::Publish(err) => Some(err.presentation_message()),
        _ => None,
    };

    if dispatcher::has_been_set() {
        error!(error = %error, hint, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, hint, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        config::Command::Publish(args) => run_publish(settings, *args).await,
        config::Command::Embed(args) => run_embed(args).await,
        config::Command::Render(args) => run_render(args).await,
    }
}

async fn run_publish(settings: Settings, args: PublishArgs) -> Result<(), AppError> {
    let document = read_document(&args.document).await?;
    let initial = match args.initial.as_deref() {
        Some(path) => read_document(path).await?,
        None => Document::blank(),
    };

    let mut draft = Draft::with_initial(initial);
    draft.set_title(args.title);
    for tag in &args.tags {
        draft.add_tag(tag);
    }
    draft.set_document(document);

    if draft.title().trim().is_empty() {
        return Err(AppError::validation("--title must not be blank"));
    }
    if !draft.submit_enabled() {
        return Err(AppError::validation(
            "document is identical to the initial document; nothing to publish",
        ));
    }

    let publisher = build_publisher(&settings)?;
    let outcome = publisher.publish(draft.snapshot()).await?;
    draft.apply_published(&outcome);

    info!(
        target = "inkpost::publish",
        attempt = %outcome.attempt,
        document_id = outcome.created.id,
        registered_at = ?outcome.registered_at(),
        "Document published"
    );
    print_json(&outcome.created)
}

fn build_publisher(settings: &Settings) -> Result<Publisher, AppError> {
    let base = settings.api.base_url.clone().ok_or_else(|| {
        InfraError::configuration(
            "api.base_url is not configured (use --api-base-url or INKPOST__API__BASE_URL)",
        )
    })?;
    let credentials = Arc::new(StaticCredentials::from_settings(&settings.credentials)?);
    let api = ApiClient::new(base, &settings.api, credentials)?;

    Ok(Publisher::new(
        Arc::new(HttpUploadGateway::new(
            api.clone(),
            settings.api.upload_path.clone(),
        )),
        Arc::new(HttpDocumentGateway::new(
            api,
            settings.api.documents_path.clone(),
        )),
        PublishSettings {
            media_prefix: settings.api.media_prefix.clone(),
            upload_field: settings.api.upload_field.clone(),
            decode_concurrency: settings.publish.decode_concurrency,
        },
    ))
}

async fn run_embed(args: EmbedArgs) -> Result<(), AppError> {
    let document = read_document(&args.document).await?;
    let file = files::read_selected_file(&args.image).await?;

    let at = args.at.unwrap_or(document.operations().len());
    let mut draft = Draft::with_initial(document);
    draft.embed_image(at, &file)?;

    let output = args.output.as_deref().unwrap_or(&args.document);
    files::write_document(output, draft.document()).await?;

    info!(
        target = "inkpost::embed",
        image = %args.image.display(),
        media_type = %file.media_type,
        output = %output.display(),
        "Embedded image"
    );
    Ok(())
}

async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let document = read_document(&args.document).await?;
    println!("{}", render(&document));
    Ok(())
}

async fn read_document(path: &Path) -> Result<Document, AppError> {
    let raw = files::read_text(path).await?;
    Document::from_json(&raw).map_err(|source| AppError::Document {
        path: path.display().to_string(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value).map_err(InfraError::from)?;
    println!("{out}");
    Ok(())
}
