//! Publish orchestration: extract → upload → rewrite → render → submit.
//!
//! Each attempt walks `Idle → Extracting → Uploading → Rewriting → Submitting`
//! and ends in `Succeeded` or `Failed`. Any error jumps straight to `Failed`;
//! no state is retried and no later state is entered. Images uploaded before a
//! later failure stay on the server (there is no compensating delete).

use std::{num::NonZeroUsize, sync::Arc};

use inkpost_api_types::{CreatedDocument, PublishRequest};
use time::{PrimitiveDateTime, format_description::FormatItem, macros::format_description};
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::document::Document;

use super::{
    draft::DraftSnapshot,
    error::{ErrorKind, PublishError, Stage},
    extract::extract_payloads,
    materialize::materialize,
    ports::{DocumentGateway, UploadGateway, UploadResult},
    render::render,
    rewrite::rewrite,
};

const REGISTERED_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Prepended to every returned file reference.
    pub media_prefix: String,
    /// Multipart field name shared by all image parts.
    pub upload_field: String,
    pub decode_concurrency: NonZeroUsize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Extracting,
    Uploading,
    Rewriting,
    Submitting,
    Succeeded(CreatedDocument),
    Failed(PublishError),
}

impl PublishState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Uploading => "uploading",
            Self::Rewriting => "rewriting",
            Self::Submitting => "submitting",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Everything a caller needs after a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub attempt: Uuid,
    /// Draft revision the attempt was started from.
    pub snapshot_revision: u64,
    /// Snapshot with every inline image replaced by its hosted reference.
    pub document: Document,
    pub request: PublishRequest,
    pub created: CreatedDocument,
}

impl PublishOutcome {
    /// Rendered markup that was submitted.
    pub fn body(&self) -> &str {
        &self.request.body
    }

    /// Server registration time, when present and well-formed.
    pub fn registered_at(&self) -> Option<PrimitiveDateTime> {
        self.created
            .registered_date
            .as_deref()
            .and_then(|raw| PrimitiveDateTime::parse(raw, REGISTERED_DATE_FORMAT).ok())
    }
}

pub struct Publisher {
    uploads: Arc<dyn UploadGateway>,
    documents: Arc<dyn DocumentGateway>,
    settings: PublishSettings,
}

impl Publisher {
    pub fn new(
        uploads: Arc<dyn UploadGateway>,
        documents: Arc<dyn DocumentGateway>,
        settings: PublishSettings,
    ) -> Self {
        Self {
            uploads,
            documents,
            settings,
        }
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Start a new attempt in the `Idle` state.
    pub fn attempt(&self) -> PublishAttempt<'_> {
        let (state, _) = watch::channel(PublishState::Idle);
        PublishAttempt {
            publisher: self,
            id: Uuid::new_v4(),
            state,
        }
    }

    pub async fn publish(&self, snapshot: DraftSnapshot) -> Result<PublishOutcome, PublishError> {
        self.attempt().run(snapshot).await
    }
}

/// One run of the pipeline over one snapshot.
///
/// Dropping the future returned by [`PublishAttempt::run`] abandons the
/// attempt; requests already on the wire may still complete server-side, but
/// their responses are never applied.
pub struct PublishAttempt<'a> {
    publisher: &'a Publisher,
    id: Uuid,
    state: watch::Sender<PublishState>,
}

impl PublishAttempt<'_> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PublishState {
        self.state.borrow().clone()
    }

    pub async fn run(self, snapshot: DraftSnapshot) -> Result<PublishOutcome, PublishError> {
        let span = info_span!("publish", attempt = %self.id, revision = snapshot.revision);
        async move {
            let result = self.execute(snapshot).await;
            match &result {
                Ok(outcome) => {
                    info!(
                        target = "inkpost::publish",
                        document_id = outcome.created.id,
                        "Publish succeeded"
                    );
                    self.advance(PublishState::Succeeded(outcome.created.clone()));
                }
                Err(err) => {
                    report_failure(err);
                    self.advance(PublishState::Failed(err.clone()));
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, snapshot: DraftSnapshot) -> Result<PublishOutcome, PublishError> {
        if snapshot.title.trim().is_empty() {
            return Err(PublishError::invalid_draft("title is required"));
        }
        if !snapshot.submit_enabled {
            return Err(PublishError::invalid_draft(
                "document is unchanged since it was opened",
            ));
        }

        let DraftSnapshot {
            revision,
            title,
            tags,
            document,
            ..
        } = snapshot;
        let settings = &self.publisher.settings;

        self.advance(PublishState::Extracting);
        let references = {
            let payloads = extract_payloads(&document);
            if payloads.is_empty() {
                debug!(target = "inkpost::publish", "No inline images; skipping upload");
                UploadResult::default()
            } else {
                self.advance(PublishState::Uploading);
                let body = materialize(
                    &settings.upload_field,
                    &payloads,
                    settings.decode_concurrency,
                )
                .await?;
                let submitted = body.len();
                let result = self
                    .publisher
                    .uploads
                    .upload(body)
                    .await
                    .map_err(|err| PublishError::from_gateway(Stage::Upload, err))?;
                info!(
                    target = "inkpost::publish",
                    images = submitted,
                    "Uploaded inline images"
                );
                if result.len() != submitted {
                    let err = PublishError::Protocol {
                        stage: Stage::Upload,
                        message: format!(
                            "expected {submitted} file references, received {}",
                            result.len()
                        ),
                    };
                    report_orphans(&result);
                    return Err(err);
                }
                result
            }
        };

        let submitted = self
            .submit(revision, title, tags.to_vec(), document, &references)
            .await;
        if submitted.is_err() {
            report_orphans(&references);
        }
        submitted
    }

    async fn submit(
        &self,
        revision: u64,
        title: String,
        tags: Vec<String>,
        document: Document,
        references: &UploadResult,
    ) -> Result<PublishOutcome, PublishError> {
        let settings = &self.publisher.settings;

        self.advance(PublishState::Rewriting);
        let document = rewrite(document, references, &settings.media_prefix)?;
        let body = render(&document);

        self.advance(PublishState::Submitting);
        let request = PublishRequest { title, body, tags };
        let created = self
            .publisher
            .documents
            .create(&request)
            .await
            .map_err(|err| PublishError::from_gateway(Stage::Submit, err))?;

        Ok(PublishOutcome {
            attempt: self.id,
            snapshot_revision: revision,
            document,
            request,
            created,
        })
    }

    fn advance(&self, next: PublishState) {
        debug!(
            target = "inkpost::publish",
            from = self.state.borrow().name(),
            to = next.name(),
            "State transition"
        );
        self.state.send_replace(next);
    }
}

fn report_failure(err: &PublishError) {
    match err.kind() {
        ErrorKind::Invariant => error!(
            target: "inkpost::invariant",
            error = %err,
            "Extracted images and upload references disagree"
        ),
        ErrorKind::Transport => warn!(target = "inkpost::publish", error = %err, "Publish failed"),
        ErrorKind::User => warn!(
            target = "inkpost::publish",
            error = %err,
            "Publish rejected by input validation"
        ),
    }
}

fn report_orphans(references: &UploadResult) {
    if references.is_empty() {
        return;
    }
    warn!(
        target = "inkpost::publish",
        orphaned = ?references.as_slice(),
        "Uploaded images are left unreferenced"
    );
}
