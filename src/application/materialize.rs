//! Turn extracted payloads into one multipart upload unit.

use std::num::NonZeroUsize;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::domain::payload::{Blob, Payload};

use super::error::PublishError;

/// Blobs to be sent as repeated parts under a single form field.
///
/// Kept transport-neutral so it can be inspected before the gateway turns it
/// into an HTTP request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    field: String,
    blobs: Vec<Blob>,
}

impl MultipartBody {
    pub fn new(field: impl Into<String>, blobs: Vec<Blob>) -> Self {
        Self {
            field: field.into(),
            blobs,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Blob>) {
        (self.field, self.blobs)
    }
}

/// Decode every payload and package the blobs under `field`.
///
/// Up to `concurrency` payloads are decoded at once; results are reassembled
/// by payload index, never by completion order. The first failure aborts the
/// whole unit.
pub async fn materialize(
    field: &str,
    payloads: &[&Payload],
    concurrency: NonZeroUsize,
) -> Result<MultipartBody, PublishError> {
    let blobs: Vec<Blob> = stream::iter(payloads.iter().enumerate())
        .map(|(index, payload)| async move {
            Blob::from_payload(index, payload)
                .map_err(|err| PublishError::from_domain(index, err))
        })
        .buffered(concurrency.get())
        .try_collect()
        .await?;

    debug!(
        target = "inkpost::materialize",
        field,
        blobs = blobs.len(),
        bytes = blobs.iter().map(|b| b.bytes.len()).sum::<usize>(),
        "Materialized upload body"
    );

    Ok(MultipartBody::new(field, blobs))
}
