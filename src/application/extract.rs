//! Collect inline image payloads from a document snapshot.
//!
//! Encounter order is the correlation key shared by extraction, upload, and
//! rewrite: the k-th payload returned here becomes the k-th blob uploaded and
//! receives the k-th reference back. Embeds that are already hosted are
//! skipped and keep their reference.

use crate::domain::{
    document::{Document, ImageSource, Operation},
    payload::Payload,
};

/// Inline payloads of `document`, in operation order.
pub fn extract_payloads(document: &Document) -> Vec<&Payload> {
    document
        .operations()
        .iter()
        .filter_map(|op| match op {
            Operation::ImageEmbed {
                source: ImageSource::Inline(payload),
                ..
            } => Some(payload),
            _ => None,
        })
        .collect()
}
