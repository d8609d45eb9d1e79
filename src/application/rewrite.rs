//! Replace inline image payloads with their hosted references.

use crate::domain::document::{Document, ImageSource, Operation};

use super::{error::PublishError, ports::UploadResult};

/// Swap the k-th inline image for `prefix + references[k]`.
///
/// The document must be the same snapshot the payloads were extracted from.
/// A count mismatch means the two passes disagree and is fatal; nothing is
/// truncated or padded.
pub fn rewrite(
    document: Document,
    references: &UploadResult,
    prefix: &str,
) -> Result<Document, PublishError> {
    let embeds = document.inline_image_count();
    if embeds != references.len() {
        return Err(PublishError::ReferenceCountMismatch {
            embeds,
            references: references.len(),
        });
    }

    let mut next = references.as_slice().iter();
    let ops = document
        .into_operations()
        .into_iter()
        .map(|op| match op {
            Operation::ImageEmbed {
                source: ImageSource::Inline(payload),
                attributes,
            } => {
                let source = match next.next() {
                    Some(reference) => ImageSource::Hosted(format!("{prefix}{reference}")),
                    // Unreachable after the count check above.
                    None => ImageSource::Inline(payload),
                };
                Operation::ImageEmbed { source, attributes }
            }
            other => other,
        })
        .collect();

    Ok(Document::new(ops))
}
