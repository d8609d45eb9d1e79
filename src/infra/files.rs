//! Local file access for the command-line surface.

use std::path::Path;

use bytes::Bytes;
use tokio::fs;

use crate::domain::{document::Document, payload::SelectedFile};

use super::error::InfraError;

/// Read a picked file, guessing its media type from the extension.
///
/// Unknown extensions map to `application/octet-stream`, which the image check
/// later refuses.
pub async fn read_selected_file(path: &Path) -> Result<SelectedFile, InfraError> {
    let bytes = fs::read(path)
        .await
        .map_err(|source| InfraError::file(path, source))?;
    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(SelectedFile {
        name,
        media_type,
        bytes: Bytes::from(bytes),
    })
}

pub async fn read_text(path: &Path) -> Result<String, InfraError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| InfraError::file(path, source))
}

pub async fn write_document(path: &Path, document: &Document) -> Result<(), InfraError> {
    let json = serde_json::to_vec_pretty(document)?;
    fs::write(path, json)
        .await
        .map_err(|source| InfraError::file(path, source))
}
