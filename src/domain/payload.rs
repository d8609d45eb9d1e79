//! Inline image payloads and the binary blobs derived from them.
//!
//! A [`Payload`] is the self-describing `data:` URL an editor embeds when an
//! author inserts a local image. A [`Blob`] is its decoded form, produced only
//! while a publish attempt is materializing its upload.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;

use super::error::DomainError;

const DATA_SCHEME: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";
const IMAGE_PREFIX: &str = "image/";
const FALLBACK_EXTENSION: &str = "bin";
/// Picked over rarer aliases such as `jfif` or `jpe`.
const PREFERRED_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "webp", "svg", "bmp", "ico", "avif"];

/// Whether the media type names an image (`image/*`).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..IMAGE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_PREFIX))
}

/// Whether a string is shaped like an inline `data:` URL.
pub fn is_data_url(value: &str) -> bool {
    value
        .get(..DATA_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_SCHEME))
}

/// Inline image data carried by an image-embed operation.
///
/// The raw URL is kept verbatim; it is only parsed when the payload is
/// decoded, so a malformed payload surfaces as a decode failure during the
/// publish attempt rather than when the document is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload {
    uri: String,
}

impl Payload {
    /// Wrap a `data:` URL, handing anything else back unchanged.
    pub fn from_data_url(uri: impl Into<String>) -> Result<Self, String> {
        let uri = uri.into();
        if is_data_url(&uri) {
            Ok(Self { uri })
        } else {
            Err(uri)
        }
    }

    /// Encode raw bytes as a base64 `data:` URL.
    pub fn encode(media_type: &str, bytes: &[u8]) -> Self {
        Self {
            uri: format!("data:{media_type};base64,{}", STANDARD.encode(bytes)),
        }
    }

    /// Build a payload from a file the author picked, refusing non-images.
    pub fn from_selected(file: &SelectedFile) -> Result<Self, DomainError> {
        if !is_image_media_type(&file.media_type) {
            return Err(DomainError::unsupported(file.media_type.clone()));
        }
        Ok(Self::encode(&file.media_type, &file.bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn into_string(self) -> String {
        self.uri
    }

    /// Declared media type, lowercased. Empty declarations fall back to `text/plain`.
    pub fn media_type(&self) -> Result<String, DomainError> {
        let (header, _) = self.split()?;
        Ok(parse_header(header).0)
    }

    /// Decode the inline data, keeping the declared media type.
    pub fn decode(&self) -> Result<(String, Bytes), DomainError> {
        let (header, data) = self.split()?;
        let (media_type, is_base64) = parse_header(header);
        let bytes = if is_base64 {
            STANDARD
                .decode(data)
                .map_err(|err| DomainError::decode(format!("invalid base64 data: {err}")))?
        } else {
            percent_decode(data)?
        };
        Ok((media_type, Bytes::from(bytes)))
    }

    fn split(&self) -> Result<(&str, &str), DomainError> {
        let rest = self
            .uri
            .get(DATA_SCHEME.len()..)
            .filter(|_| is_data_url(&self.uri))
            .ok_or_else(|| DomainError::decode("missing `data:` scheme"))?;
        rest.split_once(',')
            .ok_or_else(|| DomainError::decode("missing `,` separating header and data"))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads can be megabytes long; keep log lines readable.
        const PREVIEW: usize = 48;
        match self.uri.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "{}…", &self.uri[..cut]),
            None => f.write_str(&self.uri),
        }
    }
}

fn parse_header(header: &str) -> (String, bool) {
    let mut parts = header.split(';');
    let media_type = parts
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_ascii_lowercase();
    let is_base64 = parts.any(|param| param.trim().eq_ignore_ascii_case("base64"));
    (media_type, is_base64)
}

fn percent_decode(data: &str) -> Result<Vec<u8>, DomainError> {
    let raw = data.as_bytes();
    let malformed = raw
        .iter()
        .enumerate()
        .filter(|(_, byte)| **byte == b'%')
        .map(|(idx, _)| idx)
        .find(|idx| {
            !raw.get(idx + 1..idx + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit))
        });
    if let Some(idx) = malformed {
        return Err(DomainError::decode(format!(
            "bad percent escape at byte {idx}"
        )));
    }
    Ok(urlencoding::decode_binary(raw).into_owned())
}

/// Decoded image bytes ready for a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub media_type: String,
    pub file_name: String,
    pub bytes: Bytes,
}

impl Blob {
    /// Decode the `index`-th payload of a document into a blob.
    pub fn from_payload(index: usize, payload: &Payload) -> Result<Self, DomainError> {
        let (media_type, bytes) = payload.decode()?;
        if !is_image_media_type(&media_type) {
            return Err(DomainError::unsupported(media_type));
        }
        let extension = mime_guess::get_mime_extensions_str(&media_type)
            .and_then(|exts| {
                exts.iter()
                    .copied()
                    .find(|ext| PREFERRED_EXTENSIONS.contains(ext))
                    .or_else(|| exts.first().copied())
            })
            .unwrap_or(FALLBACK_EXTENSION);
        Ok(Self {
            file_name: format!("image-{index}.{extension}"),
            media_type,
            bytes,
        })
    }
}

/// A local file picked by the author for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}
