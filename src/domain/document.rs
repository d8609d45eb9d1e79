//! Rich-text document model.
//!
//! A [`Document`] is an ordered list of [`Operation`]s in the Quill delta
//! shape (`{"ops":[{"insert":…,"attributes":…}]}`). The publish pipeline only
//! ever reads the whole list or replaces it wholesale; there is no partial
//! mutation API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::payload::Payload;

/// Formatting attributes attached to an operation. Ordered so that equal
/// documents always serialize identically.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Where an embedded image's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Still inline in the document as a `data:` URL.
    Inline(Payload),
    /// Already hosted; the string is the final reference.
    Hosted(String),
}

impl ImageSource {
    pub fn from_raw(raw: String) -> Self {
        match Payload::from_data_url(raw) {
            Ok(payload) => Self::Inline(payload),
            Err(reference) => Self::Hosted(reference),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline(payload) => payload.as_str(),
            Self::Hosted(reference) => reference,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Inline(payload) => Some(payload),
            Self::Hosted(_) => None,
        }
    }
}

/// One unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation", into = "RawOperation")]
pub enum Operation {
    TextInsert {
        content: String,
        attributes: Attributes,
    },
    ImageEmbed {
        source: ImageSource,
        attributes: Attributes,
    },
    /// A formatting run over existing content; opaque to the pipeline.
    FormatMark {
        length: usize,
        attributes: Attributes,
    },
}

impl Operation {
    pub fn text(content: impl Into<String>) -> Self {
        Self::TextInsert {
            content: content.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn image(source: ImageSource) -> Self {
        Self::ImageEmbed {
            source,
            attributes: Attributes::new(),
        }
    }

    pub fn inline_image(payload: Payload) -> Self {
        Self::image(ImageSource::Inline(payload))
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::TextInsert { attributes, .. }
            | Self::ImageEmbed { attributes, .. }
            | Self::FormatMark { attributes, .. } => attributes,
        }
    }
}

/// Ordered operation sequence representing a rich-text body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    ops: Vec<Operation>,
}

impl Document {
    pub fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    /// Contents of a freshly opened editor: a single empty line.
    pub fn blank() -> Self {
        Self::new(vec![Operation::text("\n")])
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Replace the whole operation sequence at once.
    pub fn set_operations(&mut self, ops: Vec<Operation>) {
        self.ops = ops;
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }

    /// Number of image embeds still carrying an inline payload.
    pub fn inline_image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Operation::ImageEmbed { source: ImageSource::Inline(_), .. }))
            .count()
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    insert: Option<RawInsert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retain: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawInsert {
    Text(String),
    Embed(RawEmbed),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEmbed {
    image: String,
}

impl TryFrom<RawOperation> for Operation {
    type Error = String;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        match (raw.insert, raw.retain) {
            (Some(RawInsert::Text(content)), None) => Ok(Self::TextInsert {
                content,
                attributes: raw.attributes,
            }),
            (Some(RawInsert::Embed(embed)), None) => Ok(Self::ImageEmbed {
                source: ImageSource::from_raw(embed.image),
                attributes: raw.attributes,
            }),
            (None, Some(length)) => Ok(Self::FormatMark {
                length,
                attributes: raw.attributes,
            }),
            (Some(_), Some(_)) => Err("operation cannot both insert and retain".to_string()),
            (None, None) => Err("operation must carry `insert` or `retain`".to_string()),
        }
    }
}

impl From<Operation> for RawOperation {
    fn from(op: Operation) -> Self {
        match op {
            Operation::TextInsert {
                content,
                attributes,
            } => Self {
                insert: Some(RawInsert::Text(content)),
                retain: None,
                attributes,
            },
            Operation::ImageEmbed { source, attributes } => {
                let image = match source {
                    ImageSource::Inline(payload) => payload.into_string(),
                    ImageSource::Hosted(reference) => reference,
                };
                Self {
                    insert: Some(RawInsert::Embed(RawEmbed { image })),
                    retain: None,
                    attributes,
                }
            }
            Operation::FormatMark { length, attributes } => Self {
                insert: None,
                retain: Some(length),
                attributes,
            },
        }
    }
}
