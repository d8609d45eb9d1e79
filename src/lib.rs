//! Publish rich-text drafts whose images are embedded inline.
//!
//! Inline `data:` image payloads are uploaded in one multipart request, the
//! document is rewritten to reference the hosted copies, rendered to markup and
//! submitted.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
