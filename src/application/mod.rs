//! Publish pipeline: extraction, materialization, rewrite, rendering and orchestration.

pub mod draft;
pub mod error;
pub mod extract;
pub mod materialize;
pub mod ports;
pub mod publish;
pub mod render;
pub mod rewrite;
