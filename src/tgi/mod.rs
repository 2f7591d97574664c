//! Hugging Face Inference API collaborator for text generation.

pub(crate) mod client;
mod types;

pub use client::{Generator, TgiClient, TgiError};
pub use types::DecodeConfig;
