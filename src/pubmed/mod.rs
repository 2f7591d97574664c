//! PubMed E-utilities collaborator: keyword search plus abstract retrieval.

pub(crate) mod client;
mod types;
mod xml;

pub use client::{LiteratureSearch, PubMedClient, PubMedError};
pub use types::RawArticle;
