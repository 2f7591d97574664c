use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::RawArticle;
use super::xml;
use crate::text::truncate_at_boundary;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum PubMedError {
    #[error("PUBMED_EMAIL not set. NCBI requires a contact email for E-utilities requests.")]
    EmailNotSet,

    #[error("NCBI rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("E-utilities error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("malformed efetch response: {0}")]
    Xml(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for the external literature-search collaborator.
/// Implemented by `PubMedClient` for production; mock implementations used in tests.
pub trait LiteratureSearch {
    async fn query(&self, term: &str, max_results: u32)
    -> Result<Vec<RawArticle>, PubMedError>;
}

impl<T: LiteratureSearch> LiteratureSearch for &T {
    async fn query(
        &self,
        term: &str,
        max_results: u32,
    ) -> Result<Vec<RawArticle>, PubMedError> {
        (**self).query(term, max_results).await
    }
}

/// NCBI E-utilities client: esearch for PMIDs, efetch for article records.
#[derive(Clone)]
pub struct PubMedClient {
    http: Client,
    tool: String,
    email: String,
    base_url: String,
}

#[derive(Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedClient {
    pub fn from_env(http: Client, tool: &str) -> Result<Self, PubMedError> {
        let email = env::var("PUBMED_EMAIL").map_err(|_| PubMedError::EmailNotSet)?;
        if email.trim().is_empty() {
            return Err(PubMedError::EmailNotSet);
        }
        Ok(Self {
            http,
            tool: tool.to_string(),
            email: email.trim().to_string(),
            base_url: EUTILS_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            tool: "medq-test".to_string(),
            email: "test@example.com".to_string(),
            base_url: base_url.to_string(),
        }
    }

    async fn esearch(&self, term: &str, max_results: u32) -> Result<Vec<String>, PubMedError> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let retmax = max_results.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("term", term),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
                ("tool", self.tool.as_str()),
                ("email", self.email.as_str()),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = check_status(response.status())?;
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let body: EsearchResponse = response.json().await?;
        Ok(body.esearchresult.idlist)
    }

    async fn efetch(&self, ids: &[String]) -> Result<Vec<RawArticle>, PubMedError> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let id = ids.join(",");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("id", id.as_str()),
                ("retmode", "xml"),
                ("rettype", "abstract"),
                ("tool", self.tool.as_str()),
                ("email", self.email.as_str()),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = check_status(response.status())?;
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let body = response.text().await?;
        xml::parse_article_set(&body)
    }
}

impl LiteratureSearch for PubMedClient {
    async fn query(
        &self,
        term: &str,
        max_results: u32,
    ) -> Result<Vec<RawArticle>, PubMedError> {
        let ids = self.esearch(term, max_results).await?;
        if ids.is_empty() {
            debug!(term, "no PubMed matches");
            return Ok(Vec::new());
        }
        let articles = self.efetch(&ids).await?;
        debug!(term, hits = articles.len(), "pubmed query complete");
        Ok(articles)
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<reqwest::StatusCode, PubMedError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        warn!("NCBI rate limited");
        return Err(PubMedError::RateLimited);
    }
    Ok(status)
}

fn api_error(code: u16, body: &str) -> PubMedError {
    PubMedError::Api {
        code,
        message: truncate_at_boundary(body, 200).to_string(),
    }
}
