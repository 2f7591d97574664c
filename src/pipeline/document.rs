use crate::pubmed::RawArticle;

/// One retrieved literature record in prompt-ready form. Constructed once
/// by `documentize` and never mutated; dropped at the end of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub meta: DocumentMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub title: String,
    pub keywords: Vec<String>,
    pub publication_date: String,
    pub doi: String,
    pub authors: Vec<String>,
}

/// Convert a PubMed hit into a `Document`. Absent fields become empty
/// values; normalization never fails.
pub fn documentize(article: RawArticle) -> Document {
    Document {
        content: article.abstract_text.unwrap_or_default(),
        meta: DocumentMeta {
            title: article.title.unwrap_or_default(),
            keywords: article.keywords,
            publication_date: article.publication_date.unwrap_or_default(),
            doi: article.doi.unwrap_or_default(),
            authors: article.authors,
        },
    }
}
