/// One PubMed hit as returned by efetch. Every field may be absent;
/// normalization into a prompt-ready document happens downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub publication_date: Option<String>,
    pub doi: Option<String>,
    pub authors: Vec<String>,
}
