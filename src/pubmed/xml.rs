//! Streaming parser for efetch `PubmedArticleSet` responses.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::client::PubMedError;
use super::types::RawArticle;

/// Which element's character data we are currently collecting.
#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Abstract,
    Keyword,
    Year,
    Month,
    Day,
    ForeName,
    LastName,
    Doi,
}

#[derive(Default)]
struct ArticleState {
    title: String,
    abstract_parts: Vec<String>,
    current_abstract: String,
    keywords: Vec<String>,
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
    doi: Option<String>,
    authors: Vec<String>,
    fore_name: Option<String>,
    last_name: Option<String>,
}

impl ArticleState {
    fn finish(mut self) -> RawArticle {
        if !self.current_abstract.is_empty() {
            self.abstract_parts.push(std::mem::take(&mut self.current_abstract));
        }
        let date: Vec<String> = [self.year, self.month, self.day]
            .into_iter()
            .flatten()
            .collect();
        RawArticle {
            title: (!self.title.is_empty()).then_some(self.title),
            abstract_text: (!self.abstract_parts.is_empty())
                .then(|| self.abstract_parts.join(" ")),
            keywords: self.keywords,
            publication_date: (!date.is_empty()).then(|| date.join("-")),
            doi: self.doi,
            authors: self.authors,
        }
    }
}

/// Parse an efetch XML body into raw articles. Missing optional elements
/// are tolerated everywhere; only malformed XML is an error.
pub(crate) fn parse_article_set(body: &str) -> Result<Vec<RawArticle>, PubMedError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut current: Option<ArticleState> = None;
    let mut field = Field::None;
    let mut in_pub_date = false;
    let mut in_author = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PubMedError::Xml(e.to_string()))?;
        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"PubmedArticle" => {
                    current = Some(ArticleState::default());
                    field = Field::None;
                }
                b"ArticleTitle" => field = Field::Title,
                b"AbstractText" => field = Field::Abstract,
                b"Keyword" => field = Field::Keyword,
                b"PubDate" => in_pub_date = true,
                b"Year" if in_pub_date => field = Field::Year,
                b"Month" if in_pub_date => field = Field::Month,
                b"Day" if in_pub_date => field = Field::Day,
                b"Author" => in_author = true,
                b"ForeName" if in_author => field = Field::ForeName,
                b"LastName" if in_author => field = Field::LastName,
                b"ArticleId" if attr_eq(e, b"IdType", b"doi") => field = Field::Doi,
                b"ELocationID" if attr_eq(e, b"EIdType", b"doi") => field = Field::Doi,
                // Inline markup inside titles and abstracts must not stop
                // text collection.
                b"i" | b"b" | b"u" | b"sup" | b"sub" => {}
                _ => field = Field::None,
            },
            Event::End(ref e) => {
                match e.name().as_ref() {
                    b"PubmedArticle" => {
                        if let Some(state) = current.take() {
                            articles.push(state.finish());
                        }
                    }
                    b"AbstractText" => {
                        if let Some(state) = current.as_mut()
                            && !state.current_abstract.is_empty()
                        {
                            let part = std::mem::take(&mut state.current_abstract);
                            state.abstract_parts.push(part);
                        }
                    }
                    b"PubDate" => in_pub_date = false,
                    b"Author" => {
                        in_author = false;
                        if let Some(state) = current.as_mut() {
                            let fore = state.fore_name.take();
                            let last = state.last_name.take();
                            match (fore, last) {
                                (Some(f), Some(l)) => state.authors.push(format!("{f} {l}")),
                                (None, Some(l)) => state.authors.push(l),
                                (Some(f), None) => state.authors.push(f),
                                (None, None) => {}
                            }
                        }
                    }
                    b"i" | b"b" | b"u" | b"sup" | b"sub" => continue,
                    _ => {}
                }
                field = Field::None;
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|e| PubMedError::Xml(e.to_string()))?;
                collect(current.as_mut(), field, &text);
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e.as_ref());
                collect(current.as_mut(), field, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(articles)
}

fn collect(state: Option<&mut ArticleState>, field: Field, text: &str) {
    let Some(state) = state else { return };
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match field {
        Field::Title => {
            if !state.title.is_empty() {
                state.title.push(' ');
            }
            state.title.push_str(text);
        }
        Field::Abstract => {
            if !state.current_abstract.is_empty() {
                state.current_abstract.push(' ');
            }
            state.current_abstract.push_str(text);
        }
        Field::Keyword => state.keywords.push(text.to_string()),
        Field::Year => state.year = Some(text.to_string()),
        Field::Month => state.month = Some(text.to_string()),
        Field::Day => state.day = Some(text.to_string()),
        Field::ForeName => state.fore_name = Some(text.to_string()),
        Field::LastName => state.last_name = Some(text.to_string()),
        Field::Doi => {
            if state.doi.is_none() {
                state.doi = Some(text.to_string());
            }
        }
        Field::None => {}
    }
}

fn attr_eq(e: &BytesStart, key: &[u8], value: &[u8]) -> bool {
    e.attributes()
        .flatten()
        .any(|a| a.key.as_ref() == key && a.value.as_ref() == value)
}
