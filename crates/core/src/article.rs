//! Article output type with content and format conversion.
//!
//! [`Article`] is the immutable result of one extraction: the cleaned HTML,
//! its plain text, the resolved title and a few derived figures. It is
//! serialized straight from the owned tree, so it never borrows from the
//! parsed document.

use serde::Serialize;

use crate::Result;
use crate::metadata::count_words;

/// Output format options for Article content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// HTML format (cleaned extracted content).
    Html,
    /// Markdown with the title as a leading heading.
    Markdown,
    /// Plain text format (flattened text of the content).
    PlainText,
    /// JSON format (every field of the article).
    Json,
}

/// How the content root was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// A semantic element (`article`, `main`, `[role="main"]`) long enough to win outright
    Semantic,
    /// The highest scoring `div`/`section`
    Scored,
}

/// The complete result of reading an HTML document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Inner HTML of the cleaned content root.
    pub content: String,

    /// Flattened text of the cleaned content root.
    pub text_content: String,

    /// Resolved title, never empty.
    pub title: String,

    /// Length of `text_content` in characters.
    pub length: usize,

    /// Whitespace-separated words in `text_content`.
    pub word_count: usize,

    /// How the content root was chosen.
    pub source: CandidateSource,

    /// Winning score when the root came from the scorer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Source URL if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Article {
    /// Creates a new Article, deriving `length` and `word_count` from `text_content`.
    pub fn new(
        content: String, text_content: String, title: String, source: CandidateSource, score: Option<f64>,
    ) -> Self {
        let length = text_content.chars().count();
        let word_count = count_words(&text_content);
        Self { content, text_content, title, length, word_count, source, score, source_url: None }
    }

    /// Record the URL the article was read from.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Converts content to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Html => Ok(self.content.clone()),
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::PlainText => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Gets content as Markdown, headed by the title.
    ///
    /// Without the `markdown` feature the body is the plain text content.
    pub fn to_markdown(&self) -> String {
        let body = html_to_markdown(&self.content, &self.text_content);
        format!("# {}\n\n{}\n", self.title, body.trim())
    }

    /// Gets the article as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Gets content as plain text with surrounding whitespace trimmed.
    pub fn to_text(&self) -> String {
        self.text_content.trim().to_string()
    }
}

#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str, _text: &str) -> String {
    htmd::convert(html).unwrap_or_default()
}

#[cfg(not(feature = "markdown"))]
fn html_to_markdown(_html: &str, text: &str) -> String {
    text.to_string()
}
