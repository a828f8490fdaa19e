use serde::{Deserialize, Serialize};

use crate::{Document, Result};

/// Where a title candidate is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleSource {
    /// Flattened text of the first element matching `selector`
    Text { selector: String },
    /// An attribute of the first element matching `selector`
    Attribute { selector: String, attribute: String },
}

impl TitleSource {
    pub fn text(selector: &str) -> Self {
        TitleSource::Text { selector: selector.to_string() }
    }

    pub fn attribute(selector: &str, attribute: &str) -> Self {
        TitleSource::Attribute { selector: selector.to_string(), attribute: attribute.to_string() }
    }

    /// Read this source from `doc`, trimmed. `None` when the element or
    /// attribute is missing or the value is blank.
    pub fn read(&self, doc: &Document) -> Result<Option<String>> {
        let value = match self {
            TitleSource::Text { selector } => doc.select_first(selector)?.map(|el| el.text()),
            TitleSource::Attribute { selector, attribute } => doc
                .select_first(selector)?
                .and_then(|el| el.attr(attribute).map(str::to_string)),
        };

        Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }
}

/// Default title sources in priority order:
/// 1. First `<h1>`
/// 2. Open Graph `og:title`
/// 3. Twitter `twitter:title`
/// 4. `<title>` element
/// 5. Common title classes
pub fn default_title_sources() -> Vec<TitleSource> {
    vec![
        TitleSource::text("h1"),
        TitleSource::attribute(r#"[property="og:title"]"#, "content"),
        TitleSource::attribute(r#"meta[name="twitter:title"]"#, "content"),
        TitleSource::text("title"),
        TitleSource::text(".title, .headline, .post-title"),
    ]
}

/// Title used when every source comes up empty
pub const FALLBACK_TITLE: &str = "Untitled";

impl Document {
    /// Resolve the article title from `sources`, first non-empty value wins.
    ///
    /// Falls back to `fallback` when no source yields text. Only an invalid
    /// selector in `sources` produces an error.
    pub fn resolve_title(&self, sources: &[TitleSource], fallback: &str) -> Result<String> {
        for source in sources {
            if let Some(title) = source.read(self)? {
                return Ok(title);
            }
        }
        Ok(fallback.to_string())
    }

    /// Resolve the title with [`default_title_sources`]
    pub fn extract_title(&self) -> String {
        self.resolve_title(&default_title_sources(), FALLBACK_TITLE)
            .unwrap_or_else(|_| FALLBACK_TITLE.to_string())
    }
}

/// Whitespace-separated word count
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlazeError;

    #[test]
    fn test_h1_wins_over_meta() {
        let html = r#"<html><head><title>Page</title><meta property="og:title" content="OG"></head><body><h1>  Heading  </h1></body></html>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_title(), "Heading");
    }

    #[test]
    fn test_blank_h1_falls_through_to_og() {
        let html = r#"<html><head><title>Page</title><meta property="og:title" content=" OG Title "></head><body><h1>   </h1></body></html>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_title(), "OG Title");
    }

    #[test]
    fn test_twitter_before_title_element() {
        let html = r#"<html><head><title>Page</title><meta name="twitter:title" content="Tweet Title"></head><body></body></html>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_title(), "Tweet Title");
    }

    #[test]
    fn test_title_element() {
        let doc = Document::parse("<html><head><title>Just a Page</title></head><body></body></html>").unwrap();
        assert_eq!(doc.extract_title(), "Just a Page");
    }

    #[test]
    fn test_class_based_title() {
        let doc = Document::parse(r#"<body><div class="headline">Breaking</div></body>"#).unwrap();
        assert_eq!(doc.extract_title(), "Breaking");
    }

    #[test]
    fn test_untitled_fallback() {
        let doc = Document::parse("<body><p>No titles anywhere</p></body>").unwrap();
        assert_eq!(doc.extract_title(), FALLBACK_TITLE);
    }

    #[test]
    fn test_custom_sources_and_fallback() {
        let doc = Document::parse(r#"<body><span data-title="Custom">x</span></body>"#).unwrap();
        let sources = vec![TitleSource::attribute("span", "data-title")];
        assert_eq!(doc.resolve_title(&sources, "None").unwrap(), "Custom");
        assert_eq!(doc.resolve_title(&[], "None").unwrap(), "None");
    }

    #[test]
    fn test_invalid_source_selector() {
        let doc = Document::parse("<body></body>").unwrap();
        let result = doc.resolve_title(&[TitleSource::text("[[bad")], FALLBACK_TITLE);
        assert!(matches!(result, Err(BlazeError::HtmlParseError(_))));
    }

    #[test]
    fn test_title_sources_from_json() {
        let json = r#"[{"kind":"text","selector":"h2"},{"kind":"attribute","selector":"meta","attribute":"content"}]"#;
        let sources: Vec<TitleSource> = serde_json::from_str(json).unwrap();
        assert_eq!(sources, vec![TitleSource::text("h2"), TitleSource::attribute("meta", "content")]);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("one  two\nthree"), 3);
        assert_eq!(count_words("   "), 0);
    }
}
