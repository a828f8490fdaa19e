//! Main content extraction API.
//!
//! The entry point is [`Reader`], along with convenience functions like
//! [`parse`] and [`fetch_and_parse`] that use the default configuration.
//!
//! # Example
//!
//! ```rust
//! use blaze_core::{Reader, ReaderConfig};
//!
//! let config = ReaderConfig::builder().semantic_min_text_len(20).build();
//! let reader = Reader::with_config(config).unwrap();
//!
//! let html = "<html><body><article><p>Short but semantic content.</p></article></body></html>";
//! let article = reader.parse(html).unwrap();
//! assert_eq!(article.text_content, "Short but semantic content.");
//! ```

use url::Url;

use crate::article::Article;
use crate::extract::{ExtractConfig, Extractor};
use crate::metadata::TitleSource;
use crate::parse::Document;
use crate::postprocess::ElementRule;
use crate::{BlazeError, Result};

#[cfg(feature = "fetch")]
use crate::fetch::{FetchConfig, fetch_url};

/// Configuration for [`Reader`]
pub type ReaderConfig = ExtractConfig;

impl ExtractConfig {
    /// Creates a new builder starting from the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use blaze_core::ReaderConfig;
    ///
    /// let config = ReaderConfig::builder()
    ///     .semantic_min_text_len(500)
    ///     .min_candidate_text_len(200)
    ///     .build();
    /// assert_eq!(config.semantic_min_text_len, 500);
    /// assert_eq!(config.score.min_text_len, 200);
    /// ```
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::new()
    }
}

/// Fluent builder for [`ReaderConfig`]
#[derive(Debug, Clone, Default)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text length a semantic element must exceed to win without scoring.
    pub fn semantic_min_text_len(mut self, value: usize) -> Self {
        self.config.semantic_min_text_len = value;
        self
    }

    /// Semantic selectors, in priority order.
    pub fn semantic_selectors<I, T>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.config.semantic_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Elements considered by the scorer.
    pub fn candidate_selector(mut self, selector: &str) -> Self {
        self.config.candidate_selector = selector.to_string();
        self
    }

    /// Text length below which a scored candidate is worth 0.
    pub fn min_candidate_text_len(mut self, value: usize) -> Self {
        self.config.score.min_text_len = value;
        self
    }

    /// Link density above which cleanup removes a container.
    pub fn max_link_density(mut self, value: f64) -> Self {
        self.config.sanitize.max_link_density = value;
        self
    }

    /// Add a removal rule to the cleanup table.
    pub fn remove(mut self, rule: ElementRule) -> Self {
        self.config.sanitize.removal_rules.push(rule);
        self
    }

    /// Add a noise class substring.
    pub fn noise_class(mut self, class: &str) -> Self {
        self.config.sanitize.noise_classes.push(class.to_lowercase());
        self
    }

    /// Attributes kept on the cleaned content.
    pub fn allowed_attributes<I, T>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.config.sanitize.allowed_attributes = attrs.into_iter().map(Into::into).collect();
        self
    }

    /// Title sources, in priority order.
    pub fn title_sources(mut self, sources: Vec<TitleSource>) -> Self {
        self.config.title_sources = sources;
        self
    }

    /// Title used when no source yields text.
    pub fn fallback_title(mut self, title: &str) -> Self {
        self.config.fallback_title = title.to_string();
        self
    }

    pub fn build(self) -> ReaderConfig {
        self.config
    }
}

/// Reader-mode extraction over raw HTML.
///
/// # Example
///
/// ```rust
/// use blaze_core::{BlazeError, Reader};
///
/// let reader = Reader::new();
/// let html = "<html><body><nav><a href=\"/\">Home</a></nav></body></html>";
/// assert!(matches!(reader.parse(html), Err(BlazeError::NoCandidate)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reader {
    extractor: Extractor,
}

impl Reader {
    /// Creates a reader with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::InvalidPattern`] when a configured regex does not compile.
    pub fn with_config(config: ReaderConfig) -> Result<Self> {
        Ok(Self { extractor: Extractor::new(config)? })
    }

    pub fn config(&self) -> &ReaderConfig {
        self.extractor.config()
    }

    /// Parses an HTML string and extracts its main content.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::NoCandidate`] when the page has no main content.
    pub fn parse(&self, html: &str) -> Result<Article> {
        let doc = Document::parse(html)?;
        self.extractor.extract(&doc)
    }

    /// Parses HTML with a known base URL; relative links in the content are
    /// resolved against it and it becomes the article's `source_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::InvalidUrl`] if the URL is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use blaze_core::Reader;
    ///
    /// let reader = Reader::new();
    /// let body = "Plenty of words in this paragraph. ".repeat(12);
    /// let html = format!("<article><p>{}</p><a href=\"/more\">More</a></article>", body);
    /// let article = reader.parse_with_url(&html, "https://example.com/post").unwrap();
    /// assert!(article.content.contains("https://example.com/more"));
    /// ```
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Article> {
        let base_url = Url::parse(url).map_err(|e| BlazeError::InvalidUrl(e.to_string()))?;
        let doc = Document::parse(html)?;
        self.extractor.extract_with_base_url(&doc, Some(&base_url))
    }

    /// Fetch HTML from `url` with the default fetch settings and extract it.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_parse(&self, url: &str) -> Result<Article> {
        self.fetch_and_parse_with_config(url, &FetchConfig::default()).await
    }

    /// Fetch HTML from `url` with custom fetch settings and extract it.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_parse_with_config(&self, url: &str, fetch_config: &FetchConfig) -> Result<Article> {
        let html = fetch_url(url, fetch_config).await?;
        self.parse_with_url(&html, url)
    }

    /// Whether extraction would find a content candidate in `html`.
    ///
    /// Runs the semantic lookup and the scorer but none of the cleanup.
    pub fn is_probably_readable(&self, html: &str) -> bool {
        match Document::parse(html) {
            Ok(doc) => matches!(self.extractor.find_candidate(&doc), Ok(Some(_))),
            Err(_) => false,
        }
    }
}

/// Convenience function for one-liner extraction with defaults.
pub fn parse(html: &str) -> Result<Article> {
    Reader::new().parse(html)
}

/// Convenience function for one-liner extraction with URL context.
pub fn parse_with_url(html: &str, url: &str) -> Result<Article> {
    Reader::new().parse_with_url(html, url)
}

/// Convenience function for a quick readability check.
pub fn is_probably_readable(html: &str) -> bool {
    Reader::new().is_probably_readable(html)
}

/// Fetch and parse from a URL with defaults.
///
/// # Example
///
/// ```no_run
/// use blaze_core::fetch_and_parse;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let article = fetch_and_parse("https://example.com/article").await?;
///     println!("Title: {}", article.title);
///     Ok(())
/// }
/// ```
#[cfg(feature = "fetch")]
pub async fn fetch_and_parse(url: &str) -> Result<Article> {
    Reader::new().fetch_and_parse(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::CandidateSource;

    const ARTICLE_HTML: &str = r##"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Test Article</title>
        </head>
        <body>
            <nav><a href="/">Home</a> <a href="/about">About</a></nav>
            <article class="main-content">
                <h1>Article Title</h1>
                <p>This is a long paragraph with lots of content to ensure it meets the character threshold.</p>
                <p>This is another long paragraph with plenty of content, text, commas, and meaningful sentences.</p>
                <p>A third paragraph with substantial content that pushes the article past the semantic bar.</p>
                <p>See the <a href="notes.html">notes</a> for details.</p>
            </article>
        </body>
        </html>
    "##;

    #[test]
    fn test_reader_config_default() {
        let config = ReaderConfig::default();
        assert_eq!(config.semantic_min_text_len, 300);
        assert_eq!(config.score.min_text_len, 100);
        assert_eq!(config.sanitize.max_link_density, 0.5);
    }

    #[test]
    fn test_reader_config_builder() {
        let config = ReaderConfig::builder()
            .semantic_min_text_len(50)
            .semantic_selectors(["main"])
            .candidate_selector("div")
            .min_candidate_text_len(10)
            .max_link_density(0.8)
            .remove(ElementRule::Tag("form".to_string()))
            .noise_class("Promo")
            .allowed_attributes(["href"])
            .title_sources(vec![TitleSource::text("h2")])
            .fallback_title("No title")
            .build();

        assert_eq!(config.semantic_min_text_len, 50);
        assert_eq!(config.semantic_selectors, vec!["main"]);
        assert_eq!(config.candidate_selector, "div");
        assert_eq!(config.score.min_text_len, 10);
        assert_eq!(config.sanitize.max_link_density, 0.8);
        assert_eq!(config.sanitize.removal_rules.last(), Some(&ElementRule::Tag("form".to_string())));
        assert_eq!(config.sanitize.noise_classes.last().map(String::as_str), Some("promo"));
        assert_eq!(config.sanitize.allowed_attributes, vec!["href"]);
        assert_eq!(config.title_sources, vec![TitleSource::text("h2")]);
        assert_eq!(config.fallback_title, "No title");
    }

    #[test]
    fn test_parse_article() {
        let article = Reader::new().parse(ARTICLE_HTML).unwrap();

        assert_eq!(article.title, "Article Title");
        assert_eq!(article.source, CandidateSource::Semantic);
        assert!(article.text_content.contains("third paragraph"));
        assert!(!article.text_content.contains("Home"));
        assert_eq!(article.length, article.text_content.chars().count());
    }

    #[test]
    fn test_parse_with_url() {
        let article = Reader::new().parse_with_url(ARTICLE_HTML, "https://example.com/blog/").unwrap();
        assert_eq!(article.source_url.as_deref(), Some("https://example.com/blog/"));
        assert!(article.content.contains(r#"href="https://example.com/blog/notes.html""#));
    }

    #[test]
    fn test_parse_with_invalid_url() {
        let result = Reader::new().parse_with_url(ARTICLE_HTML, "not a url");
        assert!(matches!(result, Err(BlazeError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ReaderConfig::default();
        config.sanitize.noise_phrases.push("(unclosed".to_string());
        assert!(matches!(Reader::with_config(config), Err(BlazeError::InvalidPattern { .. })));
    }

    #[test]
    fn test_is_probably_readable() {
        let reader = Reader::new();
        assert!(reader.is_probably_readable(ARTICLE_HTML));
        assert!(!reader.is_probably_readable("<html><body><nav><a href=\"#\">Link</a></nav></body></html>"));
    }

    #[test]
    fn test_convenience_functions() {
        assert_eq!(parse(ARTICLE_HTML).unwrap().title, "Article Title");
        assert!(parse_with_url(ARTICLE_HTML, "https://example.com").unwrap().source_url.is_some());
        assert!(is_probably_readable(ARTICLE_HTML));
        assert!(matches!(parse("<p>tiny</p>"), Err(BlazeError::NoCandidate)));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_fetch_and_parse_invalid_url() {
        let result = std::thread::spawn(|| {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetch_and_parse("not-a-url"))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(BlazeError::InvalidUrl(_))));
    }
}
