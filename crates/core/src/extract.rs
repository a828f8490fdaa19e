use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::article::{Article, CandidateSource};
use crate::dom_tree::DomTree;
use crate::links::resolve_relative_urls;
use crate::metadata::{FALLBACK_TITLE, TitleSource, default_title_sources};
use crate::parse::{Document, Element};
use crate::postprocess::{SanitizeConfig, Sanitizer};
use crate::scoring::{CandidateScorer, HeuristicScorer, ScoreConfig};
use crate::{BlazeError, Result};

/// Configuration for content extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Semantic selectors tried in order before any scoring
    pub semantic_selectors: Vec<String>,
    /// A semantic element wins outright when its text is longer than this
    pub semantic_min_text_len: usize,
    /// Elements considered by the scorer
    pub candidate_selector: String,
    /// Scorer thresholds and weights
    pub score: ScoreConfig,
    /// Cleanup rule tables
    pub sanitize: SanitizeConfig,
    /// Title sources in priority order
    pub title_sources: Vec<TitleSource>,
    /// Title used when no source yields text
    pub fallback_title: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            semantic_selectors: vec!["article".to_string(), "main".to_string(), r#"[role="main"]"#.to_string()],
            semantic_min_text_len: 300,
            candidate_selector: "div, section".to_string(),
            score: ScoreConfig::default(),
            sanitize: SanitizeConfig::default(),
            title_sources: default_title_sources(),
            fallback_title: FALLBACK_TITLE.to_string(),
        }
    }
}

/// The element chosen as the content root
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// The element itself
    pub element: Element<'a>,
    /// Semantic short-circuit or scored selection
    pub source: CandidateSource,
    /// Winning score, for scored candidates
    pub score: Option<f64>,
}

/// Locates, clones and cleans the main content of a document.
///
/// The scorer is pluggable through [`CandidateScorer`]; [`Extractor::new`]
/// uses the built-in [`HeuristicScorer`].
#[derive(Debug, Clone)]
pub struct Extractor<S = HeuristicScorer> {
    config: ExtractConfig,
    scorer: S,
    sanitizer: Sanitizer,
}

impl Extractor<HeuristicScorer> {
    /// Build an extractor with the heuristic scorer configured from `config.score`.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::InvalidPattern`] when a configured regex does not compile.
    pub fn new(config: ExtractConfig) -> Result<Self> {
        let scorer = HeuristicScorer::new(config.score.clone())?;
        Self::with_scorer(config, scorer)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self { config: ExtractConfig::default(), scorer: HeuristicScorer::default(), sanitizer: Sanitizer::default() }
    }
}

impl<S: CandidateScorer> Extractor<S> {
    /// Build an extractor around a custom scorer. `config.score` is ignored.
    pub fn with_scorer(config: ExtractConfig, scorer: S) -> Result<Self> {
        let sanitizer = Sanitizer::new(config.sanitize.clone())?;
        Ok(Self { config, scorer, sanitizer })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// First semantic element, by selector priority then document order,
    /// whose text is longer than the semantic threshold.
    pub fn locate_semantic<'a>(&self, doc: &'a Document) -> Result<Option<Element<'a>>> {
        for selector in &self.config.semantic_selectors {
            for element in doc.select(selector)? {
                let text_len = element.text_len();
                if text_len > self.config.semantic_min_text_len {
                    debug!(%selector, text_len, "semantic candidate found");
                    return Ok(Some(element));
                }
                trace!(%selector, text_len, "semantic element too short");
            }
        }
        Ok(None)
    }

    /// Highest scoring candidate container. Ties keep the first in document
    /// order, and nothing scoring 0 or less is returned.
    pub fn select_scored<'a>(&self, doc: &'a Document) -> Result<Option<(Element<'a>, f64)>> {
        let mut best: Option<(Element<'a>, f64)> = None;
        let mut best_score = 0.0;

        for element in doc.select(&self.config.candidate_selector)? {
            let score = self.scorer.score(&element);
            trace!(tag = %element.tag_name(), score, "scored candidate");
            if score > best_score {
                best_score = score;
                best = Some((element, score));
            }
        }

        if let Some((element, score)) = &best {
            debug!(tag = %element.tag_name(), class = element.class_name(), score, "scored candidate selected");
        }
        Ok(best)
    }

    /// Semantic lookup first, scoring only when it finds nothing
    pub fn find_candidate<'a>(&self, doc: &'a Document) -> Result<Option<Candidate<'a>>> {
        if let Some(element) = self.locate_semantic(doc)? {
            return Ok(Some(Candidate { element, source: CandidateSource::Semantic, score: None }));
        }

        Ok(self
            .select_scored(doc)?
            .map(|(element, score)| Candidate { element, source: CandidateSource::Scored, score: Some(score) }))
    }

    /// Extract the main content of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::NoCandidate`] when neither a semantic element
    /// nor a positively scored container exists.
    pub fn extract(&self, doc: &Document) -> Result<Article> {
        self.extract_with_base_url(doc, None)
    }

    /// Like [`Extractor::extract`], resolving relative links against `base_url`
    /// and recording it as the article's source.
    pub fn extract_with_base_url(&self, doc: &Document, base_url: Option<&Url>) -> Result<Article> {
        let candidate = self.find_candidate(doc)?.ok_or(BlazeError::NoCandidate)?;

        let mut tree = DomTree::from_element(&candidate.element);
        let mut stats = self.sanitizer.clean_structure(&mut tree);
        if let Some(base) = base_url {
            let links = resolve_relative_urls(&mut tree, base);
            trace!(rewritten = links.rewritten, dropped = links.dropped, "resolved relative links");
            if links.dropped > 0 {
                stats.empty += self.sanitizer.prune_empty(&mut tree);
            }
        }
        self.sanitizer.normalize_whitespace(&mut tree);
        debug!(?stats, nodes = tree.len(), "candidate cleaned");

        let root = tree.root();
        let title = doc.resolve_title(&self.config.title_sources, &self.config.fallback_title)?;
        let article = Article::new(
            tree.inner_html(root),
            tree.text_content(root),
            title,
            candidate.source,
            candidate.score,
        );

        Ok(match base_url {
            Some(url) => article.with_source_url(url.as_str()),
            None => article,
        })
    }
}

/// Extract with a throwaway extractor built from `config`
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<Article> {
    Extractor::new(config.clone())?.extract(doc)
}
