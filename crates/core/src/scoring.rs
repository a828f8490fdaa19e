use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::Element;
use crate::{BlazeError, Result};

/// Configuration for the container scoring heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Elements with less text than this (in characters) score exactly 0
    pub min_text_len: usize,
    /// Characters per point of base score
    pub chars_per_point: f64,
    /// Regex matched against the lower-cased class attribute for the content bonus
    pub positive_pattern: String,
    /// Regex matched against the lower-cased class attribute for the noise penalty
    pub negative_pattern: String,
    /// Added when the positive pattern matches
    pub positive_weight: f64,
    /// Added when the negative pattern matches
    pub negative_weight: f64,
    /// Link density above which the link penalty applies
    pub max_link_density: f64,
    /// Added when link density exceeds `max_link_density`
    pub link_density_penalty: f64,
    /// Paragraph count that must be exceeded for the paragraph bonus
    pub min_paragraphs: usize,
    /// Added when the element holds more than `min_paragraphs` paragraphs
    pub paragraph_bonus: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_text_len: 100,
            chars_per_point: 100.0,
            positive_pattern: "content|article|post|main|story|entry".to_string(),
            negative_pattern: "sidebar|nav|ad|comment|footer|header|menu".to_string(),
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_link_density: 0.3,
            link_density_penalty: -25.0,
            min_paragraphs: 3,
            paragraph_bonus: 10.0,
        }
    }
}

/// Result of scoring an element
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// The element's tag name
    pub tag_name: String,
    /// Flattened text length in characters
    pub text_len: usize,
    /// Text length divided by `chars_per_point`
    pub base_score: f64,
    /// Sum of the class bonus and class penalty
    pub class_weight: f64,
    /// Link density (0.0 to 1.0)
    pub link_density: f64,
    /// Number of `<p>` descendants
    pub paragraph_count: usize,
    /// Final calculated score
    pub final_score: f64,
}

impl ScoreResult {
    fn below_floor(tag_name: String, text_len: usize) -> Self {
        Self {
            tag_name,
            text_len,
            base_score: 0.0,
            class_weight: 0.0,
            link_density: 0.0,
            paragraph_count: 0,
            final_score: 0.0,
        }
    }
}

/// Something that can rank candidate containers.
///
/// The extractor only compares the returned numbers; a score of 0 or less
/// never wins.
pub trait CandidateScorer {
    /// Score a single `div`/`section` candidate
    fn score(&self, element: &Element<'_>) -> f64;
}

/// The default content-density scorer
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    config: ScoreConfig,
    positive: Regex,
    negative: Regex,
}

impl HeuristicScorer {
    /// Compile the class patterns of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BlazeError::InvalidPattern`] if either class pattern is not a valid regex.
    pub fn new(config: ScoreConfig) -> Result<Self> {
        let positive = compile(&config.positive_pattern)?;
        let negative = compile(&config.negative_pattern)?;
        Ok(Self { config, positive, negative })
    }

    /// The configuration this scorer was built from
    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Class bonus and penalty for a lower-cased class attribute.
    ///
    /// Both adjustments apply independently, so a class such as
    /// `main-nav` nets to zero.
    pub fn class_weight(&self, class_name: &str) -> f64 {
        let class_name = class_name.to_lowercase();
        let mut weight = 0.0;
        if self.positive.is_match(&class_name) {
            weight += self.config.positive_weight;
        }
        if self.negative.is_match(&class_name) {
            weight += self.config.negative_weight;
        }
        weight
    }

    /// Calculate the full score breakdown for an element
    ///
    /// The final score combines:
    /// - Base score from text length
    /// - Class bonus/penalty
    /// - Link density penalty
    /// - Paragraph bonus
    pub fn calculate_score(&self, element: &Element<'_>) -> ScoreResult {
        let tag_name = element.tag_name();
        let text_len = element.text_len();

        if text_len < self.config.min_text_len {
            return ScoreResult::below_floor(tag_name, text_len);
        }

        let base_score = text_len as f64 / self.config.chars_per_point;
        let class_weight = self.class_weight(element.class_name());
        let ld = link_density(element);
        let link_penalty = if ld > self.config.max_link_density { self.config.link_density_penalty } else { 0.0 };
        let paragraph_count = element.count("p").unwrap_or_default();
        let paragraph_bonus =
            if paragraph_count > self.config.min_paragraphs { self.config.paragraph_bonus } else { 0.0 };

        let final_score = base_score + class_weight + link_penalty + paragraph_bonus;

        ScoreResult { tag_name, text_len, base_score, class_weight, link_density: ld, paragraph_count, final_score }
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        let config = ScoreConfig::default();
        Self {
            positive: Regex::new(&config.positive_pattern).expect("default positive pattern is valid"),
            negative: Regex::new(&config.negative_pattern).expect("default negative pattern is valid"),
            config,
        }
    }
}

impl CandidateScorer for HeuristicScorer {
    fn score(&self, element: &Element<'_>) -> f64 {
        self.calculate_score(element).final_score
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| BlazeError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() })
}

/// Calculate the link density of an element
///
/// Link density is the ratio of link text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text_len();

    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(Element::text_len)
        .sum::<usize>();

    link_text_length as f64 / text_length as f64
}
