//! Cleanup passes over the owned candidate tree.
//!
//! Passes run in a fixed order, each on the state left by the previous one:
//! sanitize (rule removal, noise classes, link-dense containers), reduce
//! attributes, prune empty elements to a fixed point, normalize whitespace.
//! Nothing here touches the parsed document.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::Result;
use crate::dom_tree::{DomTree, NodeId, SubtreeStats};
use crate::scoring::compile;

/// One entry of the removal rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ElementRule {
    /// Element with this tag name
    Tag(String),
    /// Element carrying this exact class token
    Class(String),
    /// Element whose raw class attribute contains this substring
    ClassContains(String),
    /// Element whose id attribute contains this substring
    IdContains(String),
}

impl ElementRule {
    /// Whether the element `id` of `tree` is matched by this rule
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            ElementRule::Tag(tag) => tree.tag_name(id) == Some(tag.as_str()),
            ElementRule::Class(class) => tree.class_name(id).split_whitespace().any(|c| c == class),
            ElementRule::ClassContains(part) => tree.class_name(id).contains(part.as_str()),
            ElementRule::IdContains(part) => tree.attr(id, "id").is_some_and(|v| v.contains(part.as_str())),
        }
    }
}

/// Rule tables and thresholds for the cleanup passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Elements removed unconditionally
    pub removal_rules: Vec<ElementRule>,
    /// Substrings of a lower-cased class that mark an element as possible noise
    pub noise_classes: Vec<String>,
    /// Noise-classed elements with less text than this are removed
    pub noise_max_text_len: usize,
    /// Regexes tested against the trimmed text of noise-classed elements
    pub noise_phrases: Vec<String>,
    /// Container tags subject to the link density check
    pub link_dense_tags: Vec<String>,
    /// Containers above this link density are removed
    pub max_link_density: f64,
    /// Containers with less text than this are never removed for link density
    pub link_density_min_text_len: usize,
    /// Attributes kept by the attribute reducer
    pub allowed_attributes: Vec<String>,
    /// Tags the empty-element pruner never removes
    pub keep_empty_tags: Vec<String>,
    /// Descendant tags that keep an otherwise empty element alive
    pub media_tags: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        let tags = ["script", "style", "nav", "header", "footer", "aside"];
        let classes = [
            "advertisement",
            "ads",
            "social-share",
            "comments",
            "sidebar",
            "related-posts",
            "newsletter-signup",
            "cookie-banner",
            "popup",
            "modal",
            "overlay",
        ];

        let mut removal_rules: Vec<ElementRule> = tags.iter().map(|t| ElementRule::Tag(t.to_string())).collect();
        removal_rules.extend(classes.iter().map(|c| ElementRule::Class(c.to_string())));
        removal_rules.push(ElementRule::ClassContains("ad-".to_string()));
        removal_rules.push(ElementRule::IdContains("ad-".to_string()));
        removal_rules.push(ElementRule::ClassContains("social".to_string()));

        Self {
            removal_rules,
            noise_classes: to_strings(&[
                "share",
                "social",
                "comment",
                "sidebar",
                "ad",
                "advertisement",
                "promotion",
                "newsletter",
                "subscribe",
                "related",
                "suggested",
                "recommended",
                "trending",
                "popular",
                "more-stories",
            ]),
            noise_max_text_len: 100,
            noise_phrases: to_strings(&[
                r"(?i)^(share|tweet|like|follow|subscribe)",
                r"(?i)^(advertisement|sponsored|promoted)",
                r"(?i)^(read more|continue reading|view all)",
                r"(?i)^(tags?:|categories?:|filed under)",
            ]),
            link_dense_tags: to_strings(&["div", "section", "aside"]),
            max_link_density: 0.5,
            link_density_min_text_len: 50,
            allowed_attributes: to_strings(&["href", "src", "alt", "title"]),
            keep_empty_tags: to_strings(&["img", "br", "hr", "input", "area", "base", "meta"]),
            media_tags: to_strings(&["img"]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Removal counts of one [`Sanitizer::clean`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub unwanted: usize,
    pub noise: usize,
    pub link_dense: usize,
    pub attributes: usize,
    pub empty: usize,
}

/// Compiled cleanup passes
#[derive(Debug, Clone)]
pub struct Sanitizer {
    config: SanitizeConfig,
    noise_phrases: Vec<Regex>,
    whitespace: Regex,
}

impl Sanitizer {
    /// Compile the noise phrases of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlazeError::InvalidPattern`] for a phrase that is not a valid regex.
    pub fn new(config: SanitizeConfig) -> Result<Self> {
        let noise_phrases = config.noise_phrases.iter().map(|p| compile(p)).collect::<Result<Vec<_>>>()?;
        let whitespace = compile(r"\s+")?;
        Ok(Self { config, noise_phrases, whitespace })
    }

    /// The configuration this processor was built from
    pub fn config(&self) -> &SanitizeConfig {
        &self.config
    }

    /// Run every pass in order
    pub fn clean(&self, tree: &mut DomTree) -> CleanupStats {
        let stats = self.clean_structure(tree);
        self.normalize_whitespace(tree);
        stats
    }

    /// Every pass except whitespace normalization
    pub fn clean_structure(&self, tree: &mut DomTree) -> CleanupStats {
        let unwanted = self.remove_unwanted(tree);
        let noise = self.remove_noise(tree);
        let link_dense = self.remove_link_dense(tree);
        let attributes = self.reduce_attributes(tree);
        let empty = self.prune_empty(tree);

        let stats = CleanupStats { unwanted, noise, link_dense, attributes, empty };
        trace!(?stats, remaining = tree.len(), "structural cleanup done");
        stats
    }

    /// The three removal passes of the sanitizer, in order
    pub fn sanitize(&self, tree: &mut DomTree) -> usize {
        self.remove_unwanted(tree) + self.remove_noise(tree) + self.remove_link_dense(tree)
    }

    /// Remove every element matched by a removal rule
    pub fn remove_unwanted(&self, tree: &mut DomTree) -> usize {
        self.remove_where(tree, |tree, _, id| self.config.removal_rules.iter().any(|rule| rule.matches(tree, id)))
    }

    /// Remove noise-classed elements that are short or open with a noise phrase
    pub fn remove_noise(&self, tree: &mut DomTree) -> usize {
        self.remove_where(tree, |tree, stats, id| {
            let class_name = tree.class_name(id).to_lowercase();
            if !self.config.noise_classes.iter().any(|noise| class_name.contains(noise.as_str())) {
                return false;
            }

            stats.text_len(id) < self.config.noise_max_text_len || self.is_noise_phrase(tree.text_content(id).trim())
        })
    }

    /// Whether `text` opens with one of the configured noise phrases
    pub fn is_noise_phrase(&self, text: &str) -> bool {
        self.noise_phrases.iter().any(|re| re.is_match(text))
    }

    /// Remove containers whose link density exceeds the configured maximum
    pub fn remove_link_dense(&self, tree: &mut DomTree) -> usize {
        self.remove_where(tree, |tree, stats, id| {
            let is_container = tree
                .tag_name(id)
                .is_some_and(|tag| self.config.link_dense_tags.iter().any(|t| t == tag));
            if !is_container || stats.text_len(id) < self.config.link_density_min_text_len {
                return false;
            }
            stats.link_density(id) > self.config.max_link_density
        })
    }

    /// Strip every attribute outside the allow-list from the root and all descendants
    pub fn reduce_attributes(&self, tree: &mut DomTree) -> usize {
        let root = tree.root();
        let mut ids = vec![root];
        ids.extend(tree.descendant_elements(root));

        ids.into_iter()
            .map(|id| tree.retain_attrs(id, |name| self.config.allowed_attributes.iter().any(|a| a == name)))
            .sum()
    }

    /// Remove elements without visible text or media until nothing changes
    pub fn prune_empty(&self, tree: &mut DomTree) -> usize {
        let mut total = 0;
        let mut pass = 0;

        loop {
            pass += 1;
            let removed = self.remove_where(tree, |tree, stats, id| {
                let keep = tree
                    .tag_name(id)
                    .is_some_and(|tag| self.config.keep_empty_tags.iter().any(|t| t == tag));
                if keep {
                    return false;
                }
                !stats.has_visible_text(id) && !stats.contains_marked(id)
            });

            trace!(pass, removed, "empty element pass");
            total += removed;
            if removed == 0 {
                return total;
            }
        }
    }

    /// Collapse every whitespace run inside text nodes to a single space
    pub fn normalize_whitespace(&self, tree: &mut DomTree) {
        for id in tree.descendants(tree.root()) {
            if let Some(text) = tree.text_mut(id)
                && self.whitespace.is_match(text)
            {
                *text = self.whitespace.replace_all(text, " ").into_owned();
            }
        }
    }

    /// Detach, in document order, every still-attached descendant element
    /// for which `predicate` holds. The root is never considered.
    ///
    /// Measurements are taken once, before the sweep. Ancestors come before
    /// descendants in document order, so a removal never changes the
    /// measurements of an element still to be visited.
    fn remove_where(
        &self,
        tree: &mut DomTree,
        predicate: impl Fn(&DomTree, &SubtreeStats, NodeId) -> bool,
    ) -> usize {
        let stats = tree.subtree_stats(&self.config.media_tags);
        let mut gone = vec![false; tree.slots()];
        let mut removed = 0;

        for id in tree.descendant_elements(tree.root()) {
            let parent = tree.get_node(id).and_then(|n| n.parent_id);
            if parent.is_some_and(|p| gone[p]) {
                gone[id] = true;
                continue;
            }
            if predicate(tree, &stats, id) && tree.detach(id) {
                gone[id] = true;
                removed += 1;
            }
        }

        removed
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizeConfig::default()).expect("default cleanup patterns are valid")
    }
}
