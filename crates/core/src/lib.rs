pub mod article;
pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod links;
pub mod metadata;
pub mod parse;
pub mod postprocess;
pub mod reader;
pub mod scoring;

pub use article::{Article, CandidateSource, OutputFormat};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeData, NodeId, SubtreeStats};
pub use error::{BlazeError, Result};
pub use extract::{Candidate, ExtractConfig, Extractor, extract_content};
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{fetch_file, fetch_stdin};
pub use links::{ResolvedLinks, proxy_links, resolve_relative_urls};
pub use metadata::{FALLBACK_TITLE, TitleSource, default_title_sources};
pub use parse::{Document, Element};
pub use postprocess::{CleanupStats, ElementRule, SanitizeConfig, Sanitizer};
#[cfg(feature = "fetch")]
pub use reader::fetch_and_parse;
pub use reader::{Reader, ReaderConfig, ReaderConfigBuilder, is_probably_readable, parse, parse_with_url};
pub use scoring::{CandidateScorer, HeuristicScorer, ScoreConfig, ScoreResult, link_density};
