//! Link rewriting.
//!
//! [`resolve_relative_urls`] works on the owned candidate tree during
//! extraction; [`proxy_links`] is a streaming rewrite of finished HTML.

use tracing::trace;
use url::{Url, form_urlencoded};

use crate::dom_tree::DomTree;
use crate::{BlazeError, Result};

/// Hrefs starting like this are left untouched
fn is_absolute(link: &str) -> bool {
    link.starts_with("http") || link.starts_with("//")
}

/// Outcome of [`resolve_relative_urls`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedLinks {
    /// Links joined against the base and written back
    pub rewritten: usize,
    /// Anchors unwrapped or images removed because their link could not be joined
    pub dropped: usize,
}

/// Rewrite relative `a[href]` and `img[src]` below the root against `base`.
///
/// An anchor whose href cannot be joined is replaced by its children; an
/// image whose src cannot be joined is removed. Dropping an image can leave
/// its parent empty, so callers that need a pruned tree should prune again
/// when [`ResolvedLinks::dropped`] is non-zero.
pub fn resolve_relative_urls(tree: &mut DomTree, base: &Url) -> ResolvedLinks {
    let mut links = ResolvedLinks::default();

    for id in tree.descendant_elements(tree.root()) {
        let attr = match tree.tag_name(id) {
            Some("a") => "href",
            Some("img") => "src",
            _ => continue,
        };
        let Some(link) = tree.attr(id, attr).map(str::to_string) else {
            continue;
        };
        if is_absolute(&link) {
            continue;
        }

        match base.join(&link) {
            Ok(resolved) => {
                tree.set_attr(id, attr, resolved.to_string());
                links.rewritten += 1;
            }
            Err(e) => {
                trace!(%link, error = %e, "dropping unresolvable link");
                let dropped = if attr == "href" { tree.unwrap_element(id) } else { tree.detach(id) };
                if dropped {
                    links.dropped += 1;
                }
            }
        }
    }

    links
}

/// Point every `a[href]` in `html` at `route`, passing the original href
/// form-encoded as the `url` query parameter.
///
/// Anchors carrying `data-preserve-link` and anchors with an empty href are
/// left alone.
pub fn proxy_links(html: &str, route: &str) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("a[href]", |el| {
                if el.has_attribute("data-preserve-link") {
                    return Ok(());
                }
                if let Some(href) = el.get_attribute("href")
                    && !href.is_empty()
                {
                    let query = form_urlencoded::Serializer::new(String::new())
                        .append_pair("url", &href)
                        .finish();
                    el.set_attribute("href", &format!("{}?{}", route, query))?;
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| BlazeError::Rewrite(e.to_string()))?;
    rewriter.end().map_err(|e| BlazeError::Rewrite(e.to_string()))?;

    String::from_utf8(output).map_err(|e| BlazeError::Rewrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn tree_for(html: &str) -> DomTree {
        let doc = Document::parse(html).unwrap();
        let element = doc.select_first("#root").unwrap().unwrap();
        DomTree::from_element(&element)
    }

    #[test]
    fn test_resolve_relative_urls() {
        let mut tree = tree_for(
            r#"<div id="root"><a href="/about">About</a><a href="https://other.org/x">Other</a><img src="img/a.png"><a href="//cdn.example.com/y">CDN</a></div>"#,
        );
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let links = resolve_relative_urls(&mut tree, &base);

        assert_eq!(links, ResolvedLinks { rewritten: 2, dropped: 0 });
        assert_eq!(
            tree.inner_html(tree.root()),
            r#"<a href="https://example.com/about">About</a><a href="https://other.org/x">Other</a><img src="https://example.com/blog/img/a.png"><a href="//cdn.example.com/y">CDN</a>"#
        );
    }

    #[test]
    fn test_unresolvable_links_are_dropped() {
        let mut tree = tree_for(r#"<div id="root"><p>See <a href="x">here</a></p><img src="y"></div>"#);
        let base = Url::parse("mailto:someone@example.com").unwrap();
        let links = resolve_relative_urls(&mut tree, &base);

        assert_eq!(links.dropped, 2);
        assert_eq!(tree.inner_html(tree.root()), "<p>See here</p>");
    }

    #[test]
    fn test_proxy_links() {
        let html = r#"<p><a href="https://example.com/a b?q=1">one</a><a href="/local" data-preserve-link>two</a><a>three</a></p>"#;
        let proxied = proxy_links(html, "/proxy").unwrap();

        assert!(proxied.contains(r#"href="/proxy?url=https%3A%2F%2Fexample.com%2Fa+b%3Fq%3D1""#));
        assert!(proxied.contains(r#"<a href="/local" data-preserve-link>two</a>"#));
        assert!(proxied.contains("<a>three</a>"));
    }
}
