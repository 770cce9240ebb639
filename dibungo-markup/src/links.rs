//! Internal page links: classification, click-interception markers and active-page highlighting.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::node::Element;

/// Attribute keeping the author's original `href`.
pub const ORIGINAL_HREF_ATTR: &str = "data-original-href";
/// Attribute marking an anchor whose click the router intercepts; value is the target page.
pub const PREVIEW_LINK_ATTR: &str = "data-preview-link";
pub const ACTIVE_CLASS: &str = "active";

static SCHEME_RE: OnceLock<Regex> = OnceLock::new();

fn scheme_re() -> &'static Regex {
    SCHEME_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap())
}

/// True for hrefs the browser should handle itself: `http:`, `mailto:`, `tel:`,
/// any other scheme, and protocol-relative `//host` URLs.
pub fn is_external_href(href: &str) -> bool {
    let href = href.trim();
    href.starts_with("//") || scheme_re().is_match(href)
}

/// Page name (`profil.html`) of any href ending in `.html`.
pub fn page_of_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if !href.ends_with(".html") {
        return None;
    }
    href.rsplit('/').next().filter(|p| !p.is_empty())
}

/// Returns the target page when `href` is an internal template page the router
/// should load in place: relative, ending in `.html`, outside the template asset path.
pub fn classify_href<'a>(href: &'a str, templates_base_path: &str) -> Option<&'a str> {
    if href.trim().is_empty() || is_external_href(href) {
        return None;
    }
    if !templates_base_path.is_empty() && href.contains(templates_base_path) {
        return None;
    }
    page_of_href(href)
}

/// Marks every internal anchor under `root` for interception. Returns the number marked.
pub fn rewrite_internal_links(root: &mut Element, templates_base_path: &str) -> usize {
    let mut count = 0;
    root.walk_mut(&mut |el| {
        if el.tag != "a" {
            return;
        }
        let Some(href) = el.attr("href").map(str::to_string) else {
            return;
        };
        if let Some(page) = classify_href(&href, templates_base_path) {
            let page = page.to_string();
            el.set_attr(ORIGINAL_HREF_ATTR, href.clone());
            el.set_attr(PREVIEW_LINK_ATTR, page);
            count += 1;
        }
    });
    count
}

/// Highlights anchors pointing at `current_page` and clears the marker elsewhere.
/// Returns the number of anchors now marked active.
pub fn mark_active_links(root: &mut Element, current_page: &str) -> usize {
    let mut active = 0;
    root.walk_mut(&mut |el| {
        if el.tag != "a" {
            return;
        }
        let Some(page) = el.attr("href").and_then(page_of_href).map(str::to_string) else {
            return;
        };
        if page == current_page {
            el.add_class(ACTIVE_CLASS);
            el.set_attr("aria-current", "page");
            active += 1;
        } else {
            el.remove_class(ACTIVE_CLASS);
            el.remove_attr("aria-current");
        }
    });
    active
}

/// An internal link found in a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternalLink {
    pub href: String,
    pub page: String,
    pub text: String,
}

pub fn collect_internal_links(root: &Element, templates_base_path: &str) -> Vec<InternalLink> {
    root.find_all(&|el| el.tag == "a")
        .into_iter()
        .filter_map(|a| {
            let href = a.attr("href")?;
            let page = classify_href(href, templates_base_path)?;
            Some(InternalLink {
                href: href.to_string(),
                page: page.to_string(),
                text: a.text_content().trim().to_string(),
            })
        })
        .collect()
}
