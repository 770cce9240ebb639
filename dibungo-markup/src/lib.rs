//! # Dibungo Markup
//!
//! HTML document model for the template preview router.
//!
//! ## Features
//! - HTML5 parsing through `scraper`, converted into an editable element tree
//! - Browser-style normalisation into doctype + head + body
//! - Positioned errors for markup cut off mid-tag or mid-comment
//! - Head classification (title, stylesheets, scripts, passthrough)
//! - Internal link classification, click-interception markers, active-page highlighting
//! - Element builder and HTML serializer
//!
//! ## Example
//! ```ignore
//! use dibungo_markup::{parse_document, rewrite_internal_links};
//!
//! let mut doc = parse_document(r#"
//! <head><title>Menu</title></head>
//! <body><main><a href="profil.html">Profil</a></main></body>
//! "#).expect("Failed to parse page");
//!
//! assert_eq!(doc.title().as_deref(), Some("Menu"));
//! rewrite_internal_links(&mut doc.body, "/templates/");
//! ```

pub mod document;
pub mod error;
pub mod head;
pub mod links;
pub mod node;
pub mod parser;
pub mod serialize;

// --- Core types ---
pub use document::HtmlDocument;
pub use error::{MarkupError, MarkupResult};
pub use head::{Head, ScriptRef};
pub use node::{Element, Node};

// --- Link handling ---
pub use links::{
    classify_href, collect_internal_links, is_external_href, mark_active_links, page_of_href,
    rewrite_internal_links, InternalLink, ORIGINAL_HREF_ATTR, PREVIEW_LINK_ATTR,
};

pub use serialize::nodes_to_html;

/// Parse a full HTML page into head + body.
pub fn parse_document(html: &str) -> MarkupResult<HtmlDocument> {
    parser::parse_document(html)
}

/// Parse an HTML fragment into sibling nodes.
pub fn parse_fragment(html: &str) -> MarkupResult<Vec<Node>> {
    parser::parse_fragment(html)
}
