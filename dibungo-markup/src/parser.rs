//! HTML parsing.
//!
//! Tree construction runs the HTML5 algorithm through `scraper` (html5ever), so
//! omitted end tags, misnested markup and head/body placement come out the way
//! a browser's `DOMParser` builds them. The result is copied into the editable
//! [`Element`] tree. Markup cut off mid-tag or mid-comment is rejected before
//! tree construction, since a browser would silently drop it.

use scraper::{ElementRef, Html};

use crate::document::HtmlDocument;
use crate::error::{MarkupError, MarkupResult};
use crate::node::{Element, Node};

/// Deepest element nesting accepted before parsing is aborted.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Elements whose content is not scanned for tags.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Parse an HTML fragment (body context) into a list of sibling nodes.
pub fn parse_fragment(html: &str) -> MarkupResult<Vec<Node>> {
    check_terminated(html)?;
    let fragment = Html::parse_fragment(html);
    convert_children(fragment.root_element(), 1)
}

/// Parse a full HTML document into doctype + head + body.
pub fn parse_document(html: &str) -> MarkupResult<HtmlDocument> {
    if html.trim().is_empty() {
        return Err(MarkupError::EmptyDocument);
    }
    check_terminated(html)?;
    let parsed = Html::parse_document(html);

    let mut doc = HtmlDocument {
        doctype: parsed.tree.root().children().find_map(|node| match node.value() {
            scraper::Node::Doctype(doctype) => Some(doctype.name().to_string()),
            _ => None,
        }),
        ..HtmlDocument::default()
    };

    for section in parsed.root_element().children().filter_map(ElementRef::wrap) {
        match section.value().name() {
            "head" => doc.head = convert_element(section, 0)?,
            "body" => doc.body = convert_element(section, 0)?,
            _ => {}
        }
    }
    Ok(doc)
}

// ─── Tree conversion ─────────────────────────────────────────────────────────

fn convert_element(source: ElementRef<'_>, depth: usize) -> MarkupResult<Element> {
    if depth > MAX_NESTING_DEPTH {
        return Err(MarkupError::MaxNestingDepthExceeded {
            max_depth: MAX_NESTING_DEPTH,
        });
    }
    let value = source.value();
    let mut el = Element::new(value.name());
    el.attrs = value
        .attrs()
        .map(|(name, val)| (name.to_string(), val.to_string()))
        .collect();
    el.children = convert_children(source, depth + 1)?;
    Ok(el)
}

fn convert_children(parent: ElementRef<'_>, depth: usize) -> MarkupResult<Vec<Node>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => nodes.push(Node::Text(String::from(&**text))),
            scraper::Node::Comment(comment) => nodes.push(Node::Comment(String::from(&**comment))),
            scraper::Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    nodes.push(Node::Element(convert_element(el, depth)?));
                }
            }
            _ => {}
        }
    }
    Ok(nodes)
}

// ─── Truncation check ────────────────────────────────────────────────────────

/// Rejects a tag that never reaches `>` and a comment that never reaches `-->`.
fn check_terminated(input: &str) -> MarkupResult<()> {
    let mut pos = 0;
    while let Some(rel) = input[pos..].find('<') {
        let start = pos + rel;
        let rest = &input[start..];

        if let Some(body) = rest.strip_prefix("<!--") {
            match body.find("-->") {
                Some(end) => {
                    pos = start + 4 + end + 3;
                    continue;
                }
                None => return Err(MarkupError::at(input, start, "unterminated comment")),
            }
        }

        let after = &rest[1..];
        let (closing, name_part) = match after.strip_prefix('/') {
            Some(r) => (true, r),
            None => (false, after),
        };
        let declaration = !closing && after.starts_with('!');
        if !declaration && !name_part.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // A lone '<' is text.
            pos = start + 1;
            continue;
        }

        let name = name_part
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let Some(gt) = rest.find('>') else {
            let message = if declaration {
                "unterminated declaration".to_string()
            } else if closing {
                format!("unterminated close tag </{}", name)
            } else {
                format!("unterminated tag <{}", name)
            };
            return Err(MarkupError::at(input, start, message));
        };
        pos = start + gt + 1;

        if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let needle = format!("</{}", name);
            pos = match input[pos..].to_ascii_lowercase().find(&needle) {
                Some(end) => pos + end,
                None => input.len(),
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_element(nodes: &[Node]) -> &Element {
        nodes
            .iter()
            .find_map(Node::as_element)
            .expect("expected an element")
    }

    fn tags(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(Node::as_element)
            .map(|e| e.tag.as_str())
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        let nodes = parse_fragment("<p>Hello</p>").unwrap();
        let p = first_element(&nodes);
        assert_eq!(p.tag, "p");
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_parse_nested() {
        let nodes = parse_fragment("<ul><li>one</li><li>two</li></ul>").unwrap();
        let ul = first_element(&nodes);
        assert_eq!(ul.child_elements().count(), 2);
    }

    #[test]
    fn test_omitted_li_end_tags_make_siblings() {
        let nodes =
            parse_fragment(r#"<ul><li><a href="a.html">A</a><li><a href="b.html">B</a></ul>"#).unwrap();
        let ul = first_element(&nodes);
        assert_eq!(ul.child_elements().count(), 2);
        assert_eq!(
            ul.to_html(),
            r#"<ul><li><a href="a.html">A</a></li><li><a href="b.html">B</a></li></ul>"#
        );
    }

    #[test]
    fn test_open_paragraph_closed_by_block() {
        let nodes = parse_fragment("<p>one<p>two<div>three</div>").unwrap();
        assert_eq!(tags(&nodes), vec!["p", "p", "div"]);
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let nodes = parse_fragment("<div><br><img src=\"a.png\"><span>x</span></div>").unwrap();
        let div = first_element(&nodes);
        let tags: Vec<&str> = div.child_elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["br", "img", "span"]);
    }

    #[test]
    fn test_uppercase_names_are_lowered() {
        let nodes = parse_fragment("<DIV CLASS=\"Box\">x</DIV>").unwrap();
        let div = first_element(&nodes);
        assert_eq!(div.tag, "div");
        assert_eq!(div.attr("class"), Some("Box"));
    }

    #[test]
    fn test_close_tag_closes_inner_elements() {
        let nodes = parse_fragment("<section><p>one<span>two</section><p>after</p>").unwrap();
        assert_eq!(tags(&nodes), vec!["section", "p"]);
    }

    #[test]
    fn test_stray_close_tag_ignored() {
        let nodes = parse_fragment("<div>a</span>b</div>").unwrap();
        assert_eq!(first_element(&nodes).text_content(), "ab");
    }

    #[test]
    fn test_script_content_is_raw() {
        let nodes = parse_fragment("<script>if (a < b && c) { x(); }</script>").unwrap();
        let script = first_element(&nodes);
        assert_eq!(script.text_content(), "if (a < b && c) { x(); }");
    }

    #[test]
    fn test_title_entities_decoded() {
        let nodes = parse_fragment("<title>Kopi &amp; Roti</title>").unwrap();
        assert_eq!(first_element(&nodes).text_content(), "Kopi & Roti");
    }

    #[test]
    fn test_text_entities_decoded() {
        let nodes = parse_fragment("<p>Rp&#32;10.000 &lt;promo&gt; &#x41;</p>").unwrap();
        assert_eq!(first_element(&nodes).text_content(), "Rp 10.000 <promo> A");
    }

    #[test]
    fn test_unquoted_attribute_keeps_slashes() {
        let nodes = parse_fragment("<a href=/menu/index.html>m</a>").unwrap();
        assert_eq!(first_element(&nodes).attr("href"), Some("/menu/index.html"));
    }

    #[test]
    fn test_attribute_order_is_kept() {
        let nodes = parse_fragment(r#"<a id="z" class="nav" href="menu.html">m</a>"#).unwrap();
        let names: Vec<&str> = first_element(&nodes)
            .attrs
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(names, vec!["id", "class", "href"]);
    }

    #[test]
    fn test_document_doctype() {
        let doc = parse_document("<!DOCTYPE html><html><body><p>x</p></body></html>").unwrap();
        assert_eq!(doc.doctype.as_deref(), Some("html"));
        assert_eq!(tags(&doc.body.children), vec!["p"]);
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        let err = parse_fragment("<div>\n<a href=\"x.html\"").unwrap_err();
        assert_eq!(
            err,
            MarkupError::ParseError {
                line: 2,
                column: 1,
                message: "unterminated tag <a".to_string(),
            }
        );
    }

    #[test]
    fn test_unterminated_close_tag_is_error() {
        let err = parse_document("<main><p>x</p></main").unwrap_err();
        assert!(matches!(err, MarkupError::ParseError { ref message, .. } if message == "unterminated close tag </main"));
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        assert!(matches!(
            parse_fragment("<p>x</p><!-- open"),
            Err(MarkupError::ParseError { .. })
        ));
    }

    #[test]
    fn test_angle_brackets_in_script_are_not_tags() {
        assert!(parse_fragment("<script>if (a <b) { go(); }</script><p>ok</p>").is_ok());
    }

    #[test]
    fn test_lone_less_than_is_text() {
        let nodes = parse_fragment("<p>1 < 2</p>").unwrap();
        assert_eq!(first_element(&nodes).text_content(), "1 < 2");
    }

    #[test]
    fn test_nesting_limit() {
        let html = "<div>".repeat(MAX_NESTING_DEPTH + 1);
        assert_eq!(
            parse_fragment(&html).unwrap_err(),
            MarkupError::MaxNestingDepthExceeded {
                max_depth: MAX_NESTING_DEPTH
            }
        );
        assert!(parse_fragment(&"<div>".repeat(MAX_NESTING_DEPTH)).is_ok());
    }
}
