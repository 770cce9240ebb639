use serde::Serialize;

use crate::node::{Element, Node};

/// Classified `<head>` content of a fetched page.
///
/// Title, external stylesheets and scripts are pulled out so the caller decides
/// how to load them; everything else is kept verbatim in `passthrough`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Head {
    /// Page title, trimmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `href` of every `<link rel="stylesheet">`, in order
    pub stylesheets: Vec<String>,
    /// Every `<script>`, in order
    pub scripts: Vec<ScriptRef>,
    /// All other head children (meta, inline style, icons, ...)
    #[serde(skip)]
    pub passthrough: Vec<Node>,
}

/// A `<script>` declared in the head.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptRef {
    External { src: String },
    Inline { length: usize },
}

impl Head {
    pub fn from_element(head: &Element) -> Self {
        let mut summary = Head::default();
        for child in &head.children {
            let Node::Element(el) = child else {
                if !child.is_blank_text() {
                    summary.passthrough.push(child.clone());
                }
                continue;
            };
            match el.tag.as_str() {
                "title" => {
                    if summary.title.is_none() {
                        let text = el.text_content().trim().to_string();
                        if !text.is_empty() {
                            summary.title = Some(text);
                        }
                    }
                }
                "link" if is_stylesheet(el) => {
                    if let Some(href) = el.attr("href") {
                        summary.stylesheets.push(href.to_string());
                    }
                }
                "script" => {
                    let script = match el.attr("src") {
                        Some(src) => ScriptRef::External {
                            src: src.to_string(),
                        },
                        None => ScriptRef::Inline {
                            length: el.text_content().len(),
                        },
                    };
                    summary.scripts.push(script);
                }
                _ => summary.passthrough.push(child.clone()),
            }
        }
        summary
    }
}

/// `rel` is a token list; `rel="preload stylesheet"` still counts.
pub fn is_stylesheet(el: &Element) -> bool {
    el.tag == "link"
        && el
            .attr("rel")
            .map(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_head_classification() {
        let doc = parse_document(
            r#"<head>
                <meta charset="UTF-8">
                <title>Les Privat TK</title>
                <link rel="stylesheet" href="style.css">
                <link rel="icon" href="favicon.ico">
                <script src="script.js"></script>
                <style>body{margin:0}</style>
            </head><body></body>"#,
        )
        .unwrap();
        let head = Head::from_element(&doc.head);
        assert_eq!(head.title.as_deref(), Some("Les Privat TK"));
        assert_eq!(head.stylesheets, vec!["style.css".to_string()]);
        assert_eq!(
            head.scripts,
            vec![ScriptRef::External {
                src: "script.js".to_string()
            }]
        );
        let kept: Vec<&str> = head
            .passthrough
            .iter()
            .filter_map(Node::as_element)
            .map(|e| e.tag.as_str())
            .collect();
        assert_eq!(kept, vec!["meta", "link", "style"]);
    }

    #[test]
    fn test_rel_token_list() {
        let link = Element::new("link")
            .with_attr("rel", "preload Stylesheet")
            .with_attr("href", "a.css");
        assert!(is_stylesheet(&link));
        let icon = Element::new("link").with_attr("rel", "icon");
        assert!(!is_stylesheet(&icon));
    }
}
