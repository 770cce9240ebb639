use crate::head::Head;
use crate::node::{Element, Node};
use crate::serialize;

/// A parsed HTML page, normalised the way browsers normalise it: doctype, head, body.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlDocument {
    pub doctype: Option<String>,
    pub head: Element,
    pub body: Element,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self {
            doctype: None,
            head: Element::new("head"),
            body: Element::new("body"),
        }
    }
}

impl HtmlDocument {
    /// Text of the first `<title>` in the head, trimmed. Empty titles count as absent.
    pub fn title(&self) -> Option<String> {
        self.head
            .find_tag("title")
            .map(|t| t.text_content().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn head_summary(&self) -> Head {
        Head::from_element(&self.head)
    }

    /// The designated content landmark: the first `<main>` in the body, or the body itself.
    pub fn main_region(&self) -> &Element {
        self.body.find_tag("main").unwrap_or(&self.body)
    }

    pub fn has_main_landmark(&self) -> bool {
        self.body.find_tag("main").is_some()
    }

    pub fn into_main_children(mut self) -> Vec<Node> {
        if let Some(main) = self.body.find_tag_mut("main") {
            return std::mem::take(&mut main.children);
        }
        self.body.children
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str(&format!("<!DOCTYPE {}>", doctype));
        }
        out.push_str("<html>");
        serialize::write_element(&self.head, &mut out);
        serialize::write_element(&self.body, &mut out);
        out.push_str("</html>");
        out
    }
}
