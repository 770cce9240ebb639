use crate::node::{Element, Node};

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

impl Element {
    /// Outer HTML of this element.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let raw = is_raw_text(&self.tag);
        let mut out = String::new();
        for child in &self.children {
            write_node(child, raw, &mut out);
        }
        out
    }
}

pub(crate) fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
    out.push('>');
    if el.is_void() {
        return;
    }
    let raw = is_raw_text(&el.tag);
    for child in &el.children {
        write_node(child, raw, out);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_node(node: &Node, raw: bool, out: &mut String) {
    match node {
        Node::Element(el) => write_element(el, out),
        Node::Text(t) if raw => out.push_str(t),
        Node::Text(t) => out.push_str(&escape_text(t)),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
    }
}

fn is_raw_text(tag: &str) -> bool {
    tag == "script" || tag == "style"
}
