//! Owned HTML node tree.

/// Elements that never have children or a close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// True for text nodes that contain only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes in source order; names are lower-case
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    // ─── Builder ─────────────────────────────────────────────────────────

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Sets an attribute, replacing the value in place when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let next = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", next);
    }

    /// Removes a class token; drops the attribute entirely once no tokens remain.
    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let remaining: Vec<String> = existing
            .split_whitespace()
            .filter(|t| *t != class)
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr("class", joined);
        }
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }

    // ─── Traversal ───────────────────────────────────────────────────────

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first search over descendants (not including `self`).
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            let Node::Element(el) = child else { continue };
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = el.find_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        self.find(&|el| el.tag == tag)
    }

    pub fn find_tag_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.find_mut(&|el| el.tag == tag)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.find_mut(&|el| el.id() == Some(id))
    }

    /// All descendants matching `pred`, in document order.
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_matching(pred, &mut out);
        out
    }

    fn collect_matching<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if pred(child) {
                out.push(child);
            }
            child.collect_matching(pred, out);
        }
    }

    /// Visits every descendant element mutably, in document order.
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                f(el);
                el.walk_mut(f);
            }
        }
    }

    /// Removes every descendant element with the given id. Returns how many were removed.
    pub fn remove_by_id(&mut self, id: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(el) if el.id() == Some(id)));
        let mut removed = before - self.children.len();
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                removed += el.remove_by_id(id);
            }
        }
        removed
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}
