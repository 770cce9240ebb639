//! Renderer: turns fetched markup into nodes to mount, then mounts them.
//!
//! `scaffold` and `partial` are pure. The `Window` methods at the bottom are
//! the only place the live document changes.

use dibungo_markup::head::is_stylesheet;
use dibungo_markup::{Element, MarkupError, Node, mark_active_links, parse_document, rewrite_internal_links};
use thiserror::Error;

use crate::registry::TemplateDescriptor;
use crate::window::Window;

pub const CONTAINER_ID: &str = "template-container";
const TITLE_SUFFIX: &str = " - Template Preview";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Malformed page: {0}")]
    Markup(#[from] MarkupError),

    #[error("No content region to render into")]
    NoContentRegion,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// First-load render of a template root document.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaffold {
    /// Head elements to copy verbatim (no title, stylesheets or scripts).
    pub head_nodes: Vec<Node>,
    pub title: String,
    /// `div#template-container` holding the page body, links rewritten.
    pub container: Element,
}

/// Content for the main region on later navigations.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialPage {
    pub content: Vec<Node>,
    /// Already formatted with the preview suffix.
    pub title: Option<String>,
}

pub fn preview_title(name: &str) -> String {
    format!("{}{}", name, TITLE_SUFFIX)
}

pub fn scaffold(html: &str, template: &TemplateDescriptor, templates_base_path: &str) -> RenderResult<Scaffold> {
    let doc = parse_document(html)?;

    let head_nodes = doc
        .head
        .children
        .into_iter()
        .filter(|node| match node {
            Node::Element(el) => !(el.tag == "title" || el.tag == "script" || is_stylesheet(el)),
            _ => false,
        })
        .collect();

    let mut container = Element::new("div")
        .with_attr("id", CONTAINER_ID)
        .with_attr("data-template", template.folder.as_str())
        .with_attr("data-template-name", template.display_name.as_str());
    container.children = doc.body.children;
    rewrite_internal_links(&mut container, templates_base_path);

    Ok(Scaffold {
        head_nodes,
        title: preview_title(&template.display_name),
        container,
    })
}

pub fn partial(html: &str, templates_base_path: &str) -> RenderResult<PartialPage> {
    let doc = parse_document(html)?;
    let title = doc.title().map(|t| preview_title(&t));

    let mut holder = Element::new("main");
    holder.children = doc.into_main_children();
    rewrite_internal_links(&mut holder, templates_base_path);

    Ok(PartialPage {
        content: holder.children,
        title,
    })
}

impl Window {
    /// Replaces head and body with the scaffold.
    pub fn mount_scaffold(&mut self, scaffold: Scaffold) {
        self.clear_document();
        self.head.children = scaffold.head_nodes;
        self.set_title(&scaffold.title);
        self.body.children.push(scaffold.container.into());
        self.note_scaffold_mount();
    }

    /// The region partial renders go into: the first `<main>`, else the template container.
    pub fn main_region_mut(&mut self) -> Option<&mut Element> {
        if self.body.find_tag("main").is_some() {
            return self.body.find_tag_mut("main");
        }
        self.body.find_by_id_mut(CONTAINER_ID)
    }

    pub fn replace_main_region(&mut self, content: Vec<Node>) -> RenderResult<()> {
        let region = self.main_region_mut().ok_or(RenderError::NoContentRegion)?;
        region.children = content;
        self.note_region_render();
        Ok(())
    }

    /// Moves the active-link marker to `page`. Returns the number of links marked.
    pub fn highlight_active(&mut self, page: &str) -> usize {
        mark_active_links(&mut self.body, page)
    }

    pub fn append_to_body(&mut self, el: Element) {
        self.body.children.push(el.into());
    }

    pub fn append_to_head(&mut self, el: Element) {
        self.head.children.push(el.into());
    }
}
