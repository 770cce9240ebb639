//! Headless browser host: location, session history, the live document,
//! scroll position and the loading overlay.
//!
//! This is the only mutable surface the router touches. Traversals return
//! the events a browser would fire so the caller can dispatch them.

use dibungo_markup::{Element, Node};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Loader fade-out before the overlay is removed.
pub const LOADER_FADE: Duration = Duration::from_millis(300);

pub const LOADER_ID: &str = "template-loader";

/// State object stored with a pushed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub page: String,
}

/// Events fired by the window itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    PopState(Option<HistoryState>),
    HashChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(href)?,
        })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// `hostname[:port]`, as sent in the `Host` header.
    pub fn host(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{}", self.hostname(), port),
            None => self.hostname().to_string(),
        }
    }

    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// Fragment without `#`; empty when absent.
    pub fn fragment(&self) -> &str {
        self.url.fragment().unwrap_or("")
    }

    /// `#fragment`, or empty, like `location.hash`.
    pub fn hash(&self) -> String {
        match self.url.fragment() {
            Some(f) if !f.is_empty() => format!("#{}", f),
            _ => String::new(),
        }
    }

    /// Resolves `relative` against this location.
    fn join(&self, relative: &str) -> Result<Url, url::ParseError> {
        self.url.join(relative)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HistoryEntry {
    url: Url,
    state: Option<HistoryState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub scaffold_mounts: usize,
    pub region_renders: usize,
    pub scroll_resets: usize,
    pub history_pushes: usize,
}

#[derive(Debug)]
struct Overlay {
    element: Element,
    remove_at: Option<Instant>,
}

#[derive(Debug)]
pub struct Window {
    location: Location,
    history: Vec<HistoryEntry>,
    history_index: usize,
    pub head: Element,
    pub body: Element,
    pub scroll_y: u32,
    loader: Option<Overlay>,
    stats: WindowStats,
}

impl Window {
    /// A window showing `href` with an empty document.
    pub fn open(href: &str) -> Result<Self, url::ParseError> {
        let location = Location::parse(href)?;
        let entry = HistoryEntry {
            url: location.url.clone(),
            state: None,
        };
        Ok(Self {
            location,
            history: vec![entry],
            history_index: 0,
            head: Element::new("head"),
            body: Element::new("body"),
            scroll_y: 0,
            loader: None,
            stats: WindowStats::default(),
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    // --- history ---

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn history_state(&self) -> Option<&HistoryState> {
        self.history
            .get(self.history_index)
            .and_then(|e| e.state.as_ref())
    }

    /// `history.pushState(state, '', url)`: drops forward entries, fires nothing.
    pub fn push_state(&mut self, state: Option<HistoryState>, url: &str) -> Result<(), url::ParseError> {
        let url = self.location.join(url)?;
        self.history.truncate(self.history_index + 1);
        self.history.push(HistoryEntry {
            url: url.clone(),
            state,
        });
        self.history_index = self.history.len() - 1;
        self.location.url = url;
        self.stats.history_pushes += 1;
        Ok(())
    }

    pub fn back(&mut self) -> Vec<BrowserEvent> {
        if self.history_index == 0 {
            return Vec::new();
        }
        self.traverse_to(self.history_index - 1)
    }

    pub fn forward(&mut self) -> Vec<BrowserEvent> {
        if self.history_index + 1 >= self.history.len() {
            return Vec::new();
        }
        self.traverse_to(self.history_index + 1)
    }

    fn traverse_to(&mut self, index: usize) -> Vec<BrowserEvent> {
        let old_fragment = self.location.fragment().to_string();
        self.history_index = index;
        let entry = &self.history[index];
        self.location.url = entry.url.clone();

        let mut events = vec![BrowserEvent::PopState(entry.state.clone())];
        if self.location.fragment() != old_fragment {
            events.push(BrowserEvent::HashChange);
        }
        events
    }

    /// The user edits the fragment. Adds a history entry without state.
    pub fn set_hash(&mut self, hash: &str) -> Vec<BrowserEvent> {
        let fragment = hash.trim_start_matches('#');
        if fragment == self.location.fragment() {
            return Vec::new();
        }
        let mut url = self.location.url.clone();
        url.set_fragment(Some(fragment));
        self.history.truncate(self.history_index + 1);
        self.history.push(HistoryEntry {
            url: url.clone(),
            state: None,
        });
        self.history_index = self.history.len() - 1;
        self.location.url = url;
        vec![BrowserEvent::HashChange]
    }

    // --- document ---

    pub fn title(&self) -> String {
        self.head
            .find_tag("title")
            .map(|t| t.text_content())
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        match self.head.find_tag_mut("title") {
            Some(el) => el.children = vec![Node::text(title)],
            None => self.head.children.push(Element::new("title").with_text(title).into()),
        }
    }

    /// Empties head and body. The loading overlay survives.
    pub fn clear_document(&mut self) {
        self.head = Element::new("head");
        self.body = Element::new("body");
    }

    /// Replaces the whole body with `screen`.
    pub fn show_screen(&mut self, screen: Element) {
        self.body.children = vec![screen.into()];
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if let Some(overlay) = &self.loader {
            if overlay.element.id() == Some(id) {
                return Some(&overlay.element);
            }
        }
        self.head.find_by_id(id).or_else(|| self.body.find_by_id(id))
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_y = 0;
        self.stats.scroll_resets += 1;
    }

    pub(crate) fn note_scaffold_mount(&mut self) {
        self.stats.scaffold_mounts += 1;
    }

    pub(crate) fn note_region_render(&mut self) {
        self.stats.region_renders += 1;
    }

    /// Serialized document, overlay included.
    pub fn document_html(&self) -> String {
        let mut body = self.body.clone();
        if let Some(overlay) = &self.loader {
            body.children.push(overlay.element.clone().into());
        }
        let mut out = String::from("<!DOCTYPE html><html>");
        out.push_str(&self.head.to_html());
        out.push_str(&body.to_html());
        out.push_str("</html>");
        out
    }

    // --- loading overlay ---

    /// Shows `loader` unless one is already visible. A fading loader is replaced.
    /// Returns whether a new loader was mounted.
    pub fn show_loader(&mut self, loader: Element) -> bool {
        self.run_timers();
        if self.loader_visible() {
            return false;
        }
        self.loader = Some(Overlay {
            element: loader,
            remove_at: None,
        });
        true
    }

    /// Starts the fade-out; the overlay is removed once the fade elapses.
    pub fn hide_loader(&mut self) {
        if let Some(overlay) = &mut self.loader {
            if overlay.remove_at.is_none() {
                overlay
                    .element
                    .set_attr("style", "opacity: 0; transition: opacity 0.3s");
                overlay.remove_at = Some(Instant::now() + LOADER_FADE);
            }
        }
    }

    pub fn loader_visible(&self) -> bool {
        self.loader.as_ref().is_some_and(|o| o.remove_at.is_none())
    }

    /// True while a loader is mounted, fading or not.
    pub fn loader_mounted(&self) -> bool {
        self.loader.is_some()
    }

    pub fn loader_text(&self) -> Option<String> {
        self.loader
            .as_ref()
            .and_then(|o| o.element.find(&|e| e.has_class("loading-text")))
            .map(|e| e.text_content())
    }

    /// Fires due timers (currently only the loader removal).
    pub fn run_timers(&mut self) {
        let due = self
            .loader
            .as_ref()
            .and_then(|o| o.remove_at)
            .is_some_and(|at| Instant::now() >= at);
        if due {
            self.loader = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Window {
        Window::open("http://template1.dibungo.netlify.app/").unwrap()
    }

    #[test]
    fn test_location_parts() {
        let w = Window::open("https://template2.dibungo.netlify.app/menu.html#promo").unwrap();
        assert_eq!(w.location().hostname(), "template2.dibungo.netlify.app");
        assert_eq!(w.location().pathname(), "/menu.html");
        assert_eq!(w.location().fragment(), "promo");
        assert_eq!(w.location().hash(), "#promo");
    }

    #[test]
    fn test_push_state_and_traverse() {
        let mut w = window();
        w.push_state(Some(HistoryState { page: "profil.html".into() }), "#profil").unwrap();
        w.push_state(Some(HistoryState { page: "kontak.html".into() }), "#kontak").unwrap();
        assert_eq!(w.history_len(), 3);
        assert_eq!(w.location().hash(), "#kontak");

        let events = w.back();
        assert_eq!(
            events,
            vec![
                BrowserEvent::PopState(Some(HistoryState { page: "profil.html".into() })),
                BrowserEvent::HashChange,
            ]
        );
        assert_eq!(w.location().hash(), "#profil");

        let events = w.back();
        assert_eq!(events, vec![BrowserEvent::PopState(None), BrowserEvent::HashChange]);
        assert_eq!(w.location().hash(), "");
        assert!(w.back().is_empty());

        assert_eq!(w.forward().len(), 2);
        assert_eq!(w.history_state().map(|s| s.page.as_str()), Some("profil.html"));
    }

    #[test]
    fn test_push_empty_url_clears_fragment() {
        let mut w = Window::open("http://template1.localhost/#profil").unwrap();
        w.push_state(Some(HistoryState { page: "index.html".into() }), "").unwrap();
        assert_eq!(w.location().hash(), "");
        assert_eq!(w.location().href(), "http://template1.localhost/");
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut w = window();
        w.push_state(None, "#a").unwrap();
        w.push_state(None, "#b").unwrap();
        w.back();
        w.push_state(None, "#c").unwrap();
        assert_eq!(w.history_len(), 3);
        assert!(w.forward().is_empty());
    }

    #[test]
    fn test_set_hash() {
        let mut w = window();
        assert_eq!(w.set_hash("#menu"), vec![BrowserEvent::HashChange]);
        assert_eq!(w.location().hash(), "#menu");
        assert!(w.set_hash("menu").is_empty());
        assert_eq!(w.history_len(), 2);
    }

    #[test]
    fn test_title() {
        let mut w = window();
        assert_eq!(w.title(), "");
        w.set_title("A");
        w.set_title("B");
        assert_eq!(w.title(), "B");
        assert_eq!(w.head.children.len(), 1);
    }

    fn loader(text: &str) -> Element {
        Element::new("div")
            .with_attr("id", LOADER_ID)
            .with_child(Element::new("div").with_attr("class", "loading-text").with_text(text))
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_show_is_idempotent_and_fades() {
        let mut w = window();
        assert!(w.show_loader(loader("one")));
        assert!(!w.show_loader(loader("two")));
        assert_eq!(w.loader_text().as_deref(), Some("one"));

        w.hide_loader();
        assert!(!w.loader_visible());
        assert!(w.loader_mounted());

        tokio::time::advance(Duration::from_millis(299)).await;
        w.run_timers();
        assert!(w.loader_mounted());

        tokio::time::advance(Duration::from_millis(1)).await;
        w.run_timers();
        assert!(!w.loader_mounted());
        assert!(w.find_by_id(LOADER_ID).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_while_fading_replaces() {
        let mut w = window();
        w.show_loader(loader("one"));
        w.hide_loader();
        assert!(w.show_loader(loader("two")));
        assert_eq!(w.loader_text().as_deref(), Some("two"));
        assert!(w.loader_visible());
    }

    #[test]
    fn test_loader_survives_clear_document() {
        let mut w = window();
        w.body.children.push(Element::new("p").into());
        w.show_loader(loader("x"));
        w.clear_document();
        assert!(w.body.children.is_empty());
        assert!(w.find_by_id(LOADER_ID).is_some());
        assert!(w.document_html().contains("template-loader"));
    }
}
