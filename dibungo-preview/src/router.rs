//! Router / navigation state machine.
//!
//! Every trigger (link click, hash change, popstate, API call) is reduced to a
//! target page and handed to [`PreviewRouter::navigate`]. Events are handled
//! one at a time: a navigation finishes before the next event is read, so a
//! slow response can never overwrite a newer page.

use dibungo_markup::{Element, classify_href};
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::assets;
use crate::config::{DEFAULT_PAGE, PreviewConfig};
use crate::error::PreviewResult;
use crate::feedback::{self, ACTION_ATTR, ACTION_NAVIGATE, ACTION_RETRY};
use crate::fetch::{PageSource, template_path};
use crate::registry::{HostMode, TemplateDescriptor, TemplateRegistry, classify_host};
use crate::render;
use crate::session::{NavigationSource, RouterPhase, SessionSnapshot, SessionState};
use crate::window::{BrowserEvent, HistoryState, Location, Window};

/// Messages driving the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent {
    LinkClicked { href: String },
    HashChanged,
    PopState { state: Option<HistoryState> },
    NavigateTo { page: String },
    Reload,
    ClearCache,
    Retry,
}

impl From<BrowserEvent> for RouterEvent {
    fn from(event: BrowserEvent) -> Self {
        match event {
            BrowserEvent::PopState(state) => RouterEvent::PopState { state },
            BrowserEvent::HashChange => RouterEvent::HashChanged,
        }
    }
}

/// Whether the router took an event over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Handled; for clicks the browser default is prevented.
    Intercepted,
    /// Not ours; the browser follows the link.
    PassThrough,
    Ignored,
}

/// Result of one call to the navigation routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Target is already the current page.
    Unchanged,
    Rendered { from_cache: bool },
    NotFound,
    Failed,
    /// No active template.
    Inactive,
}

/// Maps a clicked element to the event it triggers: `data-action` buttons
/// from the feedback screens, or anchors.
pub fn event_for_element(el: &Element) -> Option<RouterEvent> {
    match el.attr(ACTION_ATTR) {
        Some(ACTION_RETRY) => return Some(RouterEvent::Retry),
        Some(ACTION_NAVIGATE) => {
            return el.attr("data-page").map(|page| RouterEvent::NavigateTo {
                page: page.to_string(),
            });
        }
        _ => {}
    }
    if el.tag == "a" {
        return el.attr("href").map(|href| RouterEvent::LinkClicked {
            href: href.to_string(),
        });
    }
    None
}

/// `""` → default page, `index` → `index.html`, `menu` → `menu.html`.
pub fn page_from_fragment(fragment: &str, default_page: &str) -> String {
    match fragment {
        "" => default_page.to_string(),
        "index" => DEFAULT_PAGE.to_string(),
        f if f.ends_with(".html") => f.to_string(),
        f => format!("{}.html", f),
    }
}

/// Initial route: the fragment wins over the path; the path only counts when it names an `.html` file.
pub fn initial_page(location: &Location, default_page: &str) -> String {
    let fragment = location.fragment();
    if !fragment.is_empty() {
        return page_from_fragment(fragment, default_page);
    }
    let path = location.pathname();
    if path != "/" && path.ends_with(".html") {
        if let Some(name) = path.rsplit('/').next().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
    }
    default_page.to_string()
}

/// `index.html` → `""`, `profil.html` → `#profil`.
pub fn hash_for_page(page: &str) -> String {
    match feedback::page_stem(page) {
        "index" => String::new(),
        id => format!("#{}", id),
    }
}

pub struct PreviewRouter<S: PageSource> {
    config: PreviewConfig,
    registry: TemplateRegistry,
    source: S,
    window: Window,
    session: SessionState,
    /// Page whose not-found panel currently fills the content region.
    not_found: Option<String>,
    initialized: bool,
}

impl<S: PageSource> PreviewRouter<S> {
    pub fn new(config: PreviewConfig, source: S, window: Window) -> Self {
        let registry = TemplateRegistry::from_config(&config);
        let session = SessionState::new(config.cache_duration());
        Self {
            config,
            registry,
            source,
            window,
            session,
            not_found: None,
            initialized: false,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> &RouterPhase {
        &self.session.phase
    }

    fn is_active(&self) -> bool {
        matches!(self.session.phase, RouterPhase::TemplateActive { .. })
    }

    // ─── Startup ─────────────────────────────────────────────────────────

    /// Reads the host, resolves the template and loads the initial page.
    pub async fn init(&mut self) -> RouterPhase {
        self.initialized = true;
        let location = self.window.location().clone();
        debug!(
            "Initializing: host={} path={} hash={}",
            location.hostname(),
            location.pathname(),
            location.hash()
        );

        match classify_host(location.hostname(), &self.config.main_domain, &self.config.dev_hosts) {
            HostMode::MainSite => {
                info!("Main domain detected, template preview disabled");
            }
            HostMode::Foreign => {
                debug!("Host {} is not a preview host", location.hostname());
            }
            HostMode::Subdomain(label) => {
                debug!("Template subdomain detected: {}", label);
                match self.registry.resolve(&label) {
                    Some(template) => {
                        let initial = initial_page(&location, &template.default_page);
                        debug!("Initial page to load: {}", initial);
                        self.session.active_template = Some(template);
                        self.session.phase = RouterPhase::Resolving;
                        self.load_template_with_routing(&initial).await;
                    }
                    None => self.show_invalid_template(&label),
                }
            }
        }
        self.session.phase.clone()
    }

    async fn load_template_with_routing(&mut self, initial_page: &str) {
        let Some(template) = self.session.active_template.clone() else {
            return;
        };
        self.window
            .show_loader(feedback::loader(&feedback::loading_template_message(&template.display_name)));

        match self.mount_template(&template).await {
            Ok(()) => {
                info!("Template {} loaded", template.id);
                self.session.phase = RouterPhase::TemplateActive {
                    page: self.session.current_page.clone(),
                };
                if initial_page != self.session.current_page {
                    let outcome = self.navigate(initial_page, NavigationSource::Initial).await;
                    if matches!(outcome, Navigation::Rendered { .. }) {
                        self.update_url_for_page(initial_page);
                    }
                } else {
                    self.window.highlight_active(initial_page);
                    self.update_url_for_page(initial_page);
                }
            }
            Err(e) => {
                error!("Error loading template {}: {}", template.id, e);
                self.fail(
                    &format!("Gagal memuat template: {}", template.display_name),
                    &e.to_string(),
                );
            }
        }

        self.window.hide_loader();
    }

    /// Fetches the root document and mounts it as the full-document scaffold.
    async fn mount_template(&mut self, template: &TemplateDescriptor) -> PreviewResult<()> {
        let base = &self.config.templates_base_path;
        let root = template.default_page.as_str();

        let html = self
            .source
            .get(&template_path(base, &template.folder, root))
            .await?;
        self.session.cache.put(&template.folder, root, html.clone());

        let scaffold = render::scaffold(&html, template, base)?;
        self.window.mount_scaffold(scaffold);

        let report = assets::load_template_assets(
            &self.source,
            &mut self.window,
            template,
            base,
            &mut self.session.loaded_asset_keys,
        )
        .await;
        if !report.failed.is_empty() {
            debug!("{} asset(s) failed to load", report.failed.len());
        }

        self.window
            .append_to_body(feedback::preview_indicator(template, &self.config.main_domain));

        self.not_found = None;
        self.session.current_page = root.to_string();
        self.session.record(root, NavigationSource::Initial, false);
        Ok(())
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// The single navigation routine.
    pub async fn navigate(&mut self, page: &str, source: NavigationSource) -> Navigation {
        if !self.is_active() {
            return Navigation::Inactive;
        }
        let Some(template) = self.session.active_template.clone() else {
            return Navigation::Inactive;
        };
        if page == self.session.current_page && self.not_found.is_none() {
            debug!("Already on {}", page);
            return Navigation::Unchanged;
        }

        self.window
            .show_loader(feedback::loader(&feedback::loading_page_message(page)));

        let outcome = match self.render_page(&template, page).await {
            Ok(from_cache) => {
                self.not_found = None;
                self.session.current_page = page.to_string();
                self.session.phase = RouterPhase::TemplateActive {
                    page: page.to_string(),
                };
                self.session.record(page, source, from_cache);
                self.window.highlight_active(page);
                if source.pushes_history() {
                    self.update_url_for_page(page);
                }
                self.window.scroll_to_top();
                Navigation::Rendered { from_cache }
            }
            Err(e) if e.is_not_found() => {
                warn!("Page {} not found: {}", page, e);
                self.show_page_not_found(page);
                Navigation::NotFound
            }
            Err(e) => {
                error!("Error loading page {}: {}", page, e);
                self.fail(&format!("Gagal memuat halaman: {}", page), &e.to_string());
                Navigation::Failed
            }
        };

        self.window.hide_loader();
        outcome
    }

    /// Cache or fetch, then render into the main region. Returns whether the cache served it.
    async fn render_page(&mut self, template: &TemplateDescriptor, page: &str) -> PreviewResult<bool> {
        let base = &self.config.templates_base_path;
        let cached = self
            .session
            .cache
            .get_fresh(&template.folder, page)
            .map(str::to_string);

        let (html, from_cache) = match cached {
            Some(html) => {
                debug!("From cache: {}", page);
                (html, true)
            }
            None => {
                let html = self
                    .source
                    .get(&template_path(base, &template.folder, page))
                    .await?;
                debug!("From server: {}", page);
                self.session.cache.put(&template.folder, page, html.clone());
                (html, false)
            }
        };

        let partial = render::partial(&html, base)?;
        self.window.replace_main_region(partial.content)?;
        if let Some(title) = partial.title {
            self.window.set_title(&title);
        }
        debug!("Page {} rendered", page);
        Ok(from_cache)
    }

    fn update_url_for_page(&mut self, page: &str) {
        let new_hash = hash_for_page(page);
        if self.window.location().hash() == new_hash {
            return;
        }
        let state = HistoryState {
            page: page.to_string(),
        };
        match self.window.push_state(Some(state), &new_hash) {
            Ok(()) => debug!("URL updated to: {}", self.window.location().href()),
            Err(e) => warn!("Could not push history entry for {}: {}", page, e),
        }
    }

    // ─── Failure screens ─────────────────────────────────────────────────

    fn show_page_not_found(&mut self, page: &str) {
        let panel = feedback::not_found_panel(page);
        match self.window.replace_main_region(vec![panel.into()]) {
            Ok(()) => {
                self.window.set_title(&feedback::not_found_title());
                self.not_found = Some(page.to_string());
            }
            Err(e) => warn!("No region for the not-found panel: {}", e),
        }
    }

    fn fail(&mut self, message: &str, details: &str) {
        self.session.phase = RouterPhase::FatalError {
            message: message.to_string(),
        };
        self.window.show_screen(feedback::error_screen(
            message,
            Some(details),
            &self.config.main_domain,
        ));
    }

    fn show_invalid_template(&mut self, subdomain: &str) {
        warn!("Subdomain {} is not a configured template", subdomain);
        self.session.phase = RouterPhase::InvalidTemplate {
            subdomain: subdomain.to_string(),
        };
        self.window.show_screen(feedback::invalid_template_screen(
            subdomain,
            self.registry.ids(),
            &self.config.main_domain,
        ));
    }

    // ─── Events ──────────────────────────────────────────────────────────

    pub async fn dispatch(&mut self, event: RouterEvent) -> EventOutcome {
        self.window.run_timers();
        let template_mode = self.session.is_template_mode();

        match event {
            RouterEvent::LinkClicked { href } => {
                if !template_mode {
                    return EventOutcome::PassThrough;
                }
                let Some(page) = classify_href(&href, &self.config.templates_base_path) else {
                    return EventOutcome::PassThrough;
                };
                let page = page.to_string();
                debug!("Template navigation clicked: {}", page);
                self.navigate(&page, NavigationSource::Link).await;
                EventOutcome::Intercepted
            }
            RouterEvent::HashChanged => {
                if !template_mode {
                    return EventOutcome::Ignored;
                }
                let page = self.page_from_hash();
                self.navigate(&page, NavigationSource::Hash).await;
                EventOutcome::Intercepted
            }
            RouterEvent::PopState { state } => {
                let Some(state) = state.filter(|_| template_mode) else {
                    return EventOutcome::Ignored;
                };
                let page = if state.page.is_empty() {
                    self.page_from_hash()
                } else {
                    state.page
                };
                self.navigate(&page, NavigationSource::PopState).await;
                EventOutcome::Intercepted
            }
            RouterEvent::NavigateTo { page } => {
                if !template_mode {
                    return EventOutcome::Ignored;
                }
                self.navigate_to_page(&page).await;
                EventOutcome::Intercepted
            }
            RouterEvent::Reload => {
                if !template_mode {
                    return EventOutcome::Ignored;
                }
                self.reload().await;
                EventOutcome::Intercepted
            }
            RouterEvent::ClearCache => {
                self.clear_cache();
                EventOutcome::Intercepted
            }
            RouterEvent::Retry => {
                if self.session.phase == RouterPhase::Uninitialized {
                    return EventOutcome::Ignored;
                }
                self.retry().await;
                EventOutcome::Intercepted
            }
        }
    }

    fn page_from_hash(&self) -> String {
        let default_page = self
            .session
            .active_template
            .as_ref()
            .map(|t| t.default_page.as_str())
            .unwrap_or(DEFAULT_PAGE);
        page_from_fragment(self.window.location().fragment(), default_page)
    }

    /// Browser back button. Returns the outcome of each event the traversal fired.
    pub async fn go_back(&mut self) -> Vec<EventOutcome> {
        let events = self.window.back();
        self.dispatch_browser_events(events).await
    }

    pub async fn go_forward(&mut self) -> Vec<EventOutcome> {
        let events = self.window.forward();
        self.dispatch_browser_events(events).await
    }

    /// The user types a new fragment into the address bar.
    pub async fn enter_hash(&mut self, hash: &str) -> Vec<EventOutcome> {
        let events = self.window.set_hash(hash);
        self.dispatch_browser_events(events).await
    }

    pub async fn dispatch_browser_events(&mut self, events: Vec<BrowserEvent>) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.dispatch(event.into()).await);
        }
        outcomes
    }

    /// Clicks the first element with `id`, if it maps to a router event.
    pub async fn click_element(&mut self, id: &str) -> Option<EventOutcome> {
        let event = self.window.find_by_id(id).and_then(event_for_element)?;
        Some(self.dispatch(event).await)
    }

    /// Clicks the first element in the body matching `pred`.
    pub async fn click_where(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<EventOutcome> {
        let event = self.window.body.find(pred).and_then(event_for_element)?;
        Some(self.dispatch(event).await)
    }

    /// Consumes commands until every handle is dropped. Initializes first if needed.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<RouterCommand>) {
        if !self.initialized {
            self.init().await;
        }
        while let Some(command) = rx.recv().await {
            match command {
                RouterCommand::Dispatch(event, reply) => {
                    let outcome = self.dispatch(event).await;
                    let _ = reply.send(outcome);
                }
                RouterCommand::Back(reply) => {
                    let outcomes = self.go_back().await;
                    let _ = reply.send(outcomes);
                }
                RouterCommand::Forward(reply) => {
                    let outcomes = self.go_forward().await;
                    let _ = reply.send(outcomes);
                }
                RouterCommand::Snapshot(reply) => {
                    let _ = reply.send(self.state());
                }
                RouterCommand::Document(reply) => {
                    let _ = reply.send(self.window.document_html());
                }
            }
        }
        debug!("Router command channel closed");
    }

    // ─── External API ────────────────────────────────────────────────────

    /// Drops assets and cache and mounts the template again at the current page.
    pub async fn reload(&mut self) {
        if self.session.active_template.is_none() {
            return;
        }
        let page = self.session.current_page.clone();
        info!("Reloading template at {}", page);
        self.session.loaded_asset_keys.clear();
        self.session.cache.clear_all();
        self.session.phase = RouterPhase::Resolving;
        self.load_template_with_routing(&page).await;
    }

    /// Starts over as if the tab were reloaded.
    pub async fn retry(&mut self) -> RouterPhase {
        info!("Retrying template preview");
        self.session = SessionState::new(self.config.cache_duration());
        self.not_found = None;
        self.window.clear_document();
        self.init().await
    }

    pub fn clear_cache(&mut self) {
        self.session.cache.clear_all();
        info!("Template cache cleared");
    }

    pub fn current_template(&self) -> Option<&TemplateDescriptor> {
        self.session.active_template.as_deref()
    }

    pub fn current_page(&self) -> &str {
        &self.session.current_page
    }

    pub async fn navigate_to_page(&mut self, page: &str) -> Navigation {
        if !self.session.is_template_mode() {
            return Navigation::Inactive;
        }
        self.navigate(page.trim(), NavigationSource::Api).await
    }

    pub fn is_template_mode(&self) -> bool {
        self.session.is_template_mode()
    }

    pub fn state(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_template_mode: self.session.is_template_mode(),
            template: self.session.active_template.as_deref().cloned(),
            current_page: self.session.current_page.clone(),
            phase: self.session.phase.clone(),
            url: self.window.location().href().to_string(),
            title: self.window.title(),
            loaded_assets: self.session.loaded_asset_keys.iter().cloned().collect(),
            cached_pages: self.session.cache.keys(),
            navigation_history: self.session.navigation_history.clone(),
            window: self.window.stats(),
            taken_at: chrono::Utc::now(),
        }
    }
}

// ─── Channel API ─────────────────────────────────────────────────────────────

pub enum RouterCommand {
    Dispatch(RouterEvent, oneshot::Sender<EventOutcome>),
    Back(oneshot::Sender<Vec<EventOutcome>>),
    Forward(oneshot::Sender<Vec<EventOutcome>>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Document(oneshot::Sender<String>),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("preview router has stopped")]
pub struct RouterStopped;

/// Cloneable front door to a running router. Each call waits until the router
/// has finished handling it.
#[derive(Clone)]
pub struct PreviewHandle {
    tx: mpsc::Sender<RouterCommand>,
}

impl PreviewHandle {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<RouterCommand>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RouterCommand,
    ) -> Result<T, RouterStopped> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| RouterStopped)?;
        rx.await.map_err(|_| RouterStopped)
    }

    pub async fn dispatch(&self, event: RouterEvent) -> Result<EventOutcome, RouterStopped> {
        self.request(|reply| RouterCommand::Dispatch(event, reply)).await
    }

    pub async fn click(&self, href: &str) -> Result<EventOutcome, RouterStopped> {
        self.dispatch(RouterEvent::LinkClicked {
            href: href.to_string(),
        })
        .await
    }

    pub async fn navigate_to_page(&self, page: &str) -> Result<EventOutcome, RouterStopped> {
        self.dispatch(RouterEvent::NavigateTo {
            page: page.to_string(),
        })
        .await
    }

    pub async fn reload(&self) -> Result<EventOutcome, RouterStopped> {
        self.dispatch(RouterEvent::Reload).await
    }

    pub async fn clear_cache(&self) -> Result<EventOutcome, RouterStopped> {
        self.dispatch(RouterEvent::ClearCache).await
    }

    pub async fn back(&self) -> Result<Vec<EventOutcome>, RouterStopped> {
        self.request(RouterCommand::Back).await
    }

    pub async fn forward(&self) -> Result<Vec<EventOutcome>, RouterStopped> {
        self.request(RouterCommand::Forward).await
    }

    pub async fn state(&self) -> Result<SessionSnapshot, RouterStopped> {
        self.request(RouterCommand::Snapshot).await
    }

    pub async fn document_html(&self) -> Result<String, RouterStopped> {
        self.request(RouterCommand::Document).await
    }

    pub async fn current_page(&self) -> Result<String, RouterStopped> {
        Ok(self.state().await?.current_page)
    }

    pub async fn current_template(&self) -> Result<Option<TemplateDescriptor>, RouterStopped> {
        Ok(self.state().await?.template)
    }

    pub async fn is_template_mode(&self) -> Result<bool, RouterStopped> {
        Ok(self.state().await?.is_template_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(href: &str) -> Location {
        Location::parse(href).unwrap()
    }

    #[test]
    fn test_initial_page_priority() {
        assert_eq!(initial_page(&location("http://t.localhost/"), "index.html"), "index.html");
        assert_eq!(initial_page(&location("http://t.localhost/#menu"), "index.html"), "menu.html");
        assert_eq!(initial_page(&location("http://t.localhost/#index"), "index.html"), "index.html");
        assert_eq!(
            initial_page(&location("http://t.localhost/profil.html"), "index.html"),
            "profil.html"
        );
        // hash beats path
        assert_eq!(
            initial_page(&location("http://t.localhost/profil.html#kontak"), "index.html"),
            "kontak.html"
        );
        assert_eq!(initial_page(&location("http://t.localhost/about"), "index.html"), "index.html");
        assert_eq!(
            initial_page(&location("http://t.localhost/a/b/menu.html"), "index.html"),
            "menu.html"
        );
    }

    #[test]
    fn test_page_from_fragment() {
        assert_eq!(page_from_fragment("", "index.html"), "index.html");
        assert_eq!(page_from_fragment("index", "home.html"), "index.html");
        assert_eq!(page_from_fragment("menu", "index.html"), "menu.html");
        assert_eq!(page_from_fragment("menu.html", "index.html"), "menu.html");
    }

    #[test]
    fn test_hash_for_page() {
        assert_eq!(hash_for_page("index.html"), "");
        assert_eq!(hash_for_page("profil.html"), "#profil");
    }

    #[test]
    fn test_event_for_element() {
        let retry = Element::new("button").with_attr(ACTION_ATTR, ACTION_RETRY);
        assert_eq!(event_for_element(&retry), Some(RouterEvent::Retry));

        let back = feedback::not_found_panel("x.html");
        let button = back.find_tag("button").unwrap();
        assert_eq!(
            event_for_element(button),
            Some(RouterEvent::NavigateTo {
                page: "index.html".to_string()
            })
        );

        let link = Element::new("a").with_attr("href", "menu.html");
        assert_eq!(
            event_for_element(&link),
            Some(RouterEvent::LinkClicked {
                href: "menu.html".to_string()
            })
        );
        assert_eq!(event_for_element(&Element::new("span")), None);
    }

    #[test]
    fn test_browser_event_conversion() {
        assert_eq!(RouterEvent::from(BrowserEvent::HashChange), RouterEvent::HashChanged);
        assert_eq!(
            RouterEvent::from(BrowserEvent::PopState(None)),
            RouterEvent::PopState { state: None }
        );
    }
}
