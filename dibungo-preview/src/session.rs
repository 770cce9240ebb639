//! Per-tab session state owned by the router, plus its serialisable snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::PageCache;
use crate::config::DEFAULT_PAGE;
use crate::registry::TemplateDescriptor;
use crate::window::WindowStats;

/// Where the router is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RouterPhase {
    /// Not started, or on the main site / a foreign host (stays here for good).
    Uninitialized,
    Resolving,
    TemplateActive { page: String },
    InvalidTemplate { subdomain: String },
    FatalError { message: String },
}

/// What triggered a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationSource {
    Initial,
    Link,
    Api,
    Hash,
    PopState,
}

impl NavigationSource {
    /// User-initiated navigations push a history entry; browser-initiated ones already moved the URL.
    pub fn pushes_history(self) -> bool {
        matches!(self, NavigationSource::Link | NavigationSource::Api)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationRecord {
    pub page: String,
    pub source: NavigationSource,
    pub from_cache: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionState {
    pub active_template: Option<Arc<TemplateDescriptor>>,
    pub current_page: String,
    pub loaded_asset_keys: BTreeSet<String>,
    pub cache: PageCache,
    pub navigation_history: Vec<NavigationRecord>,
    pub phase: RouterPhase,
}

impl SessionState {
    pub fn new(cache_max_age: Duration) -> Self {
        Self {
            active_template: None,
            current_page: DEFAULT_PAGE.to_string(),
            loaded_asset_keys: BTreeSet::new(),
            cache: PageCache::new(cache_max_age),
            navigation_history: Vec::new(),
            phase: RouterPhase::Uninitialized,
        }
    }

    pub fn is_template_mode(&self) -> bool {
        self.active_template.is_some()
    }

    pub fn record(&mut self, page: &str, source: NavigationSource, from_cache: bool) {
        self.navigation_history.push(NavigationRecord {
            page: page.to_string(),
            source,
            from_cache,
            at: Utc::now(),
        });
    }
}

/// Point-in-time view of the router for external callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub is_template_mode: bool,
    pub template: Option<TemplateDescriptor>,
    pub current_page: String,
    #[serde(flatten)]
    pub phase: RouterPhase,
    pub url: String,
    pub title: String,
    pub loaded_assets: Vec<String>,
    pub cached_pages: Vec<String>,
    pub navigation_history: Vec<NavigationRecord>,
    pub window: WindowStats,
    pub taken_at: DateTime<Utc>,
}
