//! Template registry: immutable descriptors looked up by subdomain label.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PreviewConfig;

/// A previewable template. Built once from config, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDescriptor {
    pub id: String,
    pub display_name: String,
    pub folder: String,
    pub css_files: Vec<String>,
    pub js_files: Vec<String>,
    pub default_page: String,
}

/// What the current host means for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMode {
    /// The main site or a dev host: the router stays out of the way.
    MainSite,
    /// `<label>.<main domain>` or `<label>.<dev host>`.
    Subdomain(String),
    /// Unrelated host; nothing to do.
    Foreign,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    by_id: HashMap<String, Arc<TemplateDescriptor>>,
    /// Declaration order, for the invalid-template screen.
    order: Vec<String>,
}

impl TemplateRegistry {
    pub fn from_config(config: &PreviewConfig) -> Self {
        let mut registry = Self::default();
        for t in &config.templates {
            let descriptor = TemplateDescriptor {
                id: t.id.clone(),
                display_name: t.display_name.clone(),
                folder: t.folder().to_string(),
                css_files: t.css_files.clone(),
                js_files: t.js_files.clone(),
                default_page: t.default_page.clone(),
            };
            registry.order.push(t.id.clone());
            registry
                .by_id
                .insert(t.id.to_ascii_lowercase(), Arc::new(descriptor));
        }
        registry
    }

    /// Looks up a template by subdomain label. Labels are case-insensitive, like DNS.
    pub fn resolve(&self, id: &str) -> Option<Arc<TemplateDescriptor>> {
        self.by_id.get(&id.to_ascii_lowercase()).cloned()
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Classifies `host` against the main domain and the dev hosts.
pub fn classify_host(host: &str, main_domain: &str, dev_hosts: &[String]) -> HostMode {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    if host == main_domain || dev_hosts.iter().any(|d| *d == host) {
        return HostMode::MainSite;
    }
    let parents = std::iter::once(main_domain).chain(dev_hosts.iter().map(String::as_str));
    for parent in parents {
        let suffix = format!(".{}", parent);
        if let Some(prefix) = host.strip_suffix(&suffix) {
            if let Some(label) = prefix.split('.').next().filter(|l| !l.is_empty()) {
                return HostMode::Subdomain(label.to_string());
            }
        }
    }
    HostMode::Foreign
}
