//! # Dibungo Preview
//!
//! Template preview router for the storefront demos served on
//! `<template>.dibungo.netlify.app`.
//!
//! On a template subdomain the router fetches the template's root document,
//! mounts it as a scaffold, then swaps only the main content region as the
//! visitor follows internal links, edits the fragment or goes back and forward.
//! Pages are cached for a fixed window; every fetch is bounded by a timeout.
//!
//! ## Example
//! ```ignore
//! use dibungo_preview::{HttpSource, PreviewConfig, PreviewRouter, Window};
//! use url::Url;
//!
//! let config = PreviewConfig::builtin()?;
//! let window = Window::open("http://template1.dibungo.netlify.app/#profil")?;
//! let base = Url::parse("https://template1.dibungo.netlify.app/")?;
//! let source = HttpSource::new(base, config.loading_timeout());
//! let mut router = PreviewRouter::new(config, source, window);
//! router.init().await;
//! assert_eq!(router.current_page(), "profil.html");
//! ```

pub mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod fetch;
pub mod registry;
pub mod render;
pub mod router;
pub mod session;
pub mod window;

pub use cache::{PageCache, PageKey};
pub use config::{ConfigError, PreviewConfig, TemplateConfig};
pub use error::{PreviewError, PreviewResult};
pub use fetch::{FetchError, HttpSource, PageSource, template_path};
pub use registry::{HostMode, TemplateDescriptor, TemplateRegistry, classify_host};
pub use render::{RenderError, preview_title};
pub use router::{
    EventOutcome, Navigation, PreviewHandle, PreviewRouter, RouterCommand, RouterEvent,
    RouterStopped,
};
pub use session::{NavigationRecord, NavigationSource, RouterPhase, SessionSnapshot};
pub use window::{BrowserEvent, HistoryState, Location, Window};
