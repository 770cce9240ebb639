#![allow(dead_code)]

use dibungo_preview::{FetchError, PageSource, PreviewConfig, PreviewRouter, Window};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory page server. Unknown paths answer 404; every request is logged.
#[derive(Default)]
pub struct MemorySource {
    pages: RefCell<HashMap<String, String>>,
    failures: RefCell<HashMap<String, u16>>,
    timeouts: RefCell<Vec<String>>,
    requests: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, path: &str, html: &str) -> Self {
        self.insert(path, html);
        self
    }

    pub fn insert(&self, path: &str, html: &str) {
        self.pages.borrow_mut().insert(path.to_string(), html.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.pages.borrow_mut().remove(path);
    }

    /// Answers `status` for `path` until cleared.
    pub fn fail_with(&self, path: &str, status: u16) {
        self.failures.borrow_mut().insert(path.to_string(), status);
    }

    /// Answers a timeout for `path` until cleared.
    pub fn time_out(&self, path: &str) {
        self.timeouts.borrow_mut().push(path.to_string());
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
        self.timeouts.borrow_mut().clear();
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|p| p.as_str() == path).count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PageSource for MemorySource {
    async fn get(&self, path: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(path.to_string());
        if self.timeouts.borrow().iter().any(|p| p == path) {
            return Err(FetchError::Timeout {
                path: path.to_string(),
                timeout_ms: 10_000,
            });
        }
        if let Some(status) = self.failures.borrow().get(path).copied() {
            return Err(FetchError::Http {
                path: path.to_string(),
                status,
                reason: "Internal Server Error".to_string(),
            });
        }
        match self.pages.borrow().get(path) {
            Some(html) => Ok(html.clone()),
            None => Err(FetchError::Http {
                path: path.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

pub fn page(title: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <nav>
    <a href="index.html">Beranda</a>
    <a href="profil.html">Profil</a>
    <a href="menu.html">Menu</a>
    <a id="wa" href="https://wa.me/6281234567890">WhatsApp</a>
  </nav>
  <main>{main}</main>
  <footer><a href="kontak.html">Kontak</a></footer>
  <script src="script.js"></script>
</body>
</html>"#
    )
}

/// Template pages plus assets for `folder`.
pub fn template_pages(source: MemorySource, folder: &str, name: &str) -> MemorySource {
    let base = format!("/templates/{}", folder);
    source
        .with_page(
            &format!("{}/index.html", base),
            &page(name, "<h1>Selamat Datang</h1>"),
        )
        .with_page(
            &format!("{}/profil.html", base),
            &page("Profil", "<h1>Profil Kami</h1><p>Berdiri sejak 2010.</p>"),
        )
        .with_page(
            &format!("{}/menu.html", base),
            &page("Menu", "<h1>Menu</h1><ul><li>Klepon</li><li>Onde-onde</li></ul>"),
        )
        .with_page(&format!("{}/style.css", base), "body { margin: 0 }")
        .with_page(&format!("{}/script.js", base), "console.log('ok')")
}

pub fn all_templates() -> MemorySource {
    let source = template_pages(MemorySource::new(), "template1", "Les Privat TK Ceria");
    let source = template_pages(source, "template2", "UMKM Jajanan Pasar");
    template_pages(source, "template3", "Toko Jersey Bola")
}

pub fn router_at(href: &str, source: MemorySource) -> PreviewRouter<MemorySource> {
    let config = PreviewConfig::builtin().unwrap();
    let window = Window::open(href).unwrap();
    PreviewRouter::new(config, source, window)
}
