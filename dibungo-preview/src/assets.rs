//! Template stylesheets and scripts. Loaded best-effort: a broken asset is
//! logged and skipped, never fatal.

use dibungo_markup::Element;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::fetch::{PageSource, template_path};
use crate::registry::TemplateDescriptor;
use crate::window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Css,
    Js,
}

impl AssetKind {
    fn prefix(self) -> &'static str {
        match self {
            AssetKind::Css => "css",
            AssetKind::Js => "js",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    /// File name as declared by the template
    pub file: String,
    pub path: String,
    /// `css:{path}` / `js:{path}`
    pub key: String,
}

impl AssetRef {
    fn new(kind: AssetKind, base: &str, folder: &str, file: &str) -> Self {
        let path = template_path(base, folder, file);
        Self {
            kind,
            file: file.to_string(),
            key: format!("{}:{}", kind.prefix(), path),
            path,
        }
    }

    /// `<link rel="stylesheet">` or `<script defer>` for this asset.
    pub fn element(&self) -> Element {
        match self.kind {
            AssetKind::Css => Element::new("link")
                .with_attr("rel", "stylesheet")
                .with_attr("href", self.path.as_str()),
            AssetKind::Js => Element::new("script")
                .with_attr("src", self.path.as_str())
                .with_attr("defer", ""),
        }
    }
}

/// Stylesheets then scripts, each in declared order.
pub fn plan(template: &TemplateDescriptor, templates_base_path: &str) -> Vec<AssetRef> {
    let css = template
        .css_files
        .iter()
        .map(|f| AssetRef::new(AssetKind::Css, templates_base_path, &template.folder, f));
    let js = template
        .js_files
        .iter()
        .map(|f| AssetRef::new(AssetKind::Js, templates_base_path, &template.folder, f));
    css.chain(js).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Mounts every planned asset not already in `loaded_keys` and records the
/// keys of those that load. Stylesheets go to the head, scripts to the body.
pub async fn load_template_assets<S: PageSource>(
    source: &S,
    window: &mut Window,
    template: &TemplateDescriptor,
    templates_base_path: &str,
    loaded_keys: &mut BTreeSet<String>,
) -> AssetReport {
    let mut report = AssetReport::default();

    for asset in plan(template, templates_base_path) {
        if loaded_keys.contains(&asset.key) {
            report.skipped.push(asset.key);
            continue;
        }

        match asset.kind {
            AssetKind::Css => window.append_to_head(asset.element()),
            AssetKind::Js => window.append_to_body(asset.element()),
        }

        match source.get(&asset.path).await {
            Ok(_) => {
                debug!("Loaded {}", asset.key);
                loaded_keys.insert(asset.key.clone());
                report.loaded.push(asset.key);
            }
            Err(e) => {
                let kind = match asset.kind {
                    AssetKind::Css => "CSS",
                    AssetKind::Js => "JS",
                };
                warn!("Failed to load {}: {} ({})", kind, asset.file, e);
                report.failed.push(asset.key);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> TemplateDescriptor {
        TemplateDescriptor {
            id: "template3".to_string(),
            display_name: "Toko Jersey".to_string(),
            folder: "template3".to_string(),
            css_files: vec!["style.css".to_string(), "theme.css".to_string()],
            js_files: vec!["script.js".to_string()],
            default_page: "index.html".to_string(),
        }
    }

    #[test]
    fn test_plan_order_and_keys() {
        let keys: Vec<String> = plan(&template(), "/templates/").into_iter().map(|a| a.key).collect();
        assert_eq!(
            keys,
            vec![
                "css:/templates/template3/style.css",
                "css:/templates/template3/theme.css",
                "js:/templates/template3/script.js",
            ]
        );
    }

    #[test]
    fn test_asset_elements() {
        let assets = plan(&template(), "/templates/");
        assert_eq!(
            assets[0].element().to_html(),
            r#"<link rel="stylesheet" href="/templates/template3/style.css">"#
        );
        assert_eq!(
            assets[2].element().to_html(),
            r#"<script src="/templates/template3/script.js" defer></script>"#
        );
    }
}
