//! UI feedback: loading overlay, error screens, not-found panel, preview indicator.
//! Copy is Indonesian, as on the main site.

use dibungo_markup::Element;

use crate::registry::TemplateDescriptor;
use crate::render::preview_title;
use crate::window::LOADER_ID;

pub const INDICATOR_ID: &str = "template-preview-indicator";
pub const NOT_FOUND_HEADING: &str = "Halaman Tidak Ditemukan";

/// `data-action` values the router understands on buttons.
pub const ACTION_ATTR: &str = "data-action";
pub const ACTION_RETRY: &str = "retry";
pub const ACTION_NAVIGATE: &str = "navigate";

const LOADER_CSS: &str = "#template-loader{position:fixed;inset:0;background:rgba(10,10,15,.95);\
display:flex;flex-direction:column;justify-content:center;align-items:center;z-index:9999;\
color:#00ff88;font-family:'JetBrains Mono',monospace}\
.spinner{width:50px;height:50px;border:3px solid rgba(0,255,136,.3);border-radius:50%;\
border-top-color:#00ff88;animation:spin 1s linear infinite}\
.loading-text{margin-top:20px;font-size:1rem;text-align:center}\
@keyframes spin{to{transform:rotate(360deg)}}";

const INDICATOR_CSS: &str = "#template-preview-indicator{position:fixed;bottom:20px;right:20px;\
background:rgba(0,255,136,.2);border:1px solid #00ff88;color:#00ff88;padding:10px 15px;\
border-radius:8px;font-size:12px;z-index:10000;display:flex;align-items:center;gap:8px}\
#template-preview-indicator .template-name{font-weight:bold}";

pub fn loading_template_message(display_name: &str) -> String {
    format!("Memuat {}...", display_name)
}

pub fn loading_page_message(page: &str) -> String {
    format!("Memuat halaman {}...", page_stem(page))
}

/// `profil.html` → `profil`
pub fn page_stem(page: &str) -> &str {
    page.strip_suffix(".html").unwrap_or(page)
}

pub fn not_found_title() -> String {
    preview_title(NOT_FOUND_HEADING)
}

fn main_site_url(main_domain: &str) -> String {
    format!("https://{}", main_domain)
}

pub fn loader(message: &str) -> Element {
    Element::new("div")
        .with_attr("id", LOADER_ID)
        .with_child(Element::new("style").with_text(LOADER_CSS))
        .with_child(Element::new("div").with_attr("class", "spinner"))
        .with_child(
            Element::new("div")
                .with_attr("class", "loading-text")
                .with_text(message),
        )
}

/// Full-page error with "back to main site" and retry actions.
pub fn error_screen(message: &str, details: Option<&str>, main_domain: &str) -> Element {
    let mut card = Element::new("div")
        .with_attr("class", "template-error-card")
        .with_child(Element::new("h1").with_text("Error Memuat Template"))
        .with_child(
            Element::new("p")
                .with_attr("class", "template-error-message")
                .with_text(message),
        );
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        card = card.with_child(
            Element::new("p")
                .with_attr("class", "template-error-details")
                .with_text(details),
        );
    }
    let actions = Element::new("div")
        .with_attr("class", "template-error-actions")
        .with_child(
            Element::new("a")
                .with_attr("href", main_site_url(main_domain))
                .with_text("Kembali ke Situs Utama"),
        )
        .with_child(
            Element::new("button")
                .with_attr(ACTION_ATTR, ACTION_RETRY)
                .with_text("Coba Lagi"),
        );

    Element::new("div")
        .with_attr("id", "template-error")
        .with_attr("class", "template-error")
        .with_child(card.with_child(actions))
}

/// Full-page screen for an unknown subdomain, listing every valid template id.
pub fn invalid_template_screen(subdomain: &str, valid_ids: &[String], main_domain: &str) -> Element {
    let mut list = Element::new("div").with_attr("class", "template-list");
    for id in valid_ids {
        list = list.with_child(Element::new("code").with_text(id.as_str()));
    }

    Element::new("div")
        .with_attr("id", "template-invalid")
        .with_attr("class", "template-invalid")
        .with_child(Element::new("h1").with_text("Template Tidak Valid"))
        .with_child(
            Element::new("p")
                .with_text("Subdomain \"")
                .with_child(Element::new("strong").with_text(subdomain))
                .with_text("\" tidak dikonfigurasi sebagai template."),
        )
        .with_child(Element::new("p").with_text("Template yang tersedia:"))
        .with_child(list)
        .with_child(
            Element::new("a")
                .with_attr("href", main_site_url(main_domain))
                .with_text("Kembali ke Situs Utama"),
        )
}

/// Panel shown in the content region when a page does not exist.
pub fn not_found_panel(page: &str) -> Element {
    Element::new("div")
        .with_attr("class", "template-not-found")
        .with_child(Element::new("h1").with_text(NOT_FOUND_HEADING))
        .with_child(Element::new("p").with_text(format!(
            "Halaman \"{}\" tidak ditemukan di template ini.",
            page_stem(page)
        )))
        .with_child(
            Element::new("button")
                .with_attr(ACTION_ATTR, ACTION_NAVIGATE)
                .with_attr("data-page", "index.html")
                .with_text("Kembali ke Halaman Utama"),
        )
}

pub fn preview_indicator(template: &TemplateDescriptor, main_domain: &str) -> Element {
    Element::new("div")
        .with_attr("id", INDICATOR_ID)
        .with_child(Element::new("style").with_text(INDICATOR_CSS))
        .with_child(Element::new("span").with_text("🎯 Template Preview:"))
        .with_child(
            Element::new("span")
                .with_attr("class", "template-name")
                .with_text(template.display_name.as_str()),
        )
        .with_child(
            Element::new("a")
                .with_attr("class", "close-btn")
                .with_attr("title", "Kembali ke situs utama")
                .with_attr("href", main_site_url(main_domain))
                .with_text("×"),
        )
}
