//! Device page rendering.
//!
//! Rendering happens in two steps. [`build_page`] decides *what* a device
//! page shows: it resolves every fallback, every conditional panel, and every
//! derived link into a [`DevicePage`]. [`render_page`] decides *how* it looks:
//! it serializes a `DevicePage` to HTML with no further decisions. Tests for
//! a panel's presence or content can inspect the `DevicePage` directly.
//!
//! ## Panels
//!
//! | Panel | Shown when |
//! |-------|------------|
//! | Image | `image` is set |
//! | Information | always (six rows, `N/A` placeholders) |
//! | Device Template | always (raw record, copy button) |
//! | Pins | always (adapter description or a placeholder) |
//! | TuyaMCU warning | a keyword contains `tuyamcu` |
//! | Addressable LED warning | a keyword contains `ws2812` or `sm16703` |
//! | Further reading | always; wording depends on `bDetailed` |
//! | Similar devices | at least one peer shares pin assignments |
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/); every interpolated value is
//! escaped. Styling comes from Bootstrap 4 plus `static/device.css`, and
//! `static/device.js` provides the copy and tutorial buttons. Both static
//! files are embedded at compile time.

use crate::catalog::Device;
use crate::config::SiteConfig;
use crate::similarity::Match;
use crate::template::TemplateAdapter;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/device.css");
const JS: &str = include_str!("../static/device.js");

const BOOTSTRAP_CSS: &str = "https://stackpath.bootstrapcdn.com/bootstrap/4.5.2/css/bootstrap.min.css";

/// Placeholder for missing information fields.
pub const PLACEHOLDER: &str = "N/A";

const NO_PINS: &str = "No pin description available.";

/// A ranked peer, resolved to what its link needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarDevice {
    /// Peer name, when it has one.
    pub name: Option<String>,
    /// Peer's sanitized page identifier.
    pub token: String,
    pub ratio: f64,
}

impl SimilarDevice {
    pub fn from_match(peer: &Match<'_>, adapter: &dyn TemplateAdapter) -> Self {
        Self {
            name: peer.device.name(),
            token: adapter.page_token(peer.device),
            ratio: peer.ratio,
        }
    }
}

/// Everything known about one device before rendering.
#[derive(Debug, Clone, Copy)]
pub struct PageInput<'a> {
    pub device: &'a Device,
    /// Sanitized page identifier of this device.
    pub token: &'a str,
    /// Adapter description; `\n` separates lines.
    pub description: &'a str,
    pub similar: &'a [SimilarDevice],
}

/// The resolved content of one device page.
#[derive(Debug, Clone, PartialEq)]
pub struct DevicePage {
    pub title: String,
    /// Model shown in the heading's parentheses, empty when unknown.
    pub model: String,
    pub site_verification: Option<String>,
    pub image: Option<ImagePanel>,
    pub info: Vec<InfoRow>,
    pub raw_template: String,
    pub pin_lines: Vec<String>,
    pub notices: Vec<Notice>,
    pub further_reading: FurtherReading,
    pub similar: Vec<SimilarEntry>,
    pub tutorial_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePanel {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

/// A fixed warning panel with a help link.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    TuyaMcu,
    AddressableLed,
}

impl NoticeKind {
    fn message(self) -> &'static str {
        match self {
            NoticeKind::TuyaMcu => {
                "Warning! This device is using TuyaMCU. Please consult generic TuyaMCU guide:"
            }
            NoticeKind::AddressableLed => {
                "Warning! This device is using per-pixel addressable LEDs. Please consult generic PixelAnim guide:"
            }
        }
    }

    fn link_text(self) -> &'static str {
        match self {
            NoticeKind::TuyaMcu => {
                "TuyaMCU flashing, setup and configuration guide - configure dpIDs for Home Assistant"
            }
            NoticeKind::AddressableLed => {
                "OpenBeken WS2812B animations - new HTTP panel integration, PixelAnim driver"
            }
        }
    }

    /// Whether a device's keywords call for this notice.
    pub fn applies_to(self, device: &Device) -> bool {
        match self {
            NoticeKind::TuyaMcu => device.has_keyword_containing("tuyamcu"),
            NoticeKind::AddressableLed => {
                device.has_keyword_containing("ws2812") || device.has_keyword_containing("sm16703")
            }
        }
    }
}

/// Documentation links at the bottom of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct FurtherReading {
    /// Detailed devices link a flashing guide, others a forum thread.
    pub detailed: bool,
    /// Device wiki link, `#` when absent.
    pub primary: String,
    /// Second-locale variant of `primary`, or the generic forum.
    pub secondary: String,
    pub shop: Option<String>,
    pub listing_href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarEntry {
    pub href: String,
    pub label: String,
    /// Ratio as a percentage with one decimal, e.g. `"66.7"`.
    pub percent: String,
}

/// Resolve what a device page shows.
pub fn build_page(input: &PageInput<'_>, config: &SiteConfig) -> DevicePage {
    let device = input.device;
    let title = device.name().unwrap_or_else(|| input.token.to_string());
    let field = |value: Option<String>| value.unwrap_or_else(|| PLACEHOLDER.to_string());

    let info = vec![
        InfoRow {
            label: "Vendor",
            value: field(device.vendor()),
        },
        InfoRow {
            label: "Model",
            value: field(device.model()),
        },
        InfoRow {
            label: "Chip",
            value: field(device.chip()),
        },
        InfoRow {
            label: "Board",
            value: field(device.board()),
        },
        InfoRow {
            label: "Detailed",
            value: field(device.detailed_label()),
        },
        InfoRow {
            label: "Keywords",
            value: device.keywords_text(),
        },
    ];

    let notices = [
        (NoticeKind::TuyaMcu, &config.links.tuyamcu_guide),
        (NoticeKind::AddressableLed, &config.links.pixel_anim_guide),
    ]
    .into_iter()
    .filter(|(kind, _)| kind.applies_to(device))
    .map(|(kind, href)| Notice {
        kind,
        href: href.clone(),
    })
    .collect();

    let wiki = device.wiki().filter(|w| w != "#");
    let secondary = match &wiki {
        Some(link) => config.links.locale.apply(link),
        None => config.links.forum_fallback.clone(),
    };

    let similar = input
        .similar
        .iter()
        .map(|peer| SimilarEntry {
            href: format!("{}.html", peer.token),
            label: peer.name.clone().unwrap_or_else(|| peer.token.clone()),
            percent: format_percent(peer.ratio),
        })
        .collect();

    DevicePage {
        image: device.image().map(|src| ImagePanel {
            src,
            alt: title.clone(),
        }),
        model: device.model().unwrap_or_default(),
        title,
        site_verification: config.site.google_site_verification.clone(),
        info,
        raw_template: device.raw_template(),
        pin_lines: if input.description.is_empty() {
            Vec::new()
        } else {
            input.description.split('\n').map(str::to_string).collect()
        },
        notices,
        further_reading: FurtherReading {
            detailed: device.is_detailed(),
            primary: wiki.unwrap_or_else(|| "#".to_string()),
            secondary,
            shop: device.product(),
            listing_href: format!("../{}", config.site.listing_page),
        },
        similar,
        tutorial_url: config.links.template_tutorial.clone(),
    }
}

/// Format a ratio in `[0, 1]` as a percentage with one decimal place.
/// Exact halves round up: 1/16 is `"6.3"`.
pub fn format_percent(ratio: f64) -> String {
    let tenths = (ratio * 1000.0).round() / 10.0;
    format!("{:.1}", tenths)
}

/// Build and serialize a device page in one go.
pub fn render_device(input: &PageInput<'_>, config: &SiteConfig) -> String {
    render_page(&build_page(input, config)).into_string()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Serialize a resolved device page.
pub fn render_page(page: &DevicePage) -> Markup {
    let content = html! {
        div.container {
            h5 { "Firmware change information, Home Assistant pairing, guide, template, tutorial and help for..." }
            h1.my-3 { (page.title) " (" (page.model) ")" }
            div.row {
                @if let Some(image) = &page.image {
                    (image_panel(image))
                }
                (info_panel(&page.info))
                (template_panel(&page.raw_template))
                (pins_panel(&page.pin_lines))
                @for notice in &page.notices {
                    (notice_panel(notice))
                }
                (further_reading_panel(&page.further_reading))
                @if !page.similar.is_empty() {
                    (similar_panel(&page.similar))
                }
            }
        }
    };
    base_document(page, content)
}

fn base_document(page: &DevicePage, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) }
                link rel="stylesheet" href=(BOOTSTRAP_CSS);
                @if let Some(token) = &page.site_verification {
                    meta name="google-site-verification" content=(token);
                }
                style { (PreEscaped(CSS)) }
            }
            body data-tutorial=(page.tutorial_url) {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Half-width card with an optional header.
fn half_card(header: Option<&str>, body: Markup) -> Markup {
    html! {
        div.col-md-6.mb-3 {
            div.card {
                @if let Some(header) = header {
                    div.card-header { (header) }
                }
                (body)
            }
        }
    }
}

fn image_panel(image: &ImagePanel) -> Markup {
    half_card(
        None,
        html! {
            img.card-img-top src=(image.src) alt=(image.alt);
        },
    )
}

fn info_panel(rows: &[InfoRow]) -> Markup {
    half_card(
        Some("Information"),
        html! {
            div.card-body {
                @for row in rows {
                    p { strong { (row.label) ":" } " " (row.value) }
                }
            }
        },
    )
}

fn template_panel(raw_template: &str) -> Markup {
    half_card(
        Some("Device Template"),
        html! {
            div.card-body {
                textarea readonly id="deviceTemplate" { (raw_template) }
                button.btn.btn-primary.copy-btn type="button" onclick="copyTemplate()" { "Copy Template" }
                " "
                button.btn.btn-primary.copy-btn type="button" onclick="showTemplateTutorial()" { "View Templates Tutorial" }
            }
        },
    )
}

fn pins_panel(lines: &[String]) -> Markup {
    half_card(
        Some("Pins"),
        html! {
            div.card-body {
                @if lines.is_empty() {
                    (NO_PINS)
                } @else {
                    @for (idx, line) in lines.iter().enumerate() {
                        @if idx > 0 { br; }
                        (line)
                    }
                }
            }
        },
    )
}

fn notice_panel(notice: &Notice) -> Markup {
    html! {
        div.col-12.mb-3 {
            div.card {
                div.card-body {
                    p.font-weight-bold.notice {
                        (notice.kind.message()) " "
                        a href=(notice.href) target="_blank" { (notice.kind.link_text()) }
                    }
                }
            }
        }
    }
}

fn further_reading_panel(reading: &FurtherReading) -> Markup {
    let (lead, primary_text, secondary_text) = if reading.detailed {
        (
            "Read detailed flashing guide and get help in device topic: ",
            "English guide",
            "Polish guide",
        )
    } else {
        (
            "Read more information and get help on forum: ",
            "English thread",
            "Polish thread",
        )
    };
    html! {
        div.col-12.mb-3 {
            div.card {
                div.card-header { "Further reading" }
                div.card-body {
                    p.font-weight-bold.notice {
                        (lead)
                        a href=(reading.primary) target="_blank" { (primary_text) }
                        ", see also "
                        a href=(reading.secondary) target="_blank" { (secondary_text) }
                    }
                    @if let Some(shop) = &reading.shop {
                        p { "You can also visit " a href=(shop) target="_blank" { "shop site" } "." }
                    }
                    p { "Return to " a href=(reading.listing_href) { "devices list" } "." }
                }
            }
        }
    }
}

fn similar_panel(entries: &[SimilarEntry]) -> Markup {
    html! {
        div.col-12.mb-3 {
            div.card {
                div.card-header { "Devices with similar GPIO configuration" }
                div.card-body {
                    ul {
                        @for entry in entries {
                            li { a href=(entry.href) { (entry.label) } " - " (entry.percent) "% match" }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
