//! `sitemap.xml` generation.
//!
//! One `<url><loc>` entry per generated page, in the order pages were
//! produced, under the standard sitemap namespace:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://openbekeniot.github.io/webapp/devices/Lamp1.html</loc></url>
//!   <url><loc>https://openbekeniot.github.io/webapp/devicesList.html</loc></url>
//! </urlset>
//! ```

use maud::html;

pub const SITEMAP_FILENAME: &str = "sitemap.xml";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render a sitemap listing `paths` (relative to the site root) under
/// `base_url`. Entry text is XML-escaped.
pub fn render_sitemap(base_url: &str, paths: &[String]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NS}\">\n"));
    for path in paths {
        let entry = html! { url { loc { (base_url) (path) } } };
        xml.push_str("  ");
        xml.push_str(&entry.into_string());
        xml.push('\n');
    }
    xml.push_str("</urlset>");
    xml
}
