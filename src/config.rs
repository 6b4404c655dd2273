//! Site configuration module.
//!
//! Handles loading and validating `site.toml` from the project root. Every
//! key is optional: a missing file, or a file that only overrides one value,
//! falls back to the stock defaults, which reproduce the published
//! OpenBeken device pages.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! catalog = "devices.json"   # Catalog document, relative to the project root
//! output_dir = "gh-pages"    # Publish directory, relative to the project root
//!
//! [site]
//! base_url = "https://openbekeniot.github.io/webapp/"
//! devices_dir = "devices"            # Subdirectory for generated device pages
//! listing_page = "devicesList.html"  # Hand-authored listing page
//! google_site_verification = "7TndFADSStO2WmhEx0TgZ_o__nVvRwyk8IQeWlbK-4g"
//!
//! [links]
//! tuyamcu_guide = "https://www.elektroda.com/rtvforum/topic4038151.html"
//! pixel_anim_guide = "https://www.elektroda.com/rtvforum/topic4057187.html"
//! forum_fallback = "https://www.elektroda.pl/rtvforum/"
//! template_tutorial = "https://www.youtube.com/watch?v=VDbaLR_0YWs"
//!
//! [links.locale]
//! from = ".com"   # Replaced (first occurrence) in the wiki link...
//! to = ".pl"      # ...to derive the second-locale link
//!
//! [publish]
//! exclude = []    # Extra paths (relative to the project root) never mirrored
//!
//! [processing]
//! max_processes = 1   # Parallel page renderers; 0 = one per CPU core
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Catalog document path, relative to the project root.
    pub catalog: PathBuf,
    /// Publish directory name, relative to the project root.
    pub output_dir: PathBuf,
    /// Published site layout and addressing.
    pub site: SiteSection,
    /// Static help links embedded in every device page.
    pub links: LinksConfig,
    /// Mirror step settings.
    pub publish: PublishConfig,
    /// Page rendering parallelism.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("devices.json"),
            output_dir: PathBuf::from("gh-pages"),
            site: SiteSection::default(),
            links: LinksConfig::default(),
            publish: PublishConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable for a build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.site.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "site.base_url must be an absolute http(s) URL".into(),
            ));
        }
        if !base.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_url must end with '/'".into(),
            ));
        }
        if !is_single_segment(&self.site.devices_dir) {
            return Err(ConfigError::Validation(
                "site.devices_dir must be a single directory name".into(),
            ));
        }
        if self.site.listing_page.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.listing_page must not be empty".into(),
            ));
        }
        if self.links.locale.from.is_empty() {
            return Err(ConfigError::Validation(
                "links.locale.from must not be empty".into(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Device pages link back with `../`, so the pages directory sits directly
/// under the output root.
fn is_single_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Published site layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Absolute URL every sitemap entry is prefixed with. Must end in `/`.
    pub base_url: String,
    /// Output subdirectory holding one page per device.
    pub devices_dir: String,
    /// Hand-authored listing page, linked from every device page and
    /// appended last to the sitemap.
    pub listing_page: String,
    /// Search console verification token emitted as a `<meta>` tag.
    pub google_site_verification: Option<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: "https://openbekeniot.github.io/webapp/".to_string(),
            devices_dir: "devices".to_string(),
            listing_page: "devicesList.html".to_string(),
            google_site_verification: Some(
                "7TndFADSStO2WmhEx0TgZ_o__nVvRwyk8IQeWlbK-4g".to_string(),
            ),
        }
    }
}

/// Static help links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Guide shown in the TuyaMCU warning panel.
    pub tuyamcu_guide: String,
    /// Guide shown in the addressable-LED warning panel.
    pub pixel_anim_guide: String,
    /// Second-locale link used when a device has no wiki link.
    pub forum_fallback: String,
    /// Opened by the "View Templates Tutorial" button.
    pub template_tutorial: String,
    /// Substitution deriving the second-locale link from the wiki link.
    pub locale: LocaleSubstitution,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            tuyamcu_guide: "https://www.elektroda.com/rtvforum/topic4038151.html".to_string(),
            pixel_anim_guide: "https://www.elektroda.com/rtvforum/topic4057187.html".to_string(),
            forum_fallback: "https://www.elektroda.pl/rtvforum/".to_string(),
            template_tutorial: "https://www.youtube.com/watch?v=VDbaLR_0YWs".to_string(),
            locale: LocaleSubstitution::default(),
        }
    }
}

/// Plain substring substitution, applied once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleSubstitution {
    pub from: String,
    pub to: String,
}

impl Default for LocaleSubstitution {
    fn default() -> Self {
        Self {
            from: ".com".to_string(),
            to: ".pl".to_string(),
        }
    }
}

impl LocaleSubstitution {
    /// Replace the first occurrence of `from` with `to`.
    ///
    /// This is a naive textual rewrite: `https://shop.com.example.com/x`
    /// only has its first `.com` replaced.
    pub fn apply(&self, link: &str) -> String {
        link.replacen(&self.from, &self.to, 1)
    }
}

/// Mirror step settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Paths relative to the project root that are never mirrored.
    /// The output directory is always excluded.
    pub exclude: Vec<PathBuf>,
}

/// Page rendering parallelism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel page renderers. `0` means one per CPU
    /// core; larger values are clamped to the core count. Pages are always
    /// written in catalog order regardless of this setting.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_processes: 1 }
    }
}

/// Resolve the effective renderer count from config.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.max_processes {
        0 => cores,
        n => n.min(cores),
    }
}

/// Load config from `site.toml` in the given directory.
///
/// Returns stock defaults when the file does not exist. Rejects unknown
/// keys and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Device Pages Configuration
# ==========================
# Place this file as `site.toml` in the project root.
# All options are optional; the values below are the defaults.

# Catalog document (JSON with a top-level "devices" array), relative to the
# project root. When it is missing the build mirrors the tree and stops.
catalog = "devices.json"

# Publish directory, relative to the project root. It is deleted and
# recreated on every build and is never mirrored into itself.
output_dir = "gh-pages"

# ---------------------------------------------------------------------------
# Site layout
# ---------------------------------------------------------------------------
[site]
# Absolute URL prefix for sitemap entries. Must end with '/'.
base_url = "https://openbekeniot.github.io/webapp/"

# Subdirectory for generated device pages (single directory name).
devices_dir = "devices"

# Hand-authored listing page. Every device page links back to it and it is
# the last sitemap entry.
listing_page = "devicesList.html"

# Search console verification token. Remove the line to omit the tag.
google_site_verification = "7TndFADSStO2WmhEx0TgZ_o__nVvRwyk8IQeWlbK-4g"

# ---------------------------------------------------------------------------
# Help links
# ---------------------------------------------------------------------------
[links]
# Shown when a device keyword mentions TuyaMCU.
tuyamcu_guide = "https://www.elektroda.com/rtvforum/topic4038151.html"

# Shown when a device keyword mentions WS2812 or SM16703.
pixel_anim_guide = "https://www.elektroda.com/rtvforum/topic4057187.html"

# Second-locale link for devices without a wiki link.
forum_fallback = "https://www.elektroda.pl/rtvforum/"

# Opened by the "View Templates Tutorial" button.
template_tutorial = "https://www.youtube.com/watch?v=VDbaLR_0YWs"

# The second-locale link is the wiki link with the first `from` replaced by `to`.
[links.locale]
from = ".com"
to = ".pl"

# ---------------------------------------------------------------------------
# Mirror
# ---------------------------------------------------------------------------
[publish]
# Paths relative to the project root that are never copied, e.g. [".git"].
exclude = []

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Parallel page renderers. 0 = one per CPU core. Output is identical for any
# value; pages are written in catalog order.
max_processes = 1
"##
}
