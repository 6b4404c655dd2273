//! Site assembly: the full build pipeline.
//!
//! ```text
//! 1. Publish   project/      →  gh-pages/            (verbatim mirror)
//! 2. Load      devices.json  →  Catalog              (absent = done, success)
//! 3. Render    Catalog       →  gh-pages/devices/*.html
//! 4. Sitemap   page paths    →  gh-pages/sitemap.xml
//! ```
//!
//! Each device page is independent: it reads the shared catalog (for
//! similarity ranking) and produces one file. Pages are rendered either
//! sequentially or on a rayon pool (`processing.max_processes`), but they
//! are always written in catalog order, so the output is byte-identical
//! either way. That includes duplicate page identifiers: the later device
//! in the catalog overwrites the earlier one, and the collision is
//! reported rather than rejected.
//!
//! Any I/O or parse failure aborts the run; there is no partial success.

use crate::catalog::{self, Catalog, CatalogError};
use crate::config::{self, SiteConfig};
use crate::publish::{self, MirrorReport, PublishError};
use crate::render::{self, PageInput, SimilarDevice};
use crate::similarity;
use crate::sitemap::{self, SITEMAP_FILENAME};
use crate::template::TemplateAdapter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Progress reported while a build runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    Published {
        output: PathBuf,
        mirror: MirrorReport,
    },
    CatalogMissing {
        path: PathBuf,
    },
    CatalogLoaded {
        path: PathBuf,
        devices: usize,
    },
    PageWritten {
        /// 1-based catalog position.
        position: usize,
        title: String,
        path: String,
        similar: usize,
    },
    SitemapWritten {
        path: PathBuf,
        entries: usize,
    },
}

/// The page a device will get, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    /// Canonical identifier, before sanitizing.
    pub identifier: String,
    /// Sanitized identifier; the page file stem.
    pub token: String,
    /// Path relative to the output root, e.g. `devices/Lamp1.html`.
    pub path: String,
    pub similar: Vec<SimilarDevice>,
}

/// Two or more devices sharing one page file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub path: String,
    /// 1-based catalog positions, in catalog order.
    pub positions: Vec<usize>,
}

/// Outcome of a full build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub mirror: MirrorReport,
    /// `false` when no catalog was found and no pages were generated.
    pub catalog_found: bool,
    /// Sitemap paths in order: one per device, then the listing page.
    pub sitemap_paths: Vec<String>,
    /// Devices whose page has a similar-devices panel.
    pub with_similar: usize,
    pub collisions: Vec<Collision>,
}

impl BuildReport {
    /// Device pages written (collisions counted once per device).
    pub fn device_pages(&self) -> usize {
        self.sitemap_paths.len().saturating_sub(1)
    }
}

/// Plan every device page: identifiers, output paths, similarity rankings.
///
/// Pure: reads the catalog, touches no files.
pub fn plan(catalog: &Catalog, adapter: &dyn TemplateAdapter, config: &SiteConfig) -> Vec<PlannedPage> {
    (0..catalog.len())
        .map(|index| plan_one(catalog, index, adapter, config))
        .collect()
}

fn plan_one(
    catalog: &Catalog,
    index: usize,
    adapter: &dyn TemplateAdapter,
    config: &SiteConfig,
) -> PlannedPage {
    let device = &catalog.devices[index];
    let identifier = adapter.page_identifier(device);
    let token = adapter.sanitize(&identifier);
    let similar = similarity::rank(&catalog.devices, index)
        .iter()
        .map(|peer| SimilarDevice::from_match(peer, adapter))
        .collect();
    PlannedPage {
        path: format!("{}/{}.html", config.site.devices_dir, token),
        identifier,
        token,
        similar,
    }
}

/// Page paths produced by more than one device.
pub fn find_collisions(pages: &[PlannedPage]) -> Vec<Collision> {
    let mut by_path: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, page) in pages.iter().enumerate() {
        by_path.entry(&page.path).or_default().push(index + 1);
    }
    let mut collisions: Vec<Collision> = by_path
        .into_iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(path, positions)| Collision {
            path: path.to_string(),
            positions,
        })
        .collect();
    collisions.sort_by_key(|c| c.positions[0]);
    collisions
}

/// Render one planned page to HTML.
fn render_planned(
    catalog: &Catalog,
    index: usize,
    page: &PlannedPage,
    adapter: &dyn TemplateAdapter,
    config: &SiteConfig,
) -> String {
    let device = &catalog.devices[index];
    let description = adapter.describe(device);
    let input = PageInput {
        device,
        token: &page.token,
        description: &description,
        similar: &page.similar,
    };
    render::render_device(&input, config)
}

/// Run the full pipeline: publish, load, render, sitemap.
///
/// `source` is the project root; `output` the publish directory (usually
/// `source/<output_dir>`). Progress events go to `progress` when given.
pub fn build(
    source: &Path,
    output: &Path,
    config: &SiteConfig,
    adapter: &dyn TemplateAdapter,
    progress: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, SiteError> {
    let emit = |event: BuildEvent| {
        if let Some(tx) = &progress {
            tx.send(event).ok();
        }
    };

    let mirror = publish::publish(source, output, &config.publish.exclude)?;
    emit(BuildEvent::Published {
        output: output.to_path_buf(),
        mirror: mirror.clone(),
    });

    let mut report = BuildReport {
        mirror,
        catalog_found: false,
        sitemap_paths: Vec::new(),
        with_similar: 0,
        collisions: Vec::new(),
    };

    let catalog_path = source.join(&config.catalog);
    let Some(catalog) = catalog::load_catalog(&catalog_path)? else {
        emit(BuildEvent::CatalogMissing { path: catalog_path });
        return Ok(report);
    };
    report.catalog_found = true;
    emit(BuildEvent::CatalogLoaded {
        path: catalog_path,
        devices: catalog.len(),
    });

    let devices_dir = output.join(&config.site.devices_dir);
    fs::create_dir_all(&devices_dir)?;

    let pages = plan(&catalog, adapter, config);
    let html = render_all(&catalog, &pages, adapter, config)?;

    for (index, (page, html)) in pages.iter().zip(html).enumerate() {
        fs::write(output.join(&page.path), html)?;
        if !page.similar.is_empty() {
            report.with_similar += 1;
        }
        report.sitemap_paths.push(page.path.clone());
        emit(BuildEvent::PageWritten {
            position: index + 1,
            title: catalog.devices[index]
                .name()
                .unwrap_or_else(|| page.token.clone()),
            path: page.path.clone(),
            similar: page.similar.len(),
        });
    }
    report.collisions = find_collisions(&pages);

    report
        .sitemap_paths
        .push(config.site.listing_page.clone());
    let sitemap_path = output.join(SITEMAP_FILENAME);
    let xml = sitemap::render_sitemap(&config.site.base_url, &report.sitemap_paths);
    fs::write(&sitemap_path, xml)?;
    emit(BuildEvent::SitemapWritten {
        path: sitemap_path,
        entries: report.sitemap_paths.len(),
    });

    Ok(report)
}

/// Render every planned page, in catalog order.
fn render_all(
    catalog: &Catalog,
    pages: &[PlannedPage],
    adapter: &dyn TemplateAdapter,
    config: &SiteConfig,
) -> Result<Vec<String>, SiteError> {
    let threads = config::effective_threads(&config.processing);
    let render = |(index, page): (usize, &PlannedPage)| {
        render_planned(catalog, index, page, adapter, config)
    };
    if threads <= 1 {
        return Ok(pages.iter().enumerate().map(render).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;
    Ok(pool.install(|| pages.par_iter().enumerate().map(render).collect()))
}

/// Result of a dry run over the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub catalog_path: PathBuf,
    /// `None` when the catalog file does not exist.
    pub pages: Option<Vec<PlannedPage>>,
    pub without_pins: usize,
    pub collisions: Vec<Collision>,
}

/// Load the catalog and plan every page without writing anything.
pub fn check(
    source: &Path,
    config: &SiteConfig,
    adapter: &dyn TemplateAdapter,
) -> Result<CheckReport, SiteError> {
    let catalog_path = source.join(&config.catalog);
    let Some(catalog) = catalog::load_catalog(&catalog_path)? else {
        return Ok(CheckReport {
            catalog_path,
            pages: None,
            without_pins: 0,
            collisions: Vec::new(),
        });
    };
    let pages = plan(&catalog, adapter, config);
    Ok(CheckReport {
        catalog_path,
        without_pins: catalog.devices.iter().filter(|d| !d.has_pins()).count(),
        collisions: find_collisions(&pages),
        pages: Some(pages),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::OpenBekenTemplate;
    use crate::test_helpers::{catalog_of, setup_project, write_catalog};
    use serde_json::json;
    use tempfile::TempDir;

    fn build_project(root: &Path) -> BuildReport {
        let config = SiteConfig::default();
        let output = root.join(&config.output_dir);
        build(root, &output, &config, &OpenBekenTemplate, None).unwrap()
    }

    #[test]
    fn plan_assigns_paths_and_rankings() {
        let catalog = catalog_of(vec![
            json!({"name": "Lamp 1", "pins": {"gpio0": "relay"}}),
            json!({"name": "Lamp 2", "pins": {"gpio0": "relay"}}),
        ]);
        let pages = plan(&catalog, &OpenBekenTemplate, &SiteConfig::default());
        assert_eq!(pages[0].identifier, "Lamp 1");
        assert_eq!(pages[0].token, "Lamp_1");
        assert_eq!(pages[0].path, "devices/Lamp_1.html");
        assert_eq!(pages[0].similar.len(), 1);
        assert_eq!(pages[0].similar[0].token, "Lamp_2");
        assert_eq!(pages[0].similar[0].ratio, 1.0);
    }

    #[test]
    fn collisions_detected_in_catalog_order() {
        let catalog = catalog_of(vec![
            json!({"name": "Plug"}),
            json!({"name": "Bulb"}),
            json!({"name": "Plug!"}),
            json!({"name": "Bulb?"}),
            json!({"name": "Unique"}),
        ]);
        let pages = plan(&catalog, &OpenBekenTemplate, &SiteConfig::default());
        assert_eq!(
            find_collisions(&pages),
            vec![
                Collision {
                    path: "devices/Plug.html".to_string(),
                    positions: vec![1, 3]
                },
                Collision {
                    path: "devices/Bulb.html".to_string(),
                    positions: vec![2, 4]
                },
            ]
        );
    }

    #[test]
    fn build_writes_one_page_per_device() {
        let tmp = setup_project();
        let report = build_project(tmp.path());
        let out = tmp.path().join("gh-pages");

        assert!(report.catalog_found);
        assert_eq!(report.device_pages(), 4);
        for path in &report.sitemap_paths[..4] {
            assert!(out.join(path).is_file(), "missing {path}");
        }
        assert_eq!(report.sitemap_paths.last().unwrap(), "devicesList.html");
    }

    #[test]
    fn build_mirrors_project_without_self() {
        let tmp = setup_project();
        build_project(tmp.path());
        let out = tmp.path().join("gh-pages");

        assert!(out.join("index.html").is_file());
        assert!(out.join("devicesList.html").is_file());
        assert!(out.join("css/style.css").is_file());
        assert!(out.join("devices.json").is_file());
        assert!(!out.join("gh-pages").exists());
    }

    #[test]
    fn missing_catalog_is_success_without_pages() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "home").unwrap();
        let report = build_project(tmp.path());

        assert!(!report.catalog_found);
        assert!(report.sitemap_paths.is_empty());
        let out = tmp.path().join("gh-pages");
        assert!(out.join("index.html").is_file());
        assert!(!out.join("devices").exists());
        assert!(!out.join("sitemap.xml").exists());
    }

    #[test]
    fn malformed_catalog_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("devices.json"), "{ not json").unwrap();
        let config = SiteConfig::default();
        let output = tmp.path().join("gh-pages");
        let err = build(tmp.path(), &output, &config, &OpenBekenTemplate, None).unwrap_err();
        assert!(matches!(err, SiteError::Catalog(CatalogError::Malformed { .. })));
    }

    #[test]
    fn sitemap_lists_devices_then_listing_page() {
        let tmp = TempDir::new().unwrap();
        write_catalog(
            tmp.path(),
            &[json!({"name": "B"}), json!({"name": "A"}), json!({})],
        );
        let report = build_project(tmp.path());
        assert_eq!(
            report.sitemap_paths,
            vec![
                "devices/B.html",
                "devices/A.html",
                "devices/device.html",
                "devicesList.html"
            ]
        );
        let xml = fs::read_to_string(tmp.path().join("gh-pages/sitemap.xml")).unwrap();
        assert_eq!(xml.matches("<url>").count(), 4);
    }

    #[test]
    fn duplicate_identifiers_overwrite_in_catalog_order() {
        let tmp = TempDir::new().unwrap();
        write_catalog(
            tmp.path(),
            &[
                json!({"name": "Plug", "vendor": "First"}),
                json!({"name": "Plug", "vendor": "Second"}),
            ],
        );
        let report = build_project(tmp.path());
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].positions, vec![1, 2]);
        // Both devices are still in the sitemap
        assert_eq!(report.sitemap_paths.len(), 3);

        let html = fs::read_to_string(tmp.path().join("gh-pages/devices/Plug.html")).unwrap();
        assert!(html.contains("Second"));
        assert!(!html.contains("First"));
    }

    #[test]
    fn progress_events_in_order() {
        let tmp = TempDir::new().unwrap();
        write_catalog(tmp.path(), &[json!({"name": "Solo"})]);
        let config = SiteConfig::default();
        let output = tmp.path().join("gh-pages");
        let (tx, rx) = std::sync::mpsc::channel();
        build(tmp.path(), &output, &config, &OpenBekenTemplate, Some(tx)).unwrap();

        let events: Vec<BuildEvent> = rx.iter().collect();
        assert!(matches!(events[0], BuildEvent::Published { .. }));
        assert!(matches!(events[1], BuildEvent::CatalogLoaded { devices: 1, .. }));
        assert_eq!(
            events[2],
            BuildEvent::PageWritten {
                position: 1,
                title: "Solo".to_string(),
                path: "devices/Solo.html".to_string(),
                similar: 0
            }
        );
        assert!(matches!(events[3], BuildEvent::SitemapWritten { entries: 2, .. }));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn parallel_rendering_matches_sequential() {
        let tmp = setup_project();
        let mut config = SiteConfig::default();
        let sequential_out = tmp.path().join("gh-pages");
        build(tmp.path(), &sequential_out, &config, &OpenBekenTemplate, None).unwrap();
        let sequential =
            fs::read_to_string(sequential_out.join("devices/Lamp1.html")).unwrap();

        config.processing.max_processes = 0;
        build(tmp.path(), &sequential_out, &config, &OpenBekenTemplate, None).unwrap();
        let parallel = fs::read_to_string(sequential_out.join("devices/Lamp1.html")).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn check_reports_without_writing() {
        let tmp = setup_project();
        let report = check(tmp.path(), &SiteConfig::default(), &OpenBekenTemplate).unwrap();
        let pages = report.pages.unwrap();
        assert_eq!(pages.len(), 4);
        assert_eq!(report.without_pins, 1);
        assert!(report.collisions.is_empty());
        assert!(!tmp.path().join("gh-pages").exists());
    }

    #[test]
    fn check_without_catalog() {
        let tmp = TempDir::new().unwrap();
        let report = check(tmp.path(), &SiteConfig::default(), &OpenBekenTemplate).unwrap();
        assert!(report.pages.is_none());
    }
}
