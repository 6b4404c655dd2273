//! # Device Pages
//!
//! A static page generator for IoT device catalogs. A project directory
//! (hand-written HTML, CSS, scripts, and a `devices.json` catalog) is turned
//! into a deployable site: the project is mirrored verbatim, every catalog
//! device gets its own page, and a sitemap lists them all.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Publish   project/      →  gh-pages/                (verbatim mirror)
//! 2. Load      devices.json  →  Catalog                  (absent = no pages)
//! 3. Render    Catalog       →  gh-pages/devices/*.html  (one page per device)
//! 4. Sitemap   page paths    →  gh-pages/sitemap.xml
//! ```
//!
//! Each device page shows the device's metadata, its raw JSON template, a
//! description of its pin assignments, further-reading links, and up to five
//! devices with the most similar pin assignments.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`publish`] | Stage 1: deletes and recreates the publish directory, mirrors the project into it |
//! | [`catalog`] | Stage 2: loads `devices.json`, lenient accessors over raw device records |
//! | [`render`] | Stage 3: builds a [`render::DevicePage`] per device and renders it with Maud |
//! | [`sitemap`] | Stage 4: `sitemap.xml` generation |
//! | [`site`] | Runs the stages in order; planning, collision detection, progress events |
//! | [`similarity`] | Pin-assignment overlap ratio and top-five ranking |
//! | [`template`] | [`template::TemplateAdapter`] seam: pin descriptions and page identifiers |
//! | [`naming`] | Page identifier fallback chain and filename sanitizing |
//! | [`config`] | `site.toml` loading, defaults, and validation |
//! | [`output`] | CLI output formatting, pure `format_*` functions plus `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Raw Records, Lenient Accessors
//!
//! Catalog records are kept as raw JSON (key order preserved) instead of a
//! typed struct. Real catalogs are hand-edited and inconsistent: fields go
//! missing, hold `null`, or change type. Every accessor treats a missing or
//! falsy value as absent and every page still renders, with `N/A` in place of
//! absent values. The raw record is also what the page shows as the copyable
//! template, so it has to round-trip as written.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a build error, and every interpolated catalog value is escaped.
//!
//! ## Deterministic Output
//!
//! Pages may render on a rayon pool, but files are written in catalog order
//! and similarity ties keep catalog order. Two builds of the same project
//! produce byte-identical output.

pub mod catalog;
pub mod config;
pub mod naming;
pub mod output;
pub mod publish;
pub mod render;
pub mod similarity;
pub mod site;
pub mod sitemap;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
