//! Shared test utilities for the device-pages test suite.
//!
//! Builds catalog values from `json!` literals and sets up isolated copies
//! of the fixture project.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project();
//! let catalog = catalog_of(vec![json!({"name": "Lamp", "pins": {"6": "Rel;0"}})]);
//! let lamp = find_device(&catalog, "Lamp");
//! ```

use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

use crate::catalog::{Catalog, Device};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `devices.json` with the given records into `root`.
pub fn write_catalog(root: &Path, devices: &[Value]) {
    let doc = json!({ "devices": devices });
    std::fs::write(
        root.join("devices.json"),
        serde_json::to_string_pretty(&doc).unwrap(),
    )
    .unwrap();
}

// =========================================================================
// Catalog construction
// =========================================================================

pub fn device(record: Value) -> Device {
    Device::from(record)
}

pub fn catalog_of(records: Vec<Value>) -> Catalog {
    Catalog {
        devices: records.into_iter().map(Device::from).collect(),
    }
}

/// Find a device by name. Panics if not found.
pub fn find_device<'a>(catalog: &'a Catalog, name: &str) -> &'a Device {
    catalog
        .devices
        .iter()
        .find(|d| d.name().as_deref() == Some(name))
        .unwrap_or_else(|| {
            let names: Vec<Option<String>> = catalog.devices.iter().map(Device::name).collect();
            panic!("device '{name}' not found. Available: {names:?}")
        })
}
