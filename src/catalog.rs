//! Device catalog loading and lenient field access.
//!
//! The catalog is a single JSON document with a top-level `devices` array:
//!
//! ```json
//! {
//!   "devices": [
//!     {
//!       "name": "Tuya Smart Plug",
//!       "model": "SP-01",
//!       "vendor": "Tuya",
//!       "chip": "BK7231N",
//!       "board": "CB2S",
//!       "keywords": ["plug", "TuyaMCU"],
//!       "bDetailed": "1",
//!       "pins": { "6": "Rel;0", "24": "Btn;0" }
//!     }
//!   ]
//! }
//! ```
//!
//! Every device field is optional and nothing is validated. A [`Device`]
//! keeps the record exactly as it was read (key order included) so the raw
//! template block on its page is a faithful copy, and exposes typed
//! accessors that treat missing, `null`, empty, or falsy values as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pin role → pin function, as declared by a device record.
pub type PinMap = Map<String, Value>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The full, ordered device list for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub devices: Vec<Device>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// One device record, held verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device {
    record: Value,
}

impl From<Value> for Device {
    fn from(record: Value) -> Self {
        Self { record }
    }
}

impl Device {
    fn field(&self, key: &str) -> Option<&Value> {
        self.record.as_object().and_then(|fields| fields.get(key))
    }

    /// A field rendered as display text, or `None` when it is absent or
    /// falsy (`null`, `false`, `0`, `""`).
    pub fn text(&self, key: &str) -> Option<String> {
        self.field(key).and_then(display_text)
    }

    pub fn name(&self) -> Option<String> {
        self.text("name")
    }

    pub fn model(&self) -> Option<String> {
        self.text("model")
    }

    pub fn vendor(&self) -> Option<String> {
        self.text("vendor")
    }

    pub fn chip(&self) -> Option<String> {
        self.text("chip")
    }

    pub fn board(&self) -> Option<String> {
        self.text("board")
    }

    pub fn image(&self) -> Option<String> {
        self.text("image")
    }

    pub fn wiki(&self) -> Option<String> {
        self.text("wiki")
    }

    pub fn product(&self) -> Option<String> {
        self.text("product")
    }

    /// Keywords in declared order. A non-array `keywords` field yields none.
    pub fn keywords(&self) -> Vec<String> {
        match self.field("keywords") {
            Some(Value::Array(items)) => items.iter().filter_map(display_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Keywords as shown on the page: every entry joined with `", "`, with
    /// `null` entries kept as empty slots (`["a", null, "b"]` → `"a, , b"`).
    pub fn keywords_text(&self) -> String {
        match self.field("keywords") {
            Some(Value::Array(items)) => items
                .iter()
                .map(join_text)
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        }
    }

    /// True when any keyword contains `needle`, ignoring ASCII case.
    pub fn has_keyword_containing(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.keywords()
            .iter()
            .any(|k| k.to_ascii_lowercase().contains(&needle))
    }

    /// Whether the record carries a detailed flashing guide (`bDetailed`
    /// is truthy: `true`, `"1"`, `1`, ...).
    pub fn is_detailed(&self) -> bool {
        self.field("bDetailed").is_some_and(is_truthy)
    }

    /// `bDetailed` as written, for display.
    pub fn detailed_label(&self) -> Option<String> {
        self.text("bDetailed")
    }

    /// Pin mapping, when `pins` is an object.
    pub fn pins(&self) -> Option<&PinMap> {
        self.field("pins").and_then(Value::as_object)
    }

    /// True when the device declares at least one pin.
    pub fn has_pins(&self) -> bool {
        self.pins().is_some_and(|pins| !pins.is_empty())
    }

    /// The record pretty-printed with two-space indentation, as shown in
    /// the copyable template block.
    pub fn raw_template(&self) -> String {
        serde_json::to_string_pretty(&self.record).unwrap_or_else(|_| self.record.to_string())
    }
}

/// Whether a value counts as set: not `null`, `false`, `0`, or `""`.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of one list entry. Nested arrays join with `,`; objects print as JSON.
fn join_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn display_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(_) => Some("true".to_string()),
        _ => None,
    }
}

/// Parse a catalog document from a string.
///
/// `origin` is only used to label the error.
pub fn parse_catalog(content: &str, origin: &Path) -> Result<Catalog, CatalogError> {
    serde_json::from_str(content).map_err(|source| CatalogError::Malformed {
        path: origin.to_path_buf(),
        source,
    })
}

/// Load the catalog at `path`.
///
/// Returns `Ok(None)` if the file does not exist: an absent catalog means
/// there are no device pages to build, which is not an error. A file that
/// exists but is not a valid catalog is fatal.
pub fn load_catalog(path: &Path) -> Result<Option<Catalog>, CatalogError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    parse_catalog(&content, path).map(Some)
}
