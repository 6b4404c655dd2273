//! Page identifiers for devices.
//!
//! Every device page is named after its device: the canonical identifier is
//! derived from the record, then sanitized into a token that is safe both as
//! a filename and as a relative URL. The same two steps name a device's own
//! page and every link to it from its peers, so they must stay in lockstep.
//!
//! ## Examples
//!
//! - `{"name": "Tuya Smart Plug (EU)"}` → `"Tuya Smart Plug (EU)"` → `"Tuya_Smart_Plug_EU"`
//! - `{"vendor": "Aubess", "model": "WHDZ03"}` → `"Aubess WHDZ03"` → `"Aubess_WHDZ03"`
//! - `{}` → `"device"` → `"device"`

use crate::catalog::Device;

/// Identifier used when a record has no naming fields at all.
pub const FALLBACK_IDENTIFIER: &str = "device";

/// Canonical page identifier for a device.
///
/// The device name when present, otherwise whatever of vendor, model, chip
/// and board is available, space-joined.
pub fn page_name_for_device(device: &Device) -> String {
    if let Some(name) = device.name() {
        return name;
    }
    let parts: Vec<String> = [device.vendor(), device.model(), device.chip(), device.board()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        parts.join(" ")
    }
}

/// Map an identifier to a filesystem- and URL-safe token.
///
/// ASCII letters, digits, `-` and `_` are kept. Every other run of
/// characters collapses into a single `_`, and leading/trailing `_` are
/// trimmed. Never returns an empty string.
pub fn sanitize_filename(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    let mut pending_separator = false;
    for c in identifier.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_separator && !out.is_empty() && !out.ends_with('_') && c != '_' {
                out.push('_');
            }
            pending_separator = false;
            if c == '_' && out.ends_with('_') {
                continue;
            }
            out.push(c);
        } else {
            pending_separator = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::device;
    use serde_json::json;

    #[test]
    fn name_is_identifier() {
        let d = device(json!({"name": "Lamp1", "vendor": "Acme"}));
        assert_eq!(page_name_for_device(&d), "Lamp1");
    }

    #[test]
    fn unnamed_device_uses_vendor_and_model() {
        let d = device(json!({"vendor": "Aubess", "model": "WHDZ03"}));
        assert_eq!(page_name_for_device(&d), "Aubess WHDZ03");
    }

    #[test]
    fn unnamed_device_uses_chip_and_board() {
        let d = device(json!({"chip": "BK7231N", "board": "CB2S"}));
        assert_eq!(page_name_for_device(&d), "BK7231N CB2S");
    }

    #[test]
    fn empty_device_gets_fallback() {
        assert_eq!(page_name_for_device(&device(json!({}))), "device");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("Lamp-1_v2"), "Lamp-1_v2");
    }

    #[test]
    fn sanitize_collapses_unsafe_runs() {
        assert_eq!(sanitize_filename("Tuya Smart Plug (EU)"), "Tuya_Smart_Plug_EU");
        assert_eq!(sanitize_filename("a / b"), "a_b");
        assert_eq!(sanitize_filename("a__b"), "a_b");
    }

    #[test]
    fn sanitize_strips_path_separators() {
        let s = sanitize_filename("../../etc/passwd");
        assert!(!s.contains('/'));
        assert!(!s.contains('.'));
        assert_eq!(s, "etc_passwd");
    }

    #[test]
    fn sanitize_replaces_non_ascii() {
        assert_eq!(sanitize_filename("Żarówka LED"), "ar_wka_LED");
    }

    #[test]
    fn sanitize_never_empty() {
        assert_eq!(sanitize_filename(""), "device");
        assert_eq!(sanitize_filename("!!!"), "device");
    }
}
