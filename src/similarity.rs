//! Pin-assignment similarity between devices.
//!
//! Two devices are similar when they wire the same functions to the same
//! pins. The ratio is
//!
//! ```text
//! matches / max(|pins(a)|, |pins(b)|)
//! ```
//!
//! where a match is a pin both devices define with an equal value. The
//! denominator is the larger mapping's key count, not the union size:
//! `{p1: X}` against `{p1: X, p2: Y}` scores 1/2, and so does
//! `{p1: X, p3: Z}` against `{p1: X, p2: Y}`.

use crate::catalog::{self, Device, PinMap};

/// Most similar devices listed per page.
pub const MAX_SIMILAR: usize = 5;

/// A ranked peer of some target device.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    /// Catalog position of the peer.
    pub index: usize,
    pub device: &'a Device,
    /// Overlap ratio in `(0, 1]`.
    pub ratio: f64,
}

/// Fraction of matching pin assignments between two pin mappings.
///
/// Returns 0 when either mapping is absent or both are empty. Unset values
/// (`null`, `""`, `0`, `false`) never match but still count toward their
/// mapping's size.
pub fn score(target: Option<&PinMap>, candidate: Option<&PinMap>) -> f64 {
    let (Some(target), Some(candidate)) = (target, candidate) else {
        return 0.0;
    };
    let total = target.len().max(candidate.len());
    if total == 0 {
        return 0.0;
    }
    // Keys present on one side only can never match, so walking one side
    // covers every matching key of the union.
    let matches = target
        .iter()
        .filter(|(pin, value)| {
            catalog::is_truthy(value)
                && candidate.get(pin.as_str()).is_some_and(|other| other == *value)
        })
        .count();
    matches as f64 / total as f64
}

/// Up to [`MAX_SIMILAR`] devices most similar to `catalog[target]`.
///
/// Candidates are every other catalog position with a non-empty pin
/// mapping. Zero scores are dropped, the rest are sorted by descending
/// ratio; ties keep catalog order.
pub fn rank(catalog: &[Device], target: usize) -> Vec<Match<'_>> {
    let Some(target_pins) = catalog.get(target).and_then(Device::pins) else {
        return Vec::new();
    };
    if target_pins.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match<'_>> = catalog
        .iter()
        .enumerate()
        .filter(|(index, device)| *index != target && device.has_pins())
        .filter_map(|(index, device)| {
            let ratio = score(Some(target_pins), device.pins());
            (ratio > 0.0).then_some(Match {
                index,
                device,
                ratio,
            })
        })
        .collect();

    // sort_by is stable: equal ratios stay in catalog order.
    matches.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    matches.truncate(MAX_SIMILAR);
    matches
}
