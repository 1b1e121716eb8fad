//! Version tag resolution and display labels
//!
//! Workshop items are tagged with a numeric game version (`0.17`, `0.18`,
//! `1.0`). Requests name versions either as a dotted version (`v1.0`) or as a
//! two-digit alpha/beta era (`A17`, `beta 18`).

use std::fmt;

/// Tolerance used when comparing versions against the display thresholds
pub const EPSILON: f64 = 1.0 / 1000.0;

/// First version rendered as a beta instead of an alpha
const BETA_THRESHOLD: f64 = 0.18;

/// First version rendered verbatim
const RELEASE_THRESHOLD: f64 = 1.0;

/// A resolved version tag
#[derive(Debug, Clone, PartialEq)]
pub enum VersionTag {
    /// Explicit dotted version, kept verbatim
    Dotted(String),
    /// Two-digit era number mapped to `digits / 100`
    Era(f64),
    /// No version in the request; the configured current version
    Current(String),
}

impl VersionTag {
    /// Tag string as the catalog expects it
    pub fn as_tag(&self) -> String {
        match self {
            VersionTag::Dotted(version) | VersionTag::Current(version) => version.clone(),
            VersionTag::Era(value) => format_version(*value),
        }
    }

    /// Numeric value of the tag, if it has one
    pub fn value(&self) -> Option<f64> {
        match self {
            VersionTag::Dotted(version) | VersionTag::Current(version) => {
                version.trim().parse().ok()
            }
            VersionTag::Era(value) => Some(*value),
        }
    }

    /// Human readable label (`A17`, `B18`, `1.0`), `None` for non-numeric tags
    pub fn display_alpha(&self) -> Option<String> {
        self.value().map(display_alpha)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_tag())
    }
}

/// Resolves version captures into tags
#[derive(Debug, Clone)]
pub struct TagResolver {
    current_version: String,
}

impl TagResolver {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Resolve a tag from the optional era digits and dotted version of a match.
    ///
    /// Precedence is dotted version, then era digits, then the current version.
    /// Captures that do not parse are treated as absent.
    pub fn resolve(&self, era_digits: Option<&str>, dotted_version: Option<&str>) -> VersionTag {
        if let Some(version) = dotted_version.map(str::trim).filter(|v| !v.is_empty()) {
            return VersionTag::Dotted(version.to_string());
        }

        if let Some(digits) = era_digits.and_then(|d| d.trim().parse::<u32>().ok()) {
            return VersionTag::Era(f64::from(digits) / 100.0);
        }

        self.current()
    }

    /// The configured current version as a tag
    pub fn current(&self) -> VersionTag {
        VersionTag::Current(self.current_version.clone())
    }
}

/// Label a numeric version for display.
///
/// Thresholds are inclusive within [`EPSILON`] so that values produced by
/// `digits / 100.0` land on the right side of the boundary.
pub fn display_alpha(value: f64) -> String {
    if value >= RELEASE_THRESHOLD - EPSILON {
        return format_version(value);
    }

    let era = value * 100.0;
    if value >= BETA_THRESHOLD - EPSILON {
        format!("B{:.0}", era)
    } else {
        format!("A{:.0}", era)
    }
}

/// Display label for the first numeric tag in a catalog tag list
pub fn tags_to_alpha<S: AsRef<str>>(tags: &[S]) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.as_ref().trim().parse::<f64>().ok())
        .map(display_alpha)
}

/// Shortest decimal form that always carries a fractional part (`1.0`, `0.17`)
fn format_version(value: f64) -> String {
    let formatted = value.to_string();
    if formatted.contains('.') || !value.is_finite() {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}
