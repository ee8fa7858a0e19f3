//! # Capability Profiles
//!
//! A capability profile says what one printer model can do: which
//! commands it understands, which codepages it offers at which `ESC t`
//! index, how wide its paper is and which fonts it has.
//!
//! Profiles come from a JSON [`CapabilityDatabase`] and may `inherit` from
//! another profile. [`CapabilityDatabase::resolve`] flattens the chain into
//! one immutable [`CapabilityProfile`]:
//!
//! | Field | Merge rule |
//! |-------|------------|
//! | `features` | entry by entry, child wins |
//! | `colors` | entry by entry, child wins |
//! | `media` | field by field, child wins |
//! | `codePages` | replaced wholesale if the child has any |
//! | `fonts` | replaced wholesale if the child has any |
//!
//! ## Example
//!
//! ```
//! use escpos_forge::profile::CapabilityDatabase;
//!
//! let db = CapabilityDatabase::builtin().unwrap();
//! let profile = db.resolve("TM-T88V").unwrap();
//!
//! assert!(profile.supports("bitImageRaster"));
//! assert_eq!(profile.media_width_px(), Some(512));
//! ```

mod database;

pub use database::CapabilityDatabase;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codepage::CodepageTable;
use crate::error::{EscposError, Result};

/// Resolution used when a profile gives neither a DPI nor a usable width.
pub const DEFAULT_DPI: u32 = 180;

/// Printable margin subtracted from the paper width when deriving DPI.
const PAPER_MARGIN_MM: f32 = 10.0;

/// Value of one entry in a profile's `features` map.
///
/// Most features are booleans; a few vendors use strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Text(String),
}

impl FeatureValue {
    /// Whether this value switches the feature on.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
        }
    }
}

/// Paper dimensions and resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Media {
    pub width_mm: Option<f32>,
    pub width_px: Option<u32>,
    pub dpi: Option<u32>,
    /// Tallest image fragment the printer accepts in one command
    pub max_rows_per_command: Option<u32>,
}

impl Media {
    /// Overlay `other` on `self`, keeping fields `other` leaves unset.
    fn merge(&mut self, other: &Media) {
        self.width_mm = other.width_mm.or(self.width_mm);
        self.width_px = other.width_px.or(self.width_px);
        self.dpi = other.dpi.or(self.dpi);
        self.max_rows_per_command = other.max_rows_per_command.or(self.max_rows_per_command);
    }
}

/// One character font of a printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    /// Characters per line at this font on the default paper
    pub columns: u32,
}

/// A fully resolved printer profile.
///
/// Immutable once built. Share it between sessions behind an
/// [`Arc`](std::sync::Arc), as [`CapabilityDatabase::resolve`] returns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityProfile {
    id: String,
    name: Option<String>,
    vendor: Option<String>,
    notes: Option<String>,
    features: BTreeMap<String, FeatureValue>,
    code_pages: CodepageTable,
    media: Media,
    colors: BTreeMap<String, String>,
    fonts: BTreeMap<u8, FontSpec>,
}

impl CapabilityProfile {
    /// Profile identifier, the key it has in the database.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the identifier.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Whether the printer declares `feature` as enabled.
    ///
    /// Unknown features are unsupported.
    pub fn supports(&self, feature: &str) -> bool {
        self.features.get(feature).is_some_and(FeatureValue::is_enabled)
    }

    /// Raw value of a feature flag.
    pub fn feature(&self, feature: &str) -> Option<&FeatureValue> {
        self.features.get(feature)
    }

    pub fn features(&self) -> &BTreeMap<String, FeatureValue> {
        &self.features
    }

    /// The codepages this printer offers, in search priority order.
    pub fn codepage_table(&self) -> &CodepageTable {
        &self.code_pages
    }

    /// Codepages as a `name -> ESC t index` map.
    ///
    /// When a name is declared at several indices, the lowest wins.
    pub fn code_pages(&self) -> BTreeMap<&str, u8> {
        let mut map = BTreeMap::new();
        for entry in self.code_pages.entries().iter().rev() {
            map.insert(entry.name.as_str(), entry.id);
        }
        map
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    /// Printable width in dots, if the profile knows it.
    pub fn media_width_px(&self) -> Option<u32> {
        self.media.width_px
    }

    /// Printer resolution.
    ///
    /// Uses `media.dpi` when given, otherwise derives it from the pixel and
    /// millimetre widths (minus a 10mm margin), otherwise [`DEFAULT_DPI`].
    pub fn dpi(&self) -> u32 {
        if let Some(dpi) = self.media.dpi {
            return dpi;
        }
        match (self.media.width_px, self.media.width_mm) {
            (Some(px), Some(mm)) if mm > PAPER_MARGIN_MM => {
                (px as f32 / ((mm - PAPER_MARGIN_MM) / 25.4)) as u32
            }
            _ => DEFAULT_DPI,
        }
    }

    pub fn colors(&self) -> &BTreeMap<String, String> {
        &self.colors
    }

    pub fn fonts(&self) -> &BTreeMap<u8, FontSpec> {
        &self.fonts
    }

    /// Resolve a font name or index to its `ESC M` value.
    ///
    /// Accepts `"a"`/`"b"` (case-insensitive) or a decimal index. Fails with
    /// [`EscposError::NotSupported`] if the profile has no such font.
    pub fn font(&self, font: &str) -> Result<u8> {
        let index = match font.trim().to_ascii_lowercase().as_str() {
            "a" => Some(0),
            "b" => Some(1),
            other => other.parse::<u8>().ok(),
        };
        index
            .filter(|i| self.fonts.contains_key(i))
            .ok_or_else(|| {
                EscposError::NotSupported(format!(
                    "\"{}\" is not a valid font in profile {}",
                    font, self.id
                ))
            })
    }

    /// Characters per line for a font.
    pub fn columns(&self, font: &str) -> Result<u32> {
        let index = self.font(font)?;
        self.fonts
            .get(&index)
            .map(|f| f.columns)
            .ok_or_else(|| EscposError::NotSupported(format!("font {index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(json: &str) -> std::sync::Arc<CapabilityProfile> {
        let db = CapabilityDatabase::from_json_str(json).unwrap();
        db.resolve("p").unwrap()
    }

    #[test]
    fn test_feature_values() {
        let p = profile(
            r#"{"p": {"features": {"a": true, "b": false, "c": "yes", "d": ""}}}"#,
        );
        assert!(p.supports("a"));
        assert!(!p.supports("b"));
        assert!(p.supports("c"));
        assert!(!p.supports("d"));
        assert!(!p.supports("missing"));
    }

    #[test]
    fn test_code_pages_by_name() {
        let p = profile(r#"{"p": {"codePages": {"0": "CP437", "16": "CP1252", "40": "CP437"}}}"#);
        let pages = p.code_pages();
        assert_eq!(pages.get("CP437"), Some(&0));
        assert_eq!(pages.get("CP1252"), Some(&16));
    }

    #[test]
    fn test_font_lookup() {
        let p = profile(
            r#"{"p": {"fonts": {
                "0": {"name": "Font A", "columns": 42},
                "1": {"name": "Font B", "columns": 56}
            }}}"#,
        );
        assert_eq!(p.font("a").unwrap(), 0);
        assert_eq!(p.font("B").unwrap(), 1);
        assert_eq!(p.font("1").unwrap(), 1);
        assert_eq!(p.columns("b").unwrap(), 56);
        assert!(matches!(p.font("c"), Err(EscposError::NotSupported(_))));
        assert!(matches!(p.font("2"), Err(EscposError::NotSupported(_))));
    }

    #[test]
    fn test_dpi_explicit() {
        let p = profile(r#"{"p": {"media": {"dpi": 203, "width": {"mm": 80, "pixels": 576}}}}"#);
        assert_eq!(p.dpi(), 203);
    }

    #[test]
    fn test_dpi_derived_from_width() {
        // 512 px over (80 - 10) mm
        let p = profile(r#"{"p": {"media": {"width": {"mm": 80, "pixels": 512}}}}"#);
        assert_eq!(p.dpi(), 185);
    }

    #[test]
    fn test_dpi_fallback() {
        let p = profile(r#"{"p": {"media": {"width": {"mm": 80, "pixels": "Unknown"}}}}"#);
        assert_eq!(p.media_width_px(), None);
        assert_eq!(p.dpi(), DEFAULT_DPI);
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let p = profile(r#"{"p": {}}"#);
        assert_eq!(p.name(), "p");
        assert_eq!(p.vendor(), None);
    }
}
