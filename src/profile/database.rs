//! Capability database loading and inheritance resolution.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{CapabilityProfile, FeatureValue, FontSpec, Media};
use crate::codepage::CodepageTable;
use crate::error::{EscposError, Result};

const BUILTIN_JSON: &str = include_str!("../../data/capabilities.json");

// ============================================================================
// RAW JSON SHAPE
// ============================================================================

/// One profile exactly as written in the database, before inheritance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    inherits: Option<String>,
    name: Option<String>,
    vendor: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    features: BTreeMap<String, FeatureValue>,
    code_pages: Option<BTreeMap<u8, String>>,
    #[serde(default)]
    media: RawMedia,
    #[serde(default)]
    colors: BTreeMap<String, String>,
    fonts: Option<BTreeMap<u8, FontSpec>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMedia {
    #[serde(default)]
    width: RawWidth,
    #[serde(default, deserialize_with = "known_number")]
    dpi: Option<f64>,
    #[serde(default, deserialize_with = "known_number")]
    max_rows_per_command: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawWidth {
    #[serde(default, deserialize_with = "known_number")]
    mm: Option<f64>,
    #[serde(default, deserialize_with = "known_number")]
    pixels: Option<f64>,
}

impl RawMedia {
    fn to_media(&self) -> Media {
        let positive = |v: Option<f64>| v.filter(|n| *n > 0.0);
        Media {
            width_mm: positive(self.width.mm).map(|n| n as f32),
            width_px: positive(self.width.pixels).map(|n| n as u32),
            dpi: positive(self.dpi).map(|n| n as u32),
            max_rows_per_command: positive(self.max_rows_per_command).map(|n| n as u32),
        }
    }
}

/// Numeric media fields may be written as `"Unknown"`; those become `None`.
fn known_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Measure {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Measure>::deserialize(deserializer)? {
        Some(Measure::Number(n)) => Some(n),
        Some(Measure::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// ============================================================================
// DATABASE
// ============================================================================

/// A set of named printer profiles with a resolution cache.
///
/// Resolution results are cached per identifier for the lifetime of the
/// database. The cache sits behind a lock, so one database can be shared
/// between threads.
#[derive(Debug, Default)]
pub struct CapabilityDatabase {
    profiles: HashMap<String, RawProfile>,
    cache: RwLock<HashMap<String, Arc<CapabilityProfile>>>,
}

impl CapabilityDatabase {
    /// Parse a database from JSON text.
    ///
    /// Accepts either `{"<id>": {...}, ...}` or the collated
    /// `{"profiles": {...}, "encodings": {...}}` form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a database from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        let profiles = match value {
            Value::Object(mut map) if map.get("profiles").is_some_and(Value::is_object) => {
                map.remove("profiles").unwrap_or_default()
            }
            other => other,
        };
        let profiles: HashMap<String, RawProfile> = serde_json::from_value(profiles)?;
        tracing::debug!(count = profiles.len(), "loaded capability database");

        Ok(Self {
            profiles,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The small database embedded in the crate.
    ///
    /// Holds `default`, `simple`, `TM-T88V`, `TM-U220` and `TM-P80`.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_JSON)
    }

    /// Whether `id` names a profile in this database.
    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// All profile identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve `id` and its `inherits` chain into a flat profile.
    ///
    /// # Errors
    ///
    /// - [`EscposError::ProfileNotFound`] if `id` or any ancestor is missing
    /// - [`EscposError::ProfileCycle`] if the chain loops, with the looping path
    pub fn resolve(&self, id: &str) -> Result<Arc<CapabilityProfile>> {
        if let Some(hit) = self.cached(id) {
            tracing::debug!(profile = id, "profile cache hit");
            return Ok(hit);
        }

        let mut path = Vec::new();
        let profile = Arc::new(self.build(id, &mut path)?);
        tracing::debug!(
            profile = id,
            features = profile.features.len(),
            code_pages = profile.code_pages.entries().len(),
            "resolved profile"
        );

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(id.to_string()).or_insert(profile)))
    }

    fn cached(&self, id: &str) -> Option<Arc<CapabilityProfile>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(id).cloned()
    }

    /// Resolve parents first, then overlay `id` on top. `path` holds the
    /// identifiers currently being resolved.
    fn build(&self, id: &str, path: &mut Vec<String>) -> Result<CapabilityProfile> {
        if path.iter().any(|p| p == id) {
            path.push(id.to_string());
            return Err(EscposError::ProfileCycle(path.clone()));
        }
        let raw = self
            .profiles
            .get(id)
            .ok_or_else(|| EscposError::ProfileNotFound(id.to_string()))?;

        path.push(id.to_string());
        let mut profile = match &raw.inherits {
            Some(parent) => match self.cached(parent) {
                Some(hit) => CapabilityProfile::clone(&hit),
                None => self.build(parent, path)?,
            },
            None => CapabilityProfile::default(),
        };
        path.pop();

        overlay(&mut profile, id, raw);
        Ok(profile)
    }
}

fn overlay(profile: &mut CapabilityProfile, id: &str, raw: &RawProfile) {
    profile.id = id.to_string();
    // Name and notes describe one model and are not inherited
    profile.name = raw.name.clone();
    profile.vendor = raw.vendor.clone().or(profile.vendor.take());
    profile.notes = raw.notes.clone();

    profile
        .features
        .extend(raw.features.iter().map(|(k, v)| (k.clone(), v.clone())));
    profile
        .colors
        .extend(raw.colors.iter().map(|(k, v)| (k.clone(), v.clone())));
    profile.media.merge(&raw.media.to_media());

    if let Some(pages) = raw.code_pages.as_ref().filter(|p| !p.is_empty()) {
        let table = CodepageTable::new(pages.iter().map(|(id, name)| (*id, name.as_str())));
        for entry in table.entries().iter().filter(|e| e.codepage.is_none()) {
            tracing::debug!(profile = id, id = entry.id, name = %entry.name, "codepage has no table");
        }
        profile.code_pages = table;
    }
    if let Some(fonts) = raw.fonts.as_ref().filter(|f| !f.is_empty()) {
        profile.fonts = fonts.clone();
    }
}
