//! Per-key display metadata
//!
//! Some merged keys deserve a friendlier name or a unit when records
//! are rendered. The refresh algorithm never consults this table; only
//! presentation code does.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::coordinator::record::coerce_numeric;

/// Display metadata for one composite field key
#[derive(Debug, Clone, Copy)]
pub struct KeyOverride {
    /// Friendly name shown instead of the raw key
    pub name: Option<&'static str>,
    /// Unit suffix
    pub unit: Option<&'static str>,
    /// Whether the value should be rendered as a number
    pub numeric: bool,
}

/// Static lookup table from composite key to display metadata
pub static KEY_OVERRIDES: Lazy<HashMap<&'static str, KeyOverride>> = Lazy::new(|| {
    HashMap::from([(
        "status_progress_progress",
        KeyOverride {
            name: Some("Progress"),
            unit: Some("%"),
            numeric: true,
        },
    )])
});

/// Metadata override for a composite key, if one is registered
pub fn override_for(key: &str) -> Option<&'static KeyOverride> {
    KEY_OVERRIDES.get(key)
}

/// Render one merged field for display, applying overrides
pub fn display_value(key: &str, value: &Value) -> String {
    let meta = override_for(key);
    let rendered = match meta {
        Some(meta) if meta.numeric => coerce_numeric(value)
            .map(|n| n.to_string())
            .unwrap_or_else(|| value.to_string()),
        _ => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };
    match meta.and_then(|m| m.unit) {
        Some(unit) => format!("{rendered}{unit}"),
        None => rendered,
    }
}
