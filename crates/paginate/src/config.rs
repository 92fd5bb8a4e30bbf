//! Pagination configuration and its ingestion from document metadata.

use crate::PaginationError;
use quire_types::{Margins, Orientation, PageDimensions, PageSize};
use serde::{Deserialize, Serialize};

/// Complete configuration for the pagination core.
///
/// All lengths are points unless the name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub header_height: f32,
    pub footer_height: f32,
    pub reflow_debounce_ms: u64,
    pub widow_lines: usize,
    pub orphan_lines: usize,
    pub default_line_height: f32,
    pub pixels_per_point: f32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::all(72.0),
            header_height: 0.0,
            footer_height: 0.0,
            reflow_debounce_ms: 100,
            widow_lines: 2,
            orphan_lines: 2,
            default_line_height: 14.0,
            pixels_per_point: 96.0 / 72.0,
        }
    }
}

impl PaginationConfig {
    /// Derive the page box. Fails when margins and header/footer bands leave
    /// no positive content area; the caller keeps its previous configuration.
    pub fn derive_dimensions(&self) -> Result<PageDimensions, PaginationError> {
        Ok(PageDimensions::compute(
            self.page_size,
            self.orientation,
            &self.margins,
            self.header_height,
            self.footer_height,
        )?)
    }

    /// Apply a patch, returning the merged configuration.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(page_size) = patch.page_size {
            next.page_size = page_size;
        }
        if let Some(orientation) = patch.orientation {
            next.orientation = orientation;
        }
        if let Some(margins) = &patch.margins {
            next.margins = margins.clone();
        }
        if let Some(header_height) = patch.header_height {
            next.header_height = header_height;
        }
        if let Some(footer_height) = patch.footer_height {
            next.footer_height = footer_height;
        }
        if let Some(reflow_debounce_ms) = patch.reflow_debounce_ms {
            next.reflow_debounce_ms = reflow_debounce_ms;
        }
        if let Some(widow_lines) = patch.widow_lines {
            next.widow_lines = widow_lines;
        }
        if let Some(orphan_lines) = patch.orphan_lines {
            next.orphan_lines = orphan_lines;
        }
        if let Some(default_line_height) = patch.default_line_height {
            next.default_line_height = default_line_height;
        }
        if let Some(pixels_per_point) = patch.pixels_per_point {
            next.pixels_per_point = pixels_per_point;
        }
        next
    }

    /// Build a configuration from a document metadata record, starting from
    /// defaults. A present `header`/`footer` reserves a 36-pt band.
    pub fn from_meta(meta: &DocumentMeta) -> Self {
        let mut config = Self::default();
        if let Some(page_size) = meta.page_size {
            config.page_size = page_size;
        }
        if let Some(orientation) = meta.orientation {
            config.orientation = orientation;
        }
        if let Some(margins) = &meta.margins {
            config.margins = margins.clone();
        }
        config.header_height = if meta.header.is_some() { 36.0 } else { 0.0 };
        config.footer_height = if meta.footer.is_some() { 36.0 } else { 0.0 };
        config
    }
}

/// Partial configuration used by `set_config`; `None` fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub page_size: Option<PageSize>,
    pub orientation: Option<Orientation>,
    pub margins: Option<Margins>,
    pub header_height: Option<f32>,
    pub footer_height: Option<f32>,
    pub reflow_debounce_ms: Option<u64>,
    pub widow_lines: Option<usize>,
    pub orphan_lines: Option<usize>,
    pub default_line_height: Option<f32>,
    pub pixels_per_point: Option<f32>,
}

/// Page-related fields of a document's metadata record (typically parsed
/// from frontmatter by the markdown layer).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMeta {
    pub page_size: Option<PageSize>,
    pub orientation: Option<Orientation>,
    pub margins: Option<Margins>,
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl DocumentMeta {
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.orientation, Orientation::Portrait);
        assert_eq!(config.margins, Margins::all(72.0));
        assert_eq!(config.reflow_debounce_ms, 100);
        assert_eq!(config.widow_lines, 2);
        assert_eq!(config.orphan_lines, 2);
        assert_eq!(config.default_line_height, 14.0);
        assert!((config.pixels_per_point - 1.3333334).abs() < 1e-6);
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = PaginationConfig::default();
        let merged = base.merged(&ConfigPatch {
            page_size: Some(PageSize::Letter),
            reflow_debounce_ms: Some(50),
            ..ConfigPatch::default()
        });
        assert_eq!(merged.page_size, PageSize::Letter);
        assert_eq!(merged.reflow_debounce_ms, 50);
        assert_eq!(merged.margins, base.margins);
        assert_eq!(merged.default_line_height, base.default_line_height);
    }

    #[test]
    fn metadata_header_reserves_a_band() {
        let meta = DocumentMeta::from_value(&json!({
            "pageSize": "letter",
            "orientation": "landscape",
            "margins": "1in",
            "header": "{title}"
        }));
        let config = PaginationConfig::from_meta(&meta);
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.orientation, Orientation::Landscape);
        assert_eq!(config.margins, Margins::all(72.0));
        assert_eq!(config.header_height, 36.0);
        assert_eq!(config.footer_height, 0.0);
    }

    #[test]
    fn malformed_metadata_falls_back_to_defaults() {
        let meta = DocumentMeta::from_value(&json!({"pageSize": 7}));
        let config = PaginationConfig::from_meta(&meta);
        assert_eq!(config.page_size, PageSize::A4);
    }
}
