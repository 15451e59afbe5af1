use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::ExtractArgs;

/// `<id> <title> [dot leader] <page>` anchored to end of line.
pub const DEFAULT_TOC_LINE_PATTERN: &str =
    r"^\s*(?P<sid>\d+(?:\.\d+)*)\s+(?P<title>\S.*?)(?:\s*(?:\.\s*){2,}|\s*…+\s*|\s+)(?P<page>\d{1,4})\s*$";

/// `<id> <title>` occupying a whole line.
pub const DEFAULT_HEADING_LINE_PATTERN: &str = r"^\s*(?P<sid>\d+(?:\.\d+)*)\s+(?P<title>\S.*?)\s*$";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    pub toc_scan_pages: usize,
    pub widen_toc_window: bool,
    pub page_tolerance: u32,
    pub toc_line_pattern: String,
    pub heading_line_pattern: String,
    pub max_heading_title_chars: usize,
    pub reject_year_titles: bool,
    pub doc_title: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            toc_scan_pages: 120,
            widen_toc_window: true,
            page_tolerance: 5,
            toc_line_pattern: DEFAULT_TOC_LINE_PATTERN.to_string(),
            heading_line_pattern: DEFAULT_HEADING_LINE_PATTERN.to_string(),
            max_heading_title_chars: 140,
            reject_year_titles: true,
            doc_title: None,
        }
    }
}

impl ExtractConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(path = %path.display(), "loaded extract config");
        Ok(config)
    }

    /// CLI flags win over file values.
    pub fn apply_overrides(&mut self, args: &ExtractArgs) {
        if let Some(value) = args.toc_scan_pages {
            self.toc_scan_pages = value;
        }
        if args.no_widen_toc_window {
            self.widen_toc_window = false;
        }
        if let Some(value) = args.page_tolerance {
            self.page_tolerance = value;
        }
        if let Some(value) = &args.toc_line_pattern {
            self.toc_line_pattern = value.clone();
        }
        if let Some(value) = &args.heading_line_pattern {
            self.heading_line_pattern = value.clone();
        }
        if let Some(value) = args.max_heading_title_chars {
            self.max_heading_title_chars = value;
        }
        if args.allow_year_titles {
            self.reject_year_titles = false;
        }
        if let Some(value) = &args.doc_title {
            self.doc_title = Some(value.clone());
        }
    }
}
