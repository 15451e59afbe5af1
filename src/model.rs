use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::extract::{SectionEntry, TableListing, TocEntry};
use crate::identifier::Identifier;
use crate::reconcile::DiscrepancyReport;

fn full_path(identifier: &Identifier, title: &str) -> String {
    format!("{identifier} {title}")
}

/// A stored `parent_id` must be the direct parent of `section_id`, or absent
/// for a top-level identifier.
fn parent_consistent(section_id: &Identifier, parent_id: Option<&Identifier>) -> bool {
    match parent_id {
        Some(parent) => section_id.is_child_of(parent),
        None => section_id.level() == 1,
    }
}

/// One line of `toc.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocRecord {
    pub doc_title: String,
    pub section_id: Identifier,
    pub title: String,
    pub page: u32,
    pub level: usize,
    pub parent_id: Option<Identifier>,
    pub full_path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TocRecord {
    pub fn from_entry(doc_title: &str, entry: &TocEntry) -> Self {
        Self {
            doc_title: doc_title.to_string(),
            section_id: entry.identifier.clone(),
            title: entry.title.clone(),
            page: entry.page,
            level: entry.level(),
            parent_id: entry.parent_id(),
            full_path: full_path(&entry.identifier, &entry.title),
            tags: Vec::new(),
        }
    }

    pub fn parent_consistent(&self) -> bool {
        parent_consistent(&self.section_id, self.parent_id.as_ref())
    }

    /// `level`, `parent_id` and `full_path` are derived, so they are not read back.
    pub fn into_entry(self) -> TocEntry {
        TocEntry {
            identifier: self.section_id,
            title: self.title,
            page: self.page,
        }
    }
}

/// One line of `sections.jsonl`; `page` is the section's start page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub doc_title: String,
    pub section_id: Identifier,
    pub title: String,
    pub page: u32,
    pub level: usize,
    pub parent_id: Option<Identifier>,
    pub full_path: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub table_labels: Vec<String>,
}

impl SectionRecord {
    pub fn from_entry(doc_title: &str, section: &SectionEntry) -> Self {
        Self {
            doc_title: doc_title.to_string(),
            section_id: section.identifier.clone(),
            title: section.title.clone(),
            page: section.start_page,
            level: section.level(),
            parent_id: section.parent_id(),
            full_path: full_path(&section.identifier, &section.title),
            content: section.content.clone(),
            tags: section.tags.clone(),
            table_labels: section.table_labels.clone(),
        }
    }

    pub fn parent_consistent(&self) -> bool {
        parent_consistent(&self.section_id, self.parent_id.as_ref())
    }

    pub fn into_entry(self) -> SectionEntry {
        SectionEntry {
            identifier: self.section_id,
            title: self.title,
            start_page: self.page,
            content: self.content,
            tags: self.tags,
            table_labels: self.table_labels,
        }
    }
}

/// The single line of `metadata.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub doc_title: String,
    pub revision: Option<String>,
    pub total_pages: u32,
    pub extraction_timestamp: String,
    pub source_file: String,
    pub source_sha256: String,
}

/// One line of `listed_tables.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableListingRecord {
    pub label: String,
    pub page: u32,
}

impl From<&TableListing> for TableListingRecord {
    fn from(listing: &TableListing) -> Self {
        Self {
            label: listing.label.clone(),
            page: listing.page,
        }
    }
}

/// `discrepancy_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub generated_at: String,
    pub doc_title: String,
    #[serde(flatten)]
    pub report: DiscrepancyReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
    pub pdfinfo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractPaths {
    pub output_dir: String,
    pub source_path: String,
    pub config_path: Option<String>,
    pub toc_path: String,
    pub sections_path: String,
    pub metadata_path: String,
    pub listed_tables_path: String,
    pub report_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractCounts {
    pub total_pages: u32,
    pub extracted_pages: u32,
    pub toc_entries: usize,
    pub sections: usize,
    pub listed_tables: usize,
    pub missing_in_spec: usize,
    pub extra_in_spec: usize,
    pub order_mismatches: usize,
    pub toc_gaps: usize,
    pub section_gaps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub completed_steps: Vec<String>,
    pub current_step: String,
    pub failed_step: Option<String>,
    pub failure_reason: Option<String>,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub source_sha256: Option<String>,
    pub counts: ExtractCounts,
    pub diagnostics: Diagnostics,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
