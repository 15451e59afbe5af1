use std::path::{Path, PathBuf};

pub mod extract;
pub mod reconcile;
pub mod status;

pub const TOC_FILE: &str = "toc.jsonl";
pub const SECTIONS_FILE: &str = "sections.jsonl";
pub const METADATA_FILE: &str = "metadata.jsonl";
pub const LISTED_TABLES_FILE: &str = "listed_tables.jsonl";
pub const REPORT_FILE: &str = "discrepancy_report.json";
pub const MANIFEST_PREFIX: &str = "extract_run_";

/// Artifact locations inside one output directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub output_dir: PathBuf,
    pub toc: PathBuf,
    pub sections: PathBuf,
    pub metadata: PathBuf,
    pub listed_tables: PathBuf,
    pub report: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            toc: output_dir.join(TOC_FILE),
            sections: output_dir.join(SECTIONS_FILE),
            metadata: output_dir.join(METADATA_FILE),
            listed_tables: output_dir.join(LISTED_TABLES_FILE),
            report: output_dir.join(REPORT_FILE),
        }
    }

    pub fn artifacts(&self) -> [(&'static str, &Path); 5] {
        [
            ("metadata", self.metadata.as_path()),
            ("toc", self.toc.as_path()),
            ("listed_tables", self.listed_tables.as_path()),
            ("sections", self.sections.as_path()),
            ("report", self.report.as_path()),
        ]
    }
}
