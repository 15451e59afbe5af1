use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::commands::{MANIFEST_PREFIX, OutputPaths};
use crate::config::ExtractConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractError;
use crate::extract::{HeadingExtractor, MetadataExtractor, TocExtraction, TocExtractor};
use crate::model::{
    ExtractCounts, ExtractPaths, ExtractRunManifest, MetadataRecord, ReportDocument,
    SectionRecord, TableListingRecord, TocRecord, ToolVersions,
};
use crate::pages::{PageSource, PdftotextSource, TextFileSource};
use crate::reconcile::reconcile;
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
    write_jsonl,
};

const MANIFEST_VERSION: u32 = 1;

mod manifest;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;
