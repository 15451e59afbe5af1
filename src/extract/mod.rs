//! Section structure recovered from page text: the printed table of contents,
//! body headings with their content, table listings and document metadata.

use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::config::ExtractConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractError;
use crate::identifier::Identifier;
use crate::pages::{DocumentText, PageText};

mod headings;
mod metadata;
mod tables;
mod toc;

pub use headings::HeadingExtractor;
pub use metadata::{DocumentMetadata, MetadataExtractor};
pub use tables::{TableLabels, TableListing};
pub use toc::{TocExtraction, TocExtractor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub identifier: Identifier,
    pub title: String,
    pub page: u32,
}

impl TocEntry {
    pub fn level(&self) -> usize {
        self.identifier.level()
    }

    pub fn parent_id(&self) -> Option<Identifier> {
        self.identifier.parent()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub identifier: Identifier,
    pub title: String,
    pub start_page: u32,
    pub content: String,
    pub tags: Vec<String>,
    pub table_labels: Vec<String>,
}

impl SectionEntry {
    pub fn level(&self) -> usize {
        self.identifier.level()
    }

    pub fn parent_id(&self) -> Option<Identifier> {
        self.identifier.parent()
    }
}

fn compile_line_pattern(pattern: &str, what: &str, groups: &[&str]) -> Result<Regex> {
    let regex =
        Regex::new(pattern).with_context(|| format!("failed to compile {what} regex: {pattern}"))?;

    let names = regex.capture_names().flatten().collect::<HashSet<&str>>();
    for group in groups {
        if !names.contains(group) {
            bail!("{what} regex is missing named group `{group}`: {pattern}");
        }
    }

    Ok(regex)
}

fn capture_str<'t>(captures: &Captures<'t>, name: &str) -> &'t str {
    captures.name(name).map(|value| value.as_str()).unwrap_or_default()
}

/// Collapses whitespace and drops dot leaders (`....`, `. . .`, `…`).
fn normalize_title(raw: &str, dot_leader: &Regex) -> String {
    let replaced = dot_leader.replace_all(raw, " ");
    replaced
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim_matches(|ch: char| ch == '.' || ch == ' ')
        .to_string()
}
