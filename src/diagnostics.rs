use serde::{Deserialize, Serialize};

/// Counters for candidates dropped by the extraction heuristics.
///
/// Threaded `&mut` through every stage of a run and written into the run
/// manifest; there is no process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnostics {
    pub toc_scanned_pages: usize,
    pub toc_window_widenings: usize,
    pub toc_candidates: usize,
    pub toc_accepted: usize,
    pub toc_rejected_bounds: usize,
    pub toc_rejected_page_regression: usize,
    pub toc_rejected_format: usize,
    pub toc_rejected_title: usize,
    pub toc_duplicates: usize,
    pub heading_candidates: usize,
    pub heading_accepted: usize,
    pub heading_rejected_not_in_toc: usize,
    pub heading_rejected_toc_style: usize,
    pub heading_rejected_title: usize,
    pub heading_rejected_format: usize,
    pub heading_skipped_toc_lines: usize,
    pub heading_duplicates: usize,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Adds `other`'s counters into `self`. Page-window sizes take the max.
    pub fn merge(&mut self, other: Diagnostics) {
        self.toc_scanned_pages = self.toc_scanned_pages.max(other.toc_scanned_pages);
        self.toc_window_widenings += other.toc_window_widenings;
        self.toc_candidates += other.toc_candidates;
        self.toc_accepted += other.toc_accepted;
        self.toc_rejected_bounds += other.toc_rejected_bounds;
        self.toc_rejected_page_regression += other.toc_rejected_page_regression;
        self.toc_rejected_format += other.toc_rejected_format;
        self.toc_rejected_title += other.toc_rejected_title;
        self.toc_duplicates += other.toc_duplicates;
        self.heading_candidates += other.heading_candidates;
        self.heading_accepted += other.heading_accepted;
        self.heading_rejected_not_in_toc += other.heading_rejected_not_in_toc;
        self.heading_rejected_toc_style += other.heading_rejected_toc_style;
        self.heading_rejected_title += other.heading_rejected_title;
        self.heading_rejected_format += other.heading_rejected_format;
        self.heading_skipped_toc_lines += other.heading_skipped_toc_lines;
        self.heading_duplicates += other.heading_duplicates;
        self.warnings.extend(other.warnings);
    }

    pub fn toc_rejected_total(&self) -> usize {
        self.toc_rejected_bounds
            + self.toc_rejected_page_regression
            + self.toc_rejected_format
            + self.toc_rejected_title
            + self.toc_duplicates
    }

    pub fn heading_rejected_total(&self) -> usize {
        self.heading_rejected_not_in_toc
            + self.heading_rejected_toc_style
            + self.heading_rejected_title
            + self.heading_rejected_format
            + self.heading_skipped_toc_lines
            + self.heading_duplicates
    }
}
