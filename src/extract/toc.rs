use super::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocExtraction {
    pub entries: Vec<TocEntry>,
    /// `(page, line index within the page)` of every line read as a TOC
    /// entry, duplicates included.
    pub source_lines: BTreeSet<(u32, usize)>,
    pub listed_tables: Vec<TableListing>,
    pub scanned_pages: usize,
}

#[derive(Debug)]
enum Rejection {
    Bounds(ExtractError),
    PageRegression { page: u32, previous: u32 },
    Format(ExtractError),
    Title(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Bounds(error) | Rejection::Format(error) => write!(f, "{error}"),
            Rejection::PageRegression { page, previous } => {
                write!(f, "page {page} regresses behind previous entry on page {previous}")
            }
            Rejection::Title(reason) => write!(f, "title rejected: {reason}"),
        }
    }
}

/// Finds `<id> <title> .... <page>` lines in the leading pages of a document.
#[derive(Debug)]
pub struct TocExtractor {
    line: Regex,
    dot_leader: Regex,
    year: Regex,
    tables: TableLabels,
    page_tolerance: u32,
    reject_year_titles: bool,
}

impl TocExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            line: compile_line_pattern(
                &config.toc_line_pattern,
                "table-of-contents line",
                &["sid", "title", "page"],
            )?,
            dot_leader: Regex::new(r"(?:\.\s*){2,}|…+").context("failed to compile dot leader regex")?,
            year: Regex::new(r"\b(?:19|20)\d{2}\b").context("failed to compile year regex")?,
            tables: TableLabels::new()?,
            page_tolerance: config.page_tolerance,
            reject_year_titles: config.reject_year_titles,
        })
    }

    pub fn normalize_title(&self, raw: &str) -> String {
        normalize_title(raw, &self.dot_leader)
    }

    /// Scans the first `scan_pages` pages. Candidate lines that fail a check
    /// are dropped and counted; this never fails.
    pub fn extract(
        &self,
        pages: &PageText,
        scan_pages: usize,
        diagnostics: &mut Diagnostics,
    ) -> TocExtraction {
        let total_pages = pages.total_pages();
        let window = pages.window(scan_pages);

        let mut extraction = TocExtraction {
            scanned_pages: window.len(),
            ..TocExtraction::default()
        };
        diagnostics.toc_scanned_pages = diagnostics.toc_scanned_pages.max(window.len());

        let mut seen_ids = HashSet::<Identifier>::new();
        let mut seen_tables = HashSet::<String>::new();
        let mut previous_page: Option<u32> = None;

        for page in window {
            for (line_index, line) in page.text.lines().enumerate() {
                if let Some(listing) = self.tables.listing(line) {
                    if seen_tables.insert(listing.label.clone()) {
                        extraction.listed_tables.push(listing);
                    }
                    continue;
                }

                let Some(captures) = self.line.captures(line) else {
                    continue;
                };
                diagnostics.toc_candidates += 1;

                let entry = match self.check_candidate(&captures, total_pages, previous_page) {
                    Ok(entry) => entry,
                    Err(rejection) => {
                        debug!(page = page.number, line = line.trim(), reason = %rejection, "rejected toc candidate");
                        match rejection {
                            Rejection::Bounds(_) => diagnostics.toc_rejected_bounds += 1,
                            Rejection::PageRegression { .. } => {
                                diagnostics.toc_rejected_page_regression += 1
                            }
                            Rejection::Format(_) => diagnostics.toc_rejected_format += 1,
                            Rejection::Title(_) => diagnostics.toc_rejected_title += 1,
                        }
                        continue;
                    }
                };

                extraction.source_lines.insert((page.number, line_index));
                if !seen_ids.insert(entry.identifier.clone()) {
                    diagnostics.toc_duplicates += 1;
                    continue;
                }

                previous_page = Some(entry.page);
                extraction.entries.push(entry);
                diagnostics.toc_accepted += 1;
            }
        }

        extraction
    }

    /// Like [`Self::extract`], but doubles the window while it yields no
    /// entries and `widen` is set. Only the final attempt's counters are kept.
    pub fn extract_widening(
        &self,
        pages: &PageText,
        scan_pages: usize,
        widen: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<TocExtraction, ExtractError> {
        let total = pages.pages().len();
        let mut scan = scan_pages.max(1);
        let mut widenings = 0usize;

        loop {
            let mut attempt = Diagnostics::default();
            let extraction = self.extract(pages, scan, &mut attempt);

            let exhausted = !widen || scan >= total;
            if !extraction.entries.is_empty() || exhausted {
                attempt.toc_window_widenings = widenings;
                diagnostics.merge(attempt);

                if extraction.entries.is_empty() {
                    return Err(ExtractError::ExtractionEmpty {
                        scanned_pages: extraction.scanned_pages,
                    });
                }
                return Ok(extraction);
            }

            scan = scan.saturating_mul(2).min(total);
            widenings += 1;
            info!(scan_pages = scan, "no toc entries found; widening scan window");
        }
    }

    fn check_candidate(
        &self,
        captures: &Captures<'_>,
        total_pages: u32,
        previous_page: Option<u32>,
    ) -> Result<TocEntry, Rejection> {
        let page = capture_str(captures, "page")
            .parse::<u32>()
            .map_err(|_| Rejection::Bounds(ExtractError::Bounds { page: 0, total_pages }))?;
        let page = check_page_bounds(page, total_pages).map_err(Rejection::Bounds)?;

        if let Some(previous) = previous_page {
            if page.saturating_add(self.page_tolerance) < previous {
                return Err(Rejection::PageRegression { page, previous });
            }
        }

        let identifier = Identifier::parse(capture_str(captures, "sid")).map_err(Rejection::Format)?;

        let title = self.normalize_title(capture_str(captures, "title"));
        if title.is_empty() {
            return Err(Rejection::Title("empty title"));
        }
        if !title.chars().any(char::is_alphabetic) {
            return Err(Rejection::Title("no alphabetic characters"));
        }
        if self.reject_year_titles && self.year.is_match(&title) {
            return Err(Rejection::Title("revision history date"));
        }

        Ok(TocEntry {
            identifier,
            title,
            page,
        })
    }
}

fn check_page_bounds(page: u32, total_pages: u32) -> Result<u32, ExtractError> {
    if page < 1 || page > total_pages {
        return Err(ExtractError::Bounds { page, total_pages });
    }
    Ok(page)
}
