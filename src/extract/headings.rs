use super::*;

#[derive(Debug)]
struct HeadingMatch {
    identifier: Identifier,
    title: String,
    line_start: usize,
    content_start: usize,
}

/// Finds whole-line `<id> <title>` headings in body text and slices the text
/// between consecutive headings into section content.
///
/// Only identifiers listed in the table of contents become sections. Numbered
/// list items and equation lines share the heading shape, and requiring TOC
/// membership removes nearly all of them; a section the TOC omits cannot be
/// recovered.
#[derive(Debug)]
pub struct HeadingExtractor {
    line: Regex,
    toc_line: Regex,
    dot_leader: Regex,
    tables: TableLabels,
    max_title_chars: usize,
}

impl HeadingExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            line: compile_line_pattern(&config.heading_line_pattern, "heading line", &["sid", "title"])?,
            toc_line: Regex::new(r"(?:\.\s*){3,}\d+\s*$")
                .context("failed to compile table-of-contents line regex")?,
            dot_leader: Regex::new(r"(?:\.\s*){2,}|…+").context("failed to compile dot leader regex")?,
            tables: TableLabels::new()?,
            max_title_chars: config.max_heading_title_chars,
        })
    }

    /// Lines listed in `skip_lines` as `(page, line index within the page)`
    /// were read as TOC entries and are not candidates.
    pub fn extract(
        &self,
        pages: &PageText,
        toc_entries: &[TocEntry],
        skip_lines: &BTreeSet<(u32, usize)>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SectionEntry> {
        let document = DocumentText::from_pages(pages);
        let toc_ids = toc_entries
            .iter()
            .map(|entry| &entry.identifier)
            .collect::<HashSet<&Identifier>>();

        let mut matches = Vec::<HeadingMatch>::new();
        let mut position = (0u32, 0usize);
        for (line_start, line, line_end) in document.lines() {
            let page = document.page_at(line_start);
            position = if page == position.0 {
                (page, position.1 + 1)
            } else {
                (page, 0)
            };

            let Some(captures) = self.line.captures(line) else {
                continue;
            };
            diagnostics.heading_candidates += 1;

            if skip_lines.contains(&position) {
                diagnostics.heading_skipped_toc_lines += 1;
                continue;
            }
            if self.toc_line.is_match(line) {
                diagnostics.heading_rejected_toc_style += 1;
                continue;
            }

            let Ok(identifier) = Identifier::parse(capture_str(&captures, "sid")) else {
                diagnostics.heading_rejected_format += 1;
                continue;
            };

            let title = normalize_title(capture_str(&captures, "title"), &self.dot_leader);
            if title.is_empty() || title.chars().count() > self.max_title_chars {
                diagnostics.heading_rejected_title += 1;
                continue;
            }

            if !toc_ids.contains(&identifier) {
                diagnostics.heading_rejected_not_in_toc += 1;
                continue;
            }

            matches.push(HeadingMatch {
                identifier,
                title,
                line_start,
                content_start: line_end,
            });
        }

        matches.sort_by_key(|heading| heading.line_start);

        let mut seen = HashSet::<Identifier>::new();
        matches.retain(|heading| {
            if seen.insert(heading.identifier.clone()) {
                return true;
            }
            debug!(
                section_id = %heading.identifier,
                offset = heading.line_start,
                "dropping repeated heading"
            );
            diagnostics.heading_duplicates += 1;
            false
        });

        let text = document.as_str();
        let mut sections = Vec::with_capacity(matches.len());
        for (index, heading) in matches.iter().enumerate() {
            let content_end = matches
                .get(index + 1)
                .map(|next| next.line_start)
                .unwrap_or(text.len());
            let content = text[heading.content_start..content_end].trim().to_string();

            let table_labels = self.tables.caption_labels(&content);
            let tags = self.derive_tags(&content, &table_labels);

            sections.push(SectionEntry {
                identifier: heading.identifier.clone(),
                title: heading.title.clone(),
                start_page: document.page_at(heading.line_start),
                content,
                tags,
                table_labels,
            });
        }

        diagnostics.heading_accepted += sections.len();
        sections
    }

    fn derive_tags(&self, content: &str, table_labels: &[String]) -> Vec<String> {
        let mut tags = Vec::new();
        if content.is_empty() {
            tags.push("empty".to_string());
        }
        if !table_labels.is_empty() {
            tags.push("table".to_string());
        }
        if self.tables.has_figure_caption(content) {
            tags.push("figure".to_string());
        }
        tags
    }
}
