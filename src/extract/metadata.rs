use super::*;

pub const DEFAULT_DOC_TITLE: &str = "Untitled Specification";

const TITLE_SCAN_LINES: usize = 40;
const TITLE_MAX_LINES: usize = 3;
const REVISION_SCAN_PAGES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub doc_title: String,
    pub revision: Option<String>,
    pub total_pages: u32,
}

#[derive(Debug)]
pub struct MetadataExtractor {
    revision: Regex,
    page_label: Regex,
}

impl MetadataExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            revision: Regex::new(
                r"(?i)\b(Rev(?:ision)?\.?\s*[0-9][\w.\-]*(?:\s*,?\s*Version\s*[0-9][\w.\-]*)?)",
            )
            .context("failed to compile revision regex")?,
            page_label: Regex::new(r"(?i)^(?:page\s+)?[0-9ivxlcdm]{1,8}$")
                .context("failed to compile page label regex")?,
        })
    }

    /// Title precedence: explicit override, the source's own metadata title,
    /// the opening lines of page 1, then [`DEFAULT_DOC_TITLE`].
    pub fn extract(
        &self,
        pages: &PageText,
        title_hint: Option<&str>,
        title_override: Option<&str>,
    ) -> DocumentMetadata {
        let detected = || {
            pages
                .pages()
                .first()
                .and_then(|page| self.title_from_text(&page.text))
        };

        let doc_title = title_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| {
                title_hint
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(ToOwned::to_owned)
            })
            .or_else(detected)
            .unwrap_or_else(|| DEFAULT_DOC_TITLE.to_string());

        let revision = self.revision_in(&doc_title).or_else(|| {
            pages
                .window(REVISION_SCAN_PAGES)
                .iter()
                .find_map(|page| self.revision_in(&page.text))
        });

        DocumentMetadata {
            doc_title,
            revision,
            total_pages: pages.total_pages(),
        }
    }

    pub fn revision_in(&self, text: &str) -> Option<String> {
        self.revision
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|value| {
                value
                    .as_str()
                    .split_whitespace()
                    .collect::<Vec<&str>>()
                    .join(" ")
                    .trim_end_matches(['.', '-'])
                    .to_string()
            })
    }

    fn title_from_text(&self, text: &str) -> Option<String> {
        let mut parts = Vec::<&str>::new();

        for raw in text.lines().take(TITLE_SCAN_LINES) {
            let line = raw.trim();
            if line.is_empty() {
                if parts.is_empty() {
                    continue;
                }
                break;
            }

            let title_like = self.is_title_line(line);
            if parts.is_empty() {
                if title_like {
                    parts.push(line);
                }
                continue;
            }

            if !title_like || parts.len() == TITLE_MAX_LINES {
                break;
            }
            parts.push(line);
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn is_title_line(&self, line: &str) -> bool {
        let alphabetic = line.chars().filter(|ch| ch.is_alphabetic()).count();
        alphabetic >= 3
            && line.chars().count() <= 160
            && !line.ends_with('.')
            && !self.page_label.is_match(line)
            && !self.revision.find(line).is_some_and(|found| found.start() == 0)
            && !line.to_ascii_lowercase().starts_with("copyright")
    }
}
