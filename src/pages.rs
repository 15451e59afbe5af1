//! Page-indexed plain text, and the sources that produce it.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// Ordered, immutable page text for one document. Page numbers start at 1.
///
/// `total_pages` is the document's page count, which exceeds the number of
/// pages held when the text was extracted with a page limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pages: Vec<Page>,
    document_pages: u32,
}

impl PageText {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Page {
                number: (index + 1) as u32,
                text: text.into(),
            })
            .collect::<Vec<Page>>();
        let document_pages = pages.len() as u32;
        Self {
            pages,
            document_pages,
        }
    }

    /// Records the page count of the whole document; never below the pages held.
    pub fn with_document_pages(mut self, document_pages: u32) -> Self {
        self.document_pages = document_pages.max(self.extracted_pages());
        self
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn total_pages(&self) -> u32 {
        self.document_pages
    }

    pub fn extracted_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn is_truncated(&self) -> bool {
        self.extracted_pages() < self.document_pages
    }

    /// The leading `limit` pages.
    pub fn window(&self, limit: usize) -> &[Page] {
        &self.pages[..limit.min(self.pages.len())]
    }
}

/// Collaborator that turns a source document into page text.
pub trait PageSource {
    fn describe(&self) -> String;

    fn pages(&self) -> Result<PageText, ExtractError>;

    fn page_count(&self) -> Result<u32, ExtractError> {
        Ok(self.pages()?.total_pages())
    }

    /// Title carried by the document's own metadata, if the source has any.
    fn title_hint(&self) -> Option<String> {
        None
    }
}

/// Page text from `pdftotext` (poppler), one page per form feed.
#[derive(Debug, Clone)]
pub struct PdftotextSource {
    path: PathBuf,
    max_pages: Option<usize>,
}

impl PdftotextSource {
    pub fn new(path: impl Into<PathBuf>, max_pages: Option<usize>) -> Self {
        Self {
            path: path.into(),
            max_pages,
        }
    }

    fn pdfinfo(&self) -> Option<String> {
        match Command::new("pdfinfo").arg(&self.path).output() {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "pdfinfo unavailable");
                None
            }
        }
    }
}

impl PageSource for PdftotextSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn pages(&self) -> Result<PageText, ExtractError> {
        let mut command = Command::new("pdftotext");
        command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
        if let Some(max_pages) = self.max_pages {
            command.arg("-l").arg(max_pages.to_string());
        }
        command.arg(&self.path).arg("-");

        let output = command.output().map_err(|error| {
            ExtractError::unreadable(self.describe(), format!("failed to execute pdftotext: {error}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::unreadable(
                self.describe(),
                format!("pdftotext returned non-zero exit status: {}", stderr.trim()),
            ));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&raw);
        if pages.is_empty() {
            return Err(ExtractError::unreadable(self.describe(), "no pages extracted"));
        }

        debug!(path = %self.path.display(), pages = pages.len(), "extracted page text");
        let page_text = PageText::new(pages);
        if self.max_pages.is_none() {
            return Ok(page_text);
        }

        match self.pdfinfo().as_deref().and_then(pdfinfo_page_count) {
            Some(document_pages) => Ok(page_text.with_document_pages(document_pages)),
            None => {
                warn!(
                    path = %self.path.display(),
                    pages = page_text.extracted_pages(),
                    "document page count unknown; using the extracted page count"
                );
                Ok(page_text)
            }
        }
    }

    fn page_count(&self) -> Result<u32, ExtractError> {
        if let Some(count) = self.pdfinfo().as_deref().and_then(pdfinfo_page_count) {
            return Ok(count);
        }
        Ok(self.pages()?.total_pages())
    }

    fn title_hint(&self) -> Option<String> {
        self.pdfinfo()
            .as_deref()
            .and_then(|info| pdfinfo_field(info, "Title"))
    }
}

fn pdfinfo_field(info: &str, key: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix(':'))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn pdfinfo_page_count(info: &str) -> Option<u32> {
    pdfinfo_field(info, "Pages")?.parse::<u32>().ok()
}

/// Page text from a UTF-8 file of form-feed separated pages, e.g. a saved
/// `pdftotext` dump.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for TextFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn pages(&self) -> Result<PageText, ExtractError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|error| ExtractError::unreadable(self.describe(), error.to_string()))?;

        let pages = split_pages(&raw);
        if pages.is_empty() {
            return Err(ExtractError::unreadable(self.describe(), "no pages in text dump"));
        }

        Ok(PageText::new(pages))
    }
}

/// Every form feed ends a page, so only the chunk after the last one is
/// dropped when blank; blank pages before it are real pages.
fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    if pages.last().is_some_and(|last_page| last_page.trim().is_empty()) {
        pages.pop();
    }

    pages
}

/// All pages joined into one string, with the offset where each page begins.
#[derive(Debug, Clone)]
pub struct DocumentText {
    text: String,
    page_starts: Vec<(usize, u32)>,
}

impl DocumentText {
    pub fn from_pages(pages: &PageText) -> Self {
        let mut text = String::new();
        let mut page_starts = Vec::with_capacity(pages.pages().len());

        for page in pages.pages() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            page_starts.push((text.len(), page.number));
            text.push_str(&page.text);
        }

        Self { text, page_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Page containing byte `offset`.
    pub fn page_at(&self, offset: usize) -> u32 {
        let index = self
            .page_starts
            .partition_point(|(start, _)| *start <= offset);
        if index == 0 {
            return self.page_starts.first().map(|(_, page)| *page).unwrap_or(1);
        }
        self.page_starts[index - 1].1
    }

    /// Lines with their starting byte offset; the line text excludes the
    /// terminator, the returned end offset includes it.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str, usize)> {
        let mut offset = 0usize;
        self.text.split_inclusive('\n').map(move |raw| {
            let start = offset;
            offset += raw.len();
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            (start, line, offset)
        })
    }
}
