use super::*;

/// A `Table N-M ... <page>` row from a "List of Tables" in the front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableListing {
    pub label: String,
    pub page: u32,
}

/// Table and figure labels, as listed in front matter or captioned in body
/// text. Labels are the numeric part only (`6-1`, `3.2`).
#[derive(Debug)]
pub struct TableLabels {
    listing: Regex,
    caption: Regex,
    figure_caption: Regex,
}

impl TableLabels {
    pub fn new() -> Result<Self> {
        Ok(Self {
            listing: Regex::new(
                r"^[ \t]*Table\s+(?P<label>\d+(?:[-.]\d+)*)\b.*[\s.…](?P<page>\d{1,4})\s*$",
            )
            .context("failed to compile table listing regex")?,
            caption: Regex::new(r"(?m)^[ \t]*Table\s+(?P<label>\d+(?:[-.]\d+)*)\b")
                .context("failed to compile table caption regex")?,
            figure_caption: Regex::new(r"(?m)^[ \t]*Figure\s+\d+(?:[-.]\d+)*\b")
                .context("failed to compile figure caption regex")?,
        })
    }

    pub fn listing(&self, line: &str) -> Option<TableListing> {
        let captures = self.listing.captures(line)?;
        let page = capture_str(&captures, "page").parse::<u32>().ok()?;
        Some(TableListing {
            label: capture_str(&captures, "label").to_string(),
            page,
        })
    }

    /// Distinct caption labels in `text`, in order of first appearance.
    pub fn caption_labels(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::<&str>::new();
        self.caption
            .captures_iter(text)
            .filter_map(|captures| captures.name("label"))
            .map(|label| label.as_str())
            .filter(|label| seen.insert(label))
            .map(ToOwned::to_owned)
            .collect()
    }

    pub fn has_figure_caption(&self, text: &str) -> bool {
        self.figure_caption.is_match(text)
    }
}
