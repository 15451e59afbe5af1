use thiserror::Error;

/// Failures raised by the extraction core.
///
/// Only `InputUnreadable` is fatal for a run. The other variants are raised
/// for a single candidate and absorbed by the stage that produced them,
/// except where a caller requires a well-formed identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid section identifier {input:?}: {reason}")]
    Format { input: String, reason: &'static str },

    #[error("no table of contents entries found within the first {scanned_pages} pages")]
    ExtractionEmpty { scanned_pages: usize },

    #[error("page {page} outside document range 1..={total_pages}")]
    Bounds { page: u32, total_pages: u32 },

    #[error("unable to read page text from {origin}: {reason}")]
    InputUnreadable { origin: String, reason: String },
}

impl ExtractError {
    pub fn format(input: &str, reason: &'static str) -> Self {
        Self::Format {
            input: input.to_string(),
            reason,
        }
    }

    pub fn unreadable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputUnreadable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}
