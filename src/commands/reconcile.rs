use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ReconcileArgs;
use crate::commands::OutputPaths;
use crate::extract::{SectionEntry, TocEntry};
use crate::model::{MetadataRecord, ReportDocument, SectionRecord, TableListingRecord, TocRecord};
use crate::reconcile::reconcile;
use crate::util::{now_utc_string, read_jsonl, write_json_pretty};

/// Recomputes the discrepancy report from the records of an earlier extract.
pub fn run(args: ReconcileArgs) -> Result<()> {
    let paths = OutputPaths::new(&args.output_dir);
    let report_path = args.report_path.clone().unwrap_or_else(|| paths.report.clone());

    info!(output_dir = %paths.output_dir.display(), "reconcile requested");

    let toc_records: Vec<TocRecord> = read_jsonl(&paths.toc).context("failed to load TOC records")?;
    let section_records: Vec<SectionRecord> =
        read_jsonl(&paths.sections).context("failed to load section records")?;

    let inconsistent = toc_records
        .iter()
        .filter(|record| !record.parent_consistent())
        .count()
        + section_records
            .iter()
            .filter(|record| !record.parent_consistent())
            .count();
    if inconsistent > 0 {
        warn!(
            records = inconsistent,
            "stored parent_id disagrees with section_id; using the derived parent"
        );
    }

    let metadata = if paths.metadata.exists() {
        read_jsonl::<MetadataRecord>(&paths.metadata)
            .context("failed to load metadata record")?
            .into_iter()
            .next()
    } else {
        warn!(path = %paths.metadata.display(), "metadata record missing");
        None
    };

    let Some(total_pages) = args
        .total_pages
        .or_else(|| metadata.as_ref().map(|record| record.total_pages))
    else {
        bail!(
            "total page count unknown: {} has no record and --total-pages was not given",
            paths.metadata.display()
        );
    };

    let listed_tables = if paths.listed_tables.exists() {
        read_jsonl::<TableListingRecord>(&paths.listed_tables)
            .context("failed to load listed tables")?
            .into_iter()
            .map(|record| record.label)
            .collect::<Vec<String>>()
    } else {
        Vec::new()
    };

    let doc_title = metadata
        .map(|record| record.doc_title)
        .or_else(|| toc_records.first().map(|record| record.doc_title.clone()))
        .unwrap_or_default();

    let toc = toc_records
        .into_iter()
        .map(TocRecord::into_entry)
        .collect::<Vec<TocEntry>>();
    let sections = section_records
        .into_iter()
        .map(SectionRecord::into_entry)
        .collect::<Vec<SectionEntry>>();

    let report = reconcile(&toc, &sections, total_pages, &listed_tables);
    info!(
        toc_entries = report.toc_total,
        sections = report.section_total,
        missing = report.missing_in_spec.len(),
        extra = report.extra_in_spec.len(),
        toc_gaps = report.gaps.toc.len(),
        clean = report.is_clean(),
        "reconciled records"
    );

    let document = ReportDocument {
        generated_at: now_utc_string(),
        doc_title,
        report,
    };
    write_json_pretty(&report_path, &document)?;
    info!(path = %report_path.display(), "wrote discrepancy report");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::util::write_jsonl;

    fn toc_line(section_id: &str, page: u32) -> String {
        format!(
            r#"{{"doc_title":"Doc","section_id":"{section_id}","title":"T","page":{page},"level":1,"parent_id":null,"full_path":"{section_id} T","tags":[]}}"#
        )
    }

    fn section_line(section_id: &str, page: u32) -> String {
        format!(
            r#"{{"doc_title":"Doc","section_id":"{section_id}","title":"T","page":{page},"level":1,"parent_id":null,"full_path":"{section_id} T","content":"","tags":["empty"]}}"#
        )
    }

    fn write_lines(path: &Path, lines: &[String]) {
        fs::write(path, lines.join("\n")).expect("write fixture");
    }

    fn args(dir: &Path, total_pages: Option<u32>) -> ReconcileArgs {
        ReconcileArgs {
            output_dir: dir.to_path_buf(),
            report_path: None,
            total_pages,
        }
    }

    #[test]
    fn reconcile_rebuilds_report_from_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = OutputPaths::new(dir.path());
        write_lines(&paths.toc, &[toc_line("1", 1), toc_line("3", 2), toc_line("2", 3)]);
        write_lines(&paths.sections, &[section_line("1", 1), section_line("3", 9)]);
        let metadata = MetadataRecord {
            doc_title: "Doc".to_string(),
            revision: None,
            total_pages: 5,
            extraction_timestamp: "2026-01-01T00:00:00Z".to_string(),
            source_file: "doc.txt".to_string(),
            source_sha256: String::new(),
        };
        write_jsonl(&paths.metadata, [&metadata]).expect("write metadata");

        run(args(dir.path(), None)).expect("reconcile succeeds");

        let document: ReportDocument =
            serde_json::from_slice(&fs::read(&paths.report).expect("report")).expect("parse report");
        assert_eq!(document.doc_title, "Doc");
        assert_eq!(document.report.missing_in_spec.len(), 1);
        assert_eq!(document.report.order_mismatches.len(), 1);
        assert_eq!(document.report.page_bound_violations.len(), 1);
        assert_eq!(document.report.page_bound_violations[0].page, 9);
    }

    #[test]
    fn malformed_identifier_in_records_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = OutputPaths::new(dir.path());
        write_lines(&paths.toc, &[toc_line("1", 1), toc_line("2.x", 2)]);
        write_lines(&paths.sections, &[section_line("1", 1)]);

        let error = run(args(dir.path(), Some(3))).expect_err("2.x is not an identifier");
        let chain = format!("{error:#}");
        assert!(chain.contains("failed to load TOC records"));
        assert!(chain.contains("line 2"));
    }

    #[test]
    fn missing_page_count_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = OutputPaths::new(dir.path());
        write_lines(&paths.toc, &[toc_line("1", 1)]);
        write_lines(&paths.sections, &[section_line("1", 1)]);

        let error = run(args(dir.path(), None)).expect_err("no metadata and no flag");
        assert!(error.to_string().contains("total page count unknown"));
    }
}
