use std::fs;

use super::manifest::render_extract_command;
use super::*;
use crate::util::read_jsonl;

const DUMP: &str = concat!(
    "Widget Protocol Specification\nRevision 1.2\n",
    "\u{000C}Contents\n1 Overview ........ 3\n1.1 Goals ........ 3\n1.3 Limits ........ 4\n2 Messages ........ 4\nList of Tables\nTable 2-1 Header Fields ........ 4\n",
    "\u{000C}1 Overview\nThe overview.\n1.1 Goals\nGoal text.\n",
    "\u{000C}1.3 Limits\nLimit text.\n2 Messages\nTable 2-1 Header Fields\nrows\n",
);

fn args_for(dir: &Path, text: PathBuf) -> ExtractArgs {
    ExtractArgs {
        text: Some(text),
        output_dir: dir.join("out"),
        manifest_path: Some(dir.join("out").join("manifest.json")),
        ..ExtractArgs::default()
    }
}

fn load_manifest(path: &Path) -> ExtractRunManifest {
    let raw = fs::read(path).expect("manifest written");
    serde_json::from_slice(&raw).expect("manifest parses")
}

#[test]
fn extract_writes_every_artifact() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dump = dir.path().join("spec.txt");
    fs::write(&dump, DUMP).expect("write dump");
    let args = args_for(dir.path(), dump);
    let paths = OutputPaths::new(&args.output_dir);
    let manifest_path = args.manifest_path.clone().expect("manifest path");

    run(args).expect("extract succeeds");

    let metadata: Vec<MetadataRecord> = read_jsonl(&paths.metadata).expect("metadata");
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].doc_title, "Widget Protocol Specification");
    assert_eq!(metadata[0].revision.as_deref(), Some("Revision 1.2"));
    assert_eq!(metadata[0].total_pages, 4);
    assert_eq!(metadata[0].source_sha256.len(), 64);

    let toc: Vec<TocRecord> = read_jsonl(&paths.toc).expect("toc");
    let toc_ids = toc.iter().map(|record| record.section_id.to_string()).collect::<Vec<_>>();
    assert_eq!(toc_ids, vec!["1", "1.1", "1.3", "2"]);
    assert_eq!(toc[1].full_path, "1.1 Goals");

    let listed: Vec<TableListingRecord> = read_jsonl(&paths.listed_tables).expect("listed tables");
    assert_eq!(listed, vec![TableListingRecord { label: "2-1".to_string(), page: 4 }]);

    let sections: Vec<SectionRecord> = read_jsonl(&paths.sections).expect("sections");
    assert_eq!(sections.len(), 4);
    assert_eq!(sections[0].page, 3);
    assert_eq!(sections[0].content, "The overview.");
    assert_eq!(sections[3].content, "Table 2-1 Header Fields\nrows");
    assert_eq!(sections[3].tags, vec!["table"]);

    let report: ReportDocument =
        serde_json::from_slice(&fs::read(&paths.report).expect("report written")).expect("report parses");
    assert!(report.report.missing_in_spec.is_empty());
    assert!(report.report.extra_in_spec.is_empty());
    assert_eq!(report.report.gaps.toc.len(), 1);
    assert_eq!(report.report.gaps.toc[0].missing[0].to_string(), "1.2");
    assert_eq!(report.report.table_count_delta.delta, 0);

    let manifest = load_manifest(&manifest_path);
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.failed_step, None);
    assert_eq!(
        manifest.completed_steps,
        vec!["prepare", "read-pages", "metadata", "toc", "sections", "reconcile"]
    );
    assert_eq!(manifest.counts.sections, 4);
    assert_eq!(manifest.counts.total_pages, 4);
    assert_eq!(manifest.counts.extracted_pages, 4);
    assert_eq!(manifest.counts.toc_gaps, 1);
    assert_eq!(manifest.diagnostics.heading_skipped_toc_lines, 4);
    assert_eq!(manifest.diagnostics.toc_accepted, 4);
}

#[test]
fn unreadable_input_fails_with_manifest() {
    let dir = tempfile::tempdir().expect("temp dir");
    let args = args_for(dir.path(), dir.path().join("missing.txt"));
    let paths = OutputPaths::new(&args.output_dir);
    let manifest_path = args.manifest_path.clone().expect("manifest path");

    let error = run(args).expect_err("missing input aborts");
    assert!(format!("{error:#}").contains("failed to read page text"));

    let manifest = load_manifest(&manifest_path);
    assert_eq!(manifest.status, "failed");
    assert_eq!(manifest.failed_step.as_deref(), Some("read-pages"));
    assert_eq!(manifest.completed_steps, vec!["prepare"]);
    assert!(!paths.metadata.exists());
}

#[test]
fn invalid_pattern_override_aborts_before_reading() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dump = dir.path().join("spec.txt");
    fs::write(&dump, DUMP).expect("write dump");
    let mut args = args_for(dir.path(), dump);
    args.heading_line_pattern = Some(r"^(?P<title>.+)$".to_string());
    let manifest_path = args.manifest_path.clone().expect("manifest path");

    let error = run(args).expect_err("pattern lacks sid group");
    assert!(error.to_string().contains("missing named group `sid`"));

    let manifest = load_manifest(&manifest_path);
    assert_eq!(manifest.failed_step.as_deref(), Some("prepare"));
    assert!(manifest.completed_steps.is_empty());
}

#[test]
fn document_without_toc_still_produces_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dump = dir.path().join("notes.txt");
    fs::write(&dump, "Meeting Notes\n\u{000C}1 Agenda\nitems\n").expect("write dump");
    let args = args_for(dir.path(), dump);
    let paths = OutputPaths::new(&args.output_dir);
    let manifest_path = args.manifest_path.clone().expect("manifest path");

    run(args).expect("empty toc is not fatal");

    let toc: Vec<TocRecord> = read_jsonl(&paths.toc).expect("toc");
    let sections: Vec<SectionRecord> = read_jsonl(&paths.sections).expect("sections");
    assert!(toc.is_empty());
    assert!(sections.is_empty());
    assert!(paths.report.exists());

    let manifest = load_manifest(&manifest_path);
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.warnings.len(), 1);
    assert!(manifest.warnings[0].contains("no table of contents entries"));
}

#[test]
fn rendered_command_reflects_overrides() {
    let args = ExtractArgs {
        pdf: Some(PathBuf::from("docs/spec.pdf")),
        output_dir: PathBuf::from(".cache/specindex"),
        toc_scan_pages: Some(40),
        no_widen_toc_window: true,
        doc_title: Some("Widget Spec".to_string()),
        ..ExtractArgs::default()
    };

    assert_eq!(
        render_extract_command(&args),
        "specindex extract --pdf docs/spec.pdf --output-dir .cache/specindex --toc-scan-pages 40 --no-widen-toc-window --doc-title 'Widget Spec'"
    );
}
