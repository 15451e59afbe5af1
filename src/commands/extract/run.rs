use super::manifest::{collect_tool_versions, render_extract_command};
use super::*;

const STEP_PREPARE: &str = "prepare";
const STEP_READ_PAGES: &str = "read-pages";
const STEP_METADATA: &str = "metadata";
const STEP_TOC: &str = "toc";
const STEP_SECTIONS: &str = "sections";
const STEP_RECONCILE: &str = "reconcile";
const STEP_COMPLETE: &str = "complete";

/// Progress of one run, kept outside the pipeline so a failed run still
/// reports how far it got.
#[derive(Debug, Default)]
struct RunState {
    completed_steps: Vec<String>,
    current_step: String,
    source_sha256: Option<String>,
    counts: ExtractCounts,
    diagnostics: Diagnostics,
}

impl RunState {
    fn begin(&mut self, step: &str) {
        self.current_step = step.to_string();
    }

    fn complete(&mut self) {
        self.completed_steps.push(self.current_step.clone());
    }
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let output_dir = args.output_dir.clone();
    ensure_directory(&output_dir)?;
    let paths = OutputPaths::new(&output_dir);
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        output_dir.join(format!(
            "{MANIFEST_PREFIX}{}.json",
            utc_compact_string(started_ts)
        ))
    });

    let (source, source_path) = open_source(&args)?;
    info!(
        source = %source.describe(),
        output_dir = %output_dir.display(),
        run_id = %run_id,
        "starting extract"
    );

    let mut state = RunState::default();
    let outcome = execute(&args, source.as_ref(), &source_path, &paths, &mut state);

    let (status, failed_step, failure_reason) = match &outcome {
        Ok(()) => {
            state.begin(STEP_COMPLETE);
            ("completed", None, None)
        }
        Err(err) => (
            "failed",
            Some(state.current_step.clone()),
            Some(format!("{err:#}")),
        ),
    };

    let warnings = state.diagnostics.warnings.clone();
    let manifest = ExtractRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        completed_steps: state.completed_steps,
        current_step: state.current_step,
        failed_step,
        failure_reason,
        command: render_extract_command(&args),
        tool_versions: collect_tool_versions(args.pdf.is_some()),
        paths: ExtractPaths {
            output_dir: output_dir.display().to_string(),
            source_path: source_path.display().to_string(),
            config_path: args.config.as_ref().map(|path| path.display().to_string()),
            toc_path: paths.toc.display().to_string(),
            sections_path: paths.sections.display().to_string(),
            metadata_path: paths.metadata.display().to_string(),
            listed_tables_path: paths.listed_tables.display().to_string(),
            report_path: paths.report.display().to_string(),
        },
        source_sha256: state.source_sha256,
        counts: state.counts,
        diagnostics: state.diagnostics,
        warnings,
        notes: vec![
            "Sections are limited to identifiers listed in the table of contents.".to_string(),
            "Repeated body headings keep their first occurrence.".to_string(),
        ],
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), status, "wrote extract run manifest");

    outcome
}

fn open_source(args: &ExtractArgs) -> Result<(Box<dyn PageSource>, PathBuf)> {
    if let Some(path) = &args.pdf {
        return Ok((
            Box::new(PdftotextSource::new(path, args.max_pages)),
            path.clone(),
        ));
    }
    if let Some(path) = &args.text {
        return Ok((Box::new(TextFileSource::new(path)), path.clone()));
    }
    bail!("no input given: pass --pdf or --text")
}

fn execute(
    args: &ExtractArgs,
    source: &dyn PageSource,
    source_path: &Path,
    paths: &OutputPaths,
    state: &mut RunState,
) -> Result<()> {
    state.begin(STEP_PREPARE);
    let mut config = ExtractConfig::load(args.config.as_deref())?;
    config.apply_overrides(args);
    let toc_extractor = TocExtractor::new(&config)?;
    let heading_extractor = HeadingExtractor::new(&config)?;
    let metadata_extractor = MetadataExtractor::new()?;
    state.complete();

    state.begin(STEP_READ_PAGES);
    let pages = source
        .pages()
        .with_context(|| format!("failed to read page text from {}", source.describe()))?;
    let source_sha256 = sha256_file(source_path)?;
    state.source_sha256 = Some(source_sha256.clone());
    state.counts.total_pages = pages.total_pages();
    state.counts.extracted_pages = pages.extracted_pages();
    if pages.is_truncated() {
        let message = format!(
            "page text truncated to {} of {} pages",
            pages.extracted_pages(),
            pages.total_pages()
        );
        warn!(
            extracted_pages = pages.extracted_pages(),
            total_pages = pages.total_pages(),
            "page text truncated"
        );
        state.diagnostics.warn(message);
    }
    info!(pages = pages.extracted_pages(), "read page text");
    state.complete();

    state.begin(STEP_METADATA);
    let title_hint = source.title_hint();
    let metadata = metadata_extractor.extract(&pages, title_hint.as_deref(), config.doc_title.as_deref());
    let metadata_record = MetadataRecord {
        doc_title: metadata.doc_title.clone(),
        revision: metadata.revision.clone(),
        total_pages: metadata.total_pages,
        extraction_timestamp: now_utc_string(),
        source_file: source.describe(),
        source_sha256,
    };
    write_jsonl(&paths.metadata, [&metadata_record])?;
    info!(
        doc_title = %metadata.doc_title,
        revision = %metadata.revision.as_deref().unwrap_or("none"),
        "wrote metadata"
    );
    state.complete();

    state.begin(STEP_TOC);
    let toc = match toc_extractor.extract_widening(
        &pages,
        config.toc_scan_pages,
        config.widen_toc_window,
        &mut state.diagnostics,
    ) {
        Ok(toc) => toc,
        Err(error @ ExtractError::ExtractionEmpty { .. }) => {
            warn!(error = %error, "continuing without a table of contents");
            state.diagnostics.warn(error.to_string());
            TocExtraction::default()
        }
        Err(error) => return Err(error.into()),
    };

    let toc_records = toc
        .entries
        .iter()
        .map(|entry| TocRecord::from_entry(&metadata.doc_title, entry))
        .collect::<Vec<TocRecord>>();
    write_jsonl(&paths.toc, &toc_records)?;
    let listing_records = toc
        .listed_tables
        .iter()
        .map(TableListingRecord::from)
        .collect::<Vec<TableListingRecord>>();
    write_jsonl(&paths.listed_tables, &listing_records)?;
    state.counts.toc_entries = toc.entries.len();
    state.counts.listed_tables = toc.listed_tables.len();
    info!(
        toc_entries = toc.entries.len(),
        listed_tables = toc.listed_tables.len(),
        scanned_pages = toc.scanned_pages,
        rejected = state.diagnostics.toc_rejected_total(),
        "wrote table of contents"
    );
    state.complete();

    state.begin(STEP_SECTIONS);
    let sections = heading_extractor.extract(
        &pages,
        &toc.entries,
        &toc.source_lines,
        &mut state.diagnostics,
    );
    let section_records = sections
        .iter()
        .map(|section| SectionRecord::from_entry(&metadata.doc_title, section))
        .collect::<Vec<SectionRecord>>();
    write_jsonl(&paths.sections, &section_records)?;
    state.counts.sections = sections.len();
    info!(
        sections = sections.len(),
        rejected = state.diagnostics.heading_rejected_total(),
        "wrote sections"
    );
    state.complete();

    state.begin(STEP_RECONCILE);
    let listed_labels = toc
        .listed_tables
        .iter()
        .map(|listing| listing.label.clone())
        .collect::<Vec<String>>();
    let report = reconcile(&toc.entries, &sections, pages.total_pages(), &listed_labels);
    state.counts.missing_in_spec = report.missing_in_spec.len();
    state.counts.extra_in_spec = report.extra_in_spec.len();
    state.counts.order_mismatches =
        report.order_mismatches.len() + report.section_order_mismatches.len();
    state.counts.toc_gaps = report.gaps.toc.len();
    state.counts.section_gaps = report.gaps.sections.len();

    let clean = report.is_clean();
    let document = ReportDocument {
        generated_at: now_utc_string(),
        doc_title: metadata.doc_title,
        report,
    };
    write_json_pretty(&paths.report, &document)?;
    info!(
        path = %paths.report.display(),
        clean,
        missing = state.counts.missing_in_spec,
        extra = state.counts.extra_in_spec,
        order_mismatches = state.counts.order_mismatches,
        "wrote discrepancy report"
    );
    state.complete();

    Ok(())
}
