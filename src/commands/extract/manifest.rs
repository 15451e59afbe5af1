use super::*;

pub(super) fn collect_tool_versions(uses_pdftotext: bool) -> ToolVersions {
    if !uses_pdftotext {
        return ToolVersions::default();
    }

    ToolVersions {
        pdftotext: command_version_optional("pdftotext", &["-v"]),
        pdfinfo: command_version_optional("pdfinfo", &["-v"]),
    }
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    // poppler prints its version banner on stderr
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

pub(super) fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec!["specindex".to_string(), "extract".to_string()];

    if let Some(path) = &args.pdf {
        command.push("--pdf".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.text {
        command.push("--text".to_string());
        command.push(path.display().to_string());
    }
    command.push("--output-dir".to_string());
    command.push(args.output_dir.display().to_string());

    if let Some(path) = &args.config {
        command.push("--config".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(max_pages) = args.max_pages {
        command.push("--max-pages".to_string());
        command.push(max_pages.to_string());
    }
    if let Some(scan) = args.toc_scan_pages {
        command.push("--toc-scan-pages".to_string());
        command.push(scan.to_string());
    }
    if args.no_widen_toc_window {
        command.push("--no-widen-toc-window".to_string());
    }
    if let Some(tolerance) = args.page_tolerance {
        command.push("--page-tolerance".to_string());
        command.push(tolerance.to_string());
    }
    if let Some(pattern) = &args.toc_line_pattern {
        command.push("--toc-line-pattern".to_string());
        command.push(format!("'{pattern}'"));
    }
    if let Some(pattern) = &args.heading_line_pattern {
        command.push("--heading-line-pattern".to_string());
        command.push(format!("'{pattern}'"));
    }
    if let Some(chars) = args.max_heading_title_chars {
        command.push("--max-heading-title-chars".to_string());
        command.push(chars.to_string());
    }
    if args.allow_year_titles {
        command.push("--allow-year-titles".to_string());
    }
    if let Some(title) = &args.doc_title {
        command.push("--doc-title".to_string());
        command.push(format!("'{title}'"));
    }

    command.join(" ")
}
