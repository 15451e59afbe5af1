use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "specindex",
    version,
    about = "Recover and cross-check the section structure of specification documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Reconcile(ReconcileArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("input").required(true).args(["pdf", "text"])))]
pub struct ExtractArgs {
    /// PDF to extract with `pdftotext`.
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Form-feed separated page text, e.g. a saved `pdftotext` dump.
    #[arg(long)]
    pub text: Option<PathBuf>,

    #[arg(long, default_value = ".cache/specindex")]
    pub output_dir: PathBuf,

    /// JSON file with extraction settings; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(long)]
    pub toc_scan_pages: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub no_widen_toc_window: bool,

    #[arg(long)]
    pub page_tolerance: Option<u32>,

    #[arg(long)]
    pub toc_line_pattern: Option<String>,

    #[arg(long)]
    pub heading_line_pattern: Option<String>,

    #[arg(long)]
    pub max_heading_title_chars: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub allow_year_titles: bool,

    #[arg(long)]
    pub doc_title: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    #[arg(long, default_value = ".cache/specindex")]
    pub output_dir: PathBuf,

    /// Defaults to `<output-dir>/discrepancy_report.json`.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Used when `metadata.jsonl` is absent.
    #[arg(long)]
    pub total_pages: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/specindex")]
    pub output_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["specindex", "extract"]).is_err());
        assert!(
            Cli::try_parse_from(["specindex", "extract", "--pdf", "a.pdf", "--text", "a.txt"])
                .is_err()
        );

        let cli = Cli::try_parse_from([
            "specindex",
            "extract",
            "--text",
            "dump.txt",
            "--toc-scan-pages",
            "40",
            "--no-widen-toc-window",
        ])
        .expect("valid extract invocation");
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(args.text, Some(PathBuf::from("dump.txt")));
        assert_eq!(args.toc_scan_pages, Some(40));
        assert!(args.no_widen_toc_window);
        assert_eq!(args.output_dir, PathBuf::from(".cache/specindex"));
    }
}
