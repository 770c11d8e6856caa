//! Command-line definitions for carscope.
//!
//! Shared by the application, the build script (manpage) and the
//! `gen_docs` binary (options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Default dataset produced by the upstream cleaning step.
pub const DEFAULT_DATASET: &str = "cleaned_df.parquet";

/// Reader to use for the dataset file.
/// When `--format` is not given, the format is detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Parquet columnar format
    Parquet,
    /// Comma-separated values
    Csv,
    /// JSON array format
    Json,
    /// JSON Lines / NDJSON (one JSON object per line)
    Jsonl,
    /// Arrow IPC / Feather
    Arrow,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "parquet" | "pq" => Some(Self::Parquet),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            "arrow" | "ipc" | "feather" => Some(Self::Arrow),
            _ => None,
        }
    }
}

/// Report page shown at startup.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Page {
    /// Dataset overview: random sample and column descriptions
    #[default]
    Home,
    /// Single-column distributions
    Univariate,
    /// Price by state and manufacturer
    Multivariate,
}

/// Command-line arguments for carscope
#[derive(Clone, Parser, Debug)]
#[command(
    name = "carscope",
    version,
    about = "Used Cars EDA in the Terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the cleaned dataset
    #[arg(value_name = "PATH", default_value = DEFAULT_DATASET)]
    pub path: PathBuf,

    /// Force file format (parquet, csv, json, jsonl, arrow).
    /// By default format is detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Page to open at startup
    #[arg(long = "page", value_enum, default_value_t = Page::Home)]
    pub page: Page,

    /// Seed for the Home page sample. Without it a new sample is drawn on every rerun
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Enable debug mode: status row in the UI and a log file in the cache directory
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/carscope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n| format!("<{}>", n.as_str()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn option_label(arg: &clap::Arg) -> String {
    if arg.is_positional() {
        let placeholder = value_placeholder(arg);
        return if arg.is_required_set() {
            placeholder
        } else {
            format!("[{placeholder}]")
        };
    }

    let mut names = Vec::new();
    if let Some(s) = arg.get_short() {
        names.push(format!("-{s}"));
    }
    if let Some(l) = arg.get_long() {
        names.push(format!("--{l}"));
    }
    let names = names.join(", ");
    if !arg.get_action().takes_values() {
        return names;
    }
    match value_placeholder(arg) {
        p if p.is_empty() => names,
        p => format!("{names} {p}"),
    }
}

/// Render command-line options as a markdown table.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");
    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str();
        if id == "help" || id == "version" {
            continue;
        }
        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("| `{}` | {} |\n", option_label(arg), help));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("cleaned_df.parquet")),
            Some(FileFormat::Parquet)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("cars.CSV")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("cars.ndjson")),
            Some(FileFormat::Jsonl)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("cars.feather")),
            Some(FileFormat::Arrow)
        );
        assert_eq!(FileFormat::from_path(Path::new("cars.xlsx")), None);
        assert_eq!(FileFormat::from_path(Path::new("cars")), None);
    }

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["carscope"]);
        assert_eq!(args.path, PathBuf::from(DEFAULT_DATASET));
        assert_eq!(args.page, Page::Home);
        assert!(args.format.is_none());
        assert!(args.seed.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_page_and_seed_args() {
        let args = Args::parse_from([
            "carscope",
            "cars.csv",
            "--page",
            "multivariate",
            "--seed",
            "7",
        ]);
        assert_eq!(args.path, PathBuf::from("cars.csv"));
        assert_eq!(args.page, Page::Multivariate);
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["carscope", "--force"]).is_err());
        assert!(Args::try_parse_from(["carscope", "--generate-config", "--force"]).is_ok());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.starts_with("# Command Line Options"));
        assert!(md.contains("`--page <PAGE>`"));
        assert!(md.contains("`--debug`"));
        assert!(md.contains("`[<PATH>]`"));
        assert!(!md.contains("--help"));
    }
}
