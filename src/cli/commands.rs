use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Go source unit scanner
#[derive(Parser, Debug)]
#[command(
    name = "goscan",
    about = "Scan a directory tree for Go packages and emit source units",
    version,
    long_about = "goscan walks a repository, recognizes every Go package in it, resolves \
                  vendored import paths and attributes commits from git and from Godeps / \
                  govendor lockfiles. The result is a JSON (or YAML) list of source units \
                  written to stdout."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Scan for Go packages",
        long_about = "Scan the directory tree rooted at PATH (default: the current directory) \
                      for Go packages.\n\n\
                      Examples:\n  \
                      goscan scan\n  \
                      goscan scan /src/app --repo github.com/acme/app\n  \
                      echo '{\"GOPATH\": \"third_party\"}' | goscan scan --config -\n  \
                      goscan scan --pattern 'github.com/acme/app/cmd/...' --format yaml"
    )]
    Scan(ScanArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(
        value_name = "PATH",
        help = "Directory to scan (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "JSON config with GOPATH, PkgPatterns, SkipGodeps, ImportPath ('-' reads stdin)"
    )]
    pub config: Option<String>,

    #[arg(long, value_name = "DIRS", help = "GOPATH entries, relative to PATH or absolute")]
    pub gopath: Option<String>,

    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "PATTERN",
        help = "Only emit packages matching PATTERN ('...' matches anything); repeatable"
    )]
    pub patterns: Vec<String>,

    #[arg(long, help = "Ignore the Godeps/_workspace vendoring convention")]
    pub skip_godeps: bool,

    #[arg(long, value_name = "IMPORT_PATH", help = "Import path of the scanned directory")]
    pub import_path: Option<String>,

    #[arg(long, value_name = "URI", help = "Repository URI, used as the import path root")]
    pub repo: Option<String>,

    #[arg(long, value_name = "DIR", help = "Subdirectory of the repository being scanned")]
    pub subdir: Option<String>,

    #[arg(
        long,
        value_enum,
        default_value = "native",
        help = "How packages are recognized"
    )]
    pub recognizer: RecognizerArg,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

impl ScanArgs {
    /// Import path root from `--repo` and `--subdir`.
    pub fn repo_import_root(&self) -> Option<String> {
        let repo = self.repo.as_deref()?.trim_end_matches('/');
        if repo.is_empty() {
            return None;
        }
        match self.subdir.as_deref().map(|s| s.trim_matches('/')) {
            Some(subdir) if !subdir.is_empty() && subdir != "." => {
                Some(format!("{}/{}", repo, subdir))
            }
            _ => Some(repo.to_string()),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerArg {
    /// Parse Go sources directly
    Native,
    /// Ask `go list -e -json ./...`
    GoList,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}
