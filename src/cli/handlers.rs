use crate::cli::commands::{RecognizerArg, ScanArgs};
use crate::cli::output::OutputFormatter;
use crate::commit::GitCli;
use crate::config::ScanConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::package::{GoListRecognizer, NativeRecognizer, PackageRecognizer};
use crate::pipeline::{PipelineOrchestrator, ScanContext};
use crate::progress::LoggingHandler;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Set by container images that run the scanner against a mounted checkout.
const ENV_IN_DOCKER: &str = "IN_DOCKER_CONTAINER";

pub fn handle_scan(args: &ScanArgs) -> i32 {
    let root = match resolve_root(args.path.as_deref()) {
        Ok(root) => root,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return 1;
        }
    };
    debug!("Effective configuration: {}", config);

    let document = match run_scan(args, root, config) {
        Ok(document) => document,
        Err(e) => {
            error!("Scan failed: {:#}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    if let Err(e) = formatter.write(&document, args.output.as_deref()) {
        error!("{:#}", e);
        return 1;
    }

    if let Some(output) = &args.output {
        info!("Source units written to {}", output.display());
    }
    0
}

fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    path.canonicalize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))
}

/// Config document, then environment, then flags.
fn load_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match args.config.as_deref() {
        Some("-") => ScanConfig::from_reader(std::io::stdin().lock(), "<stdin>")?,
        Some(path) => ScanConfig::from_path(Path::new(path))?,
        None => ScanConfig::default(),
    };

    config.apply_env()?;

    if let Some(gopath) = &args.gopath {
        config.gopath = gopath.clone();
    }
    if !args.patterns.is_empty() {
        config.pkg_patterns = args.patterns.clone();
    }
    if args.skip_godeps {
        config.skip_godeps = true;
    }
    if let Some(import_path) = &args.import_path {
        config.import_path = Some(import_path.clone());
    }
    if config.import_path.is_none() {
        config.import_path = args.repo_import_root();
    }

    config.validate()?;
    Ok(config)
}

fn run_scan(args: &ScanArgs, root: PathBuf, config: ScanConfig) -> Result<String> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());

    let import_root = config.import_root(fs.as_ref(), &root);
    match &import_root {
        Some(import_root) => debug!("Import path root: {}", import_root),
        None if env::var_os(ENV_IN_DOCKER).is_some() => {
            warn!("No import path root known; set --repo, ImportPath or a go.mod module so unit names are full import paths")
        }
        None => {}
    }

    let recognizer: Arc<dyn PackageRecognizer> = match args.recognizer {
        RecognizerArg::Native => Arc::new(NativeRecognizer::new(
            fs.clone(),
            root.clone(),
            import_root,
        )),
        RecognizerArg::GoList => Arc::new(GoListRecognizer::new(root.clone())),
    };

    let context = ScanContext::new(fs, recognizer, Arc::new(GitCli::new()), config, root);
    let orchestrator = PipelineOrchestrator::new(Some(Arc::new(LoggingHandler)));
    let units = orchestrator.execute(context)?;

    OutputFormatter::new(args.format.into()).format(&units)
}
