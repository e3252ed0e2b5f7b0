//! goscan - Go source unit scanner
//!
//! Walks a repository, recognizes every Go package in it and emits one
//! source unit per non-vendored package. Vendored packages are renamed to
//! the import path they are vendored as, used to attribute commit ids from
//! git and from Godeps / govendor lockfiles, and then dropped.
//!
//! # Example Usage
//!
//! ```no_run
//! use goscan::commit::GitCli;
//! use goscan::config::ScanConfig;
//! use goscan::fs::RealFileSystem;
//! use goscan::package::NativeRecognizer;
//! use goscan::pipeline::{PipelineOrchestrator, ScanContext};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = PathBuf::from("/src/app").canonicalize()?;
//! let fs = Arc::new(RealFileSystem::new());
//! let config = ScanConfig::default();
//! let recognizer = NativeRecognizer::new(
//!     fs.clone(),
//!     root.clone(),
//!     Some("example.com/app".to_string()),
//! );
//!
//! let context = ScanContext::new(fs, Arc::new(recognizer), Arc::new(GitCli::new()), config, root);
//! let units = PipelineOrchestrator::new(None).execute(context)?;
//! for unit in &units {
//!     println!("{} ({} files)", unit.name, unit.files.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: the scan phases and their orchestrator
//! - [`package`]: per-directory Go package recognition
//! - [`vendor`]: vendoring conventions and vendored import paths
//! - [`commit`]: commit ids from git and lockfiles
//! - [`unit`]: the emitted source unit model

pub mod cli;
pub mod commit;
pub mod config;
pub mod filter;
pub mod fs;
pub mod package;
pub mod pipeline;
pub mod progress;
pub mod unit;
pub mod util;
pub mod vendor;

pub use commit::{CommitLookup, GitCli, VcsError};
pub use config::{ConfigError, ScanConfig};
pub use filter::PatternMatcher;
pub use package::{PackageFacts, PackageRecognizer, RecognizeError};
pub use pipeline::{PipelineOrchestrator, ScanContext};
pub use unit::{Dependency, SourceUnit};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use vendor::{VendorConvention, VendorIdentity, VendorResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
