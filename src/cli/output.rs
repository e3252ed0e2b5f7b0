//! Rendering of the emitted unit list.

use crate::unit::SourceUnit;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON array
    Json,
    Yaml,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, units: &[SourceUnit]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(units)
                    .context("Failed to serialize source units to JSON")?;
                out.push('\n');
                Ok(out)
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(units).context("Failed to serialize source units to YAML")
            }
        }
    }

    /// Write the whole document to `output`, or to stdout.
    pub fn write(&self, document: &str, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => std::fs::write(path, document)
                .with_context(|| format!("Failed to write output to {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(document.as_bytes())
                    .and_then(|_| stdout.flush())
                    .context("Failed to write output to stdout")
            }
        }
    }
}
