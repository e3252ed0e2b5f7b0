pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, OutputFormatArg, RecognizerArg, ScanArgs};
pub use output::{OutputFormat, OutputFormatter};
