use goscan::cli::commands::{CliArgs, Commands};
use goscan::cli::handlers::handle_scan;
use goscan::util::logging::{parse_level, LoggingConfig};
use goscan::{init_logging, VERSION};

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("goscan v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => handle_scan(scan_args),
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v` / `-q`, which win over the environment.
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    config.include_target = config.level >= Level::DEBUG;

    init_logging(config);
}
