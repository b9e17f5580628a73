//! library-bundle - Export a game library as a portable bundle
//!
//! Usage:
//!   library-bundle export [options]     Export the library
//!   library-bundle verify [<archive>]   Check a bundle
//!   library-bundle --help               Show help

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod console;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        cli::print_help();
        return Ok(());
    }

    match cli::parse_args(&args) {
        Ok((command, options)) => {
            init_logging(options.verbose);
            cli::run(command, options)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help();
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    // Logs go to stderr so `--json` output stays parseable
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
