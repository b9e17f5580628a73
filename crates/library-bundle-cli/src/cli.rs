//! Headless commands
//!
//! Usage:
//!   library-bundle export                     Export the library bundle
//!   library-bundle verify [<archive>]         Check an existing bundle
//!   library-bundle extract <archive> <dir>    Unpack a bundle
//!
//! Options:
//!   --snapshot <file>    Library snapshot to export
//!   --config-dir <dir>   Host configuration directory
//!   --app-dir <dir>      Host application directory
//!   --yes                Skip the confirmation prompt
//!   --save-config        Remember the path options in the config file
//!   --json               Output in JSON format

use std::path::PathBuf;
use std::sync::Arc;

use library_bundle_core::{
    extract_bundle, load_snapshot, verify_bundle, BundleVerification, Config, ExportAction,
    ExportSummary, IssueSeverity,
};

use crate::console::ConsoleHost;

/// CLI command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Export,
    Verify { archive: Option<PathBuf> },
    Extract { archive: PathBuf, dest: PathBuf },
}

/// CLI options
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub json: bool,
    pub yes: bool,
    pub verbose: bool,
    pub save_config: bool,
    pub snapshot: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub app_dir: Option<PathBuf>,
}

impl CliOptions {
    /// Load the config file and apply command-line overrides
    fn config(&self) -> Config {
        let mut config = Config::load();
        if let Some(ref dir) = self.config_dir {
            config.configuration_path = Some(dir.clone());
        }
        if let Some(ref dir) = self.app_dir {
            config.application_path = Some(dir.clone());
        }
        if let Some(ref snapshot) = self.snapshot {
            config.library_snapshot = Some(snapshot.clone());
        }
        config
    }
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<&str> = None;
    let mut positional: Vec<PathBuf> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--yes" | "-y" => options.yes = true,
            "--verbose" | "-v" => options.verbose = true,
            "--save-config" => options.save_config = true,
            "--snapshot" => options.snapshot = Some(take_value(args, &mut i, "--snapshot")?),
            "--config-dir" => options.config_dir = Some(take_value(args, &mut i, "--config-dir")?),
            "--app-dir" => options.app_dir = Some(take_value(args, &mut i, "--app-dir")?),
            "export" | "verify" | "extract" if command.is_none() => command = Some(arg.as_str()),
            _ => {
                if arg.starts_with('-') {
                    return Err(format!("Unknown option: {}", arg));
                }
                if command.is_none() {
                    return Err(format!("Unknown command: {}", arg));
                }
                positional.push(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match command {
        Some("export") => CliCommand::Export,
        Some("verify") => CliCommand::Verify {
            archive: positional.next(),
        },
        Some("extract") => {
            let archive = positional
                .next()
                .ok_or_else(|| "extract requires an archive path".to_string())?;
            let dest = positional
                .next()
                .ok_or_else(|| "extract requires a destination directory".to_string())?;
            CliCommand::Extract { archive, dest }
        }
        _ => {
            return Err("No command specified. Use: export, verify or extract".to_string());
        }
    };

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra.display()));
    }

    Ok((command, options))
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<PathBuf, String> {
    *i += 1;
    args.get(*i)
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Run CLI command
pub fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    match command {
        CliCommand::Export => run_export(options),
        CliCommand::Verify { archive } => run_verify(archive, options),
        CliCommand::Extract { archive, dest } => run_extract(archive, dest, options),
    }
}

fn run_export(options: CliOptions) -> anyhow::Result<()> {
    let config = options.config();
    if options.save_config {
        config.save()?;
    }

    let snapshot = config.library_snapshot.clone().ok_or_else(|| {
        anyhow::anyhow!("Library snapshot not configured (use --snapshot <file>)")
    })?;
    let paths = config.export_paths()?;
    let library = load_snapshot(&snapshot)?;

    let host = Arc::new(ConsoleHost::new(options.yes, options.json));
    let action = ExportAction::new(host.clone(), paths, Arc::new(library));

    let handle = match action.trigger()? {
        Some(handle) => handle,
        None => {
            eprintln!("Export cancelled.");
            return Ok(());
        }
    };

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("Export worker panicked"))?;

    if host.failed() {
        anyhow::bail!("Library export failed");
    }

    if let Some(summary) = host.take_summary() {
        print_export_summary(&summary, &options)?;
    }

    Ok(())
}

fn run_verify(archive: Option<PathBuf>, options: CliOptions) -> anyhow::Result<()> {
    let archive = match archive {
        Some(path) => path,
        None => options
            .config()
            .archive_path()
            .ok_or_else(|| anyhow::anyhow!("Application path not configured (use --app-dir <dir>)"))?,
    };

    let result = verify_bundle(&archive)?;
    print_verification(&result, &options)?;

    if !result.is_usable() {
        anyhow::bail!("{} is not a usable bundle", archive.display());
    }
    Ok(())
}

fn run_extract(archive: PathBuf, dest: PathBuf, options: CliOptions) -> anyhow::Result<()> {
    let extracted = extract_bundle(&archive, &dest)?;

    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "archive": archive.to_string_lossy(),
                "destination": dest.to_string_lossy(),
                "files": extracted,
            })
        );
    } else {
        println!("Extracted {} files to {}", extracted, dest.display());
    }
    Ok(())
}

fn print_export_summary(summary: &ExportSummary, options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("Export Complete:");
    println!("  Games:          {}", summary.games_exported);
    println!("  Images:         {}", summary.images_staged);
    println!("  Missing images: {}", summary.images_missing);
    println!("  Failed images:  {}", summary.images_failed);
    println!("  Unresolved ids: {}", summary.unresolved_ids);
    println!("  Archive:        {}", summary.archive_path.display());
    println!("  Size:           {} bytes", summary.archive_size);
    println!("  Manifest hash:  {}", summary.manifest_sha256);
    Ok(())
}

fn print_verification(result: &BundleVerification, options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("Bundle: {}", result.status);
    println!("  Files:   {} ({} bytes)", result.file_count, result.total_size);
    println!("  Records: {}", result.record_count);
    println!("  Images:  {}", result.image_count);

    let shown: Vec<_> = result
        .issues
        .iter()
        .filter(|issue| options.verbose || issue.severity != IssueSeverity::Info)
        .collect();

    if !shown.is_empty() {
        println!();
        println!("Issues:");
        for issue in shown {
            match issue.path {
                Some(ref path) => println!("  [{}] {} ({})", issue.severity, issue.message, path),
                None => println!("  [{}] {}", issue.severity, issue.message),
            }
        }
    }
    Ok(())
}

/// Print CLI help
pub fn print_help() {
    println!("library-bundle v{}", env!("CARGO_PKG_VERSION"));
    println!("Export a game library as a portable bundle for offline clients");
    println!();
    println!("USAGE:");
    println!("    library-bundle <command> [options]");
    println!();
    println!("COMMANDS:");
    println!("    export                      Export the library to MobileExport.zip");
    println!("    verify [<archive>]          Check that a bundle is consumable");
    println!("    extract <archive> <dir>     Unpack a bundle into a directory");
    println!();
    println!("OPTIONS:");
    println!("    --snapshot <file>           Library snapshot (JSON) to export");
    println!("    --config-dir <dir>          Host configuration directory");
    println!("    --app-dir <dir>             Host application directory");
    println!("    --yes, -y                   Do not ask for confirmation");
    println!("    --save-config               Remember the path options for later runs");
    println!("    --json                      Output in JSON format");
    println!("    --verbose, -v               Enable debug logging");
    println!("    --help, -h                  Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("    library-bundle export --snapshot library.snapshot.json --config-dir ~/.host");
    println!("    library-bundle export --yes --json");
    println!("    library-bundle verify MobileExport.zip");
    println!("    library-bundle extract MobileExport.zip ./bundle");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_export() {
        let (cmd, options) = parse_args(&args(&["export"])).unwrap();
        assert_eq!(cmd, CliCommand::Export);
        assert!(!options.yes);
        assert!(!options.json);
    }

    #[test]
    fn test_parse_args_export_with_overrides() {
        let (cmd, options) = parse_args(&args(&[
            "export",
            "--yes",
            "--snapshot",
            "lib.json",
            "--config-dir",
            "/host/config",
            "--app-dir",
            "/host/app",
            "--json",
        ]))
        .unwrap();

        assert_eq!(cmd, CliCommand::Export);
        assert!(options.yes);
        assert!(options.json);
        assert!(!options.save_config);
        assert_eq!(options.snapshot, Some(PathBuf::from("lib.json")));
        assert_eq!(options.config_dir, Some(PathBuf::from("/host/config")));
        assert_eq!(options.app_dir, Some(PathBuf::from("/host/app")));
    }

    #[test]
    fn test_parse_args_verify() {
        let (cmd, _) = parse_args(&args(&["verify"])).unwrap();
        assert_eq!(cmd, CliCommand::Verify { archive: None });

        let (cmd, _) = parse_args(&args(&["verify", "bundle.zip", "-v"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Verify {
                archive: Some(PathBuf::from("bundle.zip"))
            }
        );
    }

    #[test]
    fn test_parse_args_extract() {
        let (cmd, _) = parse_args(&args(&["extract", "bundle.zip", "out"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Extract {
                archive: PathBuf::from("bundle.zip"),
                dest: PathBuf::from("out"),
            }
        );

        assert!(parse_args(&args(&["extract", "bundle.zip"])).is_err());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["import"])).is_err());
        assert!(parse_args(&args(&["export", "--snapshot"])).is_err());
        assert!(parse_args(&args(&["export", "--force"])).is_err());
        assert!(parse_args(&args(&["export", "extra"])).is_err());
    }

    #[test]
    fn test_parse_args_save_config() {
        let (cmd, options) =
            parse_args(&args(&["export", "--save-config", "--app-dir", "/host/app"])).unwrap();
        assert_eq!(cmd, CliCommand::Export);
        assert!(options.save_config);
        assert_eq!(options.app_dir, Some(PathBuf::from("/host/app")));
    }

    #[test]
    fn test_parse_args_verbose_option() {
        let (_, options) = parse_args(&args(&["--verbose", "export"])).unwrap();
        assert!(options.verbose);
    }
}
