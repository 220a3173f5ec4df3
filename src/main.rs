//! paramscan - MOM6 parameter and namelist scanner

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use log::{debug, warn, LevelFilter};

use paramscan::report::{to_html, to_json};
use paramscan::{parse_args, CliArgs, OutputFormat, ScanConfig, ScanMode, ScanOutput, Scanner};

const HTML_TITLE: &str = "MOM6 parameters";

fn main() -> ExitCode {
    let args = parse_args();

    let result = build_config(&args).and_then(|config| {
        init_logging(config.debug);
        debug_config_sources(&args);
        if config.assume_parameter_file && config.mode != ScanMode::ParameterDoc {
            warn!("--assume-mom6 has no effect in {:?} mode", config.mode);
        }
        debug!("configuration: {config:?}");
        run(&args, config)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("paramscan: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Debug mode raises the default level; `RUST_LOG` still takes precedence
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(args: &CliArgs, config: ScanConfig) -> anyhow::Result<()> {
    let scanner = Scanner::new(config)?;
    let mut records = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let record = scanner
            .scan_one(input)
            .with_context(|| format!("failed to scan {}", input.display()))?;
        records.push(record);
    }
    let output = ScanOutput::from_records(records);

    let rendered = match scanner.config().format {
        OutputFormat::Json => to_json(&output).context("failed to serialize output")?,
        OutputFormat::Html => to_html(&output, HTML_TITLE, scanner.config().transpose),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered.trim_end())?;
    Ok(())
}

/// Report which config files were (or would have been) read
fn debug_config_sources(args: &CliArgs) {
    if let Some(config_path) = &args.config {
        debug!("using explicit config file: {}", config_path.display());
        return;
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    let discovered = ScanConfig::discover_config_files(&cwd);
    if discovered.is_empty() {
        debug!("no config files discovered");
    }
    for f in &discovered {
        debug!("discovered config file: {}", f.display());
    }
}

/// Build configuration from CLI args and config files
///
/// An explicit `--config` replaces discovery; CLI flags override both.
fn build_config(args: &CliArgs) -> anyhow::Result<ScanConfig> {
    let mut config = if let Some(config_path) = &args.config {
        ScanConfig::from_toml_file(config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        ScanConfig::from_discovered_files(&std::env::current_dir().unwrap_or_default())
    };

    // Override with CLI arguments
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(model_name) = &args.model_name {
        config.model_name = Some(model_name.clone());
    }
    if args.assume_mom6 {
        config.assume_parameter_file = true;
    }
    if args.transpose {
        config.transpose = true;
    }
    if args.debug {
        config.debug = true;
    }
    config.ignore_files.extend(args.ignore_files.iter().cloned());
    config.exclude.extend(args.exclude.iter().cloned());

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}
