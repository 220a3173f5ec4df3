//! Command-line interface for paramscan.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgGroup, Command};

use crate::config::{OutputFormat, ScanMode};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Parameter files, directories or tar archives to scan
    pub inputs: Vec<PathBuf>,

    /// Scan mode, if one of the mode flags was given
    pub mode: Option<ScanMode>,

    /// File patterns to ignore when searching
    pub ignore_files: Vec<String>,

    /// Treat each input as a parameter doc whatever its name
    pub assume_mom6: bool,

    /// Keys to exclude from the output
    pub exclude: Vec<String>,

    /// Output format
    pub format: Option<OutputFormat>,

    /// Transpose HTML tables
    pub transpose: bool,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Prefix for parameter-doc keys
    pub model_name: Option<String>,

    /// Enable debug output
    pub debug: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("paramscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scans MOM_parameter_doc files and Fortran namelists and summarizes configurations")
        .after_help(
            "With one input the parsed parameters are printed. With several inputs only \
             the parameters that differ between consecutive inputs are tabulated.",
        )
        .arg(
            Arg::new("inputs")
                .help("Parameter files, directories or tar archives to scan")
                .value_name("FILE")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("namelist")
                .short('n')
                .long("namelist")
                .help("Scan for Fortran namelists")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mom6namelist")
                .short('M')
                .long("mom6namelist")
                .help("Scan for Fortran namelists, ignoring *.000000.out unless --ignore-files is given")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log")
                .short('L')
                .long("log")
                .help("Scan for upper-case namelist echoes in FMS log files")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("mode")
                .args(["namelist", "mom6namelist", "log"])
                .multiple(false),
        )
        .arg(
            Arg::new("ignore-files")
                .short('i')
                .long("ignore-files")
                .help("File pattern to ignore when searching (can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("assume-mom6")
                .short('m')
                .long("assume-mom6")
                .help("Assume FILE is a MOM6 parameter file [default: only MOM_parameter_doc.{all,short}]")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .help("Parameter to exclude (can be repeated; glob patterns for namelists)")
                .value_name("KEY")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output format [default: json]")
                .value_name("FORMAT")
                .value_parser(["json", "html"]),
        )
        .arg(
            Arg::new("transpose")
                .short('t')
                .long("transpose")
                .help("Transpose the HTML table (sources as rows)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to config file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("model-name")
                .long("model-name")
                .help("Prefix parameter-doc keys as NAME%KEY")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments into `CliArgs`
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let mode = if matches.get_flag("namelist") {
        Some(ScanMode::Namelist)
    } else if matches.get_flag("mom6namelist") {
        Some(ScanMode::Mom6Namelist)
    } else if matches.get_flag("log") {
        Some(ScanMode::Log)
    } else {
        None
    };

    let format = matches
        .get_one::<String>("format")
        .map(|f| match f.as_str() {
            "html" => OutputFormat::Html,
            _ => OutputFormat::Json,
        });

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        mode,
        ignore_files: matches
            .get_many::<String>("ignore-files")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        assume_mom6: matches.get_flag("assume-mom6"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        format,
        transpose: matches.get_flag("transpose"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        model_name: matches.get_one::<String>("model-name").cloned(),
        debug: matches.get_flag("debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds() {
        let cmd = build_cli();
        assert_eq!(cmd.get_name(), "paramscan");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse_args_from(vec!["paramscan", "run1"]);
        assert_eq!(args.inputs, vec![PathBuf::from("run1")]);
        assert_eq!(args.mode, None);
        assert_eq!(args.format, None);
        assert!(args.exclude.is_empty());
        assert!(args.ignore_files.is_empty());
        assert!(!args.assume_mom6);
        assert!(!args.transpose);
        assert!(!args.debug);
    }

    #[test]
    fn test_inputs_required() {
        assert!(build_cli().try_get_matches_from(vec!["paramscan"]).is_err());
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(
            parse_args_from(vec!["paramscan", "-n", "x"]).mode,
            Some(ScanMode::Namelist)
        );
        assert_eq!(
            parse_args_from(vec!["paramscan", "--mom6namelist", "x"]).mode,
            Some(ScanMode::Mom6Namelist)
        );
        assert_eq!(
            parse_args_from(vec!["paramscan", "-L", "x"]).mode,
            Some(ScanMode::Log)
        );
    }

    #[test]
    fn test_mode_flags_conflict() {
        let result = build_cli().try_get_matches_from(vec!["paramscan", "-n", "--log", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_options() {
        let args = parse_args_from(vec![
            "paramscan",
            "-x",
            "DT",
            "--exclude",
            "*%layout",
            "-i",
            "*.bak",
            "a",
            "b",
        ]);
        assert_eq!(args.exclude, vec!["DT", "*%layout"]);
        assert_eq!(args.ignore_files, vec!["*.bak"]);
        assert_eq!(args.inputs.len(), 2);
    }

    #[test]
    fn test_format_and_transpose() {
        let args = parse_args_from(vec!["paramscan", "-f", "html", "-t", "a", "b"]);
        assert_eq!(args.format, Some(OutputFormat::Html));
        assert!(args.transpose);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = build_cli().try_get_matches_from(vec!["paramscan", "-f", "yaml", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_and_model_name() {
        let args = parse_args_from(vec![
            "paramscan",
            "-c",
            "scan.toml",
            "--model-name",
            "MOM",
            "-m",
            "-D",
            "params",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("scan.toml")));
        assert_eq!(args.model_name.as_deref(), Some("MOM"));
        assert!(args.assume_mom6);
        assert!(args.debug);
    }
}
