//! Command-line interface definitions.

use clap::error::ErrorKind;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  mdprev README.md
  mdprev docs/*.md --port 8080
  mdprev notes.md todo.md --no-open";

/// Live preview server for markdown documents
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = None,
    arg_required_else_help = true,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Markdown files to preview, in navigation order
    #[arg(required = true, value_name = "FILES", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value_t = 0)]
    pub port: u16,

    /// Do not open the preview in a browser
    #[arg(long)]
    pub no_open: bool,

    /// Print debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Parse the process arguments, exiting on `--help`, `--version` or error.
    ///
    /// A bare `mdprev` prints usage and exits 0 rather than failing.
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|err| {
            let _ = err.print();
            std::process::exit(exit_code(&err))
        })
    }
}

fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => err.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mdprev", "a.md", "b.md"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(cli.port, 0);
        assert!(!cli.no_open);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["mdprev", "-p", "4000", "--no-open", "-v", "a.md"]).unwrap();
        assert_eq!(cli.port, 4000);
        assert!(cli.no_open);
        assert!(cli.verbose);
    }

    #[test]
    fn test_files_required() {
        let err = Cli::try_parse_from(["mdprev", "--port", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_no_arguments_print_usage_and_succeed() {
        let err = Cli::try_parse_from(["mdprev"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
        assert_eq!(exit_code(&err), 0);
        assert!(err.to_string().contains("Usage: mdprev"));
    }

    #[test]
    fn test_invalid_port() {
        for port in ["65536", "-1", "abc"] {
            assert!(Cli::try_parse_from(["mdprev", "--port", port, "a.md"]).is_err());
        }
    }

    #[test]
    fn test_missing_port_value() {
        let err = Cli::try_parse_from(["mdprev", "a.md", "--port"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_unknown_flag() {
        let err = Cli::try_parse_from(["mdprev", "--bogus", "a.md"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["mdprev", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(exit_code(&err), 0);
        assert!(err.to_string().contains("mdprev README.md"));
    }
}
