// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `applink`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "applink",
    version,
    about = "Incrementally rebuild workspace packages as their sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workspace manifest (TOML).
    ///
    /// Default: `$APPLINK_CONFIG`, or `Applink.toml` in the current directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Package to build; its dependency closure becomes the tracked scope.
    ///
    /// If omitted, every package in the manifest is tracked.
    #[arg(long, value_name = "PACKAGE")]
    pub target: Option<String>,

    /// Build every tracked package once, then exit (no watching).
    ///
    /// Exits non-zero if any build failed.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `APPLINK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the manifest and print the target scope, but build nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_and_flags() {
        let args = CliArgs::try_parse_from([
            "applink",
            "--config",
            "ws/Applink.toml",
            "--target",
            "@acme/app",
            "--once",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("ws/Applink.toml")));
        assert_eq!(args.target.as_deref(), Some("@acme/app"));
        assert!(args.once);
        assert!(!args.dry_run);
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }
}
