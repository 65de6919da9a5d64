//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vc_common::OutputFormat;

use crate::logging::LogFormat;
use crate::pipeline::RunRequest;

/// Count registered voters within each polygon of a precinct layer.
#[derive(Debug, Parser)]
#[command(name = "voter-count", version, about)]
pub struct Cli {
    /// Config file (default: $VOTER_COUNT_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log line format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Verbosity offset from the default level.
    pub fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(i8::MAX as u8) as i8
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize voter points within each polygon and join the counts back
    Run(RunArgs),

    /// List recognized county names and ids
    Counties,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Precinct polygon layer, updated in place
    pub polygons: PathBuf,

    /// County name, or several separated by `;` (e.g. "Cache;'Box Elder'")
    pub counties: String,

    /// Workspace directory for the timestamped output dataset
    pub output_workspace: PathBuf,

    /// Override the configured point source (URL or GeoJSON path)
    #[arg(long, value_name = "SOURCE")]
    pub point_source: Option<String>,

    /// Override the scratch workspace directory
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

impl RunArgs {
    pub fn request(&self) -> RunRequest {
        RunRequest {
            polygons: self.polygons.clone(),
            counties: self.counties.clone(),
            output_workspace: self.output_workspace.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration and where it came from
    Show,
    /// Validate the effective configuration
    Validate,
    /// Print the configuration JSON schema
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_takes_three_positionals() {
        let cli = Cli::try_parse_from([
            "voter-count",
            "run",
            "precincts.geojson",
            "Cache;Box Elder",
            "out",
            "--point-source",
            "points.geojson",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                let request = args.request();
                assert_eq!(request.counties, "Cache;Box Elder");
                assert_eq!(request.output_workspace, PathBuf::from("out"));
                assert_eq!(args.point_source.as_deref(), Some("points.geojson"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["voter-count", "-q", "-v", "counties"]).is_err());
        let cli = Cli::try_parse_from(["voter-count", "-vv", "counties"]).unwrap();
        assert_eq!(cli.verbosity(), 2);
    }
}
