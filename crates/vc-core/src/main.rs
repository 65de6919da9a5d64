//! voter-count CLI entry point.

use clap::{CommandFactory, Parser};
use serde_json::json;
use std::io;
use tracing::error;
use vc_common::{County, OutputFormat};
use vc_config::{resolve_config, Config, ResolvedConfig, ValidationError};
use vc_core::cli::{Cli, Commands, ConfigCommand, RunArgs};
use vc_core::{logging, pipeline, ExitCode, LocalEngine, RunContext, RunReport};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbosity());

    let code = match &cli.command {
        Commands::Run(args) => cmd_run(&cli, args),
        Commands::Counties => cmd_counties(&cli),
        Commands::Config { action } => cmd_config(&cli, action),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "voter-count", &mut io::stdout());
            ExitCode::Ok
        }
    };
    std::process::exit(code.as_i32());
}

fn load_config(cli: &Cli) -> Result<ResolvedConfig, ExitCode> {
    resolve_config(cli.config.as_deref()).map_err(|err| config_failure(cli, &err))
}

fn config_failure(cli: &Cli, err: &ValidationError) -> ExitCode {
    error!(error = %err, "configuration error");
    report_error(cli.format, ExitCode::ConfigError, 20, &err.to_string());
    ExitCode::ConfigError
}

fn report_error(format: OutputFormat, exit: ExitCode, code: u32, message: &str) {
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "status": "error",
                "exit_code": exit.as_i32(),
                "error": {"code": code, "message": message},
            })
        ),
    }
}

fn cmd_run(cli: &Cli, args: &RunArgs) -> ExitCode {
    let mut config = match load_config(cli) {
        Ok(resolved) => resolved.config,
        Err(code) => return code,
    };
    if let Some(source) = &args.point_source {
        config.point_source = source.clone();
    }
    if let Some(dir) = &args.scratch_dir {
        config.artifacts.scratch_dir = Some(dir.clone());
    }
    if let Err(err) = config.validate() {
        return config_failure(cli, &err);
    }

    let mut engine = LocalEngine::new().with_page_size(config.remote.page_size);
    let ctx = RunContext::new(config);
    match pipeline::run(&mut engine, &ctx, &args.request()) {
        Ok(report) => {
            print_report(cli.format, &report);
            ExitCode::Ok
        }
        Err(err) => {
            let exit = ExitCode::from_error(&err);
            error!(error = %err, code = err.code(), "run failed");
            report_error(cli.format, exit, err.code(), &err.to_string());
            exit
        }
    }
}

fn print_report(format: OutputFormat, report: &RunReport) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({"status": "ok", "report": report})
        ),
        OutputFormat::Text => {
            let counties: Vec<String> = report.counties.iter().map(|c| c.to_string()).collect();
            println!("Run:        {}", report.run_id);
            println!("Counties:   {}", counties.join(", "));
            println!("Predicate:  {}", report.predicate);
            println!("Points:     {}", report.point_count);
            println!(
                "Polygons:   {} ({} matched)",
                report.polygon_count, report.matched
            );
            println!("Output:     {}", report.output.display());
            println!("Elapsed:    {:.2}s", report.elapsed_secs);
        }
    }
}

fn cmd_counties(cli: &Cli) -> ExitCode {
    match cli.format {
        OutputFormat::Json => {
            let counties: Vec<County> = County::all().collect();
            println!("{}", json!({ "counties": counties }));
        }
        OutputFormat::Text => {
            for county in County::all() {
                println!("{:>2}  {}", county.id, county.name);
            }
        }
    }
    ExitCode::Ok
}

fn cmd_config(cli: &Cli, action: &ConfigCommand) -> ExitCode {
    if let ConfigCommand::Schema = action {
        let schema = schemars::schema_for!(Config);
        return match serde_json::to_string_pretty(&schema) {
            Ok(text) => {
                println!("{text}");
                ExitCode::Ok
            }
            Err(err) => {
                report_error(cli.format, ExitCode::InternalError, 71, &err.to_string());
                ExitCode::InternalError
            }
        };
    }

    let resolved = match load_config(cli) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    match (action, cli.format) {
        (ConfigCommand::Validate, OutputFormat::Text) => {
            println!("config ok ({})", describe_source(&resolved));
        }
        (ConfigCommand::Validate, OutputFormat::Json) => {
            println!("{}", json!({"status": "ok", "source": resolved.source}));
        }
        (_, OutputFormat::Json) => println!("{}", json!(resolved)),
        (_, OutputFormat::Text) => {
            println!("# source: {}", describe_source(&resolved));
            match serde_json::to_string_pretty(&resolved.config) {
                Ok(text) => println!("{text}"),
                Err(err) => {
                    report_error(cli.format, ExitCode::InternalError, 71, &err.to_string());
                    return ExitCode::InternalError;
                }
            }
        }
    }
    ExitCode::Ok
}

fn describe_source(resolved: &ResolvedConfig) -> String {
    use vc_config::ConfigSource;
    match &resolved.source {
        ConfigSource::Cli(path) => format!("--config {}", path.display()),
        ConfigSource::Env(path) => format!("{} {}", vc_config::CONFIG_ENV, path.display()),
        ConfigSource::Xdg(path) => path.display().to_string(),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    }
}
