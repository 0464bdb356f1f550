//! `cpm-recon` - recompute project and portfolio costs from task data

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cpm_client::{HttpApiClient, TokenConfig};
use cpm_recon::{default_sources, PortfolioReconciler};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod render;
mod settings;

use settings::Settings;

fn cli() -> Command {
    Command::new("cpm-recon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Client-side cost reconciliation for the CPM backend")
        .subcommand(
            Command::new("reconcile")
                .about("Recompute every project's realized cost and the portfolio totals")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML settings file with [api] and [reconcile] tables"),
                )
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .value_name("URL")
                        .help("Backend origin, e.g. http://localhost:3000/api"),
                )
                .arg(
                    Arg::new("token-file")
                        .long("token-file")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the bearer token, re-read on every request"),
                )
                .arg(
                    Arg::new("enrichment-concurrency")
                        .long("enrichment-concurrency")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Cost lookups in flight per project"),
                )
                .arg(
                    Arg::new("project-concurrency")
                        .long("project-concurrency")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Projects reconciled at once"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                )
                .arg(
                    Arg::new("log-json")
                        .long("log-json")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON lines on stderr"),
                ),
        )
        .subcommand(Command::new("sources").about("List the task endpoints in probe order"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("reconcile", args)) => {
            init_logging(args.get_flag("log-json"));
            match reconcile(args).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("reconciliation aborted: {e:#}");
                    eprintln!("error: {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(("sources", _)) => {
            print!("{}", render::sources_text(&default_sources()));
            ExitCode::SUCCESS
        }
        _ => {
            println!("cpm-recon {}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Settings from file, environment and flags, in increasing precedence
fn resolve_settings(args: &ArgMatches) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    settings.api.apply_env();

    if let Some(url) = args.get_one::<String>("base-url") {
        settings.api.base_url.clone_from(url);
    }
    if let Some(path) = args.get_one::<PathBuf>("token-file") {
        settings.api.token = TokenConfig::File { path: path.clone() };
    }
    if let Some(&n) = args.get_one::<usize>("enrichment-concurrency") {
        settings.reconcile.enrichment_concurrency = n;
    }
    if let Some(&n) = args.get_one::<usize>("project-concurrency") {
        settings.reconcile.project_concurrency = n;
    }
    Ok(settings)
}

async fn reconcile(args: &ArgMatches) -> anyhow::Result<()> {
    let settings = resolve_settings(args)?;
    tracing::debug!("settings: {settings:?}");

    let client = HttpApiClient::new(settings.api).context("invalid API settings")?;
    let reconciler = PortfolioReconciler::new(Arc::new(client), settings.reconcile)
        .context("invalid reconcile settings")?;

    let report = reconciler
        .reconcile_all()
        .await
        .context("could not load the project list")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::report_text(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile_args(argv: &[&str]) -> ArgMatches {
        let matches = cli()
            .try_get_matches_from(std::iter::once("cpm-recon").chain(argv.iter().copied()))
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "reconcile");
        args.clone()
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_override_file_settings() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[api]\nbase_url = \"http://file.example/api\"\n\n[reconcile]\nenrichment_concurrency = 3\n",
        )
        .unwrap();
        let config = file.path().to_str().unwrap();

        let args = reconcile_args(&[
            "reconcile",
            "--config",
            config,
            "--base-url",
            "http://flag.example/api",
            "--token-file",
            "/run/secrets/cpm",
            "--project-concurrency",
            "2",
        ]);
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.api.base_url, "http://flag.example/api");
        assert_eq!(
            settings.api.token,
            TokenConfig::File {
                path: PathBuf::from("/run/secrets/cpm")
            }
        );
        assert_eq!(settings.reconcile.enrichment_concurrency, 3);
        assert_eq!(settings.reconcile.project_concurrency, 2);
    }

    #[test]
    fn rejects_non_numeric_concurrency() {
        let result = cli().try_get_matches_from([
            "cpm-recon",
            "reconcile",
            "--enrichment-concurrency",
            "many",
        ]);
        assert!(result.is_err());
    }
}
