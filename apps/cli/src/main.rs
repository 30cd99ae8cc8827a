mod args;
mod config;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use app_api::{AppContext, EmptyRequest, organization_rows, render_totals_table};
use clap::Parser;
use http_api::HttpState;
use serde::Serialize;
use storage_app::{AppConfig, AppError, AppState, resolve_config_path};
use storage_core::{UnattributedUsage, UsageTotals};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command, OutputFormat, ReportArgs, ServeArgs};

const STORAGE_CRATES: [&str; 7] = [
    "aggregate",
    "storage_catalog",
    "storage_db",
    "storage_graph",
    "storage_app",
    "http_api",
    "storage_admin_cli",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init => {
            let path = resolve_config_path(cli.config);
            if config::write_template(&path)? {
                println!("Created config at {}.", path.display());
            } else {
                println!("Config already exists at {}; left unchanged.", path.display());
            }
            Ok(())
        }
        Command::Serve(args) => serve(cli.config, args).await,
        Command::Report(args) => report(cli.config, args).await,
    }
}

fn init_tracing(verbose: u8) {
    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if verbose > 0 {
        for target in STORAGE_CRATES {
            if let Ok(parsed) = format!("{target}=debug").parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn app_context(config_path: Option<PathBuf>) -> Result<(AppContext, AppConfig), AppError> {
    let loaded = config::load(config_path)?;
    info!(path = %loaded.path.display(), "config loaded");
    let app_state = AppState::from_config(loaded.config.clone())?;
    Ok((AppContext::new(app_state), loaded.config))
}

async fn serve(
    config_path: Option<PathBuf>,
    args: ServeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (context, config) = app_context(config_path)?;
    let addr: SocketAddr = match args.bind {
        Some(bind) => bind.parse().map_err(|err| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("--bind {bind:?}: {err}"))
        })?,
        None => config.bind_addr()?,
    };
    if config.server.api_token.is_none() {
        warn!("no API token configured; /api is open to anyone who can reach {addr}");
    }

    let state = HttpState::new(context, config.server.api_token.clone());
    let router = http_api::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    println!("storage-admin is listening on http://{local}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn report(
    config_path: Option<PathBuf>,
    args: ReportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (context, _) = app_context(config_path)?;
    let format = args.format;

    if args.full {
        let report = app_api::usage_report(&context, EmptyRequest::default()).await?;
        if format == OutputFormat::Json {
            return print_json(&report);
        }
        println!("Generated at {}\n", report.generated_at);
        let mut rows = vec![("(all)".to_string(), report.global)];
        rows.extend(organization_rows(&report.per_organization));
        rows.push(("(unattributed)".to_string(), report.unattributed.totals));
        print!("{}", render_totals_table(&rows));
        print_unattributed_items(&report.unattributed);
    } else if args.per_org {
        let per_org = app_api::used_space_per_org(&context, EmptyRequest::default()).await?;
        if format == OutputFormat::Json {
            return print_json(&per_org);
        }
        print!("{}", render_totals_table(&organization_rows(&per_org)));
    } else if args.unattributed {
        let unattributed = app_api::unattributed_space(&context, EmptyRequest::default()).await?;
        if format == OutputFormat::Json {
            return print_json(&unattributed);
        }
        print!(
            "{}",
            render_totals_table(&[("(unattributed)".to_string(), unattributed.totals)])
        );
        print_unattributed_items(&unattributed);
    } else {
        let global: UsageTotals = app_api::used_space(&context, EmptyRequest::default()).await?;
        if format == OutputFormat::Json {
            return print_json(&global);
        }
        print!("{}", render_totals_table(&[("(all)".to_string(), global)]));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_unattributed_items(unattributed: &UnattributedUsage) {
    if !unattributed.resources.is_empty() {
        println!("\nResources without an owning organization:");
        for record in &unattributed.resources {
            println!(
                "  {} {} {} {}",
                record.component,
                record.resource_id,
                record.magnitude,
                record.component.unit()
            );
        }
    }
    if !unattributed.graphs.is_empty() {
        println!("\nGraphs left out of the per-organization view:");
        for graph in &unattributed.graphs {
            let reason = serde_json::to_string(&graph.reason).unwrap_or_default();
            println!("  {} {}", graph.graph, reason);
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
