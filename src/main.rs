//! mathviz-mcp: MCP server for mathematics and visualisation tools
//!
//! Serves the math, visualization and resource providers over stdio, or
//! over TCP with `--listen`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mathviz_mcp::config;
use mathviz_mcp::mcp::server::{self, McpServer};
use mathviz_mcp::mcp::Dispatcher;
use mathviz_mcp::providers;

/// MCP server for mathematics and visualisation tools.
///
/// Exposes arithmetic, equation solving, geometry, chart specifications and
/// educational resources to MCP clients.
#[derive(Parser, Debug)]
#[command(name = "mathviz-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Serve over TCP on this address instead of stdio
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout is reserved for protocol frames.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the mathviz-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nLoaded from: {}", default_path.display());
                    eprintln!("Compare it against config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // GPLv3 Section 5d notice
    eprintln!(
        "mathviz-mcp {}  Copyright (C) 2026  The MathViz Contributors",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    let (tools, resources) = match providers::build_registries(&cfg) {
        Ok(registries) => registries,
        Err(e) => {
            error!(error = %e, "Failed to register providers");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        math = cfg.providers.math,
        visualization = cfg.providers.visualization,
        resources = cfg.providers.resources,
        tool_count = tools.len(),
        resource_count = resources.len(),
        "Starting mathviz-mcp server"
    );

    if cfg.visualization.write_files {
        info!(
            output_dir = %cfg.visualization.output_dir.display(),
            "Chart specifications will be written to disk"
        );
    }

    let dispatcher = Dispatcher::new(tools, resources);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        match args.listen {
            Some(addr) => server::listen(addr, dispatcher).await,
            None => {
                info!("MCP server ready, waiting for client connection...");
                McpServer::stdio(dispatcher).run().await
            }
        }
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
