#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )
)]
// solvereign-cli/src/main.rs
// ============================================================================
// Module: Solvereign CLI Entry Point
// Description: Command dispatcher for the Solvereign HTTP server and
//   storage-schema maintenance.
// Purpose: Provide a thin, safe-by-default operator binary wrapping
//   solvereign-server and solvereign-store-sqlite.
// Dependencies: axum, clap, solvereign-config, solvereign-core,
//   solvereign-rbac, solvereign-server, solvereign-solver,
//   solvereign-store-sqlite, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The Solvereign CLI starts the governance HTTP server (`serve`), applies or
//! verifies the `SQLite` schema ahead of a deployment (`migrate`), and checks
//! that a configuration file loads and validates (`config check`). All
//! user-facing strings are routed through the i18n catalog to prepare for
//! future localization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use solvereign_cli::serve_policy;
use solvereign_cli::t;
use solvereign_config::SolvereignConfig;
use solvereign_config::SolverMode;
use solvereign_config::StorageJournalMode;
use solvereign_config::StorageSyncMode;
use solvereign_core::PlanSolver;
use solvereign_server::AppState;
use solvereign_server::StderrAuditSink;
use solvereign_solver::DeterministicSolver;
use solvereign_solver::HttpSolver;
use solvereign_solver::HttpSolverConfig;
use solvereign_store_sqlite::SqliteStore;
use solvereign_store_sqlite::SqliteStoreConfig;
use solvereign_store_sqlite::SqliteStoreMode;
use solvereign_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "solvereign",
    disable_help_subcommand = true,
    disable_version_flag = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Solvereign HTTP server.
    Serve(ServeCommand),
    /// Initialize or verify the `SQLite` schema without starting the server.
    Migrate(MigrateCommand),
    /// Configuration inspection utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to solvereign.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Opt in to binding a non-loopback address.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Configuration for the `migrate` command.
#[derive(Args, Debug)]
struct MigrateCommand {
    /// Optional config file path (defaults to solvereign.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file, reporting resolved storage/bind settings.
    Check(ConfigCheckCommand),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to solvereign.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Migrate(command) => command_migrate(&command),
        Commands::Config { command } => match command {
            ConfigCommand::Check(command) => command_config_check(&command),
        },
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;

    let allow_non_loopback = serve_policy::resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    let outcome = serve_policy::enforce_bind_policy(&config.server.bind, allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    if outcome.network_exposed {
        warn_network_exposed(&config.server.bind)?;
    }

    let store_path = config.storage.path.clone();
    let store = open_store(&config)
        .map_err(|err| CliError::new(t!("serve.store.open_failed", path = store_path.display(), error = err)))?;
    let solver = build_solver(&config)?;
    let state = AppState::new(
        Arc::new(store),
        solver,
        Arc::new(config.clone()),
        Arc::new(StderrAuditSink),
        Arc::new(solvereign_rbac::StderrAuditSink),
    );
    let router = solvereign_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(outcome.bind_addr)
        .await
        .map_err(|err| CliError::new(t!("serve.listener.bind_failed", bind = outcome.bind_addr, error = err)))?;
    write_stdout_line(&t!("serve.ready", bind = outcome.bind_addr, path = config.storage.path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    axum::serve(listener, router).await.map_err(|err| CliError::new(t!("serve.failed", error = err)))?;

    Ok(ExitCode::SUCCESS)
}

/// Emits the mandatory network-exposure warning to stderr.
fn warn_network_exposed(bind: &str) -> CliResult<()> {
    write_stderr_line(&t!("serve.warn.network.header")).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    write_stderr_line(&t!("serve.warn.network.bind", bind = bind))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    write_stderr_line(&t!("serve.warn.network.footer")).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(())
}

/// Builds the solver gateway adapter selected by configuration.
fn build_solver(config: &SolvereignConfig) -> CliResult<Arc<dyn PlanSolver + Send + Sync>> {
    match config.solver.mode {
        SolverMode::Deterministic => Ok(Arc::new(DeterministicSolver::new())),
        SolverMode::Http => {
            let url = config.solver.url.clone().ok_or_else(|| CliError::new(t!("serve.solver.url_missing")))?;
            let solver = HttpSolver::new(HttpSolverConfig::new(url))
                .map_err(|err| CliError::new(t!("serve.failed", error = err)))?;
            Ok(Arc::new(solver))
        }
    }
}

// ============================================================================
// SECTION: Migrate Command
// ============================================================================

/// Executes the `migrate` command: opens (and thereby initializes or
/// verifies) the configured `SQLite` store, then exits.
fn command_migrate(command: &MigrateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let path = config.storage.path.clone();
    let _store = open_store(&config).map_err(|err| CliError::new(t!("migrate.store.open_failed", path = path.display(), error = err)))?;
    write_stdout_line(&t!("migrate.ok", path = path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the `config check` command.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.check.ok", path = config.storage.path.display(), bind = config.server.bind))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates configuration from an optional path.
fn load_config(path: Option<&std::path::Path>) -> CliResult<SolvereignConfig> {
    SolvereignConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the configured `SQLite` store, initializing or verifying its schema.
fn open_store(config: &SolvereignConfig) -> Result<SqliteStore, solvereign_store_sqlite::SqliteStoreError> {
    SqliteStore::new(SqliteStoreConfig {
        path: config.storage.path.clone(),
        busy_timeout_ms: config.storage.busy_timeout_ms,
        journal_mode: match config.storage.journal_mode {
            StorageJournalMode::Wal => SqliteStoreMode::Wal,
            StorageJournalMode::Delete => SqliteStoreMode::Delete,
        },
        sync_mode: match config.storage.sync_mode {
            StorageSyncMode::Full => SqliteSyncMode::Full,
            StorageSyncMode::Normal => SqliteSyncMode::Normal,
        },
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
