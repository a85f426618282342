// sensiscan/src/cli.rs
//! This file defines the command-line interface (CLI) for the sensiscan application,
//! including all available commands and their arguments.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sensiscan_core::ConnectionDescriptor;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "sensiscan",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find where known sensitive fields reappear across a database fleet",
    long_about = "Sensiscan starts from a catalog of fields known to hold sensitive data, walks every allow-listed database, schema, table and column, and classifies a column as sensitive when enough of the known values also occur in it. Every evaluated pair is recorded in a ledger, so an interrupted run resumes where it stopped.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Only print errors.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `sensiscan` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs sensitive data discovery over the fleet.
    #[command(about = "Run sensitive data discovery and record the results in the ledger.")]
    Scan(ScanCommand),

    /// Lists the reference fields the catalog holds.
    #[command(about = "List the known sensitive reference fields.")]
    References(CatalogCommand),

    /// Prints the processed-pair ledger.
    #[command(about = "Print the processed-pair ledger.")]
    Ledger(LedgerCommand),

    /// Validates and prints the effective configuration.
    #[command(name = "check-config", about = "Validate and print the effective configuration.")]
    CheckConfig(ConfigArgs),
}

/// Where to connect. Either a URL-shaped descriptor or discrete fields.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// `scheme://host[:port]/database?trusted_connection=true`.
    #[arg(
        long,
        short = 'c',
        env = "SENSISCAN_CONNECTION",
        value_name = "URL",
        conflicts_with_all = ["server", "database"],
        help = "Connection descriptor, e.g. mssql://dwdb:1433/DQ_DEV?trusted_connection=true."
    )]
    pub connection: Option<String>,

    #[arg(long, value_name = "HOST", requires = "database", help = "Server name.")]
    pub server: Option<String>,

    #[arg(long, value_name = "NAME", requires = "server", help = "Home database holding the catalog and the ledger.")]
    pub database: Option<String>,

    #[arg(long = "trusted-connection", help = "Use integrated authentication.")]
    pub trusted_connection: bool,
}

impl ConnectionArgs {
    /// Builds the descriptor from whichever form was given.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor> {
        if let Some(url) = &self.connection {
            let mut descriptor = ConnectionDescriptor::parse(url)?;
            descriptor.trusted_connection |= self.trusted_connection;
            return Ok(descriptor);
        }
        match (&self.server, &self.database) {
            (Some(server), Some(database)) => Ok(ConnectionDescriptor::new(
                server.as_str(),
                database.as_str(),
                self.trusted_connection,
            )),
            _ => bail!("No connection given: pass --connection, set SENSISCAN_CONNECTION, or pass --server and --database."),
        }
    }
}

/// Configuration sources shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a scan configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", help = "Path to a scan configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Overrides `fleet_root` from the configuration.
    #[arg(long = "fleet-root", value_name = "DIR", help = "Directory holding one sub-directory per database.")]
    pub fleet_root: Option<PathBuf>,

    /// Overrides `matching.sensitive_threshold`.
    #[arg(long = "threshold", value_name = "N", help = "Overlap at or above which a column is classified sensitive.")]
    pub threshold: Option<u64>,

    /// Overrides `matching.overlap_cap`.
    #[arg(long = "cap", value_name = "N", help = "Maximum number of distinct matching values counted per comparison.")]
    pub cap: Option<u64>,
}

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Export the run summary to a JSON file.
    #[arg(long = "json-file", value_name = "FILE", help = "Export the run summary to a JSON file.")]
    pub json_file: Option<PathBuf>,

    /// Print the run summary as JSON to stdout (conflicts with --json-file).
    #[arg(long = "json-stdout", conflicts_with = "json_file", help = "Print the run summary to stdout as JSON.")]
    pub json_stdout: bool,
}

/// Arguments for commands that only read the catalog.
#[derive(Args, Debug)]
pub struct CatalogCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `ledger` command.
#[derive(Args, Debug)]
pub struct LedgerCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only list pairs classified as sensitive.
    #[arg(long = "sensitive-only", help = "Only list pairs classified as sensitive.")]
    pub sensitive_only: bool,
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
    fn discrete_connection_fields_build_a_descriptor() {
        let cli = Cli::try_parse_from([
            "sensiscan",
            "scan",
            "--server",
            "dwdb",
            "--database",
            "DQ_DEV",
            "--trusted-connection",
        ])
        .unwrap();
        let Commands::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        let descriptor = scan.connection.descriptor().unwrap();
        assert_eq!(descriptor, ConnectionDescriptor::new("dwdb", "DQ_DEV", true));
    }

    #[test]
    fn url_connection_is_parsed() {
        let args = ConnectionArgs {
            connection: Some("mssql://dwdb:1433/DQ_DEV?trusted_connection=false".into()),
            ..ConnectionArgs::default()
        };
        let descriptor = args.descriptor().unwrap();
        assert_eq!(descriptor.server, "dwdb,1433");
        assert!(!descriptor.trusted_connection);
    }

    #[test]
    fn missing_connection_is_an_error() {
        assert!(ConnectionArgs::default().descriptor().is_err());
    }

    #[test]
    fn json_outputs_conflict() {
        let result = Cli::try_parse_from([
            "sensiscan",
            "scan",
            "--server",
            "s",
            "--database",
            "d",
            "--json-file",
            "out.json",
            "--json-stdout",
        ]);
        assert!(result.is_err());
    }
}
