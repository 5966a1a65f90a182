//! Command-line interface for svcdata.

pub mod args;
mod commands;
mod logging;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::warn;

use crate::app::{App, AppError};
use crate::handler::Response;

pub use args::{GlobalArgs, InputSource, OutputSink};
pub use logging::init_logging;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// The request completed with a non-success status. The response body
    /// has already been written.
    #[error("request failed with status {0}")]
    Status(u16),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// svcdata - A cached JSON record store.
#[derive(Parser, Debug)]
#[command(name = "svcdata", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge a JSON object into the document.
    Add(commands::record::AddArgs),

    /// Read the value at a dotted key path.
    Read(commands::record::ReadArgs),

    /// Delete a top-level field.
    Delete(commands::record::DeleteArgs),

    /// Print the whole document.
    Dump,

    /// Cache operations.
    Cache {
        #[command(subcommand)]
        command: commands::cache::CacheCommand,
    },
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let app = App::new(self.global.to_app_context())?;

        init_logging(&app.config().log);
        for warning in app.warnings() {
            warn!("{}", warning);
        }

        let handler = app.create_handler().await?;

        match self.command {
            Command::Add(args) => args.run(&handler, &self.global).await,
            Command::Read(args) => args.run(&handler, &self.global).await,
            Command::Delete(args) => args.run(&handler, &self.global).await,
            Command::Dump => emit(handler.dump().await, &self.global).await,
            Command::Cache { command } => command.run(&handler, &self.global).await,
        }
    }
}

/// Write a response body, failing if its status is not a success.
pub(crate) async fn emit(response: Response, global: &GlobalArgs) -> Result<()> {
    global.output.write_json(&response.body).await?;
    if response.is_success() {
        Ok(())
    } else {
        Err(CliError::Status(response.status))
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::path::Path;
    use tempfile::TempDir;

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let store = format!("file://{}/service_data.json", dir.display());
        let output = dir.join("out.json");
        let mut argv = vec![
            "svcdata".to_string(),
            "--store".to_string(),
            store,
            "--cache-url".to_string(),
            "memory://".to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        argv.extend(args.iter().map(|s| s.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    async fn output(dir: &Path) -> Value {
        let raw = tokio::fs::read_to_string(dir.join("out.json")).await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        let parsed = Cli::try_parse_from(["svcdata", "read", "svc.port"]).unwrap();
        assert!(matches!(parsed.command, Command::Read(ref a) if a.key == "svc.port"));

        let parsed =
            Cli::try_parse_from(["svcdata", "cache", "list-entries", "svc", "--no-cache"]).unwrap();
        assert!(parsed.global.no_cache);
        assert!(matches!(parsed.command, Command::Cache { .. }));

        let parsed = Cli::try_parse_from([
            "svcdata",
            "--config",
            "cache.scan_page_size=10",
            "add",
            "-f",
            "body.json",
        ])
        .unwrap();
        assert_eq!(
            parsed.global.config_overrides,
            vec![("cache.scan_page_size".to_string(), "10".to_string())]
        );

        assert!(Cli::try_parse_from(["svcdata", "read"]).is_err());
        assert!(Cli::try_parse_from(["svcdata", "--config", "novalue", "dump"]).is_err());
    }

    #[tokio::test]
    async fn test_run_against_file_store() {
        let dir = TempDir::new().unwrap();

        cli(dir.path(), &["add", r#"{"svc":{"region":"us","port":8080}}"#])
            .run()
            .await
            .unwrap();
        assert_eq!(
            output(dir.path()).await,
            json!({"message": "Data saved successfully"})
        );

        cli(dir.path(), &["read", "svc.port"]).run().await.unwrap();
        assert_eq!(output(dir.path()).await, json!({"svc.port": 8080}));

        cli(dir.path(), &["delete", "svc"]).run().await.unwrap();

        let err = cli(dir.path(), &["read", "svc.port"]).run().await.unwrap_err();
        assert!(matches!(err, CliError::Status(404)));
        assert_eq!(
            output(dir.path()).await,
            json!({"error": "Key \"svc.port\" not found in data"})
        );

        cli(dir.path(), &["dump"]).run().await.unwrap();
        assert_eq!(output(dir.path()).await, json!({}));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_body() {
        let dir = TempDir::new().unwrap();
        let body = dir.path().join("empty.json");
        tokio::fs::write(&body, "  \n").await.unwrap();

        let err = cli(dir.path(), &["add", "-f", body.to_str().unwrap()])
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Status(400)));
        assert_eq!(
            output(dir.path()).await,
            json!({"error": "Invalid JSON format"})
        );
    }
}
