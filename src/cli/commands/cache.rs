//! Cache subcommands.

use clap::{Args, Subcommand};

use crate::cli::{CliError, GlobalArgs, Result, emit};
use crate::document::key_prefix_pattern;
use crate::handler::Handler;

// =============================================================================
// Cache Subcommands
// =============================================================================

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove every service data entry from the cache.
    Clear,

    /// List cached entries.
    #[command(name = "list-entries")]
    ListEntries(ListEntriesArgs),
}

impl CacheCommand {
    /// Run the cache subcommand.
    pub async fn run(self, handler: &Handler, global: &GlobalArgs) -> Result<()> {
        match self {
            CacheCommand::Clear => emit(handler.clear_cache().await, global).await,
            CacheCommand::ListEntries(args) => args.run(handler, global).await,
        }
    }
}

// =============================================================================
// ListEntries
// =============================================================================

/// Arguments for the list-entries command.
#[derive(Args, Debug)]
pub struct ListEntriesArgs {
    /// Optional key prefix (after the namespace) to filter entries.
    pub prefix: Option<String>,
}

impl ListEntriesArgs {
    pub async fn run(self, handler: &Handler, global: &GlobalArgs) -> Result<()> {
        let cache = handler.service().cache();
        let pattern = key_prefix_pattern(self.prefix.as_deref().unwrap_or(""));

        let mut keys = cache
            .scan_keys(&pattern)
            .await
            .map_err(|e| CliError::Other(e.to_string()))?;
        keys.sort();

        let mut output = String::new();
        for key in keys {
            // Entries can disappear between the scan and the lookup.
            if let Some(value) = cache
                .get_raw(&key)
                .await
                .map_err(|e| CliError::Other(e.to_string()))?
            {
                output.push_str(&format!("{} -> {}\n", key, value));
            }
        }

        // Remove trailing newline for consistent output
        let output = output.trim_end();
        if !output.is_empty() {
            global.output.write_str(output).await?;
        }

        Ok(())
    }
}
