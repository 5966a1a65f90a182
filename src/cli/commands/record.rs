//! Document record subcommands.

use clap::Args;

use crate::cli::{GlobalArgs, InputSource, Result, emit};
use crate::handler::Handler;

// =============================================================================
// Add
// =============================================================================

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// JSON object to merge into the document. Read from stdin if neither
    /// this nor --input-file is given.
    pub json: Option<String>,

    #[command(flatten)]
    pub input: InputSource,
}

impl AddArgs {
    pub async fn run(self, handler: &Handler, global: &GlobalArgs) -> Result<()> {
        let body = self.input.read(self.json.as_deref()).await?;
        let body = (!body.is_empty()).then_some(body);
        emit(handler.add(body.as_deref()).await, global).await
    }
}

// =============================================================================
// Read
// =============================================================================

/// Arguments for the read command.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Dotted key path, e.g. `svc.port`.
    pub key: String,
}

impl ReadArgs {
    pub async fn run(self, handler: &Handler, global: &GlobalArgs) -> Result<()> {
        emit(handler.read(Some(&self.key)).await, global).await
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Top-level field name.
    pub key: String,
}

impl DeleteArgs {
    pub async fn run(self, handler: &Handler, global: &GlobalArgs) -> Result<()> {
        emit(handler.delete(Some(&self.key)).await, global).await
    }
}
