use clap::{Args, Subcommand};

use crate::cli::subcommands::AuthCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Authentication.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Run a GraphQL query or mutation.
    Query(QueryArgs),
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// GraphQL document.
    pub query: String,
    /// Send to the system endpoint instead of the main one.
    #[arg(long)]
    pub system: bool,
    /// Variables as a JSON object.
    #[arg(long)]
    pub variables: Option<String>,
    /// Operation to run when the document defines several.
    #[arg(long)]
    pub operation_name: Option<String>,
}
