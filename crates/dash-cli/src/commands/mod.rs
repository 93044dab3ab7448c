pub mod auth;
pub mod query;

use dash_client::Clients;

use crate::cli::{Commands, GlobalFlags};

pub async fn dispatch(command: Commands, clients: &Clients, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(&action, clients, flags).await,
        Commands::Query(args) => query::handle(&args, clients, flags).await,
    }
}
