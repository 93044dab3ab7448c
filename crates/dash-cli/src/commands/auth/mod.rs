mod login;
mod logout;
mod refresh;
mod status;

use dash_client::Clients;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `dash auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    clients: &Clients,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, clients, flags).await,
        AuthCommands::Logout => logout::handle(clients, flags).await,
        AuthCommands::Status => status::handle(clients, flags),
        AuthCommands::Refresh => refresh::handle(clients, flags).await,
    }
}
