use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
}

pub async fn handle(clients: &dash_client::Clients, flags: &GlobalFlags) -> anyhow::Result<()> {
    clients.auth().logout().await?;
    output(&AuthLogoutResponse { cleared: true }, flags.format)
}
