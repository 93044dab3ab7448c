use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthRefreshResponse {
    renewed: bool,
    attempt: u64,
    expires_at: Option<String>,
}

pub async fn handle(clients: &dash_client::Clients, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = clients.session();
    if session.store().get_refresh().is_none() {
        anyhow::bail!("auth refresh: no refresh token stored; run `dash auth login`");
    }

    let Some(_pair) = session.coordinator().refresh().await else {
        anyhow::bail!("auth refresh: the server rejected the refresh token; credentials cleared");
    };

    output(
        &AuthRefreshResponse {
            renewed: true,
            attempt: session.coordinator().attempts(),
            expires_at: session
                .identity()
                .and_then(|id| chrono::DateTime::from_timestamp(id.expires_at, 0))
                .map(|at| at.to_rfc3339()),
        },
        flags.format,
    )
}
