use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    user_id: Option<String>,
    expires_at: Option<String>,
    storage: &'static str,
}

pub async fn handle(
    args: &AuthLoginArgs,
    clients: &dash_client::Clients,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let session = clients.session();
    if !session.store().is_available() {
        anyhow::bail!("auth login: credential storage is disabled (storage.backend = \"none\")");
    }

    clients.auth().login(&args.email, &args.password).await?;
    let identity = session.identity();

    output(
        &AuthLoginResponse {
            authenticated: true,
            user_id: identity.as_ref().map(|id| id.subject_id.clone()),
            expires_at: identity
                .and_then(|id| chrono::DateTime::from_timestamp(id.expires_at, 0))
                .map(|at| at.to_rfc3339()),
            storage: session.store().backend_name(),
        },
        flags.format,
    )
}
