//! Surfaces the end of a session to the user.

use dash_auth::SessionEvent;
use dash_client::Clients;
use dash_config::AuthConfig;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Listen for session events until every client is dropped.
pub fn spawn(clients: &Clients, auth: &AuthConfig, quiet: bool) -> JoinHandle<()> {
    let mut events = clients.session().subscribe();
    let open_login = auth.open_login_on_expiry;

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Renewed { attempt }) => {
                    tracing::debug!(attempt, "session renewed");
                }
                Ok(SessionEvent::Ended { attempt, login_url }) => {
                    tracing::debug!(attempt, "session ended");
                    on_ended(login_url.as_deref(), open_login, quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "missed session events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn on_ended(login_url: Option<&str>, open_login: bool, quiet: bool) {
    if !quiet {
        eprintln!("dash: session expired, run `dash auth login` to sign in again");
    }

    let Some(url) = login_url else {
        return;
    };
    if !open_login {
        if !quiet {
            eprintln!("dash: login page: {url}");
        }
        return;
    }
    if let Err(error) = open::that(url) {
        tracing::warn!(%error, url, "failed to open login page");
    }
}
