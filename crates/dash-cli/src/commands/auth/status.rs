use chrono::Utc;
use dash_auth::inspector;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    storage: &'static str,
    storage_available: bool,
    user_id: Option<String>,
    expires_at: Option<String>,
    seconds_left: Option<i64>,
    refresh_due: Option<bool>,
    has_refresh_token: bool,
    note: Option<String>,
}

pub fn handle(clients: &dash_client::Clients, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = clients.session();
    let store = session.store();
    let now = Utc::now();
    let access = store.get_access();
    let claims = access.as_deref().and_then(inspector::decode);

    let note = match (&access, &claims) {
        _ if !store.is_available() => Some("credential storage disabled".to_string()),
        (None, _) => Some("no stored credentials; run `dash auth login`".to_string()),
        (Some(_), None) => Some("stored access token is not a readable JWT".to_string()),
        (Some(_), Some(_)) => None,
    };

    let status = AuthStatusResponse {
        authenticated: access.is_some(),
        storage: store.backend_name(),
        storage_available: store.is_available(),
        user_id: claims.as_ref().and_then(|c| c.subject_id.clone()),
        expires_at: claims
            .as_ref()
            .and_then(inspector::DecodedAccessClaims::expires_at_utc)
            .map(|at| at.to_rfc3339()),
        seconds_left: access
            .as_deref()
            .and_then(|token| inspector::seconds_until_expiry(token, now)),
        refresh_due: access
            .as_deref()
            .map(|token| inspector::should_refresh(token, session.refresh_threshold_secs(), now)),
        has_refresh_token: store.get_refresh().is_some(),
        note,
    };

    output(&status, flags.format)
}
