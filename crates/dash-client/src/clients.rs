//! Dual client composition: main and system pipelines sharing one session.

use std::sync::Arc;
use std::time::Duration;

use dash_auth::store::{DetachedBackend, FileBackend, KeyringBackend};
use dash_auth::{CredentialStore, Session, SessionOptions};
use dash_config::{ConfigError, DashConfig, StorageBackend, StorageConfig};

use crate::auth_api::AuthApi;
use crate::error::ClientError;
use crate::pipeline::{ClientPipeline, Endpoint};
use crate::renew::GraphqlRenewer;
use crate::transport::{HttpTransport, Transport};

/// Both endpoint pipelines. A refresh triggered through either one serves
/// both, since they share the same [`Session`].
pub struct Clients {
    pub main: ClientPipeline,
    pub system: ClientPipeline,
    session: Arc<Session>,
    system_transport: Arc<dyn Transport>,
}

impl Clients {
    /// Compose pipelines over the given transports. The renewal RPC goes to
    /// `system_transport`.
    pub fn new(
        main_transport: Arc<dyn Transport>,
        system_transport: Arc<dyn Transport>,
        store: Arc<CredentialStore>,
        options: SessionOptions,
    ) -> Self {
        let renewer = Arc::new(GraphqlRenewer::new(Arc::clone(&system_transport)));
        let session = Session::new(store, renewer, options);
        Self {
            main: ClientPipeline::new(Endpoint::Main, main_transport, &session),
            system: ClientPipeline::new(Endpoint::System, Arc::clone(&system_transport), &session),
            session,
            system_transport,
        }
    }

    /// # Errors
    ///
    /// `ClientError::Config` when endpoints are missing or the storage
    /// location cannot be resolved, `ClientError::Transport` when the HTTP
    /// client cannot be built.
    pub fn from_config(config: &DashConfig) -> Result<Self, ClientError> {
        let endpoints = config.require_endpoints()?;
        let main: Arc<dyn Transport> = Arc::new(
            HttpTransport::from_config(&endpoints.main_url, &config.http)
                .map_err(ClientError::Transport)?,
        );
        let system: Arc<dyn Transport> = Arc::new(
            HttpTransport::from_config(&endpoints.system_url, &config.http)
                .map_err(ClientError::Transport)?,
        );
        let store = Arc::new(open_store(&config.storage)?);
        let options = SessionOptions {
            refresh_threshold_secs: config.auth.refresh_threshold_secs,
            failure_cooldown: Duration::from_secs(config.auth.failure_cooldown_secs),
            login_url: config.auth.login_url().map(str::to_string),
        };
        tracing::debug!(
            main = %endpoints.main_url,
            system = %endpoints.system_url,
            backend = store.backend_name(),
            "clients configured"
        );
        Ok(Self::new(main, system, store, options))
    }

    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn pipeline(&self, endpoint: Endpoint) -> &ClientPipeline {
        match endpoint {
            Endpoint::Main => &self.main,
            Endpoint::System => &self.system,
        }
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(Arc::clone(&self.system_transport), Arc::clone(&self.session))
    }
}

/// Credential store for the configured backend.
///
/// # Errors
///
/// `ConfigError::InvalidValue` when a file-backed store has no resolvable path.
pub fn open_store(storage: &StorageConfig) -> Result<CredentialStore, ConfigError> {
    let file = || {
        storage
            .credentials_path()
            .map(FileBackend::new)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "storage.credentials_path".to_string(),
                reason: "no home directory to resolve the default path".to_string(),
            })
    };

    Ok(match storage.backend {
        StorageBackend::Keyring => CredentialStore::new(KeyringBackend::new(
            storage.keyring_service.clone(),
            file().ok(),
        )),
        StorageBackend::File => CredentialStore::new(file()?),
        StorageBackend::Memory => CredentialStore::in_memory(),
        StorageBackend::None => CredentialStore::new(DetachedBackend),
    })
}
