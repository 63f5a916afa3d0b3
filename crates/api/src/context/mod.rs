//! Application context - dependency injection container

use std::sync::Arc;

use rda_core::{
    AuthorizationInitiator, CallbackOrchestrator, DashboardService, NameDirectory, ReplayGuard,
    SessionDirectory, SessionProvider, TokenRefreshService, UpstreamAuth,
};
use rda_domain::{Config, Result};
use rda_infra::{
    AttemptSealer, EsiClient, EveSsoClient, HttpClient, InMemorySessionStore, NameResolver,
    NameResolverConfig, ReplayLedger, SessionStoreClient,
};
use tracing::info;

/// Type alias for session provider port trait object
type DynSessionProvider = dyn SessionProvider + 'static;

/// Type alias for session directory port trait object
type DynSessionDirectory = dyn SessionDirectory + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub initiator: AuthorizationInitiator,
    pub orchestrator: CallbackOrchestrator,
    pub dashboard: DashboardService,
    pub directory: Arc<DynSessionDirectory>,
    pub sealer: AttemptSealer,
}

impl AppContext {
    /// Wire every adapter from configuration
    ///
    /// # Errors
    /// Returns `RdaError::Config` for unusable upstream URLs or if the HTTP
    /// client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpClient::new()?;

        let sso = EveSsoClient::new(&config.provider, http.clone())?;
        let initiator = AuthorizationInitiator::new(sso.oauth_config().clone());
        let upstream: Arc<dyn UpstreamAuth> = Arc::new(sso);

        let esi = Arc::new(EsiClient::new(&config.esi, http.clone()));

        let (provider, directory) = session_store(&config, http);

        let names_config = NameResolverConfig::from(&config.names);
        let directory_names: Arc<dyn NameDirectory> =
            Arc::new(NameResolver::new(esi.clone(), names_config));

        let replay: Arc<dyn ReplayGuard> = Arc::new(ReplayLedger::new());
        let orchestrator = CallbackOrchestrator::new(upstream.clone(), provider.clone(), replay);
        let dashboard = DashboardService::new(
            TokenRefreshService::new(upstream),
            provider,
            esi,
            directory_names,
        );

        let sealer = AttemptSealer::new(&config.server.attempt_signing_key);

        info!(
            sso = %config.provider.sso_base_url,
            esi = %config.esi.base_url,
            in_memory_store = config.session_store.is_in_memory(),
            "application context initialised"
        );

        Ok(Self { config, initiator, orchestrator, dashboard, directory, sealer })
    }

    /// Prefix a local path with the public origin, when one is configured
    pub fn location(&self, path: &str) -> String {
        match &self.config.server.public_origin {
            Some(origin) => format!("{}{}", origin.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}

fn session_store(
    config: &Config,
    http: HttpClient,
) -> (Arc<DynSessionProvider>, Arc<DynSessionDirectory>) {
    if config.session_store.is_in_memory() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider: Arc<DynSessionProvider> = store.clone();
        let directory: Arc<DynSessionDirectory> = store;
        (provider, directory)
    } else {
        let store = Arc::new(SessionStoreClient::new(&config.session_store, http));
        let provider: Arc<DynSessionProvider> = store.clone();
        let directory: Arc<DynSessionDirectory> = store;
        (provider, directory)
    }
}
