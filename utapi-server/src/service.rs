use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use utapi_config::Config;
use utapi_redis::Datastore;

/// Indicates the type of failure of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding the listener failed.
    #[error("bind to interface failed")]
    BindFailed(#[from] std::io::Error),

    /// The configuration is invalid.
    #[error("configuration error")]
    Config(#[from] utapi_config::ConfigError),

    /// Initializing the Redis client failed.
    #[error("could not initialize redis client")]
    Redis(#[from] utapi_redis::StoreError),

    /// The query service cannot run without a backing store.
    #[error("no redis instance configured")]
    RedisNotConfigured,
}

#[derive(Debug)]
struct StateInner {
    config: Config,
    datastore: Datastore,
}

/// Server state shared by all request handlers.
#[derive(Clone, Debug)]
pub struct ServiceState {
    inner: Arc<StateInner>,
}

impl ServiceState {
    /// Creates the state from `config`, connecting the backing store.
    ///
    /// Unlike the write client, the query service has no disabled mode and
    /// refuses to start without a configured store.
    pub fn create(config: Config) -> Result<Self, ServerError> {
        let redis = config.redis().ok_or(ServerError::RedisNotConfigured)?;
        let datastore = Datastore::redis(redis)?;
        Ok(Self::with_datastore(config, datastore))
    }

    /// Creates the state on top of an existing datastore handle.
    pub fn with_datastore(config: Config, datastore: Datastore) -> Self {
        Self {
            inner: Arc::new(StateInner { config, datastore }),
        }
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the backing store handle.
    pub fn datastore(&self) -> &Datastore {
        &self.inner.datastore
    }

    /// Looks up the secret for an access key id.
    pub fn secret_key(&self, access_key: &str) -> Option<&str> {
        self.inner
            .config
            .access_keys()
            .get(access_key)
            .map(String::as_str)
    }
}

impl FromRequestParts<ServiceState> for ServiceState {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
