use crate::{
    api::{
        self,
        handlers::auth::{
            AuthConfig, AuthState, MemorySessionStore, PgSessionStore, SessionStore, TwitterConfig,
        },
    },
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub is_local: bool,
    pub frontend_base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub cookie_domain: Option<String>,
    pub twitter_consumer_key: String,
    pub twitter_consumer_secret: SecretString,
    pub twitter_api_url: String,
}

impl Args {
    /// Site configuration: local or production defaults, then explicit
    /// overrides.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        let mut config = if self.is_local {
            AuthConfig::local()
        } else {
            AuthConfig::new()
        };
        if let Some(url) = &self.frontend_base_url {
            config = config.with_frontend_base_url(url.clone());
        }
        if let Some(url) = &self.api_base_url {
            config = config.with_api_base_url(url.clone());
        }
        if self.cookie_domain.is_some() {
            config = config.with_cookie_domain(self.cookie_domain.clone());
        }
        config
    }

    #[must_use]
    pub fn twitter_config(&self) -> TwitterConfig {
        TwitterConfig::new(
            self.twitter_consumer_key.clone(),
            self.twitter_consumer_secret.clone(),
        )
        .with_api_url(self.twitter_api_url.clone())
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the configuration is
/// invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store: Arc<dyn SessionStore> = match &args.dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            Arc::new(PgSessionStore::new(pool))
        }
        None => {
            warn!("No DSN configured, sessions and users are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let auth_config = args.auth_config();
    debug!("Auth config: {:?}", auth_config);

    let auth_state = Arc::new(AuthState::new(auth_config, &args.twitter_config(), store)?);

    let result = api::new(args.port, auth_state).await;

    telemetry::shutdown_tracer();

    result
}
