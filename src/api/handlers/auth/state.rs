//! Auth state and configuration.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use url::Url;

use super::{session::SessionManager, storage::SessionStore, twitter::TwitterClient};

const DEFAULT_FRONTEND_BASE_URL: &str = "https://watercolor.site";
const DEFAULT_API_BASE_URL: &str = "https://api.watercolor.site";
const DEFAULT_COOKIE_DOMAIN: &str = "watercolor.site";
const LOCAL_FRONTEND_BASE_URL: &str = "http://localhost:4200";
const LOCAL_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    api_base_url: String,
    cookie_domain: Option<String>,
    local: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    /// Production defaults: HTTPS, cookie pinned to the site domain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cookie_domain: Some(DEFAULT_COOKIE_DOMAIN.to_string()),
            local: false,
        }
    }

    /// Local development: plain HTTP on localhost, host-only cookie.
    #[must_use]
    pub fn local() -> Self {
        Self {
            frontend_base_url: LOCAL_FRONTEND_BASE_URL.to_string(),
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            cookie_domain: None,
            local: true,
        }
    }

    #[must_use]
    pub fn with_frontend_base_url(mut self, url: String) -> Self {
        self.frontend_base_url = url;
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = url;
        self
    }

    /// Ignored when running locally.
    #[must_use]
    pub fn with_cookie_domain(mut self, domain: Option<String>) -> Self {
        self.cookie_domain = domain.filter(|domain| !domain.is_empty());
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.local
    }

    #[must_use]
    pub fn cookie_domain(&self) -> Option<&str> {
        if self.local {
            None
        } else {
            self.cookie_domain.as_deref()
        }
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        !self.local
    }

    /// Where the provider sends the user back after authorization.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}/twitter/callback", self.api_base_url.trim_end_matches('/'))
    }
}

/// Consumer credentials and endpoint base for the Twitter OAuth application.
#[derive(Clone, Debug)]
pub struct TwitterConfig {
    consumer_key: String,
    consumer_secret: SecretString,
    api_url: String,
}

impl TwitterConfig {
    #[must_use]
    pub fn new(consumer_key: String, consumer_secret: SecretString) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            api_url: DEFAULT_TWITTER_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = url;
        self
    }

    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    #[must_use]
    pub fn consumer_secret(&self) -> &SecretString {
        &self.consumer_secret
    }

    /// Resolve an endpoint path against the API base.
    ///
    /// # Errors
    /// Returns an error if the base URL or the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.api_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .with_context(|| format!("invalid Twitter endpoint: {base}{path}"))
    }
}

/// Everything the login handlers need, built once at startup.
pub struct AuthState {
    config: AuthConfig,
    store: Arc<dyn SessionStore>,
    sessions: SessionManager,
    twitter: TwitterClient,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the Twitter endpoints or HTTP client cannot be built.
    pub fn new(
        config: AuthConfig,
        twitter_config: &TwitterConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let sessions = SessionManager::new(store.clone(), &config);
        let twitter = TwitterClient::new(twitter_config, config.callback_url())?;
        Ok(Self {
            config,
            store,
            sessions,
            twitter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub fn twitter(&self) -> &TwitterClient {
        &self.twitter
    }
}
