use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_TWITTER_CONSUMER_KEY: &str = "twitter-consumer-key";
pub const ARG_TWITTER_CONSUMER_SECRET: &str = "twitter-consumer-secret";
pub const ARG_TWITTER_API_URL: &str = "twitter-api-url";

#[derive(Debug)]
pub struct Options {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    pub api_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the consumer credentials are missing or the API URL
    /// is invalid.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let consumer_key = matches
            .get_one::<String>(ARG_TWITTER_CONSUMER_KEY)
            .cloned()
            .context("missing required argument: --twitter-consumer-key")?;
        let consumer_secret = matches
            .get_one::<String>(ARG_TWITTER_CONSUMER_SECRET)
            .map(|secret| SecretString::from(secret.as_str()))
            .context("missing required argument: --twitter-consumer-secret")?;
        let api_url = matches
            .get_one::<String>(ARG_TWITTER_API_URL)
            .cloned()
            .context("missing required argument: --twitter-api-url")?;
        Url::parse(&api_url).with_context(|| format!("invalid --twitter-api-url: {api_url}"))?;

        Ok(Self {
            consumer_key,
            consumer_secret,
            api_url,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TWITTER_CONSUMER_KEY)
                .long(ARG_TWITTER_CONSUMER_KEY)
                .help("Twitter OAuth consumer key")
                .env("WCS_TWITTER_CONSUMER_KEY")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TWITTER_CONSUMER_SECRET)
                .long(ARG_TWITTER_CONSUMER_SECRET)
                .help("Twitter OAuth consumer secret")
                .env("WCS_TWITTER_CONSUMER_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TWITTER_API_URL)
                .long(ARG_TWITTER_API_URL)
                .help("Twitter API base URL")
                .env("WCS_TWITTER_API_URL")
                .default_value("https://api.twitter.com"),
        )
}
