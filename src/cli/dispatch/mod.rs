//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, currently always the
//! API server with its full configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, site, twitter};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .filter(|dsn| !dsn.is_empty())
        .cloned();

    let site_opts = site::Options::parse(matches)?;
    let twitter_opts = twitter::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        is_local: site_opts.is_local,
        frontend_base_url: site_opts.frontend_base_url,
        api_base_url: site_opts.api_base_url,
        cookie_domain: site_opts.cookie_domain,
        twitter_consumer_key: twitter_opts.consumer_key,
        twitter_consumer_secret: twitter_opts.consumer_secret,
        twitter_api_url: twitter_opts.api_url,
    }))
}
