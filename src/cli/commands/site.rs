//! Where the site runs: production or local, and the URLs derived from it.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, builder::BoolishValueParser};
use url::Url;

pub const ARG_LOCAL: &str = "local";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_COOKIE_DOMAIN: &str = "cookie-domain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub is_local: bool,
    pub frontend_base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub cookie_domain: Option<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if a base URL is not an absolute URL.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            is_local: matches.get_flag(ARG_LOCAL),
            frontend_base_url: base_url(matches, ARG_FRONTEND_BASE_URL)?,
            api_base_url: base_url(matches, ARG_API_BASE_URL)?,
            cookie_domain: matches.get_one::<String>(ARG_COOKIE_DOMAIN).cloned(),
        })
    }
}

fn base_url(matches: &clap::ArgMatches, id: &str) -> Result<Option<String>> {
    let Some(value) = matches.get_one::<String>(id) else {
        return Ok(None);
    };
    Url::parse(value).with_context(|| format!("invalid --{id}: {value}"))?;
    Ok(Some(value.trim_end_matches('/').to_string()))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOCAL)
                .long(ARG_LOCAL)
                .help("Run with local defaults: plain HTTP on localhost, host-only cookie")
                .env("WCS_IS_LOCAL")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, redirect target and CORS origin")
                .long_help(
                    "Frontend base URL, redirect target after signin and logout, and the only allowed CORS origin. Defaults to https://watercolor.site, or http://localhost:4200 with --local.",
                )
                .env("WCS_FRONTEND_BASE_URL"),
        )
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .long(ARG_API_BASE_URL)
                .help("Public base URL of this API, used to build the OAuth callback")
                .long_help(
                    "Public base URL of this API, used to build the OAuth callback URL. Defaults to https://api.watercolor.site, or http://localhost:8080 with --local.",
                )
                .env("WCS_API_BASE_URL"),
        )
        .arg(
            Arg::new(ARG_COOKIE_DOMAIN)
                .long(ARG_COOKIE_DOMAIN)
                .help("Domain attribute of the session cookie (default: watercolor.site, ignored with --local)")
                .env("WCS_COOKIE_DOMAIN"),
        )
}
