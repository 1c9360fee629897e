//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849) and the credential
//! requests of the three-legged flow.

use anyhow::{Context, Result, anyhow, bail};
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};
use url::{Url, form_urlencoded};

use super::{models::Credentials, utils::generate_nonce};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

pub struct OAuthClient {
    consumer_key: String,
    consumer_secret: SecretString,
    http: Client,
}

impl OAuthClient {
    #[must_use]
    pub fn new(consumer_key: String, consumer_secret: SecretString, http: Client) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            http,
        }
    }

    /// POST to a credential endpoint and parse the form-encoded token pair.
    ///
    /// `oauth_params` carries leg-specific protocol parameters such as
    /// `oauth_callback` or `oauth_verifier`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or a body
    /// without `oauth_token`/`oauth_token_secret`.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn request_credentials(
        &self,
        url: &Url,
        token: Option<&Credentials>,
        oauth_params: &[(&str, &str)],
    ) -> Result<Credentials> {
        let header = self.authorization_header(&Method::POST, url, token, oauth_params)?;
        let response = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))?;
        if !status.is_success() {
            warn!(%status, %body, "Credential request rejected");
            bail!("credential request returned {status}");
        }
        debug!("Credential request to {url} succeeded");
        parse_credentials(&body)
    }

    /// Signed GET with token credentials; the status is left to the caller.
    ///
    /// # Errors
    /// Returns an error only on transport failure.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn get(&self, url: &Url, token: &Credentials) -> Result<Response> {
        let header = self.authorization_header(&Method::GET, url, Some(token), &[])?;
        self.http
            .get(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))
    }

    fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        token: Option<&Credentials>,
        oauth_params: &[(&str, &str)],
    ) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs();
        self.authorization_header_at(
            method,
            url,
            token,
            oauth_params,
            &generate_nonce(),
            timestamp,
        )
    }

    fn authorization_header_at(
        &self,
        method: &Method,
        url: &Url,
        token: Option<&Credentials>,
        oauth_params: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String> {
        let mut params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        if let Some(token) = token {
            params.push(("oauth_token".into(), token.token.clone()));
        }
        params.extend(
            oauth_params
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
        );

        let base = signature_base_string(method.as_str(), url, &params);
        let token_secret = token.map_or("", |token| token.secret.as_str());
        let signature = sign(&base, self.consumer_secret.expose_secret(), token_secret)?;
        params.push(("oauth_signature".into(), signature));
        params.sort();

        let fields = params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}

/// RFC 3986 encoding: everything but `ALPHA / DIGIT / - . _ ~`.
pub(crate) fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string; query parameters of `url` are included.
pub(crate) fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .chain(
            url.query_pairs()
                .map(|(key, value)| (percent_encode(&key), percent_encode(&value))),
        )
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url.as_str()),
        percent_encode(&normalized)
    )
}

/// HMAC-SHA1 over the base string, base64 encoded.
pub(crate) fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| anyhow!("invalid HMAC key"))?;
    mac.update(base.as_bytes());
    Ok(Base64::encode_string(&mac.finalize().into_bytes()))
}

/// Parse `oauth_token=..&oauth_token_secret=..` response bodies.
pub(crate) fn parse_credentials(body: &str) -> Result<Credentials> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }
    match (token, secret) {
        (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
            Ok(Credentials { token, secret })
        }
        _ => Err(anyhow!("response did not contain oauth_token and oauth_token_secret")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from Twitter's "Creating a signature" documentation.
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";

    fn example_params() -> Vec<(String, String)> {
        [
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("oauth_consumer_key", CONSUMER_KEY),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", TIMESTAMP),
            ("oauth_token", TOKEN),
            ("oauth_version", "1.0"),
        ]
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
    }

    #[test]
    fn signature_base_string_matches_twitter_example() -> Result<()> {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")?;
        let base = signature_base_string("post", &url, &example_params());
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
        Ok(())
    }

    #[test]
    fn sign_matches_twitter_example() -> Result<()> {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")?;
        let base = signature_base_string("POST", &url, &example_params());
        assert_eq!(
            sign(&base, CONSUMER_SECRET, TOKEN_SECRET)?,
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
        Ok(())
    }

    #[test]
    fn percent_encode_keeps_unreserved() {
        assert_eq!(percent_encode("aZ9-._~"), "aZ9-._~");
        assert_eq!(percent_encode("a b+c/!"), "a%20b%2Bc%2F%21");
    }

    #[test]
    fn authorization_header_lists_protocol_params() -> Result<()> {
        let client = OAuthClient::new(
            CONSUMER_KEY.to_string(),
            SecretString::from(CONSUMER_SECRET),
            Client::new(),
        );
        let url = Url::parse("https://api.twitter.com/oauth/request_token")?;
        let header = client.authorization_header_at(
            &Method::POST,
            &url,
            None,
            &[("oauth_callback", "http://localhost:8080/twitter/callback")],
            NONCE,
            1_318_622_958,
        )?;

        assert!(header.starts_with("OAuth "));
        assert!(header.contains(&format!("oauth_consumer_key=\"{CONSUMER_KEY}\"")));
        assert!(header.contains(
            "oauth_callback=\"http%3A%2F%2Flocalhost%3A8080%2Ftwitter%2Fcallback\""
        ));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(!header.contains("oauth_token="));
        Ok(())
    }

    #[test]
    fn authorization_header_includes_token_when_present() -> Result<()> {
        let client = OAuthClient::new(
            CONSUMER_KEY.to_string(),
            SecretString::from(CONSUMER_SECRET),
            Client::new(),
        );
        let url = Url::parse("https://api.twitter.com/oauth/access_token")?;
        let temp = Credentials::new("temp-token", "temp-secret");
        let header = client.authorization_header_at(
            &Method::POST,
            &url,
            Some(&temp),
            &[("oauth_verifier", "verifier")],
            NONCE,
            1_318_622_958,
        )?;

        assert!(header.contains("oauth_token=\"temp-token\""));
        assert!(header.contains("oauth_verifier=\"verifier\""));
        Ok(())
    }

    #[test]
    fn parse_credentials_reads_token_pair() -> Result<()> {
        let credentials = parse_credentials(
            "oauth_token=abc&oauth_token_secret=def&oauth_callback_confirmed=true",
        )?;
        assert_eq!(credentials, Credentials::new("abc", "def"));
        Ok(())
    }

    #[test]
    fn parse_credentials_rejects_missing_secret() {
        assert!(parse_credentials("oauth_token=abc").is_err());
        assert!(parse_credentials("oauth_token=abc&oauth_token_secret=").is_err());
        assert!(parse_credentials("").is_err());
    }
}
