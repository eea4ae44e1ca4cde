use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, header};

use crate::{
    config,
    error::AppError,
    types::{ClientCredentialsResponse, Credential, WebPlayerTokenResponse},
};

/// User agent presented to the web-player token endpoint, which only answers browsers.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// How the backend obtains a bearer credential for the Spotify Web API.
#[derive(Clone)]
pub enum TokenStrategy {
    /// OAuth 2.0 client-credentials exchange with a registered client id/secret pair.
    ClientCredentials {
        client_id: Option<String>,
        client_secret: Option<String>,
        token_url: String,
    },
    /// Anonymous token scraped from the public web-player endpoint.
    WebPlayer { token_url: String },
}

impl TokenStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            TokenStrategy::ClientCredentials { .. } => "client_credentials",
            TokenStrategy::WebPlayer { .. } => "web_player",
        }
    }
}

/// Acquires Spotify bearer credentials.
///
/// Every call to [`TokenProvider::acquire_credential`] performs exactly one
/// request against the configured token endpoint. Credentials are never
/// cached: each resolution asks for a fresh one.
#[derive(Clone)]
pub struct TokenProvider {
    client: Client,
    strategy: TokenStrategy,
}

impl TokenProvider {
    pub fn new(client: Client, strategy: TokenStrategy) -> Self {
        Self { client, strategy }
    }

    /// Builds a provider from the `SPOTIFY_TOKEN_STRATEGY` configuration.
    pub fn from_env(client: Client) -> Self {
        Self::new(client, config::token_strategy())
    }

    pub fn strategy(&self) -> &TokenStrategy {
        &self.strategy
    }

    /// Fetches a fresh bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Auth`] when:
    /// - the client id or secret is missing for the client-credentials flow
    /// - the token endpoint cannot be reached
    /// - the endpoint answers with a non-success status
    /// - the response carries no access token
    pub async fn acquire_credential(&self) -> Result<Credential, AppError> {
        match &self.strategy {
            TokenStrategy::ClientCredentials {
                client_id,
                client_secret,
                token_url,
            } => {
                let (Some(id), Some(secret)) = (client_id, client_secret) else {
                    return Err(AppError::Auth(
                        "SPOTIFY_API_AUTH_CLIENT_ID and SPOTIFY_API_AUTH_CLIENT_SECRET must be set"
                            .to_string(),
                    ));
                };
                self.client_credentials(id, secret, token_url).await
            }
            TokenStrategy::WebPlayer { token_url } => self.web_player(token_url).await,
        }
    }

    async fn client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
        token_url: &str,
    ) -> Result<Credential, AppError> {
        let basic = STANDARD.encode(format!("{client_id}:{client_secret}"));

        let res = self
            .client
            .post(token_url)
            .header(header::AUTHORIZATION, format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("token endpoint unreachable: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let json: ClientCredentialsResponse = res
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("unreadable token response: {e}")))?;

        let access_token = json
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Auth("token response has no access_token".to_string()))?;

        Ok(Credential {
            access_token,
            expires_in: json.expires_in,
            obtained_at: Utc::now().timestamp(),
        })
    }

    async fn web_player(&self, token_url: &str) -> Result<Credential, AppError> {
        let res = self
            .client
            .get(token_url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("token endpoint unreachable: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Auth(format!("token endpoint returned {status}")));
        }

        let json: WebPlayerTokenResponse = res
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("unreadable token response: {e}")))?;

        let access_token = json
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Auth("token response has no accessToken".to_string()))?;

        let now = Utc::now();
        // the endpoint reports an absolute expiry in milliseconds
        let expires_in = json
            .access_token_expiration_timestamp_ms
            .map(|ms| ((ms - now.timestamp_millis()) / 1000).max(0) as u64);

        Ok(Credential {
            access_token,
            expires_in,
            obtained_at: now.timestamp(),
        })
    }
}
