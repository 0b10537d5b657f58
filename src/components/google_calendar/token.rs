use crate::config::Config;
use crate::error::{auth_error, provider_error, BotResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// A cached short-lived access token with its expiry instant
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Manages the Google OAuth access token for the bot.
///
/// Holds the long-lived refresh token from config and keeps the short-lived
/// access token in memory, refreshing it on expiry. Nothing is persisted
/// between runs.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, refreshing if the cached one is expired
    pub async fn get_access_token(&self) -> BotResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = &*cached {
                // 60s slack so a token doesn't expire mid-request
                if token.expires_at > Utc::now().timestamp() + 60 {
                    return Ok(token.access_token.clone());
                }
            }
        }

        self.refresh().await
    }

    /// Refresh the access token using the configured refresh token
    async fn refresh(&self) -> BotResult<String> {
        let (client_id, client_secret, refresh_token) = {
            let config = self.config.read().await;
            (
                config.google_client_id.clone(),
                config.google_client_secret.clone(),
                config.google_refresh_token.clone(),
            )
        };

        if refresh_token.is_empty() {
            return Err(auth_error(
                "No refresh token configured. Run get_calendar_token and set GOOGLE_REFRESH_TOKEN.",
            ));
        }

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            // 400/401 from the token endpoint means the credential itself is
            // bad (invalid_grant, revoked consent) and the user must
            // re-authenticate
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(auth_error(&format!(
                    "Refresh token rejected: HTTP {} - {}",
                    status, error_body
                )));
            }
            return Err(provider_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = new_token
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| auth_error("Token response missing 'access_token' field"))?
            .to_string();

        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;

        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        Ok(access_token)
    }
}

/// Consent prompt behavior for the installed-app authorization flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Always show the consent screen (required to get a refresh token)
    Consent,
    /// Let Google decide whether to prompt
    Default,
}

/// Tokens returned by the authorization-code exchange
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
}

/// Two-phase installed-app OAuth flow used by the get_calendar_token binary.
///
/// Construct once, then call [`InstalledFlow::authorize_url`] to start the
/// browser leg and [`InstalledFlow::exchange_code`] with the code from the
/// loopback redirect. No shared mutable token state is involved.
pub struct InstalledFlow {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    client: Client,
}

impl InstalledFlow {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            client: Client::new(),
        }
    }

    /// Build the authorization URL the user's browser should visit
    pub fn authorize_url(&self, prompt: PromptMode, state: &str) -> BotResult<url::Url> {
        let mut url = url::Url::parse(AUTH_ENDPOINT)
            .map_err(|e| provider_error(&format!("Failed to parse auth endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("scope", CALENDAR_SCOPE)
            .append_pair("state", state);

        if prompt == PromptMode::Consent {
            url.query_pairs_mut().append_pair("prompt", "consent");
        }

        Ok(url)
    }

    /// Exchange an authorization code for a token set
    pub async fn exchange_code(&self, code: &str) -> BotResult<TokenSet> {
        let params = [
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("code", code.to_string()),
            ("redirect_uri", self.redirect_uri.clone()),
            ("grant_type", "authorization_code".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Authorization code rejected: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<TokenSet>()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse token response: {}", e)))
    }
}
