use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Url;
use thiserror::Error;

use crate::{
    config::Settings,
    spotify::{AccessToken, Client},
    types::Token,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} must be set to run the oauth flow")]
    MissingSetting(&'static str),

    #[error("invalid authorization url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("state mismatch in oauth callback")]
    StateMismatch,

    #[error("spotify denied the authorization: {0}")]
    Denied(String),

    #[error("oauth callback carries no authorization code")]
    MissingCode,

    #[error("token exchange failed: {0}")]
    Exchange(#[from] reqwest::Error),
}

/// Authorization-code flow against the Spotify accounts service.
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: String,
    token_url: String,
    api_url: String,
    state: String,
}

impl Authenticator {
    pub fn new(settings: &Settings, http: reqwest::Client) -> Result<Self, AuthError> {
        let client_id = settings
            .client_id
            .clone()
            .ok_or(AuthError::MissingSetting("SPOTIFY_ID"))?;
        let client_secret = settings
            .client_secret
            .clone()
            .ok_or(AuthError::MissingSetting("SPOTIFY_SECRET"))?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            redirect_uri: settings.redirect_uri.clone(),
            scope: settings.scope.clone(),
            auth_url: settings.auth_url.clone(),
            token_url: settings.token_url.clone(),
            api_url: settings.api_url.clone(),
            state: STANDARD.encode(settings.state_salt.as_bytes()),
        })
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// URL the user is sent to for granting access. The consent dialog is
    /// always shown so that switching accounts stays possible.
    pub fn authorize_url(&self) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", self.state.as_str()),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|source| AuthError::Url {
            url: self.auth_url.clone(),
            source,
        })
    }

    /// Checks the callback parameters and returns the authorization code.
    pub fn verify_callback<'a>(
        &self,
        state: Option<&str>,
        code: Option<&'a str>,
        error: Option<&str>,
    ) -> Result<&'a str, AuthError> {
        if state != Some(self.state.as_str()) {
            return Err(AuthError::StateMismatch);
        }
        if let Some(error) = error {
            return Err(AuthError::Denied(error.to_string()));
        }
        code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let mut token: Token = res.json().await?;
        token.obtained_at = Utc::now().timestamp() as u64;
        Ok(token)
    }

    /// API client for an access token previously issued by this flow.
    pub fn client(&self, token: AccessToken) -> Client {
        Client::with_base_url(self.http.clone(), self.api_url.clone(), token)
    }
}
