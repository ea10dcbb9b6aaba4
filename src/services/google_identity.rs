use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::GoogleConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account id.
    pub sub: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The two halves of the Google OAuth2 authorization-code flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoogleIdentity: Send + Sync {
    fn authorize_url(&self, state: &str) -> anyhow::Result<String>;

    /// Exchanges an authorization code and fetches the account profile.
    async fn fetch_profile(&self, code: &str) -> anyhow::Result<GoogleProfile>;
}

pub struct GoogleOAuth {
    client: Client,
    config: GoogleConfig,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[async_trait]
impl GoogleIdentity for GoogleOAuth {
    fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        let mut url = Url::parse(&self.config.auth_url).context("Invalid Google auth URL")?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "email profile")
            .append_pair("state", state);

        Ok(url.into())
    }

    async fn fetch_profile(&self, code: &str) -> anyhow::Result<GoogleProfile> {
        let token_res = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Token request failed")?;

        if !token_res.status().is_success() {
            let text = token_res.text().await.unwrap_or_default();
            anyhow::bail!("Token request failed: {}", text);
        }

        let token: TokenResponse = token_res.json().await.context("Invalid token response")?;

        let user_info_res = self
            .client
            .get(&self.config.user_info_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("Failed to fetch user info")?;

        if !user_info_res.status().is_success() {
            anyhow::bail!("Failed to fetch user info: {}", user_info_res.status());
        }

        user_info_res
            .json()
            .await
            .context("Invalid user info response")
    }
}
