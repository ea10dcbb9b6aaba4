use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::TwilioConfig;

/// Sends and checks SMS one-time passwords for E.164 phone numbers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Starts a verification and returns the provider's verification id.
    async fn send_code(&self, to: &str) -> anyhow::Result<String>;

    /// Returns `true` when the code was approved.
    async fn check_code(&self, to: &str, code: &str) -> anyhow::Result<bool>;
}

/// Normalizes a phone number to E.164 by prepending the country code unless
/// it already carries one.
pub fn to_e164(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("{}{}", country_code, phone)
    }
}

#[derive(Deserialize)]
struct VerificationResponse {
    sid: String,
    status: String,
}

/// Twilio Verify v2 over its REST API.
pub struct TwilioVerify {
    client: Client,
    config: TwilioConfig,
}

impl TwilioVerify {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn service_url(&self, resource: &str) -> String {
        format!(
            "{}/v2/Services/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.service_sid,
            resource
        )
    }

    async fn post(
        &self,
        resource: &str,
        form: &[(&str, &str)],
    ) -> anyhow::Result<VerificationResponse> {
        let resp = self
            .client
            .post(self.service_url(resource))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(form)
            .send()
            .await
            .with_context(|| format!("Twilio {resource} request failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Twilio {resource} returned {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Invalid Twilio {resource} response"))
    }
}

#[async_trait]
impl OtpProvider for TwilioVerify {
    async fn send_code(&self, to: &str) -> anyhow::Result<String> {
        let verification = self
            .post("Verifications", &[("To", to), ("Channel", "sms")])
            .await?;
        Ok(verification.sid)
    }

    async fn check_code(&self, to: &str, code: &str) -> anyhow::Result<bool> {
        let check = self
            .post("VerificationCheck", &[("To", to), ("Code", code)])
            .await?;
        Ok(check.status == "approved")
    }
}
