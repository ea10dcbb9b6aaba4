use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub service_sid: String,
    pub api_base: String,
}

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub frontend_origin: String,
    pub admin_secret: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Prepended to phone numbers that are not already in E.164 form.
    pub otp_country_code: String,
    pub twilio: TwilioConfig,
    pub google: GoogleConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            port: try_load("PORT", "5000")?,
            database_url: required("DATABASE_URL")?,
            frontend_origin: try_load("FRONTEND_ORIGIN", "http://localhost:3000")?,
            admin_secret: required("ADMIN_SECRET")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "5242880")?,
            otp_country_code: try_load("OTP_COUNTRY_CODE", "+91")?,
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                service_sid: required("TWILIO_SERVICE_SID")?,
                api_base: try_load("TWILIO_VERIFY_API_BASE", "https://verify.twilio.com")?,
            },
            google: GoogleConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                redirect_uri: try_load(
                    "GOOGLE_REDIRECT_URI",
                    "http://localhost:5000/auth/google/callback",
                )?,
                auth_url: try_load(
                    "GOOGLE_ACCOUNTS_OAUTH_API_BASE",
                    "https://accounts.google.com/o/oauth2/v2/auth",
                )?,
                token_url: try_load(
                    "GOOGLE_ACCOUNTS_OAUTH_TOKEN_CLIENT_URL",
                    "https://oauth2.googleapis.com/token",
                )?,
                user_info_url: try_load(
                    "GOOGLE_ACCOUNTS_OAUTH_USER_INFO_URL",
                    "https://www.googleapis.com/oauth2/v3/userinfo",
                )?,
            },
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {key} value: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_used_for_missing_vars() {
        let port: u16 = try_load("ZATSE_TEST_UNSET_PORT", "5000").unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn unparsable_default_is_an_error() {
        let port: anyhow::Result<u16> = try_load("ZATSE_TEST_UNSET_PORT", "not-a-port");
        assert!(port.is_err());
    }

    #[test]
    fn missing_required_var_names_the_key() {
        let err = required("ZATSE_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(err.to_string().contains("ZATSE_TEST_DEFINITELY_UNSET"));
    }
}
