use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// `mobile` is the bare 10-digit number; the configured country code is prepended
    pub fn to_e164(&self, mobile: &str) -> String {
        format!("{}{}", self.config.country_code, mobile)
    }

    pub async fn send_otp(&self, mobile: &str, code: &str) -> AppResult<()> {
        if !self.is_configured() {
            log::info!("SMS transport not configured, OTP for {mobile}: {code}");
            return Ok(());
        }

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let to = self.to_e164(mobile);
        let body = format!("Your admissions verification code is {code}. It is valid for 10 minutes.");

        let params = [
            ("To", to.as_str()),
            ("From", self.config.from_phone.as_str()),
            ("Body", body.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("OTP SMS sent to {to}");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("OTP SMS to {to} failed: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {error_text}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_gets_country_code() {
        let service = TwilioService::new(TwilioConfig::default());
        assert_eq!(service.to_e164("9876543210"), "+919876543210");
        assert!(!service.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_a_no_op() {
        let service = TwilioService::new(TwilioConfig::default());
        assert!(service.send_otp("9876543210", "123456").await.is_ok());
    }
}
