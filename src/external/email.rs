use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use chrono::{Datelike, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub const SCHOOL_NAME: &str = "Doon International School";

/// SMTP delivery of OTP mails. Unconfigured instances only log the code.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let transport = match (&config.host, &config.username, &config.password) {
            (Some(host), Some(user), Some(pass)) if config.is_configured() => {
                // 465 is implicit TLS, everything else upgrades with STARTTLS
                let builder = if config.port == 465 {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                };
                Some(
                    builder
                        .port(config.port)
                        .credentials(Credentials::new(user.clone(), pass.clone()))
                        .build(),
                )
            }
            _ => {
                log::warn!("Email transport not configured, OTP mails will be logged");
                None
            }
        };

        Ok(Self { config, transport })
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    fn sender(&self) -> String {
        self.config
            .from
            .clone()
            .or_else(|| self.config.username.clone())
            .unwrap_or_else(|| "no-reply@localhost".to_string())
    }

    fn build_otp_message(&self, to: &str, otp: &str) -> AppResult<Message> {
        let message = Message::builder()
            .from(self.sender().parse()?)
            .to(to.parse()?)
            .subject(format!("{SCHOOL_NAME} - OTP Verification"))
            .header(ContentType::TEXT_HTML)
            .body(render_otp_html(otp))?;
        Ok(message)
    }

    /// Unconfigured instances log the code and succeed
    pub async fn send_otp(&self, to: &str, otp: &str) -> AppResult<()> {
        let Some(transport) = &self.transport else {
            log::info!("Email transport not configured, OTP for {to}: {otp}");
            return Ok(());
        };

        let message = self.build_otp_message(to, otp)?;
        transport.send(message).await.map_err(|e| {
            log::error!("Failed to send OTP email to {to}: {e}");
            AppError::from(e)
        })?;

        log::info!("OTP email sent to {to}");
        Ok(())
    }
}

fn render_otp_html(otp: &str) -> String {
    let year = Utc::now().year();
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background-color: #1C2C5B; padding: 20px; text-align: center;">
    <h1 style="color: #E5B93C; margin: 0;">{SCHOOL_NAME}</h1>
  </div>
  <div style="background-color: #f5f5f5; padding: 30px;">
    <h2 style="color: #1C2C5B;">OTP Verification</h2>
    <p style="font-size: 16px; color: #333;">Your OTP for login is:</p>
    <div style="background-color: white; padding: 20px; text-align: center; margin: 20px 0; border: 2px solid #E5B93C; border-radius: 8px;">
      <h1 style="color: #E5B93C; font-size: 36px; letter-spacing: 8px; margin: 0; font-family: monospace;">{otp}</h1>
    </div>
    <p style="font-size: 14px; color: #666;">This OTP is valid for 10 minutes.</p>
    <p style="font-size: 14px; color: #666;">If you didn't request this OTP, please ignore this email.</p>
  </div>
  <div style="background-color: #1C2C5B; padding: 15px; text-align: center; color: white; font-size: 12px;">
    <p style="margin: 0;">&copy; {year} {SCHOOL_NAME}. All rights reserved.</p>
  </div>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_service_has_no_transport() {
        let service = EmailService::new(EmailConfig::default()).unwrap();
        assert!(!service.is_configured());
    }

    #[test]
    fn test_message_builds_with_explicit_sender() {
        let config = EmailConfig {
            from: Some("Admissions <admissions@school.edu>".to_string()),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config).unwrap();
        assert!(service.build_otp_message("parent@example.com", "123456").is_ok());
        assert!(service.build_otp_message("not an address", "123456").is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_send_succeeds() {
        let service = EmailService::new(EmailConfig::default()).unwrap();
        assert!(service.send_otp("parent@example.com", "123456").await.is_ok());
    }

    #[test]
    fn test_html_contains_code() {
        let html = render_otp_html("654321");
        assert!(html.contains("654321"));
        assert!(html.contains("valid for 10 minutes"));
    }
}
