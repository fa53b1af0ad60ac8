use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};

const RESEND_URL: &str = "https://api.resend.com/emails";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

/// Resend 事务邮件接口
pub struct ResendMailer {
    api_key: String,
    from: String,
    client: Client,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        if self.api_key.is_empty() {
            return Err(AppError::ThirdParty(
                "email provider is not configured".to_string(),
            ));
        }

        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ThirdParty(format!(
                "email provider returned {}: {}",
                status, detail
            )));
        }

        Ok(())
    }
}
