use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// 上传 base64 图片, 返回 CDN URL
    async fn upload(&self, base64_image: &str) -> AppResult<String>;
    async fn delete(&self, public_id: &str) -> AppResult<()>;
    /// 从 CDN URL 还原 public id, 非本图床的 URL 返回 None
    fn public_id_for_url(&self, url: &str) -> Option<String>;
}

/// Cloudinary 托管图床, 签名上传
pub struct CloudinaryMediaStore {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryMediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
            client: Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(AppError::ThirdParty(
                "media provider is not configured".to_string(),
            ));
        }
        Ok(())
    }

}

/// Cloudinary 签名: 参数按键排序拼接后追加 api_secret, 取 SHA-1 十六进制
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    fn public_id_for_url(&self, url: &str) -> Option<String> {
        let marker = format!("/{}/", self.folder);
        let start = url.find(&marker)? + 1;
        let tail = &url[start..];
        let name = tail.split('.').next()?;
        if name.is_empty() { None } else { Some(name.to_string()) }
    }

    async fn upload(&self, base64_image: &str) -> AppResult<String> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", self.folder.as_str()), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let form = [
            ("file", base64_image),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("folder", self.folder.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ThirdParty(format!(
                "media upload failed with {}: {}",
                status, detail
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.secure_url)
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let form = [
            ("public_id", public_id),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ThirdParty(format!(
                "media delete failed with {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryMediaStore {
        CloudinaryMediaStore::new(&MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "bakery/products".to_string(),
        })
    }

    #[test]
    fn test_sign_params_is_deterministic_and_sorted() {
        // 无论入参顺序, 签名串都是按键排序后的拼接
        let a = sign_params(&[("timestamp", "123"), ("folder", "f")], "s");
        let b = sign_params(&[("folder", "f"), ("timestamp", "123")], "s");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_public_id_for_url() {
        let store = store();
        let url = "https://res.cloudinary.com/demo/image/upload/v1/bakery/products/abc123.webp";
        assert_eq!(
            store.public_id_for_url(url),
            Some("bakery/products/abc123".to_string())
        );

        assert_eq!(store.public_id_for_url("https://elsewhere.example/x.png"), None);
    }
}
