use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// 自由文本分类, 不做枚举约束
    pub category: String,
    pub price: i64,
    /// 制作时长, 分钟
    pub preparation_time: i64,
    #[serde(default)]
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, category: String, price: i64, preparation_time: i64, image: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category,
            price,
            preparation_time,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 部分更新, None 字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub preparation_time: Option<i64>,
    pub image: Option<String>,
}
