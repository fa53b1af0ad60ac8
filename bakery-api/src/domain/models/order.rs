use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::product::Product;

/// 未选择具体商品时的询价单基础价
pub const DEFAULT_BASE_PRICE: i64 = 1000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,

    // 下单时的商品快照, 后续编辑商品不影响历史订单
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_price: Option<i64>,

    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,

    pub delivery_date: String,
    pub delivery_time: String,
    pub delivery_type: DeliveryType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cake_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i64>,

    pub status: OrderStatus,
    pub total_price: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// 商品快照字段, 在下单时从 Product 采集
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: i64,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image: if product.image.is_empty() {
                None
            } else {
                Some(product.image.clone())
            },
            price: product.price,
        }
    }
}

/// totalPrice = basePrice - round(basePrice * discount / 100)
pub fn compute_total_price(base_price: Option<i64>, discount_percent: i64) -> i64 {
    let base = base_price.unwrap_or(DEFAULT_BASE_PRICE);
    base - rounded_discount(base, discount_percent)
}

fn rounded_discount(base: i64, percent: i64) -> i64 {
    (base * percent + 50) / 100
}
