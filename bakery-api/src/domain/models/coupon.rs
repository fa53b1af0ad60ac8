use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::codes::generate_coupon_code;

/// 寻宝活动固定折扣
pub const COUPON_DISCOUNT_PERCENT: i64 = 30;

/// 单次使用、仅限发放当日的折扣码
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_percent: i64,
    /// 发放日, YYYY-MM-DD, 仅当日有效
    pub valid_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn mint(valid_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: generate_coupon_code(),
            discount_percent: COUPON_DISCOUNT_PERCENT,
            valid_date: valid_date.format("%Y-%m-%d").to_string(),
            used_by: None,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_date == date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_coupon() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let coupon = Coupon::mint(date);

        assert!(coupon.code.starts_with("NB30-"));
        assert_eq!(coupon.discount_percent, 30);
        assert_eq!(coupon.valid_date, "2026-08-05");
        assert!(!coupon.is_used());
        assert!(coupon.is_valid_on(date));
        assert!(!coupon.is_valid_on(date.succ_opt().unwrap()));
    }
}
