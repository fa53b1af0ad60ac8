use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, to_bson};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};

use crate::domain::models::coupon::Coupon;
use crate::error::AppResult;
use crate::repository::regex_escape;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn insert(&self, coupon: &Coupon) -> AppResult<()>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>>;
    /// 条件更新 usedBy == null, 保证一张券只核销一次.
    /// 已核销或不存在时返回 None.
    async fn redeem(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<Option<Coupon>>;
}

pub struct MongoCouponRepository {
    collection: Collection<Coupon>,
}

impl MongoCouponRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("coupons"),
        }
    }

    fn code_filter(code: &str) -> mongodb::bson::Document {
        doc! {
            "code": {
                "$regex": format!("^{}$", regex_escape(code)),
                "$options": "i",
            }
        }
    }
}

#[async_trait]
impl CouponRepository for MongoCouponRepository {
    async fn insert(&self, coupon: &Coupon) -> AppResult<()> {
        self.collection.insert_one(coupon, None).await?;
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        let coupon = self
            .collection
            .find_one(Self::code_filter(code), None)
            .await?;
        Ok(coupon)
    }

    async fn redeem(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<Option<Coupon>> {
        let mut filter = Self::code_filter(code);
        filter.insert("usedBy", mongodb::bson::Bson::Null);

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let redeemed = self
            .collection
            .find_one_and_update(
                filter,
                doc! { "$set": {
                    "usedBy": used_by,
                    "usedAt": to_bson(&used_at)?,
                } },
                options,
            )
            .await?;

        Ok(redeemed)
    }
}
