use std::sync::Arc;

use chrono::Local;
use serde::Serialize;

use crate::domain::models::coupon::Coupon;
use crate::domain::models::puzzle::{DailyPuzzle, DAILY_COUPON_CAP};
use crate::error::AppResult;
use crate::repository::{CouponRepository, PuzzleRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResult {
    pub valid: bool,
    pub discount: i64,
    pub message: String,
}

impl ValidateResult {
    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            discount: 0,
            message: message.to_string(),
        }
    }
}

pub struct CouponService {
    coupons: Arc<dyn CouponRepository>,
    puzzles: Arc<dyn PuzzleRepository>,
}

impl CouponService {
    pub fn new(coupons: Arc<dyn CouponRepository>, puzzles: Arc<dyn PuzzleRepository>) -> Self {
        Self { coupons, puzzles }
    }

    /// 当日谜题, 没有就从题库选一条落库.
    /// 落库是原子 upsert, 并发首访也只产生一条.
    pub async fn get_daily_puzzle(&self) -> AppResult<DailyPuzzle> {
        let candidate = DailyPuzzle::select_for(Local::now().date_naive());
        self.puzzles.get_or_create(&candidate).await
    }

    pub async fn get_coupons_remaining(&self) -> AppResult<i64> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let remaining = self
            .puzzles
            .find_by_date(&today)
            .await?
            .map(|puzzle| puzzle.coupons_remaining())
            .unwrap_or(DAILY_COUPON_CAP);
        Ok(remaining)
    }

    pub async fn verify_answer(&self, answer: &str) -> AppResult<VerifyResult> {
        let puzzle = self.get_daily_puzzle().await?;

        // 发完为止, 答对也不再发
        if puzzle.coupons_remaining() == 0 {
            return Ok(VerifyResult {
                correct: false,
                coupon: None,
                message: "All coupons for today have been claimed. Come back tomorrow!".to_string(),
            });
        }

        if answer.trim() != puzzle.answer {
            return Ok(VerifyResult {
                correct: false,
                coupon: None,
                message: "That's not the right passcode. Try again!".to_string(),
            });
        }

        // 条件自增是唯一的计数来源, 并发答对也卡死在上限
        if !self
            .puzzles
            .increment_if_below_cap(&puzzle.date, DAILY_COUPON_CAP)
            .await?
        {
            return Ok(VerifyResult {
                correct: false,
                coupon: None,
                message: "All coupons for today have been claimed. Come back tomorrow!".to_string(),
            });
        }

        let coupon = Coupon::mint(Local::now().date_naive());
        self.coupons.insert(&coupon).await?;

        tracing::info!(code = %coupon.code, "treasure hunt coupon minted");

        Ok(VerifyResult {
            correct: true,
            coupon: Some(coupon),
            message: "Vault unlocked! Your coupon is ready.".to_string(),
        })
    }

    /// 只读校验, 不核销
    pub async fn validate_coupon(&self, code: &str) -> AppResult<ValidateResult> {
        let Some(coupon) = self.coupons.find_by_code(code.trim()).await? else {
            return Ok(ValidateResult::invalid("Invalid coupon code"));
        };

        if !coupon.is_valid_on(Local::now().date_naive()) {
            return Ok(ValidateResult::invalid(
                "This coupon was only valid on the day it was issued",
            ));
        }

        if coupon.is_used() {
            return Ok(ValidateResult::invalid("Coupon has already been used"));
        }

        Ok(ValidateResult {
            valid: true,
            discount: coupon.discount_percent,
            message: format!("Coupon applied! {}% off.", coupon.discount_percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::coupon_repository::MockCouponRepository;
    use crate::repository::puzzle_repository::MockPuzzleRepository;
    use chrono::Utc;

    fn todays_puzzle(coupons_generated: i64) -> DailyPuzzle {
        DailyPuzzle {
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            puzzle: "Half of 998, plus 13.".to_string(),
            answer: "512".to_string(),
            coupons_generated,
            created_at: Utc::now(),
        }
    }

    fn service(coupons: MockCouponRepository, puzzles: MockPuzzleRepository) -> CouponService {
        CouponService::new(Arc::new(coupons), Arc::new(puzzles))
    }

    #[tokio::test]
    async fn test_wrong_answer_is_incorrect_and_mints_nothing() {
        let mut puzzles = MockPuzzleRepository::new();
        puzzles
            .expect_get_or_create()
            .returning(|_| Ok(todays_puzzle(0)));
        puzzles.expect_increment_if_below_cap().never();

        let mut coupons = MockCouponRepository::new();
        coupons.expect_insert().never();

        let result = service(coupons, puzzles).verify_answer("999").await.unwrap();
        assert!(!result.correct);
        assert!(result.coupon.is_none());
    }

    #[tokio::test]
    async fn test_correct_answer_mints_a_coupon() {
        let mut puzzles = MockPuzzleRepository::new();
        puzzles
            .expect_get_or_create()
            .returning(|_| Ok(todays_puzzle(2)));
        puzzles
            .expect_increment_if_below_cap()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut coupons = MockCouponRepository::new();
        coupons.expect_insert().times(1).returning(|_| Ok(()));

        let result = service(coupons, puzzles).verify_answer("512").await.unwrap();
        assert!(result.correct);

        let coupon = result.coupon.unwrap();
        assert!(coupon.code.starts_with("NB30-"));
        assert_eq!(coupon.discount_percent, 30);
    }

    #[tokio::test]
    async fn test_correct_answer_after_cap_is_sold_out() {
        let mut puzzles = MockPuzzleRepository::new();
        puzzles
            .expect_get_or_create()
            .returning(|_| Ok(todays_puzzle(3)));
        puzzles.expect_increment_if_below_cap().never();

        let mut coupons = MockCouponRepository::new();
        coupons.expect_insert().never();

        let result = service(coupons, puzzles).verify_answer("512").await.unwrap();
        assert!(!result.correct);
        assert!(result.message.contains("claimed"));
    }

    #[tokio::test]
    async fn test_losing_the_increment_race_is_sold_out() {
        // 读到 2, 但并发下自增失败 → 同样按售罄处理
        let mut puzzles = MockPuzzleRepository::new();
        puzzles
            .expect_get_or_create()
            .returning(|_| Ok(todays_puzzle(2)));
        puzzles
            .expect_increment_if_below_cap()
            .returning(|_, _| Ok(false));

        let mut coupons = MockCouponRepository::new();
        coupons.expect_insert().never();

        let result = service(coupons, puzzles).verify_answer("512").await.unwrap();
        assert!(!result.correct);
        assert!(result.coupon.is_none());
    }

    #[tokio::test]
    async fn test_validate_unknown_code() {
        let mut coupons = MockCouponRepository::new();
        coupons.expect_find_by_code().returning(|_| Ok(None));

        let result = service(coupons, MockPuzzleRepository::new())
            .validate_coupon("NB30-NOPE11")
            .await
            .unwrap();
        assert!(!result.valid);
        assert_eq!(result.discount, 0);
    }

    #[tokio::test]
    async fn test_validate_yesterdays_coupon_is_invalid() {
        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let stale = Coupon::mint(yesterday);

        let mut coupons = MockCouponRepository::new();
        coupons
            .expect_find_by_code()
            .returning(move |_| Ok(Some(stale.clone())));

        let result = service(coupons, MockPuzzleRepository::new())
            .validate_coupon("whatever")
            .await
            .unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn test_validate_used_coupon_is_invalid() {
        let mut used = Coupon::mint(Local::now().date_naive());
        used.used_by = Some("asha@example.com".to_string());
        used.used_at = Some(Utc::now());

        let mut coupons = MockCouponRepository::new();
        coupons
            .expect_find_by_code()
            .returning(move |_| Ok(Some(used.clone())));

        let result = service(coupons, MockPuzzleRepository::new())
            .validate_coupon("whatever")
            .await
            .unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn test_validate_fresh_coupon_returns_discount_without_consuming() {
        let fresh = Coupon::mint(Local::now().date_naive());

        let mut coupons = MockCouponRepository::new();
        coupons
            .expect_find_by_code()
            .returning(move |_| Ok(Some(fresh.clone())));
        // 校验绝不能核销
        coupons.expect_redeem().never();

        let result = service(coupons, MockPuzzleRepository::new())
            .validate_coupon("whatever")
            .await
            .unwrap();
        assert!(result.valid);
        assert_eq!(result.discount, 30);
    }

    #[tokio::test]
    async fn test_coupons_remaining_defaults_to_cap() {
        let mut puzzles = MockPuzzleRepository::new();
        puzzles.expect_find_by_date().returning(|_| Ok(None));

        let remaining = service(MockCouponRepository::new(), puzzles)
            .get_coupons_remaining()
            .await
            .unwrap();
        assert_eq!(remaining, DAILY_COUPON_CAP);
    }
}
