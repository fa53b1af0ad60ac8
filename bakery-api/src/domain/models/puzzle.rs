use chrono::{DateTime, NaiveDate, Utc};
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};

/// 每日优惠码上限
pub const DAILY_COUPON_CAP: i64 = 3;

/// 谜题题库: (题面, 3位数字答案)
const PUZZLE_BANK: &[(&str, &str)] = &[
    ("Start with a dozen dozen, then take away 19. What number opens the vault?", "125"),
    ("Multiply 25 by 25, then subtract 400.", "225"),
    ("The number of days in a leap year, minus 245.", "121"),
    ("Half of 998, plus 13.", "512"),
    ("Add the first ten odd numbers together, then add 23.", "123"),
    ("Take 9 squared, multiply it by 4, then add 15.", "339"),
    ("The minutes in six hours, minus 41.", "319"),
    ("A baker stacks 7 trays of 48 cookies and 12 of them crumble. How many survive?", "324"),
];

/// 每个日历日一条, 首次访问时惰性创建
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPuzzle {
    /// YYYY-MM-DD, 唯一键
    pub date: String,
    pub puzzle: String,
    pub answer: String,
    pub coupons_generated: i64,
    pub created_at: DateTime<Utc>,
}

impl DailyPuzzle {
    /// 从题库随机选一条作为当日谜题
    pub fn select_for(date: NaiveDate) -> Self {
        let idx = rng().random_range(0..PUZZLE_BANK.len());
        let (puzzle, answer) = PUZZLE_BANK[idx];

        Self {
            date: date.format("%Y-%m-%d").to_string(),
            puzzle: puzzle.to_string(),
            answer: answer.to_string(),
            coupons_generated: 0,
            created_at: Utc::now(),
        }
    }

    pub fn coupons_remaining(&self) -> i64 {
        (DAILY_COUPON_CAP - self.coupons_generated).max(0)
    }
}
