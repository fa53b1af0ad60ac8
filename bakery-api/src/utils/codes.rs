use chrono::NaiveDate;
use rand::{rng, Rng};

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
// 优惠码排除易混淆字符 (0/O, 1/I)
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const COUPON_CODE_PREFIX: &str = "NB30-";
pub const ORDER_NUMBER_PREFIX: &str = "NB";

/// 生成随机字符串
fn random_string(charset: &[u8], length: usize) -> String {
    let mut rng = rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset[idx] as char
        })
        .collect()
}

/// 不透明会话令牌
pub fn generate_token() -> String {
    random_string(TOKEN_CHARSET, 48)
}

/// 优惠码: NB30-XXXXXX
pub fn generate_coupon_code() -> String {
    format!("{}{}", COUPON_CODE_PREFIX, random_string(CODE_CHARSET, 6))
}

/// 订单号: NB + YYMMDD + 4位随机数字
pub fn generate_order_number(date: NaiveDate) -> String {
    let suffix: u32 = rng().random_range(0..10_000);
    format!(
        "{}{}{:04}",
        ORDER_NUMBER_PREFIX,
        date.format("%y%m%d"),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let token = generate_token();
        assert_eq!(token.len(), 48);
        assert!(token.bytes().all(|b| TOKEN_CHARSET.contains(&b)));

        // 两次生成不应相同
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_generate_coupon_code() {
        let code = generate_coupon_code();
        assert!(code.starts_with("NB30-"));
        assert_eq!(code.len(), 11);
        assert!(code[5..].bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn test_generate_order_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let number = generate_order_number(date);

        assert_eq!(number.len(), 12);
        assert!(number.starts_with("NB260805"));
        assert!(number[8..].chars().all(|c| c.is_ascii_digit()));
    }
}
