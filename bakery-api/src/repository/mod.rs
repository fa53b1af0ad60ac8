pub mod coupon_repository;
pub mod order_repository;
pub mod product_repository;
pub mod puzzle_repository;
pub mod session_repository;
pub mod user_repository;

pub use coupon_repository::{CouponRepository, MongoCouponRepository};
pub use order_repository::{MongoOrderRepository, OrderRepository};
pub use product_repository::{MongoProductRepository, ProductRepository};
pub use puzzle_repository::{MongoPuzzleRepository, PuzzleRepository};
pub use session_repository::{MongoSessionRepository, SessionRepository};
pub use user_repository::{AdminRepository, MongoAdminRepository};

/// MongoDB 唯一索引冲突 (E11000)
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// 正则元字符转义, 用于把用户输入安全地放进 $regex
pub(crate) fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::regex_escape;

    #[test]
    fn test_regex_escape() {
        assert_eq!(regex_escape("NB30-ABC123"), "NB30\\-ABC123");
        assert_eq!(regex_escape("a.b+c"), "a\\.b\\+c");
        assert_eq!(regex_escape("plain"), "plain");
    }
}
