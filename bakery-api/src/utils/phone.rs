/// 清洗电话号码: 去掉空白/标点, 去掉印度区号前缀
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    // "+91"/"91" 前缀只在剩余位数仍够一个完整号码时剥离
    if digits.len() > 10 && digits.starts_with("91") {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

/// 两个号码的末尾10位是否一致
pub fn phone_matches(stored: &str, query: &str) -> bool {
    let stored = normalize_phone(stored);
    let query = normalize_phone(query);

    if stored.is_empty() || query.is_empty() {
        return false;
    }

    let stored_tail = last_n(&stored, 10);
    let query_tail = last_n(&query, 10);
    stored_tail == query_tail
}

fn last_n(s: &str, n: usize) -> &str {
    if s.len() > n { &s[s.len() - n..] } else { s }
}
