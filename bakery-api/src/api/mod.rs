use serde::Serialize;

pub mod auth;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod treasure_hunt;
pub mod upload;

/// 统一响应外壳: {success, data?, error?}
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// 无数据载荷的成功响应
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(serde_json::json!({"n": 1}))).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["n"], 1);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_ok_envelope_has_no_data_key() {
        let body = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(body, serde_json::json!({"success": true}));
    }
}
