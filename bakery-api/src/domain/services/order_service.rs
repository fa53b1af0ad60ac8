use std::sync::Arc;

use chrono::{Local, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::models::coupon::Coupon;
use crate::domain::models::order::{
    compute_total_price, DeliveryType, Order, OrderStatus, ProductSnapshot,
};
use crate::domain::models::stats::{compute_stats, OrderStats};
use crate::error::{AppError, AppResult};
use crate::repository::{CouponRepository, OrderRepository, ProductRepository};
use crate::utils::codes::generate_order_number;
use crate::utils::phone::phone_matches;

/// 订单号重试上限 (撞唯一索引后换号)
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// 公开下单表单
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "Customer phone is required"))]
    pub customer_phone: String,
    pub customer_address: Option<String>,

    #[validate(length(min = 1, message = "Delivery date is required"))]
    pub delivery_date: String,
    #[validate(length(min = 1, message = "Delivery time is required"))]
    pub delivery_time: String,
    pub delivery_type: DeliveryType,

    pub product_id: Option<String>,

    pub cake_message: Option<String>,
    pub flavor: Option<String>,
    pub weight: Option<String>,
    pub special_instructions: Option<String>,

    pub coupon_code: Option<String>,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    coupons: Arc<dyn CouponRepository>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        coupons: Arc<dyn CouponRepository>,
    ) -> Self {
        Self {
            orders,
            products,
            coupons,
        }
    }

    pub async fn create_order(&self, form: OrderForm) -> AppResult<Order> {
        if form.delivery_type == DeliveryType::Delivery
            && form
                .customer_address
                .as_deref()
                .is_none_or(|address| address.trim().is_empty())
        {
            return Err(AppError::Validation(
                "Delivery address is required".to_string(),
            ));
        }

        // 未选中商品就按询价单处理, 快照留空
        let snapshot = match &form.product_id {
            Some(product_id) => self
                .products
                .find_by_id(product_id)
                .await?
                .as_ref()
                .map(ProductSnapshot::from),
            None => None,
        };

        let coupon = match form.coupon_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(self.redeem_coupon(code, &form.customer_email).await?),
            _ => None,
        };

        let discount_percent = coupon.as_ref().map(|c| c.discount_percent).unwrap_or(0);
        let base_price = snapshot.as_ref().map(|s| s.price);
        let total_price = compute_total_price(base_price, discount_percent);

        let now = Utc::now();
        let mut order = Order {
            id: Order::new_id(),
            order_number: generate_order_number(Local::now().date_naive()),
            product_id: snapshot.as_ref().map(|s| s.id.clone()),
            product_name: snapshot.as_ref().map(|s| s.name.clone()),
            product_image: snapshot.as_ref().and_then(|s| s.image.clone()),
            product_price: base_price,
            customer_name: form.customer_name,
            customer_email: form.customer_email,
            customer_phone: form.customer_phone,
            customer_address: form.customer_address,
            delivery_date: form.delivery_date,
            delivery_time: form.delivery_time,
            delivery_type: form.delivery_type,
            cake_message: form.cake_message,
            flavor: form.flavor,
            weight: form.weight,
            special_instructions: form.special_instructions,
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            discount_percent: coupon.map(|c| c.discount_percent),
            status: OrderStatus::Pending,
            total_price,
            created_at: now,
            updated_at: now,
        };

        // 撞号概率极低, 但唯一索引在, 换号重试即可
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            match self.orders.insert(&order).await {
                Ok(()) => return Ok(order),
                Err(err) if err.is_conflict() && attempt < ORDER_NUMBER_ATTEMPTS => {
                    tracing::warn!(order_number = %order.order_number, "order number collision, regenerating");
                    order.order_number = generate_order_number(Local::now().date_naive());
                }
                Err(err) => return Err(err),
            }
        }

        unreachable!("order insert loop always returns")
    }

    /// 状态更新是直接覆写, 六个枚举值任意互转
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> AppResult<Order> {
        self.orders
            .update_status(id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        self.orders.list().await
    }

    pub async fn get_order(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> AppResult<Vec<Order>> {
        let normalized = order_number.trim().to_uppercase();
        let order = self.orders.find_by_order_number(&normalized).await?;
        Ok(order.into_iter().collect())
    }

    /// 全量扫描后按末10位数字比对, 容忍各种书写格式
    pub async fn get_orders_by_phone(&self, phone: &str) -> AppResult<Vec<Order>> {
        let orders = self.orders.list().await?;
        Ok(orders
            .into_iter()
            .filter(|order| phone_matches(&order.customer_phone, phone))
            .collect())
    }

    pub async fn get_orders_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        self.orders.find_by_email(email.trim()).await
    }

    pub async fn get_order_stats(&self) -> AppResult<OrderStats> {
        let orders = self.orders.list().await?;
        Ok(compute_stats(&orders, Local::now()))
    }

    /// 下单即核销: 过期/已用的券直接让订单失败, 而不是静默丢折扣
    async fn redeem_coupon(&self, code: &str, customer_email: &str) -> AppResult<Coupon> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid coupon code".to_string()))?;

        if !coupon.is_valid_on(Local::now().date_naive()) {
            return Err(AppError::Validation(
                "Coupon is only valid on the day it was issued".to_string(),
            ));
        }
        if coupon.is_used() {
            return Err(AppError::Validation(
                "Coupon has already been used".to_string(),
            ));
        }

        self.coupons
            .redeem(code, customer_email, Utc::now())
            .await?
            .ok_or_else(|| AppError::Validation("Coupon has already been used".to_string()))
    }
}
