use std::sync::Arc;

use crate::config::EmailConfig;
use crate::domain::models::order::{DeliveryType, Order};
use crate::error::AppResult;
use crate::infrastructure::external::resend::Mailer;

const BAKERY_NAME: &str = "Nupur Bakery";

pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    owner: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, config: &EmailConfig) -> Self {
        Self {
            mailer,
            owner: config.owner.clone(),
        }
    }

    /// 顾客确认信 + 店主通知, 任一失败都不影响下单结果,
    /// 调用方在 spawn 的任务里记日志后丢弃错误.
    pub async fn send_order_emails(&self, order: &Order) -> AppResult<()> {
        let confirmation = render_confirmation(order);
        let notification = render_owner_notification(order);

        self.mailer
            .send(
                &order.customer_email,
                &format!("Order Confirmation #{} - {}", order.order_number, BAKERY_NAME),
                &confirmation,
            )
            .await?;

        self.mailer
            .send(
                &self.owner,
                &format!("New Order #{} - {}", order.order_number, order.customer_name),
                &notification,
            )
            .await?;

        Ok(())
    }
}

fn render_confirmation(order: &Order) -> String {
    let product_block = match (&order.product_name, order.product_price) {
        (Some(name), Some(price)) => format!(
            "<div class=\"box\"><h2>Product</h2><p>{}</p><p class=\"price\">₹{}</p></div>",
            name, price
        ),
        _ => String::new(),
    };

    let delivery_heading = match order.delivery_type {
        DeliveryType::Delivery => "Delivery Details",
        DeliveryType::Pickup => "Pickup Details",
    };

    let address_row = match (&order.delivery_type, &order.customer_address) {
        (DeliveryType::Delivery, Some(address)) => {
            format!("<tr><td>Address:</td><td>{}</td></tr>", address)
        }
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
  <h1>{bakery}</h1>
  <p>Dear <strong>{name}</strong>,</p>
  <p>Thank you for your order! We're excited to create something special for you.</p>
  <div class="box">
    <h2>Order Details</h2>
    <table>
      <tr><td>Order Number:</td><td><strong>{number}</strong></td></tr>
      <tr><td>Order Date:</td><td>{date}</td></tr>
    </table>
  </div>
  {product}
  {customization}
  <div class="box">
    <h2>{delivery_heading}</h2>
    <table>
      <tr><td>Date:</td><td>{delivery_date}</td></tr>
      <tr><td>Time:</td><td>{delivery_time}</td></tr>
      {address_row}
    </table>
  </div>
  <div class="total">
    <p>Estimated Total</p>
    <p><strong>₹{total}</strong></p>
    <p>*Final price may vary based on customization</p>
  </div>
  <p>We will contact you shortly to confirm your order.</p>
</body>
</html>"#,
        bakery = BAKERY_NAME,
        name = order.customer_name,
        number = order.order_number,
        date = order.created_at.format("%d %B %Y"),
        product = product_block,
        customization = render_customization(order),
        delivery_heading = delivery_heading,
        delivery_date = order.delivery_date,
        delivery_time = order.delivery_time,
        address_row = address_row,
        total = order.total_price,
    )
}

fn render_owner_notification(order: &Order) -> String {
    let product_block = match (&order.product_name, order.product_price) {
        (Some(name), Some(price)) => format!(
            "<h3>Product</h3><ul><li><strong>Product:</strong> {}</li><li><strong>Base Price:</strong> ₹{}</li></ul>",
            name, price
        ),
        _ => "<p><strong>General Order (no specific product selected)</strong></p>".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
  <h1>New Order Received!</h1>
  <h2>Order #{number}</h2>
  <h3>Customer</h3>
  <ul>
    <li><strong>Name:</strong> {name}</li>
    <li><strong>Email:</strong> {email}</li>
    <li><strong>Phone:</strong> {phone}</li>
    <li><strong>Address:</strong> {address}</li>
  </ul>
  {product}
  {customization}
  <h3>Delivery</h3>
  <ul>
    <li><strong>Type:</strong> {delivery_type}</li>
    <li><strong>Date:</strong> {delivery_date}</li>
    <li><strong>Time:</strong> {delivery_time}</li>
  </ul>
  <p><strong>Estimated Total: ₹{total}</strong></p>
</body>
</html>"#,
        number = order.order_number,
        name = order.customer_name,
        email = order.customer_email,
        phone = order.customer_phone,
        address = order.customer_address.as_deref().unwrap_or("-"),
        product = product_block,
        customization = render_customization(order),
        delivery_type = order.delivery_type,
        delivery_date = order.delivery_date,
        delivery_time = order.delivery_time,
        total = order.total_price,
    )
}

fn render_customization(order: &Order) -> String {
    let mut rows = Vec::new();
    if let Some(message) = &order.cake_message {
        rows.push(format!("<li><strong>Cake Message:</strong> \"{}\"</li>", message));
    }
    if let Some(flavor) = &order.flavor {
        rows.push(format!("<li><strong>Flavor:</strong> {}</li>", flavor));
    }
    if let Some(weight) = &order.weight {
        rows.push(format!("<li><strong>Weight/Size:</strong> {}</li>", weight));
    }
    if let Some(instructions) = &order.special_instructions {
        rows.push(format!(
            "<li><strong>Special Instructions:</strong> {}</li>",
            instructions
        ));
    }

    if rows.is_empty() {
        String::new()
    } else {
        format!("<h3>Customization</h3><ul>{}</ul>", rows.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::OrderStatus;
    use crate::infrastructure::external::resend::MockMailer;
    use chrono::Utc;

    fn order() -> Order {
        Order {
            id: Order::new_id(),
            order_number: "NB2608051234".to_string(),
            product_id: None,
            product_name: Some("Red Velvet".to_string()),
            product_image: None,
            product_price: Some(1000),
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            customer_address: Some("12 MG Road, Bhopal".to_string()),
            delivery_date: "2026-08-10".to_string(),
            delivery_time: "17:00".to_string(),
            delivery_type: DeliveryType::Delivery,
            cake_message: Some("Happy Birthday!".to_string()),
            flavor: None,
            weight: None,
            special_instructions: None,
            coupon_code: None,
            discount_percent: None,
            status: OrderStatus::Pending,
            total_price: 700,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_confirmation_contains_order_details() {
        let html = render_confirmation(&order());
        assert!(html.contains("NB2608051234"));
        assert!(html.contains("Red Velvet"));
        assert!(html.contains("Happy Birthday!"));
        assert!(html.contains("12 MG Road, Bhopal"));
        assert!(html.contains("₹700"));
    }

    #[test]
    fn test_owner_notification_flags_general_orders() {
        let mut general = order();
        general.product_name = None;
        general.product_price = None;

        let html = render_owner_notification(&general);
        assert!(html.contains("General Order"));
    }

    #[test]
    fn test_customization_block_is_omitted_when_empty() {
        let mut plain = order();
        plain.cake_message = None;

        assert_eq!(render_customization(&plain), "");
    }

    #[tokio::test]
    async fn test_send_order_emails_hits_customer_and_owner() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(2)
            .returning(|_, _, _| Ok(()));

        let config = EmailConfig {
            api_key: "key".to_string(),
            from: "Nupur Bakery <mail@nupurbakery.in>".to_string(),
            owner: "mail@nupurbakery.in".to_string(),
        };

        NotificationService::new(Arc::new(mailer), &config)
            .send_order_emails(&order())
            .await
            .unwrap();
    }
}
