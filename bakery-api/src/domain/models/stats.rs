use chrono::{DateTime, Datelike, Duration, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use super::order::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub orders: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub today: PeriodStats,
    pub this_week: PeriodStats,
    pub this_month: PeriodStats,
    pub total: PeriodStats,
    pub by_status: BTreeMap<String, u64>,
}

/// 全量扫描聚合. 营收不计 cancelled, 订单量照计.
/// 按服务器本地日历分桶, 周从周日起算.
pub fn compute_stats(orders: &[Order], now: DateTime<Local>) -> OrderStats {
    let today = now.date_naive();
    let week_start = today - Duration::days(now.weekday().num_days_from_sunday() as i64);

    let mut stats = OrderStats {
        today: PeriodStats::default(),
        this_week: PeriodStats::default(),
        this_month: PeriodStats::default(),
        total: PeriodStats::default(),
        by_status: OrderStatus::iter()
            .map(|s| (s.to_string(), 0))
            .collect(),
    };

    for order in orders {
        let date = order.created_at.with_timezone(&Local).date_naive();
        let revenue = if order.status == OrderStatus::Cancelled {
            0
        } else {
            order.total_price
        };

        stats.total.orders += 1;
        stats.total.revenue += revenue;

        if date == today {
            stats.today.orders += 1;
            stats.today.revenue += revenue;
        }
        if date >= week_start && date <= today {
            stats.this_week.orders += 1;
            stats.this_week.revenue += revenue;
        }
        if date.year() == today.year() && date.month() == today.month() {
            stats.this_month.orders += 1;
            stats.this_month.revenue += revenue;
        }

        *stats.by_status.entry(order.status.to_string()).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::DeliveryType;
    use chrono::TimeZone;

    fn order_at(created_at: DateTime<Local>, status: OrderStatus, total_price: i64) -> Order {
        Order {
            id: Order::new_id(),
            order_number: "NB2608050001".to_string(),
            product_id: None,
            product_name: None,
            product_image: None,
            product_price: None,
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            customer_address: None,
            delivery_date: "2026-08-10".to_string(),
            delivery_time: "17:00".to_string(),
            delivery_type: DeliveryType::Pickup,
            cake_message: None,
            flavor: None,
            weight: None,
            special_instructions: None,
            coupon_code: None,
            discount_percent: None,
            status,
            total_price,
            created_at: created_at.with_timezone(&chrono::Utc),
            updated_at: created_at.with_timezone(&chrono::Utc),
        }
    }

    #[test]
    fn test_compute_stats_buckets_and_cancelled_exclusion() {
        // 2026-08-05 是周三; 本周从周日 08-02 起
        let now = Local.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();

        let orders = vec![
            order_at(now, OrderStatus::Pending, 700),
            // 今天但已取消: 计入单量, 不计营收
            order_at(now, OrderStatus::Cancelled, 500),
            // 周一: 本周+本月
            order_at(Local.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap(), OrderStatus::Delivered, 1200),
            // 上周六: 仅本月
            order_at(Local.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(), OrderStatus::Delivered, 300),
            // 上个月: 仅累计
            order_at(Local.with_ymd_and_hms(2026, 7, 10, 9, 0, 0).unwrap(), OrderStatus::Delivered, 1000),
        ];

        let stats = compute_stats(&orders, now);

        assert_eq!(stats.today, PeriodStats { orders: 2, revenue: 700 });
        assert_eq!(stats.this_week, PeriodStats { orders: 3, revenue: 1900 });
        assert_eq!(stats.this_month, PeriodStats { orders: 4, revenue: 2200 });
        assert_eq!(stats.total, PeriodStats { orders: 5, revenue: 3200 });

        assert_eq!(stats.by_status["pending"], 1);
        assert_eq!(stats.by_status["cancelled"], 1);
        assert_eq!(stats.by_status["delivered"], 3);
        // 未出现的状态也要有零值条目
        assert_eq!(stats.by_status["preparing"], 0);
        assert_eq!(stats.by_status.len(), 6);
    }

    #[test]
    fn test_compute_stats_empty() {
        let now = Local.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        let stats = compute_stats(&[], now);

        assert_eq!(stats.total, PeriodStats::default());
        assert_eq!(stats.by_status.len(), 6);
    }
}
