//! Aggregates for the dashboard home screen

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::{BookingStatus, PaymentStatus};

use super::{bookings, clients, payments, services};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_services: i64,
    pub total_bookings: i64,
    pub bookings_by_status: BTreeMap<&'static str, i64>,
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue_paid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue_pending: Decimal,
}

impl DashboardStats {
    /// Every status is present in the map, zero when there are no bookings
    pub fn from_parts(
        total_clients: i64,
        active_services: i64,
        status_counts: &[(BookingStatus, i64)],
        revenue_paid: Decimal,
        revenue_pending: Decimal,
    ) -> Self {
        let mut bookings_by_status: BTreeMap<&'static str, i64> = BookingStatus::ALL
            .iter()
            .map(|status| (status.as_str(), 0))
            .collect();

        for (status, count) in status_counts {
            bookings_by_status.insert(status.as_str(), *count);
        }

        Self {
            total_clients,
            active_services,
            total_bookings: status_counts.iter().map(|(_, count)| count).sum(),
            bookings_by_status,
            revenue_paid,
            revenue_pending,
        }
    }
}

pub async fn stats(pool: &PgPool) -> Result<DashboardStats> {
    let total_clients = clients::count(pool).await?;
    let active_services = services::count_active(pool).await?;
    let status_counts = bookings::count_by_status(pool).await?;
    let revenue_paid = payments::total_by_status(pool, PaymentStatus::Paid).await?;
    let revenue_pending = payments::total_by_status(pool, PaymentStatus::Pending).await?;

    Ok(DashboardStats::from_parts(
        total_clients,
        active_services,
        &status_counts,
        revenue_paid,
        revenue_pending,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_parts_fills_missing_statuses() {
        let stats = DashboardStats::from_parts(
            12,
            4,
            &[(BookingStatus::Delivered, 7), (BookingStatus::Scheduled, 2)],
            dec!(1540.00),
            dec!(230.00),
        );

        assert_eq!(stats.total_bookings, 9);
        assert_eq!(stats.bookings_by_status.len(), 5);
        assert_eq!(stats.bookings_by_status["delivered"], 7);
        assert_eq!(stats.bookings_by_status["in_route"], 0);
        assert_eq!(stats.revenue_paid, dec!(1540.00));
    }

    #[test]
    fn test_serialized_shape() {
        let stats = DashboardStats::from_parts(0, 0, &[], Decimal::ZERO, Decimal::ZERO);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalBookings"], 0);
        assert_eq!(json["bookingsByStatus"]["cancelled"], 0);
        assert_eq!(json["revenuePaid"], "0");
    }
}
