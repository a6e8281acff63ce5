//! Database queries, one module per table.

pub mod bookings;
pub mod clients;
pub mod coupons;
pub mod dashboard;
pub mod payments;
pub mod services;
