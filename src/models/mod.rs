//! Database models and request payloads for the dashboard entities

pub mod booking;
pub mod client;
pub mod coupon;
pub mod payment;
pub mod service;

pub use booking::{
    Booking, BookingDetail, BookingServiceLine, BookingStatus, CreateBookingPayload,
    UpdateBookingPayload, UpdateBookingStatusPayload,
};
pub use client::{Client, ClientPayload};
pub use coupon::{Coupon, CouponPayload, DiscountType};
pub use payment::{
    resolve_paid_at, CreatePaymentPayload, Payment, PaymentMethod, PaymentStatus,
    UpdatePaymentPayload, UpdatePaymentStatusPayload,
};
pub use service::{Service, ServicePayload};
