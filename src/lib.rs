//! Largada - registration backend for race events
//!
//! This library provides the core functionality of the registration system:
//! database operations, coupon validation, payment provider integration
//! (Mercado Pago and PagBank) and the HTTP API handlers.

pub mod auth;
pub mod config;
pub mod cupons;
pub mod db;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod payments;
pub mod registro;
