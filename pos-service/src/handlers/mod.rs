//! HTTP handlers for pos-service.

pub mod activity;
pub mod catalog;
pub mod discounts;
pub mod inventory;
pub mod pos;
pub mod purchasing;
pub mod reports;
pub mod settings;
