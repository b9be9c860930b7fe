//! Point-of-sale, inventory and purchasing service for auto-parts
//! retail operations.

pub mod config;
pub mod handlers;
pub mod models;
pub mod numbers;
pub mod services;
pub mod startup;

pub use startup::AppState;
