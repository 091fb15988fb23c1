//! Database models and request-scoped models shared across the dashboard.

#[cfg(feature = "server")]
pub mod auth;
pub mod client;
pub mod company;
#[cfg(feature = "server")]
pub mod config;
pub mod email;
pub mod invoice;
pub mod notification;
pub mod partner;
pub mod quotation;
pub mod template;
pub mod user;
