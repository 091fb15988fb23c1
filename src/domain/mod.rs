//! Domain aggregates exposed by the dashboard service layer.

pub mod client;
pub mod company;
pub mod dashboard;
pub mod document;
pub mod email;
pub mod invoice;
pub mod notification;
pub mod partner;
pub mod quotation;
pub mod role;
pub mod template;
pub mod types;
pub mod user;
