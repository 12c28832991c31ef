//! Notification publishing service.

pub mod service;

pub use service::NotificationService;
