//! # notihub-service
//!
//! The batching notification publisher. Published notifications collect
//! in an in-memory buffer and are written to the repository in bulk once
//! the configured batch limit is exceeded, or on shutdown. Status and
//! archive operations pass straight through to the repository.
//!
//! The service is built by constructor injection: the repository is
//! provided as an `Arc<dyn NotificationRepository>`.

pub mod notification;

pub use notification::NotificationService;
