//! # notihub-database
//!
//! The notification repository contract and its implementations:
//! an in-memory store for tests and single-process use, and a PostgreSQL
//! store with connection management and migrations.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::notification::{
    MemoryNotificationRepository, Mutation, NotificationQuery, NotificationRepository,
    PgNotificationRepository,
};
