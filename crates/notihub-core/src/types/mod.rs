//! Core type definitions used across the NotiHub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PaginatedData};
