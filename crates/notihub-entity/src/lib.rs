//! # notihub-entity
//!
//! Domain entity models for NotiHub. The [`notification::Notification`]
//! entity owns its lifecycle transitions and enforces its field limits at
//! construction; everything else in this crate is a value object.

pub mod notification;
