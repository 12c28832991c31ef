//! Notification domain entities.

pub mod action;
pub mod id;
pub mod lifecycle;
pub mod model;
pub mod recipient;
pub mod status;

pub use action::NotificationAction;
pub use id::NotificationId;
pub use lifecycle::{Lifecycle, Transition};
pub use model::{NewNotification, Notification, NotificationContent};
pub use recipient::NotificationRecipient;
pub use status::NotificationStatus;
