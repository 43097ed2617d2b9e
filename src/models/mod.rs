mod notification;

pub use notification::{ChatNotificationRequest, EmailNotificationRequest, Severity};
