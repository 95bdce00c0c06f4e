pub mod notify;

pub use notify::{LogNotifier, NotificationKind, NotificationMessage, NotificationSender, NotifyError};
