//! Notification hooks invoked by the registry

pub mod notify;

pub use notify::{MessageNotifier, NoopNotifier, RecordingNotifier};
#[cfg(target_os = "linux")]
pub use notify::{EventFdNotifier, NotificationStats};
