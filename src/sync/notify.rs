//! Message-received notification adapters
//!
//! The registry calls [`MessageNotifier::message_received`] exactly once per
//! accepted payload, synchronously and after the payload is stored. On Linux
//! [`EventFdNotifier`] turns those calls into eventfd wakeups so a protocol
//! task blocked in `poll` learns that data is waiting.

use crate::ConnectionId;

#[cfg(target_os = "linux")]
use std::{
    os::fd::{AsFd, AsRawFd, OwnedFd, RawFd},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

#[cfg(target_os = "linux")]
use nix::{
    errno::Errno,
    poll::{poll, PollFd, PollFlags},
    sys::eventfd::{eventfd, EfdFlags},
    unistd::{read, write},
};

#[cfg(target_os = "linux")]
use crate::error::{Result, RxError};

/// Receiver of message-received notifications
pub trait MessageNotifier {
    /// A payload for `connection_id` has been stored
    fn message_received(&mut self, connection_id: ConnectionId);
}

impl<F> MessageNotifier for F
where
    F: FnMut(ConnectionId),
{
    fn message_received(&mut self, connection_id: ConnectionId) {
        self(connection_id)
    }
}

/// Discards notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl MessageNotifier for NoopNotifier {
    fn message_received(&mut self, _connection_id: ConnectionId) {}
}

/// Records the connection id of every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Vec<ConnectionId>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Notified connection ids, oldest first
    pub fn received(&self) -> &[ConnectionId] {
        &self.received
    }

    /// Number of notifications
    pub fn count(&self) -> usize {
        self.received.len()
    }

    /// Notifications for one connection
    pub fn count_for(&self, connection_id: ConnectionId) -> usize {
        self.received.iter().filter(|&&id| id == connection_id).count()
    }

    /// Forget recorded notifications
    pub fn clear(&mut self) {
        self.received.clear();
    }
}

impl MessageNotifier for RecordingNotifier {
    fn message_received(&mut self, connection_id: ConnectionId) {
        self.received.push(connection_id);
    }
}

/// Statistics for eventfd notifications
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationStats {
    /// Number of notifications sent
    pub notify_count: u64,
    /// Number of waits performed
    pub wait_count: u64,
    /// Whether notifications are currently enabled
    pub enabled: bool,
}

#[cfg(target_os = "linux")]
#[derive(Debug)]
struct EventFdInner {
    event_fd: OwnedFd,
    enabled: AtomicBool,
    notify_count: AtomicU64,
    wait_count: AtomicU64,
}

/// Notifier backed by a Linux eventfd.
///
/// Clones share the descriptor: hand one clone to the registry and keep
/// another on the consuming side to `wait` on or register with a poller.
#[cfg(target_os = "linux")]
#[derive(Debug, Clone)]
pub struct EventFdNotifier {
    inner: Arc<EventFdInner>,
}

#[cfg(target_os = "linux")]
impl EventFdNotifier {
    /// Create a non-blocking eventfd notifier
    pub fn new() -> Result<Self> {
        let event_fd = eventfd(0, EfdFlags::EFD_CLOEXEC | EfdFlags::EFD_NONBLOCK)
            .map_err(|e| RxError::platform(format!("eventfd creation failed: {}", e)))?;

        Ok(Self {
            inner: Arc::new(EventFdInner {
                event_fd,
                enabled: AtomicBool::new(true),
                notify_count: AtomicU64::new(0),
                wait_count: AtomicU64::new(0),
            }),
        })
    }

    /// Add one to the eventfd counter
    pub fn notify(&self) -> Result<()> {
        if !self.inner.enabled.load(Ordering::Relaxed) {
            return Ok(());
        }

        self.inner.notify_count.fetch_add(1, Ordering::Relaxed);

        let buf = 1u64.to_ne_bytes();
        match write(self.raw_fd(), &buf) {
            Ok(_) => Ok(()),
            // Counter saturated; the reader is already due to wake up
            Err(Errno::EAGAIN) => Ok(()),
            Err(e) => Err(RxError::platform(format!("eventfd write failed: {}", e))),
        }
    }

    /// Read and reset the counter without blocking, 0 when nothing is pending
    pub fn try_drain(&self) -> Result<u64> {
        let mut buf = [0u8; 8];
        match read(self.raw_fd(), &mut buf) {
            Ok(_) => Ok(u64::from_ne_bytes(buf)),
            Err(Errno::EAGAIN) => Ok(0),
            Err(e) => Err(RxError::platform(format!("eventfd read failed: {}", e))),
        }
    }

    /// Block until notified or `timeout` elapses, then drain.
    ///
    /// Returns the number of notifications drained, 0 on timeout.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<u64> {
        self.inner.wait_count.fetch_add(1, Ordering::Relaxed);

        let timeout_ms = timeout
            .map(|t| t.as_millis().min(i32::MAX as u128) as i32)
            .unwrap_or(-1);
        let mut fds = [PollFd::new(&self.inner.event_fd, PollFlags::POLLIN)];

        match poll(&mut fds, timeout_ms) {
            Ok(0) => Ok(0),
            Ok(_) => self.try_drain(),
            Err(e) => Err(RxError::platform(format!("poll failed: {}", e))),
        }
    }

    /// Raw descriptor for registration with an external poller
    pub fn raw_fd(&self) -> RawFd {
        self.inner.event_fd.as_fd().as_raw_fd()
    }

    /// Enable or disable notifications
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check if notifications are enabled
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Get notification statistics
    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            notify_count: self.inner.notify_count.load(Ordering::Relaxed),
            wait_count: self.inner.wait_count.load(Ordering::Relaxed),
            enabled: self.is_enabled(),
        }
    }
}

#[cfg(target_os = "linux")]
impl MessageNotifier for EventFdNotifier {
    fn message_received(&mut self, connection_id: ConnectionId) {
        if let Err(e) = self.notify() {
            log::warn!("notification for connection {} not delivered: {}", connection_id, e);
        }
    }
}
