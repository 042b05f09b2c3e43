//! Contract enforcement tests
//! Every violation is reported once and leaves the registry untouched

use std::{cell::RefCell, env, process::Command};

use sr_rxbuf::{
    limits::MAX_PAYLOAD_LEN, FatalCode, HaltOnFatal, NoopNotifier, Payload, ReceiveRegistry, RecordingFatalSink, RecordingNotifier,
    RegistryLimits, RxError,
};

const HALT_CHILD_ENV: &str = "SR_RXBUF_HALT_CHILD";
const HALT_RETURNED: &str = "halt sink returned";

fn payload(tag: u8, len: usize) -> Payload {
    Payload::from_slice(&vec![tag; len]).unwrap()
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    /// Rejected calls must not change counters, contents or statistics
    #[test]
    fn violations_leave_state_unchanged() {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        registry.init(2, 2).unwrap();
        registry.add(0, &payload(1, 5)).unwrap();
        registry.add(0, &payload(2, 6)).unwrap();
        registry.add(1, &payload(3, 7)).unwrap();

        let before = registry.snapshot().unwrap();
        let notifications = registry.notifier().count();

        assert!(registry.add(0, &payload(4, 1)).is_err());
        assert!(registry.add(1, &Payload::with_size(0)).is_err());
        assert!(registry.add(1, &Payload::with_size(MAX_PAYLOAD_LEN + 1)).is_err());
        assert!(registry.add(5, &payload(4, 1)).is_err());
        assert!(registry.read(2).is_err());
        assert!(registry.reset_connection(usize::MAX).is_err());
        assert!(registry.used_count(2).is_err());
        assert!(registry.free_count(3).is_err());
        assert!(registry.next_payload_size(4).is_err());
        assert!(registry.stats(2).is_err());
        assert!(registry.init(1, 2).is_err());

        assert_eq!(registry.snapshot().unwrap(), before);
        assert_eq!(registry.notifier().count(), notifications);
        assert_eq!(
            registry.fatal_sink().codes(),
            vec![
                FatalCode::ReceiveBufferFull,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::AlreadyInitialized,
            ]
        );
    }

    /// Out-of-range init arguments keep the registry uninitialized
    #[test]
    fn init_rejects_out_of_range_arguments() {
        let cases = [(0, 2), (3, 2), (1, 1), (1, 21), (2, 0)];

        for (connection_count, capacity) in cases {
            let mut registry = ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
            let err = registry.init(connection_count, capacity).unwrap_err();
            assert_eq!(err.code(), Some(FatalCode::InvalidParameter), "{:?}", (connection_count, capacity));
            assert!(!registry.is_initialized());

            // Still usable: a valid init afterwards succeeds
            registry.init(1, 2).unwrap();
            assert_eq!(registry.fatal_sink().count(), 1);
        }
    }

    /// Invalid limits are reported at init time
    #[test]
    fn invalid_limits_rejected_at_init() {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new())
                .with_limits(RegistryLimits::default().with_capacity_range(1, 20));

        let err = registry.init(1, 2).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::InvalidParameter));
        assert!(!registry.is_initialized());
    }

    /// Reset discards stored payloads and reports nothing
    #[test]
    fn reset_is_not_a_violation() {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        registry.init(1, 2).unwrap();
        registry.add(0, &payload(1, 1)).unwrap();
        registry.add(0, &payload(2, 1)).unwrap();

        registry.reset_connection(0).unwrap();
        registry.reset_connection(0).unwrap();

        assert_eq!(registry.free_count(0).unwrap(), 2);
        let stats = registry.stats(0).unwrap();
        assert_eq!(stats.resets, 2);
        assert_eq!(stats.total_discarded, 2);
        assert_eq!(stats.in_flight(), 0);
        assert_eq!(registry.fatal_sink().count(), 0);
    }

    /// A closure sink sees the full error, not just the code
    #[test]
    fn closure_sink_receives_error_context() {
        let seen = RefCell::new(Vec::new());
        let sink = |err: &RxError| seen.borrow_mut().push(err.clone());

        let mut registry = ReceiveRegistry::with_collaborators(RecordingNotifier::new(), sink);
        registry.init(1, 2).unwrap();
        registry.add(0, &payload(1, 1)).unwrap();
        registry.add(0, &payload(1, 1)).unwrap();
        let _ = registry.add(0, &payload(1, 1));
        drop(registry);

        let seen = seen.into_inner();
        assert_eq!(seen, vec![RxError::receive_buffer_full(0, 2)]);
    }

    /// The default registry logs and returns the typed error
    #[test]
    fn default_sink_returns_error() {
        let mut registry = ReceiveRegistry::new();
        let err = registry.read(0).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, RxError::NotInitialized { operation: "read" }));
    }

    /// The production sink aborts the process instead of returning
    #[test]
    fn halt_on_fatal_never_returns() {
        if env::var_os(HALT_CHILD_ENV).is_some() {
            let mut registry = ReceiveRegistry::with_collaborators(NoopNotifier, HaltOnFatal);
            let _ = registry.read(0);
            println!("{}", HALT_RETURNED);
            return;
        }

        let exe = env::current_exe().unwrap();
        let output = Command::new(exe)
            .args([
                "contract_tests::halt_on_fatal_never_returns",
                "--exact",
                "--nocapture",
                "--test-threads=1",
            ])
            .env(HALT_CHILD_ENV, "1")
            .output()
            .unwrap();

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!output.status.success(), "child exited cleanly: {}", stdout);
        assert!(!stdout.contains(HALT_RETURNED), "child continued after violation");
    }
}
