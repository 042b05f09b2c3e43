//! Property tests: the registry against a VecDeque model
//! Random interleavings of add/read/reset across connections

use std::collections::VecDeque;

use proptest::prelude::*;
use sr_rxbuf::{
    limits::MAX_PAYLOAD_LEN, FatalCode, Payload, ReadOutcome, ReceiveRegistry, RecordingFatalSink,
    RecordingNotifier,
};

#[derive(Debug, Clone)]
enum Op {
    Add { connection: usize, data: Vec<u8> },
    Read { connection: usize },
    Reset { connection: usize },
}

fn op_strategy(connections: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..connections, prop::collection::vec(any::<u8>(), 1..64))
            .prop_map(|(connection, data)| Op::Add { connection, data }),
        3 => (0..connections).prop_map(|connection| Op::Read { connection }),
        1 => (0..connections).prop_map(|connection| Op::Reset { connection }),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, usize, Vec<Op>)> {
    (1usize..=2, 2usize..=20).prop_flat_map(|(connections, capacity)| {
        (
            Just(connections),
            Just(capacity),
            prop::collection::vec(op_strategy(connections), 0..200),
        )
    })
}

proptest! {
    #[test]
    fn registry_matches_fifo_model((connections, capacity, ops) in scenario()) {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        registry.init(connections, capacity).unwrap();

        let mut model: Vec<VecDeque<Vec<u8>>> = vec![VecDeque::new(); connections];
        let mut expected_notifications = Vec::new();
        let mut expected_fatal = Vec::new();

        for op in ops {
            match op {
                Op::Add { connection, data } => {
                    let result = registry.add(connection, &Payload::from_slice(&data).unwrap());
                    if model[connection].len() < capacity {
                        prop_assert!(result.is_ok());
                        model[connection].push_back(data);
                        expected_notifications.push(connection);
                    } else {
                        prop_assert_eq!(result.unwrap_err().code(), Some(FatalCode::ReceiveBufferFull));
                        expected_fatal.push(FatalCode::ReceiveBufferFull);
                    }
                }
                Op::Read { connection } => {
                    match (registry.read(connection).unwrap(), model[connection].pop_front()) {
                        (ReadOutcome::Message(payload), Some(data)) => {
                            prop_assert_eq!(payload.as_bytes(), &data[..]);
                        }
                        (ReadOutcome::NoMessageReceived, None) => {}
                        (outcome, expected) => {
                            prop_assert!(false, "read {:?}, model {:?}", outcome, expected);
                        }
                    }
                }
                Op::Reset { connection } => {
                    registry.reset_connection(connection).unwrap();
                    model[connection].clear();
                }
            }

            for id in 0..connections {
                let used = registry.used_count(id).unwrap();
                let free = registry.free_count(id).unwrap();
                prop_assert_eq!(used + free, capacity);
                prop_assert_eq!(used, model[id].len());
                prop_assert_eq!(
                    registry.next_payload_size(id).unwrap(),
                    model[id].front().map_or(0, |d| d.len())
                );
            }
        }

        prop_assert_eq!(registry.notifier().received(), &expected_notifications[..]);
        prop_assert_eq!(registry.fatal_sink().codes(), expected_fatal);
    }

    #[test]
    fn any_declared_size_is_accepted_iff_in_range(size in 0usize..=MAX_PAYLOAD_LEN + 64) {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        registry.init(1, 2).unwrap();

        let result = registry.add(0, &Payload::with_size(size));
        if (1..=MAX_PAYLOAD_LEN).contains(&size) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(registry.next_payload_size(0).unwrap(), size);
        } else {
            prop_assert_eq!(result.unwrap_err().code(), Some(FatalCode::InvalidParameter));
            prop_assert_eq!(registry.used_count(0).unwrap(), 0);
        }
    }
}
