// tests/registry.rs

use cmdrunner_test_utils::init_tracing;

use cmdrunner::engine::{TaskRegistry, sink};
use cmdrunner::errors::CmdRunnerError;
use cmdrunner::types::{InvocationHandle, OutputEvent};

#[test]
fn create_then_get_returns_the_registered_sink() {
    init_tracing();

    let registry = TaskRegistry::new();
    let handle = InvocationHandle::new();
    let (_writer, reader) = sink(handle);

    registry.create(handle, reader).expect("first create succeeds");

    assert!(registry.contains(&handle));
    assert!(registry.get(&handle).is_some());
    assert_eq!(registry.len(), 1);
}

#[test]
fn get_unknown_handle_is_none() {
    let registry = TaskRegistry::new();
    assert!(registry.get(&InvocationHandle::new()).is_none());
    assert!(registry.is_empty());
}

#[test]
fn remove_is_idempotent() {
    init_tracing();

    let registry = TaskRegistry::new();
    let handle = InvocationHandle::new();
    let (_writer, reader) = sink(handle);
    registry.create(handle, reader).unwrap();

    assert!(registry.remove(&handle), "first remove drops the entry");
    assert!(!registry.remove(&handle), "second remove is a no-op");
    assert!(!registry.contains(&handle));
    assert!(registry.is_empty());
}

#[test]
fn duplicate_create_is_rejected() {
    let registry = TaskRegistry::new();
    let handle = InvocationHandle::new();
    let (_w1, r1) = sink(handle);
    let (_w2, r2) = sink(handle);

    registry.create(handle, r1).unwrap();
    let err = registry.create(handle, r2).unwrap_err();

    assert!(matches!(err, CmdRunnerError::DuplicateHandle(h) if h == handle));
    assert_eq!(registry.len(), 1);
}

#[test]
fn removing_the_entry_closes_the_sink_for_the_writer() {
    let registry = TaskRegistry::new();
    let handle = InvocationHandle::new();
    let (writer, reader) = sink(handle);
    registry.create(handle, reader).unwrap();

    assert!(!writer.is_closed());
    registry.remove(&handle);
    assert!(writer.is_closed(), "no reader left once the entry is gone");
    assert!(!writer.line(cmdrunner::types::StreamKind::Stdout, "late".into()));
}

#[tokio::test]
async fn sink_finishes_only_once() {
    let handle = InvocationHandle::new();
    let (writer, reader) = sink(handle);
    let mut guard = reader.try_acquire().expect("sole reader");

    assert!(writer.finish(3));
    assert!(writer.is_finished());
    assert!(!writer.finish(-1), "second completion is ignored");
    drop(writer);

    assert_eq!(
        guard.next().await,
        Some(OutputEvent::Completion { handle, exit_code: 3 })
    );
    assert_eq!(guard.next().await, Some(OutputEvent::Terminator));
    assert_eq!(guard.next().await, None);
}

#[test]
fn clear_drops_every_entry() {
    let registry = TaskRegistry::new();
    let mut writers = Vec::new();
    for _ in 0..3 {
        let handle = InvocationHandle::new();
        let (writer, reader) = sink(handle);
        registry.create(handle, reader).unwrap();
        writers.push(writer);
    }

    assert_eq!(registry.clear(), 3);
    assert!(registry.is_empty());
    assert!(writers.iter().all(|w| w.is_closed()));
}

#[test]
fn concurrent_create_and_remove_leave_no_entries() {
    let registry = std::sync::Arc::new(TaskRegistry::new());

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let handle = InvocationHandle::new();
                    let (_writer, reader) = sink(handle);
                    registry.create(handle, reader).unwrap();
                    assert!(registry.get(&handle).is_some());
                    assert!(registry.remove(&handle));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
    assert!(registry.is_empty());
}
