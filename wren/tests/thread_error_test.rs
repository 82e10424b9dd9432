// Integration tests for error types in wren::thread::error

use std::error::Error as _;
use std::io;

use wren::CoerceError;
use wren::thread::error::*;

#[test]
fn test_mailbox_error_display() {
    assert_eq!(MailboxError::Closed.to_string(), "Mailbox is closed");
    assert_eq!(MailboxError::Disconnected.to_string(), "Mailbox worker is gone");
}

#[test]
fn test_spawn_error_display_and_source() {
    let err = SpawnError::ThreadSpawn {
        name: "wren-actor-1234abcd".to_string(),
        source: io::Error::new(io::ErrorKind::OutOfMemory, "no more threads"),
    };
    assert_eq!(
        err.to_string(),
        "Failed to start worker thread wren-actor-1234abcd: no more threads"
    );
    let source = err.source().expect("io error source");
    assert_eq!(source.to_string(), "no more threads");
}

#[test]
fn test_spawn_error_converts_to_anyhow() {
    let err = SpawnError::ThreadSpawn {
        name: "worker".to_string(),
        source: io::Error::other("refused"),
    };
    let err: anyhow::Error = err.into();
    assert!(err.to_string().contains("worker"));
    assert!(err.chain().any(|cause| cause.to_string() == "refused"));
}

#[test]
fn test_coerce_error_display() {
    assert_eq!(
        CoerceError::TypeMismatch { expected: "i64" }.to_string(),
        "payload cannot be coerced into i64"
    );
    assert_eq!(
        CoerceError::Parse { expected: "i64", input: "spawn".to_string() }.to_string(),
        "cannot parse \"spawn\" as i64"
    );
    assert_eq!(CoerceError::OutOfRange { expected: "i64" }.to_string(), "value out of range for i64");
}
