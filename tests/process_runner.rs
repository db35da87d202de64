// tests/process_runner.rs
#![cfg(unix)]

use cmdrunner_test_utils::builders::WhitelistBuilder;
use cmdrunner_test_utils::{init_tracing, wait_until, with_timeout};

use std::error::Error;

use cmdrunner::engine::{Attachment, CommandService, OutboundMessage, StreamExit, sink};
use cmdrunner::errors::CmdRunnerError;
use cmdrunner::exec::runner::{decode_line, detach, start};
use cmdrunner::exec::{RealProcessBackend, Shell};
use cmdrunner::types::{InvocationHandle, OutputEvent, StreamKind};

type TestResult = Result<(), Box<dyn Error>>;

fn service(commands: &[&str]) -> CommandService<RealProcessBackend> {
    let whitelist = WhitelistBuilder::new()
        .with_commands(commands.iter().copied())
        .build();
    CommandService::new(whitelist, RealProcessBackend::new())
}

async fn collect(mut attachment: Attachment) -> Vec<OutboundMessage> {
    let mut out = Vec::new();
    while let Some(msg) = attachment.next_message().await {
        out.push(msg);
    }
    out
}

#[tokio::test]
async fn stdout_lines_arrive_in_order_then_status() -> TestResult {
    init_tracing();

    let svc = service(&["printf 'a\\nb\\nc\\n'"]);
    let handle = svc.launch(0)?;
    let messages = with_timeout(collect(svc.attach(handle)?)).await;

    assert_eq!(
        messages,
        vec![
            OutboundMessage::Stdout("a".into()),
            OutboundMessage::Stdout("b".into()),
            OutboundMessage::Stdout("c".into()),
            OutboundMessage::Status { exit_code: 0 },
        ]
    );
    assert!(!svc.registry().contains(&handle));
    Ok(())
}

#[tokio::test]
async fn exit_code_is_reported_last() -> TestResult {
    init_tracing();

    let svc = service(&["exit 7"]);
    let handle = svc.launch(0)?;

    let (mut rx, pump) = svc.attach(handle)?.spawn(8);
    let mut messages = Vec::new();
    while let Some(msg) = with_timeout(rx.recv()).await {
        messages.push(msg);
    }

    assert_eq!(messages.last(), Some(&OutboundMessage::Status { exit_code: 7 }));
    assert_eq!(
        messages.last().map(ToString::to_string).as_deref(),
        Some("Process exited with return code 7")
    );
    assert_eq!(pump.await?, StreamExit::Completed);
    assert!(svc.attach(handle).is_err(), "handle cannot be attached again");
    Ok(())
}

#[tokio::test]
async fn both_streams_keep_their_own_order() -> TestResult {
    init_tracing();

    let svc = service(&["echo o1; echo e1 >&2; echo o2; echo e2 >&2; echo o3"]);
    let handle = svc.launch(0)?;
    let messages = with_timeout(collect(svc.attach(handle)?)).await;

    let stdout: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Stdout(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    let stderr: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Stderr(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(stdout, vec!["o1", "o2", "o3"]);
    assert_eq!(stderr, vec!["e1", "e2"]);
    assert_eq!(messages.len(), 6);
    assert_eq!(messages.last(), Some(&OutboundMessage::Status { exit_code: 0 }));
    Ok(())
}

#[tokio::test]
async fn missing_binary_reports_through_the_stream() -> TestResult {
    init_tracing();

    // The shell itself spawns fine; the missing binary is its exit status.
    let svc = service(&["definitely-not-a-real-binary-cmdrunner"]);
    let handle = svc.launch(0)?;
    let messages = with_timeout(collect(svc.attach(handle)?)).await;

    assert!(messages.iter().any(|m| matches!(m, OutboundMessage::Stderr(_))));
    assert_eq!(messages.last(), Some(&OutboundMessage::Status { exit_code: 127 }));
    Ok(())
}

#[tokio::test]
async fn process_keeps_running_after_consumer_disconnects() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("done");
    let cmd = format!(
        "echo started; sleep 0.3; echo more; echo finished > '{}'",
        marker.display()
    );
    let svc = service(&[cmd.as_str()]);
    let handle = svc.launch(0)?;

    let (mut rx, pump) = svc.attach(handle)?.spawn(1);
    assert_eq!(
        with_timeout(rx.recv()).await,
        Some(OutboundMessage::Stdout("started".into()))
    );
    drop(rx);

    assert_eq!(with_timeout(pump).await?, StreamExit::Cancelled);
    assert!(wait_until(|| !svc.registry().contains(&handle)).await);

    assert!(
        wait_until(|| marker.exists()).await,
        "process ran to completion without a reader"
    );
    Ok(())
}

#[tokio::test]
async fn runner_writes_completion_and_terminator_into_the_sink() -> TestResult {
    init_tracing();

    let handle = InvocationHandle::new();
    let (writer, reader) = sink(handle);
    let mut guard = reader.try_acquire().expect("sole reader");

    let task = start(&Shell::platform(), "echo hi; echo err >&2; exit 2", writer)?;
    with_timeout(task).await?;

    let mut events = Vec::new();
    while let Some(event) = guard.next().await {
        events.push(event);
    }

    assert!(events.contains(&OutputEvent::Line {
        handle,
        text: "hi".into(),
        stream: StreamKind::Stdout,
    }));
    assert!(events.contains(&OutputEvent::Line {
        handle,
        text: "err".into(),
        stream: StreamKind::Stderr,
    }));
    assert_eq!(
        &events[events.len() - 2..],
        &[
            OutputEvent::Completion { handle, exit_code: 2 },
            OutputEvent::Terminator,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn killed_process_reports_negative_signal_number() -> TestResult {
    init_tracing();

    let svc = service(&["kill -9 $$"]);
    let handle = svc.launch(0)?;
    let messages = with_timeout(collect(svc.attach(handle)?)).await;

    assert_eq!(messages, vec![OutboundMessage::Status { exit_code: -9 }]);
    assert_eq!(messages[0].to_string(), "Process exited with return code -9");
    Ok(())
}

#[tokio::test]
async fn terminated_process_reports_minus_fifteen() -> TestResult {
    let svc = service(&["echo before; kill -TERM $$; echo after"]);
    let handle = svc.launch(0)?;
    let messages = with_timeout(collect(svc.attach(handle)?)).await;

    assert_eq!(
        messages,
        vec![
            OutboundMessage::Stdout("before".into()),
            OutboundMessage::Status { exit_code: -15 },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn missing_shell_is_a_spawn_error_and_registers_nothing() -> TestResult {
    init_tracing();

    let whitelist = WhitelistBuilder::new().with_command("echo never").build();
    let backend = RealProcessBackend::with_shell(Shell::new("/nonexistent/cmdrunner/sh", "-c"));
    let svc = CommandService::new(whitelist, backend);

    let err = svc.launch(0).unwrap_err();
    assert!(
        matches!(err, CmdRunnerError::Spawn { ref command, ref source }
            if command == "echo never" && source.kind() == std::io::ErrorKind::NotFound),
        "got {err}"
    );
    assert_eq!(err.status_code(), 500);
    assert!(svc.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn panicking_runner_still_completes_the_sink() -> TestResult {
    init_tracing();

    let handle = InvocationHandle::new();
    let (writer, reader) = sink(handle);
    let mut guard = reader.try_acquire().expect("sole reader");

    let task = detach(writer, |writer| async move {
        writer.line(StreamKind::Stdout, "partial".into());
        panic!("runner blew up");
    });
    with_timeout(task).await?;

    let mut events = Vec::new();
    while let Some(event) = guard.next().await {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            OutputEvent::Line {
                handle,
                text: "partial".into(),
                stream: StreamKind::Stdout,
            },
            OutputEvent::Completion { handle, exit_code: -1 },
            OutputEvent::Terminator,
        ]
    );
    Ok(())
}

#[test]
fn decode_line_strips_only_the_line_ending() {
    assert_eq!(decode_line(b"plain\n"), "plain");
    assert_eq!(decode_line(b"crlf\r\n"), "crlf");
    assert_eq!(decode_line(b"no newline"), "no newline");
    assert_eq!(decode_line(b"  spaced  \n"), "  spaced  ");
    assert_eq!(decode_line(b"\n"), "");
    assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
}
