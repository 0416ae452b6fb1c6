//! End-to-end: worker output bytes in, synthetic input events and console
//! lines out.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

use voicekey::commands::{CommandDispatcher, CommandExecutor, CommandRegistry};
use voicekey::driver::{Enqueue, TickDriver, WorkerDriver, command_queue};
use voicekey::host::{LogEquip, NoFocus, RecordingConsole};
use voicekey::input::{
    Direction, InputEvent, Injector, KeyNameResolver, Pacer, PressScheduler, RecordingBackend, ScanCode,
    VirtualPacer,
};
use voicekey::ipc::{DialogueSelection, IpcTransport, LineSettings, SharedBuffer};
use voicekey::session::HostSession;

fn settings() -> LineSettings {
    LineSettings {
        chunk_bytes: 7,
        retry_interval: Duration::from_millis(1),
        max_idle_retries: 3,
    }
}

fn executor(pacer: Arc<dyn Pacer>, backend: RecordingBackend) -> CommandExecutor {
    let scheduler = PressScheduler::new(
        Arc::new(KeyNameResolver::new()),
        Injector::new(Box::new(backend)),
        pacer,
        50,
    );
    CommandExecutor::new(scheduler, Arc::new(NoFocus), String::new())
}

fn keys(backend: &RecordingBackend) -> Vec<(u128, ScanCode, Direction)> {
    backend
        .events()
        .into_iter()
        .filter_map(|e| match e.event {
            InputEvent::Key(code, direction) => Some((e.at.as_millis(), code, direction)),
            InputEvent::Mouse(_) => None,
        })
        .collect()
}

struct Host {
    session: HostSession,
    console: RecordingConsole,
    sent: SharedBuffer,
}

fn host(capacity: usize) -> (Host, flume::Receiver<voicekey::commands::Invocation>) {
    let sent = SharedBuffer::new();
    let transport = Arc::new(IpcTransport::new(Box::new(sent.clone())));
    let dispatcher = CommandDispatcher::new(Arc::new(CommandRegistry::standard()));
    let (queue, rx) = command_queue(dispatcher, capacity);
    let console = RecordingConsole::new();
    let session = HostSession::new(transport, queue, Arc::new(console.clone()), Arc::new(LogEquip));
    (
        Host {
            session,
            console,
            sent,
        },
        rx,
    )
}

#[test]
fn test_worker_commands_reach_executor_and_console() {
    let (host, rx) = host(1000);
    let pacer: Arc<dyn Pacer> = Arc::new(VirtualPacer::new());
    let backend = RecordingBackend::new(pacer.clone());
    let mut driver = TickDriver::new(rx, executor(pacer, backend.clone()));

    let output = "COMMAND|press a 100 b 100;player.additem f 100\r\nCOMMAND|tapkey e\n";
    let reader = host
        .session
        .transport()
        .spawn_reader(Cursor::new(output), settings())
        .unwrap();
    reader.join().unwrap();

    for _ in 0..5 {
        host.session.tick();
        driver.drain_one();
    }

    assert_eq!(host.console.lines(), vec!["player.additem f 100"]);
    assert_eq!(
        keys(&backend),
        vec![
            (0, ScanCode(30), Direction::Down),
            (0, ScanCode(48), Direction::Down),
            (100, ScanCode(30), Direction::Up),
            (101, ScanCode(48), Direction::Up),
            (101, ScanCode(18), Direction::Down),
            (151, ScanCode(18), Direction::Up),
        ]
    );
}

#[test]
fn test_worker_driver_drains_in_arrival_order() {
    let (host, rx) = host(1000);
    let pacer: Arc<dyn Pacer> = Arc::new(VirtualPacer::new());
    let backend = RecordingBackend::new(pacer.clone());
    let running = Arc::new(AtomicBool::new(true));
    let recorder = backend.clone();
    let driver = WorkerDriver::spawn(rx, running, move || executor(pacer, recorder)).unwrap();

    let inbox = host.session.transport().inbox().clone();
    for key in ["a", "b", "c", "d"] {
        inbox.push_command(format!("tapkey {}", key));
    }
    for _ in 0..4 {
        assert_eq!(host.session.tick().command, Some(Enqueue::Accepted));
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while backend.events().len() < 8 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    drop(host);
    driver.join();

    let downs: Vec<ScanCode> = keys(&backend)
        .into_iter()
        .filter(|(_, _, d)| *d == Direction::Down)
        .map(|(_, code, _)| code)
        .collect();
    assert_eq!(downs, vec![ScanCode(30), ScanCode(48), ScanCode(46), ScanCode(32)]);
}

#[test]
fn test_full_queue_rejects_without_forwarding() {
    let (host, rx) = host(1);
    let inbox = host.session.transport().inbox().clone();
    inbox.push_command("tapkey a".into());
    inbox.push_command("tapkey b".into());

    assert_eq!(host.session.tick().command, Some(Enqueue::Accepted));
    assert_eq!(host.session.tick().command, Some(Enqueue::Rejected));
    assert!(host.console.lines().is_empty());
    assert_eq!(rx.len(), 1);
}

#[test]
fn test_dialogue_round_trip() {
    let (host, _rx) = host(10);
    let transport = host.session.transport().clone();

    let stale = transport.start_dialogue(&["Old topic".into()]).unwrap();
    let id = transport
        .start_dialogue(&["What do you sell?".into(), "Goodbye.".into()])
        .unwrap();

    let output = format!("DIALOGUE|{}|0\nDIALOGUE|{}|1\n", stale, id);
    transport
        .spawn_reader(Cursor::new(output), settings())
        .unwrap()
        .join()
        .unwrap();

    let report = host.session.tick();
    assert_eq!(report.selection, Some(DialogueSelection::Topic(1)));
    assert!(transport.inbox().dialogue_open());

    // A spoken farewell for the same session closes the menu
    transport
        .spawn_reader(Cursor::new(format!("DIALOGUE|{}|-2\n", id)), settings())
        .unwrap()
        .join()
        .unwrap();
    let report = host.session.tick();
    assert_eq!(report.selection, Some(DialogueSelection::Goodbye));
    assert!(!transport.inbox().dialogue_open());

    assert_eq!(
        host.sent.lines(),
        vec![
            format!("START_DIALOGUE|{}|Old topic", stale),
            format!("START_DIALOGUE|{}|What do you sell?|Goodbye.", id),
            "STOP_DIALOGUE".to_string(),
        ]
    );
}
