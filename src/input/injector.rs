//! Synthetic input injection
//!
//! The [`Injector`] turns scan codes into device events and hands them to an
//! [`InputBackend`]. Injection is fire-and-forget: a backend failure is logged
//! and the command carries on.

use super::keys::{KeyClass, MouseEventKind, ScanCode, classify_mouse_event};
use super::pacer::Pacer;
use crate::error::InjectError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

/// OS-facing sink for synthetic events
pub trait InputBackend {
    fn key(&mut self, code: ScanCode, direction: Direction) -> Result<(), InjectError>;
    fn mouse(&mut self, kind: MouseEventKind) -> Result<(), InjectError>;
}

/// Routes scan codes to the keyboard or mouse side of a backend
pub struct Injector {
    backend: Box<dyn InputBackend>,
}

impl Injector {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self { backend }
    }

    pub fn down(&mut self, code: ScanCode) {
        self.send(code, Direction::Down);
    }

    pub fn up(&mut self, code: ScanCode) {
        self.send(code, Direction::Up);
    }

    fn send(&mut self, code: ScanCode, direction: Direction) {
        let result = match code.class() {
            KeyClass::None => return,
            KeyClass::Gamepad => {
                debug!(code = code.0, ?direction, "no gamepad injection, skipping");
                return;
            }
            KeyClass::Mouse => {
                match classify_mouse_event(code, direction == Direction::Up) {
                    Some(kind) => self.backend.mouse(kind),
                    None => return,
                }
            }
            KeyClass::Keyboard => self.backend.key(code, direction),
        };

        if let Err(e) = result {
            warn!(code = code.0, ?direction, "input injection failed: {}", e);
        }
    }
}

/// Backend that only reports events through `tracing`
#[derive(Debug, Default)]
pub struct LogBackend;

impl InputBackend for LogBackend {
    fn key(&mut self, code: ScanCode, direction: Direction) -> Result<(), InjectError> {
        info!(code = code.0, ?direction, "key");
        Ok(())
    }

    fn mouse(&mut self, kind: MouseEventKind) -> Result<(), InjectError> {
        info!(?kind, "mouse");
        Ok(())
    }
}

/// What a [`RecordingBackend`] saw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(ScanCode, Direction),
    Mouse(MouseEventKind),
}

/// An event stamped with the pacer time it was injected at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedEvent {
    pub at: Duration,
    pub event: InputEvent,
}

/// Backend that keeps a shared, timestamped event log
///
/// Clones share the same log, so a test can keep one handle and give the other
/// to the injector.
#[derive(Clone)]
pub struct RecordingBackend {
    clock: Arc<dyn Pacer>,
    events: Arc<Mutex<Vec<TimedEvent>>>,
}

impl RecordingBackend {
    pub fn new(clock: Arc<dyn Pacer>) -> Self {
        Self {
            clock,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<TimedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, event: InputEvent) {
        let at = self.clock.now();
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(TimedEvent { at, event });
    }
}

impl InputBackend for RecordingBackend {
    fn key(&mut self, code: ScanCode, direction: Direction) -> Result<(), InjectError> {
        self.record(InputEvent::Key(code, direction));
        Ok(())
    }

    fn mouse(&mut self, kind: MouseEventKind) -> Result<(), InjectError> {
        self.record(InputEvent::Mouse(kind));
        Ok(())
    }
}
