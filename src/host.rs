//! Host-side collaborators
//!
//! The pipeline only sees these traits. The bundled binary wires in the small
//! stand-ins defined here; an embedding host supplies its own.

use crate::error::FocusError;
use crate::ipc::protocol::EquipDescriptor;
use std::io::{self, Write};
use std::process::Command;
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::{debug, info};

// ============================================================================
// Console
// ============================================================================

/// Receives pass-through commands the host should run itself
pub trait ConsoleSink: Send + Sync {
    fn submit(&self, text: &str);
}

/// Reports pass-through commands in the log
#[derive(Debug, Default)]
pub struct LogConsole;

impl ConsoleSink for LogConsole {
    fn submit(&self, text: &str) {
        info!(text, "console command");
    }
}

/// Prints pass-through commands on stdout, one per line
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn submit(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
        let _ = stdout.flush();
    }
}

/// Keeps submitted commands for inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingConsole {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ConsoleSink for RecordingConsole {
    fn submit(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

// ============================================================================
// Window focus
// ============================================================================

/// Finds running processes by executable name
pub trait ProcessLookup: Send + Sync {
    fn find_pid(&self, name: &str) -> Option<u32>;
}

/// Process lookup backed by `sysinfo`
#[derive(Debug, Default)]
pub struct SysinfoLookup;

impl ProcessLookup for SysinfoLookup {
    fn find_pid(&self, name: &str) -> Option<u32> {
        let mut system = System::new();
        system.refresh_processes();
        system
            .processes()
            .values()
            .find(|process| process.name().eq_ignore_ascii_case(name))
            .map(|process| process.pid().as_u32())
    }
}

/// Brings a window to the foreground
pub trait WindowFocus: Send + Sync {
    fn focus(&self, target: &str) -> Result<(), FocusError>;
}

/// Focus through `xdotool`
///
/// A target naming a running executable is matched by pid, anything else by
/// window title.
pub struct XdotoolFocus {
    processes: Box<dyn ProcessLookup>,
}

impl XdotoolFocus {
    pub fn new(processes: Box<dyn ProcessLookup>) -> Self {
        Self { processes }
    }

    fn activate(&self, search: &[&str], target: &str) -> Result<(), FocusError> {
        debug!(?search, "xdotool search");
        let output = Command::new("xdotool")
            .arg("search")
            .args(search)
            .arg("windowactivate")
            .output()?;

        if !output.status.success() {
            return Err(FocusError::NotFound(target.to_string()));
        }
        Ok(())
    }
}

impl WindowFocus for XdotoolFocus {
    fn focus(&self, target: &str) -> Result<(), FocusError> {
        let pid = self.processes.find_pid(target).map(|pid| pid.to_string());
        match &pid {
            Some(pid) => self.activate(&["--pid", pid], target)?,
            None => self.activate(&["--name", target], target)?,
        }
        info!(window = target, "window focused");
        Ok(())
    }
}

/// Focus that only logs the request
#[derive(Debug, Default)]
pub struct NoFocus;

impl WindowFocus for NoFocus {
    fn focus(&self, target: &str) -> Result<(), FocusError> {
        info!(window = target, "switch window requested");
        Ok(())
    }
}

// ============================================================================
// Equip
// ============================================================================

/// Applies equip requests from the speech worker
pub trait EquipHandler: Send + Sync {
    fn equip(&self, item: &EquipDescriptor);
}

/// Reports equip requests in the log
#[derive(Debug, Default)]
pub struct LogEquip;

impl EquipHandler for LogEquip {
    fn equip(&self, item: &EquipDescriptor) {
        info!(
            form_id = item.form_id,
            item_id = item.item_id,
            kind = ?item.kind,
            hand = ?item.hand,
            "equip"
        );
    }
}
