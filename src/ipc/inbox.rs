//! Shared state filled by the response reader
//!
//! Command queue, equip queue and dialogue session sit behind one lock. The
//! reader thread only appends; the host tick drains.

use super::protocol::{DialogueSelection, EquipDescriptor};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct DialogueState {
    id: u64,
    open: bool,
    selection: Option<DialogueSelection>,
}

#[derive(Debug, Default)]
struct Queues {
    commands: VecDeque<String>,
    equips: VecDeque<EquipDescriptor>,
    dialogue: DialogueState,
}

/// Inbound queues and dialogue session
#[derive(Debug, Default)]
pub struct Inbox {
    inner: Mutex<Queues>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Queues> {
        // Queue contents stay valid even if a holder panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_command(&self, command: String) {
        self.lock().commands.push_back(command);
    }

    pub fn pop_command(&self) -> Option<String> {
        self.lock().commands.pop_front()
    }

    pub fn push_equip(&self, item: EquipDescriptor) {
        self.lock().equips.push_back(item);
    }

    pub fn pop_equip(&self) -> Option<EquipDescriptor> {
        self.lock().equips.pop_front()
    }

    /// Start a new session, dropping any unread selection; returns its id
    pub fn open_dialogue(&self) -> u64 {
        let mut queues = self.lock();
        let dialogue = &mut queues.dialogue;
        dialogue.id += 1;
        dialogue.open = true;
        dialogue.selection = None;
        dialogue.id
    }

    /// End the current session; later selections for it are ignored
    pub fn close_dialogue(&self) {
        let mut queues = self.lock();
        queues.dialogue.open = false;
        queues.dialogue.selection = None;
    }

    pub fn dialogue_open(&self) -> bool {
        self.lock().dialogue.open
    }

    /// Record a selection if it belongs to the open session
    ///
    /// Returns whether it was accepted.
    pub fn offer_selection(&self, id: u64, index: i64) -> bool {
        let mut queues = self.lock();
        let dialogue = &mut queues.dialogue;

        if !dialogue.open || dialogue.id != id {
            debug!(id, current = dialogue.id, "stale dialogue selection");
            return false;
        }

        match DialogueSelection::from_index(index) {
            Some(selection) => {
                dialogue.selection = Some(selection);
                true
            }
            None => {
                debug!(index, "ignoring dialogue index");
                false
            }
        }
    }

    /// Read and clear the current selection
    pub fn take_selection(&self) -> Option<DialogueSelection> {
        self.lock().dialogue.selection.take()
    }
}
