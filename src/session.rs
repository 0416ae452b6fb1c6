//! Per-tick host work
//!
//! Each tick either services the open dialogue menu or takes one command and
//! one equip request from the inbox. Nothing here blocks. Commands wait while
//! a menu is open; a spoken goodbye closes it, anything else leaves closing
//! to the host.

use crate::driver::{CommandQueue, Enqueue};
use crate::host::{ConsoleSink, EquipHandler};
use crate::ipc::{DialogueSelection, IpcTransport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one tick did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub command: Option<Enqueue>,
    pub selection: Option<DialogueSelection>,
    pub equipped: bool,
}

pub struct HostSession {
    transport: Arc<IpcTransport>,
    queue: CommandQueue,
    console: Arc<dyn ConsoleSink>,
    equip: Arc<dyn EquipHandler>,
}

impl HostSession {
    pub fn new(
        transport: Arc<IpcTransport>,
        queue: CommandQueue,
        console: Arc<dyn ConsoleSink>,
        equip: Arc<dyn EquipHandler>,
    ) -> Self {
        Self {
            transport,
            queue,
            console,
            equip,
        }
    }

    pub fn transport(&self) -> &Arc<IpcTransport> {
        &self.transport
    }

    /// Run one host tick
    pub fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        if self.transport.inbox().dialogue_open() {
            report.selection = self.transport.take_selection();
            if let Some(selection) = report.selection {
                self.select(selection);
            }
            return report;
        }

        if let Some(command) = self.transport.pop_command() {
            report.command = Some(self.queue.route(&command, self.console.as_ref()));
        }

        if let Some(item) = self.transport.pop_equip() {
            // Spells and shouts equip through the console
            let commands = item.console_commands();
            if commands.is_empty() {
                self.equip.equip(&item);
            } else {
                for command in commands {
                    debug!(%command, "equip via console");
                    self.transport.inbox().push_command(command);
                }
            }
            report.equipped = true;
        }

        report
    }

    fn select(&self, selection: DialogueSelection) {
        match selection {
            // The menu stays up until the host hides it
            DialogueSelection::Topic(index) => info!(index, "dialogue topic selected"),
            DialogueSelection::Goodbye => {
                info!("dialogue goodbye, closing menu");
                if let Err(e) = self.transport.stop_dialogue() {
                    warn!("failed to stop dialogue: {}", e);
                }
            }
        }
    }
}
