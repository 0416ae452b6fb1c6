//! Host end of the speech worker channel

use super::inbox::Inbox;
use super::line::{LineReader, LineSettings, LineWriter};
use super::protocol::{DialogueSelection, EquipDescriptor, FavoriteEntry, Inbound, Outbound};
use crate::error::TransportError;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Reads worker lines and files them into the inbox until the channel ends
pub struct ResponseReader<R> {
    lines: LineReader<R>,
    inbox: Arc<Inbox>,
}

impl<R: Read> ResponseReader<R> {
    pub fn new(reader: R, settings: LineSettings, inbox: Arc<Inbox>) -> Self {
        Self {
            lines: LineReader::new(reader, settings),
            inbox,
        }
    }

    /// Loop until the channel closes or fails; returns why it stopped
    pub fn run(mut self) -> TransportError {
        loop {
            match self.lines.read_line() {
                Ok(line) => self.apply(&line),
                Err(e) => return e,
            }
        }
    }

    fn apply(&self, line: &str) {
        match Inbound::parse(line) {
            Some(Inbound::Dialogue { id, index }) => {
                if self.inbox.offer_selection(id, index) {
                    debug!(id, index, "dialogue selection");
                }
            }
            Some(Inbound::Command(commands)) => {
                for command in commands {
                    debug!(%command, "queued command");
                    self.inbox.push_command(command);
                }
            }
            Some(Inbound::Equip(item)) => {
                debug!(raw = %item.raw, "queued equip");
                self.inbox.push_equip(item);
            }
            None => {
                if !line.is_empty() {
                    warn!(line, "ignoring unrecognized line");
                }
            }
        }
    }
}

/// Owns the outbound half of the channel and the shared inbox
pub struct IpcTransport {
    writer: LineWriter,
    inbox: Arc<Inbox>,
}

impl IpcTransport {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: LineWriter::new(writer),
            inbox: Arc::new(Inbox::new()),
        }
    }

    pub fn inbox(&self) -> &Arc<Inbox> {
        &self.inbox
    }

    /// Start the reader thread over the worker's output
    pub fn spawn_reader<R>(&self, reader: R, settings: LineSettings) -> io::Result<JoinHandle<TransportError>>
    where
        R: Read + Send + 'static,
    {
        let inbox = self.inbox.clone();
        thread::Builder::new()
            .name("ipc-reader".to_string())
            .spawn(move || {
                let reason = ResponseReader::new(reader, settings, inbox).run();
                info!("response reader stopped: {}", reason);
                reason
            })
    }

    pub fn send(&self, message: &Outbound) -> Result<(), TransportError> {
        self.writer.write_line(&message.to_string())
    }

    pub fn write_line(&self, text: &str) -> Result<(), TransportError> {
        self.writer.write_line(text)
    }

    /// Open a new dialogue session and offer its lines to the worker
    pub fn start_dialogue(&self, lines: &[String]) -> Result<u64, TransportError> {
        let id = self.inbox.open_dialogue();
        info!(id, topics = lines.len(), "dialogue started");
        self.send(&Outbound::StartDialogue {
            id,
            lines: lines.to_vec(),
        })?;
        Ok(id)
    }

    pub fn stop_dialogue(&self) -> Result<(), TransportError> {
        self.inbox.close_dialogue();
        info!("dialogue stopped");
        self.send(&Outbound::StopDialogue)
    }

    pub fn send_favorites(&self, entries: Vec<FavoriteEntry>) -> Result<(), TransportError> {
        self.send(&Outbound::Favorites(entries))
    }

    pub fn pop_command(&self) -> Option<String> {
        self.inbox.pop_command()
    }

    pub fn pop_equip(&self) -> Option<EquipDescriptor> {
        self.inbox.pop_equip()
    }

    pub fn take_selection(&self) -> Option<DialogueSelection> {
        self.inbox.take_selection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::line::SharedBuffer;
    use std::io::Cursor;
    use std::time::Duration;

    fn quick() -> LineSettings {
        LineSettings {
            chunk_bytes: 64,
            retry_interval: Duration::from_millis(1),
            max_idle_retries: 2,
        }
    }

    #[test]
    fn test_reader_fills_inbox() {
        let inbox = Arc::new(Inbox::new());
        let id = inbox.open_dialogue();
        let input = format!(
            "COMMAND|press a 100;tgm\nEQUIP|1;2;1;1\nDIALOGUE|{}|3\nJUNK|x\n\nCOMMAND|sleep 5\n",
            id
        );

        let reason = ResponseReader::new(Cursor::new(input), quick(), inbox.clone()).run();
        assert!(matches!(reason, TransportError::Closed { .. }));

        assert_eq!(inbox.pop_command().as_deref(), Some("press a 100"));
        assert_eq!(inbox.pop_command().as_deref(), Some("tgm"));
        assert_eq!(inbox.pop_command().as_deref(), Some("sleep 5"));
        assert_eq!(inbox.pop_command(), None);
        assert_eq!(inbox.pop_equip().map(|e| e.raw), Some("1;2;1;1".to_string()));
        assert_eq!(inbox.take_selection(), Some(DialogueSelection::Topic(3)));
    }

    #[test]
    fn test_dialogue_lifecycle() {
        let buffer = SharedBuffer::new();
        let transport = IpcTransport::new(Box::new(buffer.clone()));

        let id = transport
            .start_dialogue(&["Hello.".to_string(), "Goodbye.".to_string()])
            .unwrap();
        assert!(transport.inbox().dialogue_open());
        assert!(transport.inbox().offer_selection(id, 1));
        assert_eq!(transport.take_selection(), Some(DialogueSelection::Topic(1)));

        transport.stop_dialogue().unwrap();
        assert!(!transport.inbox().offer_selection(id, 0));
        assert_eq!(transport.take_selection(), None);

        assert_eq!(
            buffer.lines(),
            vec![format!("START_DIALOGUE|{}|Hello.|Goodbye.", id), "STOP_DIALOGUE".to_string()]
        );
    }

    #[test]
    fn test_spawned_reader_ends_on_close() {
        let transport = IpcTransport::new(Box::new(SharedBuffer::new()));
        let handle = transport
            .spawn_reader(Cursor::new("COMMAND|tapkey e\n"), quick())
            .unwrap();
        let reason = handle.join().unwrap();
        assert!(matches!(reason, TransportError::Closed { .. }));
        assert_eq!(transport.pop_command().as_deref(), Some("tapkey e"));
    }
}
