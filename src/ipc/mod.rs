//! Line-framed channel to the speech worker
//!
//! # Layout
//!
//! - [`line`]: newline framing over any `Read`/`Write`
//! - [`protocol`]: message parsing and formatting
//! - [`inbox`]: queues filled by the reader thread, drained by the host
//! - [`transport`]: the reader thread and the outbound API

pub mod inbox;
pub mod line;
pub mod protocol;
pub mod transport;

pub use inbox::Inbox;
pub use line::{LineReader, LineSettings, LineWriter, SharedBuffer};
pub use protocol::{
    DialogueSelection, EquipDescriptor, FavoriteEntry, Hand, Inbound, ItemKind, Outbound,
};
pub use transport::{IpcTransport, ResponseReader};
