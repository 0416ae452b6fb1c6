//! Command classification at the host boundary

use super::registry::{CommandRegistry, Invocation};
use std::sync::Arc;

/// Outcome of dispatching one command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A registered custom command
    Handled(Invocation),
    /// Not ours; the host should pass the text through unchanged
    NotCustom,
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled(_))
    }
}

/// Decides whether text is a custom command
///
/// Pure classification: it never executes and never touches a queue.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn dispatch(&self, raw: &str) -> Dispatch {
        match self.registry.classify(raw) {
            Some(invocation) => Dispatch::Handled(invocation),
            None => Dispatch::NotCustom,
        }
    }
}
