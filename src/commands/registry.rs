//! Custom command registry
//!
//! Maps lower-case action names to the closed set of built-in actions. Built
//! once at startup and shared read-only.

use super::tokenizer::{action_name, tokenize};
use std::collections::HashMap;

/// Built-in command actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Press,
    TapKey,
    HoldKey,
    ReleaseKey,
    Sleep,
    SwitchWindow,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Press,
        Action::TapKey,
        Action::HoldKey,
        Action::ReleaseKey,
        Action::Sleep,
        Action::SwitchWindow,
    ];

    /// Name the action is invoked by
    pub fn name(self) -> &'static str {
        match self {
            Action::Press => "press",
            Action::TapKey => "tapkey",
            Action::HoldKey => "holdkey",
            Action::ReleaseKey => "releasekey",
            Action::Sleep => "sleep",
            Action::SwitchWindow => "switchwindow",
        }
    }
}

/// A classified custom command, ready for the execution queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    /// All tokens, including the action name
    pub tokens: Vec<String>,
}

impl Invocation {
    /// Tokens after the action name
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }
}

/// Lookup table from action name to [`Action`]
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    actions: HashMap<String, Action>,
}

impl CommandRegistry {
    /// Registry with every built-in action under its own name
    pub fn standard() -> Self {
        let actions = Action::ALL
            .iter()
            .map(|&action| (action.name().to_string(), action))
            .collect();
        Self { actions }
    }

    /// Find an action by case-insensitive name
    pub fn lookup(&self, name: &str) -> Option<Action> {
        self.actions.get(&name.to_lowercase()).copied()
    }

    /// Tokenize `raw` and classify it; `None` for empty or unknown commands
    pub fn classify(&self, raw: &str) -> Option<Invocation> {
        let tokens = tokenize(raw);
        let action = self.lookup(&action_name(&tokens)?)?;
        Some(Invocation { action, tokens })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        let registry = CommandRegistry::standard();
        assert_eq!(
            registry.names(),
            vec!["holdkey", "press", "releasekey", "sleep", "switchwindow", "tapkey"]
        );
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = CommandRegistry::standard();
        assert_eq!(registry.lookup("PRESS"), Some(Action::Press));
        assert_eq!(registry.lookup("TapKey"), Some(Action::TapKey));
        assert_eq!(registry.lookup("SwitchWindow"), Some(Action::SwitchWindow));
        assert_eq!(registry.lookup("player.additem"), None);
    }

    #[test]
    fn test_classify() {
        let registry = CommandRegistry::standard();

        let invocation = registry.classify("  Press a 100 ").unwrap();
        assert_eq!(invocation.action, Action::Press);
        assert_eq!(invocation.tokens, vec!["Press", "a", "100"]);
        assert_eq!(invocation.args(), ["a", "100"]);

        let invocation = registry.classify("sleep").unwrap();
        assert_eq!(invocation.action, Action::Sleep);
        assert!(invocation.args().is_empty());

        for raw in ["", "   ", "coc riverwood", "tgm", "pressx a"] {
            assert_eq!(registry.classify(raw), None, "raw {:?}", raw);
        }
    }
}
