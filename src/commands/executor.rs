//! Custom command execution

use super::registry::{Action, Invocation};
use super::tokenizer::parse_millis;
use crate::host::WindowFocus;
use crate::input::pacer::Wait;
use crate::input::scheduler::PressScheduler;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runs classified commands synchronously on the calling thread
pub struct CommandExecutor {
    scheduler: PressScheduler,
    focus: Arc<dyn WindowFocus>,
    default_window: String,
}

impl CommandExecutor {
    pub fn new(scheduler: PressScheduler, focus: Arc<dyn WindowFocus>, default_window: String) -> Self {
        Self {
            scheduler,
            focus,
            default_window,
        }
    }

    #[hotpath::measure]
    pub fn execute(&mut self, invocation: &Invocation) {
        info!(command = %invocation.tokens.join(" "), "executing");
        let args = invocation.args();

        match invocation.action {
            Action::Press => self.scheduler.press(args),
            Action::TapKey => self.scheduler.tap_key(args),
            Action::HoldKey => self.scheduler.hold_key(args),
            Action::ReleaseKey => self.scheduler.release_key(args),
            Action::Sleep => self.sleep(args),
            Action::SwitchWindow => self.switch_window(args),
        }
    }

    fn sleep(&self, args: &[String]) {
        let millis = args.first().map_or(0, |t| parse_millis(t));
        if millis == 0 {
            return;
        }
        if self.scheduler.pacer().wait(Duration::from_millis(millis)) == Wait::Cancelled {
            warn!(millis, "sleep cancelled");
        }
    }

    fn switch_window(&self, args: &[String]) {
        let requested = args.join(" ");
        let target = if requested.is_empty() {
            self.default_window.as_str()
        } else {
            requested.as_str()
        };

        if target.is_empty() {
            warn!("switchwindow without a target and no default window configured");
            return;
        }

        if let Err(e) = self.focus.focus(target) {
            warn!(window = target, "switchwindow failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::CommandRegistry;
    use crate::error::FocusError;
    use crate::input::injector::{Injector, RecordingBackend};
    use crate::input::keys::KeyNameResolver;
    use crate::input::pacer::{Pacer, VirtualPacer};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFocus {
        targets: Mutex<Vec<String>>,
    }

    impl WindowFocus for RecordingFocus {
        fn focus(&self, target: &str) -> Result<(), FocusError> {
            self.targets.lock().unwrap().push(target.to_string());
            Err(FocusError::NotFound(target.to_string()))
        }
    }

    struct Harness {
        executor: CommandExecutor,
        pacer: Arc<VirtualPacer>,
        backend: RecordingBackend,
        focus: Arc<RecordingFocus>,
        registry: CommandRegistry,
    }

    fn harness(default_window: &str) -> Harness {
        let pacer = Arc::new(VirtualPacer::new());
        let backend = RecordingBackend::new(pacer.clone());
        let scheduler = PressScheduler::new(
            Arc::new(KeyNameResolver::new()),
            Injector::new(Box::new(backend.clone())),
            pacer.clone(),
            50,
        );
        let focus = Arc::new(RecordingFocus::default());
        Harness {
            executor: CommandExecutor::new(scheduler, focus.clone(), default_window.to_string()),
            pacer,
            backend,
            focus,
            registry: CommandRegistry::standard(),
        }
    }

    impl Harness {
        fn run(&mut self, raw: &str) {
            let invocation = self.registry.classify(raw).unwrap();
            self.executor.execute(&invocation);
        }
    }

    #[test]
    fn test_sleep_advances_pacer() {
        let mut h = harness("");
        h.run("sleep 250");
        assert_eq!(h.pacer.now(), Duration::from_millis(250));
        h.run("sleep 0x64");
        assert_eq!(h.pacer.now(), Duration::from_millis(350));
    }

    #[test]
    fn test_sleep_invalid_is_noop() {
        let mut h = harness("");
        for raw in ["sleep", "sleep 0", "sleep abc", "sleep -10"] {
            h.run(raw);
        }
        assert_eq!(h.pacer.now(), Duration::ZERO);
        assert!(h.backend.events().is_empty());
    }

    #[test]
    fn test_press_then_sleep_sequence() {
        let mut h = harness("");
        h.run("tapkey a");
        h.run("sleep 100");
        h.run("tapkey b");
        let times: Vec<u64> = h
            .backend
            .events()
            .iter()
            .map(|e| e.at.as_millis() as u64)
            .collect();
        assert_eq!(times, vec![0, 50, 150, 200]);
    }

    #[test]
    fn test_switch_window_targets() {
        let mut h = harness("skyrim");
        h.run("switchwindow Untitled - Notepad");
        h.run("switchwindow");
        assert_eq!(
            *h.focus.targets.lock().unwrap(),
            vec!["Untitled - Notepad".to_string(), "skyrim".to_string()]
        );
    }

    #[test]
    fn test_switch_window_without_default() {
        let mut h = harness("");
        h.run("switchwindow");
        assert!(h.focus.targets.lock().unwrap().is_empty());
    }
}
