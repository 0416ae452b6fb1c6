//! Synthetic keyboard and mouse input
//!
//! - [`keys`]: key names to scan codes
//! - [`injector`]: scan codes to device events
//! - [`scheduler`]: timed `press`/`tapkey`/`holdkey`/`releasekey`
//! - [`pacer`]: cancellable waits, real or virtual

#[cfg(feature = "inject")]
mod enigo;
pub mod injector;
pub mod keys;
pub mod pacer;
pub mod scheduler;

#[cfg(feature = "inject")]
pub use enigo::EnigoBackend;
pub use injector::{Direction, InputBackend, InputEvent, Injector, LogBackend, RecordingBackend, TimedEvent};
pub use keys::{KeyNameResolver, MouseButton, MouseEventKind, ScanCode, WheelDirection, classify_mouse_event};
pub use pacer::{CancelToken, ClockPacer, Pacer, VirtualPacer, Wait};
pub use scheduler::{PressPlan, PressScheduler, plan_press};
