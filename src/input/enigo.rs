//! OS input backend using enigo
//!
//! Keyboard events go through enigo's raw key path, so the DirectInput scan
//! code is translated to the platform's native key code first:
//! - **Windows**: scan codes are native; extended keys get the `0xE0` prefix
//! - **Linux (X11)**: set-1 scan code to evdev code, plus the X offset of 8
//! - elsewhere: no translation, events are rejected as unmapped

use super::injector::{Direction, InputBackend};
use super::keys::{MouseButton, MouseEventKind, ScanCode, WheelDirection};
use crate::error::InjectError;
use enigo::{Axis, Button, Enigo, Keyboard, Mouse, Settings};
use tracing::debug;

/// Injects events through the platform input facility
pub struct EnigoBackend {
    enigo: Enigo,
}

impl EnigoBackend {
    pub fn new() -> Result<Self, InjectError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InjectError::Unavailable(format!("Failed to initialize Enigo: {}", e)))?;
        Ok(Self { enigo })
    }
}

fn enigo_direction(direction: Direction) -> enigo::Direction {
    match direction {
        Direction::Down => enigo::Direction::Press,
        Direction::Up => enigo::Direction::Release,
    }
}

impl InputBackend for EnigoBackend {
    fn key(&mut self, code: ScanCode, direction: Direction) -> Result<(), InjectError> {
        let native = platform_keycode(code).ok_or(InjectError::Unmapped(code.0))?;
        debug!(code = code.0, native, ?direction, "raw key");
        self.enigo
            .raw(native, enigo_direction(direction))
            .map_err(|e| InjectError::Rejected(format!("Failed to send key: {}", e)))
    }

    fn mouse(&mut self, kind: MouseEventKind) -> Result<(), InjectError> {
        match kind {
            MouseEventKind::ButtonDown(button) => self.button(button, enigo::Direction::Press),
            MouseEventKind::ButtonUp(button) => self.button(button, enigo::Direction::Release),
            MouseEventKind::Wheel(direction) => {
                let notches = match direction {
                    WheelDirection::Up => -1,
                    WheelDirection::Down => 1,
                };
                self.enigo
                    .scroll(notches, Axis::Vertical)
                    .map_err(|e| InjectError::Rejected(format!("Failed to scroll: {}", e)))
            }
        }
    }
}

impl EnigoBackend {
    fn button(&mut self, button: MouseButton, direction: enigo::Direction) -> Result<(), InjectError> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
            MouseButton::Extra(1) => Button::Back,
            MouseButton::Extra(2) => Button::Forward,
            MouseButton::Extra(i) => {
                return Err(InjectError::Rejected(format!("no extra mouse button {}", i)));
            }
        };
        self.enigo
            .button(button, direction)
            .map_err(|e| InjectError::Rejected(format!("Failed to send button: {}", e)))
    }
}

/// Native key code for a keyboard scan code, if this platform has one
#[cfg(target_os = "windows")]
pub fn platform_keycode(code: ScanCode) -> Option<u16> {
    match code.0 {
        c @ 1..0x80 => Some(c as u16),
        c @ 0x80..0x100 => Some(0xE000 | (c & 0x7F) as u16),
        _ => None,
    }
}

/// Native key code for a keyboard scan code, if this platform has one
#[cfg(target_os = "linux")]
pub fn platform_keycode(code: ScanCode) -> Option<u16> {
    const X_OFFSET: u16 = 8;
    let evdev = match code.0 {
        c @ 1..0x80 => c as u16,
        0x9C => 96,  // numenter
        0x9D => 97,  // rctrl
        0xB5 => 98,  // num/
        0xB7 => 99,  // sysrq
        0xB8 => 100, // ralt
        0xC5 => 119, // pause
        0xC7 => 102, // home
        0xC8 => 103, // up
        0xC9 => 104, // pgup
        0xCB => 105, // left
        0xCD => 106, // right
        0xCF => 107, // end
        0xD0 => 108, // down
        0xD1 => 109, // pgdn
        0xD2 => 110, // insert
        0xD3 => 111, // delete
        0xDB => 125, // lwin
        0xDC => 126, // rwin
        0xDD => 127, // apps
        _ => return None,
    };
    Some(evdev + X_OFFSET)
}

/// Native key code for a keyboard scan code, if this platform has one
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn platform_keycode(_code: ScanCode) -> Option<u16> {
    None
}
