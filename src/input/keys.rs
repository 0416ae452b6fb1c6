//! Key name resolution
//!
//! Maps human-readable key tokens to a flat DirectInput-style scan code space:
//!
//! - `1..=255`: keyboard scan codes (extended keys carry the `0x80` bit)
//! - `256..=265`: mouse buttons and wheel notches
//! - `266..`: gamepad buttons and triggers
//!
//! Anything that does not resolve becomes [`ScanCode::NONE`], which every
//! consumer treats as "skip this key".

use std::collections::HashMap;
use std::fmt;

/// Device-level key identifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScanCode(pub u32);

impl ScanCode {
    /// Sentinel for "no key"
    pub const NONE: ScanCode = ScanCode(0);

    pub const MOUSE_FIRST: u32 = 256;
    pub const MOUSE_EXTRA_FIRST: u32 = 259;
    pub const MOUSE_WHEEL_UP: u32 = 264;
    pub const MOUSE_WHEEL_DOWN: u32 = 265;
    pub const GAMEPAD_FIRST: u32 = 266;

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn class(self) -> KeyClass {
        match self.0 {
            0 => KeyClass::None,
            1..ScanCode::MOUSE_FIRST => KeyClass::Keyboard,
            ScanCode::MOUSE_FIRST..ScanCode::GAMEPAD_FIRST => KeyClass::Mouse,
            _ => KeyClass::Gamepad,
        }
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which device a scan code belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyClass {
    None,
    Keyboard,
    Mouse,
    Gamepad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Extra button, indexed from the start of the extra-button range
    Extra(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Native mouse action represented by a mouse-class scan code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// One wheel notch. Emitted for both the press and the release transition.
    Wheel(WheelDirection),
}

/// Classify a scan code as a mouse action, or `None` for real keys
pub fn classify_mouse_event(code: ScanCode, is_release: bool) -> Option<MouseEventKind> {
    let button = match code.0 {
        256 => MouseButton::Left,
        257 => MouseButton::Right,
        258 => MouseButton::Middle,
        c @ ScanCode::MOUSE_EXTRA_FIRST..ScanCode::MOUSE_WHEEL_UP => {
            MouseButton::Extra((c - ScanCode::MOUSE_EXTRA_FIRST) as u8)
        }
        ScanCode::MOUSE_WHEEL_UP => return Some(MouseEventKind::Wheel(WheelDirection::Up)),
        ScanCode::MOUSE_WHEEL_DOWN => return Some(MouseEventKind::Wheel(WheelDirection::Down)),
        _ => return None,
    };

    Some(if is_release {
        MouseEventKind::ButtonUp(button)
    } else {
        MouseEventKind::ButtonDown(button)
    })
}

// https://www.creationkit.com/index.php?title=Input_Script#DXScanCodes
const KEY_TABLE: &[(&str, u32)] = &[
    // keyboard
    ("escape", 1), ("esc", 1),
    ("1", 2), ("2", 3), ("3", 4), ("4", 5), ("5", 6),
    ("6", 7), ("7", 8), ("8", 9), ("9", 10), ("0", 11),
    ("-", 12), ("minus", 12),
    ("=", 13), ("equal", 13), ("equals", 13),
    ("backspace", 14),
    ("tab", 15), ("table", 15),
    ("q", 16), ("w", 17), ("e", 18), ("r", 19), ("t", 20),
    ("y", 21), ("u", 22), ("i", 23), ("o", 24), ("p", 25),
    ("[", 26), ("leftbracket", 26), ("lbracket", 26),
    ("]", 27), ("rightbracket", 27), ("rbracket", 27),
    ("enter", 28), ("return", 28),
    ("leftcontrol", 29), ("leftctrl", 29), ("lctrl", 29), ("ctrl", 29), ("control", 29),
    ("a", 30), ("s", 31), ("d", 32), ("f", 33), ("g", 34),
    ("h", 35), ("j", 36), ("k", 37), ("l", 38),
    (";", 39), ("semicolon", 39), ("semi", 39),
    ("'", 40), ("apostrophe", 40), ("apos", 40),
    ("`", 41), ("~", 41), ("backquote", 41), ("console", 41),
    ("leftshift", 42), ("lshift", 42), ("shift", 42),
    ("\\", 43), ("backslash", 43),
    ("z", 44), ("x", 45), ("c", 46), ("v", 47), ("b", 48), ("n", 49), ("m", 50),
    (",", 51), ("comma", 51),
    (".", 52), ("period", 52), ("point", 52),
    ("/", 53), ("forwardslash", 53), ("slash", 53),
    ("rightshift", 54), ("rshift", 54),
    ("num*", 55), ("n*", 55), ("numstar", 55),
    ("leftalt", 56), ("leftalter", 56), ("lalt", 56), ("alt", 56),
    ("spacebar", 57), ("space", 57), ("blank", 57),
    ("capslock", 58), ("caps", 58),
    ("f1", 59), ("f2", 60), ("f3", 61), ("f4", 62), ("f5", 63),
    ("f6", 64), ("f7", 65), ("f8", 66), ("f9", 67), ("f10", 68),
    ("numlock", 69), ("nlock", 69),
    ("scrolllock", 70), ("slock", 70),
    ("num7", 71), ("n7", 71),
    ("num8", 72), ("n8", 72),
    ("num9", 73), ("n9", 73),
    ("num-", 74), ("n-", 74), ("numminus", 74),
    ("num4", 75), ("n4", 75),
    ("num5", 76), ("n5", 76),
    ("num6", 77), ("n6", 77),
    ("num+", 78), ("n+", 78), ("numplus", 78),
    ("num1", 79), ("n1", 79),
    ("num2", 80), ("n2", 80),
    ("num3", 81), ("n3", 81),
    ("num0", 82), ("n0", 82),
    ("num.", 83), ("n.", 83), ("numperiod", 83), ("numpoint", 83),
    ("f11", 87),
    ("f12", 88),
    ("numenter", 156), ("nenter", 156),
    ("rightcontrol", 157), ("rightctrl", 157), ("rctrl", 157),
    ("num/", 181), ("n/", 181), ("numslash", 181),
    ("sysrq", 183), ("sys", 183), ("ptrscr", 183), ("printscreen", 183),
    ("rightalt", 184), ("rightalter", 184), ("ralt", 184),
    ("pause", 197), ("break", 197), ("pausebreak", 197),
    ("home", 199),
    ("uparrow", 200), ("up", 200),
    ("pageup", 201), ("pgup", 201),
    ("leftarrow", 203), ("left", 203),
    ("rightarrow", 205), ("right", 205),
    ("end", 207),
    ("downarrow", 208), ("down", 208),
    ("pagedown", 209), ("pgdown", 209), ("pgdn", 209),
    ("insert", 210), ("ins", 210),
    ("delete", 211), ("del", 211),
    ("leftwin", 219), ("lwin", 219), ("win", 219),
    ("rightwin", 220), ("rwin", 220),
    ("apps", 221), ("menu", 221),
    // mouse
    ("leftmousebutton", 256), ("leftclick", 256), ("lclick", 256),
    ("rightmousebutton", 257), ("rightclick", 257), ("rclick", 257),
    ("middlemousebutton", 258), ("wheelmousebutton", 258), ("middleclick", 258), ("mclick", 258),
    ("mousebutton3", 259), ("button3", 259), ("mbtn3", 259),
    ("mousebutton4", 260), ("button4", 260), ("mbtn4", 260),
    ("mousebutton5", 261), ("button5", 261), ("mbtn5", 261),
    ("mousebutton6", 262), ("button6", 262), ("mbtn6", 262),
    ("mousebutton7", 263), ("button7", 263), ("mbtn7", 263),
    ("mousewheelup", 264), ("wheelup", 264),
    ("mousewheeldown", 265), ("wheeldown", 265),
    // gamepad
    ("dpadup", 266), ("padup", 266),
    ("dpaddown", 267), ("paddown", 267),
    ("dpadleft", 268), ("padleft", 268),
    ("dpadright", 269), ("padright", 269),
    ("start", 270), ("padstart", 270),
    ("back", 271), ("padback", 271),
    ("leftthumb", 272), ("lthumb", 272),
    ("rightthumb", 273), ("rthumb", 273),
    ("leftshoulder", 274), ("lshoulder", 274),
    ("rightshoulder", 275), ("rshoulder", 275),
    ("dpada", 276), ("pada", 276),
    ("dpadb", 277), ("padb", 277),
    ("dpadx", 278), ("padx", 278),
    ("dpady", 279), ("pady", 279),
    ("lt", 280), ("lefttrigger", 280),
    ("rt", 281), ("righttrigger", 281),
];

/// Resolves key tokens to scan codes
///
/// Built once by the composition root and shared read-only.
#[derive(Debug, Clone)]
pub struct KeyNameResolver {
    names: HashMap<&'static str, ScanCode>,
}

impl Default for KeyNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyNameResolver {
    pub fn new() -> Self {
        let names = KEY_TABLE
            .iter()
            .map(|&(name, code)| (name, ScanCode(code)))
            .collect();
        Self { names }
    }

    /// Resolve a token: table name, then `0x` hex, then decimal
    ///
    /// Never fails; unknown tokens resolve to [`ScanCode::NONE`].
    pub fn resolve(&self, token: &str) -> ScanCode {
        let key = token.to_lowercase();

        if let Some(&code) = self.names.get(key.as_str()) {
            return code;
        }

        if let Some(hex) = key.strip_prefix("0x") {
            if hex.starts_with('+') {
                return ScanCode::NONE;
            }
            return u32::from_str_radix(hex, 16)
                .map(ScanCode)
                .unwrap_or(ScanCode::NONE);
        }

        if key.starts_with(|c: char| c.is_ascii_digit()) {
            return key.parse().map(ScanCode).unwrap_or(ScanCode::NONE);
        }

        ScanCode::NONE
    }

    /// All `(name, code)` pairs in table order
    pub fn key_names(&self) -> impl Iterator<Item = (&'static str, ScanCode)> {
        KEY_TABLE.iter().map(|&(name, code)| (name, ScanCode(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_names_case_insensitive() {
        let keys = KeyNameResolver::new();
        assert_eq!(keys.resolve("a"), ScanCode(30));
        assert_eq!(keys.resolve("A"), ScanCode(30));
        assert_eq!(keys.resolve("Ctrl"), ScanCode(29));
        assert_eq!(keys.resolve("CONTROL"), ScanCode(29));
        assert_eq!(keys.resolve("lctrl"), ScanCode(29));
        assert_eq!(keys.resolve("WheelUp"), ScanCode(264));
        assert_eq!(keys.resolve("rt"), ScanCode(281));
    }

    #[test]
    fn test_resolve_numeric_forms() {
        let keys = KeyNameResolver::new();
        // Single digits are key names, not raw codes
        assert_eq!(keys.resolve("1"), ScanCode(2));
        assert_eq!(keys.resolve("30"), ScanCode(30));
        assert_eq!(keys.resolve("0x1E"), ScanCode(30));
        assert_eq!(keys.resolve("0X1e"), ScanCode(30));
        assert_eq!(keys.resolve("127"), ScanCode(127));
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let keys = KeyNameResolver::new();
        for token in ["", "nosuchkey", "0x", "0xzz", "12abc", "-5", "+30", "0x+1e", "é"] {
            assert_eq!(keys.resolve(token), ScanCode::NONE, "token {:?}", token);
        }
    }

    #[test]
    fn test_resolve_table_is_consistent() {
        let keys = KeyNameResolver::new();
        for (name, code) in keys.key_names() {
            assert_eq!(keys.resolve(name), code, "name {}", name);
            assert_eq!(keys.resolve(&name.to_uppercase()), code, "name {}", name);
            // Multi-digit codes are never table names, so their string form
            // resolves straight back to the same code
            if code.0 >= 10 {
                assert_eq!(keys.resolve(&code.to_string()), code, "code {}", code);
            }
        }
    }

    #[test]
    fn test_scan_code_class() {
        assert_eq!(ScanCode::NONE.class(), KeyClass::None);
        assert_eq!(ScanCode(30).class(), KeyClass::Keyboard);
        assert_eq!(ScanCode(211).class(), KeyClass::Keyboard);
        assert_eq!(ScanCode(256).class(), KeyClass::Mouse);
        assert_eq!(ScanCode(265).class(), KeyClass::Mouse);
        assert_eq!(ScanCode(266).class(), KeyClass::Gamepad);
    }

    #[test]
    fn test_classify_mouse_event() {
        assert_eq!(classify_mouse_event(ScanCode(30), false), None);
        assert_eq!(classify_mouse_event(ScanCode(270), false), None);
        assert_eq!(
            classify_mouse_event(ScanCode(256), false),
            Some(MouseEventKind::ButtonDown(MouseButton::Left))
        );
        assert_eq!(
            classify_mouse_event(ScanCode(257), true),
            Some(MouseEventKind::ButtonUp(MouseButton::Right))
        );
        assert_eq!(
            classify_mouse_event(ScanCode(260), false),
            Some(MouseEventKind::ButtonDown(MouseButton::Extra(1)))
        );
        assert_eq!(
            classify_mouse_event(ScanCode(263), true),
            Some(MouseEventKind::ButtonUp(MouseButton::Extra(4)))
        );
        for release in [false, true] {
            assert_eq!(
                classify_mouse_event(ScanCode(264), release),
                Some(MouseEventKind::Wheel(WheelDirection::Up))
            );
            assert_eq!(
                classify_mouse_event(ScanCode(265), release),
                Some(MouseEventKind::Wheel(WheelDirection::Down))
            );
        }
    }
}
