//! Line protocol between the host and the speech worker
//!
//! Every message is one `|`-separated line.
//!
//! Host to worker:
//! - `START_DIALOGUE|<id>|<line>|<line>...`
//! - `STOP_DIALOGUE`
//! - `FAVORITES|<name>,<formId>,<itemId>,<isHanded>,<itemType>|...`
//!
//! Worker to host:
//! - `DIALOGUE|<id>|<index>`
//! - `COMMAND|<cmd>;<cmd>;...`
//! - `EQUIP|<formId>;<itemId>;<itemType>;<hand>`

use std::fmt;
use tracing::warn;

/// Dialogue index a worker sends for a spoken farewell
pub const GOODBYE_INDEX: i64 = -2;

/// Message from the speech worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Dialogue { id: u64, index: i64 },
    /// Sub-commands of the first field, trimmed, empty ones removed
    Command(Vec<String>),
    Equip(EquipDescriptor),
}

impl Inbound {
    /// Parse one line; unknown tags and malformed fields yield `None`
    pub fn parse(line: &str) -> Option<Inbound> {
        let (tag, rest) = line.split_once('|').unwrap_or((line, ""));

        match tag {
            "DIALOGUE" => {
                let mut fields = rest.split('|');
                let id = fields.next()?.trim();
                let index = fields.next()?.trim();
                match (id.parse(), index.parse()) {
                    (Ok(id), Ok(index)) => Some(Inbound::Dialogue { id, index }),
                    _ => {
                        warn!(line, "malformed DIALOGUE line");
                        None
                    }
                }
            }
            "COMMAND" => {
                let payload = rest.split('|').next().unwrap_or("");
                let commands = payload
                    .split(';')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect();
                Some(Inbound::Command(commands))
            }
            "EQUIP" => Some(Inbound::Equip(EquipDescriptor::parse(rest))),
            _ => None,
        }
    }
}

/// What the worker picked in a dialogue menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueSelection {
    Topic(usize),
    Goodbye,
}

impl DialogueSelection {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            GOODBYE_INDEX => Some(DialogueSelection::Goodbye),
            i if i >= 0 => usize::try_from(i).ok().map(DialogueSelection::Topic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Item,
    Spell,
    Shout,
    Unknown(u8),
}

impl ItemKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ItemKind::Item,
            2 => ItemKind::Spell,
            3 => ItemKind::Shout,
            other => ItemKind::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ItemKind::Item => 1,
            ItemKind::Spell => 2,
            ItemKind::Shout => 3,
            ItemKind::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Either,
    Right,
    Left,
}

/// Parsed `EQUIP` payload
///
/// Lenient: a missing or non-numeric field reads as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipDescriptor {
    pub raw: String,
    pub form_id: u32,
    pub item_id: i32,
    pub kind: ItemKind,
    pub hand: Hand,
}

impl EquipDescriptor {
    pub fn parse(raw: &str) -> Self {
        let mut fields = raw.split(';').map(str::trim);
        let mut next = || fields.next().unwrap_or("");

        let form_id = next().parse().unwrap_or(0);
        let item_id = next().parse().unwrap_or(0);
        let kind = ItemKind::from_code(next().parse().unwrap_or(0));
        let hand = match next().parse::<i32>().unwrap_or(0) {
            1 => Hand::Right,
            2 => Hand::Left,
            _ => Hand::Either,
        };

        Self {
            raw: raw.to_string(),
            form_id,
            item_id,
            kind,
            hand,
        }
    }

    /// Console commands that perform this equip, for spells and shouts
    ///
    /// Items need the host's inventory API and produce nothing here. A spell
    /// with no hand goes to both hands.
    pub fn console_commands(&self) -> Vec<String> {
        let form = format!("{:x}", self.form_id);
        match (self.kind, self.hand) {
            (ItemKind::Spell, Hand::Either) => vec![
                format!("player.equipspell {} left", form),
                format!("player.equipspell {} right", form),
            ],
            (ItemKind::Spell, Hand::Right) => vec![format!("player.equipspell {} right", form)],
            (ItemKind::Spell, Hand::Left) => vec![format!("player.equipspell {} left", form)],
            (ItemKind::Shout, _) => vec![format!("player.equipshout {}", form)],
            _ => Vec::new(),
        }
    }
}

/// One entry of the favorites list sent to the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub name: String,
    pub form_id: u32,
    pub item_id: i32,
    /// The worker should expect "left"/"right" in equip phrases
    pub is_handed: bool,
    pub kind: ItemKind,
}

impl FavoriteEntry {
    /// Parse `name,formId,itemId,isHanded,itemType`
    ///
    /// The name may itself contain commas; the numeric fields are taken from
    /// the right.
    pub fn parse(text: &str) -> Option<Self> {
        let mut fields = text.rsplitn(5, ',').map(str::trim);
        let kind = fields.next()?.parse().ok()?;
        let is_handed = fields.next()?.parse::<u8>().ok()?;
        let item_id = fields.next()?.parse().ok()?;
        let form_id = fields.next()?.parse().ok()?;
        let name = fields.next()?;
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            form_id,
            item_id,
            is_handed: is_handed != 0,
            kind: ItemKind::from_code(kind),
        })
    }
}

/// Message to the speech worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    StartDialogue { id: u64, lines: Vec<String> },
    StopDialogue,
    Favorites(Vec<FavoriteEntry>),
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outbound::StartDialogue { id, lines } => {
                write!(f, "START_DIALOGUE|{}", id)?;
                for line in lines {
                    write!(f, "|{}", line)?;
                }
                Ok(())
            }
            Outbound::StopDialogue => write!(f, "STOP_DIALOGUE"),
            Outbound::Favorites(entries) => {
                write!(f, "FAVORITES")?;
                for e in entries {
                    write!(
                        f,
                        "|{},{},{},{},{}",
                        e.name,
                        e.form_id,
                        e.item_id,
                        u8::from(e.is_handed),
                        e.kind.code()
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialogue() {
        assert_eq!(
            Inbound::parse("DIALOGUE|3|1"),
            Some(Inbound::Dialogue { id: 3, index: 1 })
        );
        assert_eq!(
            Inbound::parse("DIALOGUE|3|-2"),
            Some(Inbound::Dialogue { id: 3, index: -2 })
        );
        for line in ["DIALOGUE|x|1", "DIALOGUE|3", "DIALOGUE|3|", "DIALOGUE"] {
            assert_eq!(Inbound::parse(line), None, "line {:?}", line);
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            Inbound::parse("COMMAND|press a 100; tgm ;;"),
            Some(Inbound::Command(vec!["press a 100".into(), "tgm".into()]))
        );
        assert_eq!(Inbound::parse("COMMAND|"), Some(Inbound::Command(vec![])));
        assert_eq!(Inbound::parse("COMMAND"), Some(Inbound::Command(vec![])));
    }

    #[test]
    fn test_parse_command_reads_first_field() {
        assert_eq!(
            Inbound::parse("COMMAND|tapkey a;tgm|tapkey b"),
            Some(Inbound::Command(vec!["tapkey a".into(), "tgm".into()]))
        );
        assert_eq!(Inbound::parse("COMMAND||tgm"), Some(Inbound::Command(vec![])));
    }

    #[test]
    fn test_parse_favorite_entry() {
        assert_eq!(
            FavoriteEntry::parse("Iron Sword,77618,-12,1,1"),
            Some(FavoriteEntry {
                name: "Iron Sword".into(),
                form_id: 77618,
                item_id: -12,
                is_handed: true,
                kind: ItemKind::Item,
            })
        );
        let named = FavoriteEntry::parse("Sword, Iron,1,0,0,2").unwrap();
        assert_eq!(named.name, "Sword, Iron");
        assert_eq!(named.kind, ItemKind::Spell);
        assert!(!named.is_handed);

        for text in ["", "Sword", "Sword,1,2,3", ",1,0,0,1", "Sword,x,0,0,1"] {
            assert_eq!(FavoriteEntry::parse(text), None, "text {:?}", text);
        }
    }

    #[test]
    fn test_parse_unknown() {
        for line in ["", "HELLO|1", "command|tgm", "|COMMAND|tgm"] {
            assert_eq!(Inbound::parse(line), None, "line {:?}", line);
        }
    }

    #[test]
    fn test_parse_equip() {
        let Some(Inbound::Equip(item)) = Inbound::parse("EQUIP|79630;0;2;1") else {
            panic!("expected equip");
        };
        assert_eq!(item.raw, "79630;0;2;1");
        assert_eq!(item.form_id, 79630);
        assert_eq!(item.kind, ItemKind::Spell);
        assert_eq!(item.hand, Hand::Right);
    }

    #[test]
    fn test_equip_lenient() {
        let item = EquipDescriptor::parse("12;x");
        assert_eq!(item.form_id, 12);
        assert_eq!(item.item_id, 0);
        assert_eq!(item.kind, ItemKind::Unknown(0));
        assert_eq!(item.hand, Hand::Either);
    }

    #[test]
    fn test_equip_console_commands() {
        let spell = EquipDescriptor::parse("255;0;2;0");
        assert_eq!(
            spell.console_commands(),
            vec!["player.equipspell ff left", "player.equipspell ff right"]
        );
        let left = EquipDescriptor::parse("255;0;2;2");
        assert_eq!(left.console_commands(), vec!["player.equipspell ff left"]);
        let shout = EquipDescriptor::parse("4096;0;3;0");
        assert_eq!(shout.console_commands(), vec!["player.equipshout 1000"]);
        let item = EquipDescriptor::parse("255;7;1;1");
        assert!(item.console_commands().is_empty());
    }

    #[test]
    fn test_dialogue_selection() {
        assert_eq!(DialogueSelection::from_index(0), Some(DialogueSelection::Topic(0)));
        assert_eq!(DialogueSelection::from_index(4), Some(DialogueSelection::Topic(4)));
        assert_eq!(DialogueSelection::from_index(-2), Some(DialogueSelection::Goodbye));
        assert_eq!(DialogueSelection::from_index(-1), None);
    }

    #[test]
    fn test_outbound_format() {
        let start = Outbound::StartDialogue {
            id: 7,
            lines: vec!["What's new?".into(), "Goodbye.".into()],
        };
        assert_eq!(start.to_string(), "START_DIALOGUE|7|What's new?|Goodbye.");
        assert_eq!(Outbound::StopDialogue.to_string(), "STOP_DIALOGUE");

        let favorites = Outbound::Favorites(vec![
            FavoriteEntry {
                name: "Iron Sword".into(),
                form_id: 77618,
                item_id: -12,
                is_handed: true,
                kind: ItemKind::Item,
            },
            FavoriteEntry {
                name: "Unrelenting Force".into(),
                form_id: 77619,
                item_id: 0,
                is_handed: false,
                kind: ItemKind::Shout,
            },
        ]);
        assert_eq!(
            favorites.to_string(),
            "FAVORITES|Iron Sword,77618,-12,1,1|Unrelenting Force,77619,0,0,3"
        );
        assert_eq!(Outbound::Favorites(vec![]).to_string(), "FAVORITES");
    }
}
