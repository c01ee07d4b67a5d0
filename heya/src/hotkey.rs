use std::cell::RefCell;
use std::collections::HashMap;

use heya_ipc::{Command, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub vk: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub win: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// `RegisterHotKey` modifier flags.
    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.alt {
            flags |= 0x1;
        }
        if self.ctrl {
            flags |= 0x2;
        }
        if self.shift {
            flags |= 0x4;
        }
        if self.win {
            flags |= 0x8;
        }
        flags
    }
}

pub fn parse_hotkey(key_str: &str) -> Result<Hotkey, String> {
    let parts: Vec<&str> = key_str.split('-').collect();
    let Some((key_part, modifier_parts)) = parts.split_last() else {
        return Err("Empty key string".to_string());
    };

    let mut modifiers = Modifiers::default();
    for part in modifier_parts {
        match part.to_lowercase().as_str() {
            "win" | "super" | "cmd" => modifiers.win = true,
            "ctrl" | "control" => modifiers.ctrl = true,
            "alt" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            _ => return Err(format!("Unknown modifier: {}", part)),
        }
    }

    let vk = parse_key_code(key_part)?;
    Ok(Hotkey { vk, modifiers })
}

pub fn format_hotkey(hotkey: &Hotkey) -> String {
    let mut parts = Vec::new();
    if hotkey.modifiers.win {
        parts.push("win".to_string());
    }
    if hotkey.modifiers.ctrl {
        parts.push("ctrl".to_string());
    }
    if hotkey.modifiers.alt {
        parts.push("alt".to_string());
    }
    if hotkey.modifiers.shift {
        parts.push("shift".to_string());
    }
    parts.push(key_code_to_str(hotkey.vk));
    parts.join("-")
}

const NAMED_KEYS: &[(&str, u16)] = &[
    ("return", 0x0D),
    ("tab", 0x09),
    ("space", 0x20),
    ("backspace", 0x08),
    ("escape", 0x1B),
    ("delete", 0x2E),
    ("insert", 0x2D),
    ("home", 0x24),
    ("end", 0x23),
    ("pageup", 0x21),
    ("pagedown", 0x22),
    ("left", 0x25),
    ("up", 0x26),
    ("right", 0x27),
    ("down", 0x28),
    ("minus", 0xBD),
    ("equal", 0xBB),
    ("leftbracket", 0xDB),
    ("rightbracket", 0xDD),
    ("backslash", 0xDC),
    ("semicolon", 0xBA),
    ("quote", 0xDE),
    ("comma", 0xBC),
    ("period", 0xBE),
    ("slash", 0xBF),
    ("grave", 0xC0),
];

fn parse_key_code(key: &str) -> Result<u16, String> {
    let key = key.to_lowercase();
    let canonical = match key.as_str() {
        "enter" => "return",
        "esc" => "escape",
        "del" => "delete",
        "backtick" => "grave",
        other => other,
    };

    if let Some((_, vk)) = NAMED_KEYS.iter().find(|(name, _)| *name == canonical) {
        return Ok(*vk);
    }

    let mut chars = canonical.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        match c {
            'a'..='z' => return Ok(0x41 + (c as u16 - 'a' as u16)),
            '0'..='9' => return Ok(0x30 + (c as u16 - '0' as u16)),
            _ => {}
        }
    }

    if let Some(n) = canonical
        .strip_prefix('f')
        .and_then(|n| n.parse::<u16>().ok())
    {
        if (1..=24).contains(&n) {
            return Ok(0x70 + n - 1);
        }
    }

    Err(format!("Unknown key: {}", key))
}

fn key_code_to_str(vk: u16) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, code)| *code == vk) {
        return name.to_string();
    }
    match vk {
        0x41..=0x5A => ((b'a' + (vk - 0x41) as u8) as char).to_string(),
        0x30..=0x39 => ((b'0' + (vk - 0x30) as u8) as char).to_string(),
        0x70..=0x87 => format!("f{}", vk - 0x70 + 1),
        _ => "unknown".to_string(),
    }
}

pub fn default_bindings() -> Vec<(&'static str, Command)> {
    vec![
        ("win-ctrl-x", Command::SwitchLast),
        ("win-shift-x", Command::ShiftSwitchLast),
        ("win-ctrl-grave", Command::SwitchPrompt),
        ("win-shift-grave", Command::ShiftSwitchPrompt),
        (
            "win-ctrl-h",
            Command::SwitchAdjacent {
                direction: Direction::Left,
            },
        ),
        (
            "win-shift-h",
            Command::ShiftSwitchAdjacent {
                direction: Direction::Left,
            },
        ),
        (
            "win-ctrl-l",
            Command::SwitchAdjacent {
                direction: Direction::Right,
            },
        ),
        (
            "win-shift-l",
            Command::ShiftSwitchAdjacent {
                direction: Direction::Right,
            },
        ),
    ]
}

/// System-wide hotkey registration, keyed by a caller-chosen id.
pub trait HotkeyRegistrar {
    fn register(&mut self, id: i32, hotkey: &Hotkey) -> Result<(), String>;
    fn unregister(&mut self, id: i32);
}

/// Binding table as seen by command dispatch. Calls may wait on the
/// thread owning the registrations, so they are awaited.
#[allow(async_fn_in_trait)]
pub trait BindingStore {
    async fn bind(&self, key: &str, command: Command) -> Result<(), String>;
    async fn unbind(&self, key: &str) -> Result<(), String>;
    async fn list_bindings(&self) -> Result<Vec<(String, Command)>, String>;
}

struct Binding {
    id: i32,
    command: Command,
}

pub struct HotkeyManager<R: HotkeyRegistrar> {
    registrar: R,
    bindings: HashMap<Hotkey, Binding>,
    next_id: i32,
}

impl<R: HotkeyRegistrar> HotkeyManager<R> {
    pub fn new(registrar: R) -> Self {
        Self {
            registrar,
            bindings: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn bind(&mut self, key_str: &str, command: Command) -> Result<(), String> {
        let hotkey = parse_hotkey(key_str)?;

        if let Some(binding) = self.bindings.get_mut(&hotkey) {
            tracing::info!("Rebinding {} to {:?}", key_str, command);
            binding.command = command;
            return Ok(());
        }

        let id = self.next_id;
        self.registrar.register(id, &hotkey)?;
        self.next_id += 1;
        tracing::info!("Binding {} to {:?}", key_str, command);
        self.bindings.insert(hotkey, Binding { id, command });
        Ok(())
    }

    pub fn unbind(&mut self, key_str: &str) -> Result<(), String> {
        let hotkey = parse_hotkey(key_str)?;
        if let Some(binding) = self.bindings.remove(&hotkey) {
            self.registrar.unregister(binding.id);
            tracing::info!("Unbound {}", key_str);
        }
        Ok(())
    }

    pub fn unbind_all(&mut self) {
        for (_, binding) in self.bindings.drain() {
            self.registrar.unregister(binding.id);
        }
    }

    pub fn list_bindings(&self) -> Vec<(String, Command)> {
        let mut list: Vec<_> = self
            .bindings
            .iter()
            .map(|(hotkey, binding)| (format_hotkey(hotkey), binding.command.clone()))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    /// Command bound to a fired registration id.
    pub fn command_for(&self, id: i32) -> Option<Command> {
        self.bindings
            .values()
            .find(|binding| binding.id == id)
            .map(|binding| binding.command.clone())
    }

    pub fn bind_defaults(&mut self) {
        for (key, command) in default_bindings() {
            if let Err(e) = self.bind(key, command) {
                tracing::warn!("Failed to bind default hotkey {}: {}", key, e);
            }
        }
    }
}

impl<R: HotkeyRegistrar> BindingStore for RefCell<HotkeyManager<R>> {
    async fn bind(&self, key: &str, command: Command) -> Result<(), String> {
        self.borrow_mut().bind(key, command)
    }

    async fn unbind(&self, key: &str) -> Result<(), String> {
        self.borrow_mut().unbind(key)
    }

    async fn list_bindings(&self) -> Result<Vec<(String, Command)>, String> {
        Ok(self.borrow().list_bindings())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Registrar that records registrations and can refuse keys.
    #[derive(Default)]
    pub struct MockRegistrar {
        pub registered: Vec<(i32, Hotkey)>,
        pub refused: Vec<Hotkey>,
    }

    impl MockRegistrar {
        pub fn refusing(key_str: &str) -> Self {
            Self {
                refused: vec![parse_hotkey(key_str).unwrap()],
                ..Default::default()
            }
        }
    }

    impl HotkeyRegistrar for MockRegistrar {
        fn register(&mut self, id: i32, hotkey: &Hotkey) -> Result<(), String> {
            if self.refused.contains(hotkey) {
                return Err(format!("{} is already registered", format_hotkey(hotkey)));
            }
            self.registered.push((id, *hotkey));
            Ok(())
        }

        fn unregister(&mut self, id: i32) {
            self.registered.retain(|(registered, _)| *registered != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRegistrar;
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let hotkey = parse_hotkey("a").unwrap();
        assert_eq!(hotkey.vk, 0x41);
        assert_eq!(hotkey.modifiers, Modifiers::default());
    }

    #[test]
    fn test_parse_multiple_modifiers() {
        let hotkey = parse_hotkey("win-ctrl-x").unwrap();
        assert_eq!(hotkey.vk, 0x58);
        assert!(hotkey.modifiers.win);
        assert!(hotkey.modifiers.ctrl);
        assert!(!hotkey.modifiers.alt);
        assert!(!hotkey.modifiers.shift);
    }

    #[test]
    fn test_parse_modifier_aliases() {
        assert!(parse_hotkey("super-a").unwrap().modifiers.win);
        assert!(parse_hotkey("cmd-a").unwrap().modifiers.win);
        assert!(parse_hotkey("control-a").unwrap().modifiers.ctrl);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let hotkey = parse_hotkey("Win-Shift-Grave").unwrap();
        assert!(hotkey.modifiers.win);
        assert!(hotkey.modifiers.shift);
        assert_eq!(hotkey.vk, 0xC0);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_hotkey("return").unwrap().vk, 0x0D);
        assert_eq!(parse_hotkey("enter").unwrap().vk, 0x0D);
        assert_eq!(parse_hotkey("esc").unwrap().vk, 0x1B);
        assert_eq!(parse_hotkey("backtick").unwrap().vk, 0xC0);
        assert_eq!(parse_hotkey("5").unwrap().vk, 0x35);
        assert_eq!(parse_hotkey("left").unwrap().vk, 0x25);
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(parse_hotkey("f1").unwrap().vk, 0x70);
        assert_eq!(parse_hotkey("f12").unwrap().vk, 0x7B);
        assert_eq!(parse_hotkey("f24").unwrap().vk, 0x87);
        assert!(parse_hotkey("f25").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_hotkey("win-unknown").is_err());
        assert!(parse_hotkey("meta-a").is_err());
        assert!(parse_hotkey("").is_err());
    }

    #[test]
    fn test_format_hotkey_canonical_order() {
        let hotkey = parse_hotkey("shift-alt-ctrl-win-space").unwrap();
        assert_eq!(format_hotkey(&hotkey), "win-ctrl-alt-shift-space");
    }

    #[test]
    fn test_parse_format_roundtrip() {
        for input in ["a", "win-ctrl-x", "win-shift-grave", "alt-f4", "ctrl-9"] {
            let hotkey = parse_hotkey(input).unwrap();
            assert_eq!(format_hotkey(&hotkey), input);
        }
    }

    #[test]
    fn test_modifier_flags() {
        let hotkey = parse_hotkey("win-ctrl-x").unwrap();
        assert_eq!(hotkey.modifiers.flags(), 0x8 | 0x2);
    }

    #[test]
    fn test_bind_registers_and_resolves_id() {
        let mut manager = HotkeyManager::new(MockRegistrar::default());
        manager.bind("win-ctrl-x", Command::SwitchLast).unwrap();

        let (id, _) = manager.registrar.registered[0];
        assert_eq!(manager.command_for(id), Some(Command::SwitchLast));
        assert_eq!(manager.command_for(id + 1), None);
    }

    #[test]
    fn test_rebind_keeps_registration() {
        let mut manager = HotkeyManager::new(MockRegistrar::default());
        manager.bind("win-ctrl-x", Command::SwitchLast).unwrap();
        manager
            .bind(
                "win-ctrl-x",
                Command::Switch {
                    name: "mail".to_string(),
                },
            )
            .unwrap();

        assert_eq!(manager.registrar.registered.len(), 1);
        assert_eq!(
            manager.list_bindings(),
            vec![(
                "win-ctrl-x".to_string(),
                Command::Switch {
                    name: "mail".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_refused_registration_is_not_bound() {
        let mut manager = HotkeyManager::new(MockRegistrar::refusing("win-ctrl-h"));
        assert!(manager.bind("win-ctrl-h", Command::SwitchLast).is_err());
        assert!(manager.list_bindings().is_empty());
    }

    #[test]
    fn test_unbind_unregisters() {
        let mut manager = HotkeyManager::new(MockRegistrar::default());
        manager.bind("win-ctrl-x", Command::SwitchLast).unwrap();
        manager.unbind("win-ctrl-x").unwrap();

        assert!(manager.registrar.registered.is_empty());
        assert!(manager.list_bindings().is_empty());
        manager.unbind("win-ctrl-x").unwrap();
    }

    #[test]
    fn test_bind_defaults_skips_refused_keys() {
        let mut manager = HotkeyManager::new(MockRegistrar::refusing("win-ctrl-grave"));
        manager.bind_defaults();

        let bound: Vec<String> = manager.list_bindings().into_iter().map(|(k, _)| k).collect();
        assert_eq!(bound.len(), default_bindings().len() - 1);
        assert!(!bound.contains(&"win-ctrl-grave".to_string()));
        assert!(bound.contains(&"win-shift-grave".to_string()));
    }

    #[test]
    fn test_unbind_all() {
        let mut manager = HotkeyManager::new(MockRegistrar::default());
        manager.bind_defaults();
        manager.unbind_all();
        assert!(manager.registrar.registered.is_empty());
        assert!(manager.list_bindings().is_empty());
    }
}
