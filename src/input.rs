use crate::menu::Menu;
use std::collections::HashMap;
use std::process;
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Everything a key press can ask the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMenu,
    SelectMenu(Menu),
    Quit,
    ApplySettings,
    OpenSettingsFile,
    OpenDefaultsFile,
    MarkStart,
    MarkEnd,
}

/// Static key-to-command table, built once at startup. Dispatch is
/// edge-triggered: only the initial press of a key produces a command,
/// releases and OS key repeat are ignored.
pub struct KeyBindings {
    map: HashMap<KeyCode, Command>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let map = HashMap::from([
            (KeyCode::KeyH, Command::ToggleMenu),
            (KeyCode::KeyB, Command::SelectMenu(Menu::Main)),
            (KeyCode::KeyD, Command::SelectMenu(Menu::Details)),
            (KeyCode::KeyS, Command::SelectMenu(Menu::Settings)),
            (KeyCode::KeyG, Command::SelectMenu(Menu::Credits)),
            (KeyCode::KeyC, Command::SelectMenu(Menu::Controls)),
            (KeyCode::Backspace, Command::Quit),
            (KeyCode::Delete, Command::Quit),
            (KeyCode::Enter, Command::ApplySettings),
            (KeyCode::KeyO, Command::OpenSettingsFile),
            (KeyCode::KeyP, Command::OpenDefaultsFile),
            (KeyCode::Digit1, Command::MarkStart),
            (KeyCode::Digit2, Command::MarkEnd),
        ]);
        Self { map }
    }

    /// Maps a winit keyboard event to a command, `None` for releases,
    /// repeats and unbound keys.
    pub fn command_for(&self, event: &KeyEvent) -> Option<Command> {
        self.command_for_key(event.physical_key, event.state.is_pressed(), event.repeat)
    }

    fn command_for_key(&self, key: PhysicalKey, pressed: bool, repeat: bool) -> Option<Command> {
        if !pressed || repeat {
            return None;
        }
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        self.map.get(&code).copied()
    }
}

/// Hands a file to the platform's default opener, like the settings screens
/// promise. Failure to spawn only logs; the file still exists for manual
/// editing.
pub fn open_in_editor(file: &str) {
    #[cfg(target_os = "linux")]
    let result = process::Command::new("xdg-open").arg(file).spawn();
    #[cfg(target_os = "macos")]
    let result = process::Command::new("open").arg(file).spawn();
    #[cfg(target_os = "windows")]
    let result = process::Command::new("cmd").args(["/C", "start", "", file]).spawn();

    if let Err(e) = result {
        log::warn!("could not open {file} in an editor: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_maps_to_command() {
        let bindings = KeyBindings::new();
        let cmd = bindings.command_for_key(PhysicalKey::Code(KeyCode::Digit1), true, false);
        assert_eq!(cmd, Some(Command::MarkStart));
    }

    #[test]
    fn releases_and_repeats_are_ignored() {
        let bindings = KeyBindings::new();
        let key = PhysicalKey::Code(KeyCode::Digit1);
        assert_eq!(bindings.command_for_key(key, false, false), None);
        assert_eq!(bindings.command_for_key(key, true, true), None);
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let bindings = KeyBindings::new();
        let cmd = bindings.command_for_key(PhysicalKey::Code(KeyCode::KeyZ), true, false);
        assert_eq!(cmd, None);
    }

    #[test]
    fn menu_keys_select_their_menus() {
        let bindings = KeyBindings::new();
        let cmd = bindings.command_for_key(PhysicalKey::Code(KeyCode::KeyC), true, false);
        assert_eq!(cmd, Some(Command::SelectMenu(Menu::Controls)));
    }
}
