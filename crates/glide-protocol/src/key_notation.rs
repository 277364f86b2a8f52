#![forbid(unsafe_code)]

//! Key and mouse input translated to the editor's key notation.
//!
//! ```text
//! Char('a')                    → a
//! Char('A') + SHIFT            → A          (shift already applied)
//! Char('a') + CTRL | ALT       → <C-M-a>
//! Char('<')                    → <lt>
//! Enter + SHIFT                → <S-CR>
//! F(5) + CTRL | SUPER          → <C-D-F5>
//! Press(Left) + CTRL           → <C-LeftMouse>
//! ```
//!
//! Modifier prefixes are always emitted in the order `C-`, `M-`, `D-`,
//! `S-`. Release events and keys with no notation produce `None`. Each
//! call builds its own small string; nothing is cached between calls.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Super/Command.
        const SUPER = 0b1000;
    }
}

/// Physical or logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Text-producing key, with shift already applied to the character.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    /// Shift+Tab as reported by some platforms.
    BackTab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key F1..F37.
    F(u8),
    /// A bare modifier (Shift, Ctrl, ...) pressed on its own.
    Modifier,
    /// Caps Lock, media keys, and anything else with no notation.
    Unidentified,
}

/// Press, repeat, or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Set the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Highest function key the editor names.
const MAX_FUNCTION_KEY: u8 = 37;

fn push_modifiers(out: &mut String, modifiers: Modifiers) {
    if modifiers.contains(Modifiers::CTRL) {
        out.push_str("C-");
    }
    if modifiers.contains(Modifiers::ALT) {
        out.push_str("M-");
    }
    if modifiers.contains(Modifiers::SUPER) {
        out.push_str("D-");
    }
    if modifiers.contains(Modifiers::SHIFT) {
        out.push_str("S-");
    }
}

/// Name used inside `<...>` for characters that cannot appear bare.
fn special_char_name(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("lt"),
        '\\' => Some("Bslash"),
        '|' => Some("Bar"),
        ' ' => Some("Space"),
        _ => None,
    }
}

fn bracketed(modifiers: Modifiers, token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 10);
    out.push('<');
    push_modifiers(&mut out, modifiers);
    out.push_str(token);
    out.push('>');
    out
}

/// Editor notation for `event`, or `None` for releases and unmapped keys.
#[must_use]
pub fn key_notation(event: &KeyEvent) -> Option<String> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let modifiers = event.modifiers;

    let token = match event.code {
        KeyCode::Char(c) => {
            if c.is_control() {
                return None;
            }
            // Shift is already folded into the character.
            let modifiers = modifiers - Modifiers::SHIFT;
            return Some(match special_char_name(c) {
                Some(name) => bracketed(modifiers, name),
                None if modifiers.is_empty() => c.to_string(),
                None => {
                    let mut buf = [0u8; 4];
                    bracketed(modifiers, c.encode_utf8(&mut buf))
                }
            });
        }
        KeyCode::BackTab => return Some(bracketed(modifiers | Modifiers::SHIFT, "Tab")),
        KeyCode::F(n) if (1..=MAX_FUNCTION_KEY).contains(&n) => {
            return Some(bracketed(modifiers, &format!("F{n}")));
        }
        KeyCode::F(_) | KeyCode::Modifier | KeyCode::Unidentified => return None,
        KeyCode::Enter => "CR",
        KeyCode::Escape => "Esc",
        KeyCode::Backspace => "BS",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Del",
        KeyCode::Insert => "Insert",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
    };
    Some(bracketed(modifiers, token))
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
    /// Any other button; has no notation.
    Other(u8),
}

/// Wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Mouse action to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseInput {
    Press(MouseButton),
    Drag(MouseButton),
    Release(MouseButton),
    /// Pointer motion with no button held.
    Move,
    Wheel(WheelDirection),
}

/// Editor notation for a mouse action, or `None` when it has none.
#[must_use]
pub fn mouse_notation(input: MouseInput, modifiers: Modifiers) -> Option<String> {
    let button_name = |button: MouseButton| match button {
        MouseButton::Left => Some("Left"),
        MouseButton::Right => Some("Right"),
        MouseButton::Middle => Some("Middle"),
        MouseButton::X1 => Some("X1"),
        MouseButton::X2 => Some("X2"),
        MouseButton::Other(_) => None,
    };

    let mut token = String::with_capacity(16);
    match input {
        MouseInput::Press(button) => {
            token.push_str(button_name(button)?);
            token.push_str("Mouse");
        }
        MouseInput::Drag(button) => {
            token.push_str(button_name(button)?);
            token.push_str("Drag");
        }
        MouseInput::Release(button) => {
            token.push_str(button_name(button)?);
            token.push_str("Release");
        }
        MouseInput::Move => token.push_str("MouseMove"),
        MouseInput::Wheel(direction) => {
            token.push_str("ScrollWheel");
            token.push_str(match direction {
                WheelDirection::Up => "Up",
                WheelDirection::Down => "Down",
                WheelDirection::Left => "Left",
                WheelDirection::Right => "Right",
            });
        }
    }
    Some(bracketed(modifiers, &token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: Modifiers) -> Option<String> {
        key_notation(&KeyEvent::new(code).with_modifiers(modifiers))
    }

    #[test]
    fn plain_characters_pass_through() {
        assert_eq!(key(KeyCode::Char('a'), Modifiers::NONE).as_deref(), Some("a"));
        assert_eq!(key(KeyCode::Char('é'), Modifiers::NONE).as_deref(), Some("é"));
    }

    #[test]
    fn shift_is_dropped_for_printable_chars() {
        assert_eq!(key(KeyCode::Char('A'), Modifiers::SHIFT).as_deref(), Some("A"));
        assert_eq!(
            key(KeyCode::Char('A'), Modifiers::SHIFT | Modifiers::CTRL).as_deref(),
            Some("<C-A>")
        );
    }

    #[test]
    fn modifier_order_is_fixed() {
        let all = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER | Modifiers::SHIFT;
        assert_eq!(key(KeyCode::Enter, all).as_deref(), Some("<C-M-D-S-CR>"));
        assert_eq!(
            key(KeyCode::F(5), Modifiers::SUPER | Modifiers::CTRL).as_deref(),
            Some("<C-D-F5>")
        );
    }

    #[test]
    fn function_keys_span_one_to_thirty_seven() {
        assert_eq!(key(KeyCode::F(1), Modifiers::NONE).as_deref(), Some("<F1>"));
        assert_eq!(key(KeyCode::F(12), Modifiers::SHIFT).as_deref(), Some("<S-F12>"));
        assert_eq!(key(KeyCode::F(37), Modifiers::NONE).as_deref(), Some("<F37>"));
    }

    #[test]
    fn special_characters_are_named() {
        assert_eq!(key(KeyCode::Char('<'), Modifiers::NONE).as_deref(), Some("<lt>"));
        assert_eq!(key(KeyCode::Char('\\'), Modifiers::NONE).as_deref(), Some("<Bslash>"));
        assert_eq!(key(KeyCode::Char('|'), Modifiers::ALT).as_deref(), Some("<M-Bar>"));
        assert_eq!(key(KeyCode::Char(' '), Modifiers::CTRL).as_deref(), Some("<C-Space>"));
    }

    #[test]
    fn named_keys() {
        let cases = [
            (KeyCode::Escape, "<Esc>"),
            (KeyCode::Backspace, "<BS>"),
            (KeyCode::Tab, "<Tab>"),
            (KeyCode::BackTab, "<S-Tab>"),
            (KeyCode::Delete, "<Del>"),
            (KeyCode::PageDown, "<PageDown>"),
            (KeyCode::Left, "<Left>"),
        ];
        for (code, expected) in cases {
            assert_eq!(key(code, Modifiers::NONE).as_deref(), Some(expected));
        }
        assert_eq!(key(KeyCode::Up, Modifiers::SHIFT).as_deref(), Some("<S-Up>"));
    }

    #[test]
    fn release_and_unmapped_produce_nothing() {
        let release = KeyEvent::new(KeyCode::Char('a')).with_kind(KeyEventKind::Release);
        assert_eq!(key_notation(&release), None);
        assert_eq!(key(KeyCode::Modifier, Modifiers::SHIFT), None);
        assert_eq!(key(KeyCode::Unidentified, Modifiers::NONE), None);
        assert_eq!(key(KeyCode::F(0), Modifiers::NONE), None);
        assert_eq!(key(KeyCode::F(38), Modifiers::NONE), None);
        assert_eq!(key(KeyCode::Char('\u{1b}'), Modifiers::NONE), None);
    }

    #[test]
    fn repeat_behaves_like_press() {
        let repeat = KeyEvent::new(KeyCode::Char('j')).with_kind(KeyEventKind::Repeat);
        assert_eq!(key_notation(&repeat).as_deref(), Some("j"));
    }

    #[test]
    fn mouse_buttons() {
        assert_eq!(
            mouse_notation(MouseInput::Press(MouseButton::Left), Modifiers::NONE).as_deref(),
            Some("<LeftMouse>")
        );
        assert_eq!(
            mouse_notation(MouseInput::Drag(MouseButton::Left), Modifiers::CTRL).as_deref(),
            Some("<C-LeftDrag>")
        );
        assert_eq!(
            mouse_notation(MouseInput::Release(MouseButton::X2), Modifiers::NONE).as_deref(),
            Some("<X2Release>")
        );
        assert_eq!(
            mouse_notation(MouseInput::Press(MouseButton::Other(9)), Modifiers::NONE),
            None
        );
    }

    #[test]
    fn mouse_wheel_and_move() {
        assert_eq!(
            mouse_notation(MouseInput::Wheel(WheelDirection::Up), Modifiers::NONE).as_deref(),
            Some("<ScrollWheelUp>")
        );
        assert_eq!(
            mouse_notation(
                MouseInput::Wheel(WheelDirection::Right),
                Modifiers::SHIFT | Modifiers::ALT
            )
            .as_deref(),
            Some("<M-S-ScrollWheelRight>")
        );
        assert_eq!(
            mouse_notation(MouseInput::Move, Modifiers::NONE).as_deref(),
            Some("<MouseMove>")
        );
    }
}
