use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, View};

pub(super) fn shift_symbol(c: char) -> Option<char> {
    match c {
        '`' => Some('~'),
        '1' => Some('!'),
        '2' => Some('@'),
        '3' => Some('#'),
        '4' => Some('$'),
        '5' => Some('%'),
        '6' => Some('^'),
        '7' => Some('&'),
        '8' => Some('*'),
        '9' => Some('('),
        '0' => Some(')'),
        '-' => Some('_'),
        '=' => Some('+'),
        '[' => Some('{'),
        ']' => Some('}'),
        '\\' => Some('|'),
        ';' => Some(':'),
        '\'' => Some('"'),
        ',' => Some('<'),
        '.' => Some('>'),
        '/' => Some('?'),
        _ => None,
    }
}

/// Normalize key events from terminals using the kitty keyboard protocol.
///
/// Kitty protocol sends `Char(lowercase) + SHIFT` instead of `Char(UPPERCASE) + SHIFT`,
/// and `Char(base_symbol) + SHIFT` instead of `Char(shifted_symbol)`.
///
/// For traditional terminals this is a no-op:
/// - Already-uppercase letters: `'T'.is_ascii_lowercase()` = false → skip
/// - Already-shifted symbols: `shift_symbol('>')` = None → skip
pub(super) fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if let Some(shifted) = shift_symbol(c) {
            key.code = KeyCode::Char(shifted);
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}

/// Keys that work in either view while navigating. Returns true when handled.
pub(super) fn handle_global(app: &mut App, key: KeyEvent) -> bool {
    match (key.modifiers, key.code) {
        (m, KeyCode::Char('q')) if m.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Char('?')) => app.show_help = true,
        (_, KeyCode::Char('b')) => app.set_view(View::Board),
        (_, KeyCode::Char('s')) => app.set_view(View::People),
        (_, KeyCode::Char('\\')) => toggle_sidebar(app),
        (_, KeyCode::Char('t')) => cycle_theme(app),
        _ => return false,
    }
    true
}

/// Collapse or expand the sidebar, saving the choice to the profile
pub(super) fn toggle_sidebar(app: &mut App) {
    let expanded = !app.sidebar_expanded;
    app.sidebar_expanded = expanded;
    if app.profile.user().is_some() {
        app.profile
            .set_sidebar_expanded(app.store.as_ref(), &mut app.notices, expanded);
    }
}

/// light -> dark -> system, applied at once and saved to the profile
pub(super) fn cycle_theme(app: &mut App) {
    let next = app.theme_pref.cycle();
    app.theme_pref = next;
    app.apply_theme();
    if app.profile.user().is_some() {
        app.profile
            .set_theme(app.store.as_ref(), &mut app.notices, next);
    } else {
        app.notices.info("Theme", format!("Theme set to {}", next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitty_shift_is_normalized() {
        let key = normalize_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('T'));
        let key = normalize_key(KeyEvent::new(KeyCode::Char('.'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('>'));
        assert!(!key.modifiers.contains(KeyModifiers::SHIFT));
        let key = normalize_key(KeyEvent::new(KeyCode::Char('>'), KeyModifiers::NONE));
        assert_eq!(key.code, KeyCode::Char('>'));
    }
}
