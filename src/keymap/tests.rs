//! Integration tests for the keymap system

use super::*;

#[test]
fn test_defaults_cover_navigation_grid() {
    let bindings = KeyBindings::default();

    for (key, plain, ctrl) in [
        (KeyCode::Left, Motion::ColumnPrevious, Some(Motion::WordPrevious)),
        (KeyCode::Right, Motion::ColumnNext, Some(Motion::WordNext)),
        (KeyCode::Home, Motion::LineStart, Some(Motion::TextStart)),
        (KeyCode::End, Motion::LineEnd, Some(Motion::TextEnd)),
        (KeyCode::PageUp, Motion::PageUp, Some(Motion::WindowStart)),
        (KeyCode::PageDown, Motion::PageDown, Some(Motion::WindowEnd)),
        (KeyCode::Up, Motion::LineUp, None),
        (KeyCode::Down, Motion::LineDown, None),
    ] {
        assert_eq!(
            bindings.lookup(&Keystroke::key(key)),
            Some(Action::Move(plain))
        );
        assert_eq!(
            bindings.lookup(&Keystroke::new(key, Modifiers::SHIFT)),
            Some(Action::Select(plain))
        );
        let ctrl_action = bindings.lookup(&Keystroke::new(key, Modifiers::CTRL));
        let ctrl_shift_action =
            bindings.lookup(&Keystroke::new(key, Modifiers::CTRL | Modifiers::SHIFT));
        assert_eq!(ctrl_action, ctrl.map(Action::Move));
        assert_eq!(ctrl_shift_action, ctrl.map(Action::Select));
    }
}

#[test]
fn test_default_binding_codes_match_action_codes() {
    // Every navigation binding's keystroke encodes to its action's code
    for binding in default_bindings() {
        let Some(action) = binding.action else {
            continue;
        };
        if action.motion().is_some() {
            assert_eq!(binding.key_code(), action.code(), "{}", action);
        }
    }
}

#[test]
fn test_default_clipboard_bindings() {
    let bindings = KeyBindings::default();
    let ctrl = Modifiers::CTRL;
    let shift = Modifiers::SHIFT;

    assert_eq!(
        bindings.lookup(&Keystroke::char_with_mods('x', ctrl)),
        Some(Action::Cut)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::char_with_mods('C', ctrl)),
        Some(Action::Copy)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::char_with_mods('v', ctrl)),
        Some(Action::Paste)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::new(KeyCode::Delete, shift)),
        Some(Action::Cut)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::new(KeyCode::Insert, ctrl)),
        Some(Action::Copy)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::new(KeyCode::Insert, shift)),
        Some(Action::Paste)
    );
    assert_eq!(
        bindings.keys_for(Action::Cut),
        vec![
            Keystroke::new(KeyCode::Delete, shift),
            Keystroke::char_with_mods('x', ctrl),
        ]
    );
}

#[test]
fn test_default_editing_bindings() {
    let bindings = KeyBindings::default();
    assert_eq!(
        bindings.lookup(&Keystroke::key(KeyCode::Backspace)),
        Some(Action::DeletePrevious)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::key(KeyCode::Delete)),
        Some(Action::DeleteNext)
    );
    assert_eq!(
        bindings.lookup(&Keystroke::key(KeyCode::Insert)),
        Some(Action::ToggleOverwrite)
    );
    // Typing keys are not bound
    assert_eq!(bindings.lookup(&Keystroke::char_with_mods('a', Modifiers::NONE)), None);
}

#[test]
fn test_merge_overrides_and_unbinds() {
    let yaml = r#"
bindings:
  - key: "ctrl+e"
    action: line_end
  - key: "insert"
    action: none
  - key: "backspace"
    action: delete_next
"#;
    let overrides = parse_keymap_yaml(yaml).unwrap();
    let merged = merge_bindings(default_bindings(), overrides);
    let bindings = KeyBindings::with_bindings(merged);

    assert_eq!(
        bindings.lookup(&Keystroke::char_with_mods('e', Modifiers::CTRL)),
        Some(Action::Move(Motion::LineEnd))
    );
    assert_eq!(bindings.lookup(&Keystroke::key(KeyCode::Insert)), None);
    assert_eq!(
        bindings.lookup(&Keystroke::key(KeyCode::Backspace)),
        Some(Action::DeleteNext)
    );
    assert_eq!(bindings.len(), default_bindings().len());
}
