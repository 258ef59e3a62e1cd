//! Keyboard bindings for the annotation widget.
//!
//! Keys arrive as DOM `KeyboardEvent.key` names and are mapped to widget
//! actions. The pan modifier acts on both press and release; the other
//! actions fire on release.

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Control,
    Delete,
    Escape,
    Enter,
    Backspace,
    Other,
}

impl Key {
    /// Parse a DOM key name.
    pub fn from_dom(name: &str) -> Self {
        match name {
            "Control" => Key::Control,
            "Delete" => Key::Delete,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            _ => Key::Other,
        }
    }
}

/// Widget action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Show the grab (pan) cursor while held
    PanCursor,
    /// Delete the selected or edited shape
    DeleteSelected,
    /// Leave edit mode
    StopEdit,
    /// Close the polygon being drawn
    FinishPolygon,
}

/// Keybinding configuration for the widget.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub pan_cursor: Key,
    pub delete_selected: Key,
    pub stop_edit: Key,
    pub finish_polygon: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pan_cursor: Key::Control,
            delete_selected: Key::Delete,
            stop_edit: Key::Escape,
            finish_polygon: Key::Enter,
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action that corresponds to a key, if any.
    pub fn action_for_key(&self, key: Key) -> Option<KeyAction> {
        if key == Key::Other {
            None
        } else if key == self.pan_cursor {
            Some(KeyAction::PanCursor)
        } else if key == self.delete_selected {
            Some(KeyAction::DeleteSelected)
        } else if key == self.stop_edit {
            Some(KeyAction::StopEdit)
        } else if key == self.finish_polygon {
            Some(KeyAction::FinishPolygon)
        } else {
            None
        }
    }

    /// Get the key bound to an action.
    pub fn key_for_action(&self, action: KeyAction) -> Key {
        match action {
            KeyAction::PanCursor => self.pan_cursor,
            KeyAction::DeleteSelected => self.delete_selected,
            KeyAction::StopEdit => self.stop_edit,
            KeyAction::FinishPolygon => self.finish_polygon,
        }
    }

    /// Rebind an action.
    pub fn set_key(&mut self, action: KeyAction, key: Key) {
        match action {
            KeyAction::PanCursor => self.pan_cursor = key,
            KeyAction::DeleteSelected => self.delete_selected = key,
            KeyAction::StopEdit => self.stop_edit = key,
            KeyAction::FinishPolygon => self.finish_polygon = key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.action_for_key(Key::from_dom("Control")),
            Some(KeyAction::PanCursor)
        );
        assert_eq!(
            bindings.action_for_key(Key::from_dom("Delete")),
            Some(KeyAction::DeleteSelected)
        );
        assert_eq!(
            bindings.action_for_key(Key::from_dom("Escape")),
            Some(KeyAction::StopEdit)
        );
        assert_eq!(bindings.action_for_key(Key::from_dom("a")), None);
    }

    #[test]
    fn test_rebinding() {
        let mut bindings = KeyBindings::new();
        bindings.set_key(KeyAction::DeleteSelected, Key::Backspace);
        assert_eq!(bindings.key_for_action(KeyAction::DeleteSelected), Key::Backspace);
        assert_eq!(bindings.action_for_key(Key::Delete), None);
        assert_eq!(
            bindings.action_for_key(Key::Backspace),
            Some(KeyAction::DeleteSelected)
        );
    }
}
