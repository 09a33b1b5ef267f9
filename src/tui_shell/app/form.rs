use super::*;

#[derive(Clone, Debug)]
pub(in crate::tui_shell) struct FormField {
    pub(in crate::tui_shell) key: String,
    pub(in crate::tui_shell) input: Input,
}

/// Ordered text fields with one focused entry.
#[derive(Clone, Debug, Default)]
pub(in crate::tui_shell) struct Form {
    pub(in crate::tui_shell) fields: Vec<FormField>,
    pub(in crate::tui_shell) focus: usize,
}

impl Form {
    pub(in crate::tui_shell) fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            fields: keys
                .into_iter()
                .map(|key| FormField {
                    key: key.to_string(),
                    input: Input::default(),
                })
                .collect(),
            focus: 0,
        }
    }

    pub(in crate::tui_shell) fn focus_next(&mut self) {
        let n = self.fields.len();
        if n > 0 {
            self.focus = (self.focus + 1) % n;
        }
    }

    pub(in crate::tui_shell) fn focus_prev(&mut self) {
        let n = self.fields.len();
        if n > 0 {
            self.focus = (self.focus + n - 1) % n;
        }
    }

    pub(in crate::tui_shell) fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub(in crate::tui_shell) fn focused_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    pub(in crate::tui_shell) fn focused_key(&self) -> Option<&str> {
        self.focused().map(|f| f.key.as_str())
    }

    pub(in crate::tui_shell) fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.input.buf.as_str())
    }

    /// Returns false when the form has no such field.
    pub(in crate::tui_shell) fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.input.set(value.into());
                true
            }
            None => false,
        }
    }

    pub(in crate::tui_shell) fn values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.input.buf.clone()))
            .collect()
    }

    /// Plain text editing on the focused field. Returns whether the key was used.
    pub(in crate::tui_shell) fn edit_focused(&mut self, key: KeyEvent) -> bool {
        let Some(field) = self.focused_mut() else {
            return false;
        };
        let input = &mut field.input;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => input.clear(),
            KeyCode::Char(c) if !ctrl => input.insert_char(c),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            _ => return false,
        }
        true
    }
}

/// Next (`step > 0`) or previous option after `current`, wrapping at both
/// ends. An unknown `current` selects the first option; with no options the
/// value is left as is.
pub(in crate::tui_shell) fn cycle_option(current: &str, options: &[String], step: isize) -> String {
    if options.is_empty() {
        return current.to_string();
    }
    let Some(idx) = options.iter().position(|o| o == current) else {
        return options[0].clone();
    };
    let n = options.len() as isize;
    let next = (idx as isize + step).rem_euclid(n) as usize;
    options[next].clone()
}
