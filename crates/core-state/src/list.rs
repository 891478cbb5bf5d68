//! Bullet / numbered list mode.
//!
//! Inactive -> Bullet | Numbered on toggle; any active mode -> Inactive on
//! its toggle, on an explicit reset, or when return-key handling detects a
//! double newline or double space before the caret or an item holding only
//! its marker.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Inactive,
    Bullet,
    Numbered,
}

pub const BULLET_MARKER: &str = "• ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    bullet_active: bool,
    numbered_active: bool,
    next_ordinal: u32,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            bullet_active: false,
            numbered_active: false,
            next_ordinal: 1,
        }
    }
}

impl ListState {
    pub fn mode(&self) -> ListMode {
        match (self.bullet_active, self.numbered_active) {
            (true, true) => ListMode::Numbered,
            (true, false) => ListMode::Bullet,
            _ => ListMode::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        self.bullet_active
    }
    pub fn is_bullet_active(&self) -> bool {
        self.bullet_active && !self.numbered_active
    }
    pub fn is_numbered_active(&self) -> bool {
        self.bullet_active && self.numbered_active
    }
    pub fn next_ordinal(&self) -> u32 {
        self.next_ordinal
    }

    /// Flip bullet mode. Returns true when the list was entered.
    pub fn toggle_bullet(&mut self) -> bool {
        if self.bullet_active {
            self.reset();
            false
        } else {
            self.bullet_active = true;
            self.numbered_active = false;
            true
        }
    }

    /// Flip numbered mode. Entering from bullet mode switches style and
    /// restarts numbering at 1.
    pub fn toggle_numbered(&mut self) -> bool {
        if self.is_numbered_active() {
            self.reset();
            false
        } else {
            self.bullet_active = true;
            self.numbered_active = true;
            self.next_ordinal = 1;
            true
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Text for the next item (`"\n• "` or `"\n<n>. "`), advancing the
    /// ordinal in numbered mode. `None` when no list is active.
    pub fn next_marker(&mut self) -> Option<String> {
        match self.mode() {
            ListMode::Inactive => None,
            ListMode::Bullet => Some(format!("\n{BULLET_MARKER}")),
            ListMode::Numbered => {
                let n = self.next_ordinal;
                self.next_ordinal = self.next_ordinal.saturating_add(1);
                Some(format!("\n{n}. "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_toggle_cycles() {
        let mut l = ListState::default();
        assert!(l.toggle_bullet());
        assert_eq!(l.mode(), ListMode::Bullet);
        assert_eq!(l.next_marker().as_deref(), Some("\n• "));
        assert!(!l.toggle_bullet());
        assert_eq!(l.mode(), ListMode::Inactive);
        assert_eq!(l.next_marker(), None);
    }

    #[test]
    fn numbered_markers_count_up_and_restart() {
        let mut l = ListState::default();
        l.toggle_numbered();
        assert_eq!(l.next_marker().as_deref(), Some("\n1. "));
        assert_eq!(l.next_marker().as_deref(), Some("\n2. "));
        assert_eq!(l.next_ordinal(), 3);
        l.toggle_numbered();
        assert_eq!(l.next_ordinal(), 1);
        l.toggle_numbered();
        assert_eq!(l.next_marker().as_deref(), Some("\n1. "));
    }

    #[test]
    fn bullet_toggle_exits_numbered_mode() {
        let mut l = ListState::default();
        l.toggle_numbered();
        assert!(!l.toggle_bullet());
        assert!(!l.is_active());
    }

    #[test]
    fn numbered_toggle_switches_from_bullet() {
        let mut l = ListState::default();
        l.toggle_bullet();
        assert!(l.toggle_numbered());
        assert!(l.is_numbered_active());
        assert!(!l.is_bullet_active());
    }
}
