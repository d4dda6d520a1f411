//! Hover/click tracking for the floating row action menu, plus the checkbox
//! selection of table rows.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::models::Receivable;
use crate::timer::Timer;

pub const ROW_LEAVE_DELAY: Duration = Duration::from_millis(300);
pub const MENU_LEAVE_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_MENU_OFFSET: f32 = 250.0;

/// Bounding box of a rendered row, in whatever units the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    Hovered { row: String, rect: RowRect },
    Clicked { row: String, rect: RowRect },
}

pub struct RowInteraction {
    state: Interaction,
    on_menu: bool,
    dismiss: Timer,
    menu_offset: f32,
}

impl Default for RowInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl RowInteraction {
    pub fn new() -> Self {
        Self::with_offset(DEFAULT_MENU_OFFSET)
    }

    /// Horizontal distance between a row's left edge and the menu anchor.
    pub fn with_offset(menu_offset: f32) -> Self {
        Self {
            state: Interaction::Idle,
            on_menu: false,
            dismiss: Timer::new(),
            menu_offset,
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self.state, Interaction::Clicked { .. })
    }

    pub fn dismissal_pending(&self) -> bool {
        self.dismiss.is_pending()
    }

    pub fn active_row(&self) -> Option<&str> {
        match &self.state {
            Interaction::Idle => None,
            Interaction::Hovered { row, .. } | Interaction::Clicked { row, .. } => Some(row),
        }
    }

    /// Where the floating menu goes: left of the row, vertically centred.
    pub fn anchor(&self) -> Option<Anchor> {
        match &self.state {
            Interaction::Idle => None,
            Interaction::Hovered { rect, .. } | Interaction::Clicked { rect, .. } => Some(Anchor {
                x: rect.x - self.menu_offset,
                y: rect.y + rect.height / 2.0,
            }),
        }
    }

    pub fn pointer_enter_row(&mut self, row: &str, rect: RowRect, _now: Instant) {
        if self.is_pinned() {
            return;
        }
        self.dismiss.cancel();
        self.state = Interaction::Hovered {
            row: row.to_string(),
            rect,
        };
    }

    pub fn pointer_leave_row(&mut self, now: Instant) {
        if self.is_pinned() || self.on_menu {
            return;
        }
        if matches!(self.state, Interaction::Hovered { .. }) {
            self.dismiss.schedule(now, ROW_LEAVE_DELAY);
        }
    }

    pub fn pointer_enter_menu(&mut self, _now: Instant) {
        self.on_menu = true;
        self.dismiss.cancel();
    }

    pub fn pointer_leave_menu(&mut self, now: Instant) {
        self.on_menu = false;
        if matches!(self.state, Interaction::Hovered { .. }) {
            self.dismiss.schedule(now, MENU_LEAVE_DELAY);
        }
    }

    /// Pin the menu to a row. Clicking the row that is already pinned keeps it.
    pub fn click_row(&mut self, row: &str, rect: RowRect) {
        self.dismiss.cancel();
        self.state = Interaction::Clicked {
            row: row.to_string(),
            rect,
        };
    }

    pub fn click_outside(&mut self) {
        self.close();
    }

    /// An action was chosen from the menu: returns the target row and closes.
    pub fn invoke_action(&mut self) -> Option<String> {
        let row = self.active_row().map(str::to_string);
        self.close();
        row
    }

    pub fn close(&mut self) {
        self.dismiss.cancel();
        self.on_menu = false;
        self.state = Interaction::Idle;
    }

    /// Drive the dismissal timer. Returns true when the menu was dismissed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.dismiss.fire(now) {
            return false;
        }
        if self.is_pinned() {
            return false;
        }
        tracing::debug!(row = ?self.active_row(), "hover menu dismissed");
        self.state = Interaction::Idle;
        true
    }

    /// Resolve the active row against the current rows; None if it vanished.
    pub fn action_target<'a>(&self, rows: &'a [Receivable]) -> Option<&'a Receivable> {
        let id = self.active_row()?;
        rows.iter().find(|r| r.id == id)
    }
}

/// Checkbox selection of table rows.
#[derive(Debug, Default, Clone)]
pub struct RowSelection {
    selected: BTreeSet<String>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// All selected -> clear; otherwise select every id.
    pub fn toggle_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let ids: Vec<&str> = ids.into_iter().collect();
        let all = !ids.is_empty() && ids.iter().all(|id| self.selected.contains(*id));
        if all {
            self.selected.clear();
        } else {
            self.selected = ids.into_iter().map(str::to_string).collect();
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop ids that are no longer listed.
    pub fn retain_listed(&mut self, rows: &[Receivable]) {
        self.selected.retain(|id| rows.iter().any(|r| &r.id == id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mock_receivables;

    const MS: Duration = Duration::from_millis(1);

    fn rect(y: f32) -> RowRect {
        RowRect {
            x: 300.0,
            y,
            width: 900.0,
            height: 20.0,
        }
    }

    #[test]
    fn test_reenter_cancels_pending_dismissal() {
        let t0 = Instant::now();
        let mut c = RowInteraction::new();
        c.pointer_enter_row("A", rect(100.0), t0);
        c.pointer_leave_row(t0 + 10 * MS);
        assert!(c.dismissal_pending());
        c.pointer_enter_row("A", rect(100.0), t0 + 100 * MS);
        assert!(!c.dismissal_pending());
        for step in 0..20u32 {
            assert!(!c.tick(t0 + step * 100 * MS));
        }
        assert_eq!(c.active_row(), Some("A"));
    }

    #[test]
    fn test_leave_dismisses_after_delay() {
        let t0 = Instant::now();
        let mut c = RowInteraction::new();
        c.pointer_enter_row("A", rect(100.0), t0);
        c.pointer_leave_row(t0);
        assert!(!c.tick(t0 + 299 * MS));
        assert!(c.tick(t0 + 300 * MS));
        assert_eq!(c.active_row(), None);
        assert_eq!(c.anchor(), None);
    }

    #[test]
    fn test_menu_hover_keeps_menu_open() {
        let t0 = Instant::now();
        let mut c = RowInteraction::new();
        c.pointer_enter_row("A", rect(100.0), t0);
        c.pointer_leave_row(t0);
        c.pointer_enter_menu(t0 + 50 * MS);
        assert!(!c.tick(t0 + 1000 * MS));
        c.pointer_leave_menu(t0 + 1000 * MS);
        assert!(!c.tick(t0 + 1199 * MS));
        assert!(c.tick(t0 + 1200 * MS));
    }

    #[test]
    fn test_leave_row_while_on_menu_does_not_schedule() {
        let t0 = Instant::now();
        let mut c = RowInteraction::new();
        c.pointer_enter_row("A", rect(100.0), t0);
        c.pointer_enter_menu(t0);
        c.pointer_leave_row(t0);
        assert!(!c.dismissal_pending());
    }

    #[test]
    fn test_click_pins_and_suppresses_hover() {
        let t0 = Instant::now();
        let mut c = RowInteraction::new();
        c.pointer_enter_row("A", rect(100.0), t0);
        c.click_row("A", rect(100.0));
        c.pointer_leave_row(t0);
        c.pointer_enter_row("B", rect(120.0), t0);
        assert!(!c.tick(t0 + 5000 * MS));
        assert!(c.is_pinned());
        assert_eq!(c.active_row(), Some("A"));
        c.click_outside();
        assert_eq!(c.active_row(), None);
    }

    #[test]
    fn test_invoke_action_returns_row_and_closes() {
        let mut c = RowInteraction::new();
        c.click_row("3", rect(40.0));
        assert_eq!(c.invoke_action(), Some("3".to_string()));
        assert_eq!(c.active_row(), None);
        assert_eq!(c.invoke_action(), None);
    }

    #[test]
    fn test_anchor_left_and_centred() {
        let mut c = RowInteraction::new();
        c.click_row("A", RowRect {
            x: 400.0,
            y: 80.0,
            width: 900.0,
            height: 24.0,
        });
        assert_eq!(c.anchor(), Some(Anchor { x: 150.0, y: 92.0 }));
        let mut cells = RowInteraction::with_offset(10.0);
        cells.click_row("A", RowRect {
            x: 40.0,
            y: 5.0,
            width: 80.0,
            height: 1.0,
        });
        assert_eq!(cells.anchor(), Some(Anchor { x: 30.0, y: 5.5 }));
    }

    #[test]
    fn test_action_target_guards_missing_rows() {
        let rows = mock_receivables();
        let mut c = RowInteraction::new();
        c.click_row("10", rect(0.0));
        assert_eq!(c.action_target(&rows).map(|r| r.id.as_str()), Some("10"));
        c.click_row("999", rect(0.0));
        assert!(c.action_target(&rows).is_none());
    }

    #[test]
    fn test_row_selection_toggle_all() {
        let mut sel = RowSelection::new();
        sel.toggle("1");
        assert!(sel.is_selected("1"));
        sel.toggle_all(["1", "3"]);
        assert_eq!(sel.len(), 2);
        sel.toggle_all(["1", "3"]);
        assert!(sel.is_empty());
        sel.toggle("3");
        sel.toggle("3");
        assert!(!sel.is_selected("3"));
    }

    #[test]
    fn test_row_selection_retain_listed() {
        let rows = mock_receivables();
        let mut sel = RowSelection::new();
        sel.toggle("1");
        sel.toggle("gone");
        sel.retain_listed(&rows);
        assert_eq!(sel.selected_ids().collect::<Vec<_>>(), vec!["1"]);
    }
}
