//! Core business logic - the application state machine
//!
//! Owns the dataset, cursor, viewport, and phase, and reduces every inbound
//! [`Event`] to the next state plus at most one follow-up [`Effect`]. All
//! I/O stays in the event loop; everything here is synchronous and driven
//! by plain values, which keeps the arithmetic unit-testable.
//!
//! Two distinct reconciliation rules keep cursor and viewport consistent:
//! - `follow_cursor` after cursor movement: the window scrolls to keep the
//!   selection visible.
//! - `pin_cursor` after viewport movement: the selection is pulled into
//!   whatever became visible, without moving the window.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::gomod::Error;
use crate::types::{Effect, Event, Module, Phase, Viewport};
use crate::ui::SPINNER_FRAMES;

pub struct App {
    /// `None` until the first inventory snapshot arrives. Replaced
    /// wholesale on every completion, never mutated in place.
    pub modules: Option<Vec<Module>>,
    pub cursor: usize,
    pub viewport: Viewport,
    pub phase: Phase,
    /// Set on the first size information; the list is not drawn before.
    pub ready: bool,
    pub spinner_frame: usize,
    /// Stored by `Failed`; reported as the process outcome after teardown.
    pub error: Option<Error>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            modules: None,
            cursor: 0,
            viewport: Viewport::default(),
            phase: Phase::Loading,
            ready: false,
            spinner_frame: 0,
            error: None,
        }
    }

    /// Current dataset; empty until loaded.
    pub fn modules(&self) -> &[Module] {
        self.modules.as_deref().unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&Module> {
        self.modules().get(self.cursor)
    }

    /// Apply one event, returning the follow-up request for the event loop
    /// to dispatch if the transition produced one.
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::Loaded(modules) => {
                if self.phase == Phase::Loading {
                    self.modules = Some(modules);
                    self.cursor = 0;
                    self.phase = Phase::Idle;
                }
            }
            Event::Upgraded(modules) => {
                if self.phase == Phase::Updating {
                    self.modules = Some(modules);
                    self.phase = Phase::Idle;
                    self.clamp_to_dataset();
                }
            }
            Event::Failed(err) => {
                self.error = Some(err);
                self.phase = Phase::Failed;
            }
            Event::Tick => {
                self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            }
            Event::Resize(width, height) => self.resize(width, height),
            Event::Key(key) => return self.handle_key(key),
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let quit = key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        if quit {
            // An in-flight upgrade must not be abandoned silently.
            if self.phase != Phase::Updating {
                self.phase = Phase::Quitting;
            }
            return None;
        }

        // Navigation, scrolling, and confirm only apply to a non-empty
        // idle list; everything else is dropped, including repeated enter
        // presses while an upgrade is outstanding.
        if self.phase != Phase::Idle || self.modules().is_empty() {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                let module = self.selected()?.clone();
                self.phase = Phase::Updating;
                return Some(Effect::Upgrade(module));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = if self.cursor + 1 < self.modules().len() {
                    self.cursor + 1
                } else {
                    0
                };
                self.follow_cursor();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self
                    .cursor
                    .checked_sub(1)
                    .unwrap_or(self.modules().len() - 1);
                self.follow_cursor();
            }
            KeyCode::PageUp | KeyCode::Char('u') => {
                self.viewport.offset = self.viewport.offset.saturating_sub(1);
                self.pin_cursor();
            }
            KeyCode::PageDown | KeyCode::Char('d') => {
                let max = self.viewport.max_offset(self.modules().len());
                self.viewport.offset = (self.viewport.offset + 1).min(max);
                self.pin_cursor();
            }
            _ => {}
        }
        None
    }

    fn resize(&mut self, width: u16, height: u16) {
        // Header and footer each take one row.
        self.viewport.width = width;
        self.viewport.height = height.saturating_sub(2);
        if !self.ready {
            self.ready = true;
            return;
        }
        let len = self.modules().len();
        self.viewport.offset = self.viewport.offset.min(self.viewport.max_offset(len));
        self.pin_cursor();
    }

    /// Scroll-to-follow: move the window so the cursor stays inside the
    /// visible band, clamped so the band never leaves the dataset.
    fn follow_cursor(&mut self) {
        if self.viewport.height == 0 {
            return;
        }
        if self.cursor < self.viewport.offset {
            self.viewport.offset = self.cursor;
        } else if self.cursor > self.viewport.bottom() {
            self.viewport.offset = self.cursor + 1 - self.viewport.height as usize;
        }
        let max = self.viewport.max_offset(self.modules().len());
        self.viewport.offset = self.viewport.offset.min(max);
    }

    /// Clamp-to-window: pull the cursor into the visible band without
    /// moving the window.
    fn pin_cursor(&mut self) {
        let len = self.modules().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self
            .cursor
            .clamp(self.viewport.offset, self.viewport.bottom())
            .min(len - 1);
    }

    /// Re-establish cursor and offset bounds after the dataset shrank or
    /// grew underneath them.
    fn clamp_to_dataset(&mut self) {
        let len = self.modules().len();
        if len == 0 {
            self.cursor = 0;
            self.viewport.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(len - 1);
        self.viewport.offset = self.viewport.offset.min(self.viewport.max_offset(len));
        self.follow_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gomod::InventoryError;
    use crate::types::Update;
    use std::io;

    fn module(path: &str) -> Module {
        Module {
            path: path.to_string(),
            version: "v1.0.0".to_string(),
            update: Some(Update {
                path: path.to_string(),
                version: "v1.1.0".to_string(),
            }),
            main: false,
            indirect: false,
        }
    }

    fn dataset(n: usize) -> Vec<Module> {
        (0..n).map(|i| module(&format!("example.com/mod{i:02}"))).collect()
    }

    /// App with `n` modules and a body `height` rows tall, already idle.
    fn app_with(n: usize, height: u16) -> App {
        let mut app = App::new();
        app.update(Event::Resize(80, height + 2));
        app.update(Event::Loaded(dataset(n)));
        app
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn inventory_error() -> Error {
        Error::Inventory(InventoryError::Spawn(io::Error::new(
            io::ErrorKind::NotFound,
            "go: command not found",
        )))
    }

    #[test]
    fn load_sets_cursor_and_phase() {
        let app = app_with(3, 10);
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.modules().len(), 3);
    }

    #[test]
    fn first_resize_flips_ready() {
        let mut app = App::new();
        assert!(!app.ready);
        app.update(Event::Resize(80, 24));
        assert!(app.ready);
        assert_eq!(app.viewport.height, 22);
    }

    #[test]
    fn navigation_wraps_forward() {
        let mut app = app_with(3, 10);
        for _ in 0..2 {
            app.update(key(KeyCode::Down));
        }
        assert_eq!(app.cursor, 2);
        app.update(key(KeyCode::Down));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn navigation_up_from_top_wraps_and_scrolls() {
        // Cursor at index 0 of 5 items with a 3-row window; wrapping up
        // must land on index 4 and scroll it into view.
        let mut app = app_with(5, 3);
        app.update(key(KeyCode::Up));
        assert_eq!(app.cursor, 4);
        assert_eq!(app.viewport.offset, 2);
    }

    #[test]
    fn cursor_always_in_bounds_and_visible() {
        let mut app = app_with(7, 3);
        let moves = [
            KeyCode::Down, KeyCode::Down, KeyCode::Up, KeyCode::Char('j'),
            KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Char('k'),
            KeyCode::Up, KeyCode::Up, KeyCode::Up, KeyCode::Down,
        ];
        for code in moves {
            app.update(key(code));
            assert!(app.cursor < app.modules().len());
            assert!(app.viewport.offset <= app.cursor);
            assert!(app.cursor <= app.viewport.bottom());
            assert!(app.viewport.offset <= app.viewport.max_offset(app.modules().len()));
        }
    }

    #[test]
    fn scrolling_pins_cursor_to_window() {
        let mut app = app_with(5, 3);
        app.update(key(KeyCode::PageDown));
        assert_eq!(app.viewport.offset, 1);
        assert_eq!(app.cursor, 1, "cursor pulled down to the new top");

        // Move to the bottom of the band, then scroll back up.
        app.update(key(KeyCode::Down));
        app.update(key(KeyCode::Down));
        assert_eq!(app.cursor, 3);
        app.update(key(KeyCode::PageUp));
        assert_eq!(app.viewport.offset, 0);
        assert_eq!(app.cursor, 2, "cursor pulled up to the new bottom");
    }

    #[test]
    fn scrolling_clamps_at_both_ends() {
        let mut app = app_with(5, 3);
        app.update(key(KeyCode::PageUp));
        assert_eq!(app.viewport.offset, 0);

        for _ in 0..10 {
            app.update(key(KeyCode::PageDown));
        }
        assert_eq!(app.viewport.offset, 2, "max offset is len - height");
    }

    #[test]
    fn enter_requests_exactly_one_upgrade() {
        let mut app = app_with(3, 10);
        app.update(key(KeyCode::Down));

        let effect = app.update(key(KeyCode::Enter));
        assert!(matches!(effect, Some(Effect::Upgrade(ref m)) if m.path == "example.com/mod01"));
        assert_eq!(app.phase, Phase::Updating);

        // Repeated enter while busy is a no-op: no new request, no change.
        let again = app.update(key(KeyCode::Enter));
        assert!(again.is_none());
        assert_eq!(app.phase, Phase::Updating);
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn enter_on_empty_dataset_is_a_noop() {
        let mut app = app_with(0, 10);
        assert!(app.update(key(KeyCode::Enter)).is_none());
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn navigation_is_suppressed_while_updating() {
        let mut app = app_with(3, 10);
        app.update(key(KeyCode::Enter));
        app.update(key(KeyCode::Down));
        app.update(key(KeyCode::PageDown));
        assert_eq!(app.cursor, 0);
        assert_eq!(app.viewport.offset, 0);
    }

    #[test]
    fn quit_is_refused_while_updating() {
        let mut app = app_with(3, 10);
        app.update(key(KeyCode::Enter));
        app.update(key(KeyCode::Char('q')));
        assert_eq!(app.phase, Phase::Updating);
    }

    #[test]
    fn quit_from_idle() {
        let mut app = app_with(3, 10);
        app.update(key(KeyCode::Char('q')));
        assert_eq!(app.phase, Phase::Quitting);
    }

    #[test]
    fn ctrl_c_quits_during_load() {
        let mut app = App::new();
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(app.phase, Phase::Quitting);
    }

    #[test]
    fn upgrade_completion_replaces_dataset_and_clamps_cursor() {
        // 5 items, cursor on the last; the refreshed snapshot has 3.
        let mut app = app_with(5, 3);
        app.update(key(KeyCode::Up)); // wraps to 4, offset 2
        app.update(key(KeyCode::Enter));

        app.update(Event::Upgraded(dataset(3)));
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.cursor, 2);
        assert!(app.viewport.offset <= app.viewport.max_offset(3));
        assert!(app.viewport.offset <= app.cursor && app.cursor <= app.viewport.bottom());
    }

    #[test]
    fn upgrade_completion_may_empty_the_dataset() {
        let mut app = app_with(1, 3);
        app.update(key(KeyCode::Enter));
        app.update(Event::Upgraded(Vec::new()));
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.modules().is_empty());
        assert_eq!(app.cursor, 0);
        assert_eq!(app.viewport.offset, 0);
    }

    #[test]
    fn failure_is_terminal_and_leaves_dataset_untouched() {
        let mut app = app_with(3, 10);
        app.update(key(KeyCode::Enter));

        app.update(Event::Failed(inventory_error()));
        assert_eq!(app.phase, Phase::Failed);
        assert!(app.error.is_some());
        assert_eq!(app.modules().len(), 3, "no dataset mutation on failure");

        // Terminal: further input changes nothing.
        app.update(key(KeyCode::Down));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut app = app_with(10, 4);
        for _ in 0..5 {
            app.update(key(KeyCode::Down));
        }
        app.update(Event::Resize(80, 5));
        let (cursor, viewport) = (app.cursor, app.viewport);

        app.update(Event::Resize(80, 5));
        assert_eq!(app.cursor, cursor);
        assert_eq!(app.viewport, viewport);
    }

    #[test]
    fn shrinking_resize_keeps_cursor_visible() {
        let mut app = app_with(10, 6);
        for _ in 0..5 {
            app.update(key(KeyCode::Down));
        }
        assert_eq!(app.cursor, 5);

        app.update(Event::Resize(80, 4)); // body height 2
        assert!(app.viewport.offset <= app.cursor);
        assert!(app.cursor <= app.viewport.bottom());
        assert!(app.cursor < app.modules().len());
    }

    #[test]
    fn tick_advances_and_wraps_the_spinner() {
        let mut app = App::new();
        for _ in 0..SPINNER_FRAMES.len() {
            app.update(Event::Tick);
        }
        assert_eq!(app.spinner_frame, 0);
    }
}
