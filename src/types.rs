//! Common types used throughout the application

use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::gomod::Error;

/// One `go list -m -u -json` record.
///
/// Unknown fields (`Time`, `Dir`, `GoMod`, ...) are ignored on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    pub path: String,
    /// Absent for untagged modules (notably the main module itself).
    #[serde(default)]
    pub version: String,
    /// Present only when `go list -u` found a newer version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Update>,
    /// True for the project's own module record.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub main: bool,
    /// Transitively required; not upgradable by this tool.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indirect: bool,
}

/// The available upgrade target for a [`Module`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Update {
    pub path: String,
    pub version: String,
}

impl Module {
    /// Eligible for the interactive list: not the main module, carries an
    /// update, and is directly required.
    pub fn wants_upgrade(&self) -> bool {
        !self.main && self.update.is_some() && !self.indirect
    }
}

/// Application state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Inventory request outstanding; no dataset yet.
    Loading,
    /// Dataset present, nothing in flight.
    Idle,
    /// One upgrade outstanding; most input is suppressed.
    Updating,
    /// Terminal: the stored error becomes the process outcome.
    Failed,
    /// Terminal: normal exit.
    Quitting,
}

/// Everything the event loop can deliver to the state machine.
///
/// Keyboard input, timer ticks, and collaborator completions all arrive
/// through the same channel and are processed strictly in arrival order.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Loaded(Vec<Module>),
    Upgraded(Vec<Module>),
    Failed(Error),
}

/// Follow-up asynchronous request produced by a transition. The event loop
/// dispatches it to a worker thread; the result comes back as an [`Event`].
#[derive(Debug)]
pub enum Effect {
    Upgrade(Module),
}

/// Scrollable window over the rendered list. `offset` is the index of the
/// first visible row; the visible band is `[offset, offset + height - 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    pub offset: usize,
}

impl Viewport {
    /// Index of the last visible row.
    pub fn bottom(&self) -> usize {
        self.offset + self.height.max(1) as usize - 1
    }

    /// Largest offset that still keeps the window inside `len` rows.
    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.height as usize)
    }
}
