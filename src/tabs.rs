//! Tab strip selection model.
//!
//! The strip on the handle behaves like a toggle group: clicking an unselected
//! tab selects it, clicking the selected tab clears the selection. Each click
//! is reported as a [`TabSignal`], which the controller turns into a
//! [`TabIntent`] for the session.
//!
//! While the session is animating, intents are not replayed one by one. The
//! controller remembers only the selection the user ended up with and hands it
//! back once the animation settles.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabSignal {
    /// Tab became the sole selection after nothing was selected.
    FirstSelected(usize),
    /// Selection moved between tabs while the panel is open.
    SelectionChanged { from: usize, to: usize },
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIntent {
    Select(usize),
    Deselect,
}

impl TabIntent {
    /// The selection the strip shows once this intent is applied.
    pub fn selection(self) -> Option<usize> {
        match self {
            TabIntent::Select(index) => Some(index),
            TabIntent::Deselect => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TabSelectionController {
    // Outer `Some` means a selection is waiting for the animation to settle.
    pending: Option<Option<usize>>,
}

impl TabSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal produced by a click on `index`, given the strip's current
    /// selection.
    pub fn click(index: usize, current: Option<usize>) -> TabSignal {
        match current {
            None => TabSignal::FirstSelected(index),
            Some(selected) if selected == index => TabSignal::NothingSelected,
            Some(selected) => TabSignal::SelectionChanged {
                from: selected,
                to: index,
            },
        }
    }

    pub fn route(signal: TabSignal) -> TabIntent {
        match signal {
            TabSignal::FirstSelected(index) | TabSignal::SelectionChanged { to: index, .. } => {
                TabIntent::Select(index)
            }
            TabSignal::NothingSelected => TabIntent::Deselect,
        }
    }

    /// Remember `intent` until [`take_pending`](Self::take_pending); replaces
    /// anything deferred earlier.
    pub fn defer(&mut self, intent: TabIntent) {
        if let Some(previous) = self.pending.replace(intent.selection()) {
            tracing::debug!(
                dropped = ?previous,
                latest = ?intent.selection(),
                "superseded deferred tab selection"
            );
        }
    }

    pub fn pending(&self) -> Option<Option<usize>> {
        self.pending
    }

    pub fn take_pending(&mut self) -> Option<Option<usize>> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Selection the strip should display: a deferred selection wins over the
    /// session's settled one.
    pub fn displayed(&self, settled: Option<usize>) -> Option<usize> {
        self.pending.unwrap_or(settled)
    }
}
