//! Debug pages shown inside the expanded panel.
//!
//! Each page is a [`PageView`] produced by a [`PageFactory`] whose content type
//! is [`BoxedPage`], so tabs of different kinds can share one session.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;

use crate::page::{PageError, PageFactory};
use crate::ui::UiFrame;

pub mod key_value;
pub mod log;
pub mod share;

pub use key_value::{
    KeyValuePage, KeyValuePageFactory, KeyValueStore, KvCategory, KvEntry, KvSubscription,
};
pub use log::{LogPage, LogPageFactory};
pub use share::{
    DirectoryShareable, LogShareable, ShareContext, ShareDescription, ShareOutcome, SharePage,
    SharePageFactory, ShareRequest, Shareable,
};

pub trait PageView {
    fn title(&self) -> &str;

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }

    /// Release whatever the page holds outside itself. Called once, right
    /// before the page is dropped.
    fn dispose(&mut self) -> Result<(), PageError> {
        Ok(())
    }
}

pub type BoxedPage = Box<dyn PageView>;

/// Factory type for panels that mix page kinds.
pub type DynPageFactory = Box<dyn PageFactory<Content = BoxedPage>>;

/// Vertical scroll position over a list of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOffset {
    offset: usize,
    total: usize,
    view: usize,
}

impl ScrollOffset {
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.view)
    }

    pub fn update(&mut self, total: usize, view: usize) {
        self.total = total;
        self.view = view;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        if delta.is_negative() {
            self.offset = self.offset.saturating_sub(delta.unsigned_abs());
        } else {
            self.offset = self
                .offset
                .saturating_add(delta.unsigned_abs())
                .min(self.max_offset());
        }
    }

    /// Arrow, page and home/end keys plus the mouse wheel.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let page = isize::try_from(self.view.max(1)).unwrap_or(isize::MAX);
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
                KeyCode::PageUp => self.scroll_by(-page),
                KeyCode::PageDown => self.scroll_by(page),
                KeyCode::Home => self.offset = 0,
                KeyCode::End => self.scroll_to_bottom(),
                _ => return false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_by(-3),
                MouseEventKind::ScrollDown => self.scroll_by(3),
                _ => return false,
            },
            _ => return false,
        }
        true
    }
}
