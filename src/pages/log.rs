use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::{BoxedPage, PageView, ScrollOffset};
use crate::debug_log::DebugLogHandle;
use crate::page::{PageError, PageFactory};
use crate::ui::UiFrame;

/// Recent lines from the debug log. Sticks to the newest line until the user
/// scrolls away from the bottom.
pub struct LogPage {
    handle: DebugLogHandle,
    scroll: ScrollOffset,
    follow_tail: bool,
}

impl LogPage {
    pub fn new(handle: DebugLogHandle) -> Self {
        Self {
            handle,
            scroll: ScrollOffset::default(),
            follow_tail: true,
        }
    }

    pub fn is_following(&self) -> bool {
        self.follow_tail
    }
}

impl PageView for LogPage {
    fn title(&self) -> &str {
        "Log"
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lines = self.handle.tail(self.handle.len());
        if lines.is_empty() {
            let style = Style::default().fg(Color::DarkGray);
            frame.set_string(area.x, area.y, "Log is empty", style, area);
            return;
        }
        let view = usize::from(area.height);
        self.scroll.update(lines.len(), view);
        if self.follow_tail {
            self.scroll.scroll_to_bottom();
        }
        let visible = lines.iter().skip(self.scroll.offset()).take(view);
        for (y, line) in (area.y..).zip(visible) {
            frame.set_string(area.x, y, line, Style::default(), area);
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let handled = self.scroll.handle_event(event);
        if handled {
            self.follow_tail = self.scroll.is_at_bottom();
        }
        handled
    }
}

#[derive(Debug, Clone)]
pub struct LogPageFactory {
    handle: DebugLogHandle,
}

impl LogPageFactory {
    pub fn new(handle: DebugLogHandle) -> Self {
        Self { handle }
    }
}

impl PageFactory for LogPageFactory {
    type Content = BoxedPage;

    fn create_content(&mut self) -> Result<BoxedPage, PageError> {
        Ok(Box::new(LogPage::new(self.handle.clone())))
    }

    fn dispose_content(&mut self, mut content: BoxedPage) -> Result<(), PageError> {
        content.dispose()
    }
}
