//! Drawing and hit-testing for the handle and panel surfaces.
//!
//! The handle is a one-row strip, boxed when the surface is at least three
//! rows tall: a grip followed by one cell group per tab icon. Anything inside
//! the handle that is not a tab icon acts as the drag grip.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;

use crate::drag::rect_contains;
use crate::ui::UiFrame;

const GRIP: &str = " ≡ ";
const GRIP_WIDTH: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Grip,
    Tab(usize),
}

fn icon_width(icon: &str) -> u16 {
    u16::try_from(icon.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

fn boxed(rect: Rect) -> bool {
    rect.height >= 3 && rect.width >= 2
}

/// Width the handle needs to show the grip and every icon.
pub fn natural_handle_width<S: AsRef<str>>(icons: &[S]) -> u16 {
    icons
        .iter()
        .map(|icon| icon_width(icon.as_ref()))
        .fold(GRIP_WIDTH.saturating_add(2), u16::saturating_add)
}

/// Row and starting column of the strip inside the handle surface.
fn strip_origin(rect: Rect) -> (u16, u16) {
    if boxed(rect) {
        (rect.x.saturating_add(1), rect.y.saturating_add(1))
    } else {
        (rect.x, rect.y)
    }
}

/// Cell ranges of each tab icon, in tab order.
pub fn tab_rects<S: AsRef<str>>(rect: Rect, icons: &[S]) -> Vec<Rect> {
    let (mut x, y) = strip_origin(rect);
    x = x.saturating_add(GRIP_WIDTH);
    icons
        .iter()
        .map(|icon| {
            let width = icon_width(icon.as_ref());
            let tab = Rect::new(x, y, width, 1);
            x = x.saturating_add(width);
            tab
        })
        .collect()
}

pub fn hit_test<S: AsRef<str>>(rect: Rect, icons: &[S], column: u16, row: u16) -> Option<HandleHit> {
    if !rect_contains(rect, column, row) {
        return None;
    }
    let hit = tab_rects(rect, icons)
        .into_iter()
        .position(|tab| rect_contains(tab, column, row));
    Some(hit.map_or(HandleHit::Grip, HandleHit::Tab))
}

pub fn render_handle<S: AsRef<str>>(
    frame: &mut UiFrame<'_>,
    rect: Rect,
    icons: &[S],
    selected: Option<usize>,
    dragging: bool,
) {
    let border_style = if dragging {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let strip_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    frame.clear(rect);
    if boxed(rect) {
        frame.render_widget(Block::bordered().border_style(border_style), rect);
    }
    let (x, y) = strip_origin(rect);
    frame.set_string(x, y, GRIP, strip_style, rect);
    for (index, (tab, icon)) in tab_rects(rect, icons).into_iter().zip(icons).enumerate() {
        let style = if selected == Some(index) {
            selected_style
        } else {
            strip_style
        };
        let icon: &str = icon.as_ref();
        let label = format!(" {icon} ");
        frame.set_string(tab.x, tab.y, &label, style, rect);
    }
}

/// Draw the panel chrome and return the area left for page content.
pub fn render_panel(frame: &mut UiFrame<'_>, rect: Rect, title: &str) -> Rect {
    frame.clear(rect);
    let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    const ICONS: [&str; 2] = ["KV", "Share"];

    #[test]
    fn natural_width_counts_grip_and_icons() {
        // borders 2 + grip 3 + " KV " 4 + " Share " 7
        assert_eq!(natural_handle_width(&ICONS), 16);
    }

    #[test]
    fn hit_test_finds_tabs_and_grip() {
        let rect = Rect::new(10, 5, 16, 3);
        assert_eq!(hit_test(rect, &ICONS, 11, 6), Some(HandleHit::Grip));
        assert_eq!(hit_test(rect, &ICONS, 14, 6), Some(HandleHit::Tab(0)));
        assert_eq!(hit_test(rect, &ICONS, 18, 6), Some(HandleHit::Tab(1)));
        assert_eq!(hit_test(rect, &ICONS, 14, 5), Some(HandleHit::Grip));
        assert_eq!(hit_test(rect, &ICONS, 0, 0), None);
    }

    #[test]
    fn inline_handle_uses_first_row() {
        let rect = Rect::new(0, 0, 14, 1);
        assert_eq!(tab_rects(rect, &ICONS)[0], Rect::new(3, 0, 4, 1));
    }

    #[test]
    fn render_handle_highlights_selection() {
        let area = Rect::new(0, 0, 16, 3);
        let mut buffer = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            render_handle(&mut frame, area, &ICONS, Some(1), false);
        }
        let share = buffer.cell((9, 1)).unwrap();
        assert_eq!(share.symbol(), "S");
        assert_eq!(share.bg, Color::Blue);
        assert_eq!(buffer.cell((5, 1)).unwrap().bg, Color::DarkGray);
    }

    #[test]
    fn panel_content_area_is_inside_border() {
        let area = Rect::new(0, 0, 20, 6);
        let mut buffer = Buffer::empty(area);
        let inner = {
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            render_panel(&mut frame, area, "KV")
        };
        assert_eq!(inner, Rect::new(1, 1, 18, 4));
    }
}
