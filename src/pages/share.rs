//! Share targets: anything that can take a message and an optional attachment
//! off the device, plus the page that lists them.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

use super::{BoxedPage, PageView};
use crate::debug_log::DebugLogHandle;
use crate::page::{PageError, PageFactory};
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDescription {
    pub label: String,
    pub icon: String,
}

impl ShareDescription {
    pub fn new(label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Success,
    Failed(String),
    Cancelled,
}

/// Collects what a [`Shareable`] reports while it runs.
#[derive(Debug, Default)]
pub struct ShareContext {
    progress_visible: bool,
    outcome: Option<ShareOutcome>,
}

impl ShareContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress_visible(&mut self, visible: bool) {
        self.progress_visible = visible;
    }

    pub fn is_progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn succeed(&mut self) {
        self.finish(ShareOutcome::Success);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.finish(ShareOutcome::Failed(message.into()));
    }

    pub fn cancel(&mut self) {
        self.finish(ShareOutcome::Cancelled);
    }

    /// The first reported outcome wins.
    fn finish(&mut self, outcome: ShareOutcome) {
        self.progress_visible = false;
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    pub fn outcome(&self) -> Option<&ShareOutcome> {
        self.outcome.as_ref()
    }
}

pub trait Shareable {
    fn description(&self) -> ShareDescription;

    /// Must report an outcome on `context` before returning.
    fn share(&self, context: &mut ShareContext, attachment: Option<&Path>, message: &str);
}

/// Writes the message, and the attachment path if any, to the debug log.
#[derive(Debug, Clone)]
pub struct LogShareable {
    log: DebugLogHandle,
}

impl LogShareable {
    pub fn new(log: DebugLogHandle) -> Self {
        Self { log }
    }
}

impl Shareable for LogShareable {
    fn description(&self) -> ShareDescription {
        ShareDescription::new("Debug log", "LOG")
    }

    fn share(&self, context: &mut ShareContext, attachment: Option<&Path>, message: &str) {
        self.log.push(format!("[share] {message}"));
        if let Some(path) = attachment {
            self.log.push(format!("[share] attachment: {}", path.display()));
        }
        context.succeed();
    }
}

/// Drops `message.txt` and a copy of the attachment into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryShareable {
    dir: PathBuf,
}

impl DirectoryShareable {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, attachment: Option<&Path>, message: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join("message.txt"), message)?;
        if let Some(path) = attachment {
            let name = path.file_name().unwrap_or(path.as_os_str());
            fs::copy(path, self.dir.join(name))?;
        }
        Ok(())
    }
}

impl Shareable for DirectoryShareable {
    fn description(&self) -> ShareDescription {
        ShareDescription::new(format!("Save to {}", self.dir.display()), "DIR")
    }

    fn share(&self, context: &mut ShareContext, attachment: Option<&Path>, message: &str) {
        context.set_progress_visible(true);
        match self.write(attachment, message) {
            Ok(()) => context.succeed(),
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), %err, "share to directory failed");
                context.fail(err.to_string());
            }
        }
    }
}

/// Share request shared by every page a [`SharePageFactory`] creates.
pub struct ShareRequest {
    pub shareables: Vec<Box<dyn Shareable>>,
    pub attachment: Option<PathBuf>,
    pub message: String,
}

pub struct SharePage {
    request: Rc<ShareRequest>,
    selected: usize,
    last: Option<(String, ShareOutcome)>,
}

impl SharePage {
    pub fn new(request: Rc<ShareRequest>) -> Self {
        Self {
            request,
            selected: 0,
            last: None,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn last_outcome(&self) -> Option<&ShareOutcome> {
        self.last.as_ref().map(|(_, outcome)| outcome)
    }

    /// Run the selected target and remember how it went.
    pub fn share_selected(&mut self) -> Option<&ShareOutcome> {
        let shareable = self.request.shareables.get(self.selected)?;
        let label = shareable.description().label;
        let mut context = ShareContext::new();
        shareable.share(
            &mut context,
            self.request.attachment.as_deref(),
            &self.request.message,
        );
        let outcome = context
            .outcome()
            .cloned()
            .unwrap_or_else(|| ShareOutcome::Failed("no outcome reported".to_string()));
        tracing::debug!(shareable = %label, ?outcome, "share finished");
        self.last = Some((label, outcome));
        self.last_outcome()
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.request.shareables.len();
        if count == 0 {
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(count - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }
}

impl PageView for SharePage {
    fn title(&self) -> &str {
        "Share"
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let dim = Style::default().fg(Color::DarkGray);
        if self.request.shareables.is_empty() {
            frame.set_string(area.x, area.y, "No share targets", dim, area);
            return;
        }
        let highlight = Style::default().add_modifier(Modifier::REVERSED);
        let mut y = area.y;
        for (index, shareable) in self.request.shareables.iter().enumerate() {
            let description = shareable.description();
            let style = if index == self.selected {
                highlight
            } else {
                Style::default()
            };
            let text = format!("[{}] {}", description.icon, description.label);
            frame.set_string(area.x, y, &text, style, area);
            y = y.saturating_add(1);
        }
        if let Some((label, outcome)) = &self.last {
            let (text, style) = match outcome {
                ShareOutcome::Success => (
                    format!("{label}: shared"),
                    Style::default().fg(Color::Green),
                ),
                ShareOutcome::Failed(reason) => (
                    format!("{label}: failed: {reason}"),
                    Style::default().fg(Color::Red),
                ),
                ShareOutcome::Cancelled => (format!("{label}: cancelled"), dim),
            };
            frame.set_string(area.x, y.saturating_add(1), &text, style, area);
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind == KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Enter => {
                self.share_selected();
            }
            _ => return false,
        }
        true
    }
}

pub struct SharePageFactory {
    request: Rc<ShareRequest>,
}

impl SharePageFactory {
    pub fn new(
        shareables: Vec<Box<dyn Shareable>>,
        attachment: Option<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request: Rc::new(ShareRequest {
                shareables,
                attachment,
                message: message.into(),
            }),
        }
    }
}

impl PageFactory for SharePageFactory {
    type Content = BoxedPage;

    fn create_content(&mut self) -> Result<BoxedPage, PageError> {
        Ok(Box::new(SharePage::new(Rc::clone(&self.request))))
    }

    fn dispose_content(&mut self, mut content: BoxedPage) -> Result<(), PageError> {
        content.dispose()
    }
}
