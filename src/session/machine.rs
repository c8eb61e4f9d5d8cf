//! Pure overlay state machine.
//!
//! [`SessionMachine::handle`] takes an input and the current time, updates the
//! logical state and returns the [`SurfaceCommand`]s the owner must execute, in
//! order. Nothing here touches a surface host or a page factory.

use std::fmt;
use std::time::Instant;

use crate::animation::Animation;
use crate::config::OverlayConfig;
use crate::error::{OverlayError, Result};
use crate::geometry::{DisplayMetrics, ScreenPosition};
use crate::surface::{Extent, SurfaceSize, SurfaceSpec};
use crate::tabs::{TabIntent, TabSelectionController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collapsed,
    /// Handle moving to its parked spot; the panel does not exist yet.
    Expanding { tab: usize },
    Expanded { tab: usize },
    /// Handle returning to its collapsed spot; the panel still shows `tab`.
    Collapsing { tab: usize },
}

impl SessionState {
    pub fn is_animating(self) -> bool {
        matches!(
            self,
            SessionState::Expanding { .. } | SessionState::Collapsing { .. }
        )
    }

    /// Tab whose content is mounted in this state.
    pub fn mounted_tab(self) -> Option<usize> {
        match self {
            SessionState::Expanded { tab } | SessionState::Collapsing { tab } => Some(tab),
            SessionState::Collapsed | SessionState::Expanding { .. } => None,
        }
    }

    /// Tab the strip shows as selected.
    pub fn selected_tab(self) -> Option<usize> {
        match self {
            SessionState::Expanding { tab } | SessionState::Expanded { tab } => Some(tab),
            SessionState::Collapsed | SessionState::Collapsing { .. } => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Collapsed => write!(f, "collapsed"),
            SessionState::Expanding { tab } => write!(f, "expanding to tab {tab}"),
            SessionState::Expanded { tab } => write!(f, "expanded on tab {tab}"),
            SessionState::Collapsing { tab } => write!(f, "collapsing from tab {tab}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    Show,
    Hide,
    DragStart,
    DragDelta { dx: i32, dy: i32 },
    DragEnd,
    SelectTab(usize),
    DeselectTab,
    Tick,
}

impl SessionInput {
    fn name(self) -> &'static str {
        match self {
            SessionInput::Show => "show",
            SessionInput::Hide => "hide",
            SessionInput::DragStart => "drag start",
            SessionInput::DragDelta { .. } => "drag delta",
            SessionInput::DragEnd => "drag end",
            SessionInput::SelectTab(_) => "tab selection",
            SessionInput::DeselectTab => "tab deselection",
            SessionInput::Tick => "tick",
        }
    }
}

/// Side effect requested by the machine. Executed in the order returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCommand {
    MoveHandle(ScreenPosition),
    CreatePanel(SurfaceSpec),
    Mount(usize),
    Dispose(usize),
    RemovePanel,
    /// Applies to the handle and, when present, the panel.
    SetVisible(bool),
    /// Panel only; the handle's visibility is left alone.
    SetPanelVisible(bool),
    RemoveHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Expand { tab: usize },
    Collapse { tab: usize },
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    config: OverlayConfig,
    display: DisplayMetrics,
    tab_count: usize,
    state: SessionState,
    position: ScreenPosition,
    last_collapsed: ScreenPosition,
    drag_origin: Option<ScreenPosition>,
    animation: Option<Animation<Transition>>,
    visible: bool,
    panel: bool,
    tabs: TabSelectionController,
}

impl SessionMachine {
    pub fn new(config: OverlayConfig, display: DisplayMetrics, tab_count: usize) -> Self {
        Self {
            config,
            display,
            tab_count,
            state: SessionState::Collapsed,
            position: config.default_position,
            last_collapsed: config.default_position,
            drag_origin: None,
            animation: None,
            visible: true,
            panel: false,
            tabs: TabSelectionController::new(),
        }
    }

    /// Spec for the collapsed handle surface at the default position.
    pub fn handle_spec(&self) -> SurfaceSpec {
        SurfaceSpec {
            size: SurfaceSize {
                width: Extent::WrapContent,
                height: Extent::Exact(self.config.handle_size),
            },
            position: self.position,
            translucent: true,
        }
    }

    pub fn panel_spec(&self) -> SurfaceSpec {
        SurfaceSpec {
            size: SurfaceSize {
                width: Extent::MatchParent,
                height: Extent::Exact(
                    self.display
                        .panel_height(self.config.handle_size, self.config.status_bar_allowance),
                ),
            },
            position: self.display.panel_position(),
            translucent: true,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn position(&self) -> ScreenPosition {
        self.position
    }

    pub fn last_collapsed_position(&self) -> ScreenPosition {
        self.last_collapsed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_panel(&self) -> bool {
        self.panel
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn display(&self) -> DisplayMetrics {
        self.display
    }

    pub fn tab_count(&self) -> usize {
        self.tab_count
    }

    /// Selection the tab strip should highlight right now.
    pub fn widget_selection(&self) -> Option<usize> {
        self.tabs.displayed(self.state.selected_tab())
    }

    pub fn handle(&mut self, input: SessionInput, now: Instant) -> Result<Vec<SurfaceCommand>> {
        let commands = match input {
            SessionInput::Show => self.set_visible(true),
            SessionInput::Hide => self.set_visible(false),
            SessionInput::DragStart => self.drag_start(input)?,
            SessionInput::DragDelta { dx, dy } => self.drag_delta(input, dx, dy)?,
            SessionInput::DragEnd => self.drag_end(input)?,
            SessionInput::SelectTab(index) => self.select_tab(index, now)?,
            SessionInput::DeselectTab => self.deselect_tab(input, now)?,
            SessionInput::Tick => self.tick(now),
        };
        Ok(commands)
    }

    fn reject(&self, input: SessionInput) -> OverlayError {
        OverlayError::InvalidTransition {
            operation: input.name(),
            state: self.state,
        }
    }

    fn set_visible(&mut self, visible: bool) -> Vec<SurfaceCommand> {
        if self.visible == visible {
            return Vec::new();
        }
        self.visible = visible;
        vec![SurfaceCommand::SetVisible(visible)]
    }

    fn drag_start(&mut self, input: SessionInput) -> Result<Vec<SurfaceCommand>> {
        if self.state != SessionState::Collapsed {
            return Err(self.reject(input));
        }
        self.drag_origin = Some(self.position);
        Ok(Vec::new())
    }

    fn drag_delta(&mut self, input: SessionInput, dx: i32, dy: i32) -> Result<Vec<SurfaceCommand>> {
        let origin = match (self.state, self.drag_origin) {
            (SessionState::Collapsed, Some(origin)) => origin,
            _ => return Err(self.reject(input)),
        };
        let next = origin.offset(dx, dy);
        if next == self.position {
            return Ok(Vec::new());
        }
        self.position = next;
        Ok(vec![SurfaceCommand::MoveHandle(next)])
    }

    fn drag_end(&mut self, input: SessionInput) -> Result<Vec<SurfaceCommand>> {
        if self.state != SessionState::Collapsed || self.drag_origin.take().is_none() {
            return Err(self.reject(input));
        }
        self.last_collapsed = self.position;
        tracing::debug!(position = %self.position, "handle dropped");
        Ok(Vec::new())
    }

    fn check_tab(&self, index: usize) -> Result<()> {
        if index < self.tab_count {
            Ok(())
        } else {
            Err(OverlayError::UnknownTab {
                index,
                count: self.tab_count,
            })
        }
    }

    fn select_tab(&mut self, index: usize, now: Instant) -> Result<Vec<SurfaceCommand>> {
        self.check_tab(index)?;
        match self.state {
            SessionState::Collapsed => Ok(self.begin_expand(index, now)),
            SessionState::Expanded { tab } if tab == index => Ok(self.begin_collapse(tab, now)),
            SessionState::Expanded { tab } => Ok(self.switch_tab(tab, index)),
            SessionState::Expanding { .. } | SessionState::Collapsing { .. } => {
                self.tabs.defer(TabIntent::Select(index));
                Ok(Vec::new())
            }
        }
    }

    fn deselect_tab(&mut self, input: SessionInput, now: Instant) -> Result<Vec<SurfaceCommand>> {
        match self.state {
            SessionState::Collapsed => Err(self.reject(input)),
            SessionState::Expanded { tab } => Ok(self.begin_collapse(tab, now)),
            SessionState::Expanding { .. } | SessionState::Collapsing { .. } => {
                self.tabs.defer(TabIntent::Deselect);
                Ok(Vec::new())
            }
        }
    }

    fn begin_expand(&mut self, tab: usize, now: Instant) -> Vec<SurfaceCommand> {
        // An unfinished drag ends where it got to.
        self.drag_origin = None;
        let target = self.display.parked_handle_position();
        tracing::debug!(tab, from = %self.position, to = %target, "expanding overlay");
        self.last_collapsed = self.position;
        self.state = SessionState::Expanding { tab };
        self.animation = Some(Animation::new(
            self.position,
            target,
            now,
            self.config.animation_duration,
            Transition::Expand { tab },
        ));
        Vec::new()
    }

    fn begin_collapse(&mut self, tab: usize, now: Instant) -> Vec<SurfaceCommand> {
        tracing::debug!(tab, from = %self.position, to = %self.last_collapsed, "collapsing overlay");
        self.state = SessionState::Collapsing { tab };
        self.animation = Some(Animation::new(
            self.position,
            self.last_collapsed,
            now,
            self.config.animation_duration,
            Transition::Collapse { tab },
        ));
        Vec::new()
    }

    fn switch_tab(&mut self, from: usize, to: usize) -> Vec<SurfaceCommand> {
        tracing::debug!(from, to, "switching tab");
        self.state = SessionState::Expanded { tab: to };
        vec![SurfaceCommand::Dispose(from), SurfaceCommand::Mount(to)]
    }

    /// Advance the running animation. The final frame lands on the target and
    /// is followed by the completion commands; nothing is emitted when idle.
    fn tick(&mut self, now: Instant) -> Vec<SurfaceCommand> {
        let Some(animation) = self.animation else {
            return Vec::new();
        };
        let frame = animation.sample(now);
        self.position = frame.position;
        let mut commands = vec![SurfaceCommand::MoveHandle(frame.position)];
        if frame.finished {
            self.animation = None;
            commands.extend(self.complete(animation.kind()));
        }
        commands
    }

    fn complete(&mut self, transition: Transition) -> Vec<SurfaceCommand> {
        match transition {
            Transition::Expand { tab } => {
                tracing::debug!(tab, "overlay expanded");
                self.state = SessionState::Expanded { tab };
                self.panel = true;
                let mut commands = vec![
                    SurfaceCommand::CreatePanel(self.panel_spec()),
                    SurfaceCommand::Mount(tab),
                ];
                if !self.visible {
                    commands.push(SurfaceCommand::SetPanelVisible(false));
                }
                commands
            }
            Transition::Collapse { tab } => {
                tracing::debug!(tab, "overlay collapsed");
                self.state = SessionState::Collapsed;
                self.panel = false;
                vec![SurfaceCommand::Dispose(tab), SurfaceCommand::RemovePanel]
            }
        }
    }

    /// Apply the selection deferred during the last animation, if any. Call
    /// after the completion commands of that animation have been executed.
    pub fn reconcile(&mut self, now: Instant) -> Vec<SurfaceCommand> {
        if self.animation.is_some() {
            return Vec::new();
        }
        let Some(desired) = self.tabs.take_pending() else {
            return Vec::new();
        };
        tracing::debug!(desired = ?desired, state = %self.state, "applying deferred tab selection");
        match (self.state, desired) {
            (SessionState::Expanded { tab }, None) => self.begin_collapse(tab, now),
            (SessionState::Expanded { tab }, Some(index)) if index != tab => {
                self.switch_tab(tab, index)
            }
            (SessionState::Collapsed, Some(index)) => self.begin_expand(index, now),
            _ => Vec::new(),
        }
    }

    /// Undo an expand whose panel could not be created: the handle jumps back
    /// to its collapsed spot and deferred selections are dropped.
    pub fn abort_expand(&mut self) -> Vec<SurfaceCommand> {
        tracing::debug!(state = %self.state, "aborting expand");
        self.animation = None;
        self.panel = false;
        self.state = SessionState::Collapsed;
        self.tabs.clear();
        self.position = self.last_collapsed;
        vec![SurfaceCommand::MoveHandle(self.position)]
    }

    /// Commands that release everything in dependency order: content, panel,
    /// handle.
    pub fn teardown(&mut self) -> Vec<SurfaceCommand> {
        let mut commands = Vec::new();
        if let Some(tab) = self.state.mounted_tab() {
            commands.push(SurfaceCommand::Dispose(tab));
        }
        if self.panel {
            commands.push(SurfaceCommand::RemovePanel);
        }
        commands.push(SurfaceCommand::RemoveHandle);
        self.animation = None;
        self.drag_origin = None;
        self.panel = false;
        self.tabs.clear();
        self.state = SessionState::Collapsed;
        commands
    }
}
