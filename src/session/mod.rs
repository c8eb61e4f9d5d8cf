//! The overlay session: a floating handle that expands into a tabbed panel.
//!
//! [`OverlaySession`] owns both surfaces, the registered tabs and whichever
//! content is mounted. Every public operation feeds a [`SessionInput`] to the
//! [`SessionMachine`] and executes the returned commands against the
//! [`SurfaceHost`] and the tabs' [`PageFactory`]s.
//!
//! Rejected operations return an error and change nothing. Failures while
//! executing commands (a host refusing a move, a factory failing to dispose)
//! never abort the remaining commands; they are logged and queued for the host
//! application, which drains them with [`OverlaySession::take_errors`].

mod machine;

pub use machine::{SessionInput, SessionMachine, SessionState, SurfaceCommand};

use crate::animation::{Clock, SystemClock};
use crate::config::OverlayConfig;
use crate::drag::DragEvent;
use crate::error::{OverlayError, Result};
use crate::geometry::{DisplayMetrics, ScreenPosition};
use crate::page::{PageFactory, Tab};
use crate::surface::{SurfaceHost, SurfaceId};
use crate::tabs::{TabIntent, TabSelectionController, TabSignal};

struct Mounted<C> {
    tab: usize,
    content: C,
}

pub struct OverlaySession<H: SurfaceHost, F: PageFactory, C: Clock = SystemClock> {
    host: H,
    clock: C,
    machine: SessionMachine,
    tabs: Vec<Tab<F>>,
    handle: Option<SurfaceId>,
    panel: Option<SurfaceId>,
    mounted: Option<Mounted<F::Content>>,
    errors: Vec<OverlayError>,
    torn_down: bool,
}

impl<H: SurfaceHost, F: PageFactory> OverlaySession<H, F, SystemClock> {
    pub fn create(
        config: OverlayConfig,
        display: DisplayMetrics,
        tabs: Vec<Tab<F>>,
        host: H,
    ) -> Result<Self> {
        Self::with_clock(config, display, tabs, host, SystemClock)
    }
}

impl<H: SurfaceHost, F: PageFactory, C: Clock> OverlaySession<H, F, C> {
    /// Create the session and its handle surface. A host refusal is returned as
    /// [`OverlayError::SurfaceCreation`].
    pub fn with_clock(
        config: OverlayConfig,
        display: DisplayMetrics,
        tabs: Vec<Tab<F>>,
        mut host: H,
        clock: C,
    ) -> Result<Self> {
        if tabs.is_empty() {
            return Err(OverlayError::NoTabs);
        }
        let machine = SessionMachine::new(config, display, tabs.len());
        let handle = host
            .add_surface(machine.handle_spec())
            .map_err(OverlayError::SurfaceCreation)?;
        tracing::debug!(
            surface = %handle,
            position = %machine.position(),
            tabs = tabs.len(),
            "overlay session created"
        );
        Ok(Self {
            host,
            clock,
            machine,
            tabs,
            handle: Some(handle),
            panel: None,
            mounted: None,
            errors: Vec::new(),
            torn_down: false,
        })
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn position(&self) -> ScreenPosition {
        self.machine.position()
    }

    pub fn last_collapsed_position(&self) -> ScreenPosition {
        self.machine.last_collapsed_position()
    }

    pub fn is_visible(&self) -> bool {
        self.machine.is_visible()
    }

    pub fn is_animating(&self) -> bool {
        self.machine.is_animating()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn has_panel(&self) -> bool {
        self.panel.is_some()
    }

    pub fn handle_surface(&self) -> Option<SurfaceId> {
        self.handle
    }

    pub fn panel_surface(&self) -> Option<SurfaceId> {
        self.panel
    }

    /// Tab whose content is currently mounted.
    pub fn active_tab(&self) -> Option<usize> {
        self.mounted.as_ref().map(|mounted| mounted.tab)
    }

    pub fn content_mut(&mut self) -> Option<(usize, &mut F::Content)> {
        self.mounted
            .as_mut()
            .map(|mounted| (mounted.tab, &mut mounted.content))
    }

    pub fn tabs(&self) -> &[Tab<F>] {
        &self.tabs
    }

    pub fn widget_selection(&self) -> Option<usize> {
        self.machine.widget_selection()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    /// Errors raised while executing surface and content commands since the
    /// last call.
    pub fn take_errors(&mut self) -> Vec<OverlayError> {
        std::mem::take(&mut self.errors)
    }

    pub fn show(&mut self) -> Result<()> {
        self.dispatch(SessionInput::Show)
    }

    pub fn hide(&mut self) -> Result<()> {
        self.dispatch(SessionInput::Hide)
    }

    pub fn on_drag_start(&mut self) -> Result<()> {
        self.dispatch(SessionInput::DragStart)
    }

    pub fn on_drag_delta(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.dispatch(SessionInput::DragDelta { dx, dy })
    }

    pub fn on_drag_end(&mut self) -> Result<()> {
        self.dispatch(SessionInput::DragEnd)
    }

    /// Route a tracker event. The final delta carried by `Ended` is applied
    /// before the gesture is closed.
    pub fn on_drag_event(&mut self, event: DragEvent) -> Result<()> {
        match event {
            DragEvent::Started => self.on_drag_start(),
            DragEvent::Moved { dx, dy } => self.on_drag_delta(dx, dy),
            DragEvent::Ended { dx, dy } => {
                self.on_drag_delta(dx, dy)?;
                self.on_drag_end()
            }
        }
    }

    pub fn on_tab_selected(&mut self, index: usize) -> Result<()> {
        self.dispatch(SessionInput::SelectTab(index))
    }

    pub fn on_no_tab_selected(&mut self) -> Result<()> {
        self.dispatch(SessionInput::DeselectTab)
    }

    pub fn on_tab_signal(&mut self, signal: TabSignal) -> Result<()> {
        match TabSelectionController::route(signal) {
            TabIntent::Select(index) => self.on_tab_selected(index),
            TabIntent::Deselect => self.on_no_tab_selected(),
        }
    }

    /// A click on the strip icon for `index`; clicking the selected tab closes
    /// the panel.
    pub fn on_tab_clicked(&mut self, index: usize) -> Result<()> {
        let signal = TabSelectionController::click(index, self.widget_selection());
        tracing::debug!(?signal, "tab strip click");
        self.on_tab_signal(signal)
    }

    /// Advance any running animation to the clock's current time. Returns
    /// whether an animation is still running afterwards.
    pub fn tick(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let was_animating = self.machine.is_animating();
        let now = self.clock.now();
        // Ticks are accepted in every state.
        if let Ok(commands) = self.machine.handle(SessionInput::Tick, now) {
            self.execute(commands);
        }
        if was_animating && !self.machine.is_animating() {
            let follow_up = self.machine.reconcile(now);
            self.execute(follow_up);
        }
        self.machine.is_animating()
    }

    /// Dispose mounted content, then remove the panel and the handle. Calling
    /// it again does nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let commands = self.machine.teardown();
        self.execute(commands);
        self.torn_down = true;
        tracing::debug!("overlay session torn down");
    }

    fn dispatch(&mut self, input: SessionInput) -> Result<()> {
        if self.torn_down {
            return Err(OverlayError::TornDown);
        }
        let now = self.clock.now();
        let commands = self.machine.handle(input, now)?;
        self.execute(commands);
        Ok(())
    }

    fn report(&mut self, error: OverlayError) {
        tracing::warn!(%error, "overlay anomaly");
        self.errors.push(error);
    }

    fn execute(&mut self, commands: Vec<SurfaceCommand>) {
        let mut queue = commands.into_iter();
        while let Some(command) = queue.next() {
            match command {
                SurfaceCommand::MoveHandle(position) => {
                    if let Some(handle) = self.handle
                        && let Err(err) = self.host.update_position(handle, position)
                    {
                        self.report(err.into());
                    }
                }
                SurfaceCommand::CreatePanel(spec) => match self.host.add_surface(spec) {
                    Ok(panel) => {
                        tracing::debug!(surface = %panel, "panel created");
                        self.panel = Some(panel);
                    }
                    Err(err) => {
                        self.report(OverlayError::SurfaceCreation(err));
                        // Nothing queued after the panel can run without it.
                        let recovery = self.machine.abort_expand();
                        queue = recovery.into_iter();
                    }
                },
                SurfaceCommand::Mount(tab) => self.mount(tab),
                SurfaceCommand::Dispose(tab) => self.dispose(tab),
                SurfaceCommand::RemovePanel => {
                    if let Some(panel) = self.panel.take() {
                        tracing::debug!(surface = %panel, "removing panel");
                        if let Err(err) = self.host.remove_surface(panel) {
                            self.report(err.into());
                        }
                    }
                }
                SurfaceCommand::SetVisible(visible) => {
                    for surface in self.handle.into_iter().chain(self.panel) {
                        if let Err(err) = self.host.set_visible(surface, visible) {
                            self.report(err.into());
                        }
                    }
                }
                SurfaceCommand::SetPanelVisible(visible) => {
                    if let Some(panel) = self.panel
                        && let Err(err) = self.host.set_visible(panel, visible)
                    {
                        self.report(err.into());
                    }
                }
                SurfaceCommand::RemoveHandle => {
                    if let Some(handle) = self.handle.take()
                        && let Err(err) = self.host.remove_surface(handle)
                    {
                        self.report(err.into());
                    }
                }
            }
        }
    }

    fn mount(&mut self, tab: usize) {
        if let Some(stale) = self.mounted.take() {
            // Never keep two contents alive.
            self.release(stale);
        }
        let Some(entry) = self.tabs.get_mut(tab) else {
            return;
        };
        match entry.factory_mut().create_content() {
            Ok(content) => {
                tracing::debug!(tab, icon = entry.icon(), "content mounted");
                self.mounted = Some(Mounted { tab, content });
            }
            Err(source) => self.report(OverlayError::ContentCreate { tab, source }),
        }
    }

    fn dispose(&mut self, tab: usize) {
        match self.mounted.take() {
            Some(mounted) if mounted.tab == tab => self.release(mounted),
            Some(other) => {
                tracing::warn!(
                    expected = tab,
                    mounted = other.tab,
                    "dispose for a tab that is not mounted"
                );
                self.release(other);
            }
            None => {}
        }
    }

    fn release(&mut self, mounted: Mounted<F::Content>) {
        let Mounted { tab, content } = mounted;
        let Some(entry) = self.tabs.get_mut(tab) else {
            return;
        };
        match entry.factory_mut().dispose_content(content) {
            Ok(()) => tracing::debug!(tab, "content disposed"),
            Err(source) => self.report(OverlayError::ContentDispose { tab, source }),
        }
    }
}

impl<H: SurfaceHost, F: PageFactory, C: Clock> Drop for OverlaySession<H, F, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
