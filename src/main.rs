use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal;
use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::Level;

use debug_overlay::constants::FRAME_INTERVAL;
use debug_overlay::debug_log::{DebugLogHandle, set_global_debug_log};
use debug_overlay::drag::DragTracker;
use debug_overlay::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use debug_overlay::event_loop::{ControlFlow, EventLoop, LoopEvent};
use debug_overlay::overlay_view::{self, HandleHit};
use debug_overlay::pages::{
    DirectoryShareable, DynPageFactory, KeyValuePageFactory, KeyValueStore, LogPageFactory,
    LogShareable, SharePageFactory, Shareable,
};
use debug_overlay::ui::UiFrame;
use debug_overlay::{
    OverlayConfig, OverlayError, OverlaySession, ScreenPosition, SessionState, Tab,
    TerminalSurfaceHost, tracing_sub,
};

const ICONS: [&str; 3] = ["KV", "Share", "Log"];

const APP_TEXT: &str = indoc! {"
    This screen stands in for the application being debugged.

    Drag the handle by its grip to move it. Click an icon to open that page,
    click it again to close the panel.

    Keys:
      1-9      click a tab icon
      Esc      close the panel
      h        hide or show the overlay
      q        quit
"};

#[derive(Parser, Debug)]
#[command(
    name = "debug-overlay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating debug overlay running over a placeholder terminal app",
    after_help = APP_TEXT
)]
struct Cli {
    /// Expand and collapse animation length.
    #[arg(long = "duration-ms", value_name = "MS", default_value_t = 200)]
    duration_ms: u64,

    /// Handle height in cells.
    #[arg(long = "handle-size", value_name = "CELLS", default_value_t = 3)]
    handle_size: u32,

    /// Rows kept free above the panel for a status bar.
    #[arg(long = "status-bar", value_name = "ROWS", default_value_t = 1)]
    status_bar: u32,

    /// Initial handle offset from the screen centre.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    x: i32,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    y: i32,

    /// Cells the pointer may travel on the grip before a press becomes a drag.
    #[arg(long = "drag-slop", value_name = "CELLS", default_value_t = 0)]
    drag_slop: u32,

    /// Frame interval of the event loop.
    #[arg(long = "frame-ms", value_name = "MS", default_value_t = FRAME_INTERVAL.as_millis() as u64)]
    frame_ms: u64,

    /// Most verbose level captured in the log page.
    #[arg(long = "log", value_name = "LEVEL", default_value_t = Level::DEBUG)]
    log: Level,

    /// Also offer a share target that writes into this directory.
    #[arg(long = "share-dir", value_name = "DIR")]
    share_dir: Option<PathBuf>,

    /// Refuse overlay surfaces, as a platform without the permission would.
    #[arg(long = "deny-overlay")]
    deny_overlay: bool,
}

impl Cli {
    fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

impl TryFrom<&Cli> for OverlayConfig {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.duration_ms > 5_000 {
            return Err("duration must be at most 5000 ms".to_string());
        }
        if !(1..=10).contains(&cli.handle_size) {
            return Err("handle size must be between 1 and 10 cells".to_string());
        }
        if !(1..=1_000).contains(&cli.frame_ms) {
            return Err("frame interval must be between 1 and 1000 ms".to_string());
        }
        Ok(OverlayConfig::default()
            .with_animation_duration(Duration::from_millis(cli.duration_ms))
            .with_handle_size(cli.handle_size)
            .with_status_bar_allowance(cli.status_bar)
            .with_default_position(ScreenPosition::new(cli.x, cli.y))
            .with_drag_slop(cli.drag_slop))
    }
}

type Session = OverlaySession<TerminalSurfaceHost, DynPageFactory>;

struct DemoApp {
    session: Session,
    tracker: DragTracker,
    store: KeyValueStore,
    errors: Vec<OverlayError>,
}

impl DemoApp {
    fn on_event(
        &mut self,
        event: LoopEvent,
        output: &mut ConsoleOutputDriver,
    ) -> io::Result<ControlFlow> {
        match event {
            LoopEvent::Tick => {
                self.session.tick();
                self.collect_errors();
                self.publish_state();
                self.draw(output)?;
            }
            LoopEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                return Ok(self.on_key(key));
            }
            LoopEvent::Input(Event::Mouse(mouse)) => self.on_mouse(mouse),
            LoopEvent::Input(Event::Resize(width, height)) => {
                self.session
                    .host_mut()
                    .set_area(Rect::new(0, 0, width, height));
            }
            LoopEvent::Input(_) => {}
        }
        Ok(ControlFlow::Continue)
    }

    fn on_key(&mut self, key: KeyEvent) -> ControlFlow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => return ControlFlow::Quit,
            KeyCode::Char('c') if ctrl => return ControlFlow::Quit,
            KeyCode::Char('h') => {
                if self.tracker.is_active() {
                    self.tracker.cancel();
                    note_rejection(self.session.on_drag_end());
                }
                let result = if self.session.is_visible() {
                    self.session.hide()
                } else {
                    self.session.show()
                };
                note_rejection(result);
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                note_rejection(self.session.on_tab_clicked(index));
            }
            KeyCode::Esc if self.session.state() == SessionState::Collapsed => {}
            KeyCode::Esc => note_rejection(self.session.on_no_tab_selected()),
            _ => {
                if let Some((_, page)) = self.session.content_mut() {
                    page.handle_event(&Event::Key(key));
                }
            }
        }
        ControlFlow::Continue
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let Some(handle_rect) = self.handle_rect() else {
            return;
        };
        if self.tracker.is_active() {
            if let Some(drag) = self.tracker.handle_mouse(&mouse, handle_rect) {
                note_rejection(self.session.on_drag_event(drag));
            }
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            match overlay_view::hit_test(handle_rect, &ICONS, mouse.column, mouse.row) {
                Some(HandleHit::Tab(index)) => {
                    note_rejection(self.session.on_tab_clicked(index));
                    return;
                }
                Some(HandleHit::Grip) if self.session.state() == SessionState::Collapsed => {
                    if let Some(drag) = self.tracker.handle_mouse(&mouse, handle_rect) {
                        note_rejection(self.session.on_drag_event(drag));
                    }
                    return;
                }
                Some(HandleHit::Grip) => return,
                None => {}
            }
        }
        if let Some((_, page)) = self.session.content_mut() {
            page.handle_event(&Event::Mouse(mouse));
        }
    }

    fn handle_rect(&self) -> Option<Rect> {
        if !self.session.is_visible() {
            return None;
        }
        let id = self.session.handle_surface()?;
        self.session.host().resolve(id)
    }

    fn collect_errors(&mut self) {
        self.errors.extend(self.session.take_errors());
    }

    fn publish_state(&self) {
        let session = &self.session;
        self.store
            .set("Session", "state", session.state().to_string());
        self.store
            .set("Session", "position", session.position().to_string());
        self.store.set(
            "Session",
            "last collapsed",
            session.last_collapsed_position().to_string(),
        );
        self.store
            .set("Session", "visible", session.is_visible().to_string());
        self.store
            .set("Session", "anomalies", self.errors.len().to_string());
    }

    fn draw(&mut self, output: &mut ConsoleOutputDriver) -> io::Result<()> {
        let surfaces: Vec<_> = self.session.host().visible_surfaces().collect();
        let handle = self.session.handle_surface();
        let selected = self.session.widget_selection();
        let dragging = self.session.machine().is_dragging();
        let session = &mut self.session;
        output.terminal_mut().draw(|frame| {
            let mut ui = UiFrame::new(frame);
            render_app(&mut ui);
            for (id, rect) in surfaces {
                if Some(id) == handle {
                    overlay_view::render_handle(&mut ui, rect, &ICONS, selected, dragging);
                } else if let Some((_, page)) = session.content_mut() {
                    let inner = overlay_view::render_panel(&mut ui, rect, page.title());
                    page.render(&mut ui, inner);
                } else {
                    overlay_view::render_panel(&mut ui, rect, "");
                }
            }
        })?;
        Ok(())
    }
}

fn render_app(ui: &mut UiFrame<'_>) {
    let area = ui.area();
    let block = Block::bordered()
        .title(" demo app ")
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(APP_TEXT)
        .block(block)
        .wrap(Wrap { trim: false });
    ui.render_widget(paragraph, area);
}

/// Rejected operations leave the session untouched; they only need a trace.
fn note_rejection(result: debug_overlay::Result<()>) {
    if let Err(err) = result {
        tracing::debug!(%err, "overlay input rejected");
    }
}

fn build_tabs(store: &KeyValueStore, log: &DebugLogHandle, cli: &Cli) -> Vec<Tab<DynPageFactory>> {
    let mut shareables: Vec<Box<dyn Shareable>> = vec![Box::new(LogShareable::new(log.clone()))];
    if let Some(dir) = &cli.share_dir {
        shareables.push(Box::new(DirectoryShareable::new(dir)));
    }
    let share = SharePageFactory::new(shareables, None, "Shared from debug-overlay");
    let factories: [DynPageFactory; 3] = [
        Box::new(KeyValuePageFactory::new(store.clone())),
        Box::new(share),
        Box::new(LogPageFactory::new(log.clone())),
    ];
    ICONS
        .iter()
        .zip(factories)
        .map(|(icon, factory)| Tab::new(*icon, factory))
        .collect()
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = match OverlayConfig::try_from(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("debug-overlay: {message}");
            std::process::exit(2);
        }
    };

    let log = DebugLogHandle::default();
    set_global_debug_log(log.clone());
    tracing_sub::init(cli.log);

    let store = KeyValueStore::new();
    store.set("Build", "version", env!("CARGO_PKG_VERSION"));
    store.set("Overlay", "handle size", config.handle_size.to_string());
    store.set(
        "Overlay",
        "animation",
        format!("{} ms", config.animation_duration.as_millis()),
    );

    let (width, height) = terminal::size()?;
    let host = TerminalSurfaceHost::new(Rect::new(0, 0, width, height))
        .with_wrap_width(overlay_view::natural_handle_width(&ICONS))
        .with_overlays_allowed(!cli.deny_overlay);
    let display = host.metrics();
    let tabs = build_tabs(&store, &log, &cli);
    let session = match OverlaySession::create(config, display, tabs, host) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("debug-overlay: {err}");
            std::process::exit(1);
        }
    };

    let mut app = DemoApp {
        session,
        tracker: DragTracker::with_slop(config.drag_slop),
        store,
        errors: Vec::new(),
    };
    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), cli.frame_interval());
    let result = event_loop.run(|event| app.on_event(event, &mut output));

    app.session.teardown();
    app.collect_errors();
    output.exit()?;
    for error in &app.errors {
        eprintln!("debug-overlay: {error}");
    }
    if app.session.host().len() != 0 {
        tracing::warn!(surfaces = app.session.host().len(), "surfaces left after teardown");
    }
    result
}
