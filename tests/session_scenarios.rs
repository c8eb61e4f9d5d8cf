mod common;

use std::time::Duration;

use common::{
    Call, CountingFactory, Journal, RecordingHost, creates, disposes, journal, take, two_tabs,
};
use debug_overlay::session::OverlaySession;
use debug_overlay::{
    DisplayMetrics, Extent, ManualClock, OverlayConfig, OverlayError, ScreenPosition,
    SessionState, SurfaceError, SurfaceId, SurfaceSize, SurfaceSpec, Tab,
};

type Session = OverlaySession<RecordingHost, CountingFactory, ManualClock>;

const HANDLE: SurfaceId = SurfaceId(1);
const PANEL: SurfaceId = SurfaceId(2);
const START: ScreenPosition = ScreenPosition::new(100, 400);
const PARKED: ScreenPosition = ScreenPosition::new(540, -960);

fn config() -> OverlayConfig {
    OverlayConfig::default().with_default_position(START)
}

fn display() -> DisplayMetrics {
    DisplayMetrics::new(1080, 1920)
}

fn open_with(
    journal: &Journal,
    host: RecordingHost,
    tabs: Vec<Tab<CountingFactory>>,
) -> (Session, ManualClock) {
    let clock = ManualClock::new();
    let session = OverlaySession::with_clock(config(), display(), tabs, host, clock.clone())
        .expect("session should open");
    take(journal);
    (session, clock)
}

fn open(journal: &Journal) -> (Session, ManualClock) {
    open_with(journal, RecordingHost::new(journal), two_tabs(journal))
}

/// Tick in 50 ms steps until no animation is left.
fn settle(session: &mut Session, clock: &ManualClock) {
    for _ in 0..100 {
        clock.advance(Duration::from_millis(50));
        if !session.tick() {
            return;
        }
    }
    panic!("animation never settled");
}

fn expanded_on(journal: &Journal, tab: usize) -> (Session, ManualClock) {
    let (mut session, clock) = open(journal);
    session.on_tab_selected(tab).unwrap();
    settle(&mut session, &clock);
    assert_eq!(session.state(), SessionState::Expanded { tab });
    take(journal);
    (session, clock)
}

fn position_of(calls: &[Call], wanted: &Call) -> usize {
    calls
        .iter()
        .position(|call| call == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} missing from {calls:?}"))
}

#[test]
fn creation_adds_translucent_wrap_content_handle() {
    let journal = journal();
    let clock = ManualClock::new();
    let session = OverlaySession::with_clock(
        config(),
        display(),
        two_tabs(&journal),
        RecordingHost::new(&journal),
        clock,
    )
    .unwrap();
    assert_eq!(
        take(&journal),
        vec![Call::Add(
            HANDLE,
            SurfaceSpec {
                size: SurfaceSize {
                    width: Extent::WrapContent,
                    height: Extent::Exact(53),
                },
                position: START,
                translucent: true,
            }
        )]
    );
    assert_eq!(session.state(), SessionState::Collapsed);
    assert_eq!(session.last_collapsed_position(), START);
    assert!(!session.has_panel());
}

#[test]
fn refused_handle_fails_creation() {
    let journal = journal();
    let result = OverlaySession::with_clock(
        config(),
        display(),
        two_tabs(&journal),
        RecordingHost::granting(&journal, 0),
        ManualClock::new(),
    );
    let Err(err) = result else {
        panic!("creation should fail without overlay permission");
    };
    assert_eq!(err, OverlayError::SurfaceCreation(SurfaceError::PermissionDenied));
}

#[test]
fn empty_tab_list_is_rejected() {
    let journal = journal();
    let result = OverlaySession::with_clock(
        config(),
        display(),
        Vec::<Tab<CountingFactory>>::new(),
        RecordingHost::new(&journal),
        ManualClock::new(),
    );
    assert!(matches!(result, Err(OverlayError::NoTabs)));
    assert!(take(&journal).is_empty());
}

#[test]
fn expand_parks_handle_then_opens_panel_with_first_tab() {
    let journal = journal();
    let (mut session, clock) = open(&journal);

    session.on_tab_selected(0).unwrap();
    assert_eq!(session.state(), SessionState::Expanding { tab: 0 });
    assert!(!session.has_panel());
    assert!(take(&journal).is_empty());

    clock.advance(Duration::from_millis(100));
    assert!(session.tick());
    assert_eq!(
        take(&journal),
        vec![Call::Move(HANDLE, ScreenPosition::new(320, -280))]
    );

    clock.advance(Duration::from_millis(100));
    assert!(!session.tick());
    assert_eq!(
        take(&journal),
        vec![
            Call::Move(HANDLE, PARKED),
            Call::Add(
                PANEL,
                SurfaceSpec {
                    size: SurfaceSize {
                        width: Extent::MatchParent,
                        height: Extent::Exact(1920 - 53 - 25),
                    },
                    position: ScreenPosition::new(0, 960),
                    translucent: true,
                }
            ),
            Call::Create { tab: 0, serial: 1 },
        ]
    );
    assert_eq!(session.state(), SessionState::Expanded { tab: 0 });
    assert_eq!(session.active_tab(), Some(0));
    assert_eq!(session.position(), PARKED);
    assert_eq!(session.last_collapsed_position(), START);
}

#[test]
fn switching_tabs_disposes_before_mounting_without_animation() {
    let journal = journal();
    let (mut session, _clock) = expanded_on(&journal, 0);

    session.on_tab_selected(1).unwrap();
    assert_eq!(
        take(&journal),
        vec![
            Call::Dispose { tab: 0, serial: 1 },
            Call::Create { tab: 1, serial: 1 },
        ]
    );
    assert_eq!(session.state(), SessionState::Expanded { tab: 1 });
    assert!(!session.is_animating());
    assert_eq!(session.position(), PARKED);
    assert_eq!(session.panel_surface(), Some(PANEL));
    assert_eq!(session.content_mut().map(|(tab, c)| (tab, c.serial)), Some((1, 1)));
}

#[test]
fn collapse_restores_position_and_disposes_once() {
    let journal = journal();
    let (mut session, clock) = expanded_on(&journal, 1);

    session.on_no_tab_selected().unwrap();
    assert_eq!(session.state(), SessionState::Collapsing { tab: 1 });
    assert!(session.has_panel());
    settle(&mut session, &clock);

    let calls = take(&journal);
    assert_eq!(disposes(&calls), vec![(1, 1)]);
    let dispose = position_of(&calls, &Call::Dispose { tab: 1, serial: 1 });
    let removal = position_of(&calls, &Call::Remove(PANEL));
    let arrival = position_of(&calls, &Call::Move(HANDLE, START));
    assert!(arrival < dispose && dispose < removal);

    assert_eq!(session.state(), SessionState::Collapsed);
    assert_eq!(session.position(), START);
    assert!(!session.has_panel());
    assert_eq!(session.active_tab(), None);
    assert_eq!(session.host().live(), 1);
}

#[test]
fn clicking_the_selected_tab_closes_the_panel() {
    let journal = journal();
    let (mut session, clock) = expanded_on(&journal, 0);
    session.on_tab_clicked(0).unwrap();
    assert_eq!(session.state(), SessionState::Collapsing { tab: 0 });
    settle(&mut session, &clock);
    assert_eq!(session.state(), SessionState::Collapsed);
}

#[test]
fn panel_exists_only_while_expanded_or_collapsing() {
    let journal = journal();
    let (mut session, clock) = open(&journal);
    session.on_tab_selected(0).unwrap();
    while session.is_animating() {
        assert!(!session.has_panel());
        clock.advance(Duration::from_millis(30));
        session.tick();
    }
    assert!(session.has_panel());
    session.on_no_tab_selected().unwrap();
    while session.is_animating() {
        assert!(session.has_panel());
        clock.advance(Duration::from_millis(30));
        session.tick();
    }
    assert!(!session.has_panel());
    let adds = take(&journal)
        .iter()
        .filter(|call| matches!(call, Call::Add(..)))
        .count();
    assert_eq!(adds, 1);
}

#[test]
fn drag_lands_on_start_plus_last_delta() {
    let journal = journal();
    let (mut session, clock) = open(&journal);

    session.on_drag_start().unwrap();
    for (dx, dy) in [(5, 5), (50, -20), (0, 0), (50, -20), (-7, 3)] {
        session.on_drag_delta(dx, dy).unwrap();
    }
    session.on_drag_end().unwrap();
    let dropped = ScreenPosition::new(93, 403);
    assert_eq!(session.position(), dropped);
    assert_eq!(session.last_collapsed_position(), dropped);
    assert_eq!(take(&journal).last(), Some(&Call::Move(HANDLE, dropped)));

    session.on_tab_selected(0).unwrap();
    settle(&mut session, &clock);
    session.on_no_tab_selected().unwrap();
    settle(&mut session, &clock);
    assert_eq!(session.position(), dropped);
}

#[test]
fn dragging_while_expanded_is_rejected() {
    let journal = journal();
    let (mut session, _clock) = expanded_on(&journal, 0);

    let err = session.on_drag_start().unwrap_err();
    assert_eq!(
        err,
        OverlayError::InvalidTransition {
            operation: "drag start",
            state: SessionState::Expanded { tab: 0 },
        }
    );
    assert!(session.on_drag_delta(10, 10).is_err());
    assert_eq!(session.position(), PARKED);
    assert_eq!(session.state(), SessionState::Expanded { tab: 0 });
    assert!(take(&journal).is_empty());
}

#[test]
fn delta_without_start_is_rejected() {
    let journal = journal();
    let (mut session, _clock) = open(&journal);
    assert!(matches!(
        session.on_drag_delta(3, 3),
        Err(OverlayError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.on_drag_end(),
        Err(OverlayError::InvalidTransition { .. })
    ));
    assert_eq!(session.position(), START);
}

#[test]
fn deselect_while_collapsed_is_rejected() {
    let journal = journal();
    let (mut session, _clock) = open(&journal);
    assert!(matches!(
        session.on_no_tab_selected(),
        Err(OverlayError::InvalidTransition { .. })
    ));
}

#[test]
fn unknown_tab_changes_nothing() {
    let journal = journal();
    let (mut session, _clock) = open(&journal);
    assert_eq!(
        session.on_tab_selected(5),
        Err(OverlayError::UnknownTab { index: 5, count: 2 })
    );
    assert_eq!(session.state(), SessionState::Collapsed);
}

#[test]
fn selections_during_animation_resolve_to_the_latest() {
    let journal = journal();
    let (mut session, clock) = open(&journal);

    session.on_tab_selected(0).unwrap();
    session.on_tab_selected(1).unwrap();
    session.on_no_tab_selected().unwrap();
    session.on_tab_selected(1).unwrap();
    assert_eq!(session.state(), SessionState::Expanding { tab: 0 });
    assert_eq!(session.widget_selection(), Some(1));

    settle(&mut session, &clock);
    let calls = take(&journal);
    assert_eq!(creates(&calls), vec![(0, 1), (1, 1)]);
    assert_eq!(disposes(&calls), vec![(0, 1)]);
    assert_eq!(session.state(), SessionState::Expanded { tab: 1 });
}

#[test]
fn deselect_during_expand_collapses_afterwards() {
    let journal = journal();
    let (mut session, clock) = open(&journal);

    session.on_tab_selected(0).unwrap();
    session.on_no_tab_selected().unwrap();
    assert_eq!(session.widget_selection(), None);
    settle(&mut session, &clock);

    let calls = take(&journal);
    assert_eq!(creates(&calls), vec![(0, 1)]);
    assert_eq!(disposes(&calls), vec![(0, 1)]);
    assert_eq!(session.state(), SessionState::Collapsed);
    assert_eq!(session.position(), START);
    assert!(!session.has_panel());
}

#[test]
fn selection_during_collapse_reopens() {
    let journal = journal();
    let (mut session, clock) = expanded_on(&journal, 0);

    session.on_no_tab_selected().unwrap();
    session.on_tab_selected(1).unwrap();
    settle(&mut session, &clock);

    let calls = take(&journal);
    assert_eq!(disposes(&calls), vec![(0, 1)]);
    assert_eq!(creates(&calls), vec![(1, 1)]);
    assert_eq!(session.state(), SessionState::Expanded { tab: 1 });
    assert_eq!(session.panel_surface(), Some(SurfaceId(3)));
}

#[test]
fn dispose_failure_does_not_block_panel_removal() {
    let journal = journal();
    let mut tabs = two_tabs(&journal);
    let mut failing = CountingFactory::new(1, &journal);
    failing.fail_dispose = true;
    tabs[1] = Tab::new("B", failing);
    let (mut session, clock) = open_with(&journal, RecordingHost::new(&journal), tabs);

    session.on_tab_selected(1).unwrap();
    settle(&mut session, &clock);
    session.on_no_tab_selected().unwrap();
    settle(&mut session, &clock);

    assert!(take(&journal).contains(&Call::Remove(PANEL)));
    assert!(!session.has_panel());
    let errors = session.take_errors();
    assert!(matches!(
        errors.as_slice(),
        [OverlayError::ContentDispose { tab: 1, .. }]
    ));
    assert!(session.take_errors().is_empty());
}

#[test]
fn content_creation_failure_leaves_an_empty_panel() {
    let journal = journal();
    let mut tabs = two_tabs(&journal);
    let mut failing = CountingFactory::new(0, &journal);
    failing.fail_create = true;
    tabs[0] = Tab::new("A", failing);
    let (mut session, clock) = open_with(&journal, RecordingHost::new(&journal), tabs);

    session.on_tab_selected(0).unwrap();
    settle(&mut session, &clock);
    assert_eq!(session.state(), SessionState::Expanded { tab: 0 });
    assert!(session.has_panel());
    assert_eq!(session.active_tab(), None);
    assert!(matches!(
        session.take_errors().as_slice(),
        [OverlayError::ContentCreate { tab: 0, .. }]
    ));

    session.on_no_tab_selected().unwrap();
    settle(&mut session, &clock);
    assert!(disposes(&take(&journal)).is_empty());
    assert!(!session.has_panel());
}

#[test]
fn panel_refusal_aborts_the_expand() {
    let journal = journal();
    let (mut session, clock) = open_with(
        &journal,
        RecordingHost::granting(&journal, 1),
        two_tabs(&journal),
    );

    session.on_tab_selected(0).unwrap();
    session.on_tab_selected(1).unwrap();
    settle(&mut session, &clock);

    let calls = take(&journal);
    assert!(creates(&calls).is_empty());
    assert_eq!(calls.last(), Some(&Call::Move(HANDLE, START)));
    assert_eq!(session.state(), SessionState::Collapsed);
    assert_eq!(session.position(), START);
    assert!(!session.has_panel());
    assert_eq!(
        session.take_errors(),
        vec![OverlayError::SurfaceCreation(SurfaceError::PermissionDenied)]
    );

    session.host_mut().grant(1);
    session.on_tab_selected(1).unwrap();
    settle(&mut session, &clock);
    assert_eq!(session.state(), SessionState::Expanded { tab: 1 });
}

#[test]
fn hide_and_show_keep_logical_state() {
    let journal = journal();
    let (mut session, _clock) = expanded_on(&journal, 0);

    session.hide().unwrap();
    session.hide().unwrap();
    assert_eq!(
        take(&journal),
        vec![Call::Visible(HANDLE, false), Call::Visible(PANEL, false)]
    );
    assert!(!session.is_visible());
    assert_eq!(session.state(), SessionState::Expanded { tab: 0 });

    session.show().unwrap();
    assert_eq!(
        take(&journal),
        vec![Call::Visible(HANDLE, true), Call::Visible(PANEL, true)]
    );
    assert_eq!(session.active_tab(), Some(0));
}

#[test]
fn panel_created_while_hidden_starts_hidden() {
    let journal = journal();
    let (mut session, clock) = open(&journal);
    session.hide().unwrap();
    assert_eq!(take(&journal), vec![Call::Visible(HANDLE, false)]);
    session.on_tab_selected(0).unwrap();
    settle(&mut session, &clock);

    let calls = take(&journal);
    let created = position_of(&calls, &Call::Create { tab: 0, serial: 1 });
    let hidden = position_of(&calls, &Call::Visible(PANEL, false));
    assert!(created < hidden);
    assert!(!calls.contains(&Call::Visible(HANDLE, false)));
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, Call::Visible(..)))
            .count(),
        1
    );
}

#[test]
fn teardown_releases_content_panel_then_handle() {
    let journal = journal();
    let (mut session, _clock) = expanded_on(&journal, 0);

    session.teardown();
    assert_eq!(
        take(&journal),
        vec![
            Call::Dispose { tab: 0, serial: 1 },
            Call::Remove(PANEL),
            Call::Remove(HANDLE),
        ]
    );
    assert!(session.is_torn_down());
    assert_eq!(session.host().live(), 0);

    session.teardown();
    assert!(take(&journal).is_empty());
    assert_eq!(session.on_tab_selected(0), Err(OverlayError::TornDown));
    assert_eq!(session.show(), Err(OverlayError::TornDown));
    assert!(!session.tick());
}

#[test]
fn teardown_mid_expand_only_removes_the_handle() {
    let journal = journal();
    let (mut session, clock) = open(&journal);
    session.on_tab_selected(0).unwrap();
    clock.advance(Duration::from_millis(50));
    session.tick();
    take(&journal);

    session.teardown();
    assert_eq!(take(&journal), vec![Call::Remove(HANDLE)]);
}

#[test]
fn teardown_mid_collapse_disposes_then_removes_panel() {
    let journal = journal();
    let (mut session, clock) = expanded_on(&journal, 1);
    session.on_no_tab_selected().unwrap();
    clock.advance(Duration::from_millis(50));
    session.tick();
    assert_eq!(session.state(), SessionState::Collapsing { tab: 1 });
    take(&journal);

    session.teardown();
    assert_eq!(
        take(&journal),
        vec![
            Call::Dispose { tab: 1, serial: 1 },
            Call::Remove(PANEL),
            Call::Remove(HANDLE),
        ]
    );
    drop(session);
    assert!(take(&journal).is_empty());
}

#[test]
fn dropping_the_session_tears_it_down() {
    let journal = journal();
    {
        let _session = expanded_on(&journal, 1);
    }
    assert_eq!(
        take(&journal),
        vec![
            Call::Dispose { tab: 1, serial: 1 },
            Call::Remove(PANEL),
            Call::Remove(HANDLE),
        ]
    );
}

#[test]
fn zero_duration_completes_on_the_first_tick() {
    let journal = journal();
    let clock = ManualClock::new();
    let mut session = OverlaySession::with_clock(
        config().with_animation_duration(Duration::ZERO),
        display(),
        two_tabs(&journal),
        RecordingHost::new(&journal),
        clock.clone(),
    )
    .unwrap();
    session.on_tab_selected(0).unwrap();
    assert!(!session.tick());
    assert_eq!(session.state(), SessionState::Expanded { tab: 0 });
    assert_eq!(session.position(), PARKED);
}
