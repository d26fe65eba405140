//! User actions driven against a live reconciler

use crate::integration::test_utils::{library, project, Rig};
use stacksnack::actions::{is_available, HideOutcome, HiderActions};
use stacksnack::frame::DisplayFrame;
use stacksnack::host::memory::MemoryFrame;
use stacksnack::host::DebugSession;
use stacksnack::settings::SettingsView;

fn vendored(id: u64) -> MemoryFrame {
    MemoryFrame::at(id, "/work/proj/third_party/attrs/_make.py", 7)
}

#[test]
fn test_toggle_on_filters_paused_session() {
    let rig = Rig::new(vec![project(1, "a"), library(2, "b"), project(3, "c")]);
    rig.settings.set_hide_enabled(false);
    rig.pause_and_settle();
    assert_eq!(rig.list.writes(), 0);

    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);
    assert!(actions.toggle_hiding(Some(&*rig.session as &dyn DebugSession<MemoryFrame>), true));
    rig.executor.run_until_idle();

    assert_eq!(rig.shape(), vec!["a", "[1]", "c"]);
    assert_eq!(rig.session.rebuilds(), 0);
}

#[test]
fn test_toggle_off_asks_session_to_rebuild() {
    let rig = Rig::new(vec![project(1, "a"), library(2, "b"), project(3, "c")]);
    rig.pause_and_settle();
    assert_eq!(rig.list.writes(), 1);

    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);
    assert!(actions.toggle_hiding(Some(&*rig.session as &dyn DebugSession<MemoryFrame>), false));
    rig.executor.run_until_idle();

    assert!(!rig.settings.hide_enabled());
    assert_eq!(rig.session.rebuilds(), 1);
    assert_eq!(rig.list.writes(), 1);
    assert!(rig.reconciler.cached_widget().is_none());
}

#[test]
fn test_toggle_without_session_only_flips_setting() {
    let rig = Rig::new(vec![project(1, "a")]);
    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);

    assert!(!actions.toggle_hiding(None, false));
    assert!(!rig.settings.hide_enabled());
    assert_eq!(rig.executor.pending(), 0);
}

#[test]
fn test_hiding_library_of_current_frame_collapses_it() {
    let rig = Rig::new(vec![project(1, "a"), vendored(2), project(3, "c")]);
    rig.session.set_current(Some(DisplayFrame::Frame(vendored(2))));
    rig.list.select(Some(1));
    rig.pause_and_settle();
    assert_eq!(rig.shape(), vec!["a", "_make", "c"]);

    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);
    let outcome = actions.hide_frames_from_library(&*rig.session).unwrap();
    assert_eq!(outcome, HideOutcome::Added("attrs".to_string()));

    rig.executor.run_until_idle();
    assert_eq!(rig.shape(), vec!["a", "[1]", "c"]);
    assert!(rig
        .settings
        .library_patterns()
        .contains(&"attrs".to_string()));
}

#[test]
fn test_added_pattern_waits_while_hiding_is_off() {
    let rig = Rig::new(vec![project(1, "a"), vendored(2)]);
    rig.settings.set_hide_enabled(false);
    rig.session.set_current(Some(DisplayFrame::Frame(vendored(2))));
    rig.pause_and_settle();

    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);
    assert_eq!(
        actions.hide_frames_from_library(&*rig.session),
        Ok(HideOutcome::Added("attrs".to_string()))
    );
    assert_eq!(rig.executor.pending(), 0);
    assert_eq!(rig.list.writes(), 0);
}

#[test]
fn test_library_frame_already_covered() {
    let rig = Rig::new(vec![library(1, "requests")]);
    rig.session
        .set_current(Some(DisplayFrame::Frame(library(1, "requests"))));

    let actions = HiderActions::new(&rig.settings, &*rig.reconciler);
    assert_eq!(
        actions.hide_frames_from_library(&*rig.session),
        Ok(HideOutcome::AlreadyListed("site-packages".to_string()))
    );
}

#[test]
fn test_availability_follows_session_state() {
    let rig = Rig::new(vec![project(1, "a")]);
    let session = Some(&*rig.session as &dyn DebugSession<MemoryFrame>);
    assert!(!is_available(session));

    rig.session
        .set_current(Some(DisplayFrame::Frame(project(1, "a"))));
    assert!(is_available(session));

    rig.session.set_paused(false);
    assert!(!is_available(session));
}
