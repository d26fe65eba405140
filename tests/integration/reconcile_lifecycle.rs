//! Reconciliation lifecycle: triggers, retries, the update guard and disposal

use crate::integration::test_utils::{library, panel_with, project, Rig, STEP};
use stacksnack::config::ReconcileConfig;
use stacksnack::frame::DisplayFrame;
use stacksnack::host::memory::{MemoryComponent, MemoryList, MemoryToolWindow};
use stacksnack::host::{HostEvent, PanelId, TabId};
use stacksnack::reconcile::PassState;
use stacksnack::widget::{ListChange, ListWidget};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

fn abcd() -> Vec<stacksnack::host::memory::MemoryFrame> {
    vec![
        project(1, "a"),
        library(2, "b"),
        library(3, "c"),
        project(4, "d"),
    ]
}

#[test]
fn test_library_run_collapses_and_selection_follows_frame() {
    let rig = Rig::new(abcd());
    rig.session.set_current(Some(DisplayFrame::Frame(project(4, "d"))));
    rig.list.select(Some(3));

    rig.pause_and_settle();

    assert_eq!(rig.shape(), vec!["a", "[2]", "d"]);
    assert_eq!(rig.list.selected_index(), Some(2));
    assert_eq!(rig.list.scrolled_to(), Some(2));
    assert_eq!(rig.reconciler.state(), PassState::Idle);
    assert_eq!(rig.reconciler.retry_count(), 0);
}

#[test]
fn test_collapsed_current_frame_leaves_selection_alone() {
    let rig = Rig::new(abcd());
    rig.session.set_current(Some(DisplayFrame::Frame(library(2, "b"))));
    rig.list.select(Some(0));

    rig.pause_and_settle();

    assert_eq!(rig.shape(), vec!["a", "[2]", "d"]);
    assert_eq!(rig.list.selected_index(), Some(0));
    assert_eq!(rig.list.scrolled_to(), None);
}

#[test]
fn test_already_filtered_list_is_unchanged() {
    let list = Rc::new(MemoryList::new(vec![
        DisplayFrame::hidden(3).unwrap(),
        DisplayFrame::Frame(project(5, "e")),
    ]));
    let rig = Rig::with_list(list, ReconcileConfig::default());

    rig.pause_and_settle();

    assert_eq!(rig.shape(), vec!["[3]", "e"]);
}

#[test]
fn test_pass_runs_after_retry_delay() {
    let rig = Rig::new(abcd());
    rig.reconciler.handle(HostEvent::Paused);

    assert_eq!(rig.executor.advance(STEP - Duration::from_millis(1)), 0);
    assert_eq!(rig.list.writes(), 0);
    assert_eq!(rig.executor.advance(Duration::from_millis(1)), 1);
    assert_eq!(rig.list.writes(), 1);
}

#[test]
fn test_retry_bound_stops_after_ten_attempts() {
    let empty = Rc::new(MemoryList::of_frames(Vec::new()));
    let rig = Rig::with_list(empty, ReconcileConfig::default());

    rig.pause_and_settle();

    let stats = rig.reconciler.stats();
    assert_eq!(stats.failed_attempts, 10);
    assert_eq!(stats.passes, 10);
    assert_eq!(stats.gave_up, 1);
    assert_eq!(rig.reconciler.retry_count(), 0);
    assert_eq!(rig.reconciler.state(), PassState::Idle);
    assert_eq!(rig.executor.pending(), 0);
    assert_eq!(rig.executor.now(), STEP * 10);

    // A fresh trigger gets a fresh budget
    rig.reconciler.handle(HostEvent::SettingsChanged);
    rig.executor.run_until_idle();
    assert_eq!(rig.reconciler.stats().failed_attempts, 20);
    assert_eq!(rig.reconciler.stats().gave_up, 2);
}

#[test]
fn test_retry_bound_follows_config() {
    let empty = Rc::new(MemoryList::of_frames(Vec::new()));
    let config = ReconcileConfig {
        max_retries: 3,
        ..ReconcileConfig::default()
    };
    let rig = Rig::with_list(empty, config);

    rig.pause_and_settle();
    assert_eq!(rig.reconciler.stats().failed_attempts, 3);
}

#[test]
fn test_list_appearing_during_retries_is_found() {
    let rig = Rig::new(abcd());
    let content = MemoryComponent::panel(Vec::new());
    rig.window.add_tab(TabId(2), content.clone());
    rig.window.select_tab(TabId(2));

    rig.reconciler.handle(HostEvent::Paused);
    rig.executor.advance(STEP * 3);
    assert_eq!(rig.reconciler.retry_count(), 3);

    content.add_child(panel_with(&rig.list));
    rig.executor.run_until_idle();

    assert_eq!(rig.shape(), vec!["a", "[2]", "d"]);
    assert_eq!(rig.reconciler.retry_count(), 0);
    assert_eq!(rig.reconciler.stats().gave_up, 0);
}

#[test]
fn test_trigger_during_pass_runs_strictly_after_it() {
    let rig = Rig::new(abcd());
    let writes_at = Rc::new(RefCell::new(Vec::new()));
    let seen_running = Rc::new(Cell::new(false));
    let fired = Rc::new(Cell::new(false));

    let reconciler = Rc::downgrade(&rig.reconciler);
    let executor = Rc::clone(&rig.executor);
    let log = Rc::clone(&writes_at);
    let running = Rc::clone(&seen_running);
    let once = Rc::clone(&fired);
    rig.list.add_change_listener(Rc::new(move |change| {
        if change != ListChange::ContentsChanged {
            return;
        }
        log.borrow_mut().push(executor.now());
        let Some(reconciler) = reconciler.upgrade() else {
            return;
        };
        if !once.replace(true) {
            running.set(reconciler.state() == PassState::Running);
            reconciler.handle(HostEvent::StackFrameChanged);
        }
    }));

    rig.pause_and_settle();

    assert!(seen_running.get());
    assert_eq!(rig.reconciler.stats().deferred, 1);
    assert_eq!(rig.reconciler.stats().passes, 2);
    // First pass at 10ms; the deferred trigger waits out the 50ms backoff,
    // then the usual 10ms delay.
    assert_eq!(
        *writes_at.borrow(),
        vec![Duration::from_millis(10), Duration::from_millis(70)]
    );
    assert!(!rig.reconciler.is_updating());
}

#[test]
fn test_rejected_write_drops_cache_without_retry() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();
    assert!(rig.reconciler.cached_widget().is_some());

    rig.list.set_reject_writes(true);
    rig.reconciler.handle(HostEvent::StackFrameChanged);
    rig.executor.run_until_idle();

    assert!(rig.reconciler.cached_widget().is_none());
    assert!(!rig.reconciler.is_listening());
    assert_eq!(rig.reconciler.stats().failed_attempts, 0);
    assert_eq!(rig.executor.pending(), 0);

    rig.list.set_reject_writes(false);
    rig.reconciler.handle(HostEvent::SettingsChanged);
    rig.executor.run_until_idle();
    assert!(rig.reconciler.cached_widget().is_some());
}

#[test]
fn test_host_panic_releases_guard() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();

    rig.list.poison();
    rig.reconciler.handle(HostEvent::StackFrameChanged);
    rig.executor.run_until_idle();

    assert!(!rig.reconciler.is_updating());
    assert_eq!(rig.reconciler.state(), PassState::Idle);
    assert_eq!(rig.reconciler.stats().unexpected_failures, 1);
    assert!(rig.reconciler.cached_widget().is_none());
    assert_eq!(rig.list.listener_count(), 0);
}

#[test]
fn test_services_panel_preferred_when_visible() {
    let rig = Rig::new(abcd());
    let services_list = Rc::new(MemoryList::of_frames(vec![
        library(10, "x"),
        project(11, "y"),
    ]));
    let services = MemoryToolWindow::new();
    services.add_tab(TabId(9), panel_with(&services_list));
    rig.host.set_tool_window(PanelId::Services, Rc::clone(&services));

    rig.pause_and_settle();
    assert_eq!(
        list_shape(&services_list),
        vec!["[1]".to_string(), "y".to_string()]
    );
    assert_eq!(rig.list.writes(), 0);

    services.set_visible(false);
    rig.reconciler.handle(HostEvent::SettingsChanged);
    rig.executor.run_until_idle();
    assert_eq!(rig.shape(), vec!["a", "[2]", "d"]);
}

fn list_shape(list: &MemoryList<stacksnack::host::memory::MemoryFrame>) -> Vec<String> {
    crate::integration::test_utils::shape(&list.entries())
}

#[test]
fn test_no_visible_panel_aborts_without_penalty() {
    let rig = Rig::new(abcd());
    rig.window.set_visible(false);

    rig.pause_and_settle();

    assert_eq!(rig.reconciler.stats().passes, 1);
    assert_eq!(rig.reconciler.stats().failed_attempts, 0);
    assert_eq!(rig.list.writes(), 0);
}

#[test]
fn test_no_session_resets_and_idles() {
    let rig = Rig::new(abcd());
    rig.host.set_session(None);

    rig.pause_and_settle();

    assert_eq!(rig.reconciler.retry_count(), 0);
    assert_eq!(rig.list.writes(), 0);
    assert_eq!(rig.executor.pending(), 0);
}

#[test]
fn test_tab_change_targets_new_list() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();

    let second = Rc::new(MemoryList::of_frames(vec![project(20, "p"), library(21, "q")]));
    rig.window.add_tab(TabId(2), panel_with(&second));
    rig.window.select_tab(TabId(2));
    rig.reconciler.handle(HostEvent::TabSelectionChanged(TabId(2)));
    rig.executor.run_until_idle();

    assert_eq!(list_shape(&second), vec!["p".to_string(), "[1]".to_string()]);
    let cached = rig.reconciler.cached_widget().unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(rig.list.listener_count(), 0);
    assert_eq!(second.listener_count(), 1);
}

#[test]
fn test_cached_list_from_other_tab_is_not_reused() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();
    assert_eq!(rig.list.writes(), 1);

    // Tab switch with no tab event; the next trigger must not refilter the old list.
    let second = Rc::new(MemoryList::of_frames(vec![project(20, "p"), library(21, "q")]));
    rig.window.add_tab(TabId(2), panel_with(&second));
    rig.window.select_tab(TabId(2));
    rig.reconciler.handle(HostEvent::StackFrameChanged);
    rig.executor.run_until_idle();

    assert_eq!(rig.list.writes(), 1);
    assert_eq!(second.writes(), 1);
    assert_eq!(list_shape(&second), vec!["p".to_string(), "[1]".to_string()]);
    assert_eq!(rig.list.listener_count(), 0);
    assert_eq!(second.listener_count(), 1);
}

#[test]
fn test_resume_and_stop_invalidate() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();
    assert!(rig.reconciler.is_listening());

    rig.reconciler.handle(HostEvent::Resumed);
    assert!(rig.reconciler.cached_widget().is_none());
    assert!(!rig.reconciler.is_listening());

    rig.reconciler.handle(HostEvent::Stopped);
    rig.reconciler.handle(HostEvent::StackFrameChanged);
    assert_eq!(rig.executor.pending(), 0);
}

#[test]
fn test_force_refresh_runs_immediately() {
    let rig = Rig::new(abcd());
    rig.reconciler.attach_session();
    rig.reconciler.force_refresh();

    assert_eq!(rig.executor.advance(Duration::ZERO), 1);
    assert_eq!(rig.shape(), vec!["a", "[2]", "d"]);
}

#[test]
fn test_dispose_cancels_timers_and_detaches() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();
    assert_eq!(rig.list.listener_count(), 1);

    rig.reconciler.handle(HostEvent::SettingsChanged);
    assert_eq!(rig.executor.pending(), 1);

    rig.reconciler.dispose();
    assert_eq!(rig.executor.pending(), 0);
    assert_eq!(rig.list.listener_count(), 0);

    rig.reconciler.handle(HostEvent::Paused);
    assert_eq!(rig.executor.pending(), 0);
}

#[test]
fn test_dropping_reconciler_cancels_pending_pass() {
    let rig = Rig::new(abcd());
    rig.reconciler.handle(HostEvent::Paused);
    assert_eq!(rig.executor.pending(), 1);

    let Rig {
        executor,
        list,
        reconciler,
        ..
    } = rig;
    drop(reconciler);

    assert_eq!(executor.pending(), 0);
    assert_eq!(list.writes(), 0);
}

#[test]
fn test_hidden_list_is_never_matched() {
    let rig = Rig::new(abcd());
    rig.list.set_showing(false);

    rig.pause_and_settle();

    assert_eq!(rig.list.writes(), 0);
    assert_eq!(rig.reconciler.stats().gave_up, 1);
}

#[test]
fn test_placeholders_render_muted_after_pass() {
    let rig = Rig::new(abcd());
    rig.pause_and_settle();

    let rows = rig.list.render_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].text, "     2 hidden frames");
    assert!(rows[1].foreground.is_some());
    assert!(rows[0].foreground.is_none());
}
