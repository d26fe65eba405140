//! Locating the call-stack list in a component tree, and the weak cache over it

use crate::integration::test_utils::{library, panel_with, project};
use stacksnack::frame::DisplayFrame;
use stacksnack::host::memory::{MemoryComponent, MemoryFrame, MemoryList};
use stacksnack::host::TabId;
use stacksnack::widget::{
    install_placeholder_renderer, CachedWidgetRef, CellRenderer, ComponentRef, ListElement,
    ListWidget, WidgetLocator, WidgetRef,
};
use std::rc::Rc;

fn frames_list(names: &[&str]) -> Rc<MemoryList<MemoryFrame>> {
    let frames = names
        .iter()
        .enumerate()
        .map(|(i, name)| project(i as u64 + 1, name))
        .collect();
    Rc::new(MemoryList::of_frames(frames))
}

fn as_component(component: Rc<MemoryComponent<MemoryFrame>>) -> ComponentRef<MemoryFrame> {
    component
}

fn found_is(found: Option<WidgetRef<MemoryFrame>>, list: &Rc<MemoryList<MemoryFrame>>) -> bool {
    let expected: WidgetRef<MemoryFrame> = Rc::clone(list) as WidgetRef<MemoryFrame>;
    found.is_some_and(|widget| Rc::ptr_eq(&widget, &expected))
}

#[test]
fn test_finds_list_nested_deep_in_tree() {
    let list = frames_list(&["main"]);
    let root = as_component(MemoryComponent::panel(vec![
        as_component(MemoryComponent::panel(Vec::new())),
        as_component(MemoryComponent::panel(vec![as_component(
            MemoryComponent::panel(vec![panel_with(&list)]),
        )])),
    ]));

    assert!(found_is(WidgetLocator::find(&root), &list));
}

#[test]
fn test_invisible_subtree_is_skipped() {
    let hidden = frames_list(&["hidden"]);
    let shown = frames_list(&["shown"]);
    let hidden_panel = MemoryComponent::panel(vec![panel_with(&hidden)]);
    hidden_panel.set_showing(false);
    let root = as_component(MemoryComponent::panel(vec![
        as_component(hidden_panel),
        panel_with(&shown),
    ]));

    assert!(found_is(WidgetLocator::find(&root), &shown));
}

#[test]
fn test_invisible_root_finds_nothing() {
    let list = frames_list(&["main"]);
    let root = MemoryComponent::panel(vec![panel_with(&list)]);
    root.set_showing(false);

    assert!(WidgetLocator::find(&as_component(root)).is_none());
}

#[test]
fn test_lists_of_other_things_are_skipped() {
    let variables = Rc::new(MemoryList::<MemoryFrame>::with_elements(vec![
        ListElement::Foreign,
        ListElement::Foreign,
    ]));
    let nulls = Rc::new(MemoryList::<MemoryFrame>::with_elements(vec![
        ListElement::Null,
        ListElement::Entry(DisplayFrame::Frame(project(1, "a"))),
    ]));
    let empty = frames_list(&[]);
    let frames = frames_list(&["main"]);
    let root = as_component(MemoryComponent::panel(vec![
        panel_with(&variables),
        panel_with(&nulls),
        panel_with(&empty),
        panel_with(&frames),
    ]));

    assert!(found_is(WidgetLocator::find(&root), &frames));
}

#[test]
fn test_placeholder_first_element_is_a_frames_list() {
    let list = Rc::new(MemoryList::new(vec![
        DisplayFrame::hidden(2).unwrap(),
        DisplayFrame::Frame(project(1, "a")),
    ]));
    let root = panel_with(&list);

    assert!(found_is(WidgetLocator::find(&root), &list));
}

#[test]
fn test_first_match_in_child_order_wins() {
    let first = frames_list(&["first"]);
    let second = frames_list(&["second"]);
    let root = as_component(MemoryComponent::panel(vec![
        panel_with(&first),
        panel_with(&second),
    ]));

    assert!(found_is(WidgetLocator::find(&root), &first));
}

#[test]
fn test_list_component_does_not_search_its_children() {
    let outer_list = Rc::new(MemoryList::<MemoryFrame>::with_elements(vec![
        ListElement::Foreign,
    ]));
    let inner = frames_list(&["inner"]);
    let outer = MemoryComponent::list(outer_list);
    outer.add_child(panel_with(&inner));

    assert!(WidgetLocator::find(&as_component(outer)).is_none());
}

#[test]
fn test_cache_reference_is_weak() {
    let list = frames_list(&["main"]);
    let widget: WidgetRef<MemoryFrame> = list.clone();
    let cache = CachedWidgetRef::new(&widget, Some(TabId(3)));

    assert!(cache.is_same(&widget));
    assert_eq!(cache.tab(), Some(TabId(3)));
    assert!(cache.live().is_some());

    drop(widget);
    drop(list);
    assert!(cache.upgrade().is_none());
    assert!(cache.live().is_none());
}

#[test]
fn test_cache_live_requires_showing() {
    let list = frames_list(&["main"]);
    let widget: WidgetRef<MemoryFrame> = list.clone();
    let cache = CachedWidgetRef::new(&widget, None);

    list.set_showing(false);
    assert!(cache.live().is_none());
    assert!(cache.upgrade().is_some());
}

#[test]
fn test_cache_tracks_filtered_size() {
    let list = frames_list(&["a", "b"]);
    let widget: WidgetRef<MemoryFrame> = list.clone();
    let mut cache = CachedWidgetRef::new(&widget, None);

    assert_eq!(cache.last_filtered_len(), None);
    assert!(cache.size_changed(2));

    cache.record_filtered_len(2);
    assert!(!cache.size_changed(2));
    assert!(cache.size_changed(3));
}

#[test]
fn test_cache_is_same_distinguishes_widgets() {
    let first: WidgetRef<MemoryFrame> = frames_list(&["a"]);
    let second: WidgetRef<MemoryFrame> = frames_list(&["a"]);
    let cache = CachedWidgetRef::new(&first, None);

    assert!(cache.is_same(&first));
    assert!(!cache.is_same(&second));
}

#[test]
fn test_placeholder_renderer_installed_once() {
    let list = MemoryList::of_frames(vec![library(1, "x")]);

    assert!(install_placeholder_renderer::<MemoryFrame>(&list));
    assert!(!install_placeholder_renderer::<MemoryFrame>(&list));
    assert!(list.cell_renderer().unwrap().draws_placeholders());
}

#[test]
fn test_list_without_renderer_is_left_alone() {
    let list = MemoryList::new(vec![DisplayFrame::Frame(library(1, "x"))]);

    assert!(!install_placeholder_renderer::<MemoryFrame>(&list));
    assert!(list.cell_renderer().is_none());
}
