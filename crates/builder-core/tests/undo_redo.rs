use builder_core::{
    BuilderConfig, NodeId, NodePatch, NodeRepository, NodeSpec, PageStore, SequentialIdGenerator,
    StateChangeType,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn store_with_limit(history_limit: usize) -> PageStore {
    let config = BuilderConfig {
        history_limit,
        ..BuilderConfig::default()
    };
    PageStore::with_id_generator(config, SequentialIdGenerator::new("n"))
}

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

#[test]
fn test_undo_redo_single_add() {
    let mut store = store_with_limit(50);

    store.add(NodeSpec::new("section"), None).unwrap();
    assert!(store.can_undo());
    assert!(!store.can_redo());

    assert!(store.undo());
    assert!(store.repository().is_empty());
    assert!(!store.can_undo());
    assert!(store.can_redo());

    assert!(store.redo());
    assert_eq!(store.repository().len(), 1);
    assert_eq!(store.selected_id(), Some(&id("n-1")));
    assert!(store.can_undo());
    assert!(!store.can_redo());
}

#[test]
fn test_undo_redo_at_bounds_are_noops() {
    let mut store = store_with_limit(50);
    assert!(!store.undo());
    assert!(!store.redo());

    store.add(NodeSpec::new("section"), None);
    assert!(!store.redo());
    assert!(store.undo());
    assert!(!store.undo());
    assert_eq!(store.history().cursor(), Some(0));
}

#[test]
fn test_each_step_round_trips() {
    let mut store = store_with_limit(50);
    let section = store.add(NodeSpec::new("section"), None).unwrap();
    let text = store.add(NodeSpec::new("text"), Some(&section)).unwrap();
    let footer = store.add(NodeSpec::new("footer"), None).unwrap();

    let steps: Vec<Box<dyn Fn(&mut PageStore) -> bool>> = vec![
        Box::new(|s: &mut PageStore| s.update(&id("n-2"), NodePatch::prop("text", "Hi"))),
        Box::new(|s: &mut PageStore| s.move_node(&id("n-2"), None, 0)),
        Box::new(|s: &mut PageStore| s.duplicate(&id("n-1")).is_some()),
        Box::new(|s: &mut PageStore| s.remove(&id("n-3"))),
        Box::new(|s: &mut PageStore| s.add(NodeSpec::new("button"), Some(&id("n-1"))).is_some()),
    ];
    assert_eq!((text, footer), (id("n-2"), id("n-3")));

    for step in steps {
        let before: NodeRepository = store.repository().clone();
        assert!(step(&mut store));
        let after: NodeRepository = store.repository().clone();

        assert!(store.undo());
        assert_eq!(store.repository(), &before);
        assert!(store.redo());
        assert_eq!(store.repository(), &after);
    }
}

#[test]
fn test_undo_restores_selection_snapshot() {
    let mut store = store_with_limit(50);
    let a = store.add(NodeSpec::new("a"), None).unwrap();
    let b = store.add(NodeSpec::new("b"), None).unwrap();
    assert_eq!(store.selected_id(), Some(&b));

    store.undo();
    assert_eq!(store.selected_id(), Some(&a));
    store.undo();
    assert_eq!(store.selected_id(), None);
}

#[test]
fn test_new_mutation_truncates_redo() {
    let mut store = store_with_limit(50);
    store.add(NodeSpec::new("a"), None);
    store.add(NodeSpec::new("b"), None);
    store.undo();
    assert!(store.can_redo());

    store.add(NodeSpec::new("c"), None);
    assert!(!store.can_redo());
    assert_eq!(store.history().len(), 3);

    let types: Vec<&str> = store
        .roots()
        .iter()
        .map(|node| node.component_type.as_str())
        .collect();
    assert_eq!(types, vec!["a", "c"]);
}

#[test]
fn test_history_is_bounded_and_recent_states_reachable() {
    let limit = 5;
    let mut store = store_with_limit(limit);

    for i in 0..12 {
        store.add(NodeSpec::new(format!("box{i}")), None);
        assert!(store.history().len() <= limit);
    }
    assert_eq!(store.history().len(), limit);

    // The four most recent mutations can be undone, reaching the state after the 8th add.
    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, limit - 1);
    assert_eq!(store.repository().len(), 8);

    while store.redo() {}
    assert_eq!(store.repository().len(), 12);
}

#[test]
fn test_dirty_tracks_saved_point() {
    let mut store = store_with_limit(50);
    assert!(!store.is_dirty());

    store.add(NodeSpec::new("a"), None);
    assert!(store.is_dirty());
    store.undo();
    assert!(!store.is_dirty(), "back at the opened state");

    store.redo();
    store.mark_saved();
    store.add(NodeSpec::new("b"), None);
    assert!(store.is_dirty());
    store.undo();
    assert!(!store.is_dirty());
    store.undo();
    assert!(store.is_dirty());
}

#[test]
fn test_selection_changes_are_not_undo_steps() {
    let mut store = store_with_limit(50);
    store.add(NodeSpec::new("a"), None);
    let len = store.history().len();

    store.select(None);
    store.hover(Some(id("n-1")));
    store.start_drag(id("n-1"));
    store.end_drag();

    assert_eq!(store.history().len(), len);
    assert!(store.is_dirty());
}

#[test]
fn test_notifications_for_history_restore() {
    let mut store = store_with_limit(50);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    store.subscribe(move |change| sink.lock().unwrap().push(change.change_type));

    store.add(NodeSpec::new("a"), None);
    store.undo();
    store.undo();
    store.redo();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            StateChangeType::ForestChanged,
            StateChangeType::HistoryRestored,
            StateChangeType::HistoryRestored,
        ]
    );
    assert_eq!(store.version(), 3);
    assert!(store.has_changed_since(2));
    assert!(!store.has_changed_since(3));
}

#[test]
fn test_reset_discards_history() {
    let mut store = store_with_limit(50);
    store.add(NodeSpec::new("a"), None);
    store.select(Some(id("n-1")));

    store.reset();

    assert!(store.repository().is_empty());
    assert_eq!(store.selected_id(), None);
    assert!(!store.can_undo());
    assert!(!store.is_dirty());
    assert_eq!(store.history().len(), 1);
}
