use builder_core::{
    BuilderConfig, ComponentTree, NodeId, NodePatch, NodeSpec, PageStore, SequentialIdGenerator,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;

fn store() -> PageStore {
    PageStore::with_id_generator(BuilderConfig::default(), SequentialIdGenerator::new("n"))
}

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

/// section n-1 { heading n-2, row n-3 { text n-4 } }, footer n-5
fn sample_page() -> PageStore {
    let mut store = store();
    let section = store.add(NodeSpec::new("section"), None).unwrap();
    store.add(NodeSpec::new("heading"), Some(&section)).unwrap();
    let row = store.add(NodeSpec::new("row"), Some(&section)).unwrap();
    store.add(NodeSpec::new("text"), Some(&row)).unwrap();
    store.add(NodeSpec::new("footer"), None).unwrap();
    store.mark_saved();
    store
}

fn assert_consistent(store: &PageStore) {
    store.repository().check_invariants().unwrap();
    for slot in [store.selected_id(), store.hovered_id()].into_iter().flatten() {
        assert!(store.find(slot).is_some(), "cursor points at missing node {slot}");
    }
}

#[test]
fn test_scenario_add_then_undo_on_empty_page() {
    let mut store = store();

    let section = store.add(NodeSpec::new("section"), None).unwrap();
    assert_eq!(store.roots().len(), 1);
    assert_eq!(store.roots()[0].component_type, "section");
    assert_eq!(store.selected_id(), Some(&section));

    assert!(store.undo());
    assert!(store.roots().is_empty());
    assert_eq!(store.to_forest(), Vec::<ComponentTree>::new());
    assert_eq!(store.selected_id(), None);
}

#[test]
fn test_scenario_move_child_to_root() {
    let mut store = store();
    let a = store.add(NodeSpec::new("section"), None).unwrap();
    let b = store.add(NodeSpec::new("text"), Some(&a)).unwrap();
    assert_eq!(store.find(&b).unwrap().order, 0);

    assert!(store.move_node(&b, None, 0));

    let roots = store.roots();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].id, b);
    assert_eq!(roots[0].order, 0);
    assert_eq!(roots[0].parent_id, None);
    assert_eq!(roots[1].id, a);
    assert_eq!(roots[1].order, 1);
    assert!(store.find(&a).unwrap().children.is_empty());
    assert_consistent(&store);
}

#[test]
fn test_scenario_remove_selected_twice() {
    let mut store = sample_page();
    let footer = id("n-5");
    store.select(Some(footer.clone()));

    assert!(store.remove(&footer));
    assert_eq!(store.selected_id(), None);

    let before = store.repository().clone();
    let history_len = store.history().len();
    assert!(!store.remove(&footer));
    assert_eq!(store.repository(), &before);
    assert_eq!(store.history().len(), history_len);
}

#[test]
fn test_add_appends_with_last_order() {
    let mut store = sample_page();
    let section = id("n-1");
    let extra = store.add(NodeSpec::new("button"), Some(&section)).unwrap();

    let node = store.find(&extra).unwrap();
    assert_eq!(node.parent_id, Some(section.clone()));
    assert_eq!(node.order, 2);
    assert_eq!(
        store.find(&section).unwrap().children,
        vec![id("n-2"), id("n-3"), extra]
    );
}

#[test]
fn test_add_under_missing_parent_is_noop() {
    let mut store = sample_page();
    let before = store.to_forest();

    assert_eq!(store.add(NodeSpec::new("text"), Some(&id("ghost"))), None);

    assert_eq!(store.to_forest(), before);
    assert!(!store.is_dirty());
    assert_eq!(store.selected_id(), Some(&id("n-5")));
}

#[test]
fn test_add_template_subtree() {
    let mut store = store();
    let card = NodeSpec::new("card")
        .with_prop("elevation", 2)
        .with_child(NodeSpec::new("image").with_prop("src", "a.png"))
        .with_child(NodeSpec::new("text").with_prop("text", "Caption"));

    let root = store.add(card, None).unwrap();

    assert_eq!(store.repository().len(), 3);
    let tree = store.repository().to_tree(&root).unwrap();
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[1].props["text"], json!("Caption"));
    assert_eq!(tree.children[1].order, 1);
    assert_eq!(store.history().len(), 2, "a template is one undo step");
    assert_consistent(&store);
}

#[test]
fn test_remove_subtree_clears_cursors_inside_it() {
    let mut store = sample_page();
    store.select(Some(id("n-4")));
    store.hover(Some(id("n-2")));

    assert!(store.remove(&id("n-1")));

    assert_eq!(store.repository().len(), 1);
    assert_eq!(store.selected_id(), None);
    assert_eq!(store.hovered_id(), None);
    assert_eq!(store.roots()[0].id, id("n-5"));
    assert_eq!(store.roots()[0].order, 0);
    assert_consistent(&store);
}

#[test]
fn test_remove_unrelated_keeps_selection() {
    let mut store = sample_page();
    store.select(Some(id("n-2")));
    assert!(store.remove(&id("n-5")));
    assert_eq!(store.selected_id(), Some(&id("n-2")));
}

#[test]
fn test_update_merges_props_and_flags() {
    let mut store = sample_page();
    let heading = id("n-2");

    assert!(store.update(&heading, NodePatch::prop("text", "Welcome")));
    assert!(store.update(&heading, NodePatch::prop("level", 1)));
    assert!(store.update(&heading, NodePatch::locked(true)));

    let node = store.find(&heading).unwrap();
    assert_eq!(node.props["text"], json!("Welcome"));
    assert_eq!(node.props["level"], json!(1));
    assert!(node.locked);
    assert!(!node.hidden);

    // Same value again changes nothing.
    let history_len = store.history().len();
    assert!(!store.update(&heading, NodePatch::locked(true)));
    assert!(!store.update(&id("ghost"), NodePatch::hidden(true)));
    assert_eq!(store.history().len(), history_len);
}

#[test]
fn test_update_replaces_props_wholesale() {
    let mut store = sample_page();
    let heading = id("n-2");
    store.update(&heading, NodePatch::prop("text", "Old"));

    let mut props = serde_json::Map::new();
    props.insert("title".to_string(), json!("New"));
    let patch = NodePatch {
        props: Some(props),
        ..NodePatch::default()
    };
    assert!(store.update(&heading, patch));

    let node = store.find(&heading).unwrap();
    assert_eq!(node.props.len(), 1);
    assert_eq!(node.props["title"], json!("New"));
}

#[test]
fn test_move_reorders_within_parent() {
    let mut store = sample_page();
    let section = id("n-1");

    assert!(store.move_node(&id("n-2"), Some(&section), 1));
    assert_eq!(store.find(&section).unwrap().children, vec![id("n-3"), id("n-2")]);
    assert_eq!(store.find(&id("n-3")).unwrap().order, 0);
    assert_eq!(store.find(&id("n-2")).unwrap().order, 1);

    // Already there.
    assert!(!store.move_node(&id("n-2"), Some(&section), 1));
    // Clamped to the end.
    assert!(store.move_node(&id("n-3"), Some(&section), 99));
    assert_eq!(store.find(&section).unwrap().children, vec![id("n-2"), id("n-3")]);
    assert_consistent(&store);
}

#[test]
fn test_move_reparents_subtree_intact() {
    let mut store = sample_page();
    let row_before = store.repository().to_tree(&id("n-3")).unwrap();
    let count = store.repository().len();

    assert!(store.move_node(&id("n-3"), Some(&id("n-5")), 0));

    assert_eq!(store.repository().len(), count);
    let row_after = store.repository().to_tree(&id("n-3")).unwrap();
    assert_eq!(row_after.children, row_before.children);
    assert_eq!(row_after.props, row_before.props);
    assert_eq!(store.find(&id("n-3")).unwrap().parent_id, Some(id("n-5")));
    assert_eq!(store.path_to(&id("n-4")).len(), 3);
    assert_consistent(&store);
}

#[test]
fn test_move_into_own_subtree_is_rejected() {
    let mut store = sample_page();
    let before = store.to_forest();

    assert!(!store.move_node(&id("n-1"), Some(&id("n-4")), 0));
    assert!(!store.move_node(&id("n-1"), Some(&id("n-1")), 0));
    assert!(!store.move_node(&id("n-1"), Some(&id("ghost")), 0));
    assert!(!store.move_node(&id("ghost"), None, 0));

    assert_eq!(store.to_forest(), before);
    assert!(!store.is_dirty());
}

#[test]
fn test_duplicate_inserts_fresh_copy_after_original() {
    let mut store = sample_page();
    let existing: HashSet<NodeId> = store.repository().iter().map(|n| n.id.clone()).collect();

    let copy = store.duplicate(&id("n-3")).unwrap();

    let section = store.find(&id("n-1")).unwrap();
    assert_eq!(section.children, vec![id("n-2"), id("n-3"), copy.clone()]);
    assert_eq!(store.selected_id(), Some(&copy));

    let copy_tree = store.repository().to_tree(&copy).unwrap();
    let original = store.repository().to_tree(&id("n-3")).unwrap();
    assert_eq!(copy_tree.node_count(), original.node_count());
    assert_eq!(copy_tree.children[0].component_type, "text");
    assert!(copy_tree.ids().iter().all(|new_id| !existing.contains(new_id)));
    assert_consistent(&store);

    assert_eq!(store.duplicate(&id("ghost")), None);
}

#[test]
fn test_queries() {
    let store = sample_page();

    let path: Vec<&str> = store
        .path_to(&id("n-4"))
        .iter()
        .map(|node| node.component_type.as_str())
        .collect();
    assert_eq!(path, vec!["section", "row", "text"]);
    assert!(store.path_to(&id("ghost")).is_empty());

    let roots: Vec<&NodeId> = store.roots().iter().map(|node| &node.id).collect();
    assert_eq!(roots, vec![&id("n-1"), &id("n-5")]);
    assert_eq!(store.find(&id("n-4")).unwrap().parent_id, Some(id("n-3")));
}
