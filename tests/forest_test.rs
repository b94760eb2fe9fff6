//! Tests for forest construction and sibling ordering

use rstest::rstest;

use orgchart::domain::{build_forest, Collaborator, CollaboratorId, ExpandedIds, ForestArena};
use orgchart::util::testing;

fn preorder_ids(forest: &ForestArena) -> Vec<CollaboratorId> {
    forest.iter().map(|(_, node)| node.id()).collect()
}

fn root_ids(forest: &ForestArena) -> Vec<CollaboratorId> {
    forest
        .roots()
        .iter()
        .filter_map(|&idx| forest.get_node(idx))
        .map(|node| node.id())
        .collect()
}

#[test]
fn given_empty_list_when_building_then_empty_forest() {
    testing::init_test_setup();
    let forest = build_forest(&[]);
    assert!(forest.is_empty());
    assert!(forest.roots().is_empty());
    assert_eq!(forest.depth(), 0);
}

#[test]
fn given_mixed_roots_when_building_then_roots_ordered_by_level_then_name() {
    testing::init_test_setup();
    let nodes = vec![
        Collaborator::new(1, "Zélia", 1, 2),
        Collaborator::new(2, "bruno", 2, 1),
        Collaborator::new(3, "Ana", 3, 2),
        Collaborator::new(4, "Álvaro", 4, 1),
    ];
    let forest = build_forest(&nodes);
    assert_eq!(root_ids(&forest), vec![4, 2, 3, 1]);
}

#[test]
fn given_deep_hierarchy_when_building_then_every_subtree_sorted() {
    testing::init_test_setup();
    let nodes = vec![
        Collaborator::new(1, "CEO", 1, 1),
        Collaborator::new(2, "Vitor", 1, 2).with_superior(1),
        Collaborator::new(3, "Carla", 1, 2).with_superior(1),
        Collaborator::new(4, "Rui", 1, 3).with_superior(2),
        Collaborator::new(5, "Ester", 1, 3).with_superior(2),
        Collaborator::new(6, "Deputy", 1, 1).with_superior(1),
    ];
    let forest = build_forest(&nodes);
    // Same-level deputy first, then level 2 by name; Vitor's team by name.
    assert_eq!(preorder_ids(&forest), vec![1, 6, 3, 2, 5, 4]);
    assert_eq!(forest.depth(), 3);
}

#[rstest]
#[case::dangling(Some(404))]
#[case::self_reference(Some(7))]
#[case::no_superior(None)]
fn given_unresolvable_superior_when_building_then_node_is_root(
    #[case] superior: Option<CollaboratorId>,
) {
    testing::init_test_setup();
    let mut orphan = Collaborator::new(7, "Orphan", 1, 2);
    orphan.superior_id = superior;
    let nodes = vec![Collaborator::new(1, "Boss", 1, 1), orphan];

    let forest = build_forest(&nodes);

    assert_eq!(forest.len(), 2);
    assert_eq!(root_ids(&forest), vec![1, 7]);
}

#[test]
fn given_duplicate_ids_when_building_then_each_record_kept_once() {
    testing::init_test_setup();
    let nodes = vec![
        Collaborator::new(1, "Boss", 1, 1),
        Collaborator::new(2, "First copy", 1, 2).with_superior(1),
        Collaborator::new(2, "Second copy", 1, 2).with_superior(1),
        Collaborator::new(3, "Report", 1, 3).with_superior(2),
    ];
    let forest = build_forest(&nodes);

    assert_eq!(forest.len(), 4);
    assert_eq!(forest.iter().count(), 4);
    // Links resolve to the first record carrying the id.
    let first = forest.index_of(2).expect("id 2 indexed");
    let first_node = forest.get_node(first).expect("node");
    assert_eq!(first_node.collaborator.display_name, "First copy");
    assert_eq!(first_node.children.len(), 1);
}

#[test]
fn given_duplicate_id_deeper_in_tree_when_indexing_then_first_input_record_wins() {
    testing::init_test_setup();
    // The second record with id 2 is a root and gets built before the first one.
    let nodes = vec![
        Collaborator::new(1, "Boss", 1, 1),
        Collaborator::new(2, "Deep copy", 1, 3).with_superior(3),
        Collaborator::new(3, "Mid", 1, 2).with_superior(1),
        Collaborator::new(2, "Root copy", 1, 3),
    ];
    let forest = build_forest(&nodes);

    let idx = forest.index_of(2).expect("id 2 indexed");
    let node = forest.get_node(idx).expect("node");
    assert_eq!(node.collaborator.display_name, "Deep copy");

    let mut expanded = ExpandedIds::new();
    assert!(expanded.reveal(&forest, 2));
    assert_eq!(expanded.iter().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn given_two_node_cycle_when_building_then_cut_once_and_all_reachable() {
    testing::init_test_setup();
    let nodes = vec![
        Collaborator::new(1, "A", 1, 1).with_superior(2),
        Collaborator::new(2, "B", 1, 1).with_superior(1),
        Collaborator::new(3, "C", 1, 2).with_superior(2),
    ];
    let forest = build_forest(&nodes);

    assert_eq!(forest.roots().len(), 1);
    assert_eq!(forest.iter().count(), 3);
}

#[test]
fn given_subtree_when_iterating_then_only_its_members() {
    testing::init_test_setup();
    let nodes = vec![
        Collaborator::new(1, "Root", 1, 1),
        Collaborator::new(2, "Left", 1, 2).with_superior(1),
        Collaborator::new(3, "Right", 1, 2).with_superior(1),
        Collaborator::new(4, "Leaf", 1, 3).with_superior(2),
    ];
    let forest = build_forest(&nodes);
    let left = forest.index_of(2).expect("indexed");

    let ids: Vec<_> = forest.iter_subtree(left).map(|(_, n)| n.id()).collect();

    assert_eq!(ids, vec![2, 4]);
}
