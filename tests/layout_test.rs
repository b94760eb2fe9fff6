//! Tests for the two-pass layout engine

use rstest::{fixture, rstest};

use orgchart::domain::{
    build_forest, Collaborator, CollaboratorId, ExpandedIds, ForestArena, Layout, LayoutConfig,
    LayoutEngine, Level, Point,
};
use orgchart::util::testing;

const NW: f64 = 220.0;
const GAP: f64 = 40.0;
const ROW: f64 = 160.0;
const PAD: f64 = 40.0;

#[fixture]
fn levels() -> Vec<Level> {
    testing::init_test_setup();
    vec![
        Level::new(1, 0, "Director"),
        Level::new(2, 1, "Manager"),
        Level::new(3, 2, "Analyst"),
    ]
}

fn run(nodes: &[Collaborator], levels: &[Level], expanded: &[CollaboratorId]) -> (ForestArena, Layout) {
    let forest = build_forest(nodes);
    let expanded: ExpandedIds = expanded.iter().copied().collect();
    let layout = LayoutEngine::new(LayoutConfig::default(), levels).compute(&forest, &expanded);
    (forest, layout)
}

fn pos(forest: &ForestArena, layout: &Layout, id: CollaboratorId) -> Point {
    let idx = forest.index_of(id).expect("id in forest");
    layout.position(idx).expect("node positioned")
}

#[rstest]
fn given_lateral_and_lower_child_when_laying_out_then_lateral_beside_and_lower_centered(
    levels: Vec<Level>,
) {
    // P{level 2} with X{level 2} and Y{level 3}, P expanded.
    let nodes = vec![
        Collaborator::new(1, "P", 1, 2),
        Collaborator::new(2, "X", 1, 2).with_superior(1),
        Collaborator::new(3, "Y", 1, 3).with_superior(1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1]);

    let p = pos(&forest, &layout, 1);
    let x = pos(&forest, &layout, 2);
    let y = pos(&forest, &layout, 3);

    assert_eq!(x.y, p.y);
    assert_eq!(x.x, p.x + NW + GAP);
    assert_eq!(p, Point::new(PAD, PAD + ROW));
    assert_eq!(y.y, PAD + 2.0 * ROW);

    let combined_center = p.x + (NW + GAP + NW) / 2.0;
    assert_eq!(y.x + NW / 2.0, combined_center);
}

#[rstest]
fn given_lateral_chain_when_laying_out_then_row_extends_right(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "P", 1, 2),
        Collaborator::new(2, "X", 1, 2).with_superior(1),
        Collaborator::new(3, "Z", 1, 2).with_superior(2),
        Collaborator::new(4, "W", 1, 3).with_superior(2),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1, 2]);

    let p = pos(&forest, &layout, 1);
    let x = pos(&forest, &layout, 2);
    let z = pos(&forest, &layout, 3);
    let w = pos(&forest, &layout, 4);

    assert_eq!([p.y, x.y, z.y], [p.y; 3]);
    assert_eq!(x.x, p.x + NW + GAP);
    assert_eq!(z.x, x.x + NW + GAP);
    // X's lower report centers under X and Z, not under the whole chain.
    assert_eq!(w.x + NW / 2.0, x.x + (NW + GAP + NW) / 2.0);
    assert_eq!(
        layout.subtree_width(forest.index_of(1).expect("indexed")),
        Some(NW + GAP + NW + GAP + NW)
    );
}

#[rstest]
fn given_lateral_child_with_own_reports_when_laying_out_then_lower_rows_do_not_overlap(
    levels: Vec<Level>,
) {
    let nodes = vec![
        Collaborator::new(1, "P", 1, 2),
        Collaborator::new(2, "X", 1, 2).with_superior(1),
        Collaborator::new(3, "Y", 1, 3).with_superior(1),
        Collaborator::new(4, "Z", 1, 3).with_superior(2),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1, 2]);

    let p = pos(&forest, &layout, 1);
    let x = pos(&forest, &layout, 2);
    let y = pos(&forest, &layout, 3);
    let z = pos(&forest, &layout, 4);

    assert_eq!(y.y, z.y);
    assert!((y.x - z.x).abs() >= NW);
    // Y stays under P, Z under X.
    assert_eq!(y.x, p.x);
    assert_eq!(z.x, x.x);
    assert_eq!(x.x, p.x + NW + GAP);
    assert_eq!(layout.width, PAD + NW + GAP + NW + PAD);
}

#[rstest]
fn given_wide_parent_reports_beside_lateral_subtree_when_laying_out_then_parent_column_widens(
    levels: Vec<Level>,
) {
    let nodes = vec![
        Collaborator::new(1, "P", 1, 2),
        Collaborator::new(2, "X", 1, 2).with_superior(1),
        Collaborator::new(3, "Y1", 1, 3).with_superior(1),
        Collaborator::new(4, "Y2", 1, 3).with_superior(1),
        Collaborator::new(5, "Z", 1, 3).with_superior(2),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1, 2]);

    let column = 2.0 * NW + GAP;
    assert_eq!(pos(&forest, &layout, 3).x, PAD);
    assert_eq!(pos(&forest, &layout, 4).x, PAD + NW + GAP);
    assert_eq!(pos(&forest, &layout, 1).x, PAD + (column - NW) / 2.0);
    assert_eq!(pos(&forest, &layout, 2).x, PAD + column + GAP);
    assert_eq!(pos(&forest, &layout, 5).x, PAD + column + GAP);
    assert_eq!(
        layout.subtree_width(forest.index_of(1).expect("indexed")),
        Some(column + GAP + NW)
    );
}

#[rstest]
fn given_wide_lower_row_when_laying_out_then_combined_row_centered(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "P", 1, 1),
        Collaborator::new(2, "X", 1, 1).with_superior(1),
        Collaborator::new(3, "A", 1, 2).with_superior(1),
        Collaborator::new(4, "B", 1, 2).with_superior(1),
        Collaborator::new(5, "C", 1, 2).with_superior(1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1]);

    let below = 3.0 * NW + 2.0 * GAP;
    let combined = NW + GAP + NW;
    assert_eq!(pos(&forest, &layout, 3).x, PAD);
    assert_eq!(pos(&forest, &layout, 5).x, PAD + 2.0 * (NW + GAP));
    assert_eq!(pos(&forest, &layout, 1).x, PAD + (below - combined) / 2.0);
    assert_eq!(layout.width, PAD + below + PAD);
}

#[rstest]
fn given_only_lower_children_when_laying_out_then_parent_centered_over_them(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "Boss", 1, 1),
        Collaborator::new(2, "Ana", 1, 2).with_superior(1),
        Collaborator::new(3, "Bia", 1, 2).with_superior(1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1]);

    assert_eq!(pos(&forest, &layout, 2), Point::new(PAD, PAD + ROW));
    assert_eq!(pos(&forest, &layout, 3), Point::new(PAD + NW + GAP, PAD + ROW));
    assert_eq!(pos(&forest, &layout, 1).x, PAD + (NW + GAP) / 2.0);
    assert_eq!(layout.row_count, 2);
    assert_eq!(layout.height, PAD + ROW + 90.0 + PAD + ROW);
}

#[rstest]
fn given_several_roots_when_laying_out_then_left_to_right_by_subtree_width(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "Alpha", 1, 1),
        Collaborator::new(2, "Alpha report 1", 1, 2).with_superior(1),
        Collaborator::new(3, "Alpha report 2", 1, 2).with_superior(1),
        Collaborator::new(4, "Beta", 2, 1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1]);

    let alpha_width = 2.0 * NW + GAP;
    assert_eq!(pos(&forest, &layout, 4).x, PAD + alpha_width + GAP);
    assert_eq!(layout.width, PAD + alpha_width + GAP + NW + PAD);
}

#[test]
fn given_custom_order_index_when_laying_out_then_rows_follow_catalog_order() {
    testing::init_test_setup();
    let levels = vec![Level::new(1, 10, "Board"), Level::new(2, 0, "Staff")];
    let nodes = vec![
        Collaborator::new(1, "Chair", 1, 1),
        Collaborator::new(2, "Clerk", 1, 2).with_superior(1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[1]);

    assert_eq!(pos(&forest, &layout, 2).y, PAD);
    assert_eq!(pos(&forest, &layout, 1).y, PAD + ROW);
}

#[rstest]
fn given_level_missing_from_catalog_when_laying_out_then_row_zero(levels: Vec<Level>) {
    let nodes = vec![Collaborator::new(1, "Contractor", 1, 99)];
    let (forest, layout) = run(&nodes, &levels, &[]);
    assert_eq!(pos(&forest, &layout, 1).y, PAD);
}

#[rstest]
fn given_collapsed_subtree_when_laying_out_then_width_is_node_width(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "Boss", 1, 1),
        Collaborator::new(2, "Aide", 1, 2).with_superior(1),
        Collaborator::new(3, "Aide 2", 1, 2).with_superior(1),
    ];
    let (forest, layout) = run(&nodes, &levels, &[]);
    let root = forest.index_of(1).expect("indexed");

    assert_eq!(layout.subtree_width(root), Some(NW));
    assert_eq!(layout.position(root), Some(Point::new(PAD, PAD)));
    assert!(!layout.is_positioned(forest.index_of(2).expect("indexed")));
    assert_eq!(layout.row_count, 1);
}

#[rstest]
fn given_identical_inputs_when_laying_out_twice_then_identical_layout(levels: Vec<Level>) {
    let nodes = vec![
        Collaborator::new(1, "P", 1, 2),
        Collaborator::new(2, "X", 1, 2).with_superior(1),
        Collaborator::new(3, "Y", 1, 3).with_superior(1),
        Collaborator::new(4, "Q", 2, 1),
    ];
    let (forest_a, layout_a) = run(&nodes, &levels, &[1]);
    let (forest_b, layout_b) = run(&nodes, &levels, &[1]);

    for id in 1..=4 {
        assert_eq!(pos(&forest_a, &layout_a, id), pos(&forest_b, &layout_b, id));
    }
    assert_eq!(layout_a.width, layout_b.width);
    assert_eq!(layout_a.height, layout_b.height);
}

#[test]
fn given_custom_config_when_laying_out_then_padding_and_sizes_applied() {
    testing::init_test_setup();
    let config = LayoutConfig {
        node_width: 100.0,
        node_height: 50.0,
        horizontal_gap: 10.0,
        row_height: 80.0,
        padding_top: 5.0,
        padding_left: 7.0,
        padding_right: 3.0,
        padding_bottom: 2.0,
    };
    let nodes = vec![
        Collaborator::new(1, "Boss", 1, 1),
        Collaborator::new(2, "Aide", 1, 2).with_superior(1),
    ];
    let forest = build_forest(&nodes);
    let expanded: ExpandedIds = [1].into_iter().collect();
    let layout = LayoutEngine::new(config, &[Level::new(1, 0, "A"), Level::new(2, 1, "B")])
        .compute(&forest, &expanded);

    assert_eq!(pos(&forest, &layout, 2), Point::new(7.0, 85.0));
    assert_eq!(layout.width, 7.0 + 100.0 + 3.0);
    assert_eq!(layout.height, 85.0 + 50.0 + 2.0 + 80.0);
}
