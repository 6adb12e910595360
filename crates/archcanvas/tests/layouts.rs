//! Automatic layouts over editor content

use archcanvas::core::{Database, LayoutAlgorithm, Position};
use archcanvas::editor::{Editor, NewNode};
use archcanvas::layout::{CircularLayout, GridLayout, HierarchyLayout, LayoutGraph, LayoutKind};

fn chain(names: &[&str]) -> LayoutGraph {
    let mut graph = LayoutGraph::new();
    for pair in names.windows(2) {
        graph.push_edge(pair[0], pair[1]);
    }
    graph
}

#[test]
fn test_hierarchy_levels_are_stacked() {
    let result = HierarchyLayout::new().layout(&chain(&["a", "b", "c"])).unwrap();
    assert_eq!(result.position_of("a"), Some(Position::new(500.0, 100.0)));
    assert_eq!(result.position_of("b"), Some(Position::new(500.0, 250.0)));
    assert_eq!(result.position_of("c"), Some(Position::new(500.0, 400.0)));
}

#[test]
fn test_circular_places_hub_in_the_middle() {
    let mut graph = LayoutGraph::new();
    for leaf in ["b", "c", "d", "e"] {
        graph.push_edge("hub", leaf);
    }
    let result = CircularLayout::new().layout(&graph).unwrap();
    assert_eq!(result.position_of("hub"), Some(Position::new(500.0 - 80.0, 400.0 - 50.0)));
    assert_eq!(result.len(), 5);
}

#[test]
fn test_grid_of_five_uses_three_columns() {
    let mut graph = LayoutGraph::new();
    for id in ["a", "b", "c", "d", "e"] {
        graph.push_node(id);
    }
    let result = GridLayout::new().layout(&graph).unwrap();
    assert_eq!(result.position_of("c"), Some(Position::new(500.0, 100.0)));
    assert_eq!(result.position_of("d"), Some(Position::new(100.0, 250.0)));
}

#[test]
fn test_every_layout_places_every_node() {
    let mut graph = chain(&["a", "b", "c"]);
    graph.push_node("loner");
    for kind in LayoutKind::all() {
        let result = kind.run(&graph).unwrap();
        assert_eq!(result.len(), graph.node_count(), "{kind}");
        assert!(result.positions.iter().all(|(_, p)| p.is_finite()));
    }
}

#[test]
fn test_empty_graph() {
    for kind in LayoutKind::all() {
        assert!(kind.run(&LayoutGraph::new()).unwrap().is_empty());
    }
}

#[test]
fn test_layout_names_and_aliases() {
    assert_eq!("tree".parse::<LayoutKind>().unwrap(), LayoutKind::Hierarchy);
    assert_eq!("circle".parse::<LayoutKind>().unwrap(), LayoutKind::Circular);
    assert!("spiral".parse::<LayoutKind>().is_err());
    assert_eq!(HierarchyLayout::new().name(), "hierarchy");
}

#[test]
fn test_editor_layout_of_subset_leaves_others() {
    let mut editor = Editor::new();
    let a = editor.model_mut().add_node(NewNode::new("react", Position::new(900.0, 900.0), "a"));
    let b = editor.model_mut().add_node(NewNode::new("redis", Position::new(950.0, 950.0), "b"));
    let c = editor.model_mut().add_node(NewNode::new("kafka", Position::new(1200.0, 600.0), "c"));

    let moved = editor
        .apply_layout(LayoutKind::Grid, Some(&[a.clone(), b.clone()]))
        .unwrap();
    assert_eq!(moved, 2);
    assert_eq!(editor.model().node(&a).unwrap().position, Position::new(100.0, 100.0));
    assert_eq!(editor.model().node(&b).unwrap().position, Position::new(300.0, 100.0));
    assert_eq!(editor.model().node(&c).unwrap().position, Position::new(1200.0, 600.0));
}
