//! Canvas growth during drags and shrinking afterwards

use archcanvas::core::{CanvasBounds, CanvasContent, EditorConfig, Position, Size};
use archcanvas::editor::{DiagramModel, MutationEvent, NewNode};
use proptest::prelude::*;

fn model_with(positions: &[(f64, f64)]) -> (DiagramModel, Vec<String>) {
    let mut model = DiagramModel::new();
    let ids = positions
        .iter()
        .map(|(x, y)| model.add_node(NewNode::new("react", Position::new(*x, *y), "node")))
        .collect();
    model.take_events();
    (model, ids)
}

#[test]
fn test_left_drag_grows_and_shifts_everything() {
    let (mut model, ids) = model_with(&[(400.0, 400.0), (800.0, 300.0)]);
    let mut bounds = CanvasBounds::default();

    let outcome = bounds.on_node_drag_frame(&mut model, &ids[0], Position::new(-30.0, 400.0), &[]);

    assert_eq!(outcome.shift, Position::new(380.0, 0.0));
    assert_eq!(bounds.width(), 2000.0 + 380.0);
    assert_eq!(bounds.height(), 1500.0);
    assert_eq!(model.node(&ids[1]).unwrap().position, Position::new(1180.0, 300.0));
    assert_eq!(model.node(&ids[0]).unwrap().position, Position::new(50.0 + 380.0, 400.0));
    assert!(model
        .take_events()
        .contains(&MutationEvent::ContentShifted { dx: 380.0, dy: 0.0 }));
}

#[test]
fn test_shrink_after_drag_returns_to_floor() {
    let (mut model, ids) = model_with(&[(400.0, 400.0)]);
    let mut bounds = CanvasBounds::default();
    bounds.on_node_drag_frame(&mut model, &ids[0], Position::new(1900.0, 400.0), &[]);
    assert!(bounds.width() > 2000.0);

    model.move_node(&ids[0], Position::new(300.0, 300.0)).unwrap();
    let outcome = bounds.perform_auto_shrink(&mut model);
    assert!(outcome.resized);
    assert_eq!(bounds.size(), Size::new(2000.0, 1500.0));
}

#[test]
fn test_custom_floor() {
    let config = EditorConfig::new().with_floor(800.0, 600.0);
    let (mut model, _) = model_with(&[(100.0, 100.0)]);
    let mut bounds = CanvasBounds::new(config);
    bounds.perform_auto_shrink(&mut model);
    assert_eq!(bounds.size(), Size::new(800.0, 600.0));
}

proptest! {
    #[test]
    fn bounds_never_undercut_floor_or_content(
        start in prop::collection::vec((0.0f64..1800.0, 0.0f64..1300.0), 1..6),
        drags in prop::collection::vec((0usize..6, -600.0f64..3000.0, -600.0f64..2500.0), 1..12),
    ) {
        let (mut model, ids) = model_with(&start);
        let mut bounds = CanvasBounds::default();
        for (index, x, y) in drags {
            let id = &ids[index % ids.len()];
            bounds.on_node_drag_frame(&mut model, id, Position::new(x, y), &[]);
        }
        bounds.perform_auto_shrink(&mut model);

        let config = EditorConfig::default();
        let content = bounds.content_bounds(&model).unwrap();
        prop_assert!(bounds.width() >= config.floor.width);
        prop_assert!(bounds.height() >= config.floor.height);
        prop_assert!(bounds.width() + 1e-6 >= content.right() + config.shrink_padding);
        prop_assert!(bounds.height() + 1e-6 >= content.bottom() + config.shrink_padding);
        prop_assert!(model.node_positions().iter().all(|(_, p)| p.x >= 0.0 && p.y >= 0.0));
    }
}
