use std::cell::RefCell;
use std::rc::Rc;

use zipkart_dash::reorder::{Bounds, DragImageId, NullSurface, Point};
use zipkart_dash::{
    DashboardLayout, DragState, DragSurface, DropTarget, PointerSample, ReorderEngine, Side,
    compute_label, move_key,
};

#[derive(Default)]
struct CountingSurface {
    next: RefCell<u64>,
    live: RefCell<Vec<DragImageId>>,
}

impl DragSurface for CountingSurface {
    fn attach_drag_image(&self, _key: &str, _bounds: Bounds, _grab: Point) -> DragImageId {
        let mut next = self.next.borrow_mut();
        *next += 1;
        let id = DragImageId(*next);
        self.live.borrow_mut().push(id);
        id
    }

    fn detach_drag_image(&self, id: DragImageId) {
        self.live.borrow_mut().retain(|live| *live != id);
    }
}

fn row(index: usize) -> Bounds {
    Bounds {
        left: 0.0,
        top: 100.0 * index as f64,
        width: 300.0,
        height: 100.0,
    }
}

fn pointer(index: usize, y_in_row: f64) -> PointerSample {
    let target = row(index);
    PointerSample {
        position: Point {
            x: 20.0,
            y: target.top + y_in_row,
        },
        target,
    }
}

fn keys(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[test]
fn labels_for_common_changes() {
    assert_eq!(compute_label(300.0, 200.0), "+50%");
    assert_eq!(compute_label(80.0, 100.0), "-20%");
    assert_eq!(compute_label(100.0, 100.0), "+0%");
    assert_eq!(compute_label(5.0, 0.0), "+100%");
    assert_eq!(compute_label(0.0, 0.0), "0%");
    assert_eq!(compute_label(1.0, 3.0), "-66.7%");
    assert_eq!(compute_label(f64::NAN, 10.0), "-100%");
}

#[test]
fn move_keeps_every_key() {
    let sequence = keys(&["a", "b", "c", "d"]);
    for key in &sequence {
        for to_index in 0..=sequence.len() + 2 {
            let mut moved = move_key(&sequence, key, to_index);
            moved.sort();
            assert_eq!(moved, sequence);
        }
    }
}

#[test]
fn move_examples() {
    let sequence = keys(&["sales", "purchase", "chart"]);
    assert_eq!(
        move_key(&sequence, &"sales".to_string(), 3),
        ["purchase", "chart", "sales"]
    );
    assert_eq!(
        move_key(&sequence, &"chart".to_string(), 0),
        ["chart", "sales", "purchase"]
    );
    assert_eq!(move_key(&sequence, &"purchase".to_string(), 1), sequence);
    assert_eq!(move_key(&sequence, &"missing".to_string(), 0), sequence);
}

#[test]
fn full_gesture_reorders_and_releases_image() {
    let surface = Rc::new(CountingSurface::default());
    let mut engine = ReorderEngine::new(surface.clone());
    let mut layout = DashboardLayout::default();

    engine.begin_drag(Side::Left, "sales", &pointer(0, 40.0));
    assert_eq!(
        engine.state(),
        DragState::Dragging {
            key: "sales",
            side: Side::Left
        }
    );
    assert_eq!(surface.live.borrow().len(), 1);

    engine.update_hover(Side::Left, 2, &pointer(2, 80.0));
    assert_eq!(
        engine.indicator(),
        Some(DropTarget {
            side: Side::Left,
            index: 3
        })
    );

    assert!(layout.apply_drop(&mut engine, Side::Left));
    assert_eq!(layout.sequence(Side::Left), ["purchase", "chart", "sales"]);
    assert_eq!(engine.state(), DragState::Idle);
    assert_eq!(engine.indicator(), None);
    assert!(surface.live.borrow().is_empty());
}

#[test]
fn cross_side_drop_changes_nothing() {
    let surface = Rc::new(CountingSurface::default());
    let mut engine = ReorderEngine::new(surface.clone());
    let mut layout = DashboardLayout::default();

    engine.begin_drag(Side::Left, "chart", &pointer(2, 10.0));
    engine.update_hover(Side::Right, 0, &pointer(0, 10.0));
    assert_eq!(engine.indicator(), None);

    assert!(!layout.apply_drop(&mut engine, Side::Right));
    assert_eq!(layout, DashboardLayout::default());
    assert_eq!(engine.state(), DragState::Idle);
    assert!(surface.live.borrow().is_empty());
}

#[test]
fn drop_without_hover_is_ignored() {
    let mut engine = ReorderEngine::default();
    let mut layout = DashboardLayout::default();

    engine.begin_drag(Side::Right, "inventory", &pointer(0, 10.0));
    assert!(!layout.apply_drop(&mut engine, Side::Right));
    assert_eq!(layout, DashboardLayout::default());
    assert_eq!(engine.state(), DragState::Idle);
}

#[test]
fn cancelled_gesture_leaves_layout_alone() {
    let surface = Rc::new(CountingSurface::default());
    let mut engine = ReorderEngine::new(surface.clone());
    let layout = DashboardLayout::default();

    engine.begin_drag(Side::Mobile, "topProducts", &pointer(5, 10.0));
    engine.update_hover(Side::Mobile, 0, &pointer(0, 10.0));
    engine.end_drag();

    assert_eq!(engine.state(), DragState::Idle);
    assert_eq!(engine.indicator(), None);
    assert!(surface.live.borrow().is_empty());
    assert_eq!(layout, DashboardLayout::default());
}

#[test]
fn mobile_list_moves_independently() {
    let mut engine = ReorderEngine::new(Rc::new(NullSurface));
    let mut layout = DashboardLayout::default();

    engine.begin_drag(Side::Mobile, "topProducts", &pointer(5, 10.0));
    engine.update_hover(Side::Mobile, 0, &pointer(0, 10.0));
    assert!(layout.apply_drop(&mut engine, Side::Mobile));

    assert_eq!(layout.sequence(Side::Mobile)[0], "topProducts");
    assert_eq!(
        layout.sequence(Side::Right),
        DashboardLayout::default().sequence(Side::Right)
    );
}

#[tokio::test]
async fn layout_survives_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut layout = DashboardLayout::default();
    assert!(layout.move_panel(Side::Right, "product", 0));
    layout.save(&path).await.unwrap();

    let loaded = DashboardLayout::load(&path).await.unwrap();
    assert_eq!(loaded, layout);
    assert_eq!(
        loaded.sequence(Side::Right),
        ["product", "inventory", "topProducts"]
    );
}
