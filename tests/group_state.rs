use kurbo::Point;
use scrawl::{
    AnimationEvent, Drawable, DrawableCore, DrawableGroup, DrawableNode, Effect, Fps, GlowHint,
    Grouping, ObjectId, OpKind, OpSet, Pen, Scene,
};

struct Square {
    core: DrawableCore,
    origin: Point,
}

impl Square {
    fn at(x: f64, y: f64) -> Self {
        Self {
            core: DrawableCore::new(),
            origin: Point::new(x, y),
        }
    }

    fn id(&self) -> ObjectId {
        self.core.id
    }
}

impl Drawable for Square {
    fn core(&self) -> &DrawableCore {
        &self.core
    }

    fn draw(&self) -> OpSet {
        let o = self.origin;
        let mut ops = OpSet::new();
        ops.set_pen(Pen::default());
        ops.move_to(o);
        ops.line_to(Point::new(o.x + 10.0, o.y));
        ops.line_to(Point::new(o.x + 10.0, o.y + 10.0));
        ops.line_to(Point::new(o.x, o.y + 10.0));
        ops.close();
        ops
    }
}

#[test]
fn series_group_slices_the_event_across_members() {
    let a = Square::at(0.0, 0.0);
    let b = Square::at(40.0, 0.0);
    let (id_a, id_b) = (a.id(), b.id());

    let group = DrawableGroup::new(
        vec![DrawableNode::leaf(a), DrawableNode::leaf(b)],
        Grouping::Series,
    );
    let mut scene = Scene::new(200, 200);
    scene
        .add_event(AnimationEvent::new(Effect::Sketch, 0.0, 2.0), group.into())
        .unwrap();

    let ev_a: Vec<_> = scene.registered_events(id_a).collect();
    let ev_b: Vec<_> = scene.registered_events(id_b).collect();
    assert_eq!(ev_a.len(), 1);
    assert_eq!(ev_b.len(), 1);
    assert_eq!((ev_a[0].start_time, ev_a[0].duration), (0.0, 1.0));
    assert_eq!((ev_b[0].start_time, ev_b[0].duration), (1.0, 1.0));

    let fps = Fps::new(10, 1).unwrap();
    let frames = scene.timeline(fps, None).unwrap();
    assert_eq!(frames.len(), 21);

    // First half: only the first member is being sketched.
    // Each square has 5 eligible ops; progress 0.5 shows 2 full + 1 partial.
    assert_eq!(frames[5].geometric_count(), 3);
    // Second half: first member complete, second member halfway.
    assert_eq!(frames[15].geometric_count(), 5 + 3);
    // Done: both complete.
    assert_eq!(frames[20].geometric_count(), 10);
}

#[test]
fn parallel_persist_moves_members_by_the_shared_offset() {
    let a = Square::at(0.0, 0.0); // cog (5, 5)
    let b = Square::at(20.0, 0.0); // cog (25, 5); union cog (15, 5)
    let (id_a, id_b) = (a.id(), b.id());

    let group = DrawableGroup::new(
        vec![DrawableNode::leaf(a), DrawableNode::leaf(b)],
        Grouping::Parallel,
    );
    let mut scene = Scene::new(400, 400);
    scene
        .add_event(
            AnimationEvent::new(
                Effect::TranslateTo {
                    point: Point::new(115.0, 55.0),
                    persist: true,
                },
                0.0,
                1.0,
            ),
            group.into(),
        )
        .unwrap();

    // Offset = target - original combined center of gravity = (100, 50).
    let ca = scene.state_at(id_a, 2.0).center_of_gravity().unwrap();
    let cb = scene.state_at(id_b, 2.0).center_of_gravity().unwrap();
    assert!((ca.x - 105.0).abs() < 1e-9 && (ca.y - 55.0).abs() < 1e-9);
    assert!((cb.x - 125.0).abs() < 1e-9 && (cb.y - 55.0).abs() < 1e-9);

    // Both members moved by the same offset: relative layout is preserved.
    assert!(((cb.x - ca.x) - 20.0).abs() < 1e-9);
    assert!((cb.y - ca.y).abs() < 1e-9);
}

#[test]
fn parallel_zoom_scales_about_the_union_center() {
    let a = Square::at(0.0, 0.0); // cog (5, 5)
    let b = Square::at(20.0, 0.0); // cog (25, 5)
    let (id_a, id_b) = (a.id(), b.id());

    let group = DrawableGroup::new(
        vec![DrawableNode::leaf(a), DrawableNode::leaf(b)],
        Grouping::Parallel,
    );
    let mut scene = Scene::new(400, 400);
    scene
        .add_event(AnimationEvent::new(Effect::ZoomIn, 0.0, 2.0), group.into())
        .unwrap();

    let fps = Fps::new(10, 1).unwrap();
    let frames = scene.timeline(fps, None).unwrap();

    // At progress 0.5 each member has collapsed halfway toward the union
    // center (15, 5), not toward its own center.
    let frame = &frames[10];
    let members: Vec<Point> = [id_a, id_b]
        .iter()
        .map(|&id| {
            let mut own = OpSet::new();
            for op in frame.iter() {
                if op.owner == Some(id) {
                    own.add(op.clone());
                }
            }
            own.center_of_gravity().unwrap()
        })
        .collect();
    assert!((members[0].x - 10.0).abs() < 1e-9 && (members[0].y - 5.0).abs() < 1e-9);
    assert!((members[1].x - 20.0).abs() < 1e-9 && (members[1].y - 5.0).abs() < 1e-9);
}

#[test]
fn parallel_sketch_draws_the_union_in_member_order() {
    let a = Square::at(0.0, 0.0);
    let b = Square::at(20.0, 0.0);
    let (id_a, id_b) = (a.id(), b.id());

    let group = DrawableGroup::new(
        vec![DrawableNode::leaf(a), DrawableNode::leaf(b)],
        Grouping::Parallel,
    );
    let mut scene = Scene::new(400, 400);
    scene
        .add_event(AnimationEvent::new(Effect::Sketch, 0.0, 2.0), group.into())
        .unwrap();

    let fps = Fps::new(10, 1).unwrap();
    let frames = scene.timeline(fps, None).unwrap();

    // Halfway through the union sketch the whole first member is drawn and
    // the second has not started: op-count progress walks the union in order.
    let frame = &frames[10];
    assert!(frame.iter().any(|op| op.owner == Some(id_a)));
    assert!(!frame.iter().any(|op| op.owner == Some(id_b)));
    assert_eq!(frame.geometric_count(), 5);

    // At the end both members are fully present.
    let done = &frames[20];
    assert!(done.iter().any(|op| op.owner == Some(id_b)));
    assert_eq!(done.geometric_count(), 10);
}

#[test]
fn parallel_sketch_glow_rides_on_every_member() {
    let a = Square::at(0.0, 0.0);
    let b = Square::at(20.0, 0.0);

    let group = DrawableGroup::new(
        vec![DrawableNode::leaf(a), DrawableNode::leaf(b)],
        Grouping::Parallel,
    );
    let mut scene = Scene::new(400, 400);
    scene
        .add_event(
            AnimationEvent::new(Effect::Sketch, 0.0, 2.0).with_glow(GlowHint::default()),
            group.into(),
        )
        .unwrap();

    let fps = Fps::new(10, 1).unwrap();
    let frames = scene.timeline(fps, None).unwrap();
    let dots = frames[5]
        .iter()
        .filter(|op| matches!(op.kind, OpKind::Dot(_)))
        .count();
    // The glow op carries no owner, so each member's filtered view keeps it.
    assert_eq!(dots, 2);
}

#[test]
fn nested_groups_flatten_into_the_outer_parallel_union() {
    let a = Square::at(0.0, 0.0);
    let b = Square::at(20.0, 0.0);
    let c = Square::at(40.0, 0.0);
    let ids = [a.id(), b.id(), c.id()];

    let inner = DrawableGroup::new(
        vec![DrawableNode::leaf(b), DrawableNode::leaf(c)],
        Grouping::Parallel,
    );
    let outer = DrawableGroup::new(
        vec![DrawableNode::leaf(a), inner.into()],
        Grouping::Parallel,
    );
    let mut scene = Scene::new(400, 400);
    scene
        .add_event(AnimationEvent::new(Effect::FadeIn, 0.0, 1.0), outer.into())
        .unwrap();

    // Every leaf got its own registration.
    for id in ids {
        assert_eq!(scene.registered_events(id).count(), 1);
    }

    let fps = Fps::new(10, 1).unwrap();
    let frames = scene.timeline(fps, None).unwrap();
    let opacities: Vec<f64> = frames[5]
        .iter()
        .filter_map(|op| match &op.kind {
            OpKind::SetPen(pen) => Some(pen.opacity),
            _ => None,
        })
        .collect();
    assert_eq!(opacities, vec![0.5, 0.5, 0.5]);
}
