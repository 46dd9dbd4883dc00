use kurbo::{Affine, CubicBez, ParamCurve, ParamCurveExtrema, Point, QuadBez, Rect, Vec2};

use crate::drawable::ObjectId;
use crate::style::{DotMark, Pen};

/// One drawing instruction. Geometric kinds carry point payloads; `SetPen`
/// and `Dot` carry style payloads; `Metadata` is an opaque pass-through for
/// shape constructors and renderers to agree on.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OpKind {
    Move(Point),
    Line(Point),
    Curve(Point, Point, Point),
    QuadCurve(Point, Point),
    Close,
    SetPen(Pen),
    Dot(DotMark),
    Metadata(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Op {
    pub kind: OpKind,
    /// Fraction of this single segment to render. Values < 1 are only
    /// meaningful on the terminal geometric op of a rendered prefix.
    pub partial: f64,
    /// Drawable that produced this op; set during group-relative application.
    pub owner: Option<ObjectId>,
}

impl Op {
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            partial: 1.0,
            owner: None,
        }
    }

    /// Ops that advance the sketch: everything that draws or moves the pen.
    /// Pen state, marker dots and metadata are setup ops.
    pub fn is_eligible(&self) -> bool {
        matches!(
            self.kind,
            OpKind::Move(_)
                | OpKind::Line(_)
                | OpKind::Curve(..)
                | OpKind::QuadCurve(..)
                | OpKind::Close
        )
    }

    pub fn is_setup(&self) -> bool {
        !self.is_eligible()
    }
}

/// Ordered sequence of drawing instructions for one drawable (or one frame).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OpSet {
    ops: Vec<Op>,
}

impl OpSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    pub fn add(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, other: OpSet) {
        self.ops.extend(other.ops);
    }

    pub fn move_to(&mut self, p: Point) {
        self.add(Op::new(OpKind::Move(p)));
    }

    pub fn line_to(&mut self, p: Point) {
        self.add(Op::new(OpKind::Line(p)));
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.add(Op::new(OpKind::Curve(c1, c2, p)));
    }

    pub fn quad_to(&mut self, c: Point, p: Point) {
        self.add(Op::new(OpKind::QuadCurve(c, p)));
    }

    pub fn close(&mut self) {
        self.add(Op::new(OpKind::Close));
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.add(Op::new(OpKind::SetPen(pen)));
    }

    pub fn dot(&mut self, dot: DotMark) {
        self.add(Op::new(OpKind::Dot(dot)));
    }

    pub fn metadata(&mut self, value: serde_json::Value) {
        self.add(Op::new(OpKind::Metadata(value)));
    }

    pub fn geometric_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_eligible()).count()
    }

    /// Tag every op with the drawable that owns it.
    pub fn set_owner(&mut self, owner: ObjectId) {
        for op in &mut self.ops {
            op.owner = Some(owner);
        }
    }

    /// Keep ops owned by `owner` plus ops that carry no owner at all
    /// (ops emitted by an effect itself rather than by any member).
    pub fn filter_owner(&self, owner: ObjectId) -> OpSet {
        OpSet {
            ops: self
                .ops
                .iter()
                .filter(|op| op.owner.is_none() || op.owner == Some(owner))
                .cloned()
                .collect(),
        }
    }

    fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        for op in &mut self.ops {
            match &mut op.kind {
                OpKind::Move(p) | OpKind::Line(p) => *p = f(*p),
                OpKind::Curve(c1, c2, p) => {
                    *c1 = f(*c1);
                    *c2 = f(*c2);
                    *p = f(*p);
                }
                OpKind::QuadCurve(c, p) => {
                    *c = f(*c);
                    *p = f(*p);
                }
                OpKind::Close | OpKind::SetPen(_) | OpKind::Dot(_) | OpKind::Metadata(_) => {}
            }
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vec2::new(dx, dy);
        self.map_points(|p| p + d);
    }

    /// Scale point offsets from the current center of gravity. The center is
    /// recomputed on every call; sequential calls see the updated content.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        let Some(center) = self.center_of_gravity() else {
            return;
        };
        self.map_points(|p| {
            Point::new(
                center.x + (p.x - center.x) * sx,
                center.y + (p.y - center.y) * sy,
            )
        });
    }

    /// Rotate about `center`, defaulting to the current center of gravity.
    pub fn rotate(&mut self, angle: f64, center: Option<Point>) {
        let center = match center.or_else(|| self.center_of_gravity()) {
            Some(c) => c,
            None => return,
        };
        let xform = Affine::rotate_about(angle, center);
        self.map_points(|p| xform * p);
    }

    /// Bounding box over point data, with curve extrema solved analytically.
    /// `None` when the set holds no point data.
    pub fn bbox(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        let mut pen: Option<Point> = None;
        let mut subpath_start: Option<Point> = None;

        let grow = |bounds: &mut Option<Rect>, r: Rect| {
            *bounds = Some(match bounds {
                Some(b) => b.union(r),
                None => r,
            });
        };

        for op in &self.ops {
            match &op.kind {
                OpKind::Move(p) => {
                    grow(&mut bounds, Rect::from_points(*p, *p));
                    pen = Some(*p);
                    subpath_start = Some(*p);
                }
                OpKind::Line(p) => {
                    grow(&mut bounds, Rect::from_points(*p, *p));
                    if let Some(prev) = pen {
                        grow(&mut bounds, Rect::from_points(prev, *p));
                    }
                    pen = Some(*p);
                }
                OpKind::Curve(c1, c2, p) => {
                    match pen {
                        Some(prev) => {
                            grow(&mut bounds, CubicBez::new(prev, *c1, *c2, *p).bounding_box());
                        }
                        // A curve with no current point is malformed input;
                        // fall back to its control polygon.
                        None => {
                            for q in [c1, c2, p] {
                                grow(&mut bounds, Rect::from_points(*q, *q));
                            }
                        }
                    }
                    pen = Some(*p);
                }
                OpKind::QuadCurve(c, p) => {
                    match pen {
                        Some(prev) => {
                            grow(&mut bounds, QuadBez::new(prev, *c, *p).bounding_box());
                        }
                        None => {
                            for q in [c, p] {
                                grow(&mut bounds, Rect::from_points(*q, *q));
                            }
                        }
                    }
                    pen = Some(*p);
                }
                OpKind::Close => {
                    pen = subpath_start;
                }
                OpKind::SetPen(_) | OpKind::Dot(_) | OpKind::Metadata(_) => {}
            }
        }
        bounds
    }

    /// Bbox midpoint; an approximation of the centroid, not an area centroid.
    pub fn center_of_gravity(&self) -> Option<Point> {
        self.bbox().map(|b| b.center())
    }

    /// Pen position after the final op, honoring a fractional terminal op:
    /// linear interpolation for a partial line, De Casteljau evaluation at
    /// `t = partial` for partial curves.
    pub fn current_point(&self) -> Option<Point> {
        let mut pen: Option<Point> = None;
        let mut subpath_start: Option<Point> = None;

        for op in &self.ops {
            match &op.kind {
                OpKind::Move(p) => {
                    pen = Some(*p);
                    subpath_start = Some(*p);
                }
                OpKind::Line(p) => {
                    pen = Some(match pen {
                        Some(prev) if op.partial < 1.0 => prev.lerp(*p, op.partial),
                        _ => *p,
                    });
                }
                OpKind::Curve(c1, c2, p) => {
                    pen = Some(match pen {
                        Some(prev) if op.partial < 1.0 => {
                            CubicBez::new(prev, *c1, *c2, *p).eval(op.partial)
                        }
                        _ => *p,
                    });
                }
                OpKind::QuadCurve(c, p) => {
                    pen = Some(match pen {
                        Some(prev) if op.partial < 1.0 => {
                            QuadBez::new(prev, *c, *p).eval(op.partial)
                        }
                        _ => *p,
                    });
                }
                OpKind::Close => {
                    if subpath_start.is_some() {
                        pen = subpath_start;
                    }
                }
                OpKind::SetPen(_) | OpKind::Dot(_) | OpKind::Metadata(_) => {}
            }
        }
        pen
    }

    /// Prefix of the set covering `progress` of its drawing work, counted
    /// over ops rather than arc length: with N eligible (non-setup) ops,
    /// the first `floor(progress * N)` of them are emitted verbatim along
    /// with the setup ops interleaved before the stop point, and a positive
    /// remainder appends one copy of the next eligible op with `partial` set
    /// to that fraction. Op-count interpolation gives every segment equal
    /// time regardless of its arc length.
    pub fn partial(&self, progress: f64) -> OpSet {
        if progress <= 0.0 {
            return OpSet::new();
        }
        let progress = progress.min(1.0);

        let n_count = self.geometric_count();
        let n_active = (progress * n_count as f64).floor() as usize;

        let mut out = OpSet::new();
        let mut counter = 0usize;
        let mut idx = 0usize;
        while idx < self.ops.len() && counter < n_active {
            let op = &self.ops[idx];
            if op.is_eligible() {
                counter += 1;
            }
            out.add(op.clone());
            idx += 1;
        }

        let remainder = progress * n_count as f64 - n_active as f64;
        if remainder > 0.0
            && let Some(next) = self.ops[idx..].iter().find(|op| op.is_eligible())
        {
            let mut tail = next.clone();
            tail.partial = remainder;
            out.add(tail);
        }
        out
    }
}

impl IntoIterator for OpSet {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
