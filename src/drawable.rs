use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ScrawlError, ScrawlResult};
use crate::ops::OpSet;
use crate::style::{FillStyle, GlowHint, SketchStyle, StrokeStyle};

/// Immutable identity of a drawable, assigned at construction.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Shared fields every drawable carries: id, styling, and the optional
/// glow-dot hint picked up by Sketch events.
#[derive(Clone, Debug)]
pub struct DrawableCore {
    pub id: ObjectId,
    pub stroke: StrokeStyle,
    pub sketch: SketchStyle,
    pub fill: Option<FillStyle>,
    pub glow_hint: Option<GlowHint>,
}

impl DrawableCore {
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            stroke: StrokeStyle::default(),
            sketch: SketchStyle::default(),
            fill: None,
            glow_hint: None,
        }
    }

    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_sketch(mut self, sketch: SketchStyle) -> Self {
        self.sketch = sketch;
        self
    }

    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_glow_hint(mut self, hint: GlowHint) -> Self {
        self.glow_hint = Some(hint);
        self
    }
}

impl Default for DrawableCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything the scene can animate. Shape constructors implement `draw` to
/// emit the base op set; the scheduler calls it once per id and caches it.
pub trait Drawable: Send + Sync {
    fn core(&self) -> &DrawableCore;

    fn draw(&self) -> OpSet;

    fn id(&self) -> ObjectId {
        self.core().id
    }

    fn stroke_style(&self) -> &StrokeStyle {
        &self.core().stroke
    }

    fn sketch_style(&self) -> &SketchStyle {
        &self.core().sketch
    }

    fn fill_style(&self) -> Option<&FillStyle> {
        self.core().fill.as_ref()
    }

    fn glow_hint(&self) -> Option<&GlowHint> {
        self.core().glow_hint.as_ref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Grouping {
    /// Every member receives the same event, applied over the union geometry.
    Parallel,
    /// The event is split into equal consecutive slices, one per member.
    Series,
}

impl FromStr for Grouping {
    type Err = ScrawlError;

    fn from_str(s: &str) -> ScrawlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "series" => Ok(Self::Series),
            other => Err(ScrawlError::unsupported(format!(
                "unknown grouping method '{other}'"
            ))),
        }
    }
}

/// An ordered collection of drawables animated as one unit.
#[derive(Clone)]
pub struct DrawableGroup {
    id: ObjectId,
    children: Vec<DrawableNode>,
    grouping: Grouping,
}

impl DrawableGroup {
    pub fn new(children: Vec<DrawableNode>, grouping: Grouping) -> Self {
        Self {
            id: ObjectId::new(),
            children,
            grouping,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn children(&self) -> &[DrawableNode] {
        &self.children
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// Ids of every leaf drawable under this group, in order, flattening
    /// nested groups.
    pub fn leaf_ids(&self) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack: Vec<&DrawableNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                DrawableNode::Leaf(d) => out.push(d.id()),
                DrawableNode::Group(g) => stack.extend(g.children.iter().rev()),
            }
        }
        out
    }
}

/// A leaf drawable or a (possibly nested) group, as accepted by `Scene::add`.
#[derive(Clone)]
pub enum DrawableNode {
    Leaf(Arc<dyn Drawable>),
    Group(Arc<DrawableGroup>),
}

impl DrawableNode {
    pub fn leaf(drawable: impl Drawable + 'static) -> Self {
        Self::Leaf(Arc::new(drawable))
    }

    pub fn group(group: DrawableGroup) -> Self {
        Self::Group(Arc::new(group))
    }

    pub fn id(&self) -> ObjectId {
        match self {
            Self::Leaf(d) => d.id(),
            Self::Group(g) => g.id(),
        }
    }
}

impl From<DrawableGroup> for DrawableNode {
    fn from(group: DrawableGroup) -> Self {
        Self::group(group)
    }
}
