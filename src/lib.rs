#![forbid(unsafe_code)]

pub mod core;
pub mod drawable;
pub mod ease;
pub mod error;
pub mod event;
pub mod ops;
pub mod scene;
pub mod style;

pub use self::core::{Color, Fps, Point, Rect, Vec2};
pub use drawable::{Drawable, DrawableCore, DrawableGroup, DrawableNode, Grouping, ObjectId};
pub use ease::Ease;
pub use error::{ScrawlError, ScrawlResult};
pub use event::{AnimationEvent, CompositeEvent, Effect, Event, EventData, EventKind};
pub use ops::{Op, OpKind, OpSet};
pub use scene::Scene;
pub use style::{
    DotMark, FillPattern, FillStyle, GlowHint, Pen, PenMode, SketchStyle, StrokePressure,
    StrokeStyle,
};
