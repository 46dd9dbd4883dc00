use std::f64::consts::TAU;

use kurbo::Point;

use crate::drawable::ObjectId;
use crate::ease::Ease;
use crate::error::{ScrawlError, ScrawlResult};
use crate::ops::{Op, OpKind, OpSet};
use crate::style::{DotMark, GlowHint};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    Creation,
    Mutation,
    Deletion,
}

/// What an event does to an op set. A closed set: each variant maps to one
/// pure function below, dispatched from `Effect::apply`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Effect {
    /// Progressive hand-drawn reveal, op by op, optionally trailing a glow
    /// dot at the pen point.
    Sketch,
    FadeIn,
    FadeOut,
    ZoomIn,
    ZoomOut,
    /// Move the center of gravity toward `point`. With `persist`, the final
    /// resting position becomes part of the drawable's effective state.
    TranslateTo { point: Point, persist: bool },
    /// Move the center of gravity from `point` back to where it is.
    TranslateFrom { point: Point },
}

impl Effect {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Sketch | Self::FadeIn | Self::ZoomIn => EventKind::Creation,
            Self::FadeOut | Self::ZoomOut => EventKind::Deletion,
            Self::TranslateTo { .. } | Self::TranslateFrom { .. } => EventKind::Mutation,
        }
    }

    /// Whether the effect's completed result outlives the event window.
    pub fn persists(&self) -> bool {
        matches!(self, Self::TranslateTo { persist: true, .. })
    }

    /// Compute the op set for this effect at `progress`. Callers pre-clamp
    /// progress to [0, 1].
    pub fn apply(&self, base: &OpSet, progress: f64, data: &EventData) -> OpSet {
        debug_assert!((0.0..=1.0).contains(&progress));
        match self {
            Self::Sketch => apply_sketch(base, progress, data.glow.as_ref()),
            Self::FadeIn => apply_fade(base, progress),
            Self::FadeOut => apply_fade(base, 1.0 - progress),
            Self::ZoomIn => apply_zoom(base, progress),
            Self::ZoomOut => apply_zoom(base, 1.0 - progress),
            Self::TranslateTo { point, .. } => apply_translate(base, *point, progress),
            Self::TranslateFrom { point } => apply_translate(base, *point, 1.0 - progress),
        }
    }
}

fn apply_sketch(base: &OpSet, progress: f64, glow: Option<&GlowHint>) -> OpSet {
    if progress <= 0.0 {
        return OpSet::new();
    }
    let mut out = base.partial(progress);
    if let Some(hint) = glow
        && let Some(center) = out.current_point()
    {
        // 5% breathing swing around the hinted radius.
        let breathing = 1.0 + 0.05 * (TAU * progress * hint.frequency).sin();
        out.add(Op::new(OpKind::Dot(DotMark {
            center,
            radius: hint.radius * breathing,
            color: hint.color,
            opacity: 1.0,
        })));
    }
    out
}

fn apply_fade(base: &OpSet, opacity: f64) -> OpSet {
    let mut out = OpSet::new();
    for op in base.iter() {
        let mut op = op.clone();
        if let OpKind::SetPen(pen) = &mut op.kind {
            pen.opacity = opacity;
        }
        out.add(op);
    }
    out
}

fn apply_zoom(base: &OpSet, factor: f64) -> OpSet {
    let mut out = base.clone();
    out.scale(factor, factor);
    out
}

fn apply_translate(base: &OpSet, target: Point, progress: f64) -> OpSet {
    let mut out = base.clone();
    let Some(center) = base.center_of_gravity() else {
        return out;
    };
    out.translate(
        (target.x - center.x) * progress,
        (target.y - center.y) * progress,
    );
    out
}

/// Per-event payload: the glow hint a Sketch picks up, the parallel-group
/// tag the scheduler injects, and a free-form extension value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventData {
    pub glow: Option<GlowHint>,
    pub group: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

/// A timed, atomic animation unit: one effect over `[start_time, end_time]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationEvent {
    pub effect: Effect,
    pub start_time: f64,
    pub duration: f64, // seconds, >= 0
    pub easing: Option<Ease>,
    pub data: EventData,
}

impl AnimationEvent {
    pub fn new(effect: Effect, start_time: f64, duration: f64) -> Self {
        Self {
            effect,
            start_time,
            duration,
            easing: None,
            data: EventData::default(),
        }
    }

    pub fn with_easing(mut self, easing: Ease) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_glow(mut self, hint: GlowHint) -> Self {
        self.data.glow = Some(hint);
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.data.extra = extra;
        self
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn kind(&self) -> EventKind {
        self.effect.kind()
    }

    pub fn is_active_at(&self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time()
    }

    /// Clamped, eased progress at time `t`. Zero-length events are complete
    /// the moment they are reached.
    pub fn progress_at(&self, t: f64) -> f64 {
        let raw = if self.duration <= 0.0 {
            1.0
        } else {
            ((t - self.start_time) / self.duration).clamp(0.0, 1.0)
        };
        match self.easing {
            Some(ease) => ease.apply(raw),
            None => raw,
        }
    }

    pub fn validate(&self) -> ScrawlResult<()> {
        if !self.start_time.is_finite() {
            return Err(ScrawlError::config("event start_time must be finite"));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ScrawlError::config("event duration must be >= 0"));
        }
        Ok(())
    }

    /// Split into `parts` equal back-to-back slices of the same effect, as
    /// consumed by series groups.
    pub fn subdivide(&self, parts: usize) -> Vec<AnimationEvent> {
        if parts <= 1 {
            return vec![self.clone()];
        }
        let slice = self.duration / parts as f64;
        (0..parts)
            .map(|i| {
                let mut ev = self.clone();
                ev.start_time = self.start_time + slice * i as f64;
                ev.duration = slice;
                ev
            })
            .collect()
    }
}

/// An ordered bundle of events. Never applied directly; the scheduler
/// expands it into its children, each registered independently.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositeEvent {
    pub children: Vec<Event>,
}

impl CompositeEvent {
    pub fn new(children: Vec<Event>) -> Self {
        Self { children }
    }

    pub fn start_time(&self) -> f64 {
        self.children
            .iter()
            .map(Event::start_time)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn end_time(&self) -> f64 {
        self.children
            .iter()
            .map(Event::end_time)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// What `Scene::add` accepts: a single atomic event or a composite tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    Atomic(AnimationEvent),
    Composite(CompositeEvent),
}

impl Event {
    pub fn start_time(&self) -> f64 {
        match self {
            Self::Atomic(ev) => ev.start_time,
            Self::Composite(c) => c.start_time(),
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            Self::Atomic(ev) => ev.end_time(),
            Self::Composite(c) => c.end_time(),
        }
    }
}

impl From<AnimationEvent> for Event {
    fn from(ev: AnimationEvent) -> Self {
        Self::Atomic(ev)
    }
}

impl From<CompositeEvent> for Event {
    fn from(c: CompositeEvent) -> Self {
        Self::Composite(c)
    }
}
