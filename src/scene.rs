use std::collections::{BTreeSet, HashMap};

use crate::core::{Color, Fps};
use crate::drawable::{Drawable, DrawableNode, Grouping, ObjectId};
use crate::error::{ScrawlError, ScrawlResult};
use crate::event::{AnimationEvent, Effect, Event, EventKind};
use crate::ops::OpSet;

/// One atomic event registered against one drawable id, in arrival order.
#[derive(Clone, Debug)]
struct Registered {
    seq: usize,
    object: ObjectId,
    event: AnimationEvent,
}

/// Base op sets, computed once per id at first registration.
#[derive(Default)]
struct DrawableArena {
    entries: HashMap<ObjectId, OpSet>,
}

impl DrawableArena {
    fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    fn insert(&mut self, id: ObjectId, base: OpSet) {
        self.entries.insert(id, base);
    }

    fn base(&self, id: ObjectId) -> Option<&OpSet> {
        self.entries.get(&id)
    }
}

/// The scheduler: owns the drawable arena, per-object visibility toggles and
/// registered events, and turns them into one op set per frame.
pub struct Scene {
    width: u32,
    height: u32,
    background: Option<Color>,
    arena: DrawableArena,
    registered: Vec<Registered>,
    /// Toggle timestamps per id; an odd count of stamps <= t means visible.
    timelines: HashMap<ObjectId, Vec<f64>>,
    /// First-registration order; frame output follows it.
    order: Vec<ObjectId>,
    /// Parallel-group membership (leaf ids, in group order).
    groups: HashMap<ObjectId, Vec<ObjectId>>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Color::WHITE),
            arena: DrawableArena::default(),
            registered: Vec::new(),
            timelines: HashMap::new(),
            order: Vec::new(),
            groups: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Register an event against a drawable. Composites expand into their
    /// children; series groups slice the event across members; parallel
    /// groups tag it and fan it out. A drawable with no event gets a
    /// zero-length Sketch so it simply appears.
    pub fn add(
        &mut self,
        event: Option<Event>,
        drawable: Option<DrawableNode>,
    ) -> ScrawlResult<()> {
        let (event, node) = match (event, drawable) {
            (None, None) => {
                return Err(ScrawlError::config(
                    "either an event or a drawable must be given",
                ));
            }
            (Some(_), None) => {
                return Err(ScrawlError::config("an event needs a drawable to act on"));
            }
            (None, Some(node)) => {
                let sketch = AnimationEvent::new(Effect::Sketch, 0.0, 0.0);
                (Event::Atomic(sketch), node)
            }
            (Some(event), Some(node)) => (event, node),
        };

        // Explicit work-list; depth-first so expansion order matches the
        // order the children were written in.
        let mut stack: Vec<(Event, DrawableNode)> = vec![(event, node)];
        while let Some((event, node)) = stack.pop() {
            match event {
                Event::Composite(composite) => {
                    for child in composite.children.into_iter().rev() {
                        stack.push((child, node.clone()));
                    }
                }
                Event::Atomic(event) => {
                    event.validate()?;
                    match &node {
                        DrawableNode::Group(group) => match group.grouping() {
                            Grouping::Series => {
                                let parts = event.subdivide(group.children().len());
                                for (part, child) in
                                    parts.into_iter().zip(group.children()).rev()
                                {
                                    stack.push((Event::Atomic(part), child.clone()));
                                }
                            }
                            Grouping::Parallel => {
                                self.groups.insert(group.id(), group.leaf_ids());
                                for child in group.children().iter().rev() {
                                    let mut tagged = event.clone();
                                    tagged.data.group = Some(group.id());
                                    stack.push((Event::Atomic(tagged), child.clone()));
                                }
                            }
                        },
                        DrawableNode::Leaf(leaf) => self.register(event, leaf.as_ref()),
                    }
                }
            }
        }
        Ok(())
    }

    pub fn add_event(
        &mut self,
        event: impl Into<Event>,
        drawable: DrawableNode,
    ) -> ScrawlResult<()> {
        self.add(Some(event.into()), Some(drawable))
    }

    pub fn add_drawable(&mut self, drawable: DrawableNode) -> ScrawlResult<()> {
        self.add(None, Some(drawable))
    }

    fn register(&mut self, mut event: AnimationEvent, drawable: &dyn Drawable) {
        let id = drawable.id();
        if !self.arena.contains(id) {
            self.arena.insert(id, drawable.draw());
            self.timelines.insert(id, Vec::new());
            self.order.push(id);
        }

        // Schedule-time data injection: a Sketch inherits the drawable's
        // glow hint unless the author set one on the event.
        if matches!(event.effect, Effect::Sketch) && event.data.glow.is_none() {
            event.data.glow = drawable.glow_hint().copied();
        }

        let timeline = self.timelines.entry(id).or_default();
        match event.kind() {
            EventKind::Creation => timeline.push(event.start_time),
            EventKind::Deletion => {
                if timeline.is_empty() {
                    // Deleting something never created: it must have been
                    // there all along, starting when the deletion starts.
                    timeline.push(event.start_time);
                }
                timeline.push(event.end_time());
            }
            EventKind::Mutation => {}
        }

        self.registered.push(Registered {
            seq: self.registered.len(),
            object: id,
            event,
        });
    }

    /// Events registered against `id`, in registration order.
    pub fn registered_events(&self, id: ObjectId) -> impl Iterator<Item = &AnimationEvent> {
        self.registered
            .iter()
            .filter(move |r| r.object == id)
            .map(|r| &r.event)
    }

    /// Ids visible at `t`: an odd count of toggle stamps <= t.
    pub fn active_objects(&self, t: f64) -> Vec<ObjectId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.timelines
                    .get(id)
                    .is_some_and(|stamps| stamps.iter().filter(|&&s| s <= t).count() % 2 == 1)
            })
            .collect()
    }

    /// Every distinct event start/end time, sorted, plus the explicit max
    /// length when given. Active objects only change at these times.
    pub fn key_frames(&self, max_length: Option<f64>) -> Vec<f64> {
        let mut times: Vec<f64> = Vec::with_capacity(self.registered.len() * 2 + 1);
        for r in &self.registered {
            times.push(r.event.start_time);
            times.push(r.event.end_time());
        }
        if let Some(len) = max_length {
            times.push(len);
        }
        times.sort_by(f64::total_cmp);
        times.dedup();
        times
    }

    /// The effective state of `id` at time `t`: the cached base op set with
    /// every persisted event that has finished by `t` replayed in end-time
    /// order. Unknown ids yield an empty set.
    pub fn state_at(&self, id: ObjectId, t: f64) -> OpSet {
        self.replay_state(id, t, true, None)
    }

    /// History replay up to `cutoff`. `include_boundary` decides whether an
    /// event ending exactly at the cutoff has taken effect; group
    /// reconstruction wants the state just *before* its start, so it
    /// excludes the boundary (and the event being applied).
    fn replay_state(
        &self,
        id: ObjectId,
        cutoff: f64,
        include_boundary: bool,
        exclude_seq: Option<usize>,
    ) -> OpSet {
        let Some(base) = self.arena.base(id) else {
            return OpSet::new();
        };

        let mut persisted: Vec<&Registered> = self
            .registered
            .iter()
            .filter(|r| {
                r.object == id
                    && Some(r.seq) != exclude_seq
                    && r.event.effect.persists()
                    && (r.event.end_time() < cutoff
                        || (include_boundary && r.event.end_time() == cutoff))
            })
            .collect();
        persisted.sort_by(|a, b| a.event.end_time().total_cmp(&b.event.end_time()));

        let mut state = base.clone();
        for r in persisted {
            state = self.apply_registered(r, id, 1.0, state);
        }
        state
    }

    /// Apply one event for one object. Group-tagged events reconstruct the
    /// whole group's combined state as of just before the event start, tag
    /// each op with its owning member, apply once over the union, and filter
    /// back to the member being rendered. Everything else threads the
    /// incoming state straight through the effect.
    fn apply_registered(
        &self,
        r: &Registered,
        object: ObjectId,
        progress: f64,
        threaded: OpSet,
    ) -> OpSet {
        if let Some(group_id) = r.event.data.group
            && let Some(members) = self.groups.get(&group_id)
        {
            let mut union = OpSet::new();
            for &member in members {
                let mut member_state =
                    self.replay_state(member, r.event.start_time, false, Some(r.seq));
                member_state.set_owner(member);
                union.extend(member_state);
            }
            let applied = r.event.effect.apply(&union, progress, &r.event.data);
            return applied.filter_owner(object);
        }
        r.event.effect.apply(&threaded, progress, &r.event.data)
    }

    /// Compose one active object at time `t`: persisted base state, then
    /// every overlapping event in registration order, each output threading
    /// into the next.
    fn compose_object(&self, id: ObjectId, t: f64) -> OpSet {
        let mut current = self.state_at(id, t);
        for r in self.registered.iter() {
            if r.object != id || !r.event.is_active_at(t) {
                continue;
            }
            let progress = r.event.progress_at(t);
            current = self.apply_registered(r, id, progress, current);
        }
        current
    }

    /// Compute the full animation: one op set per frame, frame 0 through the
    /// final frame inclusive. Active objects are refreshed at keyframes and
    /// held constant in between.
    #[tracing::instrument(skip(self))]
    pub fn timeline(&self, fps: Fps, max_length: Option<f64>) -> ScrawlResult<Vec<OpSet>> {
        if let Some(len) = max_length
            && !(len.is_finite() && len >= 0.0)
        {
            return Err(ScrawlError::config("max_length must be finite and >= 0"));
        }

        let key_times = self.key_frames(max_length);
        let end_secs = max_length.unwrap_or_else(|| key_times.last().copied().unwrap_or(0.0));
        let max_frame = fps.secs_to_frames_round(end_secs);
        let key_frames: BTreeSet<u64> = key_times
            .iter()
            .map(|&s| fps.secs_to_frames_round(s))
            .collect();

        let mut frames = Vec::with_capacity(max_frame as usize + 1);
        let mut active: Vec<ObjectId> = Vec::new();
        for frame in 0..=max_frame {
            let t = fps.frames_to_secs(frame);
            if key_frames.contains(&frame) {
                active = self.active_objects(t);
                tracing::debug!(frame, active = active.len(), "keyframe");
            }

            let mut frame_ops = OpSet::new();
            for &id in &active {
                frame_ops.extend(self.compose_object(id, t));
            }
            frames.push(frame_ops);
        }
        Ok(frames)
    }

    /// Single-frame snapshot for debugging: the op set at `seconds`, clamped
    /// to the computed timeline.
    pub fn frame_at(
        &self,
        fps: Fps,
        seconds: f64,
        max_length: Option<f64>,
    ) -> ScrawlResult<OpSet> {
        let mut frames = self.timeline(fps, max_length)?;
        let last = frames.len().saturating_sub(1);
        let idx = (fps.secs_to_frames_round(seconds) as usize).min(last);
        Ok(frames.swap_remove(idx))
    }
}
