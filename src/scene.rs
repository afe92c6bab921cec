//! Retained scene graph that every gauge writes its geometry into.
//!
//! Items live in a generational arena owned by the [`Scene`]. An [`ItemId`]
//! stays valid until the item (or one of its ancestors) is removed; after that
//! every operation on it is a no-op. Children move and disappear with their
//! parent, which is how gauges keep roll/pitch-dependent geometry together
//! under a single transform.

use crate::color::Color;
use crate::geometry::{Anchor, Point, Rect, Transform};
use crate::text::TextMetrics;

/// Angular step used when flattening arcs and ellipses into polylines.
const ARC_STEP_DEGREES: f64 = 4.0;

// ============================================================================
// PAINT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }

    /// One pixel wide line.
    pub const fn hairline(color: Color) -> Self {
        Self::new(color, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    /// Two-stop gradient along the segment `start..end`, clamped beyond it.
    LinearGradient {
        start: Point,
        end: Point,
        from: Color,
        to: Color,
    },
}

impl Fill {
    /// Color of the fill at `p`, in the item's local coordinates.
    pub fn color_at(&self, p: Point) -> Color {
        match *self {
            Fill::Solid(color) => color,
            Fill::LinearGradient {
                start,
                end,
                from,
                to,
            } => {
                let axis = end - start;
                let len_sq = axis.x * axis.x + axis.y * axis.y;
                if len_sq <= f64::EPSILON {
                    return from;
                }
                let rel = p - start;
                let t = (rel.x * axis.x + rel.y * axis.y) / len_sq;
                from.lerp(to, t)
            }
        }
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Angles are in degrees, 0 pointing right and increasing counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Elliptical arc inscribed in `rect`. A straight segment joins the
    /// current point to the arc's start.
    ArcTo { rect: Rect, start: f64, sweep: f64 },
    Close,
}

/// A flattened run of connected points.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Point on the ellipse inscribed in `rect` at `degrees`.
pub fn ellipse_point(rect: &Rect, degrees: f64) -> Point {
    let c = rect.center();
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(c.x + rect.width / 2.0 * cos, c.y - rect.height / 2.0 * sin)
}

fn arc_points(rect: &Rect, start: f64, sweep: f64) -> impl Iterator<Item = Point> + '_ {
    let steps = (sweep.abs() / ARC_STEP_DEGREES).ceil().max(1.0) as usize;
    (0..=steps).map(move |i| ellipse_point(rect, start + sweep * i as f64 / steps as f64))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygon(points: &[Point]) -> Self {
        let mut path = Self::new();
        path.add_polygon(points);
        path
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    /// Start a new subpath at the point of the ellipse in `rect` at `degrees`.
    pub fn arc_move_to(&mut self, rect: Rect, degrees: f64) -> &mut Self {
        self.move_to(ellipse_point(&rect, degrees))
    }

    pub fn arc_to(&mut self, rect: Rect, start: f64, sweep: f64) -> &mut Self {
        self.commands.push(PathCommand::ArcTo { rect, start, sweep });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Open polyline through `points`; empty input adds nothing.
    pub fn add_polygon(&mut self, points: &[Point]) -> &mut Self {
        if let Some((first, rest)) = points.split_first() {
            self.move_to(*first);
            for p in rest {
                self.line_to(*p);
            }
        }
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn flatten(&self) -> Vec<Subpath> {
        let mut out = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let flush = |current: &mut Vec<Point>, out: &mut Vec<Subpath>, closed: bool| {
            let points = std::mem::take(current);
            if points.len() > 1 {
                out.push(Subpath { points, closed });
            }
        };
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) => {
                    flush(&mut current, &mut out, false);
                    current.push(*p);
                }
                PathCommand::LineTo(p) => {
                    if current.is_empty() {
                        current.push(Point::ORIGIN);
                    }
                    current.push(*p);
                }
                PathCommand::ArcTo { rect, start, sweep } => {
                    current.extend(arc_points(rect, *start, *sweep));
                }
                PathCommand::Close => {
                    let start = current.first().copied();
                    flush(&mut current, &mut out, true);
                    // drawing continues from the start of the closed subpath
                    if let Some(p) = start {
                        current.push(p);
                    }
                }
            }
        }
        flush(&mut current, &mut out, false);
        out
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(self.flatten().into_iter().flat_map(|s| s.points))
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// A positioned single-line text run. `origin` is the top-left of its line box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub size: f64,
    pub color: Color,
    pub extent: Rect,
    pub ascent: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, size: f64, color: Color, metrics: &dyn TextMetrics) -> Self {
        let text = text.into();
        let extent = metrics.bounding_rect(&text, size);
        Self {
            ascent: metrics.ascent(size),
            text,
            origin: Point::ORIGIN,
            size,
            color,
            extent,
        }
    }

    /// Place the run so that `anchor` of its box lands on `target`.
    pub fn anchored(mut self, anchor: Anchor, target: Point) -> Self {
        self.origin = target + anchor.offset(&self.extent);
        self
    }

    /// Place the run with its baseline starting at `p`.
    pub fn at_baseline(mut self, p: Point) -> Self {
        self.origin = Point::new(p.x, p.y - self.ascent);
        self
    }

    pub fn rect(&self) -> Rect {
        self.extent.translated(self.origin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Path {
        path: Path,
        stroke: Option<Stroke>,
        fill: Option<Fill>,
    },
    Polygon {
        points: Vec<Point>,
        stroke: Option<Stroke>,
        fill: Option<Fill>,
    },
    Rect {
        rect: Rect,
        radius: f64,
        stroke: Option<Stroke>,
        fill: Option<Fill>,
    },
    Ellipse {
        rect: Rect,
        stroke: Option<Stroke>,
        fill: Option<Fill>,
    },
    Text(TextRun),
    /// Carries only a transform for its children.
    Group,
}

impl Primitive {
    pub fn stroked_path(path: Path, stroke: Stroke) -> Self {
        Primitive::Path {
            path,
            stroke: Some(stroke),
            fill: None,
        }
    }

    pub fn line(from: Point, to: Point, stroke: Stroke) -> Self {
        let mut path = Path::new();
        path.move_to(from).line_to(to);
        Self::stroked_path(path, stroke)
    }

    pub fn filled_polygon(points: Vec<Point>, stroke: Option<Stroke>, fill: Fill) -> Self {
        Primitive::Polygon {
            points,
            stroke,
            fill: Some(fill),
        }
    }

    pub fn rect(rect: Rect, stroke: Option<Stroke>, fill: Option<Fill>) -> Self {
        Primitive::Rect {
            rect,
            radius: 0.0,
            stroke,
            fill,
        }
    }

    pub fn stroke(&self) -> Option<Stroke> {
        match self {
            Primitive::Path { stroke, .. }
            | Primitive::Polygon { stroke, .. }
            | Primitive::Rect { stroke, .. }
            | Primitive::Ellipse { stroke, .. } => *stroke,
            Primitive::Text(_) | Primitive::Group => None,
        }
    }

    pub fn fill(&self) -> Option<Fill> {
        match self {
            Primitive::Path { fill, .. }
            | Primitive::Polygon { fill, .. }
            | Primitive::Rect { fill, .. }
            | Primitive::Ellipse { fill, .. } => *fill,
            Primitive::Text(_) | Primitive::Group => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Primitive::Text(run) => Some(run),
            _ => None,
        }
    }

    /// Outline of the shape as polylines in local coordinates. Text and groups have none.
    pub fn outlines(&self) -> Vec<Subpath> {
        match self {
            Primitive::Path { path, .. } => path.flatten(),
            Primitive::Polygon { points, .. } => vec![Subpath {
                points: points.clone(),
                closed: true,
            }],
            Primitive::Rect { rect, radius, .. } => vec![rounded_rect_outline(rect, *radius)],
            Primitive::Ellipse { rect, .. } => vec![Subpath {
                points: arc_points(rect, 0.0, 360.0).collect(),
                closed: true,
            }],
            Primitive::Text(_) | Primitive::Group => Vec::new(),
        }
    }

    /// Local bounds including half the stroke width. `None` for groups and empty paths.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Primitive::Group => None,
            Primitive::Text(run) => Some(run.rect()),
            Primitive::Rect { rect, .. } | Primitive::Ellipse { rect, .. } => {
                Some(self.pad_for_stroke(*rect))
            }
            Primitive::Polygon { points, .. } => {
                Rect::bounding(points.iter().copied()).map(|r| self.pad_for_stroke(r))
            }
            Primitive::Path { path, .. } => path.bounding_rect().map(|r| self.pad_for_stroke(r)),
        }
    }

    fn pad_for_stroke(&self, rect: Rect) -> Rect {
        match self.stroke() {
            Some(stroke) => rect.inflated(stroke.width / 2.0),
            None => rect,
        }
    }
}

fn rounded_rect_outline(rect: &Rect, radius: f64) -> Subpath {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 {
        return Subpath {
            points: rect.corners().to_vec(),
            closed: true,
        };
    }
    let d = 2.0 * r;
    let corner = |x: f64, y: f64| Rect::new(x, y, d, d);
    let mut points = Vec::new();
    points.extend(arc_points(&corner(rect.right() - d, rect.top()), 0.0, 90.0));
    points.extend(arc_points(&corner(rect.left(), rect.top()), 90.0, 90.0));
    points.extend(arc_points(&corner(rect.left(), rect.bottom() - d), 180.0, 90.0));
    points.extend(arc_points(&corner(rect.right() - d, rect.bottom() - d), 270.0, 90.0));
    Subpath {
        points,
        closed: true,
    }
}

// ============================================================================
// SCENE ARENA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub primitive: Primitive,
    pub transform: Transform,
    pub z: f64,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    seq: u64,
}

impl Item {
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    item: Option<Item>,
}

/// One entry of [`Scene::draw_list`]: what to paint and where.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub id: ItemId,
    pub primitive: &'a Primitive,
    pub transform: Transform,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_seq: u64,
    background: Option<Color>,
    scene_rect: Option<Rect>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, primitive: Primitive) -> ItemId {
        self.insert(primitive, None)
    }

    /// Add `primitive` under `parent`. A stale parent makes it top-level.
    pub fn add_child(&mut self, parent: ItemId, primitive: Primitive) -> ItemId {
        let parent = self.contains(parent).then_some(parent);
        let id = self.insert(primitive, parent);
        if let Some(p) = parent.and_then(|p| self.item_mut(p)) {
            p.children.push(id);
        }
        id
    }

    fn insert(&mut self, primitive: Primitive, parent: Option<ItemId>) -> ItemId {
        let item = Item {
            primitive,
            transform: Transform::identity(),
            z: 0.0,
            parent,
            children: Vec::new(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.item = Some(item);
                ItemId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    item: Some(item),
                });
                ItemId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Remove an item together with all of its descendants.
    pub fn remove(&mut self, id: ItemId) {
        let Some(parent) = self.get(id).map(|item| item.parent) else {
            return;
        };
        if let Some(p) = parent.and_then(|p| self.item_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let slot = &mut self.slots[next.index as usize];
            if let Some(item) = slot.item.take() {
                pending.extend(item.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
            }
        }
    }

    /// Remove the item held in `slot`, if any, and leave the slot empty.
    pub fn remove_slot(&mut self, slot: &mut Option<ItemId>) {
        if let Some(id) = slot.take() {
            self.remove(id);
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.item.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free = (0..self.slots.len() as u32).rev().collect();
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_ref())
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_mut())
    }

    pub fn primitive(&self, id: ItemId) -> Option<&Primitive> {
        self.get(id).map(|item| &item.primitive)
    }

    pub fn set_primitive(&mut self, id: ItemId, primitive: Primitive) {
        if let Some(item) = self.item_mut(id) {
            item.primitive = primitive;
        }
    }

    pub fn set_transform(&mut self, id: ItemId, transform: Transform) {
        if let Some(item) = self.item_mut(id) {
            item.transform = transform;
        }
    }

    pub fn transform(&self, id: ItemId) -> Option<Transform> {
        self.get(id).map(|item| item.transform)
    }

    pub fn set_z_value(&mut self, id: ItemId, z: f64) {
        if let Some(item) = self.item_mut(id) {
            item.z = z;
        }
    }

    /// Local transform composed with every ancestor's.
    pub fn world_transform(&self, id: ItemId) -> Option<Transform> {
        let mut item = self.get(id)?;
        let mut world = item.transform;
        while let Some(parent) = item.parent.and_then(|p| self.get(p)) {
            world = world.then(&parent.transform);
            item = parent;
        }
        Some(world)
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = (!color.is_transparent()).then_some(color);
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_scene_rect(&mut self, rect: Rect) {
        self.scene_rect = Some(rect);
    }

    /// Explicit scene rect, or the bounds of every item when none was set.
    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
            .unwrap_or_else(|| self.items_bounding_rect())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn top_level(&self) -> Vec<ItemId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let item = slot.item.as_ref()?;
                item.parent.is_none().then_some(ItemId {
                    index: index as u32,
                    generation: slot.generation,
                })
            })
            .collect()
    }

    fn sorted(&self, mut ids: Vec<ItemId>) -> Vec<(ItemId, &Item)> {
        let mut items: Vec<_> = ids
            .drain(..)
            .filter_map(|id| self.get(id).map(|item| (id, item)))
            .collect();
        items.sort_by(|a, b| a.1.z.total_cmp(&b.1.z).then(a.1.seq.cmp(&b.1.seq)));
        items
    }

    /// Items in paint order with their world transforms.
    ///
    /// Siblings paint by z then insertion order. Children paint after their
    /// parent, except children with negative z which paint behind it.
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let mut out = Vec::with_capacity(self.len());
        for (id, item) in self.sorted(self.top_level()) {
            self.collect_draw(id, item, Transform::identity(), &mut out);
        }
        out
    }

    fn collect_draw<'a>(
        &'a self,
        id: ItemId,
        item: &'a Item,
        parent_world: Transform,
        out: &mut Vec<DrawItem<'a>>,
    ) {
        let world = item.transform.then(&parent_world);
        let children = self.sorted(item.children.clone());
        let (behind, front): (Vec<_>, Vec<_>) = children.into_iter().partition(|(_, c)| c.z < 0.0);
        for (child_id, child) in behind {
            self.collect_draw(child_id, child, world, out);
        }
        out.push(DrawItem {
            id,
            primitive: &item.primitive,
            transform: world,
        });
        for (child_id, child) in front {
            self.collect_draw(child_id, child, world, out);
        }
    }

    /// Union of every item's bounds in scene coordinates.
    pub fn items_bounding_rect(&self) -> Rect {
        self.draw_list()
            .iter()
            .filter_map(|d| d.primitive.bounding_rect().map(|r| d.transform.map_rect(&r)))
            .reduce(|a, b| a.united(&b))
            .unwrap_or_default()
    }

    /// Every text run in paint order with its world transform.
    pub fn texts(&self) -> Vec<(&TextRun, Transform)> {
        self.draw_list()
            .into_iter()
            .filter_map(|d| d.primitive.as_text().map(|t| (t, d.transform)))
            .collect()
    }
}
