//! Circular dial: colored low/mid/high bands along an arc, radial ticks with
//! labels, a rotating pointer and a reading readout below the hub.

use std::f64::consts::TAU;

use crate::color::Color;
use crate::config::{GaugeBase, Reading, ScaleConfig};
use crate::geometry::{Anchor, Point, Rect, Transform};
use crate::scale::ticks_from;
use crate::scene::{ellipse_point, Fill, ItemId, Path, Primitive, Scene, Stroke, TextRun};
use crate::text::DEFAULT_FONT_SIZE;
use crate::Gauge;

/// Scale defaults for a dial: short ticks relative to the dial size.
pub fn default_scale_config() -> ScaleConfig {
    ScaleConfig::builder()
        .major_tick_length(0.05)
        .minor_tick_length(0.025)
        .build()
}

#[derive(Debug)]
pub struct DialEngine {
    base: GaugeBase,
    scene: Scene,

    low_angle: f64,
    high_angle: f64,
    arc_width: f64,

    // layout, valid after a rebuild
    size: f64,
    arc_size: f64,
    arc_origin: Point,
    pointer_shape: Vec<Point>,
    full_rebuilds: u64,

    pointer: Option<ItemId>,
    reading_box: Option<ItemId>,
    label: Option<ItemId>,
}

impl Default for DialEngine {
    fn default() -> Self {
        Self::new(default_scale_config())
    }
}

impl DialEngine {
    pub fn new(config: ScaleConfig) -> Self {
        Self {
            base: GaugeBase::new(config),
            scene: Scene::new(),
            low_angle: 225.0,
            high_angle: -45.0,
            arc_width: 0.04,
            size: 0.0,
            arc_size: 0.0,
            arc_origin: Point::ORIGIN,
            pointer_shape: Vec::new(),
            full_rebuilds: 0,
            pointer: None,
            reading_box: None,
            label: None,
        }
    }

    /// Angle of the bottom of the scale: 0 points right, positive is counter-clockwise.
    pub fn set_low_angle(&mut self, degrees: f64) {
        self.low_angle = degrees;
        self.base.mark_dirty();
    }

    /// Angle of the top of the scale. For a clockwise dial this is smaller than the low angle.
    pub fn set_high_angle(&mut self, degrees: f64) {
        self.high_angle = degrees;
        self.base.mark_dirty();
    }

    /// Band thickness as a fraction of the dial size.
    pub fn set_arc_width(&mut self, fraction: f64) {
        self.arc_width = fraction.clamp(0.0, 0.5);
        self.base.mark_dirty();
    }

    pub fn low_angle(&self) -> f64 {
        self.low_angle
    }

    pub fn high_angle(&self) -> f64 {
        self.high_angle
    }

    pub fn arc_size(&self) -> f64 {
        self.arc_size
    }

    pub fn full_rebuilds(&self) -> u64 {
        self.full_rebuilds
    }

    pub fn pointer_item(&self) -> Option<ItemId> {
        self.pointer
    }

    pub fn reading_item(&self) -> Option<ItemId> {
        self.reading_box
    }

    fn arc_rect(&self) -> Rect {
        Rect::new(self.arc_origin.x, self.arc_origin.y, self.arc_size, self.arc_size)
    }

    /// Center of the arc's ellipse.
    pub fn center(&self) -> Point {
        self.arc_rect().center()
    }

    fn angle_for(&self, value: f64) -> f64 {
        self.base.value_to_angle(value, self.low_angle, self.high_angle)
    }

    fn tick_length(&self) -> f64 {
        self.size * self.base.config().major_tick_length
    }

    /// Ticks start this far inside the arc.
    fn tick_offset(&self) -> f64 {
        0.5 * self.size * self.base.config().major_tick_length
    }

    /// Distance from the arc to the inner end of a major tick, less some of
    /// the padding text boxes carry.
    fn label_distance(&self) -> f64 {
        let offset = self.tick_offset();
        offset + self.tick_length() - 0.5 * offset
    }

    // ------------------------------------------------------------------------
    // Scene construction
    // ------------------------------------------------------------------------

    fn rebuild(&mut self) {
        self.scene.clear();
        self.pointer = None;
        self.reading_box = None;
        self.label = None;

        let (w, h) = (self.base.width(), self.base.height());
        let view = Rect::from_size(w, h);
        self.scene.set_background(self.base.config().background_color);
        self.scene.set_scene_rect(view);
        self.scene.add(Primitive::rect(view, None, None));

        self.size = w.max(h);
        self.arc_size = self.size * (1.0 - 2.0 * self.arc_width);
        self.arc_origin = self.centered_arc_origin(w, h);

        self.build_bands();
        self.build_ticks(self.base.config().minor_spacing, self.base.config().minor_tick_length);
        self.build_ticks(self.base.config().major_spacing, self.base.config().major_tick_length);
        self.build_tick_labels();
        self.build_label();
        self.construct_pointer();

        self.base.mark_clean();
        self.full_rebuilds += 1;
        tracing::debug!(
            size = self.size,
            arc_size = self.arc_size,
            low_angle = self.low_angle,
            high_angle = self.high_angle,
            items = self.scene.len(),
            "dial scene rebuilt"
        );

        self.update_reading();
    }

    /// Position the arc so its stroked extent is centered in the viewport.
    fn centered_arc_origin(&self, w: f64, h: f64) -> Point {
        let probe_rect = Rect::from_size(self.arc_size, self.arc_size);
        let mut probe = Path::new();
        probe
            .arc_move_to(probe_rect, self.high_angle)
            .arc_to(probe_rect, self.high_angle, self.low_angle - self.high_angle);
        let stroke = Stroke::new(Color::BLACK, self.size * self.arc_width);
        let bound = Primitive::stroked_path(probe, stroke)
            .bounding_rect()
            .unwrap_or(probe_rect);
        Point::new(
            (w - bound.width) / 2.0 - bound.x,
            (h - bound.height) / 2.0 - bound.y,
        )
    }

    /// One thick arc per range, each drawn from its top value down to its bottom.
    fn build_bands(&mut self) {
        let cfg = self.base.config();
        let rect = self.arc_rect();
        let width = self.size * self.arc_width;
        let bands = [
            (self.base.top_of_mid_range(), self.base.top_of_scale(), cfg.high_color),
            (self.base.top_of_low_range(), self.base.top_of_mid_range(), cfg.mid_color),
            (cfg.scale_start, self.base.top_of_low_range(), cfg.low_color),
        ];
        for (bottom, top, color) in bands {
            let top_angle = self.angle_for(top);
            let bottom_angle = self.angle_for(bottom);
            let mut path = Path::new();
            path.arc_move_to(rect, top_angle)
                .arc_to(rect, top_angle, bottom_angle - top_angle);
            self.scene
                .add(Primitive::stroked_path(path, Stroke::new(color, width)));
        }
    }

    fn build_ticks(&mut self, spacing: f64, length_fraction: f64) {
        if length_fraction <= 0.0 || spacing <= 0.0 {
            return;
        }
        let cfg = self.base.config();
        let rect = self.arc_rect();
        let offset = self.tick_offset();
        let length = self.size * length_fraction;
        let mut path = Path::new();
        for value in ticks_from(cfg.scale_start, self.base.top_of_scale(), spacing) {
            let angle = self.angle_for(value);
            let inward = inward(angle);
            let start = ellipse_point(&rect, angle) + inward * offset;
            path.move_to(start).line_to(start + inward * length);
        }
        self.scene
            .add(Primitive::stroked_path(path, Stroke::hairline(cfg.tick_color)));
    }

    /// Tick labels sit just inside the major ticks. Each box is shifted along
    /// its ray so the edge the ray crosses touches the tick end.
    fn build_tick_labels(&mut self) {
        let cfg = self.base.config();
        if cfg.major_tick_length <= 0.0 || cfg.major_spacing <= 0.0 || !cfg.tick_labels_enabled {
            return;
        }
        let rect = self.arc_rect();
        let distance = self.label_distance();
        let mut labels = Vec::new();
        for value in ticks_from(cfg.scale_start, self.base.top_of_scale(), cfg.major_spacing) {
            let angle = self.angle_for(value);
            let location = ellipse_point(&rect, angle) + inward(angle) * distance;
            let run = TextRun::new(
                self.base.format_tick(value),
                DEFAULT_FONT_SIZE,
                cfg.tick_color,
                self.base.metrics(),
            );
            let shift = ray_exit_offset(&run.extent, angle);
            let origin = location + Anchor::Center.offset(&run.extent) + shift;
            labels.push(run.anchored(Anchor::TopLeft, origin));
        }
        for label in labels {
            self.scene.add(Primitive::Text(label));
        }
    }

    /// Gauge name above the hub in a large font.
    fn build_label(&mut self) {
        let cfg = self.base.config();
        if !cfg.labels_enabled || cfg.label.is_empty() {
            return;
        }
        let run = TextRun::new(
            cfg.label.clone(),
            self.size / 10.0,
            cfg.tick_color,
            self.base.metrics(),
        );
        let lift = run.extent.height / 2.0 + self.arc_size / 20.0;
        let target = self.center() - Point::new(0.0, lift);
        let run = run.anchored(Anchor::Center, target);
        self.label = Some(self.scene.add(Primitive::Text(run)));
    }

    /// Pointer outline along +y, sized to reach the tick labels.
    fn construct_pointer(&mut self) {
        let length = self.arc_size / 2.0 - (self.tick_offset() + self.tick_length());
        let half_width = length / 20.0;
        let fore = length - 8.0 * half_width;
        self.pointer_shape = vec![
            Point::new(half_width, 0.0),
            Point::new(-half_width, 0.0),
            Point::new(-half_width, fore),
            Point::new(0.0, length),
            Point::new(half_width, fore),
            Point::new(half_width, 0.0),
        ];
    }

    fn update_reading(&mut self) {
        self.build_reading_box();
        self.place_pointer();
        tracing::trace!(reading = self.base.reading().pointer, "dial reading updated");
    }

    fn place_pointer(&mut self) {
        self.scene.remove_slot(&mut self.pointer);

        let reading = self.base.reading().pointer;
        let angle = self.angle_for(self.base.clamp_to_scale(reading));
        let center = self.center();
        let color = self.base.color_for_reading(reading);
        let outline = Stroke::hairline(Color::BLACK);

        let pointer = self.scene.add(Primitive::filled_polygon(
            self.pointer_shape.clone(),
            Some(outline),
            Fill::Solid(color),
        ));
        // the shape points down the y axis; screen angles grow counter-clockwise
        self.scene.set_transform(
            pointer,
            Transform::from_translation(center.x, center.y).rotate(-angle - 90.0),
        );

        let hub = self.arc_size / 10.0;
        self.scene.add_child(
            pointer,
            Primitive::Ellipse {
                rect: Rect::new(-hub / 2.0, -hub / 2.0, hub, hub),
                stroke: Some(outline),
                fill: Some(Fill::Solid(Color::BLACK)),
            },
        );
        self.pointer = Some(pointer);
    }

    /// Readout in a box colored by the reading, below the hub.
    fn build_reading_box(&mut self) {
        self.scene.remove_slot(&mut self.reading_box);

        let cfg = self.base.config();
        if !cfg.text_enabled {
            return;
        }
        let reading = self.base.reading();
        let color = self.base.color_for_reading(reading.pointer);
        let run = TextRun::new(
            self.base.format_reading(reading.text),
            self.size / 10.0,
            cfg.tick_color,
            self.base.metrics(),
        );
        let h = run.extent.height;
        let target = self.center() + Point::new(0.0, h / 4.0 + h / 2.0 + self.arc_size / 20.0);
        let run = run.anchored(Anchor::Center, target);

        let frame = self.scene.add(Primitive::Rect {
            rect: run.rect(),
            radius: h / 5.0,
            stroke: Some(Stroke::hairline(color)),
            fill: Some(Fill::Solid(color)),
        });
        self.scene.add_child(frame, Primitive::Text(run));
        self.reading_box = Some(frame);
    }
}

/// Unit vector from a point on the arc toward the center.
fn inward(angle: f64) -> Point {
    let (sin, cos) = angle.to_radians().sin_cos();
    Point::new(-cos, sin)
}

/// Shift that moves a centered box of size `extent` so the side crossed by a
/// ray at `angle` (pointing outward from the dial center) sits on the ray origin.
fn ray_exit_offset(extent: &Rect, angle: f64) -> Point {
    let (w, h) = (extent.width, extent.height);
    let upper_right = h.atan2(w);
    let upper_left = h.atan2(-w);
    let lower_left = (-h).atan2(-w) + TAU;
    let lower_right = (-h).atan2(w) + TAU;
    let a = angle.to_radians().rem_euclid(TAU);

    if a >= upper_right && a < upper_left {
        // through the top edge
        let y = h / 2.0;
        Point::new(-y / a.tan(), y)
    } else if a >= upper_left && a < lower_left {
        // through the left edge
        let x = w / 2.0;
        Point::new(x, -x * a.tan())
    } else if a >= lower_left && a < lower_right {
        // through the bottom edge
        let y = -h / 2.0;
        Point::new(-y / a.tan(), y)
    } else {
        let x = -w / 2.0;
        Point::new(x, -x * a.tan())
    }
}

impl Gauge for DialEngine {
    fn base(&self) -> &GaugeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GaugeBase {
        &mut self.base
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn create_scene(&mut self) {
        self.rebuild();
    }

    fn set_reading(&mut self, reading: Reading) {
        self.base.set_reading(reading);
        if self.base.is_dirty() {
            self.rebuild();
        } else {
            self.update_reading();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dial() -> DialEngine {
        let mut dial = DialEngine::default();
        dial.set_size(200.0, 200.0);
        dial
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn pointer_tip_follows_reading() {
        let mut dial = dial();
        dial.set_reading(Reading::new(50.0));
        let pointer = dial.pointer_item().unwrap();
        let world = dial.scene().world_transform(pointer).unwrap();
        let tip = dial.pointer_shape[3];
        let center = dial.center();
        // mid-scale on a 225..-45 dial points straight up
        assert!(close(world.map(tip), center - Point::new(0.0, tip.y)));

        dial.set_reading(Reading::new(0.0));
        let world = dial.scene().world_transform(dial.pointer_item().unwrap()).unwrap();
        let (sin, cos) = 225f64.to_radians().sin_cos();
        let expected = center + Point::new(tip.y * cos, -tip.y * sin);
        assert!(close(world.map(tip), expected));
    }

    #[test]
    fn out_of_range_reading_pins_pointer_but_keeps_color() {
        let mut dial = dial();
        dial.set_reading(Reading::new(150.0));
        let pointer = dial.pointer_item().unwrap();
        let world = dial.scene().world_transform(pointer).unwrap();
        assert!((world.rotation_degrees() - (-(-45.0) - 90.0)).abs() < 1e-9);
        let fill = dial.scene().primitive(pointer).and_then(Primitive::fill);
        assert_eq!(fill, Some(Fill::Solid(Color::RED)));
    }

    #[test]
    fn reading_updates_do_not_rebuild() {
        let mut dial = dial();
        dial.set_reading(Reading::new(10.0));
        let items = dial.scene().len();
        dial.set_reading(Reading::split(20.0, 21.0));
        dial.set_reading(Reading::split(20.0, 21.0));
        assert_eq!(dial.full_rebuilds(), 1);
        assert_eq!(dial.scene().len(), items);

        let frame = dial.reading_item().unwrap();
        let text = dial.scene().get(frame).unwrap().children()[0];
        let run = dial.scene().primitive(text).and_then(Primitive::as_text).unwrap();
        assert_eq!(run.text, "21");
    }

    #[test]
    fn one_label_per_major_tick() {
        let mut dial = dial();
        dial.set_reading(Reading::new(0.0));
        // 0..=100 by 10 plus the readout
        assert_eq!(dial.scene().texts().len(), 12);
    }

    #[test]
    fn top_label_hangs_below_its_tick() {
        let mut dial = dial();
        dial.set_reading(Reading::new(0.0));
        let location = ellipse_point(&dial.arc_rect(), 90.0) + inward(90.0) * dial.label_distance();
        let label = dial
            .scene()
            .texts()
            .into_iter()
            .map(|(t, _)| t)
            .find(|t| t.text == "50")
            .unwrap()
            .clone();
        let rect = label.rect();
        assert!((rect.center().x - location.x).abs() < 1e-6);
        assert!((rect.top() - location.y).abs() < 1e-6);
    }

    #[test]
    fn gauge_label_sits_above_center() {
        let mut dial = DialEngine::new(
            ScaleConfig::builder()
                .major_tick_length(0.05)
                .label("RPM")
                .build(),
        );
        dial.set_size(200.0, 200.0);
        dial.set_reading(Reading::new(0.0));
        let label = dial.label.and_then(|id| dial.scene().primitive(id)).unwrap();
        let rect = label.as_text().unwrap().rect();
        assert!(rect.bottom() < dial.center().y);
        assert_eq!(label.as_text().unwrap().size, 20.0);
    }

    #[test]
    fn ray_offsets_touch_the_crossed_edge() {
        let extent = Rect::from_size(20.0, 10.0);
        assert!(close(ray_exit_offset(&extent, 0.0), Point::new(-10.0, 0.0)));
        assert!(close(ray_exit_offset(&extent, 180.0), Point::new(10.0, 0.0)));
        let up = ray_exit_offset(&extent, 90.0);
        assert!(up.x.abs() < 1e-9 && (up.y - 5.0).abs() < 1e-9);
        let down = ray_exit_offset(&extent, 270.0);
        assert!(down.x.abs() < 1e-9 && (down.y + 5.0).abs() < 1e-9);
    }
}
