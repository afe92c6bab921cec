//! Linear gauges: a horizontal or vertical scale shown either as a filled bar
//! or as a colored bar with a movable thumb.

use bon::Builder;

use crate::color::Color;
use crate::config::{GaugeBase, Reading, ScaleConfig};
use crate::geometry::{Anchor, Point, Rect};
use crate::scale::ticks_from;
use crate::scene::{Fill, ItemId, Path, Primitive, Scene, Stroke, TextRun};
use crate::text::DEFAULT_FONT_SIZE;
use crate::Gauge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    /// Values grow upward.
    Vertical,
}

/// Which edge of the gauge carries the tick marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSide {
    LeftOrTop,
    RightOrBottom,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearStyle {
    /// Outline plus a bar filled up to the reading.
    FilledBar,
    /// Fixed bar with a pointer; `zoned` splits the bar into low/mid/high colors.
    Thumb { zoned: bool },
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct LinearSettings {
    #[builder(default = Orientation::Vertical)]
    pub orientation: Orientation,
    #[builder(default = TickSide::LeftOrTop)]
    pub tick_side: TickSide,
    #[builder(default = LinearStyle::FilledBar)]
    pub style: LinearStyle,
    /// Value the filled bar grows from; only used when strictly inside the scale.
    pub draw_from: Option<f64>,
    /// Thumb size along the scale as a fraction of the gauge length.
    #[builder(default = 0.05)]
    pub thumb_width: f64,
    /// Bar thickness as a fraction of the gauge's cross extent.
    #[builder(default = 0.25)]
    pub bar_width: f64,
    #[builder(default = Color::WHITE)]
    pub thumb_color: Color,
    #[builder(default = false)]
    pub dual_value: bool,
}

impl Default for LinearSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
pub struct LinearGaugeEngine {
    base: GaugeBase,
    settings: LinearSettings,
    scene: Scene,
    full_rebuilds: u64,

    bar: Option<ItemId>,
    reading_label: Option<ItemId>,
    thumbs: [Option<ItemId>; 2],
}

impl Default for LinearGaugeEngine {
    fn default() -> Self {
        Self::new(ScaleConfig::default(), LinearSettings::default())
    }
}

impl LinearGaugeEngine {
    pub fn new(config: ScaleConfig, settings: LinearSettings) -> Self {
        Self {
            base: GaugeBase::new(config),
            settings,
            scene: Scene::new(),
            full_rebuilds: 0,
            bar: None,
            reading_label: None,
            thumbs: [None, None],
        }
    }

    pub fn settings(&self) -> &LinearSettings {
        &self.settings
    }

    pub fn full_rebuilds(&self) -> u64 {
        self.full_rebuilds
    }

    /// Outline of the filled bar; the fill is its child.
    pub fn bar_item(&self) -> Option<ItemId> {
        self.bar
    }

    pub fn reading_item(&self) -> Option<ItemId> {
        self.reading_label
    }

    pub fn thumb_items(&self) -> [Option<ItemId>; 2] {
        self.thumbs
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.settings.orientation = orientation;
        self.base.mark_dirty();
    }

    pub fn set_tick_side(&mut self, side: TickSide) {
        self.settings.tick_side = side;
        self.base.mark_dirty();
    }

    pub fn set_style(&mut self, style: LinearStyle) {
        self.settings.style = style;
        self.base.mark_dirty();
    }

    /// Only moves the filled bar's base, so the layout stays valid.
    pub fn set_draw_from(&mut self, from: Option<f64>) {
        self.settings.draw_from = from;
    }

    pub fn set_thumb_width(&mut self, fraction: f64) {
        self.settings.thumb_width = fraction;
        self.base.mark_dirty();
    }

    pub fn set_bar_width(&mut self, fraction: f64) {
        self.settings.bar_width = fraction;
        self.base.mark_dirty();
    }

    pub fn set_thumb_color(&mut self, color: Color) {
        self.settings.thumb_color = color;
        self.base.mark_dirty();
    }

    pub fn set_dual_value(&mut self, dual: bool) {
        self.settings.dual_value = dual;
        self.base.mark_dirty();
    }

    /// Show two readings at once; the gauge must be in dual-value mode for
    /// the second one to appear.
    pub fn set_dual_readings(&mut self, first: Reading, second: Reading) {
        self.base.set_reading(first);
        self.base.set_reading2(second);
        self.render();
    }

    // ------------------------------------------------------------------------
    // Geometry helpers
    // ------------------------------------------------------------------------

    fn horizontal(&self) -> bool {
        self.settings.orientation == Orientation::Horizontal
    }

    /// Pixel length along the value axis.
    fn extent(&self) -> f64 {
        if self.horizontal() {
            self.base.width()
        } else {
            self.base.height()
        }
    }

    /// Pixel length across the value axis.
    fn cross(&self) -> f64 {
        if self.horizontal() {
            self.base.height()
        } else {
            self.base.width()
        }
    }

    fn pixel(&self, value: f64) -> f64 {
        self.base.value_to_pixel(value, self.extent(), !self.horizontal())
    }

    /// Scene point for a position `along` the value axis and `across` it.
    fn point(&self, along: f64, across: f64) -> Point {
        if self.horizontal() {
            Point::new(along, across)
        } else {
            Point::new(across, along)
        }
    }

    /// Rectangle spanning two value-axis pixels and two cross-axis offsets.
    fn span_rect(&self, a: f64, b: f64, c0: f64, c1: f64) -> Rect {
        Rect::from_corners(self.point(a, c0), self.point(b, c1))
    }

    fn has_ticks(&self) -> bool {
        let cfg = self.base.config();
        cfg.major_spacing > 0.0 && cfg.major_tick_length > 0.0
    }

    // ------------------------------------------------------------------------
    // Scene construction
    // ------------------------------------------------------------------------

    fn render(&mut self) {
        if self.base.is_dirty() {
            self.rebuild();
        } else {
            self.update_reading();
        }
    }

    fn rebuild(&mut self) {
        self.scene.clear();
        self.bar = None;
        self.reading_label = None;
        self.thumbs = [None, None];

        let (w, h) = (self.base.width(), self.base.height());
        self.scene.set_background(self.base.config().background_color);
        self.scene.set_scene_rect(Rect::from_size(w, h));

        if let LinearStyle::Thumb { zoned } = self.settings.style {
            self.build_bar(zoned);
        }
        let cfg = self.base.config();
        let (minor, minor_len) = (cfg.minor_spacing, cfg.minor_tick_length);
        let (major, major_len) = (cfg.major_spacing, cfg.major_tick_length);
        self.build_ticks(minor, minor_len, 1.0);
        self.build_ticks(major, major_len, 1.5);
        self.build_tick_labels();

        self.base.mark_clean();
        self.full_rebuilds += 1;
        tracing::debug!(
            width = w,
            height = h,
            orientation = ?self.settings.orientation,
            style = ?self.settings.style,
            items = self.scene.len(),
            "linear gauge scene rebuilt"
        );

        self.update_reading();
    }

    fn update_reading(&mut self) {
        match self.settings.style {
            LinearStyle::FilledBar => {
                self.build_filled_bar();
                self.build_reading_label();
            }
            LinearStyle::Thumb { .. } => self.build_thumbs(),
        }
        tracing::trace!(reading = self.base.reading().pointer, "linear gauge reading updated");
    }

    /// Fixed bar behind the thumb, centered across the gauge.
    fn build_bar(&mut self, zoned: bool) {
        let cfg = self.base.config();
        let cross = self.cross();
        let thickness = self.settings.bar_width * cross;
        let c0 = 0.5 * cross - 0.5 * thickness;
        let c1 = c0 + thickness;

        let zones = if zoned {
            vec![
                (cfg.scale_start, self.base.top_of_low_range(), cfg.low_color),
                (self.base.top_of_low_range(), self.base.top_of_mid_range(), cfg.mid_color),
                (self.base.top_of_mid_range(), self.base.top_of_scale(), cfg.high_color),
            ]
        } else {
            vec![(cfg.scale_start, self.base.top_of_scale(), cfg.mid_color)]
        };
        let rects: Vec<_> = zones
            .into_iter()
            .map(|(from, to, color)| {
                let rect = self.span_rect(self.pixel(from), self.pixel(to), c0, c1);
                Primitive::rect(rect, Some(Stroke::hairline(color)), Some(Fill::Solid(color)))
            })
            .collect();
        for rect in rects {
            self.scene.add(rect);
        }
    }

    fn build_ticks(&mut self, spacing: f64, length_fraction: f64, pen_width: f64) {
        if length_fraction <= 0.0 || spacing <= 0.0 {
            return;
        }
        let cfg = self.base.config();
        let extent = self.extent();
        let cross = self.cross();
        let length = cross * length_fraction;
        // horizontal ticks stop one pixel short of their length, vertical ones reach past it
        let (near_end, far_end) = if self.horizontal() {
            (length - 1.0, cross - length - 1.0)
        } else {
            (length + 1.0, cross - length - 1.0)
        };

        let mut path = Path::new();
        for value in ticks_from(cfg.scale_start, self.base.top_of_scale(), spacing) {
            let p = self.pixel(value);
            if p <= 0.0 || p >= extent {
                continue;
            }
            if self.settings.tick_side != TickSide::RightOrBottom {
                path.move_to(self.point(p, 1.0)).line_to(self.point(p, near_end));
            }
            if self.settings.tick_side != TickSide::LeftOrTop {
                path.move_to(self.point(p, cross - 1.0))
                    .line_to(self.point(p, far_end));
            }
        }
        let stroke = Stroke::new(cfg.tick_color, pen_width);
        self.scene.add(Primitive::stroked_path(path, stroke));
    }

    /// Labels next to the major ticks. With ticks on both sides they go on
    /// the left or top. Labels at the scale ends are pulled inside the gauge.
    fn build_tick_labels(&mut self) {
        let cfg = self.base.config();
        if !self.has_ticks() || !cfg.tick_labels_enabled {
            return;
        }
        let cross = self.cross();
        let length = cross * cfg.major_tick_length;
        let far = self.settings.tick_side == TickSide::RightOrBottom;
        let start = cfg.scale_start;
        let top = self.base.top_of_scale();
        let end_tolerance = cfg.major_spacing * 1e-9;

        let mut labels = Vec::new();
        for value in ticks_from(start, top, cfg.major_spacing) {
            let p = self.pixel(value);
            let run = TextRun::new(
                self.base.format_tick(value),
                DEFAULT_FONT_SIZE,
                cfg.tick_color,
                self.base.metrics(),
            );
            let (anchor, target) = match (self.horizontal(), far) {
                (true, false) => (Anchor::TopCenter, self.point(p, length)),
                (true, true) => (Anchor::BottomCenter, self.point(p, cross - length)),
                (false, false) => (Anchor::LeftCenter, self.point(p, length)),
                (false, true) => (Anchor::RightCenter, self.point(p, cross - length)),
            };
            let mut run = run.anchored(anchor, target);

            // half of a centered label hangs past the end of the scale
            let overhang = if self.horizontal() {
                Point::new(run.extent.width / 2.0, 0.0)
            } else {
                Point::new(0.0, -run.extent.height / 2.0)
            };
            if value <= start {
                run.origin += overhang;
            } else if value >= top - end_tolerance {
                run.origin += -overhang;
            }
            labels.push(run);
        }
        for label in labels {
            self.scene.add(Primitive::Text(label));
        }
    }

    fn build_filled_bar(&mut self) {
        self.scene.remove_slot(&mut self.bar);

        let cfg = self.base.config();
        let (w, h) = (self.base.width(), self.base.height());
        let from = match self.settings.draw_from {
            Some(v) if v > cfg.scale_start && v < self.base.top_of_scale() => self.pixel(v),
            _ => self.pixel(cfg.scale_start),
        };
        let first = self.base.reading().pointer;
        let first_color = self.base.color_for_reading(first);
        let cross = self.cross();

        let mut fills = Vec::new();
        let border = if self.settings.dual_value {
            let second = self.base.reading2().pointer;
            let second_color = self.base.color_for_reading(second);
            fills.push((self.span_rect(from, self.pixel(first), 0.0, cross / 2.0), first_color));
            fills.push((
                self.span_rect(from, self.pixel(second), cross / 2.0, cross),
                second_color,
            ));
            first_color.blend(second_color)
        } else {
            fills.push((self.span_rect(from, self.pixel(first), 0.0, cross), first_color));
            first_color
        };

        let outline = self.scene.add(Primitive::rect(
            Rect::from_size(w, h),
            Some(Stroke::hairline(border)),
            None,
        ));
        self.scene.set_z_value(outline, -10.0);
        for (rect, color) in fills {
            let fill = self.scene.add_child(
                outline,
                Primitive::rect(rect, Some(Stroke::hairline(color)), Some(Fill::Solid(color))),
            );
            self.scene.set_z_value(fill, -10.0);
        }
        self.bar = Some(outline);
    }

    /// Readout between the middle two major ticks on the side away from the
    /// ticks, or centered when there is no free side.
    fn build_reading_label(&mut self) {
        self.scene.remove_slot(&mut self.reading_label);

        let cfg = self.base.config();
        if !cfg.text_enabled {
            return;
        }
        let mut text = self.base.format_reading(self.base.reading().text);
        if self.settings.dual_value {
            text = format!("{text} : {}", self.base.format_reading(self.base.reading2().text));
        }
        let run = TextRun::new(text, DEFAULT_FONT_SIZE, cfg.tick_color, self.base.metrics());

        let (w, h) = (self.base.width(), self.base.height());
        let run = if self.has_ticks() && self.settings.tick_side != TickSide::Both {
            let start = cfg.scale_start;
            let half = (self.base.top_of_scale() + start) * 0.5;
            let steps = ((half - start) / cfg.major_spacing).ceil().max(0.0);
            let p = self.pixel(start + steps * cfg.major_spacing - 0.5 * cfg.major_spacing);
            let far = self.settings.tick_side == TickSide::RightOrBottom;
            let (anchor, target) = match (self.horizontal(), far) {
                (true, true) => (Anchor::TopCenter, Point::new(p, 0.0)),
                (true, false) => (Anchor::BottomCenter, Point::new(p, h)),
                (false, true) => (Anchor::LeftCenter, Point::new(0.0, p)),
                (false, false) => (Anchor::RightCenter, Point::new(w, p)),
            };
            run.anchored(anchor, target)
        } else {
            run.anchored(Anchor::Center, Point::new(w / 2.0, h / 2.0))
        };
        self.reading_label = Some(self.scene.add(Primitive::Text(run)));
    }

    fn build_thumbs(&mut self) {
        for slot in &mut self.thumbs {
            self.scene.remove_slot(slot);
        }
        if self.settings.thumb_width <= 0.0 {
            return;
        }

        let stroke = Stroke::new(self.base.config().tick_color, 0.5);
        let fill = Fill::Solid(self.settings.thumb_color);
        let toward_far = self.settings.tick_side == TickSide::RightOrBottom;

        let first = self.thumb_shape(self.pixel(self.base.reading().pointer), toward_far);
        self.thumbs[0] = Some(self.scene.add(Primitive::filled_polygon(first, Some(stroke), fill)));

        if self.settings.dual_value {
            let second = self.thumb_shape(self.pixel(self.base.reading2().pointer), !toward_far);
            self.thumbs[1] =
                Some(self.scene.add(Primitive::filled_polygon(second, Some(stroke), fill)));
        }
    }

    /// Thumb outline at value-axis pixel `location`. With ticks it is a
    /// chevron (a triangle in dual mode) pointing to the far or near side;
    /// without ticks it is a plain bar across the gauge.
    fn thumb_shape(&self, location: f64, toward_far: bool) -> Vec<Point> {
        let cross = self.cross();
        let size = self.extent() * self.settings.thumb_width;
        let lo = location - size * 0.5;
        let hi = lo + size;
        let mid = 0.5 * cross;
        let (base, tip) = if toward_far { (0.0, cross) } else { (cross, 0.0) };

        let points: Vec<(f64, f64)> = if !self.has_ticks() {
            vec![(lo, 0.0), (hi, 0.0), (hi, cross), (lo, cross)]
        } else if self.settings.dual_value {
            vec![(lo, mid), (hi, mid), (location, tip)]
        } else {
            vec![(lo, base), (hi, base), (hi, mid), (location, tip), (lo, mid)]
        };
        points
            .into_iter()
            .map(|(along, across)| self.point(along, across))
            .collect()
    }
}

impl Gauge for LinearGaugeEngine {
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
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge(settings: LinearSettings, w: f64, h: f64) -> LinearGaugeEngine {
        let mut gauge = LinearGaugeEngine::new(ScaleConfig::default(), settings);
        gauge.set_size(w, h);
        gauge
    }

    fn horizontal_bar() -> LinearGaugeEngine {
        gauge(
            LinearSettings::builder()
                .orientation(Orientation::Horizontal)
                .build(),
            200.0,
            40.0,
        )
    }

    fn fill_rects(gauge: &LinearGaugeEngine) -> Vec<(Rect, Option<Fill>)> {
        let bar = gauge.bar_item().unwrap();
        gauge
            .scene()
            .get(bar)
            .unwrap()
            .children()
            .iter()
            .filter_map(|c| match gauge.scene().primitive(*c)? {
                Primitive::Rect { rect, fill, .. } => Some((*rect, *fill)),
                _ => None,
            })
            .collect()
    }

    fn text_of(gauge: &LinearGaugeEngine, id: Option<ItemId>) -> TextRun {
        id.and_then(|id| gauge.scene().primitive(id))
            .and_then(Primitive::as_text)
            .cloned()
            .unwrap()
    }

    #[test]
    fn filled_bar_spans_from_start_to_reading() {
        let mut g = horizontal_bar();
        g.set_reading(Reading::new(50.0));
        assert_eq!(
            fill_rects(&g),
            vec![(Rect::new(0.0, 0.0, 100.0, 40.0), Some(Fill::Solid(Color::GREEN)))]
        );
    }

    #[test]
    fn draw_from_is_used_only_inside_the_scale() {
        let mut g = horizontal_bar();
        g.set_reading(Reading::new(10.0));
        g.set_draw_from(Some(50.0));
        assert!(!g.base().is_dirty());
        g.set_reading(Reading::new(10.0));
        assert_eq!(fill_rects(&g)[0].0, Rect::new(20.0, 0.0, 80.0, 40.0));

        g.set_draw_from(Some(150.0));
        g.set_reading(Reading::new(10.0));
        assert_eq!(fill_rects(&g)[0].0, Rect::new(0.0, 0.0, 20.0, 40.0));
    }

    #[test]
    fn vertical_bar_grows_upward() {
        let mut g = gauge(LinearSettings::default(), 40.0, 200.0);
        g.set_reading(Reading::new(25.0));
        assert_eq!(fill_rects(&g)[0].0, Rect::new(0.0, 150.0, 40.0, 50.0));
    }

    #[test]
    fn dual_bar_splits_halves_and_blends_border() {
        let mut g = horizontal_bar();
        g.set_dual_value(true);
        g.set_dual_readings(Reading::new(20.0), Reading::new(80.0));
        let rects = fill_rects(&g);
        assert_eq!(rects[0], (Rect::new(0.0, 0.0, 40.0, 20.0), Some(Fill::Solid(Color::WHITE))));
        assert_eq!(rects[1], (Rect::new(0.0, 20.0, 160.0, 20.0), Some(Fill::Solid(Color::RED))));
        let border = g.scene().primitive(g.bar_item().unwrap()).and_then(Primitive::stroke);
        assert_eq!(border.map(|s| s.color), Some(Color::WHITE.blend(Color::RED)));
        assert_eq!(text_of(&g, g.reading_item()).text, "20 : 80");
    }

    #[test]
    fn ticks_skip_the_gauge_edges() {
        let mut g = horizontal_bar();
        g.set_reading(Reading::new(0.0));
        let paths: Vec<usize> = g
            .scene()
            .draw_list()
            .iter()
            .filter_map(|d| match d.primitive {
                Primitive::Path { path, .. } => Some(path.flatten().len()),
                _ => None,
            })
            .collect();
        // minor every 2 units (49 inside), major every 10 (9 inside)
        assert_eq!(paths, vec![49, 9]);
    }

    #[test]
    fn end_labels_stay_inside_the_gauge() {
        let mut g = LinearGaugeEngine::new(
            ScaleConfig::builder().text_enabled(false).build(),
            LinearSettings::builder()
                .orientation(Orientation::Horizontal)
                .build(),
        );
        g.set_size(200.0, 40.0);
        g.set_reading(Reading::new(0.0));
        let labels: Vec<Rect> = g.scene().texts().into_iter().map(|(t, _)| t.rect()).collect();
        assert_eq!(labels.len(), 11);
        let left = labels.iter().map(|r| r.left()).fold(f64::INFINITY, f64::min);
        let right = labels.iter().map(|r| r.right()).fold(f64::NEG_INFINITY, f64::max);
        assert!(left.abs() < 1e-9);
        assert!((right - 200.0).abs() < 1e-9);
    }

    #[test]
    fn reading_label_sits_between_middle_ticks_opposite_the_ticks() {
        let mut g = horizontal_bar();
        g.set_reading(Reading::new(33.0));
        let run = text_of(&g, g.reading_item());
        assert_eq!(run.text, "33");
        let rect = run.rect();
        assert!((rect.center().x - 90.0).abs() < 1e-9);
        assert!((rect.bottom() - 40.0).abs() < 1e-9);

        g.set_tick_side(TickSide::Both);
        g.set_reading(Reading::new(33.0));
        let center = text_of(&g, g.reading_item()).rect().center();
        assert!(center.distance(Point::new(100.0, 20.0)) < 1e-9);
    }

    #[test]
    fn thumbs_point_to_opposite_sides_in_dual_mode() {
        let mut g = gauge(
            LinearSettings::builder()
                .style(LinearStyle::Thumb { zoned: true })
                .tick_side(TickSide::RightOrBottom)
                .dual_value(true)
                .build(),
            40.0,
            200.0,
        );
        g.set_dual_readings(Reading::new(50.0), Reading::new(25.0));
        let shape = |id: Option<ItemId>| match g.scene().primitive(id.unwrap()) {
            Some(Primitive::Polygon { points, .. }) => points.clone(),
            _ => Vec::new(),
        };
        let [first, second] = g.thumb_items();
        assert_eq!(shape(first)[2], Point::new(40.0, 100.0));
        assert_eq!(shape(second)[2], Point::new(0.0, 150.0));
        assert!(g.reading_item().is_none());
    }

    #[test]
    fn thumb_without_ticks_is_a_plain_bar() {
        let mut g = LinearGaugeEngine::new(
            ScaleConfig::builder().major_tick_length(0.0).minor_tick_length(0.0).build(),
            LinearSettings::builder()
                .orientation(Orientation::Horizontal)
                .style(LinearStyle::Thumb { zoned: false })
                .build(),
        );
        g.set_size(200.0, 40.0);
        g.set_reading(Reading::new(50.0));
        let thumb = g.thumb_items()[0].and_then(|id| g.scene().primitive(id)).unwrap();
        let bounds = thumb.bounding_rect().unwrap();
        assert!((bounds.width - (10.0 + 0.5)).abs() < 1e-9);
        assert!((bounds.height - (40.0 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn zoned_bar_widths_follow_ranges() {
        let mut g = gauge(
            LinearSettings::builder()
                .orientation(Orientation::Horizontal)
                .style(LinearStyle::Thumb { zoned: true })
                .build(),
            200.0,
            40.0,
        );
        g.set_reading(Reading::new(0.0));
        let zones: Vec<Rect> = g
            .scene()
            .draw_list()
            .iter()
            .filter_map(|d| match d.primitive {
                Primitive::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        let expected = [(0.0, 60.0), (60.0, 80.0), (140.0, 60.0)];
        assert_eq!(zones.len(), expected.len());
        for (zone, (x, width)) in zones.iter().zip(expected) {
            assert!((zone.x - x).abs() < 1e-9 && (zone.width - width).abs() < 1e-9);
            assert_eq!((zone.y, zone.height), (15.0, 10.0));
        }
    }
}
