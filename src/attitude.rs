//! Attitude indicator: sky/ground horizon, pitch ladder, roll scale, yaw tape
//! and a fixed reticle.
//!
//! The scene origin is the center of the viewport. Everything that moves with
//! roll and pitch hangs off one horizon group, so the incremental path only
//! replaces that group's transform and regenerates the items whose content
//! depends on the angles.

use bon::Builder;

use crate::color::Color;
use crate::config::{GaugeBase, Reading, ScaleConfig};
use crate::geometry::{Point, Rect, Transform};
use crate::scale::{is_multiple_of, ticks_between};
use crate::scene::{Fill, ItemId, Path, Primitive, Scene, Stroke, TextRun};
use crate::text::DEFAULT_FONT_SIZE;
use crate::Gauge;

/// Roll scale and roll label extent on either side of wings-level.
const ROLL_SCALE_LIMIT: f64 = 120.0;
/// Gap between a label and the mark it annotates.
const LABEL_GAP: f64 = 4.0;

/// Attitude-specific settings on top of the shared scale.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct AttitudeSettings {
    /// Degrees of pitch visible across the viewport height.
    #[builder(default = 60.0)]
    pub pitch_range: f64,
    /// Pitch ladder widths as fractions of the viewport width.
    #[builder(default = 0.2)]
    pub pitch_major_tick_length: f64,
    #[builder(default = 0.05)]
    pub pitch_minor_tick_length: f64,
    #[builder(default = 30.0)]
    pub roll_major_spacing: f64,
    #[builder(default = 5.0)]
    pub roll_minor_spacing: f64,
    #[builder(default = 45.0)]
    pub roll_alarm: f64,
    #[builder(default = 25.0)]
    pub pitch_alarm: f64,
    #[builder(default = Color::RED)]
    pub alarm_color: Color,
}

impl Default for AttitudeSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Scale defaults suited to a horizon display: shorter ticks, an orange
/// ground, a blue sky and yellow markings.
pub fn default_scale_config() -> ScaleConfig {
    ScaleConfig::builder()
        .major_tick_length(0.10)
        .minor_tick_length(0.05)
        .low_color(Color::new(255, 128, 0))
        .high_color(Color::BLUE)
        .tick_color(Color::YELLOW)
        .build()
}

/// Map any roll angle into (-180, 180].
pub fn normalize_roll(roll: f64) -> f64 {
    let r = finite_or_zero(roll).rem_euclid(360.0);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Map any yaw angle into [0, 360).
pub fn normalize_yaw(yaw: f64) -> f64 {
    let y = finite_or_zero(yaw).rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if y >= 360.0 {
        0.0
    } else {
        y
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Debug)]
pub struct AttitudeEngine {
    base: GaugeBase,
    settings: AttitudeSettings,
    scene: Scene,

    roll: f64,
    pitch: f64,
    yaw: f64,

    pixels_per_degree: f64,
    virtual_size: f64,
    transform: Transform,
    full_rebuilds: u64,

    horizon: Option<ItemId>,
    ladder: Option<ItemId>,
    roll_label: Option<ItemId>,
    yaw_scale: Option<ItemId>,
    reticle: Option<ItemId>,
}

impl Default for AttitudeEngine {
    fn default() -> Self {
        Self::new(default_scale_config(), AttitudeSettings::default())
    }
}

impl AttitudeEngine {
    pub fn new(config: ScaleConfig, settings: AttitudeSettings) -> Self {
        let mut engine = Self {
            base: GaugeBase::new(config),
            settings: AttitudeSettings::default(),
            scene: Scene::new(),
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            pixels_per_degree: 0.0,
            virtual_size: 0.0,
            transform: Transform::identity(),
            full_rebuilds: 0,
            horizon: None,
            ladder: None,
            roll_label: None,
            yaw_scale: None,
            reticle: None,
        };
        engine.set_settings(settings);
        engine
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn settings(&self) -> &AttitudeSettings {
        &self.settings
    }

    /// Replace every attitude setting, sanitizing as the named setters do.
    pub fn set_settings(&mut self, settings: AttitudeSettings) {
        let current = self.settings.pitch_range;
        self.settings = settings;
        if !(self.settings.pitch_range > 0.0 && self.settings.pitch_range.is_finite()) {
            tracing::debug!(pitch_range = self.settings.pitch_range, "ignoring non-positive pitch range");
            self.settings.pitch_range = current;
        }
        let s = &mut self.settings;
        s.pitch_major_tick_length = s.pitch_major_tick_length.max(0.0);
        s.pitch_minor_tick_length = s.pitch_minor_tick_length.max(0.0);
        s.roll_major_spacing = s.roll_major_spacing.max(0.0);
        s.roll_minor_spacing = s.roll_minor_spacing.max(0.0).min(s.roll_major_spacing);
        self.base.mark_dirty();
    }

    pub fn set_pitch_range(&mut self, degrees: f64) {
        let settings = AttitudeSettings {
            pitch_range: degrees,
            ..self.settings.clone()
        };
        self.set_settings(settings);
    }

    pub fn set_pitch_major_tick_length(&mut self, length: f64) {
        self.settings.pitch_major_tick_length = length.max(0.0);
        self.base.mark_dirty();
    }

    pub fn set_pitch_minor_tick_length(&mut self, length: f64) {
        self.settings.pitch_minor_tick_length = length.max(0.0);
        self.base.mark_dirty();
    }

    /// Also sets the roll label spacing.
    pub fn set_roll_major_spacing(&mut self, spacing: f64) {
        self.settings.roll_major_spacing = spacing.max(0.0);
        self.settings.roll_minor_spacing = self
            .settings
            .roll_minor_spacing
            .min(self.settings.roll_major_spacing);
        self.base.mark_dirty();
    }

    pub fn set_roll_minor_spacing(&mut self, spacing: f64) {
        self.settings.roll_minor_spacing = spacing.max(0.0).min(self.settings.roll_major_spacing);
        self.base.mark_dirty();
    }

    pub fn set_roll_alarm(&mut self, degrees: f64) {
        self.settings.roll_alarm = degrees;
    }

    pub fn set_pitch_alarm(&mut self, degrees: f64) {
        self.settings.pitch_alarm = degrees;
    }

    pub fn set_alarm_color(&mut self, color: Color) {
        self.settings.alarm_color = color;
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pixels_per_degree(&self) -> f64 {
        self.pixels_per_degree
    }

    /// Side of the square sky/ground backdrop.
    pub fn virtual_size(&self) -> f64 {
        self.virtual_size
    }

    /// Roll and pitch transform applied to the horizon group.
    pub fn horizon_transform(&self) -> Transform {
        self.transform
    }

    pub fn horizon_item(&self) -> Option<ItemId> {
        self.horizon
    }

    /// Number of full rebuilds since construction.
    pub fn full_rebuilds(&self) -> u64 {
        self.full_rebuilds
    }

    /// Update the displayed angles, in degrees.
    pub fn set_angles(&mut self, roll: f64, pitch: f64, yaw: f64) {
        self.roll = normalize_roll(roll);
        self.pitch = finite_or_zero(pitch);
        self.yaw = normalize_yaw(yaw);
        self.render();
    }

    fn render(&mut self) {
        if self.base.is_dirty() {
            self.rebuild();
            return;
        }

        self.update_transform();
        if let Some(horizon) = self.horizon {
            self.scene.set_transform(horizon, self.transform);
        }
        self.build_pitch_ladder();
        self.build_reticle();
        self.build_yaw_scale();
        self.build_roll_label();
        tracing::trace!(roll = self.roll, pitch = self.pitch, yaw = self.yaw, "attitude updated");
    }

    // ------------------------------------------------------------------------
    // Scene construction
    // ------------------------------------------------------------------------

    fn rebuild(&mut self) {
        self.scene.clear();
        self.horizon = None;
        self.ladder = None;
        self.roll_label = None;
        self.yaw_scale = None;
        self.reticle = None;

        let (w, h) = (self.base.width(), self.base.height());
        self.scene.set_background(self.base.config().background_color);
        self.compute_virtual_size();
        self.scene.set_scene_rect(Rect::new(-w / 2.0, -h / 2.0, w, h));
        self.update_transform();

        let cfg = self.base.config();
        let v = self.virtual_size;
        let horizon = self.scene.add(Primitive::Group);
        self.scene.set_transform(horizon, self.transform);
        self.scene.add_child(
            horizon,
            Primitive::rect(
                Rect::new(-v / 2.0, -v / 2.0, v, v / 2.0),
                None,
                Some(Fill::LinearGradient {
                    start: Point::ORIGIN,
                    end: Point::new(0.0, -v / 2.0),
                    from: cfg.high_color,
                    to: Color::BLACK,
                }),
            ),
        );
        self.scene.add_child(
            horizon,
            Primitive::rect(
                Rect::new(-v / 2.0, 0.0, v, v / 2.0),
                None,
                Some(Fill::LinearGradient {
                    start: Point::ORIGIN,
                    end: Point::new(0.0, v / 2.0),
                    from: cfg.low_color,
                    to: Color::BLACK,
                }),
            ),
        );
        self.horizon = Some(horizon);

        self.build_pitch_ladder();
        self.build_roll_scale();
        self.build_roll_label();
        self.build_yaw_scale();
        self.build_reticle();

        self.base.mark_clean();
        self.full_rebuilds += 1;
        tracing::debug!(
            width = w,
            height = h,
            pixels_per_degree = self.pixels_per_degree,
            virtual_size = self.virtual_size,
            items = self.scene.len(),
            "attitude scene rebuilt"
        );
    }

    /// The backdrop must still cover the viewport when pitched to +/-90 degrees
    /// at any roll, so it extends 90 degrees of pitch plus half the viewport
    /// diagonal from the horizon in every direction.
    fn compute_virtual_size(&mut self) {
        let (w, h) = (self.base.width(), self.base.height());
        self.pixels_per_degree = if h > 0.0 {
            h / self.settings.pitch_range
        } else {
            0.0
        };
        let half_diagonal = 0.5 * (w * w + h * h).sqrt();
        self.virtual_size = 2.0 * (90.0 * self.pixels_per_degree + half_diagonal);
    }

    /// The horizon turns opposite to the roll and drops for positive pitch.
    fn update_transform(&mut self) {
        self.transform = Transform::identity()
            .rotate(-self.roll)
            .translate(0.0, self.pitch * self.pixels_per_degree);
    }

    fn tick_stroke(&self) -> Stroke {
        Stroke::hairline(self.base.config().tick_color)
    }

    fn text(&self, value: f64, color: Color) -> TextRun {
        TextRun::new(
            self.base.format_tick(value),
            DEFAULT_FONT_SIZE,
            color,
            self.base.metrics(),
        )
    }

    fn build_pitch_ladder(&mut self) {
        self.scene.remove_slot(&mut self.ladder);

        let cfg = self.base.config();
        let s = &self.settings;
        let Some(horizon) = self.horizon else {
            return;
        };
        if s.pitch_major_tick_length <= 0.0 || cfg.major_spacing <= 0.0 || self.pixels_per_degree <= 0.0 {
            return;
        }

        // The ladder stops short of the roll and yaw scales.
        let fraction = 0.5 - 3.0 * cfg.major_tick_length;
        let low = self.pitch - fraction * s.pitch_range;
        let high = self.pitch + fraction * s.pitch_range;
        let width = self.base.width();
        let ppd = self.pixels_per_degree;
        let x_height = self.base.metrics().x_height(DEFAULT_FONT_SIZE);

        let group = self.scene.add_child(horizon, Primitive::Group);
        let mut path = Path::new();
        let mut labels = Vec::new();

        let x = s.pitch_major_tick_length * width / 2.0;
        for angle in ticks_between(low, high, cfg.major_spacing) {
            let y = -angle * ppd;
            path.move_to(Point::new(-x, y)).line_to(Point::new(x, y));
            if cfg.tick_labels_enabled {
                labels.push(
                    self.text(angle, cfg.tick_color)
                        .at_baseline(Point::new(x + LABEL_GAP, y + x_height)),
                );
            }
        }

        if s.pitch_minor_tick_length > 0.0 && cfg.minor_spacing > 0.0 {
            let x = s.pitch_minor_tick_length * width / 2.0;
            for angle in ticks_between(low, high, cfg.minor_spacing) {
                if !is_multiple_of(angle, cfg.major_spacing) {
                    let y = -angle * ppd;
                    path.move_to(Point::new(-x, y)).line_to(Point::new(x, y));
                }
            }
        }

        let stroke = self.tick_stroke();
        self.scene.add_child(group, Primitive::stroked_path(path, stroke));
        for label in labels {
            self.scene.add_child(group, Primitive::Text(label));
        }
        self.ladder = Some(group);
    }

    /// Fixed arc of roll ticks below the center; never rebuilt incrementally.
    fn build_roll_scale(&mut self) {
        let cfg = self.base.config();
        let s = &self.settings;
        if s.roll_major_spacing <= 0.0 || cfg.major_tick_length <= 0.0 {
            tracing::debug!("roll scale disabled");
            return;
        }

        let h = self.base.height();
        let inner = 0.5 * h;
        let radial = |radius: f64, angle: f64| {
            let (sin, cos) = angle.to_radians().sin_cos();
            Point::new(-radius * sin, radius * cos)
        };

        let mut path = Path::new();
        let outer = (0.5 + cfg.major_tick_length) * h;
        for angle in ticks_between(-ROLL_SCALE_LIMIT, ROLL_SCALE_LIMIT, s.roll_major_spacing) {
            path.move_to(radial(inner, angle)).line_to(radial(outer, angle));
        }

        if s.roll_minor_spacing > 0.0 && cfg.minor_tick_length > 0.0 {
            let outer = (0.5 + cfg.minor_tick_length) * h;
            for angle in ticks_between(-ROLL_SCALE_LIMIT, ROLL_SCALE_LIMIT, s.roll_minor_spacing) {
                if !is_multiple_of(angle, s.roll_major_spacing) {
                    path.move_to(radial(inner, angle)).line_to(radial(outer, angle));
                }
            }
        }

        let stroke = self.tick_stroke();
        self.scene.add(Primitive::stroked_path(path, stroke));
    }

    /// Pointer triangle on the roll scale with the roll angle above it.
    fn build_roll_label(&mut self) {
        self.scene.remove_slot(&mut self.roll_label);

        let cfg = self.base.config();
        let color = if self.roll.abs() > self.settings.roll_alarm {
            self.settings.alarm_color
        } else {
            cfg.tick_color
        };

        let group = self.scene.add(Primitive::Group);
        self.scene.set_transform(group, Transform::from_rotation(-self.roll));
        self.roll_label = Some(group);

        if !cfg.text_enabled || self.roll.abs() >= ROLL_SCALE_LIMIT {
            return;
        }

        let h = self.base.height();
        let tall = cfg.major_tick_length * h;
        let tip = 0.5 * h;
        let triangle = vec![
            Point::new(0.0, tip),
            Point::new(tall / 2.0, tip - tall),
            Point::new(-tall / 2.0, tip - tall),
        ];
        let text = self.text(self.roll, color);
        let width = text.extent.width;
        let text = text.at_baseline(Point::new(-width / 2.0, tip - tall - LABEL_GAP));

        self.scene.add_child(
            group,
            Primitive::filled_polygon(triangle, Some(Stroke::hairline(color)), Fill::Solid(color)),
        );
        self.scene.add_child(group, Primitive::Text(text));
    }

    /// Heading tape along the top edge centered on the current yaw.
    fn build_yaw_scale(&mut self) {
        self.scene.remove_slot(&mut self.yaw_scale);

        let cfg = self.base.config();
        let ppd = self.pixels_per_degree;
        if cfg.major_spacing <= 0.0 || cfg.major_tick_length <= 0.0 || ppd <= 0.0 {
            return;
        }

        let (w, h) = (self.base.width(), self.base.height());
        let tall = cfg.major_tick_length * h;
        let top = -0.5 * h;
        let color = cfg.tick_color;

        let group = self.scene.add(Primitive::Group);
        self.yaw_scale = Some(group);

        let mut center_width = 0.0;
        if cfg.text_enabled {
            let readout = self.text(self.yaw, color);
            center_width = readout.extent.width;
            let baseline = top + tall + readout.extent.height;
            let readout = readout.at_baseline(Point::new(-center_width / 2.0, baseline));
            let triangle = vec![
                Point::new(0.0, top),
                Point::new(tall / 2.0, top + tall),
                Point::new(-tall / 2.0, top + tall),
            ];
            self.scene.add_child(
                group,
                Primitive::filled_polygon(triangle, Some(Stroke::hairline(color)), Fill::Solid(color)),
            );
            self.scene.add_child(group, Primitive::Text(readout));
        }

        let half_span = 0.5 * w / ppd;
        let (first, last) = (self.yaw - half_span, self.yaw + half_span);
        let mut path = Path::new();
        let mut labels = Vec::new();
        for angle in ticks_between(first, last, cfg.major_spacing) {
            let x = (angle - self.yaw) * ppd;
            path.move_to(Point::new(x, top)).line_to(Point::new(x, top + tall));
            if !cfg.tick_labels_enabled {
                continue;
            }
            let label = self.text(normalize_yaw(angle), color);
            let left = x - label.extent.width / 2.0;
            let clear_of_readout = left + label.extent.width < -LABEL_GAP - 0.5 * center_width
                || left > LABEL_GAP + 0.5 * center_width;
            if clear_of_readout {
                let baseline = top + tall + label.extent.height;
                labels.push(label.at_baseline(Point::new(left, baseline)));
            }
        }

        if cfg.minor_spacing > 0.0 && cfg.minor_tick_length > 0.0 {
            let minor = cfg.minor_tick_length * h;
            for angle in ticks_between(first, last, cfg.minor_spacing) {
                if !is_multiple_of(angle, cfg.major_spacing) {
                    let x = (angle - self.yaw) * ppd;
                    path.move_to(Point::new(x, top)).line_to(Point::new(x, top + minor));
                }
            }
        }

        let stroke = self.tick_stroke();
        self.scene.add_child(group, Primitive::stroked_path(path, stroke));
        for label in labels {
            self.scene.add_child(group, Primitive::Text(label));
        }
    }

    /// Fixed aircraft symbol with the pitch readout beside it.
    fn build_reticle(&mut self) {
        self.scene.remove_slot(&mut self.reticle);

        let cfg = self.base.config();
        let color = if self.pitch.abs() > self.settings.pitch_alarm {
            self.settings.alarm_color
        } else {
            cfg.tick_color
        };

        let w = self.base.width();
        let center = (self.settings.pitch_major_tick_length + 0.05) * w / 2.0;
        let length = self.settings.pitch_major_tick_length * w / 2.0;

        let mut path = Path::new();
        path.move_to(Point::new(-(length + center), 0.0))
            .line_to(Point::new(-center, 0.0))
            .move_to(Point::new(length + center, 0.0))
            .line_to(Point::new(center, 0.0));

        let x_height = self.base.metrics().x_height(DEFAULT_FONT_SIZE);
        let text = self
            .text(self.pitch, color)
            .at_baseline(Point::new(length + center + LABEL_GAP, x_height));

        let group = self.scene.add(Primitive::Group);
        self.scene.set_transform(group, Transform::from_rotation(-self.roll));
        self.scene
            .add_child(group, Primitive::stroked_path(path, Stroke::hairline(color)));
        self.scene.add_child(group, Primitive::Text(text));
        self.reticle = Some(group);
    }
}

impl Gauge for AttitudeEngine {
    fn base(&self) -> &GaugeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GaugeBase {
        &mut self.base
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The drawable area is one pixel smaller than the view in each direction.
    fn set_size(&mut self, width: f64, height: f64) {
        self.base.set_size(width - 1.0, height - 1.0);
    }

    fn create_scene(&mut self) {
        self.rebuild();
    }

    /// Attitude has no scalar reading; this re-renders the current angles.
    fn set_reading(&mut self, _reading: Reading) {
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AttitudeEngine {
        let mut engine = AttitudeEngine::default();
        engine.set_size(301.0, 301.0);
        engine
    }

    fn group_texts(engine: &AttitudeEngine, group: Option<ItemId>) -> Vec<String> {
        let Some(group) = group else {
            return Vec::new();
        };
        engine.scene.get(group).map_or_else(Vec::new, |item| {
            item.children()
                .iter()
                .filter_map(|c| engine.scene.primitive(*c)?.as_text().map(|t| t.text.clone()))
                .collect()
        })
    }

    #[test]
    fn roll_and_yaw_are_normalized() {
        assert_eq!(normalize_roll(190.0), -170.0);
        assert_eq!(normalize_roll(-200.0), 160.0);
        assert_eq!(normalize_roll(180.0), 180.0);
        assert_eq!(normalize_roll(-180.0), 180.0);
        assert_eq!(normalize_yaw(-10.0), 350.0);
        assert_eq!(normalize_yaw(360.0), 0.0);
        assert_eq!(normalize_yaw(f64::NAN), 0.0);
    }

    #[test]
    fn first_update_rebuilds_later_updates_are_incremental() {
        let mut engine = engine();
        engine.set_angles(0.0, 0.0, 0.0);
        assert_eq!(engine.full_rebuilds(), 1);
        assert!(!engine.base().is_dirty());
        assert_eq!(engine.pixels_per_degree(), 5.0);

        engine.set_angles(10.0, 5.0, 20.0);
        engine.set_angles(-10.0, 2.0, 40.0);
        assert_eq!(engine.full_rebuilds(), 1);

        engine.set_pitch_major_tick_length(0.3);
        engine.set_angles(0.0, 0.0, 0.0);
        assert_eq!(engine.full_rebuilds(), 2);
    }

    #[test]
    fn ladder_labels_cover_the_visible_pitch_band() {
        let mut engine = engine();
        engine.set_angles(0.0, 0.0, 0.0);
        // 0.5 - 3 * 0.10 of a 60 degree range is +/-12 degrees
        assert_eq!(group_texts(&engine, engine.ladder), vec!["-10", "0", "10"]);
    }

    #[test]
    fn yaw_tick_label_under_readout_is_suppressed() {
        let mut engine = engine();
        engine.set_angles(0.0, 0.0, 0.0);
        let texts = group_texts(&engine, engine.yaw_scale);
        assert_eq!(texts.iter().filter(|t| t.as_str() == "0").count(), 1);
        assert!(texts.iter().any(|t| t == "350"));
        assert!(texts.iter().any(|t| t == "10"));
    }

    #[test]
    fn roll_label_hidden_beyond_scale_and_alarm_colored() {
        let mut engine = engine();
        engine.set_angles(130.0, 0.0, 0.0);
        assert!(group_texts(&engine, engine.roll_label).is_empty());

        engine.set_angles(50.0, 30.0, 0.0);
        assert_eq!(group_texts(&engine, engine.roll_label), vec!["50"]);
        let reticle = engine.reticle.and_then(|g| engine.scene.get(g)).unwrap();
        let pitch_text = reticle
            .children()
            .iter()
            .find_map(|c| engine.scene.primitive(*c)?.as_text())
            .unwrap();
        assert_eq!(pitch_text.text, "30");
        assert_eq!(pitch_text.color, Color::RED);
    }

    #[test]
    fn non_positive_pitch_range_is_ignored() {
        let mut engine = engine();
        engine.set_pitch_range(0.0);
        assert_eq!(engine.settings().pitch_range, 60.0);
        engine.set_pitch_range(30.0);
        assert_eq!(engine.settings().pitch_range, 30.0);
    }

    #[test]
    fn disabled_ladder_ticks_leave_no_ladder() {
        let mut engine = engine();
        engine.set_pitch_major_tick_length(0.0);
        engine.set_angles(0.0, 0.0, 0.0);
        assert!(engine.ladder.is_none());
    }
}
