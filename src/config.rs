use std::sync::Arc;

use bon::Builder;

use crate::color::Color;
use crate::scale;
use crate::text::{format_fixed, FixedMetrics, TextMetrics};

// ============================================================================
// SCALE CONFIGURATION
// ============================================================================

/// Scale definition shared by every gauge.
///
/// Values are in scale units except the tick lengths, which are fractions of
/// the gauge size. A config is sanitized whenever it enters a [`GaugeBase`].
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ScaleConfig {
    #[builder(default = 0.0)]
    pub scale_start: f64,
    #[builder(default = 30.0)]
    pub low_range: f64,
    #[builder(default = 40.0)]
    pub mid_range: f64,
    #[builder(default = 30.0)]
    pub high_range: f64,

    // Tick marks
    #[builder(default = 10.0)]
    pub major_spacing: f64,
    #[builder(default = 2.0)]
    pub minor_spacing: f64,
    #[builder(default = 0.25)]
    pub major_tick_length: f64,
    #[builder(default = 0.10)]
    pub minor_tick_length: f64,

    // Colors
    #[builder(default = Color::WHITE)]
    pub low_color: Color,
    #[builder(default = Color::GREEN)]
    pub mid_color: Color,
    #[builder(default = Color::RED)]
    pub high_color: Color,
    #[builder(default = Color::TRANSPARENT)]
    pub background_color: Color,
    #[builder(default = Color::BLACK)]
    pub tick_color: Color,

    // Text
    #[builder(default = 0)]
    pub tick_precision: usize,
    #[builder(default = 0)]
    pub reading_precision: usize,
    #[builder(default = true)]
    pub labels_enabled: bool,
    #[builder(default = true)]
    pub tick_labels_enabled: bool,
    #[builder(default = true)]
    pub text_enabled: bool,
    #[builder(default, into)]
    pub label: String,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScaleConfig {
    pub fn total_range(&self) -> f64 {
        self.low_range + self.mid_range + self.high_range
    }

    /// Clamp every field into its valid domain.
    ///
    /// Negative or non-finite ranges, spacings and lengths become zero, and the
    /// minor spacing and length never exceed their major counterparts.
    pub fn sanitized(mut self) -> Self {
        let non_negative = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        if !self.scale_start.is_finite() {
            self.scale_start = 0.0;
        }
        self.low_range = non_negative(self.low_range);
        self.mid_range = non_negative(self.mid_range);
        self.high_range = non_negative(self.high_range);
        self.major_spacing = non_negative(self.major_spacing);
        self.minor_spacing = non_negative(self.minor_spacing).min(self.major_spacing);
        self.major_tick_length = non_negative(self.major_tick_length);
        self.minor_tick_length = non_negative(self.minor_tick_length).min(self.major_tick_length);
        self
    }
}

// ============================================================================
// READINGS
// ============================================================================

/// A displayed value: `pointer` drives geometry, `text` drives the readout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub pointer: f64,
    pub text: f64,
}

impl Reading {
    pub const fn new(value: f64) -> Self {
        Self {
            pointer: value,
            text: value,
        }
    }

    pub const fn split(pointer: f64, text: f64) -> Self {
        Self { pointer, text }
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::new(value)
    }
}

// ============================================================================
// GAUGE BASE
// ============================================================================

/// State every gauge shares: the scale, its viewport, readings, text
/// measurement and the dirty flag.
///
/// The flag starts set, is cleared by the owning engine after a full rebuild,
/// and is set again by any mutation that changes layout.
#[derive(Clone)]
pub struct GaugeBase {
    config: ScaleConfig,
    width: f64,
    height: f64,
    dirty: bool,
    reading: Reading,
    reading2: Reading,
    metrics: Arc<dyn TextMetrics>,
}

impl std::fmt::Debug for GaugeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeBase")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .field("reading", &self.reading)
            .field("reading2", &self.reading2)
            .finish_non_exhaustive()
    }
}

impl Default for GaugeBase {
    fn default() -> Self {
        Self::new(ScaleConfig::default())
    }
}

impl GaugeBase {
    pub fn new(config: ScaleConfig) -> Self {
        Self {
            config: config.sanitized(),
            width: 0.0,
            height: 0.0,
            dirty: true,
            reading: Reading::default(),
            reading2: Reading::default(),
            metrics: Arc::new(FixedMetrics::default()),
        }
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// The single entry point for layout-affecting changes.
    pub fn update_config(&mut self, f: impl FnOnce(&mut ScaleConfig)) {
        let mut next = self.config.clone();
        f(&mut next);
        self.config = next.sanitized();
        self.dirty = true;
        tracing::trace!("scale configuration updated");
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: ScaleConfig) {
        self.update_config(|cfg| *cfg = config);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // ------------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------------

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.dirty = true;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    // ------------------------------------------------------------------------
    // Named setters
    // ------------------------------------------------------------------------

    pub fn set_scale_start(&mut self, value: f64) {
        self.update_config(|cfg| cfg.scale_start = value);
    }

    pub fn set_low_range(&mut self, value: f64) {
        self.update_config(|cfg| cfg.low_range = value);
    }

    pub fn set_mid_range(&mut self, value: f64) {
        self.update_config(|cfg| cfg.mid_range = value);
    }

    pub fn set_high_range(&mut self, value: f64) {
        self.update_config(|cfg| cfg.high_range = value);
    }

    pub fn set_major_spacing(&mut self, value: f64) {
        self.update_config(|cfg| cfg.major_spacing = value);
    }

    pub fn set_minor_spacing(&mut self, value: f64) {
        self.update_config(|cfg| cfg.minor_spacing = value);
    }

    pub fn set_major_tick_length(&mut self, value: f64) {
        self.update_config(|cfg| cfg.major_tick_length = value);
    }

    pub fn set_minor_tick_length(&mut self, value: f64) {
        self.update_config(|cfg| cfg.minor_tick_length = value);
    }

    pub fn set_low_color(&mut self, color: Color) {
        self.update_config(|cfg| cfg.low_color = color);
    }

    pub fn set_mid_color(&mut self, color: Color) {
        self.update_config(|cfg| cfg.mid_color = color);
    }

    pub fn set_high_color(&mut self, color: Color) {
        self.update_config(|cfg| cfg.high_color = color);
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.update_config(|cfg| cfg.background_color = color);
    }

    pub fn set_tick_color(&mut self, color: Color) {
        self.update_config(|cfg| cfg.tick_color = color);
    }

    pub fn set_tick_precision(&mut self, digits: usize) {
        self.update_config(|cfg| cfg.tick_precision = digits);
    }

    pub fn set_labels_enabled(&mut self, enabled: bool) {
        self.update_config(|cfg| cfg.labels_enabled = enabled);
    }

    pub fn set_tick_labels_enabled(&mut self, enabled: bool) {
        self.update_config(|cfg| cfg.tick_labels_enabled = enabled);
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.update_config(|cfg| cfg.label = label);
    }

    /// Affects only the readout, so the layout stays valid.
    pub fn set_reading_precision(&mut self, digits: usize) {
        self.config.reading_precision = digits;
    }

    /// Affects only the readout, so the layout stays valid.
    pub fn set_text_enabled(&mut self, enabled: bool) {
        self.config.text_enabled = enabled;
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    pub fn set_metrics(&mut self, metrics: Arc<dyn TextMetrics>) {
        self.metrics = metrics;
        self.dirty = true;
    }

    pub fn format_tick(&self, value: f64) -> String {
        format_fixed(value, self.config.tick_precision)
    }

    pub fn format_reading(&self, value: f64) -> String {
        format_fixed(value, self.config.reading_precision)
    }

    // ------------------------------------------------------------------------
    // Readings
    // ------------------------------------------------------------------------

    pub fn reading(&self) -> Reading {
        self.reading
    }

    pub fn reading2(&self) -> Reading {
        self.reading2
    }

    pub fn set_reading(&mut self, reading: Reading) {
        self.reading = reading;
    }

    pub fn set_reading2(&mut self, reading: Reading) {
        self.reading2 = reading;
    }

    // ------------------------------------------------------------------------
    // Scale queries
    // ------------------------------------------------------------------------

    pub fn top_of_low_range(&self) -> f64 {
        self.config.scale_start + self.config.low_range
    }

    pub fn top_of_mid_range(&self) -> f64 {
        self.top_of_low_range() + self.config.mid_range
    }

    pub fn top_of_scale(&self) -> f64 {
        self.top_of_mid_range() + self.config.high_range
    }

    pub fn total_range(&self) -> f64 {
        self.config.total_range()
    }

    pub fn clamp_to_scale(&self, value: f64) -> f64 {
        value.clamp(self.config.scale_start, self.top_of_scale())
    }

    pub fn color_for_reading(&self, value: f64) -> Color {
        if value < self.top_of_low_range() {
            self.config.low_color
        } else if value < self.top_of_mid_range() {
            self.config.mid_color
        } else {
            self.config.high_color
        }
    }

    pub fn value_to_angle(&self, value: f64, low_angle: f64, high_angle: f64) -> f64 {
        scale::value_to_angle(
            value,
            self.config.scale_start,
            self.total_range(),
            low_angle,
            high_angle,
        )
    }

    pub fn value_to_pixel(&self, value: f64, pixel_extent: f64, vertical: bool) -> f64 {
        scale::value_to_pixel(
            value,
            self.config.scale_start,
            self.total_range(),
            pixel_extent,
            vertical,
        )
    }
}
