// ============================================================================
// CRATE MODULES
// ============================================================================
//
// Scale and geometry engine for instrument gauges: an attitude indicator, a
// round dial, linear bar/thumb gauges and a two-dimensional plot. Every
// engine writes its drawing into a retained `Scene`; `raster` paints a scene
// into an RGBA frame.

pub mod attitude;
pub mod color;
pub mod config;
pub mod dial;
pub mod error;
pub mod geometry;
pub mod linear;
pub mod plot;
pub mod raster;
pub mod scale;
pub mod scene;
pub mod text;

pub use attitude::{AttitudeEngine, AttitudeSettings};
pub use color::Color;
pub use config::{GaugeBase, Reading, ScaleConfig};
pub use dial::DialEngine;
pub use error::{Error, Result};
pub use geometry::{Anchor, Point, Rect, Transform};
pub use linear::{LinearGaugeEngine, LinearSettings, LinearStyle, Orientation, TickSide};
pub use plot::{PlotEngine, PlotLayout, PlotRequest, PlotSeries};
pub use raster::{render_scene, Canvas, Viewport};
pub use scene::{ItemId, Primitive, Scene};
pub use text::{FixedMetrics, FontMetrics, TextMetrics};

// ============================================================================
// GAUGE INTERFACE
// ============================================================================

/// Behaviour shared by every scale-driven gauge.
///
/// Configuration changes only mark the gauge dirty. The scene is rebuilt on
/// the next reading update or [`Gauge::redraw`]; a reading update on a clean
/// gauge only moves the reading-dependent items.
pub trait Gauge {
    fn base(&self) -> &GaugeBase;
    fn base_mut(&mut self) -> &mut GaugeBase;
    fn scene(&self) -> &Scene;

    /// New drawable size. Always forces a rebuild.
    fn set_size(&mut self, width: f64, height: f64) {
        self.base_mut().set_size(width, height);
    }

    /// Discard every item and rebuild from the current configuration.
    fn create_scene(&mut self);

    fn set_reading(&mut self, reading: Reading);

    fn redraw(&mut self) {
        if self.base().is_dirty() {
            self.create_scene();
        }
    }
}

/// Any of the gauge engines, for hosts that keep them in one collection.
///
/// The thumb gauge is the `Linear` variant with [`LinearStyle::Thumb`]; the
/// filled-bar and thumb presentations share one engine and its tick layout.
#[derive(Debug)]
pub enum GaugeKind {
    Attitude(AttitudeEngine),
    Dial(DialEngine),
    Linear(LinearGaugeEngine),
}

impl GaugeKind {
    pub fn name(&self) -> &'static str {
        match self {
            GaugeKind::Attitude(_) => "attitude",
            GaugeKind::Dial(_) => "dial",
            GaugeKind::Linear(_) => "linear",
        }
    }

    fn as_gauge(&self) -> &dyn Gauge {
        match self {
            GaugeKind::Attitude(g) => g,
            GaugeKind::Dial(g) => g,
            GaugeKind::Linear(g) => g,
        }
    }

    fn as_gauge_mut(&mut self) -> &mut dyn Gauge {
        match self {
            GaugeKind::Attitude(g) => g,
            GaugeKind::Dial(g) => g,
            GaugeKind::Linear(g) => g,
        }
    }
}

impl Gauge for GaugeKind {
    fn base(&self) -> &GaugeBase {
        self.as_gauge().base()
    }

    fn base_mut(&mut self) -> &mut GaugeBase {
        self.as_gauge_mut().base_mut()
    }

    fn scene(&self) -> &Scene {
        self.as_gauge().scene()
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.as_gauge_mut().set_size(width, height);
    }

    fn create_scene(&mut self) {
        self.as_gauge_mut().create_scene();
    }

    fn set_reading(&mut self, reading: Reading) {
        self.as_gauge_mut().set_reading(reading);
    }

    fn redraw(&mut self) {
        self.as_gauge_mut().redraw();
    }
}

impl From<AttitudeEngine> for GaugeKind {
    fn from(engine: AttitudeEngine) -> Self {
        GaugeKind::Attitude(engine)
    }
}

impl From<DialEngine> for GaugeKind {
    fn from(engine: DialEngine) -> Self {
        GaugeKind::Dial(engine)
    }
}

impl From<LinearGaugeEngine> for GaugeKind {
    fn from(engine: LinearGaugeEngine) -> Self {
        GaugeKind::Linear(engine)
    }
}
