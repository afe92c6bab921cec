use std::collections::VecDeque;
use std::env;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::{Duration, Instant};

use instrument_gauges::{
    render_scene, AttitudeEngine, Canvas, Color, DialEngine, FontMetrics, Gauge, GaugeKind,
    LinearGaugeEngine, LinearSettings, LinearStyle, Orientation, PlotEngine, PlotRequest,
    PlotSeries, Reading, Rect, ScaleConfig, TickSide, Viewport,
};
use pixels::{Pixels, SurfaceTexture};
use rand::Rng;
use rusttype::Font;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// DEMO CONFIGURATION
// ============================================================================

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const UPDATE_PERIOD: Duration = Duration::from_millis(50);
const SWEEP_SECONDS: f64 = 10.0;
const HISTORY_LEN: usize = 200;
const FONT_ENV: &str = "INSTRUMENT_FONT";

// ============================================================================
// DASHBOARD
// ============================================================================

struct Panel {
    gauge: GaugeKind,
    rect: Rect,
}

struct Dashboard {
    panels: Vec<Panel>,
    plot: PlotEngine,
    plot_rect: Rect,
    history: VecDeque<(f64, f64, f64)>,
    metrics: Option<Arc<FontMetrics>>,
}

impl Dashboard {
    fn new(metrics: Option<Arc<FontMetrics>>) -> Self {
        let dial_config = ScaleConfig::builder()
            .major_tick_length(0.05)
            .minor_tick_length(0.025)
            .label("RPM x100")
            .build();
        let mut dial = DialEngine::new(dial_config);
        dial.set_arc_width(0.05);

        let linear = |orientation: Orientation,
                      tick_side: TickSide,
                      style: LinearStyle,
                      dual_value: bool| {
            LinearGaugeEngine::new(
                ScaleConfig::default(),
                LinearSettings::builder()
                    .orientation(orientation)
                    .tick_side(tick_side)
                    .style(style)
                    .dual_value(dual_value)
                    .build(),
            )
        };

        let panels = vec![
            Panel {
                gauge: AttitudeEngine::default().into(),
                rect: Rect::new(0.0, 0.0, 300.0, 300.0),
            },
            Panel {
                gauge: dial.into(),
                rect: Rect::new(300.0, 0.0, 300.0, 300.0),
            },
            Panel {
                gauge: linear(Orientation::Vertical, TickSide::LeftOrTop, LinearStyle::FilledBar, false)
                    .into(),
                rect: Rect::new(600.0, 0.0, 100.0, 300.0),
            },
            Panel {
                gauge: linear(
                    Orientation::Vertical,
                    TickSide::RightOrBottom,
                    LinearStyle::Thumb { zoned: true },
                    false,
                )
                .into(),
                rect: Rect::new(700.0, 0.0, 100.0, 300.0),
            },
            Panel {
                gauge: linear(Orientation::Horizontal, TickSide::Both, LinearStyle::FilledBar, true)
                    .into(),
                rect: Rect::new(0.0, 300.0, 400.0, 80.0),
            },
            Panel {
                gauge: linear(
                    Orientation::Horizontal,
                    TickSide::LeftOrTop,
                    LinearStyle::Thumb { zoned: false },
                    true,
                )
                .into(),
                rect: Rect::new(400.0, 300.0, 400.0, 80.0),
            },
        ];

        let mut dashboard = Self {
            panels,
            plot: PlotEngine::new(),
            plot_rect: Rect::new(0.0, 380.0, 800.0, 220.0),
            history: VecDeque::with_capacity(HISTORY_LEN),
            metrics,
        };
        for panel in &mut dashboard.panels {
            panel.gauge.set_size(panel.rect.width, panel.rect.height);
            if let Some(metrics) = &dashboard.metrics {
                panel.gauge.base_mut().set_metrics(metrics.clone());
            }
        }
        dashboard
            .plot
            .set_size(dashboard.plot_rect.width, dashboard.plot_rect.height);
        if let Some(metrics) = &dashboard.metrics {
            dashboard.plot.set_metrics(metrics.clone());
        }
        dashboard
    }

    fn font(&self) -> Option<&Font<'static>> {
        self.metrics.as_deref().map(FontMetrics::font)
    }

    /// Advance every gauge to time `t` seconds.
    fn update(&mut self, t: f64, rng: &mut impl Rng) {
        let phase = TAU * t / SWEEP_SECONDS;
        let value = 50.0 + 45.0 * phase.sin() + rng.random_range(-1.5..1.5);
        let other = 50.0 + 40.0 * phase.cos();

        for panel in &mut self.panels {
            match &mut panel.gauge {
                GaugeKind::Attitude(attitude) => {
                    attitude.set_angles(35.0 * phase.sin(), 15.0 * phase.cos(), (36.0 * t) % 360.0)
                }
                GaugeKind::Linear(linear) if linear.settings().dual_value => {
                    linear.set_dual_readings(Reading::new(value), Reading::new(other))
                }
                gauge => gauge.set_reading(Reading::new(value)),
            }
        }

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back((t, value, other / 20.0));
        let (times, (values, others)): (Vec<f64>, (Vec<f64>, Vec<f64>)) =
            self.history.iter().map(|(t, v, o)| (*t, (*v, *o))).unzip();
        let request = PlotRequest::builder()
            .title("Recent readings")
            .x(PlotSeries::new(times, "time (s)", Color::BLACK))
            .y(vec![PlotSeries::new(values, "reading", Color::RED)])
            .r(vec![PlotSeries::new(others, "secondary", Color::BLUE)])
            .build();
        self.plot.generate_plot(&request);
    }

    fn render(&self, frame: &mut [u8], width: usize, height: usize) -> instrument_gauges::Result<()> {
        let mut canvas = Canvas::new(frame, width, height)?;
        canvas.clear(Color::WHITE);
        let font = self.font();
        for panel in &self.panels {
            let scene = panel.gauge.scene();
            render_scene(&mut canvas, scene, &Viewport::for_scene(panel.rect, scene), font);
        }
        let viewport = Viewport::new(self.plot_rect).with_view(self.plot.view_transform());
        render_scene(&mut canvas, self.plot.scene(), &viewport, font);
        Ok(())
    }
}

// ============================================================================
// WINDOW
// ============================================================================

/// Font from the first argument or `INSTRUMENT_FONT`. Text is skipped without one.
fn load_font() -> Result<Option<Arc<FontMetrics>>, Box<dyn std::error::Error>> {
    let Some(path) = env::args().nth(1).or_else(|| env::var(FONT_ENV).ok()) else {
        tracing::warn!(
            "no font given as argument or in {FONT_ENV}; text will be measured but not drawn"
        );
        return Ok(None);
    };
    let data = std::fs::read(&path)?;
    let metrics = FontMetrics::from_bytes(data)?;
    tracing::info!(%path, "font loaded");
    Ok(Some(Arc::new(metrics)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut dashboard = Dashboard::new(load_font()?);
    let mut rng = rand::rng();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Instrument gauges")
        .with_inner_size(LogicalSize::new(
            f64::from(WINDOW_WIDTH),
            f64::from(WINDOW_HEIGHT),
        ))
        .with_resizable(false)
        .build(&event_loop)?;
    let window = Arc::new(window);
    let window_clone = window.clone();

    let size = window.inner_size();
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(WINDOW_WIDTH, WINDOW_HEIGHT, surface_texture)?;

    let start = Instant::now();
    let mut last_update = Instant::now();
    dashboard.update(0.0, &mut rng);

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                        tracing::error!(%err, "surface resize failed");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let frame = pixels.frame_mut();
                    let (width, height) = (WINDOW_WIDTH as usize, WINDOW_HEIGHT as usize);
                    if let Err(err) = dashboard.render(frame, width, height) {
                        tracing::error!(%err, "render failed");
                        window_target.exit();
                        return;
                    }
                    if let Err(err) = pixels.render() {
                        tracing::error!(%err, "present failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_update.elapsed() >= UPDATE_PERIOD {
                    dashboard.update(start.elapsed().as_secs_f64(), &mut rng);
                    last_update = Instant::now();
                    window_clone.request_redraw();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}
