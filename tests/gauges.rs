use instrument_gauges::{
    render_scene, AttitudeEngine, Canvas, Color, DialEngine, Gauge, GaugeKind, LinearGaugeEngine,
    LinearSettings, LinearStyle, Orientation, PlotEngine, PlotRequest, PlotSeries, Point, Primitive,
    Reading, Rect, ScaleConfig, Scene, TickSide, Transform, Viewport,
};

fn snapshot(scene: &Scene) -> Vec<(Primitive, Transform)> {
    scene
        .draw_list()
        .into_iter()
        .map(|d| (d.primitive.clone(), d.transform))
        .collect()
}

#[test]
fn attitude_moves_horizon_without_rebuilding() {
    let mut attitude = AttitudeEngine::default();
    attitude.set_size(301.0, 301.0);
    attitude.set_angles(0.0, 0.0, 0.0);
    assert_eq!(attitude.full_rebuilds(), 1);

    attitude.set_angles(30.0, 10.0, 45.0);
    assert_eq!(attitude.full_rebuilds(), 1);

    let ppd = attitude.pixels_per_degree();
    assert!((ppd - 5.0).abs() < 1e-9);
    let shift = 10.0 * ppd;
    let expected = Point::new(
        shift * 30f64.to_radians().sin(),
        shift * 30f64.to_radians().cos(),
    );
    let origin = attitude.horizon_transform().map(Point::ORIGIN);
    assert!(origin.distance(expected) < 1e-9, "{origin:?} vs {expected:?}");
    assert!((attitude.horizon_transform().rotation_degrees() + 30.0).abs() < 1e-9);
}

#[test]
fn attitude_normalizes_roll() {
    let mut attitude = AttitudeEngine::default();
    attitude.set_size(301.0, 301.0);
    attitude.set_angles(190.0, 0.0, 0.0);
    assert!((attitude.roll() + 170.0).abs() < 1e-9);
    attitude.set_angles(-200.0, 0.0, 0.0);
    assert!((attitude.roll() - 160.0).abs() < 1e-9);
}

#[test]
fn attitude_yaw_wraps_into_a_full_turn() {
    let mut attitude = AttitudeEngine::default();
    attitude.set_size(301.0, 301.0);
    attitude.set_angles(0.0, 0.0, -10.0);
    assert_eq!(attitude.yaw(), 350.0);
    attitude.set_angles(0.0, 0.0, 725.0);
    assert_eq!(attitude.yaw(), 5.0);
}

#[test]
fn repeated_attitude_update_reproduces_the_scene() {
    let mut attitude = AttitudeEngine::default();
    attitude.set_size(301.0, 301.0);
    attitude.set_angles(0.0, 0.0, 0.0);

    attitude.set_angles(20.0, -8.0, 135.0);
    let first = snapshot(attitude.scene());
    attitude.set_angles(20.0, -8.0, 135.0);
    assert_eq!(snapshot(attitude.scene()), first);
    assert_eq!(attitude.full_rebuilds(), 1);
}

#[test]
fn repeated_dial_reading_reproduces_the_scene() {
    let mut dial = DialEngine::default();
    dial.set_size(240.0, 240.0);
    dial.set_reading(Reading::new(10.0));

    dial.set_reading(Reading::new(63.0));
    let first = snapshot(dial.scene());
    dial.set_reading(Reading::new(63.0));
    assert_eq!(snapshot(dial.scene()), first);
    assert_eq!(dial.full_rebuilds(), 1);
}

#[test]
fn repeated_linear_reading_reproduces_the_scene() {
    let variants = [
        (LinearStyle::FilledBar, false),
        (LinearStyle::FilledBar, true),
        (LinearStyle::Thumb { zoned: true }, false),
        (LinearStyle::Thumb { zoned: false }, true),
    ];
    for (style, dual_value) in variants {
        let mut linear = LinearGaugeEngine::new(
            ScaleConfig::default(),
            LinearSettings::builder()
                .orientation(Orientation::Vertical)
                .tick_side(TickSide::Both)
                .style(style)
                .dual_value(dual_value)
                .build(),
        );
        linear.set_size(80.0, 240.0);
        linear.set_dual_readings(Reading::new(5.0), Reading::new(5.0));

        linear.set_dual_readings(Reading::new(42.0), Reading::new(77.0));
        let first = snapshot(linear.scene());
        linear.set_dual_readings(Reading::new(42.0), Reading::new(77.0));
        assert_eq!(snapshot(linear.scene()), first, "{style:?} dual={dual_value}");
        assert_eq!(linear.full_rebuilds(), 1, "{style:?} dual={dual_value}");
    }
}

#[test]
fn rebuilding_a_clean_configuration_is_idempotent() {
    let mut dial = DialEngine::default();
    dial.set_size(240.0, 240.0);
    dial.set_reading(Reading::new(42.0));
    let first = snapshot(dial.scene());

    dial.create_scene();
    assert_eq!(snapshot(dial.scene()), first);

    // readout precision does not invalidate the layout
    dial.base_mut().set_reading_precision(0);
    dial.set_reading(Reading::new(42.0));
    assert_eq!(dial.full_rebuilds(), 2);
    assert_eq!(snapshot(dial.scene()), first);
}

#[test]
fn configuration_change_rebuilds_on_next_reading() {
    let mut gauge = GaugeKind::from(LinearGaugeEngine::new(
        ScaleConfig::default(),
        LinearSettings::builder()
            .orientation(Orientation::Horizontal)
            .style(LinearStyle::FilledBar)
            .build(),
    ));
    gauge.set_size(200.0, 40.0);
    gauge.set_reading(Reading::new(10.0));
    assert!(!gauge.base().is_dirty());

    gauge.base_mut().set_major_spacing(20.0);
    assert!(gauge.base().is_dirty());
    gauge.set_reading(Reading::new(10.0));
    assert!(!gauge.base().is_dirty());

    let labels: Vec<String> = gauge
        .scene()
        .texts()
        .into_iter()
        .map(|(t, _)| t.text.clone())
        .collect();
    assert!(labels.iter().any(|l| l == "20"));
    assert!(!labels.iter().any(|l| l == "30"));
}

#[test]
fn dual_axis_plot_aligns_gridlines() {
    let x: Vec<f64> = (0..50).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|v| v * 7.3).collect();
    let r: Vec<f64> = x.iter().map(|v| (v * 0.2).sin()).collect();
    let request = PlotRequest::builder()
        .title("alignment")
        .x(PlotSeries::new(x, "x", Color::BLACK))
        .y(vec![PlotSeries::new(y, "y", Color::RED)])
        .r(vec![PlotSeries::new(r, "r", Color::BLUE)])
        .build();

    let mut plot = PlotEngine::new();
    plot.set_size(600.0, 300.0);
    let layout = plot.generate_plot(&request);

    assert_eq!(layout.y.num_ticks, layout.r.num_ticks);
    assert!(layout.y.num_ticks > 0);
    for i in 0..=layout.y.num_ticks {
        let y = layout.map_y(layout.y.value_at(i));
        let r = layout.map_r(layout.r.value_at(i));
        assert!((y - r).abs() < 1e-6, "tick {i}: {y} vs {r}");
    }
    let view = plot.view_transform();
    let fitted = view.map_rect(&plot.scene().items_bounding_rect());
    assert!(fitted.width <= 600.0 + 1e-6 && fitted.height <= 300.0 + 1e-6);
}

#[test]
fn raster_paints_a_dial() {
    let (w, h) = (200usize, 200usize);
    let mut dial = DialEngine::default();
    dial.set_size(w as f64, h as f64);
    dial.set_reading(Reading::new(75.0));

    let mut frame = vec![0u8; w * h * 4];
    let mut canvas = Canvas::new(&mut frame, w, h).unwrap();
    canvas.clear(Color::WHITE);
    render_scene(
        &mut canvas,
        dial.scene(),
        &Viewport::for_scene(Rect::from_size(w as f64, h as f64), dial.scene()),
        None,
    );

    let painted = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| canvas.pixel(x, y) != Some(Color::WHITE))
        .count();
    assert!(painted > 100, "only {painted} pixels painted");
}
