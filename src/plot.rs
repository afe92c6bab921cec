//! Two-dimensional line plots with a shared X axis and independent left (Y)
//! and right (R) vertical axes.
//!
//! Each axis picks its own nice tick spacing from its data. When both
//! vertical axes are present their tick counts are reconciled so that every
//! Y gridline is also an R gridline.

use std::sync::Arc;

use bon::Builder;

use crate::color::Color;
use crate::geometry::{Anchor, Point, Rect, Transform};
use crate::scale::{tick_range, tick_range_fitted, TickRange};
use crate::scene::{Path, Primitive, Scene, Stroke, TextRun};
use crate::text::{format_fixed, FixedMetrics, TextMetrics, DEFAULT_FONT_SIZE};

/// Tick marks on the axes are this fraction of the axis length.
const TICK_FRACTION: f64 = 0.01;

/// One data series and how to present it.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct PlotSeries {
    #[builder(default)]
    pub data: Vec<f64>,
    #[builder(default = Color::BLACK)]
    pub color: Color,
    #[builder(default, into)]
    pub title: String,
    /// Every sample is multiplied by this before plotting.
    #[builder(default = 1.0)]
    pub scaler: f64,
    #[builder(default = false)]
    pub include_zero: bool,
    #[builder(default = true)]
    pub draw_axis: bool,
    /// Draw the lowest tick and its label on a vertical axis.
    #[builder(default = true)]
    pub draw_first_label: bool,
    /// Put the axis labels on the other side of the axis line.
    #[builder(default = false)]
    pub labels_high: bool,
}

impl PlotSeries {
    pub fn new(data: Vec<f64>, title: impl Into<String>, color: Color) -> Self {
        Self::builder().data(data).title(title).color(color).build()
    }

    fn scaled(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(move |v| v * self.scaler)
    }

    /// Minimum and maximum of the scaled data, `None` with fewer than two samples.
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.data.len() < 2 {
            return None;
        }
        let seed = if self.include_zero {
            0.0
        } else {
            self.data[0] * self.scaler
        };
        Some(fold_range(seed, self.scaled()))
    }
}

fn fold_range(seed: f64, values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((seed, seed), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Range covering every series of a set, `None` with fewer than two samples in total.
pub fn set_range(set: &[PlotSeries]) -> Option<(f64, f64)> {
    let samples: usize = set.iter().map(|s| s.data.len()).sum();
    if samples < 2 {
        return None;
    }
    let seed = set.iter().find_map(|s| s.scaled().next())?;
    let (mut lo, mut hi) = fold_range(seed, set.iter().flat_map(|s| s.scaled()));
    if set.iter().any(|s| s.include_zero) {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    Some((lo, hi))
}

/// Tick range for a data range with `num_ticks` as a suggestion.
fn fitted_ticks(range: Option<(f64, f64)>, num_ticks: u32) -> TickRange {
    match range {
        Some((lo, hi)) if hi > lo => {
            let ticks = tick_range_fitted(lo, hi, num_ticks);
            if ticks.span() > 0.0 {
                ticks
            } else {
                TickRange::UNIT
            }
        }
        _ => TickRange::UNIT,
    }
}

/// Tick range for a data range with exactly `num_ticks` ticks.
fn fixed_ticks(range: Option<(f64, f64)>, num_ticks: u32) -> TickRange {
    match range {
        Some((lo, hi)) if hi > lo => tick_range(lo, hi, num_ticks),
        _ if num_ticks > 0 => TickRange {
            num_ticks,
            spacing: 1.0 / f64::from(num_ticks),
            ..TickRange::UNIT
        },
        _ => TickRange::UNIT,
    }
}

/// Everything needed to draw one plot.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct PlotRequest {
    #[builder(default, into)]
    pub title: String,
    /// Suggested number of X ticks.
    #[builder(default = 5)]
    pub x_ticks: u32,
    /// Suggested number of ticks on the vertical axes.
    #[builder(default = 5)]
    pub y_ticks: u32,
    pub x: PlotSeries,
    #[builder(default)]
    pub y: Vec<PlotSeries>,
    #[builder(default)]
    pub r: Vec<PlotSeries>,
    #[builder(default = false)]
    pub y_scale_equals_x: bool,
    #[builder(default = false)]
    pub r_scale_equals_x: bool,
    /// Width over height of the grid; `None` lets it fill the region.
    pub aspect_ratio: Option<f64>,
}

/// Axis ranges and pixel scales of a generated plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub x: TickRange,
    pub y: TickRange,
    pub r: TickRange,
    /// Bottom-left corner of the grid.
    pub origin: Point,
    pub x_scale: f64,
    /// Pixels per unit, negative because y grows downward.
    pub y_scale: f64,
    pub r_scale: f64,
}

impl PlotLayout {
    pub fn map_x(&self, value: f64) -> f64 {
        self.origin.x + (value - self.x.start) * self.x_scale
    }

    pub fn map_y(&self, value: f64) -> f64 {
        self.origin.y + (value - self.y.start) * self.y_scale
    }

    pub fn map_r(&self, value: f64) -> f64 {
        self.origin.y + (value - self.r.start) * self.r_scale
    }

    pub fn grid_width(&self) -> f64 {
        self.x.span() * self.x_scale
    }

    /// Grid height in pixels, measured on the Y axis.
    pub fn grid_height(&self) -> f64 {
        -self.y.span() * self.y_scale
    }
}

pub struct PlotEngine {
    scene: Scene,
    width: f64,
    height: f64,
    metrics: Arc<dyn TextMetrics>,
    view: Transform,
    grid_color: Color,
}

impl std::fmt::Debug for PlotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotEngine")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("items", &self.scene.len())
            .field("view", &self.view)
            .finish()
    }
}

impl Default for PlotEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotEngine {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            width: 0.0,
            height: 0.0,
            metrics: Arc::new(FixedMetrics::default()),
            view: Transform::identity(),
            grid_color: Color::GRAY,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_metrics(&mut self, metrics: Arc<dyn TextMetrics>) {
        self.metrics = metrics;
    }

    pub fn set_grid_color(&mut self, color: Color) {
        self.grid_color = color;
    }

    /// View transform from the last [`PlotEngine::fit_all_in_view`].
    pub fn view_transform(&self) -> Transform {
        self.view
    }

    pub fn clear(&mut self) {
        self.scene.clear();
        self.view = Transform::identity();
    }

    /// Replace the scene with a plot filling the whole viewport, then fit it in view.
    pub fn generate_plot(&mut self, request: &PlotRequest) -> PlotLayout {
        self.scene.clear();
        let layout = self.generate_plot_in(Rect::from_size(self.width, self.height), request);
        self.fit_all_in_view();
        layout
    }

    /// Add a plot over `region` without touching what is already in the scene.
    pub fn generate_plot_in(&mut self, region: Rect, request: &PlotRequest) -> PlotLayout {
        let origin = Point::new(region.left(), region.bottom());

        let x = fitted_ticks(request.x.range(), request.x_ticks);
        let y_range = set_range(&request.y);
        let r_range = set_range(&request.r);
        let mut y = fitted_ticks(y_range, request.y_ticks);
        let mut r = fitted_ticks(r_range, request.y_ticks);

        // the axis with fewer ticks is recomputed with the larger count
        if y.num_ticks > r.num_ticks {
            r = fixed_ticks(r_range, y.num_ticks);
        } else if r.num_ticks > y.num_ticks {
            y = fixed_ticks(y_range, r.num_ticks);
        }

        let (mut width, mut height) = (region.width, region.height);
        if let Some(aspect) = request.aspect_ratio.filter(|a| *a > 0.0) {
            if height * aspect > width {
                height = width / aspect;
            } else {
                width = height * aspect;
            }
        }

        let x_scale = width / x.span();
        let y_scale = if request.y_scale_equals_x {
            -x_scale
        } else {
            -height / y.span()
        };
        let r_scale = if request.r_scale_equals_x {
            -x_scale
        } else {
            -height / r.span()
        };
        let layout = PlotLayout {
            x,
            y,
            r,
            origin,
            x_scale,
            y_scale,
            r_scale,
        };

        self.draw_grid(&layout);
        if request.x.draw_axis {
            self.draw_horizontal_axis(&layout, &request.x);
        }
        if request.y.iter().any(|s| s.draw_axis) {
            let left = !request.y[0].labels_high;
            self.draw_vertical_axis(origin.x, y, y_scale, origin.y, &request.y, left);
        }
        if request.r.iter().any(|s| s.draw_axis) {
            let left = request.r[0].labels_high;
            self.draw_vertical_axis(region.right(), r, r_scale, origin.y, &request.r, left);
        }

        if !request.title.is_empty() {
            let title = self
                .text(request.title.clone(), Color::BLACK)
                .anchored(Anchor::TopCenter, Point::new(region.center().x, region.top()));
            self.scene.add(Primitive::Text(title));
        }

        for series in &request.y {
            self.draw_series(&layout, &request.x, series, |l, v| l.map_y(v));
        }
        for series in &request.r {
            self.draw_series(&layout, &request.x, series, |l, v| l.map_r(v));
        }

        tracing::debug!(
            x_ticks = x.num_ticks,
            y_ticks = y.num_ticks,
            r_ticks = r.num_ticks,
            width,
            height,
            items = self.scene.len(),
            "plot generated"
        );
        layout
    }

    /// Scale and center everything drawn so it fits the viewport, keeping
    /// the aspect ratio. Returns the scene-to-viewport transform.
    pub fn fit_all_in_view(&mut self) -> Transform {
        let bounds = self.scene.items_bounding_rect();
        self.view = if self.width <= 0.0
            || self.height <= 0.0
            || bounds.width <= 0.0
            || bounds.height <= 0.0
        {
            Transform::identity()
        } else {
            let scale = (self.width / bounds.width).min(self.height / bounds.height);
            let center = bounds.center();
            Transform::from_translation(self.width / 2.0, self.height / 2.0)
                .scale(scale, scale)
                .translate(-center.x, -center.y)
        };
        self.view
    }

    fn text(&self, text: String, color: Color) -> TextRun {
        TextRun::new(text, DEFAULT_FONT_SIZE, color, self.metrics.as_ref())
    }

    /// Gridlines at every half tick of the X and Y axes.
    fn draw_grid(&mut self, layout: &PlotLayout) {
        let x_lines = (layout.x.num_ticks * 2).max(1);
        let y_lines = (layout.y.num_ticks * 2).max(1);
        let left = layout.origin.x;
        let bottom = layout.origin.y;
        let right = left + layout.grid_width();
        let top = bottom - layout.grid_height();

        let mut path = Path::new();
        for i in 0..=y_lines {
            let y = bottom - f64::from(i) * layout.grid_height() / f64::from(y_lines);
            path.move_to(Point::new(left, y)).line_to(Point::new(right, y));
        }
        for i in 0..=x_lines {
            let x = left + f64::from(i) * layout.grid_width() / f64::from(x_lines);
            path.move_to(Point::new(x, bottom)).line_to(Point::new(x, top));
        }
        self.scene
            .add(Primitive::stroked_path(path, Stroke::hairline(self.grid_color)));
    }

    fn draw_horizontal_axis(&mut self, layout: &PlotLayout, series: &PlotSeries) {
        let ticks = layout.x;
        let color = series.color;
        let high = series.labels_high;
        let origin = layout.origin;
        let length = layout.grid_width();
        let tick_length = (ticks.span() * TICK_FRACTION * layout.x_scale).abs();

        let title_anchor = if high {
            Anchor::TopCenter
        } else {
            Anchor::BottomCenter
        };
        let title = self
            .text(series.title.clone(), color)
            .anchored(title_anchor, Point::new(origin.x + length / 2.0, origin.y));
        self.scene.add(Primitive::Text(title));

        let mut path = Path::new();
        path.move_to(origin)
            .line_to(Point::new(origin.x + length, origin.y));

        let divisions = ticks.num_ticks.max(1);
        let step = ticks.span() / f64::from(divisions);
        for i in 0..=divisions {
            let x = origin.x + layout.x_scale * step * f64::from(i);
            let value = ticks.start + step * f64::from(i);
            let (anchor, tick_end) = if high {
                (Anchor::BottomCenter, origin.y + tick_length)
            } else {
                (Anchor::TopCenter, origin.y - tick_length)
            };
            let label = self
                .text(format_fixed(value, ticks.digits), color)
                .anchored(anchor, Point::new(x, origin.y));
            self.scene.add(Primitive::Text(label));
            path.move_to(Point::new(x, origin.y))
                .line_to(Point::new(x, tick_end));
        }
        self.scene
            .add(Primitive::stroked_path(path, Stroke::hairline(color)));
    }

    /// Vertical axis at `x`. With `left` the tick marks and series titles
    /// face right, into a grid to the right of the axis, and tick labels sit
    /// outside on the left. Titles of the set are stacked and centered as a
    /// block; the axis itself uses the average color of the set.
    fn draw_vertical_axis(
        &mut self,
        x: f64,
        ticks: TickRange,
        scale: f64,
        bottom: f64,
        set: &[PlotSeries],
        left: bool,
    ) {
        let tick_length = (ticks.span() * TICK_FRACTION * scale).abs();
        let center = bottom + scale * ticks.span() / 2.0;
        let inward = if left { tick_length } else { -tick_length };

        let titles: Vec<TextRun> = set
            .iter()
            .filter(|s| !s.title.is_empty())
            .map(|s| self.text(s.title.clone(), s.color))
            .collect();
        let block: f64 = titles.iter().map(|t| t.extent.height).sum();
        let mut top = center - block / 2.0;
        let title_anchor = if left {
            Anchor::TopLeft
        } else {
            Anchor::TopRight
        };
        for title in titles {
            let height = title.extent.height;
            let title = title.anchored(title_anchor, Point::new(x + inward, top));
            self.scene.add(Primitive::Text(title));
            top += height;
        }

        let colors: Vec<Color> = set.iter().map(|s| s.color).collect();
        let color = Color::average(&colors).unwrap_or(Color::BLACK);

        let mut path = Path::new();
        path.move_to(Point::new(x, bottom))
            .line_to(Point::new(x, bottom + scale * ticks.span()));

        let divisions = ticks.num_ticks.max(1);
        let step = ticks.span() / f64::from(divisions);
        let first = if set.iter().any(|s| s.draw_first_label) {
            0
        } else {
            1
        };
        let label_anchor = if left {
            Anchor::RightCenter
        } else {
            Anchor::LeftCenter
        };
        for i in first..=divisions {
            let y = bottom + scale * step * f64::from(i);
            let value = ticks.start + step * f64::from(i);
            let label = self
                .text(format_fixed(value, ticks.digits), color)
                .anchored(label_anchor, Point::new(x, y));
            self.scene.add(Primitive::Text(label));
            path.move_to(Point::new(x, y))
                .line_to(Point::new(x + inward, y));
        }
        self.scene
            .add(Primitive::stroked_path(path, Stroke::hairline(color)));
    }

    /// Polyline of `series` against `x`, using as many samples as both have.
    fn draw_series(
        &mut self,
        layout: &PlotLayout,
        x: &PlotSeries,
        series: &PlotSeries,
        map: impl Fn(&PlotLayout, f64) -> f64,
    ) {
        let points: Vec<Point> = x
            .scaled()
            .zip(series.scaled())
            .map(|(xv, v)| Point::new(layout.map_x(xv), map(layout, v)))
            .collect();
        if points.len() < 2 {
            return;
        }
        let mut path = Path::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        self.scene
            .add(Primitive::stroked_path(path, Stroke::hairline(series.color)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    fn engine(w: f64, h: f64) -> PlotEngine {
        let mut engine = PlotEngine::new();
        engine.set_size(w, h);
        engine
    }

    #[test]
    fn series_range_needs_two_samples() {
        let single = PlotSeries::builder().data(vec![4.0]).build();
        assert_eq!(single.range(), None);
        let zeroed = PlotSeries::builder()
            .data(vec![3.0, 7.0, 5.0])
            .include_zero(true)
            .build();
        assert_eq!(zeroed.range(), Some((0.0, 7.0)));
        let scaled = PlotSeries::builder().data(vec![1.0, -2.0]).scaler(2.0).build();
        assert_eq!(scaled.range(), Some((-4.0, 2.0)));
    }

    #[test]
    fn set_range_spans_every_series() {
        let set = vec![
            PlotSeries::new(vec![1.0, 2.0], "a", Color::RED),
            PlotSeries::new(vec![-3.0], "b", Color::BLUE),
        ];
        assert_eq!(set_range(&set), Some((-3.0, 2.0)));
        assert_eq!(set_range(&set[1..]), None);
        assert_eq!(set_range(&[]), None);
    }

    #[test]
    fn vertical_axes_share_gridlines() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(11, 1.0), "t", Color::BLACK))
            .y(vec![PlotSeries::new(ramp(11, 10.0), "speed", Color::RED)])
            .r(vec![PlotSeries::new(ramp(11, 0.3), "load", Color::BLUE)])
            .build();
        let mut plot = engine(400.0, 300.0);
        let layout = plot.generate_plot(&request);

        assert_eq!(layout.y.num_ticks, 5);
        assert_eq!(layout.r.num_ticks, 5);
        assert_eq!(layout.r.end, 5.0);
        for i in 0..=5 {
            let y = layout.map_y(layout.y.value_at(i));
            let r = layout.map_r(layout.r.value_at(i));
            assert!((y - r).abs() < 1e-9, "tick {i}: {y} vs {r}");
        }
    }

    #[test]
    fn axis_with_fewer_ticks_takes_the_larger_count() {
        // Y alone fits 0..16 in 4 ticks of 4, R alone fits 0..30 in 6 ticks of 5
        let request = PlotRequest::builder()
            .x(PlotSeries::new(vec![0.0, 1.0], "t", Color::BLACK))
            .y(vec![PlotSeries::new(vec![0.0, 16.0], "speed", Color::RED)])
            .r(vec![PlotSeries::new(vec![4.0, 26.0], "load", Color::BLUE)])
            .build();
        assert_eq!(fitted_ticks(request.y[0].range(), 5).num_ticks, 4);
        assert_eq!(fitted_ticks(request.r[0].range(), 5).num_ticks, 6);

        let layout = engine(400.0, 300.0).generate_plot(&request);
        assert_eq!(layout.y.num_ticks, 6);
        assert_eq!(layout.r.num_ticks, 6);
        assert_eq!((layout.y.start, layout.y.spacing, layout.y.end), (0.0, 4.0, 24.0));
        assert_eq!((layout.r.start, layout.r.spacing, layout.r.end), (0.0, 5.0, 30.0));
        for i in 0..=6 {
            let y = layout.map_y(layout.y.value_at(i));
            let r = layout.map_r(layout.r.value_at(i));
            assert!((y - r).abs() < 1e-9, "tick {i}: {y} vs {r}");
        }
    }

    #[test]
    fn empty_axis_falls_back_to_unit_range() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(3, 1.0), "", Color::BLACK))
            .build();
        let layout = engine(200.0, 100.0).generate_plot(&request);
        assert_eq!(layout.y, TickRange::UNIT);
        assert_eq!(layout.r, TickRange::UNIT);
        assert!((layout.grid_height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_ratio_shrinks_the_longer_side() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(11, 1.0), "", Color::BLACK))
            .y(vec![PlotSeries::new(ramp(11, 1.0), "", Color::RED)])
            .aspect_ratio(1.0)
            .build();
        let layout = engine(400.0, 200.0).generate_plot(&request);
        assert!((layout.grid_width() - 200.0).abs() < 1e-9);
        assert!((layout.grid_height() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn series_polyline_uses_the_shorter_length() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(5, 1.0), "", Color::BLACK))
            .y(vec![PlotSeries::new(vec![0.0, 2.0, 4.0], "", Color::RED)])
            .build();
        let mut plot = engine(200.0, 100.0);
        plot.generate_plot(&request);
        let red_paths: Vec<usize> = plot
            .scene()
            .draw_list()
            .iter()
            .filter_map(|d| match d.primitive {
                Primitive::Path { path, stroke: Some(s), .. } if s.color == Color::RED => {
                    Some(path.flatten()[0].points.len())
                }
                _ => None,
            })
            .collect();
        // the axis shares the series color and is drawn first
        assert_eq!(red_paths, vec![2, 3]);
    }

    #[test]
    fn stacked_titles_are_centered_on_the_axis() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(11, 1.0), "", Color::BLACK))
            .y(vec![
                PlotSeries::new(ramp(11, 1.0), "alpha", Color::RED),
                PlotSeries::new(ramp(11, 2.0), "beta", Color::BLUE),
            ])
            .build();
        let mut plot = engine(400.0, 300.0);
        let layout = plot.generate_plot(&request);
        let titles: Vec<Rect> = plot
            .scene()
            .texts()
            .into_iter()
            .filter(|(t, _)| t.text == "alpha" || t.text == "beta")
            .map(|(t, _)| t.rect())
            .collect();
        assert_eq!(titles.len(), 2);
        let block = titles[0].united(&titles[1]);
        let center = layout.origin.y - layout.grid_height() / 2.0;
        assert!((block.center().y - center).abs() < 1e-9);
        assert!(titles[0].bottom() <= titles[1].top() + 1e-9);
    }

    #[test]
    fn shared_axis_uses_average_color() {
        let request = PlotRequest::builder()
            .x(PlotSeries::new(ramp(11, 1.0), "", Color::BLACK))
            .y(vec![
                PlotSeries::new(ramp(11, 1.0), "", Color::RED),
                PlotSeries::new(ramp(11, 1.0), "", Color::BLUE),
            ])
            .build();
        let mut plot = engine(400.0, 300.0);
        plot.generate_plot(&request);
        let purple = Color::new(127, 0, 127);
        assert!(plot.scene().texts().iter().any(|(t, _)| t.color == purple));
    }

    #[test]
    fn fit_all_in_view_centers_the_content() {
        let mut plot = engine(200.0, 200.0);
        plot.scene.add(Primitive::rect(
            Rect::new(10.0, 10.0, 100.0, 50.0),
            None,
            None,
        ));
        let view = plot.fit_all_in_view();
        assert!((view.scale_factor() - 2.0).abs() < 1e-9);
        let center = view.map(Point::new(60.0, 35.0));
        assert!(center.distance(Point::new(100.0, 100.0)) < 1e-9);
        assert_eq!(plot.view_transform(), view);
    }
}
