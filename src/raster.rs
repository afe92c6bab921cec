// ============================================================================
// SOFTWARE RASTERIZER
// ============================================================================
//
// Paints a gauge `Scene` into an RGBA8 frame such as the one handed out by
// `pixels::Pixels::frame_mut`. Fills are scanline even-odd without
// antialiasing; strokes and text are antialiased.

use rusttype::{point, Font, Scale};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Transform};
use crate::scene::{Fill, Primitive, Scene, Subpath, TextRun};

/// A mutable view over an RGBA8 frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    clip: Option<Rect>,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Result<Self> {
        let expected = width * height * 4;
        if frame.len() != expected {
            return Err(Error::FrameSize {
                expected,
                actual: frame.len(),
            });
        }
        Ok(Self {
            frame,
            width,
            height,
            clip: None,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Restrict painting to `clip`; `None` allows the whole frame.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.frame[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    /// Integer pixel bounds of the clip intersected with the frame.
    fn bounds(&self) -> (i64, i64, i64, i64) {
        let (mut x0, mut y0) = (0, 0);
        let (mut x1, mut y1) = (self.width as i64, self.height as i64);
        if let Some(clip) = self.clip {
            x0 = x0.max(clip.left().floor() as i64);
            y0 = y0.max(clip.top().floor() as i64);
            x1 = x1.min(clip.right().ceil() as i64);
            y1 = y1.min(clip.bottom().ceil() as i64);
        }
        (x0, y0, x1, y1)
    }

    /// Blend `color` over the pixel with coverage `alpha`.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        let (x0, y0, x1, y1) = self.bounds();
        if x < x0 || x >= x1 || y < y0 || y >= y1 {
            return;
        }
        let a = alpha.clamp(0.0, 1.0) * f32::from(color.a) / 255.0;
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let dst = &mut self.frame[idx..idx + 4];
        let mix = |src: u8, dst: u8| (f32::from(src) * a + f32::from(dst) * (1.0 - a)).round() as u8;
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = 0xff;
    }

    /// Splat a sub-pixel sample over its four neighbours.
    fn draw_antialiased_pixel(&mut self, p: Point, color: Color, alpha: f32) {
        let (xf, yf) = (p.x.floor(), p.y.floor());
        let (fx, fy) = (p.x - xf, p.y - yf);
        let (x, y) = (xf as i64, yf as i64);
        let samples = [
            (x, y, (1.0 - fx) * (1.0 - fy)),
            (x + 1, y, fx * (1.0 - fy)),
            (x, y + 1, (1.0 - fx) * fy),
            (x + 1, y + 1, fx * fy),
        ];
        for (px, py, weight) in samples {
            let a = alpha * weight as f32;
            if a > 0.001 {
                self.set_pixel(px, py, color, a);
            }
        }
    }

    pub fn draw_thick_line_aa(&mut self, from: Point, to: Point, thickness: f64, color: Color) {
        let reach = thickness.ceil() + 1.0;
        let min_x = (from.x.min(to.x) - reach).floor() as i64;
        let max_x = (from.x.max(to.x) + reach).ceil() as i64;
        let min_y = (from.y.min(to.y) - reach).floor() as i64;
        let max_y = (from.y.max(to.y) + reach).ceil() as i64;
        let (x0, y0, x1, y1) = self.bounds();

        let d = to - from;
        let len_sq = d.x * d.x + d.y * d.y;
        for y in min_y.max(y0)..=max_y.min(y1 - 1) {
            for x in min_x.max(x0)..=max_x.min(x1 - 1) {
                let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    (((c.x - from.x) * d.x + (c.y - from.y) * d.y) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = c.distance(from + d * t);
                let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.set_pixel(x, y, color, aa as f32);
                }
            }
        }
    }

    /// Even-odd fill of device-space polygons. `local` maps device pixels
    /// back to the coordinates `fill` is defined in.
    pub fn fill_polygons(&mut self, polygons: &[Vec<Point>], fill: &Fill, local: &Transform) {
        let edges: Vec<(Point, Point)> = polygons
            .iter()
            .filter(|poly| poly.len() > 2)
            .flat_map(|poly| {
                poly.iter()
                    .copied()
                    .zip(poly.iter().copied().cycle().skip(1))
                    .filter(|(a, b)| a.y != b.y)
            })
            .collect();
        let Some(extent) = Rect::bounding(edges.iter().flat_map(|(a, b)| [*a, *b])) else {
            return;
        };
        let (x0, y0, x1, y1) = self.bounds();
        let top = (extent.top().floor() as i64).max(y0);
        let bottom = (extent.bottom().ceil() as i64).min(y1);

        let mut crossings = Vec::new();
        for y in top..bottom {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for (a, b) in &edges {
                let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
                if sy >= lo.y && sy < hi.y {
                    crossings.push(lo.x + (sy - lo.y) / (hi.y - lo.y) * (hi.x - lo.x));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil() as i64).max(x0);
                let end = ((span[1] - 0.5).ceil() as i64).min(x1);
                for x in start..end {
                    let color = match fill {
                        Fill::Solid(color) => *color,
                        gradient => {
                            gradient.color_at(local.map(Point::new(x as f64 + 0.5, sy)))
                        }
                    };
                    self.set_pixel(x, y, color, 1.0);
                }
            }
        }
    }

    /// Draw `run` under `transform`. Glyphs follow the rotation and scale of
    /// the transform.
    pub fn draw_text(&mut self, run: &TextRun, transform: &Transform, font: &Font<'_>) {
        let scale = transform.scale_factor();
        if scale <= 0.0 || run.text.is_empty() {
            return;
        }
        let px_size = (run.size * scale) as f32;
        let rusttype_scale = Scale::uniform(px_size);
        let ascent = font.v_metrics(rusttype_scale).ascent;
        let origin = transform.map(run.origin);
        let (cos, sin) = (transform.m11 / scale, transform.m12 / scale);

        for glyph in font.layout(&run.text, rusttype_scale, point(0.0, ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                let lx = f64::from(bb.min.x) + f64::from(gx);
                let ly = f64::from(bb.min.y) + f64::from(gy);
                let p = Point::new(origin.x + lx * cos - ly * sin, origin.y + lx * sin + ly * cos);
                self.draw_antialiased_pixel(p, run.color, v);
            });
        }
    }
}

/// Where a scene lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Scene to canvas mapping.
    pub transform: Transform,
    /// Canvas area the scene may paint into.
    pub clip: Rect,
}

impl Viewport {
    /// Scene origin at `rect`'s top-left corner, painting clipped to `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            transform: Transform::from_translation(rect.x, rect.y),
            clip: rect,
        }
    }

    /// Scene rect of `scene` placed at `rect`'s top-left corner.
    pub fn for_scene(rect: Rect, scene: &Scene) -> Self {
        let origin = scene.scene_rect().top_left();
        Self {
            transform: Transform::from_translation(rect.x - origin.x, rect.y - origin.y),
            clip: rect,
        }
    }

    /// Apply `view` to the scene before placing it.
    pub fn with_view(mut self, view: Transform) -> Self {
        self.transform = view.then(&self.transform);
        self
    }
}

fn device_points(subpath: &Subpath, transform: &Transform) -> Vec<Point> {
    subpath.points.iter().map(|p| transform.map(*p)).collect()
}

/// Paint every item of `scene` in draw order. Text is skipped without a font.
pub fn render_scene(
    canvas: &mut Canvas<'_>,
    scene: &Scene,
    viewport: &Viewport,
    font: Option<&Font<'_>>,
) {
    canvas.set_clip(Some(viewport.clip));
    if let Some(background) = scene.background() {
        let area = vec![viewport.clip.corners().to_vec()];
        canvas.fill_polygons(&area, &Fill::Solid(background), &Transform::identity());
    }

    for item in scene.draw_list() {
        let world = item.transform.then(&viewport.transform);
        if let Primitive::Text(run) = item.primitive {
            if let Some(font) = font {
                canvas.draw_text(run, &world, font);
            }
            continue;
        }

        let outlines = item.primitive.outlines();
        if let Some(fill) = item.primitive.fill() {
            let polygons: Vec<Vec<Point>> =
                outlines.iter().map(|s| device_points(s, &world)).collect();
            let local = world.inverse().unwrap_or_default();
            canvas.fill_polygons(&polygons, &fill, &local);
        }
        if let Some(stroke) = item.primitive.stroke() {
            let width = (stroke.width * world.scale_factor()).max(1.0);
            for subpath in &outlines {
                let points = device_points(subpath, &world);
                for pair in points.windows(2) {
                    canvas.draw_thick_line_aa(pair[0], pair[1], width, stroke.color);
                }
                if subpath.closed && points.len() > 2 {
                    if let (Some(first), Some(last)) = (points.first(), points.last()) {
                        canvas.draw_thick_line_aa(*last, *first, width, stroke.color);
                    }
                }
            }
        }
    }
    canvas.set_clip(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Stroke;

    fn frame(w: usize, h: usize) -> Vec<u8> {
        vec![0; w * h * 4]
    }

    #[test]
    fn frame_size_mismatch_is_an_error() {
        let mut buffer = vec![0u8; 10];
        assert!(matches!(
            Canvas::new(&mut buffer, 2, 2),
            Err(Error::FrameSize {
                expected: 16,
                actual: 10
            })
        ));
    }

    #[test]
    fn filled_rect_covers_its_interior_only() {
        let mut buffer = frame(20, 20);
        let mut canvas = Canvas::new(&mut buffer, 20, 20).unwrap();
        let mut scene = Scene::new();
        scene.add(Primitive::rect(
            Rect::new(5.0, 5.0, 10.0, 10.0),
            None,
            Some(Fill::Solid(Color::RED)),
        ));
        render_scene(&mut canvas, &scene, &Viewport::new(Rect::from_size(20.0, 20.0)), None);
        assert_eq!(canvas.pixel(10, 10), Some(Color::RED));
        assert_eq!(canvas.pixel(5, 5), Some(Color::RED));
        assert_eq!(canvas.pixel(15, 15), Some(Color::rgba(0, 0, 0, 0)));
    }

    #[test]
    fn viewport_offsets_and_clips() {
        let mut buffer = frame(40, 20);
        let mut canvas = Canvas::new(&mut buffer, 40, 20).unwrap();
        let mut scene = Scene::new();
        scene.set_background(Color::BLUE);
        scene.add(Primitive::rect(
            Rect::new(0.0, 0.0, 100.0, 5.0),
            None,
            Some(Fill::Solid(Color::GREEN)),
        ));
        render_scene(&mut canvas, &scene, &Viewport::new(Rect::new(20.0, 0.0, 20.0, 20.0)), None);
        assert_eq!(canvas.pixel(10, 2), Some(Color::rgba(0, 0, 0, 0)));
        assert_eq!(canvas.pixel(25, 2), Some(Color::GREEN));
        assert_eq!(canvas.pixel(25, 10), Some(Color::BLUE));
    }

    #[test]
    fn centered_scene_lands_inside_its_viewport() {
        let mut buffer = frame(20, 20);
        let mut canvas = Canvas::new(&mut buffer, 20, 20).unwrap();
        let mut scene = Scene::new();
        scene.set_scene_rect(Rect::new(-10.0, -10.0, 20.0, 20.0));
        scene.add(Primitive::rect(
            Rect::new(-2.0, -2.0, 4.0, 4.0),
            None,
            Some(Fill::Solid(Color::RED)),
        ));
        let viewport = Viewport::for_scene(Rect::from_size(20.0, 20.0), &scene);
        render_scene(&mut canvas, &scene, &viewport, None);
        assert_eq!(canvas.pixel(10, 10), Some(Color::RED));
        assert_eq!(canvas.pixel(1, 1), Some(Color::rgba(0, 0, 0, 0)));
    }

    #[test]
    fn gradient_fill_follows_local_axis() {
        let mut buffer = frame(10, 100);
        let mut canvas = Canvas::new(&mut buffer, 10, 100).unwrap();
        let mut scene = Scene::new();
        scene.add(Primitive::rect(
            Rect::from_size(10.0, 100.0),
            None,
            Some(Fill::LinearGradient {
                start: Point::new(0.0, 0.0),
                end: Point::new(0.0, 100.0),
                from: Color::BLACK,
                to: Color::WHITE,
            }),
        ));
        render_scene(&mut canvas, &scene, &Viewport::new(Rect::from_size(10.0, 100.0)), None);
        let top = canvas.pixel(5, 0).unwrap();
        let bottom = canvas.pixel(5, 99).unwrap();
        assert!(top.r < 5);
        assert!(bottom.r > 250);
    }

    #[test]
    fn stroked_line_paints_along_its_length() {
        let mut buffer = frame(20, 20);
        let mut canvas = Canvas::new(&mut buffer, 20, 20).unwrap();
        let mut scene = Scene::new();
        scene.add(Primitive::line(
            Point::new(2.0, 10.5),
            Point::new(18.0, 10.5),
            Stroke::new(Color::WHITE, 2.0),
        ));
        render_scene(&mut canvas, &scene, &Viewport::new(Rect::from_size(20.0, 20.0)), None);
        for x in 3..17 {
            assert_eq!(canvas.pixel(x, 10), Some(Color::WHITE), "x = {x}");
        }
        assert_eq!(canvas.pixel(10, 2), Some(Color::rgba(0, 0, 0, 0)));
    }
}
